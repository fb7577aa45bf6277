//! Authentication commands.

use tracing::{info, warn};

use easyhybrid_core::store::GITHUB_USER_FILE;
use easyhybrid_core::{UserData, Visibility};
use easyhybrid_sync::{AuthSuccess, GitHubUser};

use crate::app::App;
use crate::error::ClientResult;

/// How the data was brought in line with the gist after sign-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInSync {
    /// The backup replaced local data.
    Restored,
    /// Local data was uploaded.
    BackedUp,
    /// Neither worked; sync stays enabled.
    Failed,
}

/// Run the GitHub sign-in flow and enable Gist backup with the new token.
///
/// The browser is sent to GitHub's authorize page; the redirect comes back
/// to a loopback listener, and the code is exchanged for a token by the
/// configured relay, which holds the client secret.
pub async fn github(app: &mut App, manual_sync: bool, no_browser: bool) -> ClientResult<()> {
    let port_range = app.config().github.redirect_port_range;
    let oauth = app.oauth()?;

    println!("Starting GitHub authentication...");
    println!();
    if no_browser {
        println!("Open the URL below in a browser to authorize access.");
    } else {
        println!("A browser window will open for you to authorize access.");
    }
    println!();

    let AuthSuccess { access_token, user } =
        oauth.authorize_in_browser(port_range, !no_browser).await?;
    info!(login = %user.login, "GitHub authentication successful");

    finish_sign_in(app, &access_token, &user, manual_sync).await?;
    if manual_sync {
        println!("Automatic backup is off; edits are still backed up right away.");
    }
    Ok(())
}

/// Enables sync with a fresh token, then pulls the backup.
///
/// When the backup cannot be read, or is empty while this machine has data,
/// local data is uploaded instead.
pub async fn finish_sign_in(
    app: &mut App,
    access_token: &str,
    user: &GitHubUser,
    manual_sync: bool,
) -> ClientResult<SignInSync> {
    let local = app.store().load_user_data()?;
    app.sync().setup(access_token, !manual_sync).await?;
    app.store().save_json(GITHUB_USER_FILE, user, Visibility::Normal)?;

    let name = user.display_name();
    println!();
    let outcome = match app.sync().restore().await {
        Ok(remote) if has_entries(&remote) || !has_entries(&local) => {
            println!("Welcome back {}! Data restored from GitHub.", name);
            SignInSync::Restored
        }
        Ok(_) => {
            info!("backup is empty, keeping local data");
            app.store().save_user_data(&local)?;
            back_up(app, name).await
        }
        Err(e) => {
            warn!(error = %e, "restore after sign-in failed, backing up instead");
            back_up(app, name).await
        }
    };
    Ok(outcome)
}

async fn back_up(app: &mut App, name: &str) -> SignInSync {
    match app.sync().backup().await {
        Ok(()) => {
            println!("Welcome {}! Data backed up to GitHub.", name);
            SignInSync::BackedUp
        }
        Err(e) => {
            warn!(error = %e, "backup after sign-in failed");
            eprintln!("Signed in as {}, but data sync failed: {}", name, e);
            SignInSync::Failed
        }
    }
}

fn has_entries(data: &UserData) -> bool {
    !data.attendance.is_empty() || data.holidays.personal().next().is_some()
}
