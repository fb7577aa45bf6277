//! Target rate command.

use easyhybrid_core::TargetRate;

use crate::app::App;
use crate::error::ClientResult;

/// Shows the target rate, or sets it when `rate` is given.
pub async fn target(app: &mut App, rate: Option<&str>) -> ClientResult<()> {
    let Some(rate) = rate else {
        println!("Target: {}", app.store().load_target_rate()?);
        return Ok(());
    };

    let rate: TargetRate = rate.parse()?;
    app.store().save_target_rate(rate)?;
    println!("Target set to {}", rate);
    app.data_changed().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testing::{app, date};

    #[tokio::test]
    async fn sets_and_validates_target() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _) = app(&dir, date(2024, 3, 4));
        assert_eq!(app.store().load_target_rate().unwrap(), TargetRate::DEFAULT);

        target(&mut app, Some("60%")).await.unwrap();
        assert_eq!(app.store().load_target_rate().unwrap().percent(), 60);

        assert!(target(&mut app, Some("0")).await.is_err());
        assert!(target(&mut app, Some("150")).await.is_err());
        assert_eq!(app.store().load_target_rate().unwrap().percent(), 60);

        target(&mut app, None).await.unwrap();
    }
}
