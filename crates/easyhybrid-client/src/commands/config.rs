//! Configuration commands.

use std::path::Path;

use easyhybrid_core::secret;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Dump the current configuration as TOML.
pub fn dump(config: &ClientConfig) -> ClientResult<()> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))?;

    println!("{}", toml_str);

    Ok(())
}

/// Validate the configuration.
pub fn validate(config: &ClientConfig) -> ClientResult<()> {
    config.validate().map_err(ClientError::Config)?;

    if secret::is_reference(&config.github.client_id) {
        secret::resolve(&config.github.client_id).map_err(|e| {
            ClientError::Config(format!("failed to resolve github.client_id: {}", e))
        })?;
        println!("GitHub client id reference resolves.");
    }

    println!("Configuration is valid.");
    Ok(())
}

/// Show the configuration file path.
pub fn path(override_path: Option<&Path>) -> ClientResult<()> {
    match override_path {
        Some(p) => println!("config: {}", p.display()),
        None => println!("config: {}", ClientConfig::default_path().display()),
    }
    Ok(())
}
