//! Secret reference resolver.
//!
//! Tokens and client secrets can be given as references instead of plain text:
//!
//! - `pass::path/in/store` runs `pass show path/in/store` and keeps the first line
//! - `env::VAR_NAME` reads `$VAR_NAME`
//! - anything else is used as-is

use std::process::Command;

use crate::error::{CoreError, CoreResult};

/// Resolves a value that may be a secret reference.
pub fn resolve(value: &str) -> CoreResult<String> {
    if let Some(path) = value.strip_prefix("pass::") {
        resolve_pass(path)
    } else if let Some(var) = value.strip_prefix("env::") {
        resolve_env(var)
    } else {
        Ok(value.to_string())
    }
}

/// Returns true if the value is a reference rather than a literal.
pub fn is_reference(value: &str) -> bool {
    value.starts_with("pass::") || value.starts_with("env::")
}

fn resolve_pass(path: &str) -> CoreResult<String> {
    let output = Command::new("pass")
        .arg("show")
        .arg(path)
        .output()
        .map_err(|e| CoreError::Secret(format!("failed to run `pass show {}`: {}", path, e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CoreError::Secret(format!(
            "`pass show {}` failed (exit {}): {}",
            path,
            output.status,
            stderr.trim()
        )));
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CoreError::Secret(format!("`pass show {}` produced no output", path)))
}

fn resolve_env(var: &str) -> CoreResult<String> {
    std::env::var(var)
        .map_err(|_| CoreError::Secret(format!("environment variable `{}` is not set", var)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_passthrough() {
        assert_eq!(resolve("ghp_abc123").unwrap(), "ghp_abc123");
        assert_eq!(resolve("").unwrap(), "");
        assert!(!is_reference("ghp_abc123"));
    }

    #[test]
    fn env_prefix_resolves() {
        unsafe {
            std::env::set_var("_EASYHYBRID_TEST_SECRET", "s3cret");
        }
        assert!(is_reference("env::_EASYHYBRID_TEST_SECRET"));
        assert_eq!(resolve("env::_EASYHYBRID_TEST_SECRET").unwrap(), "s3cret");
        unsafe {
            std::env::remove_var("_EASYHYBRID_TEST_SECRET");
        }
    }

    #[test]
    fn env_prefix_missing_var_errors() {
        let err = resolve("env::_EASYHYBRID_NONEXISTENT_VAR_12345").unwrap_err();
        assert!(err.to_string().contains("not set"));
    }

    #[test]
    fn pass_prefix_unknown_entry_errors() {
        assert!(resolve("pass::nonexistent/entry/that/should/not/exist/12345").is_err());
    }
}
