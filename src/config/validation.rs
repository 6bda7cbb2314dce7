use std::path::Path;

use crate::backup::BackupFormat;
use crate::config::types::{DelayBounds, RunConfig};
use crate::ConfigError;

/// Validates the entire run configuration
///
/// Any error here is fatal at startup and never reaches the crawl engine.
pub fn validate(config: &RunConfig) -> Result<(), ConfigError> {
    validate_username(&config.user)?;
    validate_delay(&config.delay)?;
    validate_backup_path(&config.books_backup)?;
    validate_backup_path(&config.quotes_backup)?;
    Ok(())
}

/// Validates the profile username
fn validate_username(user: &str) -> Result<(), ConfigError> {
    if user.trim().is_empty() {
        return Err(ConfigError::Validation(
            "username cannot be empty".to_string(),
        ));
    }

    if !user
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "username must contain only alphanumeric characters, '-' or '_', got '{}'",
            user
        )));
    }

    Ok(())
}

/// Validates the inter-request delay bounds
///
/// The scheduler itself stays defensive about `max < min`, but a run asked
/// for inverted bounds is a misconfiguration and refuses to start.
fn validate_delay(delay: &DelayBounds) -> Result<(), ConfigError> {
    if let Some(max) = delay.max {
        if delay.min > max {
            return Err(ConfigError::Validation(format!(
                "min delay ({}s) cannot exceed max delay ({}s)",
                delay.min, max
            )));
        }
    }
    Ok(())
}

/// Validates that a backup target maps to a supported table format
fn validate_backup_path(path: &Path) -> Result<(), ConfigError> {
    BackupFormat::from_path(path).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("levar").is_ok());
        assert!(validate_username("user_name-42").is_ok());

        assert!(validate_username("").is_err());
        assert!(validate_username("   ").is_err());
        assert!(validate_username("a user").is_err());
        assert!(validate_username("../etc").is_err());
    }

    #[test]
    fn test_validate_delay() {
        assert!(validate_delay(&DelayBounds {
            min: 5,
            max: Some(15)
        })
        .is_ok());
        assert!(validate_delay(&DelayBounds { min: 7, max: None }).is_ok());
        assert!(validate_delay(&DelayBounds {
            min: 10,
            max: Some(1)
        })
        .is_err());
    }

    #[test]
    fn test_validate_backup_path() {
        assert!(validate_backup_path(&PathBuf::from("books.csv")).is_ok());
        assert!(validate_backup_path(&PathBuf::from("books.xlsx")).is_ok());
        assert!(validate_backup_path(&PathBuf::from("books.txt")).is_err());
        assert!(validate_backup_path(&PathBuf::from("books")).is_err());
    }
}
