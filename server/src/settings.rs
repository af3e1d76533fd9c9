use std::path::PathBuf;
use std::time::Duration;

use renditioner_core::{ConfigError, ProcessingConfig};

pub const STORAGE_ROOT_VAR: &str = "STORAGE_ROOT";
pub const BIND_ADDR_VAR: &str = "BIND_ADDR";
pub const DELETE_SOURCE_VAR: &str = "DELETE_SOURCE";
pub const IO_TIMEOUT_VAR: &str = "IO_TIMEOUT_SECS";

/// Everything the server reads from its environment, validated once.
#[derive(Debug, Clone)]
pub struct Settings {
    pub processing: ProcessingConfig,
    pub storage_root: PathBuf,
    pub bind_addr: String,
    /// Default for requests that do not pass `?delete=`
    pub delete_source: bool,
    pub io_timeout: Option<Duration>,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let processing = ProcessingConfig::from_lookup(&lookup)?;

        let delete_source = match lookup(DELETE_SOURCE_VAR).as_deref() {
            None | Some("") => false,
            Some(v) => parse_bool(v).ok_or_else(|| ConfigError::Invalid {
                name: DELETE_SOURCE_VAR.to_string(),
                value: v.to_string(),
            })?,
        };

        let io_timeout = match lookup(IO_TIMEOUT_VAR).as_deref() {
            None | Some("") => None,
            Some(v) => {
                let secs = v.parse::<u64>().map_err(|_| ConfigError::Invalid {
                    name: IO_TIMEOUT_VAR.to_string(),
                    value: v.to_string(),
                })?;
                Some(Duration::from_secs(secs))
            }
        };

        Ok(Self {
            processing,
            storage_root: lookup(STORAGE_ROOT_VAR)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| "./storage".to_string())
                .into(),
            bind_addr: lookup(BIND_ADDR_VAR)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            delete_source,
            io_timeout,
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_vars() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("SMALL_IMG_DIR", "small/"),
            ("MED_IMG_DIR", "medium/"),
            ("ORG_IMG_DIR", "original/"),
            ("FILE_DIR", "uploads/"),
        ])
    }

    #[test]
    fn test_defaults() {
        let vars = base_vars();
        let settings = Settings::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(settings.bind_addr, "0.0.0.0:3000");
        assert_eq!(settings.storage_root, PathBuf::from("./storage"));
        assert!(!settings.delete_source);
        assert_eq!(settings.io_timeout, None);
    }

    #[test]
    fn test_overrides() {
        let mut vars = base_vars();
        vars.insert("DELETE_SOURCE", "true");
        vars.insert("IO_TIMEOUT_SECS", "30");
        vars.insert("STORAGE_ROOT", "/srv/images");
        let settings = Settings::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert!(settings.delete_source);
        assert_eq!(settings.io_timeout, Some(Duration::from_secs(30)));
        assert_eq!(settings.storage_root, PathBuf::from("/srv/images"));
    }

    #[test]
    fn test_invalid_values_are_errors() {
        let mut vars = base_vars();
        vars.insert("IO_TIMEOUT_SECS", "soon");
        let err = Settings::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref name, .. } if name == "IO_TIMEOUT_SECS"));
    }

    #[test]
    fn test_missing_prefix_is_reported() {
        let mut vars = base_vars();
        vars.remove("FILE_DIR");
        let err = Settings::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap_err();
        assert_eq!(err, ConfigError::MissingVar("FILE_DIR".into()));
    }
}
