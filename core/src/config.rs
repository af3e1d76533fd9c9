use serde::Deserialize;

use crate::error::ConfigError;

pub const SMALL_DIR_VAR: &str = "SMALL_IMG_DIR";
pub const MEDIUM_DIR_VAR: &str = "MED_IMG_DIR";
pub const ORIGINAL_DIR_VAR: &str = "ORG_IMG_DIR";
pub const SOURCE_DIR_VAR: &str = "FILE_DIR";

/// Width and JPEG quality of the small rendition.
pub const SMALL_WIDTH: u32 = 400;
pub const SMALL_QUALITY: u8 = 65;
/// Width and JPEG quality of the medium rendition.
pub const MEDIUM_WIDTH: u32 = 800;
pub const MEDIUM_QUALITY: u8 = 75;

/// An uploaded object that should be turned into renditions.
///
/// Storage notifications call the fields `bucket` and `name`; both spellings
/// are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InboundEvent {
    #[serde(alias = "bucket")]
    pub container: String,
    #[serde(alias = "name")]
    pub key: String,
}

impl InboundEvent {
    pub fn new(container: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            key: key.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingConfig {
    /// Directory prefix for the small rendition
    pub small_dir: String,
    /// Directory prefix for the medium rendition
    pub medium_dir: String,
    /// Directory prefix for the untouched copy of the upload
    pub original_dir: String,
    /// Prefix every inbound key must start with
    pub source_dir: String,
}

impl ProcessingConfig {
    pub fn new(
        small_dir: impl Into<String>,
        medium_dir: impl Into<String>,
        original_dir: impl Into<String>,
        source_dir: impl Into<String>,
    ) -> Self {
        Self {
            small_dir: small_dir.into(),
            medium_dir: medium_dir.into(),
            original_dir: original_dir.into(),
            source_dir: source_dir.into(),
        }
    }

    /// Read the four prefixes from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`ProcessingConfig::from_env`] against an arbitrary lookup.
    /// Unset and empty variables are both reported as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ConfigError::MissingVar(name.to_string()))
        };

        let config = Self {
            small_dir: get(SMALL_DIR_VAR)?,
            medium_dir: get(MEDIUM_DIR_VAR)?,
            original_dir: get(ORIGINAL_DIR_VAR)?,
            source_dir: get(SOURCE_DIR_VAR)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("small_dir", &self.small_dir),
            ("medium_dir", &self.medium_dir),
            ("original_dir", &self.original_dir),
            ("source_dir", &self.source_dir),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(ConfigError::Empty(name));
            }
        }
        Ok(())
    }
}

/// One output the orchestrator must produce for an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenditionTarget {
    /// Label used in logs ("small", "medium", "original")
    pub name: &'static str,
    pub output_path: String,
    /// Target width in pixels; 0 for passthrough
    pub width: u32,
    /// JPEG quality 1-100; 0 for passthrough
    pub quality: u8,
    /// Copy the source bytes verbatim instead of resizing
    pub is_passthrough: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_from_lookup_reads_all_prefixes() {
        let config = ProcessingConfig::from_lookup(lookup(&[
            ("SMALL_IMG_DIR", "small/"),
            ("MED_IMG_DIR", "medium/"),
            ("ORG_IMG_DIR", "original/"),
            ("FILE_DIR", "uploads/"),
        ]))
        .unwrap();
        assert_eq!(
            config,
            ProcessingConfig::new("small/", "medium/", "original/", "uploads/")
        );
    }

    #[test]
    fn test_from_lookup_reports_missing_var() {
        let err = ProcessingConfig::from_lookup(lookup(&[
            ("SMALL_IMG_DIR", "small/"),
            ("ORG_IMG_DIR", "original/"),
            ("FILE_DIR", "uploads/"),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::MissingVar("MED_IMG_DIR".into()));
    }

    #[test]
    fn test_empty_var_counts_as_missing() {
        let err = ProcessingConfig::from_lookup(lookup(&[
            ("SMALL_IMG_DIR", ""),
            ("MED_IMG_DIR", "medium/"),
            ("ORG_IMG_DIR", "original/"),
            ("FILE_DIR", "uploads/"),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::MissingVar("SMALL_IMG_DIR".into()));
    }

    #[test]
    fn test_validate_rejects_blank_prefix() {
        let config = ProcessingConfig::new("small/", "  ", "original/", "uploads/");
        assert_eq!(config.validate(), Err(ConfigError::Empty("medium_dir")));
    }

    #[test]
    fn test_event_accepts_notification_field_names() {
        let event: InboundEvent =
            serde_json::from_str(r#"{"bucket":"b","name":"uploads/gopher.png"}"#).unwrap();
        assert_eq!(event, InboundEvent::new("b", "uploads/gopher.png"));

        let event: InboundEvent =
            serde_json::from_str(r#"{"container":"b","key":"uploads/a.jpg"}"#).unwrap();
        assert_eq!(event.key, "uploads/a.jpg");
    }
}
