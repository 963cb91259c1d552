use std::path::Path;

use serde::{
    Deserialize,
    Serialize,
};

use super::MarcFillError;
use crate::persistence;

pub const SETTINGS_FILE: &str = "settings.json";

/// Which field carries the sequence and how records are laid out in the text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RepairProfile {
    pub record_start: String,
    pub target_tag: String,
    pub marker_code: char,
    pub subject_tag: String,
    pub subfield_delimiter: char,
    pub record_separator: String,
    /// Widest gap between two neighbouring records that will be filled in one pass.
    pub max_gap_fill: u64,
}

impl Default for RepairProfile {
    fn default() -> Self {
        Self {
            record_start: "=LDR".to_string(),
            target_tag: "852".to_string(),
            marker_code: 'p',
            subject_tag: "653".to_string(),
            subfield_delimiter: '$',
            record_separator: "\n\n".to_string(),
            max_gap_fill: 10_000,
        }
    }
}

impl RepairProfile {
    /// `=852`, the token counted by the stats reporter.
    pub fn target_token(&self) -> String {
        format!("={}", self.target_tag)
    }

    pub fn subject_token(&self) -> String {
        format!("={}", self.subject_tag)
    }

    pub fn validate(&self) -> Result<(), MarcFillError> {
        for (name, tag) in [("target_tag", &self.target_tag), ("subject_tag", &self.subject_tag)] {
            if !is_valid_tag(tag) {
                return Err(MarcFillError::InvalidProfile(format!(
                    "{} must be 3-4 alphanumeric characters, got {:?}",
                    name, tag
                )));
            }
        }

        if !self.record_start.starts_with('=') || self.record_start.len() < 2 {
            return Err(MarcFillError::InvalidProfile(format!(
                "record_start must look like =TAG, got {:?}",
                self.record_start
            )));
        }

        if self.marker_code.is_whitespace() || self.marker_code == self.subfield_delimiter {
            return Err(MarcFillError::InvalidProfile(format!(
                "marker_code {:?} cannot be used with delimiter {:?}",
                self.marker_code, self.subfield_delimiter
            )));
        }

        if !self.record_separator.contains('\n') {
            return Err(MarcFillError::InvalidProfile(
                "record_separator must contain a line break".to_string(),
            ));
        }

        Ok(())
    }
}

fn is_valid_tag(tag: &str) -> bool {
    (3..=4).contains(&tag.len()) && tag.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Limits the shell applies before any text reaches the core.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IntakeLimits {
    pub max_input_bytes: usize,
    pub accepted_extensions: Vec<String>,
    pub download_name: String,
}

impl Default for IntakeLimits {
    fn default() -> Self {
        Self {
            max_input_bytes: 16 * 1024 * 1024,
            accepted_extensions: vec!["txt".to_string(), "mrk".to_string()],
            download_name: "processed_marc_records.mrk".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub profile: RepairProfile,
    pub intake: IntakeLimits,
}

impl Settings {
    /// Loads from an explicit file. Any failure is reported to the caller.
    pub fn load_from(path: &Path) -> Result<Self, MarcFillError> {
        let settings: Settings = persistence::load_json_from(path)?;
        settings.profile.validate()?;
        Ok(settings)
    }

    /// Loads from the per-user data directory, falling back to defaults.
    pub fn load_or_default() -> Self {
        let settings: Settings = persistence::load_json_or_default(SETTINGS_FILE);
        match settings.profile.validate() {
            Ok(()) => settings,
            Err(e) => {
                tracing::warn!("Ignoring stored settings: {}", e);
                Settings::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_default_profile_is_valid() {
        let profile = RepairProfile::default();
        assert!(profile.validate().is_ok());
        assert_eq!(profile.target_token(), "=852");
        assert_eq!(profile.subject_token(), "=653");
    }

    #[test]
    fn test_profile_rejects_bad_tags() {
        let profile = RepairProfile { target_tag: "85".to_string(), ..Default::default() };
        assert!(matches!(profile.validate(), Err(MarcFillError::InvalidProfile(_))));

        let profile = RepairProfile { subject_tag: "6 3".to_string(), ..Default::default() };
        assert!(matches!(profile.validate(), Err(MarcFillError::InvalidProfile(_))));

        let profile = RepairProfile { marker_code: '$', ..Default::default() };
        assert!(matches!(profile.validate(), Err(MarcFillError::InvalidProfile(_))));

        let profile = RepairProfile { record_start: "LDR".to_string(), ..Default::default() };
        assert!(matches!(profile.validate(), Err(MarcFillError::InvalidProfile(_))));
    }

    #[test]
    fn test_partial_settings_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "profile": { "max_gap_fill": 50 } }"#).unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.profile.max_gap_fill, 50);
        assert_eq!(settings.profile.target_tag, "852");
        assert_eq!(settings.intake, IntakeLimits::default());
    }

    #[test]
    fn test_explicit_settings_errors_propagate() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("missing.json");
        assert!(matches!(Settings::load_from(&missing), Err(MarcFillError::Io(_))));

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ not json").unwrap();
        assert!(matches!(Settings::load_from(&broken), Err(MarcFillError::Json(_))));

        let invalid = dir.path().join("invalid.json");
        fs::write(&invalid, r#"{ "profile": { "target_tag": "" } }"#).unwrap();
        assert!(matches!(Settings::load_from(&invalid), Err(MarcFillError::InvalidProfile(_))));
    }
}
