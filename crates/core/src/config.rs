//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into core services. Core
//! code never reads environment variables while handling a request.

use crate::constants::{DEFAULT_PATIENT_DATA_DIR, DEFAULT_SAVE_COMMENT, VARIANTS_DIR_NAME};
use crate::{PatientError, PatientResult};
use std::path::{Path, PathBuf};
use varmap_types::NonEmptyText;

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    patient_data_dir: PathBuf,
    save_comment: NonEmptyText,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`PatientError::InvalidInput`] if `patient_data_dir` is empty.
    pub fn new(patient_data_dir: PathBuf, save_comment: NonEmptyText) -> PatientResult<Self> {
        if patient_data_dir.as_os_str().is_empty() {
            return Err(PatientError::InvalidInput(
                "patient_data_dir cannot be empty".into(),
            ));
        }

        Ok(Self {
            patient_data_dir,
            save_comment,
        })
    }

    /// Create a `CoreConfig` with the default save comment.
    pub fn with_data_dir(patient_data_dir: PathBuf) -> PatientResult<Self> {
        Self::new(patient_data_dir, NonEmptyText::new(DEFAULT_SAVE_COMMENT)?)
    }

    pub fn patient_data_dir(&self) -> &Path {
        &self.patient_data_dir
    }

    /// Root of the sharded per-patient variant documents.
    pub fn variants_dir(&self) -> PathBuf {
        self.patient_data_dir.join(VARIANTS_DIR_NAME)
    }

    pub fn save_comment(&self) -> &NonEmptyText {
        &self.save_comment
    }
}

/// Resolve the patient data directory from an optional environment value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_PATIENT_DATA_DIR`].
pub fn patient_data_dir_from_env_value(value: Option<String>) -> PathBuf {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PATIENT_DATA_DIR))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_data_dir() {
        let err = CoreConfig::with_data_dir(PathBuf::new()).expect_err("should reject");
        assert!(matches!(err, PatientError::InvalidInput(msg) if msg.contains("patient_data_dir")));
    }

    #[test]
    fn derives_variants_dir_and_default_comment() {
        let cfg = CoreConfig::with_data_dir(PathBuf::from("/data")).expect("valid config");
        assert_eq!(cfg.variants_dir(), PathBuf::from("/data/variants"));
        assert_eq!(cfg.save_comment().as_str(), "Updated variants from JSON");
    }

    #[test]
    fn env_value_falls_back_to_default() {
        assert_eq!(
            patient_data_dir_from_env_value(None),
            PathBuf::from(DEFAULT_PATIENT_DATA_DIR)
        );
        assert_eq!(
            patient_data_dir_from_env_value(Some("   ".into())),
            PathBuf::from(DEFAULT_PATIENT_DATA_DIR)
        );
        assert_eq!(
            patient_data_dir_from_env_value(Some(" /srv/patients ".into())),
            PathBuf::from("/srv/patients")
        );
    }
}
