//! Constants used throughout the core crate.
//!
//! This module contains path, filename and naming constants to keep the store layout
//! and the mapper's external names consistent.

/// Name under which the mapper registers its data and JSON property.
pub const CONTROLLER_NAME: &str = variants::schema::JSON_PROPERTY_NAME;

/// Default directory for patient data storage when no explicit directory is configured.
pub const DEFAULT_PATIENT_DATA_DIR: &str = "patient_data";

/// Environment variable read by binaries to override the patient data directory.
pub const PATIENT_DATA_DIR_ENV: &str = "VARMAP_PATIENT_DATA_DIR";

/// Directory name for variant documents under the patient data directory.
pub const VARIANTS_DIR_NAME: &str = "variants";

/// Filename of a patient's variant document.
pub const VARIANTS_DOCUMENT_FILENAME: &str = "variants.yaml";

/// Temporary filename used while committing a variant document.
pub const VARIANTS_DOCUMENT_TMP_FILENAME: &str = "variants.yaml.tmp";

/// Change comment recorded with every save.
pub const DEFAULT_SAVE_COMMENT: &str = "Updated variants from JSON";
