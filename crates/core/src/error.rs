use variants::VariantField;

#[derive(Debug, thiserror::Error)]
pub enum PatientError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to create variant store directory: {0}")]
    StoreDirCreation(std::io::Error),
    #[error("failed to write variant document: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to read variant document: {0}")]
    FileRead(std::io::Error),
    #[error("failed to serialize YAML: {0}")]
    YamlSerialization(serde_yaml::Error),
    #[error("translation error: {0}")]
    Translation(String),
    #[error("stored field {field} holds a {found} value, expected {expected}")]
    FieldType {
        field: VariantField,
        expected: &'static str,
        found: &'static str,
    },
    #[error("variant store lock poisoned")]
    LockPoisoned,

    #[error("variant error: {0}")]
    Variant(#[from] variants::VariantError),
    #[error("invalid identifier: {0}")]
    Uuid(#[from] varmap_uuid::UuidError),
    #[error("invalid text: {0}")]
    Text(#[from] varmap_types::TextError),
}

pub type PatientResult<T> = std::result::Result<T, PatientError>;
