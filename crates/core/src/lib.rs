//! # Varmap Core
//!
//! Core logic for mapping a patient's gene variants.
//!
//! This crate contains the persistence side of the variant mapper:
//! - the store interface, with in-memory and sharded YAML file implementations
//! - the Store Reader (raw records → canonical records) and Store Writer (the reverse)
//! - [`VariantMapper`], combining both with the JSON codec from the `variants` crate
//!
//! **No I/O at the boundary**: JSON parsing and validation live in `variants`; this crate
//! only touches the filesystem through [`FileVariantStore`].

pub mod config;
pub mod constants;
pub mod error;
pub mod mapper;
pub mod reader;
pub mod store;
pub mod writer;

pub use config::CoreConfig;
pub use error::{PatientError, PatientResult};
pub use mapper::VariantMapper;
pub use store::{
    FileVariantStore, InMemoryVariantStore, RawRecord, RawValue, StoredDocument, VariantStore,
};

// Re-export the identity and text primitives used in this crate's API.
pub use varmap_types::NonEmptyText;
pub use varmap_uuid::PatientId;
