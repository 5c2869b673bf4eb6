//! On-disk persistence for shot clips and session metadata.
//!
//! [`ClipStore`] owns the deterministic clip path layout
//! (`session_{id}/shot_{number:03}_{outcome}[_with_feedback].clip`) and
//! raw-frame clip writes. [`MetadataStore`] owns the JSON session
//! documents. Video encoding is an external collaborator's concern;
//! storage persists exactly the bytes the capture produced.

pub mod clips;
pub mod error;
pub mod metadata;

pub use clips::ClipStore;
pub use error::{StorageError, StorageResult};
pub use metadata::MetadataStore;
