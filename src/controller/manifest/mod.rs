//! # Manifests
//!
//! Turning configuration entries into typed resources.
//!
//! - `split`: `---` document splitting
//! - `decode`: structured decoding and type-tag dispatch
//! - `registry`: the statically registered resource kinds
//! - `resource`: decoded resources and their identity

pub mod decode;
pub mod registry;
pub mod resource;
pub mod split;

pub use decode::{decode_document, decode_documents, parse_all, DecodeError, DocumentError};
pub use registry::{KindEntry, KindRegistry, ResourceBody};
pub use resource::{DecodedResource, ResourceKey};
pub use split::{split_documents, ManifestDocument};
