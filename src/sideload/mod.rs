//! Sideload embedding
//!
//! Collection responses can inline related groups next to the primary
//! records. This module merges those groups back into the right records.

mod embedder;


pub use embedder::{build_sideload_params, embed_sideloads, to_singular};
