//! File I/O, content hashing, image relocation

mod content_hash;
mod document;
mod relocate;

pub use content_hash::ContentHash;
pub use document::{DocumentError, decode_document, read_document, write_document};
pub use relocate::{Relocation, RelocateError, clean_stray_markdown, relocate_images};
