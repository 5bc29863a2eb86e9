//! Lightweight library for decoding and encoding Android boot images
//! (including MediaTek and Sony ELF ones!)
#![no_std]
#![deny(
    // warnings,
    unused_imports,
    missing_debug_implementations,
    // missing_docs,
    clippy::all,
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    unused_qualifications
)]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod header;
pub mod image;
mod errors;

pub use errors::{DecodeError, DecodeWarning, EncodeError, Segment};
pub use image::{
    compute_id, decode, decode_with_warnings, encode, is_valid_page_size, padding, size_in_pages,
    BootImage, Decoded, Format,
};
