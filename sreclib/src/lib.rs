//! # `sreclib`
//!
//! `sreclib` is a Rust library for parsing, validating, and assembling
//! Motorola S-record files.
//!
//! The library provides:
//! - Parser for S-record files (via the [`Srec`] struct).
//! - Flat binary image assembly with gap filling and duplicate-write
//!   detection (via [`Image`]).
//! - Lazy page-chunked assembly for streaming consumers (via [`Pages`]).
//! - Pattern search over assembled data (via [`search`]).
//! - Error handling with [`SrecError`].
//!
//! ## Example
//!
//! ```
//! use sreclib::Srec;
//!
//! let srec = Srec::from_srec("tests/fixtures/srec_valid_1.srec").unwrap();
//! let image = srec.to_image(0xFF, 0).unwrap();
//! assert_eq!(image.bytes_written(), 70);
//! ```

mod error;
mod image;
mod pages;
mod record;
mod search;
mod srec;

// Public APIs
pub use error::{SrecError, SrecErrorKind};
pub use image::{Image, Runs};
pub use pages::{DEFAULT_PAGE_SIZE, Page, Pages};
pub use record::{Purpose, Record, RecordKind};
pub use search::{SearchType, search};
pub use srec::Srec;
