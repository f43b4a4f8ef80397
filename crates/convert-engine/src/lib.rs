//! Document-to-PDF conversion engine
//!
//! This crate wraps an external LibreOffice process and exposes a single
//! async conversion operation with timeout and error handling:
//! - Subprocess invocation (`soffice --headless --convert-to pdf`)
//! - Timeout enforcement (a hung converter cannot hang the caller forever)
//! - Output-file discovery and verification
//!
//! The converter itself is treated as an opaque black box; its exit code
//! and the file it leaves behind are the only observed contract.

pub mod converter;

pub use converter::{expected_pdf_path, ConvertError, LibreOffice};
