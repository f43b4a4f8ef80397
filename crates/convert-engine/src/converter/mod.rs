//! LibreOffice invocation wrapper with timeout and error handling

pub mod errors;
pub mod invoke;

pub use errors::ConvertError;
pub use invoke::{expected_pdf_path, LibreOffice};
