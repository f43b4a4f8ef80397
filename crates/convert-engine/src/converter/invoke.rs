//! Core invocation logic
//!
//! Spawns the LibreOffice binary against a staged input file and waits for
//! it under a timeout. The converter writes `<input stem>.pdf` into the
//! output directory; that file existing is the success contract.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, warn};

use super::errors::ConvertError;

/// Handle to the external LibreOffice converter
#[derive(Debug, Clone)]
pub struct LibreOffice {
    binary: PathBuf,
    timeout_ms: u64,
}

impl LibreOffice {
    /// Create a converter handle for a specific binary
    pub fn new(binary: impl Into<PathBuf>, timeout_ms: u64) -> Self {
        Self {
            binary: binary.into(),
            timeout_ms,
        }
    }

    /// Create a converter handle, resolving the binary from `SOFFICE_BIN`
    /// (falls back to `soffice` on the PATH)
    pub fn from_env(timeout_ms: u64) -> Self {
        let binary = std::env::var("SOFFICE_BIN").unwrap_or_else(|_| "soffice".to_string());
        Self::new(binary, timeout_ms)
    }

    /// Convert `input` to PDF, placing the result in `out_dir`
    ///
    /// Returns the path of the produced PDF. The subprocess is killed if it
    /// outlives the configured timeout.
    pub async fn convert_to_pdf(
        &self,
        input: &Path,
        out_dir: &Path,
    ) -> Result<PathBuf, ConvertError> {
        let pdf_path = expected_pdf_path(input, out_dir)?;
        debug!(
            "converting {} -> {} via {}",
            input.display(),
            pdf_path.display(),
            self.binary.display()
        );

        let mut command = Command::new(&self.binary);
        command
            .arg("--headless")
            .arg("--convert-to")
            .arg("pdf")
            .arg("--outdir")
            .arg(out_dir)
            .arg(input)
            // Dropping the output future on timeout must not leave the
            // converter running.
            .kill_on_drop(true);

        let result =
            tokio::time::timeout(Duration::from_millis(self.timeout_ms), command.output()).await;

        let output = match result {
            Ok(Ok(output)) => output,
            Ok(Err(source)) => {
                return Err(ConvertError::Spawn {
                    binary: self.binary.display().to_string(),
                    source,
                });
            }
            Err(_elapsed) => {
                warn!(
                    "converter timed out after {}ms on {}",
                    self.timeout_ms,
                    input.display()
                );
                return Err(ConvertError::Timeout(self.timeout_ms));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(
                "converter failed on {} with status {:?}: {}",
                input.display(),
                output.status.code(),
                stderr
            );
            return Err(ConvertError::ConverterFailed {
                code: output.status.code(),
                stderr,
            });
        }

        // A zero exit does not guarantee the file; LibreOffice reports
        // some filter failures on stdout only.
        if !pdf_path.exists() {
            return Err(ConvertError::MissingOutput(pdf_path));
        }

        Ok(pdf_path)
    }
}

/// Compute the output path the converter will write for `input`
///
/// LibreOffice keeps the full stem, so `a.b.docx` becomes `a.b.pdf`.
pub fn expected_pdf_path(input: &Path, out_dir: &Path) -> Result<PathBuf, ConvertError> {
    let stem = input
        .file_stem()
        .ok_or_else(|| ConvertError::InvalidInput(input.to_path_buf()))?;
    let mut name = OsString::from(stem);
    name.push(".pdf");
    Ok(out_dir.join(name))
}
