//! Per-request working-file lifecycle
//!
//! Working names come from a per-request UUID, never from the caller-supplied
//! filename, so concurrent uploads of the same document cannot collide and an
//! uploaded name cannot steer writes outside the working directory. The
//! original name survives only, sanitized, as the download filename in the
//! response.

use std::path::{Path, PathBuf};

use tracing::warn;
use uuid::Uuid;

use crate::error::ServerError;

/// Extensions the converter is asked to handle
pub const ALLOWED_EXTENSIONS: &[&str] = &["docx", "doc", "odt", "rtf", "txt"];

/// One request's staged working files
///
/// Both files are removed when the job drops, on every exit path.
#[derive(Debug)]
pub struct ConversionJob {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub download_name: String,
}

impl ConversionJob {
    /// Validate the uploaded name, pick working paths, and write the input
    pub async fn stage(
        work_dir: &Path,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<Self, ServerError> {
        let (stem, extension) = split_name(original_name)?;
        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(ServerError::UnsupportedFileType(extension));
        }

        let token = Uuid::new_v4();
        let input_path = work_dir.join(format!("{}.{}", token, extension));
        let output_path = work_dir.join(format!("{}.pdf", token));
        let download_name = format!("{}.pdf", stem);

        tokio::fs::write(&input_path, bytes).await?;

        Ok(Self {
            input_path,
            output_path,
            download_name,
        })
    }
}

impl Drop for ConversionJob {
    fn drop(&mut self) {
        for path in [&self.input_path, &self.output_path] {
            if let Err(err) = std::fs::remove_file(path) {
                if err.kind() != std::io::ErrorKind::NotFound {
                    warn!("failed to remove working file {}: {}", path.display(), err);
                }
            }
        }
    }
}

/// Split an uploaded filename into a sanitized stem and lowercase extension
///
/// Only the final path component counts, which defeats traversal via the
/// uploaded name.
fn split_name(original: &str) -> Result<(String, String), ServerError> {
    let base = Path::new(original)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");
    if base.is_empty() {
        return Err(ServerError::EmptyFilename);
    }

    let (stem, extension) = match base.rsplit_once('.') {
        Some((stem, ext)) if !ext.is_empty() => (stem, ext),
        _ => return Err(ServerError::UnsupportedFileType(base.to_string())),
    };

    let stem = sanitize_stem(stem);
    let stem = if stem.is_empty() {
        "document".to_string()
    } else {
        stem
    };

    Ok((stem, extension.to_ascii_lowercase()))
}

/// Replace anything outside `[A-Za-z0-9._-]` so the stem is header-safe
fn sanitize_stem(stem: &str) -> String {
    stem.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn split_name_plain_docx() {
        let (stem, ext) = split_name("report.docx").unwrap();
        assert_eq!(stem, "report");
        assert_eq!(ext, "docx");
    }

    #[test]
    fn split_name_uppercases_normalized() {
        let (stem, ext) = split_name("Quarterly Report.DOCX").unwrap();
        assert_eq!(stem, "Quarterly_Report");
        assert_eq!(ext, "docx");
    }

    #[test]
    fn split_name_strips_directories() {
        let (stem, ext) = split_name("../../etc/passwd.docx").unwrap();
        assert_eq!(stem, "passwd");
        assert_eq!(ext, "docx");
    }

    #[test]
    fn split_name_rejects_empty() {
        assert!(matches!(split_name(""), Err(ServerError::EmptyFilename)));
        assert!(matches!(split_name("/"), Err(ServerError::EmptyFilename)));
        assert!(matches!(split_name(".."), Err(ServerError::EmptyFilename)));
    }

    #[test]
    fn split_name_rejects_missing_extension() {
        assert!(matches!(
            split_name("report"),
            Err(ServerError::UnsupportedFileType(_))
        ));
        assert!(matches!(
            split_name("report."),
            Err(ServerError::UnsupportedFileType(_))
        ));
    }

    #[test]
    fn split_name_dotfile_gets_fallback_stem() {
        let (stem, ext) = split_name(".docx").unwrap();
        assert_eq!(stem, "document");
        assert_eq!(ext, "docx");
    }

    #[tokio::test]
    async fn stage_writes_input_and_drop_removes_it() {
        let dir = tempfile::tempdir().unwrap();
        let input_path;
        {
            let job = ConversionJob::stage(dir.path(), "report.docx", b"payload")
                .await
                .unwrap();
            input_path = job.input_path.clone();
            assert_eq!(std::fs::read(&input_path).unwrap(), b"payload");
            assert_eq!(job.download_name, "report.pdf");
        }
        assert!(!input_path.exists());
    }

    #[tokio::test]
    async fn stage_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConversionJob::stage(dir.path(), "payload.exe", b"x")
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::UnsupportedFileType(ext) if ext == "exe"));
    }

    #[tokio::test]
    async fn output_path_matches_converter_contract() {
        // Cleanup removes `output_path`; it must be the same file the
        // engine reports producing.
        let dir = tempfile::tempdir().unwrap();
        let job = ConversionJob::stage(dir.path(), "report.docx", b"x")
            .await
            .unwrap();
        let expected = convert_engine::expected_pdf_path(&job.input_path, dir.path()).unwrap();
        assert_eq!(job.output_path, expected);
    }

    #[tokio::test]
    async fn stage_uses_unique_working_names() {
        let dir = tempfile::tempdir().unwrap();
        let a = ConversionJob::stage(dir.path(), "report.docx", b"one")
            .await
            .unwrap();
        let b = ConversionJob::stage(dir.path(), "report.docx", b"two")
            .await
            .unwrap();
        assert_ne!(a.input_path, b.input_path);
        assert_ne!(a.output_path, b.output_path);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Sanitized stems never contain path separators or header-breaking
        /// characters, whatever the caller sends.
        #[test]
        fn download_names_are_header_safe(name in ".{0,80}") {
            if let Ok((stem, ext)) = split_name(&name) {
                prop_assert!(!stem.is_empty());
                let header_safe = stem.chars().all(|c| {
                    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
                });
                prop_assert!(header_safe);
                prop_assert!(!ext.is_empty());
                prop_assert_eq!(ext.clone(), ext.to_ascii_lowercase());
            }
        }

        /// Extensions never smuggle a path separator into a working filename
        #[test]
        fn extensions_hold_no_separators(name in ".{1,80}\\.docx") {
            if let Ok((_, ext)) = split_name(&name) {
                prop_assert!(!ext.contains('/'));
            }
        }
    }
}
