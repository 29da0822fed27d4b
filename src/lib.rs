//! # redoc
//!
//! Normalize Word (`.docx`) documents to a fixed house formatting policy.
//!
//! The package is rewritten in place: the style definitions get a Times New
//! Roman 12pt default with 1.15 line spacing and fixed heading sizes, and the
//! body section gets one-inch page margins. Every other part of the archive
//! is copied untouched.
//!
//! ## Quick Start
//!
//! ```no_run
//! // File to file
//! let report = redoc::format_file("report.docx", "report.formatted.docx")?;
//! println!("Normalized styles: {:?}", report.normalized_styles);
//!
//! // In memory
//! let data = std::fs::read("report.docx")?;
//! let formatted = redoc::format_bytes(&data)?;
//! # Ok::<(), redoc::Error>(())
//! ```
//!
//! ## Policy parts
//!
//! ```
//! use redoc::policy::StylesPolicyApplier;
//! use redoc::xml::XmlDocument;
//!
//! let mut styles = XmlDocument::parse(r#"<w:styles xmlns:w="urn:w"><w:style w:styleId="Heading1"/></w:styles>"#)?;
//! let outcome = StylesPolicyApplier::new().apply(&mut styles.root);
//! assert_eq!(outcome.normalized_styles, vec!["Heading1"]);
//! # Ok::<(), redoc::Error>(())
//! ```
//!
//! ## Features
//!
//! - `async`: [`format_file_async`] with Tokio file I/O

pub mod container;
pub mod detect;
pub mod error;
pub mod policy;
pub mod transform;
pub mod xml;

// Re-exports
pub use container::PackageArchive;
pub use error::{Error, ErrorKind, Result};
pub use policy::{DocumentSectionApplier, StylesPolicyApplier};
pub use transform::{PackageTransformer, PartReport, PartStatus, TransformReport, Transformed};

use std::path::Path;

/// MIME type of a Word document package.
pub const DOCX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Suffix appended to the base name of a formatted document.
pub const FORMATTED_SUFFIX: &str = ".formatted.docx";

/// Format a package held in memory and return the new package.
///
/// # Example
///
/// ```no_run
/// let data = std::fs::read("document.docx")?;
/// let formatted = redoc::format_bytes(&data)?;
/// std::fs::write("document.formatted.docx", formatted)?;
/// # Ok::<(), redoc::Error>(())
/// ```
pub fn format_bytes(data: &[u8]) -> Result<Vec<u8>> {
    PackageTransformer::new()
        .transform(data)
        .map(|transformed| transformed.bytes)
}

/// Format the package at `input` and write the result to `output`.
///
/// Nothing is written when the transformation fails.
pub fn format_file(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<TransformReport> {
    let data = std::fs::read(input.as_ref())?;
    let transformed = PackageTransformer::new().transform(&data)?;
    std::fs::write(output.as_ref(), &transformed.bytes)?;
    Ok(transformed.report)
}

/// Async variant of [`format_file`]; the transformation runs on the blocking
/// pool.
#[cfg(feature = "async")]
pub async fn format_file_async(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> Result<TransformReport> {
    let data = tokio::fs::read(input.as_ref()).await?;
    let transformed =
        tokio::task::spawn_blocking(move || PackageTransformer::new().transform(&data))
            .await
            .map_err(|e| Error::Unexpected(format!("transform task failed: {}", e)))??;
    tokio::fs::write(output.as_ref(), &transformed.bytes).await?;
    Ok(transformed.report)
}

/// Name for the formatted copy of `original`: its base name without a
/// trailing `.docx`, plus [`FORMATTED_SUFFIX`].
///
/// ```
/// assert_eq!(redoc::formatted_file_name("uploads/Report.DOCX"), "Report.formatted.docx");
/// ```
pub fn formatted_file_name(original: &str) -> String {
    let base = Path::new(original)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let stem = match base.len().checked_sub(5).and_then(|at| base.get(at..)) {
        Some(ext) if ext.eq_ignore_ascii_case(".docx") => &base[..base.len() - 5],
        _ => base.as_str(),
    };

    if stem.is_empty() {
        "formatted.docx".to_string()
    } else {
        format!("{}{}", stem, FORMATTED_SUFFIX)
    }
}
