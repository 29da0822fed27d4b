//! Package-level orchestration: locate the target parts, run the policies,
//! write a new package.

use crate::container::PackageArchive;
use crate::detect::{check_signature, declares_word_document};
use crate::error::{Error, Result};
use crate::policy::{DocumentSectionApplier, StylesPolicyApplier};
use crate::xml::XmlDocument;
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::HashMap;

/// Conventional path of the main document part.
pub const DOCUMENT_PART: &str = "word/document.xml";

/// Conventional path of the style-definitions part.
pub const STYLES_PART: &str = "word/styles.xml";

const REL_OFFICE_DOCUMENT: [&str; 2] = [
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument",
    "http://purl.oclc.org/ooxml/officeDocument/relationships/officeDocument",
];

const REL_STYLES: [&str; 2] = [
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles",
    "http://purl.oclc.org/ooxml/officeDocument/relationships/styles",
];

/// What happened to one of the target parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PartStatus {
    /// The package has no such part.
    Missing,
    /// The part exists but holds no XML content.
    Empty,
    /// The policy was applied and the part replaced.
    Rewritten,
    /// The part's root is not the expected element; it was copied as is.
    Skipped,
}

/// One target part and its status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartReport {
    pub path: String,
    pub status: PartStatus,
}

/// Summary of a package transformation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformReport {
    /// Number of entries in the package.
    pub entries: usize,
    pub styles: PartReport,
    pub document: PartReport,
    /// Style ids the styles policy normalized.
    pub normalized_styles: Vec<String>,
    /// A body-level section properties block was added.
    pub section_created: bool,
}

/// Output of [`PackageTransformer::transform`].
#[derive(Debug, Clone)]
pub struct Transformed {
    /// The new package.
    pub bytes: Vec<u8>,
    pub report: TransformReport,
}

/// Applies the formatting policy to a whole `.docx` package.
#[derive(Debug, Clone, Copy, Default)]
pub struct PackageTransformer {
    styles: StylesPolicyApplier,
    section: DocumentSectionApplier,
}

impl PackageTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transform a package held in memory.
    ///
    /// Either every target part is rewritten and the new package returned,
    /// or an error is returned and no output exists. A missing styles or
    /// document part is not an error; that stage is skipped.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use redoc::PackageTransformer;
    ///
    /// let data = std::fs::read("report.docx")?;
    /// let transformed = PackageTransformer::new().transform(&data)?;
    /// std::fs::write("report.formatted.docx", &transformed.bytes)?;
    /// # Ok::<(), redoc::Error>(())
    /// ```
    pub fn transform(&self, data: &[u8]) -> Result<Transformed> {
        check_signature(data)?;
        let package = PackageArchive::from_bytes(data.to_vec())?;

        if !declares_word_document(&package) {
            warn!("package content types declare no Word main document part");
        }

        let (document_path, styles_path) = locate_parts(&package);
        let mut replacements = HashMap::new();

        let styles_status = match load_part(&package, &styles_path)? {
            LoadedPart::Parsed(mut doc) => {
                let outcome = self.styles.apply(&mut doc.root);
                if outcome.applied {
                    store_part(&doc, &styles_path, &mut replacements)?;
                    (PartStatus::Rewritten, outcome.normalized_styles)
                } else {
                    (PartStatus::Skipped, Vec::new())
                }
            }
            LoadedPart::Missing => (PartStatus::Missing, Vec::new()),
            LoadedPart::Empty => (PartStatus::Empty, Vec::new()),
        };

        let document_status = match load_part(&package, &document_path)? {
            LoadedPart::Parsed(mut doc) => {
                let outcome = self.section.apply(&mut doc.root);
                if outcome.applied {
                    store_part(&doc, &document_path, &mut replacements)?;
                    (PartStatus::Rewritten, outcome.section_created)
                } else {
                    (PartStatus::Skipped, false)
                }
            }
            LoadedPart::Missing => (PartStatus::Missing, false),
            LoadedPart::Empty => (PartStatus::Empty, false),
        };

        let bytes = if replacements.is_empty() {
            data.to_vec()
        } else {
            package.rewrite(&replacements)?
        };

        let report = TransformReport {
            entries: package.len(),
            styles: PartReport {
                path: styles_path,
                status: styles_status.0,
            },
            document: PartReport {
                path: document_path,
                status: document_status.0,
            },
            normalized_styles: styles_status.1,
            section_created: document_status.1,
        };

        info!(
            "formatted package: {} entries, styles {:?}, document {:?}, {} styles normalized",
            report.entries,
            report.styles.status,
            report.document.status,
            report.normalized_styles.len()
        );

        Ok(Transformed { bytes, report })
    }
}

enum LoadedPart {
    Missing,
    Empty,
    Parsed(XmlDocument),
}

fn load_part(package: &PackageArchive, path: &str) -> Result<LoadedPart> {
    let Some(xml) = package.read_xml(path)? else {
        debug!("{} not present", path);
        return Ok(LoadedPart::Missing);
    };
    if xml.trim().is_empty() {
        debug!("{} is empty", path);
        return Ok(LoadedPart::Empty);
    }
    XmlDocument::parse(&xml)
        .map(LoadedPart::Parsed)
        .map_err(|e| e.in_part(path))
}

fn store_part(
    doc: &XmlDocument,
    path: &str,
    replacements: &mut HashMap<String, String>,
) -> Result<()> {
    let xml = doc.to_xml().map_err(|e| match e {
        Error::XmlParse(message) => Error::Unexpected(message),
        other => other,
    })?;
    debug!("rewrote {} ({} bytes)", path, xml.len());
    replacements.insert(path.to_string(), xml);
    Ok(())
}

/// Find the main document and style parts through the package
/// relationships, falling back to the conventional paths.
fn locate_parts(package: &PackageArchive) -> (String, String) {
    let package_rels = package.read_package_relationships();
    let document = REL_OFFICE_DOCUMENT
        .iter()
        .find_map(|rel_type| package_rels.first_internal(rel_type))
        .map(|rel| PackageArchive::resolve_path("", &rel.target))
        .filter(|path| package.exists(path))
        .unwrap_or_else(|| DOCUMENT_PART.to_string());

    let document_rels = package.read_relationships(&document);
    let styles = REL_STYLES
        .iter()
        .find_map(|rel_type| document_rels.first_internal(rel_type))
        .map(|rel| PackageArchive::resolve_path(&document, &rel.target))
        .filter(|path| package.exists(path))
        .unwrap_or_else(|| STYLES_PART.to_string());

    (document, styles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;

    fn package(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(data.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_locate_parts_defaults() {
        let data = package(&[("word/document.xml", "<w:document/>")]);
        let archive = PackageArchive::from_bytes(data).unwrap();
        assert_eq!(
            locate_parts(&archive),
            (DOCUMENT_PART.to_string(), STYLES_PART.to_string())
        );
    }

    #[test]
    fn test_locate_parts_through_relationships() {
        let package_rels = format!(
            r#"<Relationships><Relationship Id="rId1" Type="{}" Target="/word/main.xml"/></Relationships>"#,
            REL_OFFICE_DOCUMENT[0]
        );
        let document_rels = format!(
            r#"<Relationships><Relationship Id="rId1" Type="{}" Target="theme/styles2.xml"/></Relationships>"#,
            REL_STYLES[1]
        );
        let data = package(&[
            ("_rels/.rels", package_rels.as_str()),
            ("word/_rels/main.xml.rels", document_rels.as_str()),
            ("word/main.xml", "<w:document/>"),
            ("word/theme/styles2.xml", "<w:styles/>"),
        ]);
        let archive = PackageArchive::from_bytes(data).unwrap();
        assert_eq!(
            locate_parts(&archive),
            (
                "word/main.xml".to_string(),
                "word/theme/styles2.xml".to_string()
            )
        );
    }

    #[test]
    fn test_dangling_relationship_falls_back() {
        let package_rels = format!(
            r#"<Relationships><Relationship Id="rId1" Type="{}" Target="word/gone.xml"/></Relationships>"#,
            REL_OFFICE_DOCUMENT[0]
        );
        let data = package(&[("_rels/.rels", package_rels.as_str())]);
        let archive = PackageArchive::from_bytes(data).unwrap();
        assert_eq!(locate_parts(&archive).0, DOCUMENT_PART);
    }

    #[test]
    fn test_empty_and_skipped_parts() {
        let data = package(&[
            ("word/styles.xml", "  \n"),
            ("word/document.xml", "<w:hdr xmlns:w=\"w\"/>"),
        ]);
        let transformed = PackageTransformer::new().transform(&data).unwrap();
        assert_eq!(transformed.report.styles.status, PartStatus::Empty);
        assert_eq!(transformed.report.document.status, PartStatus::Skipped);
        assert_eq!(transformed.bytes, data);
    }
}
