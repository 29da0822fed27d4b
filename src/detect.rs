//! Signature and content-type checks for Word packages.

use crate::container::PackageArchive;
use crate::error::{Error, Result};

/// OLE compound file magic, used by legacy `.doc` and by encrypted OOXML.
const OLE_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Content type for the DOCX main document part.
const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";

/// Content type prefix of the macro-enabled and template variants of the
/// main part.
const DOCX_CONTENT_TYPE_PREFIX: &str = "application/vnd.ms-word.";

/// Reject input that is certainly not a package before opening it.
///
/// OLE compound files get their own message, since they are the usual
/// culprit: a legacy `.doc` renamed to `.docx`, or a password-protected
/// document. Anything else is left to the ZIP reader, which also accepts
/// archives with leading bytes.
pub fn check_signature(data: &[u8]) -> Result<()> {
    if data.is_empty() {
        return Err(Error::InputMissing);
    }
    if data.starts_with(&OLE_MAGIC) {
        return Err(Error::MalformedPackage(
            "OLE compound file (legacy .doc or encrypted document) is not supported".to_string(),
        ));
    }
    Ok(())
}

/// Whether `[Content_Types].xml` declares a Word main document part.
pub fn declares_word_document(package: &PackageArchive) -> bool {
    match package.read_xml("[Content_Types].xml") {
        Ok(Some(content_types)) => {
            content_types.contains(DOCX_CONTENT_TYPE)
                || content_types.contains(DOCX_CONTENT_TYPE_PREFIX)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;

    fn package(entries: &[(&str, &str)]) -> PackageArchive {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(data.as_bytes()).unwrap();
        }
        PackageArchive::from_bytes(zip.finish().unwrap().into_inner()).unwrap()
    }

    #[test]
    fn test_check_signature() {
        assert!(matches!(check_signature(&[]), Err(Error::InputMissing)));
        assert!(matches!(
            check_signature(&OLE_MAGIC),
            Err(Error::MalformedPackage(msg)) if msg.contains("legacy .doc")
        ));
        assert!(check_signature(&[0x50, 0x4B, 0x03, 0x04, 0x14]).is_ok());
        // Left for the ZIP reader to judge.
        assert!(check_signature(b"\x00\x01\x02\x03PK\x03\x04").is_ok());
    }

    #[test]
    fn test_declares_word_document() {
        let content_types = format!(
            r#"<Types><Override PartName="/word/document.xml" ContentType="{}"/></Types>"#,
            DOCX_CONTENT_TYPE
        );
        let pkg = package(&[("[Content_Types].xml", content_types.as_str())]);
        assert!(declares_word_document(&pkg));

        let macro_enabled = r#"<Types><Override PartName="/word/document.xml" ContentType="application/vnd.ms-word.document.macroEnabled.main+xml"/></Types>"#;
        let pkg = package(&[("[Content_Types].xml", macro_enabled)]);
        assert!(declares_word_document(&pkg));

        let workbook = r#"<Types><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/></Types>"#;
        let pkg = package(&[("[Content_Types].xml", workbook)]);
        assert!(!declares_word_document(&pkg));

        let pkg = package(&[("word/document.xml", "<w:document/>")]);
        assert!(!declares_word_document(&pkg));
    }
}
