//! Page margin policy for the main document part (`word/document.xml`).

use super::{Names, GUTTER, HEADER_FOOTER_MARGIN, PAGE_MARGIN};
use crate::xml::Element;
use log::warn;
use serde::Serialize;

/// What the section policy did to a part.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SectionOutcome {
    /// The part had a document root and the policy ran.
    pub applied: bool,
    /// The body had no section properties and a block was added.
    pub section_created: bool,
}

/// Enforces the page margins of the body-level section.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentSectionApplier;

impl DocumentSectionApplier {
    pub fn new() -> Self {
        Self
    }

    /// Apply the margins to a `w:document` root.
    ///
    /// The final `w:sectPr` of the body is created when missing. Only its
    /// `w:pgMar` child is rewritten; page size, columns, header references
    /// and the like are kept. Paragraph-level section breaks are not touched.
    pub fn apply(&self, root: &mut Element) -> SectionOutcome {
        if !root.local_name().eq_ignore_ascii_case("document") {
            warn!(
                "document root is <{}>, not <document>; leaving it unchanged",
                root.name()
            );
            return SectionOutcome::default();
        }

        let names = Names::of(root);
        let section_tag = names.get("sectPr");
        let body = root.ensure_child(&names.get("body"));

        let existing = body.children_named(&section_tag).count();
        if existing > 1 {
            warn!(
                "body holds {} section property blocks; applying margins to the first",
                existing
            );
        }

        let section = body.ensure_child(&section_tag);
        let margin = PAGE_MARGIN.to_string();
        let header_footer = HEADER_FOOTER_MARGIN.to_string();
        let gutter = GUTTER.to_string();
        section.ensure_child(&names.get("pgMar")).replace_attrs([
            (names.get("top"), margin.as_str()),
            (names.get("right"), margin.as_str()),
            (names.get("bottom"), margin.as_str()),
            (names.get("left"), margin.as_str()),
            (names.get("header"), header_footer.as_str()),
            (names.get("footer"), header_footer.as_str()),
            (names.get("gutter"), gutter.as_str()),
        ]);

        SectionOutcome {
            applied: true,
            section_created: existing == 0,
        }
    }
}
