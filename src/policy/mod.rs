//! The fixed house formatting policy.
//!
//! Sizes are in half-points, spacing and margins in twentieths of a point
//! (twips), as WordprocessingML stores them.

mod section;
mod styles;

use crate::xml::Element;

pub use section::{DocumentSectionApplier, SectionOutcome};
pub use styles::{StylesOutcome, StylesPolicyApplier};

/// Typeface applied to the ASCII, high-ANSI and complex-script slots.
pub const TYPEFACE: &str = "Times New Roman";

/// Body text size: 12pt.
pub const BODY_SIZE: u32 = 24;

/// Line spacing in 240ths of a line: 1.15x single.
pub const LINE_SPACING: u32 = 276;

/// Line rule paired with [`LINE_SPACING`].
pub const LINE_RULE: &str = "auto";

/// Space before and after paragraphs.
pub const PARAGRAPH_SPACING: u32 = 0;

/// Style id of the body text style.
pub const BODY_STYLE_ID: &str = "Normal";

/// Heading style ids and their sizes: 16pt, 14pt, 12pt.
pub const HEADING_SIZES: [(&str, u32); 3] = [("Heading1", 32), ("Heading2", 28), ("Heading3", 24)];

/// One inch.
pub const PAGE_MARGIN: u32 = 1440;

/// Half an inch.
pub const HEADER_FOOTER_MARGIN: u32 = 720;

pub const GUTTER: u32 = 0;

/// Size of the heading style with the given id.
pub fn heading_size(style_id: &str) -> Option<u32> {
    HEADING_SIZES
        .iter()
        .find(|(id, _)| *id == style_id)
        .map(|(_, size)| *size)
}

/// Qualifies local names with the namespace prefix of a part's root, so
/// created elements and attributes match the part's own naming.
pub(crate) struct Names {
    prefix: Option<String>,
}

impl Names {
    pub(crate) fn of(root: &Element) -> Self {
        Self {
            prefix: root.prefix().map(str::to_string),
        }
    }

    pub(crate) fn get(&self, local: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:{}", prefix, local),
            None => local.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_size() {
        assert_eq!(heading_size("Heading1"), Some(32));
        assert_eq!(heading_size("Heading2"), Some(28));
        assert_eq!(heading_size("Heading3"), Some(24));
        assert_eq!(heading_size("Heading4"), None);
        assert_eq!(heading_size("heading1"), None);
    }
}
