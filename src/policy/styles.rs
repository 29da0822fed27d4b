//! Policy for the style-definitions part (`word/styles.xml`).

use super::{
    heading_size, Names, BODY_SIZE, BODY_STYLE_ID, LINE_RULE, LINE_SPACING, PARAGRAPH_SPACING,
    TYPEFACE,
};
use crate::xml::Element;
use log::{debug, warn};
use serde::Serialize;

/// Font attribute slots set to the policy typeface.
const FONT_SLOTS: [&str; 3] = ["ascii", "hAnsi", "cs"];

/// What the styles policy did to a part.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StylesOutcome {
    /// The part had a styles root and the policy ran.
    pub applied: bool,
    /// Ids of the styles that were normalized, in document order.
    pub normalized_styles: Vec<String>,
}

/// Sets document defaults and normalizes the body and heading styles.
#[derive(Debug, Clone, Copy, Default)]
pub struct StylesPolicyApplier;

impl StylesPolicyApplier {
    pub fn new() -> Self {
        Self
    }

    /// Apply the policy to a `w:styles` root.
    ///
    /// Styles other than the body style and the three heading levels, and
    /// styles without a `w:styleId`, are left untouched. Running the policy
    /// again on its own output changes nothing.
    pub fn apply(&self, root: &mut Element) -> StylesOutcome {
        if !root.local_name().eq_ignore_ascii_case("styles") {
            warn!(
                "style definitions root is <{}>, not <styles>; leaving it unchanged",
                root.name()
            );
            return StylesOutcome::default();
        }

        let names = Names::of(root);
        apply_doc_defaults(root, &names);

        let style_tag = names.get("style");
        let style_id = names.get("styleId");
        let mut normalized_styles = Vec::new();

        for style in root.children_named_mut(&style_tag) {
            let Some(id) = style.attr(&style_id).map(|id| id.into_owned()) else {
                continue;
            };

            // Matched on id alone, whatever the declared w:type.
            if id == BODY_STYLE_ID {
                let rpr = style.ensure_child(&names.get("rPr"));
                set_typeface(rpr, &names);
                set_size(rpr, &names, BODY_SIZE);
                set_spacing(style.ensure_child(&names.get("pPr")), &names);
            } else if let Some(size) = heading_size(&id) {
                let rpr = style.ensure_child(&names.get("rPr"));
                set_typeface(rpr, &names);
                set_size(rpr, &names, size);
                set_bold(rpr, &names);
            } else {
                continue;
            }

            debug!("normalized style {}", id);
            normalized_styles.push(id);
        }

        StylesOutcome {
            applied: true,
            normalized_styles,
        }
    }
}

fn apply_doc_defaults(root: &mut Element, names: &Names) {
    let defaults = names.get("docDefaults");

    let rpr = root.ensure_path(&[
        defaults.clone(),
        names.get("rPrDefault"),
        names.get("rPr"),
    ]);
    set_typeface(rpr, names);
    set_size(rpr, names, BODY_SIZE);

    let ppr = root.ensure_path(&[defaults, names.get("pPrDefault"), names.get("pPr")]);
    set_spacing(ppr, names);
}

fn set_typeface(rpr: &mut Element, names: &Names) {
    let fonts = rpr.ensure_child(&names.get("rFonts"));
    for slot in FONT_SLOTS {
        fonts.set_attr(&names.get(slot), TYPEFACE);
    }
}

fn set_size(rpr: &mut Element, names: &Names, half_points: u32) {
    let size = half_points.to_string();
    for tag in ["sz", "szCs"] {
        rpr.ensure_child(&names.get(tag))
            .replace_attrs([(names.get("val"), size.as_str())]);
    }
}

/// A bare `w:b` is bold on; any `w:val` it carried is dropped.
fn set_bold(rpr: &mut Element, names: &Names) {
    rpr.ensure_child(&names.get("b"))
        .replace_attrs(std::iter::empty::<(&str, &str)>());
}

fn set_spacing(ppr: &mut Element, names: &Names) {
    let line = LINE_SPACING.to_string();
    let gap = PARAGRAPH_SPACING.to_string();
    ppr.ensure_child(&names.get("spacing")).replace_attrs([
        (names.get("line"), line.as_str()),
        (names.get("lineRule"), LINE_RULE),
        (names.get("before"), gap.as_str()),
        (names.get("after"), gap.as_str()),
    ]);
}
