//! Child element order for the WordprocessingML containers the policy edits.
//!
//! The schema declares most property containers as `xsd:sequence`, and Word
//! rejects parts whose children are out of order. New children are therefore
//! inserted at their sequence position rather than appended.

const STYLES: &[&str] = &["docDefaults", "latentStyles", "style"];

const DOC_DEFAULTS: &[&str] = &["rPrDefault", "pPrDefault"];

const STYLE: &[&str] = &[
    "name",
    "aliases",
    "basedOn",
    "next",
    "link",
    "autoRedefine",
    "hidden",
    "uiPriority",
    "semiHidden",
    "unhideWhenUsed",
    "qFormat",
    "locked",
    "personal",
    "personalCompose",
    "personalReply",
    "rsid",
    "pPr",
    "rPr",
    "tblPr",
    "trPr",
    "tcPr",
    "tblStylePr",
];

const PARAGRAPH_PROPERTIES: &[&str] = &[
    "pStyle",
    "keepNext",
    "keepLines",
    "pageBreakBefore",
    "framePr",
    "widowControl",
    "numPr",
    "suppressLineNumbers",
    "pBdr",
    "shd",
    "tabs",
    "suppressAutoHyphens",
    "kinsoku",
    "wordWrap",
    "overflowPunct",
    "topLinePunct",
    "autoSpaceDE",
    "autoSpaceDN",
    "bidi",
    "adjustRightInd",
    "snapToGrid",
    "spacing",
    "ind",
    "contextualSpacing",
    "mirrorIndents",
    "suppressOverlap",
    "jc",
    "textDirection",
    "textAlignment",
    "textboxTightWrap",
    "outlineLvl",
    "divId",
    "cnfStyle",
    "rPr",
    "sectPr",
    "pPrChange",
];

const RUN_PROPERTIES: &[&str] = &[
    "rStyle",
    "rFonts",
    "b",
    "bCs",
    "i",
    "iCs",
    "caps",
    "smallCaps",
    "strike",
    "dstrike",
    "outline",
    "shadow",
    "emboss",
    "imprint",
    "noProof",
    "snapToGrid",
    "vanish",
    "webHidden",
    "color",
    "spacing",
    "w",
    "kern",
    "position",
    "sz",
    "szCs",
    "highlight",
    "u",
    "effect",
    "bdr",
    "shd",
    "fitText",
    "vertAlign",
    "rtl",
    "cs",
    "em",
    "lang",
    "eastAsianLayout",
    "specVanish",
    "oMath",
];

const DOCUMENT: &[&str] = &["background", "body"];

const SECTION_PROPERTIES: &[&str] = &[
    "headerReference",
    "footerReference",
    "footnotePr",
    "endnotePr",
    "type",
    "pgSz",
    "pgMar",
    "paperSrc",
    "pgBorders",
    "lnNumType",
    "pgNumType",
    "cols",
    "formProt",
    "vAlign",
    "noEndnote",
    "titlePg",
    "textDirection",
    "bidi",
    "rtlGutter",
    "docGrid",
    "printerSettings",
    "sectPrChange",
];

fn sequence(parent: &str) -> Option<&'static [&'static str]> {
    match parent {
        "styles" => Some(STYLES),
        "docDefaults" => Some(DOC_DEFAULTS),
        "style" => Some(STYLE),
        "pPr" => Some(PARAGRAPH_PROPERTIES),
        "rPr" => Some(RUN_PROPERTIES),
        "document" => Some(DOCUMENT),
        "sectPr" => Some(SECTION_PROPERTIES),
        _ => None,
    }
}

/// Position of `child` within the content sequence of `parent`, both given
/// as local names. `None` when either is unknown.
pub fn rank(parent: &str, child: &str) -> Option<usize> {
    sequence(parent)?.iter().position(|name| *name == child)
}
