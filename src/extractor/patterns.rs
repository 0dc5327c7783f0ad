//! Named match rules for Beehiiv boilerplate.
//!
//! Every phrase and tracking pattern lives here as an independently
//! testable predicate so the traversal logic in `cleaner` stays free of
//! regex details.

use once_cell::sync::Lazy;
use regex::Regex;

/// Template marker Beehiiv leaves behind in referral-program blocks.
pub const REFERRAL_MARKER: &str = "{{rp_";

/// Substrings of known open-tracking / analytics image URLs.
const TRACKING_SRC_SUBSTRINGS: &[&str] = &[
    "open.substack.com",
    "pixel",
    "track",
    "beacon",
    "email-analytics",
    "/o/",
    "sp.beehiiv.com",
];

static HIDDEN_STYLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)display\s*:\s*none").unwrap());

static BOILERPLATE_LINK_TEXT: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)subscribe",
        r"(?i)unsubscribe",
        r"(?i)share\s+(this|post|article)",
        r"(?i)read\s+(this\s+)?(online|in\s+browser|in\s+your\s+browser)",
        r"(?i)forward(ed)?\s+this",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static BOILERPLATE_CLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)share-links|social-links|subscribe-cta|referral|footer|email-footer").unwrap()
});

static FOOTER_TRIGGERS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)whenever you.re ready",
        r"(?i)ways? (we|I) can help you",
        r"(?i)what did you think of (today|this)",
        r"(?i)how did you like (today|this)",
        r"(?i)join \d[\d,]* (readers|subscribers|others)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static BOILERPLATE_IMAGE_SRC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(cta|footer|divider).*\.(png|jpg|gif)").unwrap());

/// Inline style hides the element entirely.
pub fn is_hidden_style(style: &str) -> bool {
    HIDDEN_STYLE.is_match(style)
}

/// A declared width or height of 0 or 1 marks an open-tracking pixel.
pub fn is_tracking_pixel_size(dim: &str) -> bool {
    matches!(dim, "0" | "1")
}

/// Image source points at a known tracking domain or beacon path.
pub fn is_tracking_src(src: &str) -> bool {
    TRACKING_SRC_SUBSTRINGS.iter().any(|t| src.contains(t))
}

/// Anchor text is a subscribe/share/read-online style prompt.
pub fn is_boilerplate_link_text(text: &str) -> bool {
    BOILERPLATE_LINK_TEXT.iter().any(|p| p.is_match(text))
}

/// Class attribute names a known Beehiiv boilerplate container.
pub fn is_boilerplate_class(class: &str) -> bool {
    BOILERPLATE_CLASS.is_match(class)
}

/// Text is one of the recurring end-of-newsletter CTA phrasings. Once
/// one of these appears, everything after it in the flow is footer.
pub fn is_footer_trigger(text: &str) -> bool {
    FOOTER_TRIGGERS.iter().any(|p| p.is_match(text))
}

/// Image filename follows the CTA/footer/divider naming convention.
pub fn is_boilerplate_image_src(src: &str) -> bool {
    BOILERPLATE_IMAGE_SRC.is_match(src)
}

/// Text node carries the referral-program template marker.
pub fn has_referral_marker(text: &str) -> bool {
    text.contains(REFERRAL_MARKER)
}
