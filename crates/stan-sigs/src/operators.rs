//! Display names for operators written with LaTeX escapes.
//!
//! Older chapters of the functions reference escape the operator symbol in
//! signature comments (`operator\*`). The flat signature table lists the
//! symbol itself. Lookup is by whole name, so one rule can never rewrite the
//! output of another.

/// `(raw name as written in the comment, display name)`
pub const OPERATOR_NAMES: &[(&str, &str)] = &[
    (r"operator\!", "operator!"),
    (r"operator\*", "operator*"),
    (r"operator\%", "operator%"),
    (r"operator\%/\%", "operator%/%"),
    (r"operator\'", "operator'"),
    (r"operator\^", "operator^"),
    (r"operator\\", r"operator\"),
    (r"operator.\*", "operator.*"),
    (r"operator.\^", "operator.^"),
    (r"operator\&\&", "operator&&"),
];

/// Display form of a signature name; names outside the table pass through.
pub fn display_name(raw: &str) -> &str {
    OPERATOR_NAMES
        .iter()
        .find(|(escaped, _)| *escaped == raw)
        .map(|(_, display)| *display)
        .unwrap_or(raw)
}
