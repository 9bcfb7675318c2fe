use regex::Regex;
use std::sync::LazyLock;

/// Glyphs used to pad and align cells in declaration reports.
pub const SEPARATORS: [char; 4] = [' ', '|', '-', ','];

static CAS_TWO_PART: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+-\d+$").expect("valid CAS regex"));

static CAS_THREE_PART: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+-\d+-\d+$").expect("valid CAS regex"));

/// True iff `s` is a single decimal digit, the nesting depth marker of a leveled row.
pub fn is_level_marker(s: &str) -> bool {
    let mut chars = s.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_ascii_digit())
}

/// True iff the whole of `s` has the shape `digits-digits` or `digits-digits-digits`.
pub fn is_cas_shaped(s: &str) -> bool {
    CAS_TWO_PART.is_match(s) || CAS_THREE_PART.is_match(s)
}

/// Trim alignment separators from both ends of a cell.
pub fn strip_separators(s: &str) -> &str {
    s.trim_matches(&SEPARATORS[..])
}

/// Parse a level marker into its depth.
pub fn level_of(s: &str) -> Option<u8> {
    if !is_level_marker(s) {
        return None;
    }
    s.chars().next()?.to_digit(10).map(|d| d as u8)
}
