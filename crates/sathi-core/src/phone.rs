//! Phone number normalization.
//!
//! Destinations arrive as free-form user input ("+1 (555) 123-4567",
//! "01712-345678"). Everything except ASCII digits is stripped; a `+` survives
//! only as the first non-whitespace character.

/// Normalize a raw phone string to digits with an optional leading `+`.
///
/// Returns `None` when no digit remains.
pub fn normalize(raw: &str) -> Option<String> {
    let trimmed = raw.trim_start();
    let mut out = String::with_capacity(trimmed.len());
    if trimmed.starts_with('+') {
        out.push('+');
    }
    out.extend(trimmed.chars().filter(|c| c.is_ascii_digit()));

    if out.trim_start_matches('+').is_empty() {
        None
    } else {
        Some(out)
    }
}

/// Compare two raw numbers after normalization.
pub fn same_number(a: &str, b: &str) -> bool {
    match (normalize(a), normalize(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
