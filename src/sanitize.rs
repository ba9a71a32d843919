use crate::config::Normalize;
use unicode_normalization::UnicodeNormalization;

pub const UNKNOWN_CANDIDATE: &str = "Unknown Candidate";

/// Single-line cleanup for a service-provided string field.
pub fn clean_text(cfg: &Normalize, s: &str) -> String {
    let s: String = if cfg.normalize_unicode {
        s.nfkc().collect()
    } else {
        s.to_string()
    };
    strip_control_chars(&s)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn clean_name(cfg: &Normalize, s: &str) -> String {
    let name = truncate_chars(&clean_text(cfg, s), cfg.max_item_chars);
    if name.is_empty() {
        UNKNOWN_CANDIDATE.to_string()
    } else {
        name
    }
}

pub fn clean_summary(cfg: &Normalize, s: &str) -> String {
    truncate_chars(&clean_text(cfg, s), cfg.max_summary_chars)
}

/// Cleans each item, drops the ones left empty, then bounds the list.
/// A `max_list_items` of 0 keeps every item.
pub fn clean_list(cfg: &Normalize, items: &[String]) -> Vec<String> {
    let limit = match cfg.max_list_items {
        0 => usize::MAX,
        n => n,
    };
    items
        .iter()
        .map(|item| truncate_chars(&clean_text(cfg, item), cfg.max_item_chars))
        .filter(|item| !item.is_empty())
        .take(limit)
        .collect()
}

// Whitespace controls survive so they still separate words.
fn strip_control_chars(s: &str) -> String {
    s.chars()
        .filter(|ch| !ch.is_control() || ch.is_whitespace())
        .collect()
}

pub fn truncate_chars(s: &str, max: usize) -> String {
    if max == 0 || s.chars().count() <= max {
        return s.to_string();
    }
    s.chars().take(max).collect::<String>().trim_end().to_string()
}
