//! Slug derivation for posts.
//!
//! A slug is the URL-safe identifier a post is addressed by: lowercase ASCII
//! letters, digits, and single hyphens. [`slugify`] derives the base slug
//! from a title; uniqueness against the existing slug set is resolved by the
//! content service, which probes `base`, `base-2`, `base-3`, ... in
//! increasing order until a free value is found.

/// Longest base slug kept from a title. Numeric disambiguators may push the
/// final slug slightly past this, still well inside the 255-char column.
pub const MAX_SLUG_BASE_LEN: usize = 200;

/// Fallback base for titles with no ASCII alphanumerics at all.
const EMPTY_TITLE_SLUG: &str = "post";

/// Derive the base slug for a title.
///
/// ASCII letters are lowercased, digits kept, and every run of other ASCII
/// characters (whitespace, punctuation) collapses into a single hyphen.
/// Non-ASCII characters are dropped. Leading/trailing hyphens are stripped
/// and the result is truncated to [`MAX_SLUG_BASE_LEN`].
pub fn slugify(title: &str) -> String {
    let mut out = String::with_capacity(title.len().min(MAX_SLUG_BASE_LEN));
    let mut last_dash = false;

    for ch in title.chars() {
        if out.len() == MAX_SLUG_BASE_LEN {
            break;
        }
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if ch.is_ascii() && !last_dash && !out.is_empty() {
            out.push('-');
            last_dash = true;
        }
    }

    while out.ends_with('-') {
        out.pop();
    }

    if out.is_empty() {
        EMPTY_TITLE_SLUG.to_string()
    } else {
        out
    }
}
