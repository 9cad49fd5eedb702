//! Key derivation: free text to a stable, human-readable slug.
//!
//! Canonical policy: NFD, drop combining marks, Unicode lowercase, keep
//! `[a-z0-9]`, whitespace and hyphens, then fold separators into single
//! hyphens. Text that leaves nothing behind gets a random `id-<hex>` key.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use super::NameKey;

/// Prefix of keys generated for text with no usable characters.
pub const FALLBACK_KEY_PREFIX: &str = "id-";

/// Derives the deduplication key for a name.
///
/// Deterministic for any input that contains at least one ASCII letter or
/// digit after diacritics are stripped. Purely symbolic input (`"???"`,
/// `"李"`) falls back to a random `id-<hex>` key, so the result is never
/// empty.
#[must_use]
pub fn derive_key(raw: &str) -> NameKey {
    let slug = slugify(raw);
    if slug.is_empty() {
        return NameKey::from_derived(fallback_key());
    }
    NameKey::from_derived(slug)
}

/// Deterministic part of [`derive_key`]. May return an empty string.
#[must_use]
pub fn slugify(raw: &str) -> String {
    let folded: String = raw
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase();

    let mut slug = String::with_capacity(folded.len());
    let mut pending_separator = false;
    for c in folded.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c);
        } else if c == '-' || c.is_whitespace() {
            pending_separator = true;
        }
        // anything else is dropped without acting as a separator
    }
    slug
}

fn fallback_key() -> String {
    format!("{FALLBACK_KEY_PREFIX}{:016x}", rand::random::<u64>())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_slug_shaped(key: &str) -> bool {
        !key.is_empty()
            && !key.starts_with('-')
            && !key.ends_with('-')
            && !key.contains("--")
            && key
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    }

    #[test]
    fn strips_diacritics_and_lowercases() {
        assert_eq!(derive_key("Anna Nováková").as_str(), "anna-novakova");
        assert_eq!(derive_key("ŽOFIE Šťastná").as_str(), "zofie-stastna");
        assert_eq!(derive_key("Renée Éluard").as_str(), "renee-eluard");
    }

    #[test]
    fn collapses_whitespace_and_hyphens() {
        assert_eq!(derive_key("anna   novakova").as_str(), "anna-novakova");
        assert_eq!(derive_key("  -Jean--Luc - Picard- ").as_str(), "jean-luc-picard");
        assert_eq!(derive_key("a\t\nb").as_str(), "a-b");
    }

    #[test]
    fn drops_symbols_without_splitting() {
        assert_eq!(derive_key("O'Brien").as_str(), "obrien");
        assert_eq!(derive_key("Tom (2.B)").as_str(), "tom-2b");
    }

    #[test]
    fn deterministic_for_identical_input() {
        for raw in ["Anna Nováková", "x", "Karel IV.", "ČEŇEK 3"] {
            assert_eq!(derive_key(raw), derive_key(raw));
            assert!(is_slug_shaped(derive_key(raw).as_str()));
        }
    }

    #[test]
    fn symbolic_input_falls_back_to_random_id() {
        let a = derive_key("???");
        let b = derive_key("???");
        assert!(a.as_str().starts_with(FALLBACK_KEY_PREFIX));
        assert!(a.as_str().len() > FALLBACK_KEY_PREFIX.len());
        assert_ne!(a, b);
        assert!(derive_key("李雷").as_str().starts_with(FALLBACK_KEY_PREFIX));
    }

    #[test]
    fn slugify_may_be_empty() {
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify("3.A"), "3a");
    }
}
