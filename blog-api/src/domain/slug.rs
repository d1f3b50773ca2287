//! URL slugs for posts and categories.
//!
//! [`slugify`] is pure. Uniqueness is the caller's job: look the base slug up
//! in the store and fall back to [`with_random_suffix`] when it is taken. The
//! unique index on the slug column remains the real guarantee.

/// Number of hex characters appended to a colliding slug.
pub(crate) const SUFFIX_LEN: usize = 8;

/// Lower-cases `input`, turns whitespace runs into single hyphens and drops
/// everything outside `[a-z0-9-]`. The result never has leading, trailing or
/// doubled hyphens, and may be empty.
pub(crate) fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_hyphen = false;

    for ch in input.chars().flat_map(char::to_lowercase) {
        if ch.is_whitespace() || ch == '-' {
            pending_hyphen = true;
        } else if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch);
        }
    }

    slug
}

/// Appends `-` and [`SUFFIX_LEN`] random hex characters to `base`.
/// An empty base yields the bare suffix.
pub(crate) fn with_random_suffix(base: &str) -> String {
    let suffix = format!("{:08x}", rand::random::<u32>());
    if base.is_empty() {
        suffix
    } else {
        format!("{base}-{suffix}")
    }
}
