//! Title simplification for the `*_transformed` index fields.

use once_cell::sync::Lazy;
use regex::Regex;

static PUNCTUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{N}\s]+").expect("valid punctuation pattern"));

/// Produces a search-friendly variant of a title.
///
/// The simplified variants are indexed next to the originals so that queries
/// typed without punctuation or casing still hit.
pub trait TitleSimplifier: Send + Sync {
    /// Simplifies one title.
    fn simplify(&self, title: &str) -> String;
}

/// Lowercases, replaces punctuation with spaces and collapses whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTitleSimplifier;

impl TitleSimplifier for DefaultTitleSimplifier {
    fn simplify(&self, title: &str) -> String {
        let lowered = title.to_lowercase();
        let stripped = PUNCTUATION.replace_all(&lowered, " ");
        stripped.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

impl<F> TitleSimplifier for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn simplify(&self, title: &str) -> String {
        self(title)
    }
}
