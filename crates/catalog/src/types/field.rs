//! Field references shared by both query backends.
//!
//! A [`Field`] names a value in the document store (a dotted path into the
//! stored record) and, when the value is mirrored into the search index, the
//! flattened name it is indexed under. The index side is checked against the
//! entity's [`IndexSchema`](crate::schema::IndexSchema) when a search request
//! is built.

use std::fmt;

/// A field that filters and sorts can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Field {
    path: &'static str,
    index_name: Option<&'static str>,
}

impl Field {
    /// A field that only exists in the document store.
    pub const fn stored(path: &'static str) -> Self {
        Self {
            path,
            index_name: None,
        }
    }

    /// A field stored under `path` and indexed as `index_name`.
    pub const fn indexed(path: &'static str, index_name: &'static str) -> Self {
        Self {
            path,
            index_name: Some(index_name),
        }
    }

    /// A field with the same name in both backends.
    pub const fn both(name: &'static str) -> Self {
        Self::indexed(name, name)
    }

    /// Dotted path in the stored document.
    pub const fn path(&self) -> &'static str {
        self.path
    }

    /// Name of the field in the search index, if it is indexed.
    pub const fn index_name(&self) -> Option<&'static str> {
        self.index_name
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path)
    }
}

/// Well-known catalog fields.
#[allow(missing_docs)]
pub mod fields {
    use super::Field;

    pub const MAL_ID: Field = Field::both("mal_id");
    pub const TITLE: Field = Field::both("title");
    pub const TYPE: Field = Field::both("type");
    pub const STATUS: Field = Field::both("status");
    pub const RATING: Field = Field::both("rating");
    pub const AIRING: Field = Field::both("airing");
    pub const PUBLISHING: Field = Field::both("publishing");
    pub const APPROVED: Field = Field::both("approved");
    pub const RANK: Field = Field::both("rank");
    pub const SCORE: Field = Field::both("score");
    pub const SCORED_BY: Field = Field::both("scored_by");
    pub const POPULARITY: Field = Field::both("popularity");
    pub const MEMBERS: Field = Field::both("members");
    pub const FAVORITES: Field = Field::both("favorites");
    pub const EPISODES: Field = Field::both("episodes");
    pub const CHAPTERS: Field = Field::both("chapters");
    pub const VOLUMES: Field = Field::both("volumes");

    pub const GENRE_IDS: Field = Field::indexed("genres.mal_id", "genres");
    pub const EXPLICIT_GENRE_IDS: Field = Field::indexed("explicit_genres.mal_id", "explicit_genres");
    pub const THEME_IDS: Field = Field::indexed("themes.mal_id", "themes");
    pub const DEMOGRAPHIC_IDS: Field = Field::indexed("demographics.mal_id", "demographics");
    pub const MAGAZINE_IDS: Field = Field::indexed("serializations.mal_id", "magazines");
    pub const PRODUCER_IDS: Field = Field::indexed("producers.mal_id", "producers");

    pub const AIRED_FROM: Field = Field::indexed("aired.from", "start_date");
    pub const AIRED_TO: Field = Field::indexed("aired.to", "end_date");
    pub const PUBLISHED_FROM: Field = Field::indexed("published.from", "start_date");
    pub const PUBLISHED_TO: Field = Field::indexed("published.to", "end_date");

    pub const BROADCAST: Field = Field::indexed("broadcast.string", "broadcast");
}
