//! Catalog records and their label vocabularies.
//!
//! Stored documents carry human-readable labels (`"Currently Airing"`,
//! `"Rx - Hentai"`); request parameters use short API values (`airing`, `rx`).
//! The enums here map one onto the other, and filters always compare against
//! the label.

mod anime;
mod manga;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::QueryError;
use crate::query::Predicate;
use crate::schema::{ANIME_SCHEMA, IndexSchema, MANGA_SCHEMA};
use crate::types::{Field, fields};

pub use anime::{AnimeDocument, AnimeRating, AnimeStatus, AnimeType, Broadcast, ScheduleFilter};
pub use manga::{MangaDocument, MangaStatus, MangaType};

/// Declares an enum of stored labels with their API spellings.
///
/// Parsing accepts either spelling, case-insensitively.
macro_rules! label_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($parameter:literal) {
            $( $(#[$vmeta:meta])* $variant:ident => ($label:literal, $api:literal) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The label stored in catalog documents.
            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            /// The spelling used in request parameters.
            pub fn api_value(&self) -> &'static str {
                match self {
                    $($name::$variant => $api),+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.label())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::error::QueryError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let needle = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| {
                        v.api_value().eq_ignore_ascii_case(needle)
                            || v.label().eq_ignore_ascii_case(needle)
                    })
                    .ok_or_else(|| {
                        $crate::error::QueryError::invalid(
                            $parameter,
                            format!("unknown value '{}'", needle),
                        )
                    })
            }
        }

        impl From<$name> for $crate::types::FieldValue {
            fn from(value: $name) -> Self {
                $crate::types::FieldValue::Str(value.label().to_string())
            }
        }
    };
}

pub(crate) use label_enum;

/// Category ids referenced by the content filters.
pub mod categories {
    /// The "Hentai" genre and demographic.
    pub const HENTAI: i64 = 12;
    /// The "Erotica" demographic.
    pub const EROTICA: i64 = 49;
    /// The "Kids" demographic.
    pub const KIDS: i64 = 15;
}

/// A relation to another catalog entry (genre, producer, magazine, ...).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationEntry {
    /// Id of the related entry.
    pub mal_id: i64,
    /// Relation type (`anime`, `manga`, `people`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Display name.
    pub name: String,
    /// Canonical URL.
    pub url: String,
}

impl RelationEntry {
    /// Creates an entry with only an id and name.
    pub fn new(mal_id: i64, name: impl Into<String>) -> Self {
        Self {
            mal_id,
            name: name.into(),
            ..Self::default()
        }
    }
}

/// A start/end pair of ISO-8601 dates.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DateRange {
    /// Start date.
    pub from: Option<String>,
    /// End date.
    pub to: Option<String>,
}

/// The two catalog entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Anime series and films.
    Anime,
    /// Manga and novels.
    Manga,
}

impl MediaKind {
    /// Lowercase entity name.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Anime => "anime",
            MediaKind::Manga => "manga",
        }
    }

    /// The entity's index declaration.
    pub fn schema(&self) -> &'static IndexSchema {
        match self {
            MediaKind::Anime => &ANIME_SCHEMA,
            MediaKind::Manga => &MANGA_SCHEMA,
        }
    }

    /// Collection name used when none is configured.
    pub fn default_collection(&self) -> &'static str {
        self.schema().name
    }

    /// Start of the airing or publishing range.
    pub fn start_date_field(&self) -> Field {
        match self {
            MediaKind::Anime => fields::AIRED_FROM,
            MediaKind::Manga => fields::PUBLISHED_FROM,
        }
    }

    /// End of the airing or publishing range.
    pub fn end_date_field(&self) -> Field {
        match self {
            MediaKind::Anime => fields::AIRED_TO,
            MediaKind::Manga => fields::PUBLISHED_TO,
        }
    }

    /// Producers for anime, serializing magazines for manga.
    pub fn relation_field(&self) -> Field {
        match self {
            MediaKind::Anime => fields::PRODUCER_IDS,
            MediaKind::Manga => fields::MAGAZINE_IDS,
        }
    }

    /// The conjunction of negations that removes adult entries.
    pub fn adult_exclusions(&self) -> Vec<Predicate> {
        let marker = match self {
            MediaKind::Anime => Predicate::Ne(fields::RATING, AnimeRating::Rx.into()),
            MediaKind::Manga => Predicate::Ne(fields::TYPE, MangaType::Doujinshi.into()),
        };
        vec![
            marker,
            Predicate::Ne(fields::DEMOGRAPHIC_IDS, categories::HENTAI.into()),
            Predicate::Ne(fields::DEMOGRAPHIC_IDS, categories::EROTICA.into()),
            Predicate::Ne(fields::GENRE_IDS, categories::HENTAI.into()),
        ]
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "anime" => Ok(MediaKind::Anime),
            "manga" => Ok(MediaKind::Manga),
            other => Err(QueryError::invalid(
                "entity",
                format!("unknown entity '{}'", other),
            )),
        }
    }
}
