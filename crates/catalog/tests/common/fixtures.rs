//! Catalog record fixtures.
//!
//! Builders start from an approved, non-adult, non-kids entry so each test
//! only spells out what it is about.

use serde_json::Value;

use catalog_query::model::{
    AnimeDocument, AnimeRating, AnimeStatus, AnimeType, Broadcast, MangaDocument,
    MangaStatus, MangaType, RelationEntry, categories,
};

/// An anime record builder.
#[derive(Debug, Clone)]
pub struct AnimeFixture {
    doc: AnimeDocument,
}

impl AnimeFixture {
    /// A finished, PG-13 TV series.
    pub fn new(mal_id: i64, title: impl Into<String>) -> Self {
        Self {
            doc: AnimeDocument {
                mal_id,
                url: format!("https://myanimelist.net/anime/{}", mal_id),
                title: title.into(),
                kind: Some(AnimeType::Tv.label().to_string()),
                status: Some(AnimeStatus::Complete.label().to_string()),
                rating: Some(AnimeRating::Pg13.label().to_string()),
                approved: Some(true),
                ..AnimeDocument::default()
            },
        }
    }

    /// Sets the media type.
    pub fn with_type(mut self, anime_type: AnimeType) -> Self {
        self.doc.kind = Some(anime_type.label().to_string());
        self
    }

    /// Sets the airing status; `Airing` also sets the airing flag.
    pub fn with_status(mut self, status: AnimeStatus) -> Self {
        self.doc.status = Some(status.label().to_string());
        self.doc.airing = status == AnimeStatus::Airing;
        self
    }

    /// Sets the audience rating.
    pub fn with_rating(mut self, rating: AnimeRating) -> Self {
        self.doc.rating = Some(rating.label().to_string());
        self
    }

    /// Sets the rank; `None` stores null.
    pub fn with_rank(mut self, rank: Option<i64>) -> Self {
        self.doc.rank = rank;
        self
    }

    /// Sets the score; `None` stores null.
    pub fn with_score(mut self, score: Option<f64>) -> Self {
        self.doc.score = score;
        self
    }

    /// Sets the episode count; `None` stores null.
    pub fn with_episodes(mut self, episodes: Option<i64>) -> Self {
        self.doc.episodes = episodes;
        self
    }

    /// Sets the member count.
    pub fn with_members(mut self, members: i64) -> Self {
        self.doc.members = members;
        self
    }

    /// Sets the favorite count.
    pub fn with_favorites(mut self, favorites: i64) -> Self {
        self.doc.favorites = favorites;
        self
    }

    /// Adds a genre.
    pub fn with_genre(mut self, mal_id: i64) -> Self {
        self.doc.genres.push(RelationEntry::new(mal_id, format!("genre {}", mal_id)));
        self
    }

    /// Adds a demographic.
    pub fn with_demographic(mut self, mal_id: i64) -> Self {
        self.doc
            .demographics
            .push(RelationEntry::new(mal_id, format!("demographic {}", mal_id)));
        self
    }

    /// Marks the entry as a kids title.
    pub fn for_kids(self) -> Self {
        self.with_demographic(categories::KIDS)
    }

    /// Adds a producer.
    pub fn with_producer(mut self, mal_id: i64) -> Self {
        self.doc
            .producers
            .push(RelationEntry::new(mal_id, format!("producer {}", mal_id)));
        self
    }

    /// Sets the first air date (ISO-8601 with offset).
    pub fn aired_from(mut self, from: impl Into<String>) -> Self {
        self.doc.aired.from = Some(from.into());
        self
    }

    /// Sets the last air date (ISO-8601 with offset).
    pub fn aired_to(mut self, to: impl Into<String>) -> Self {
        self.doc.aired.to = Some(to.into());
        self
    }

    /// Sets the broadcast display string.
    pub fn with_broadcast(mut self, string: impl Into<String>) -> Self {
        self.doc.broadcast = Broadcast {
            string: Some(string.into()),
            ..Broadcast::default()
        };
        self
    }

    /// Marks the entry as awaiting moderation.
    pub fn unapproved(mut self) -> Self {
        self.doc.approved = Some(false);
        self
    }

    /// The typed record.
    pub fn document(self) -> AnimeDocument {
        self.doc
    }

    /// The record as stored in the document store.
    pub fn build(self) -> Value {
        serde_json::to_value(self.doc).expect("anime fixture serializes")
    }
}

/// A manga record builder.
#[derive(Debug, Clone)]
pub struct MangaFixture {
    doc: MangaDocument,
}

impl MangaFixture {
    /// A finished manga.
    pub fn new(mal_id: i64, title: impl Into<String>) -> Self {
        Self {
            doc: MangaDocument {
                mal_id,
                url: format!("https://myanimelist.net/manga/{}", mal_id),
                title: title.into(),
                kind: Some(MangaType::Manga.label().to_string()),
                status: Some(MangaStatus::Complete.label().to_string()),
                approved: Some(true),
                ..MangaDocument::default()
            },
        }
    }

    /// Sets the publication type.
    pub fn with_type(mut self, manga_type: MangaType) -> Self {
        self.doc.kind = Some(manga_type.label().to_string());
        self
    }

    /// Sets the publishing status; `Publishing` also sets the publishing flag.
    pub fn with_status(mut self, status: MangaStatus) -> Self {
        self.doc.status = Some(status.label().to_string());
        self.doc.publishing = status == MangaStatus::Publishing;
        self
    }

    /// Sets the rank; `None` stores null.
    pub fn with_rank(mut self, rank: Option<i64>) -> Self {
        self.doc.rank = rank;
        self
    }

    /// Sets the member count.
    pub fn with_members(mut self, members: i64) -> Self {
        self.doc.members = members;
        self
    }

    /// Sets the favorite count.
    pub fn with_favorites(mut self, favorites: i64) -> Self {
        self.doc.favorites = favorites;
        self
    }

    /// Adds a genre.
    pub fn with_genre(mut self, mal_id: i64) -> Self {
        self.doc.genres.push(RelationEntry::new(mal_id, format!("genre {}", mal_id)));
        self
    }

    /// Adds a demographic.
    pub fn with_demographic(mut self, mal_id: i64) -> Self {
        self.doc
            .demographics
            .push(RelationEntry::new(mal_id, format!("demographic {}", mal_id)));
        self
    }

    /// Marks the entry as a kids title.
    pub fn for_kids(self) -> Self {
        self.with_demographic(categories::KIDS)
    }

    /// Adds a serializing magazine.
    pub fn serialized_in(mut self, mal_id: i64) -> Self {
        self.doc
            .serializations
            .push(RelationEntry::new(mal_id, format!("magazine {}", mal_id)));
        self
    }

    /// Sets the first publication date (ISO-8601 with offset).
    pub fn published_from(mut self, from: impl Into<String>) -> Self {
        self.doc.published.from = Some(from.into());
        self
    }

    /// Marks the entry as awaiting moderation.
    pub fn unapproved(mut self) -> Self {
        self.doc.approved = Some(false);
        self
    }

    /// The typed record.
    pub fn document(self) -> MangaDocument {
        self.doc
    }

    /// The record as stored in the document store.
    pub fn build(self) -> Value {
        serde_json::to_value(self.doc).expect("manga fixture serializes")
    }
}

/// A mixed anime catalog covering every content category.
pub fn anime_catalog() -> Vec<Value> {
    vec![
        AnimeFixture::new(1, "Cowboy Bebop")
            .with_rank(Some(40))
            .with_members(1_900_000)
            .with_favorites(80_000)
            .with_genre(1),
        AnimeFixture::new(2, "Adult Title")
            .with_rating(AnimeRating::Rx)
            .with_rank(Some(9000))
            .with_members(5_000),
        AnimeFixture::new(3, "Hentai Demographic")
            .with_demographic(12)
            .with_rank(Some(8000))
            .with_members(4_000),
        AnimeFixture::new(4, "Erotica Demographic")
            .with_demographic(49)
            .with_rank(None)
            .with_members(3_000),
        AnimeFixture::new(5, "Hentai Genre")
            .with_genre(12)
            .with_rank(Some(0))
            .with_members(2_000),
        AnimeFixture::new(6, "Pokemon")
            .for_kids()
            .with_rank(Some(2500))
            .with_members(900_000)
            .with_favorites(12_000),
        AnimeFixture::new(7, "Frieren")
            .with_status(AnimeStatus::Airing)
            .with_rank(Some(1))
            .with_members(1_000_000)
            .with_favorites(60_000)
            .with_broadcast("Fridays at 23:00 (JST)"),
        AnimeFixture::new(8, "Pending Review")
            .unapproved()
            .with_rank(Some(300))
            .with_members(10),
        AnimeFixture::new(9, "Unranked Special")
            .with_type(AnimeType::Special)
            .with_rank(None)
            .with_members(700),
        AnimeFixture::new(10, "Ecchi Tagged")
            .with_rating(AnimeRating::R)
            .with_genre(9)
            .with_rank(Some(5))
            .with_members(300_000),
    ]
    .into_iter()
    .map(AnimeFixture::build)
    .collect()
}
