use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::schema::searchable::{Titles, relation_ids, timestamp};
use crate::schema::{IndexSchema, MANGA_SCHEMA, Searchable, TitleSimplifier};

use super::{DateRange, RelationEntry, label_enum};

label_enum! {
    /// Manga publication type.
    MangaType("type") {
        /// Japanese comic.
        Manga => ("Manga", "manga"),
        /// Prose novel.
        Novel => ("Novel", "novel"),
        /// Light novel.
        LightNovel => ("Light Novel", "lightnovel"),
        /// Single-chapter work.
        OneShot => ("One-shot", "oneshot"),
        /// Self-published work.
        Doujinshi => ("Doujinshi", "doujin"),
        /// Korean comic.
        Manhwa => ("Manhwa", "manhwa"),
        /// Chinese comic.
        Manhua => ("Manhua", "manhua"),
    }
}

label_enum! {
    /// Publishing status.
    MangaStatus("status") {
        /// Still being published.
        Publishing => ("Publishing", "publishing"),
        /// Publication finished.
        Complete => ("Finished", "complete"),
        /// Paused.
        Hiatus => ("On Hiatus", "hiatus"),
        /// Cancelled.
        Discontinued => ("Discontinued", "discontinued"),
        /// Announced but not published yet.
        Upcoming => ("Not yet published", "upcoming"),
    }
}

/// A stored manga record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct MangaDocument {
    pub mal_id: i64,
    pub url: String,
    pub title: String,
    pub title_english: Option<String>,
    pub title_japanese: Option<String>,
    pub title_synonyms: Vec<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub status: Option<String>,
    pub publishing: bool,
    pub chapters: Option<i64>,
    pub volumes: Option<i64>,
    pub score: Option<f64>,
    pub scored_by: Option<i64>,
    pub rank: Option<i64>,
    pub popularity: Option<i64>,
    pub members: i64,
    pub favorites: i64,
    pub synopsis: Option<String>,
    pub approved: Option<bool>,
    pub published: DateRange,
    pub genres: Vec<RelationEntry>,
    pub explicit_genres: Vec<RelationEntry>,
    pub themes: Vec<RelationEntry>,
    pub demographics: Vec<RelationEntry>,
    pub serializations: Vec<RelationEntry>,
    pub authors: Vec<RelationEntry>,
}

impl MangaDocument {
    /// The publication type, if the stored label is known.
    pub fn manga_type(&self) -> Option<MangaType> {
        self.kind.as_deref().and_then(|k| k.parse().ok())
    }

    /// The publishing status, if the stored label is known.
    pub fn manga_status(&self) -> Option<MangaStatus> {
        self.status.as_deref().and_then(|s| s.parse().ok())
    }
}

impl Searchable for MangaDocument {
    fn index_schema() -> &'static IndexSchema {
        &MANGA_SCHEMA
    }

    fn to_searchable_document(&self, simplifier: &dyn TitleSimplifier) -> Value {
        let mut doc = Map::new();
        doc.insert("id".into(), json!(self.mal_id.to_string()));
        doc.insert("mal_id".into(), json!(self.mal_id));
        doc.insert("start_date".into(), json!(timestamp(self.published.from.as_deref())));
        doc.insert("end_date".into(), json!(timestamp(self.published.to.as_deref())));

        Titles {
            title: &self.title,
            english: self.title_english.as_deref(),
            japanese: self.title_japanese.as_deref(),
            synonyms: &self.title_synonyms,
        }
        .write(&mut doc, simplifier);

        doc.insert("type".into(), json!(self.kind.as_deref().unwrap_or_default()));
        doc.insert("chapters".into(), json!(self.chapters.unwrap_or(0)));
        doc.insert("volumes".into(), json!(self.volumes.unwrap_or(0)));
        doc.insert("status".into(), json!(self.status.as_deref().unwrap_or_default()));
        doc.insert("publishing".into(), json!(self.publishing));
        doc.insert("score".into(), json!(self.score.unwrap_or(0.0)));
        doc.insert("scored_by".into(), json!(self.scored_by.unwrap_or(0)));
        doc.insert("rank".into(), json!(self.rank.unwrap_or(0)));
        doc.insert("popularity".into(), json!(self.popularity.unwrap_or(0)));
        doc.insert("members".into(), json!(self.members));
        doc.insert("favorites".into(), json!(self.favorites));
        doc.insert("synopsis".into(), json!(self.synopsis.as_deref().unwrap_or_default()));
        doc.insert("approved".into(), json!(self.approved.unwrap_or(false)));
        doc.insert("magazines".into(), relation_ids(&self.serializations));
        doc.insert("genres".into(), relation_ids(&self.genres));
        doc.insert("explicit_genres".into(), relation_ids(&self.explicit_genres));
        doc.insert("themes".into(), relation_ids(&self.themes));
        doc.insert("demographics".into(), relation_ids(&self.demographics));

        Value::Object(doc)
    }
}
