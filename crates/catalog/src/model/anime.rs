use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::schema::searchable::{Titles, relation_ids, timestamp};
use crate::schema::{ANIME_SCHEMA, IndexSchema, Searchable, TitleSimplifier};

use super::{DateRange, RelationEntry, label_enum};

label_enum! {
    /// Anime media type.
    AnimeType("type") {
        /// Television series.
        Tv => ("TV", "tv"),
        /// Theatrical film.
        Movie => ("Movie", "movie"),
        /// Original video animation.
        Ova => ("OVA", "ova"),
        /// Special episode.
        Special => ("Special", "special"),
        /// Original net animation.
        Ona => ("ONA", "ona"),
        /// Music video.
        Music => ("Music", "music"),
        /// Commercial.
        Cm => ("CM", "cm"),
        /// Promotional video.
        Pv => ("PV", "pv"),
        /// Television special.
        TvSpecial => ("TV Special", "tv_special"),
    }
}

label_enum! {
    /// Airing status.
    AnimeStatus("status") {
        /// Currently on air.
        Airing => ("Currently Airing", "airing"),
        /// Finished airing.
        Complete => ("Finished Airing", "complete"),
        /// Announced but not aired yet.
        Upcoming => ("Not yet aired", "upcoming"),
    }
}

label_enum! {
    /// Audience rating.
    AnimeRating("rating") {
        /// All ages.
        G => ("G - All Ages", "g"),
        /// Children.
        Pg => ("PG - Children", "pg"),
        /// Teens 13 or older.
        Pg13 => ("PG-13 - Teens 13 or older", "pg13"),
        /// 17+.
        R17 => ("R - 17+ (violence & profanity)", "r17"),
        /// Mild nudity.
        R => ("R+ - Mild Nudity", "r"),
        /// Adult.
        Rx => ("Rx - Hentai", "rx"),
    }
}

label_enum! {
    /// Broadcast-day filter for the airing schedule.
    ScheduleFilter("filter") {
        /// Broadcast on Mondays.
        Monday => ("Mondays", "monday"),
        /// Broadcast on Tuesdays.
        Tuesday => ("Tuesdays", "tuesday"),
        /// Broadcast on Wednesdays.
        Wednesday => ("Wednesdays", "wednesday"),
        /// Broadcast on Thursdays.
        Thursday => ("Thursdays", "thursday"),
        /// Broadcast on Fridays.
        Friday => ("Fridays", "friday"),
        /// Broadcast on Saturdays.
        Saturday => ("Saturdays", "saturday"),
        /// Broadcast on Sundays.
        Sunday => ("Sundays", "sunday"),
        /// Irregular schedule.
        Other => ("Other", "other"),
        /// No broadcast information.
        Unknown => ("Unknown", "unknown"),
    }
}

impl ScheduleFilter {
    /// Returns true for the seven weekdays.
    ///
    /// Weekday labels are matched as a prefix of the broadcast string
    /// (`"Mondays at 01:00 (JST)"`); the others match it exactly.
    pub fn is_weekday(&self) -> bool {
        !matches!(self, ScheduleFilter::Other | ScheduleFilter::Unknown)
    }
}

/// Weekly broadcast slot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Broadcast {
    /// Day name (`"Mondays"`).
    pub day: Option<String>,
    /// Local time (`"01:00"`).
    pub time: Option<String>,
    /// IANA zone (`"Asia/Tokyo"`).
    pub timezone: Option<String>,
    /// Display string (`"Mondays at 01:00 (JST)"`).
    pub string: Option<String>,
}

/// A stored anime record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct AnimeDocument {
    pub mal_id: i64,
    pub url: String,
    pub title: String,
    pub title_english: Option<String>,
    pub title_japanese: Option<String>,
    pub title_synonyms: Vec<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub status: Option<String>,
    pub rating: Option<String>,
    pub airing: bool,
    pub episodes: Option<i64>,
    pub score: Option<f64>,
    pub scored_by: Option<i64>,
    pub rank: Option<i64>,
    pub popularity: Option<i64>,
    pub members: i64,
    pub favorites: i64,
    pub synopsis: Option<String>,
    pub approved: Option<bool>,
    pub aired: DateRange,
    pub broadcast: Broadcast,
    pub genres: Vec<RelationEntry>,
    pub explicit_genres: Vec<RelationEntry>,
    pub themes: Vec<RelationEntry>,
    pub demographics: Vec<RelationEntry>,
    pub producers: Vec<RelationEntry>,
    pub studios: Vec<RelationEntry>,
}

impl AnimeDocument {
    /// The media type, if the stored label is known.
    pub fn anime_type(&self) -> Option<AnimeType> {
        self.kind.as_deref().and_then(|k| k.parse().ok())
    }

    /// The airing status, if the stored label is known.
    pub fn anime_status(&self) -> Option<AnimeStatus> {
        self.status.as_deref().and_then(|s| s.parse().ok())
    }

    /// The rating, if the stored label is known.
    pub fn anime_rating(&self) -> Option<AnimeRating> {
        self.rating.as_deref().and_then(|r| r.parse().ok())
    }
}

impl Searchable for AnimeDocument {
    fn index_schema() -> &'static IndexSchema {
        &ANIME_SCHEMA
    }

    fn to_searchable_document(&self, simplifier: &dyn TitleSimplifier) -> Value {
        let mut doc = Map::new();
        doc.insert("id".into(), json!(self.mal_id.to_string()));
        doc.insert("mal_id".into(), json!(self.mal_id));
        doc.insert("start_date".into(), json!(timestamp(self.aired.from.as_deref())));
        doc.insert("end_date".into(), json!(timestamp(self.aired.to.as_deref())));

        Titles {
            title: &self.title,
            english: self.title_english.as_deref(),
            japanese: self.title_japanese.as_deref(),
            synonyms: &self.title_synonyms,
        }
        .write(&mut doc, simplifier);

        doc.insert("type".into(), json!(self.kind.as_deref().unwrap_or_default()));
        doc.insert("episodes".into(), json!(self.episodes.unwrap_or(0)));
        doc.insert("status".into(), json!(self.status.as_deref().unwrap_or_default()));
        doc.insert("rating".into(), json!(self.rating.as_deref().unwrap_or_default()));
        doc.insert("airing".into(), json!(self.airing));
        doc.insert("score".into(), json!(self.score.unwrap_or(0.0)));
        doc.insert("scored_by".into(), json!(self.scored_by.unwrap_or(0)));
        doc.insert("rank".into(), json!(self.rank.unwrap_or(0)));
        doc.insert("popularity".into(), json!(self.popularity.unwrap_or(0)));
        doc.insert("members".into(), json!(self.members));
        doc.insert("favorites".into(), json!(self.favorites));
        doc.insert("synopsis".into(), json!(self.synopsis.as_deref().unwrap_or_default()));
        doc.insert("approved".into(), json!(self.approved.unwrap_or(false)));
        doc.insert(
            "broadcast".into(),
            json!(self.broadcast.string.as_deref().unwrap_or_default()),
        );
        doc.insert("genres".into(), relation_ids(&self.genres));
        doc.insert("explicit_genres".into(), relation_ids(&self.explicit_genres));
        doc.insert("themes".into(), relation_ids(&self.themes));
        doc.insert("demographics".into(), relation_ids(&self.demographics));
        doc.insert("producers".into(), relation_ids(&self.producers));

        Value::Object(doc)
    }
}
