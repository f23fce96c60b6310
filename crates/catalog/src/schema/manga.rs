//! Search-index declaration for manga.

use crate::query::SortDirection;

use super::{FieldKind, IndexField, IndexSchema, QueryByField, SortField, TEXT_MATCH};

/// The manga collection schema.
pub static MANGA_SCHEMA: IndexSchema = IndexSchema {
    name: "manga",
    fields: &[
        IndexField::new(".*", FieldKind::Auto),
        IndexField::new("title", FieldKind::String).infix().sortable(),
        IndexField::new("title_transformed", FieldKind::String).infix().sortable(),
        IndexField::new("title_japanese", FieldKind::String)
            .optional()
            .locale("jp")
            .infix(),
        IndexField::new("title_japanese_transformed", FieldKind::String)
            .optional()
            .locale("jp")
            .infix(),
        IndexField::new("title_english", FieldKind::String)
            .optional()
            .infix()
            .sortable(),
        IndexField::new("title_english_transformed", FieldKind::String)
            .optional()
            .infix()
            .sortable(),
        IndexField::new("title_synonyms", FieldKind::StringArray)
            .optional()
            .infix(),
        IndexField::new("mal_id", FieldKind::Int64).sortable(),
        IndexField::new("type", FieldKind::String).facet(),
        IndexField::new("status", FieldKind::String).facet(),
        IndexField::new("publishing", FieldKind::Bool).facet(),
        IndexField::new("approved", FieldKind::Bool).facet(),
        IndexField::new("chapters", FieldKind::Int32).sortable().zero_when_absent(),
        IndexField::new("volumes", FieldKind::Int32).sortable().zero_when_absent(),
        IndexField::new("score", FieldKind::Float).sortable().zero_when_absent(),
        IndexField::new("scored_by", FieldKind::Int32).sortable().zero_when_absent(),
        IndexField::new("rank", FieldKind::Int32).sortable().zero_when_absent(),
        IndexField::new("popularity", FieldKind::Int32).sortable().zero_when_absent(),
        IndexField::new("members", FieldKind::Int32).sortable(),
        IndexField::new("favorites", FieldKind::Int32).sortable(),
        IndexField::new("start_date", FieldKind::Int64).sortable().zero_when_absent(),
        IndexField::new("end_date", FieldKind::Int64).sortable().zero_when_absent(),
        IndexField::new("genres", FieldKind::Int64Array).facet(),
        IndexField::new("explicit_genres", FieldKind::Int64Array).facet(),
        IndexField::new("themes", FieldKind::Int64Array).facet(),
        IndexField::new("demographics", FieldKind::Int64Array).facet(),
        IndexField::new("magazines", FieldKind::Int64Array).facet(),
    ],
    query_by: &[
        QueryByField::new("title", 2),
        QueryByField::new("title_transformed", 2),
        QueryByField::new("title_english", 1),
        QueryByField::new("title_english_transformed", 1),
        QueryByField::new("title_japanese", 2),
        QueryByField::new("title_japanese_transformed", 2),
        QueryByField::new("title_synonyms", 1),
    ],
    default_sort: &[
        SortField::new(TEXT_MATCH, SortDirection::Descending),
        SortField::new("members", SortDirection::Descending),
    ],
};
