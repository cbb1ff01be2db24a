//! Per-table schema normalization.
//!
//! Each destination table has a fixed list of fields. A field takes the
//! source value when it is present and not null, otherwise its default.
//! Source fields outside the list are dropped. Values are never validated.

use crate::domain::model::Record;
use serde_json::{json, Value};
use std::collections::HashMap;

pub const DEFAULT_RATING: i64 = 1500;
pub const DEFAULT_SELECTION_TYPE: &str = "tournament_setup";

/// A destination column and the value used when the source lacks it.
pub struct FieldSpec {
    pub name: &'static str,
    pub default: fn() -> Value,
}

const fn field(name: &'static str, default: fn() -> Value) -> FieldSpec {
    FieldSpec { name, default }
}

fn empty_string() -> Value {
    Value::String(String::new())
}

fn empty_array() -> Value {
    Value::Array(Vec::new())
}

fn zero() -> Value {
    json!(0)
}

fn default_rating() -> Value {
    json!(DEFAULT_RATING)
}

fn active() -> Value {
    Value::Bool(true)
}

fn not_hidden() -> Value {
    Value::Bool(false)
}

fn default_selection_type() -> Value {
    json!(DEFAULT_SELECTION_TYPE)
}

pub fn default_preferences() -> Value {
    json!({
        "sound_enabled": true,
        "theme_preference": "dark",
        "preferred_categories": [],
        "rating_display_preference": "elo",
        "tournament_size_preference": 8
    })
}

pub const CAT_NAME_OPTIONS_SCHEMA: &[FieldSpec] = &[
    field("name", empty_string),
    field("description", empty_string),
    field("avg_rating", default_rating),
    field("popularity_score", zero),
    field("total_tournaments", zero),
    field("is_active", active),
    field("categories", empty_array),
];

pub const CAT_APP_USERS_SCHEMA: &[FieldSpec] = &[
    field("user_name", empty_string),
    field("preferences", default_preferences),
    field("tournament_data", empty_array),
];

pub const CAT_NAME_RATINGS_SCHEMA: &[FieldSpec] = &[
    field("user_name", empty_string),
    field("name_id", empty_string),
    field("rating", default_rating),
    field("wins", zero),
    field("losses", zero),
    field("is_hidden", not_hidden),
    field("rating_history", empty_array),
];

pub const TOURNAMENT_SELECTIONS_SCHEMA: &[FieldSpec] = &[
    field("user_name", empty_string),
    field("name_id", empty_string),
    field("name", empty_string),
    field("tournament_id", empty_string),
    field("selected_at", empty_string),
    field("selection_type", default_selection_type),
];

pub fn normalize_record(record: &Record, schema: &[FieldSpec]) -> Record {
    let mut data = HashMap::with_capacity(schema.len());
    for spec in schema {
        let value = match record.data.get(spec.name) {
            Some(v) if !v.is_null() => v.clone(),
            _ => (spec.default)(),
        };
        data.insert(spec.name.to_string(), value);
    }
    Record { data }
}

pub fn normalize_all(rows: Vec<Record>, schema: &[FieldSpec]) -> Vec<Record> {
    rows.iter().map(|r| normalize_record(r, schema)).collect()
}

pub fn transform_cat_name_options(rows: Vec<Record>) -> Vec<Record> {
    normalize_all(rows, CAT_NAME_OPTIONS_SCHEMA)
}

pub fn transform_cat_app_users(rows: Vec<Record>) -> Vec<Record> {
    normalize_all(rows, CAT_APP_USERS_SCHEMA)
}

pub fn transform_cat_name_ratings(rows: Vec<Record>) -> Vec<Record> {
    normalize_all(rows, CAT_NAME_RATINGS_SCHEMA)
}

pub fn transform_tournament_selections(rows: Vec<Record>) -> Vec<Record> {
    normalize_all(rows, TOURNAMENT_SELECTIONS_SCHEMA)
}
