use crate::models::{Category, Cuisine, DietTag, DistanceLevel, PriceRange, Restaurant, SpiceLevel};
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading restaurant data
#[derive(Debug, Error)]
pub enum DataError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Restaurant data must be a JSON array")]
    NotAnArray,
}

/// Load and normalize the restaurant pool from a JSON file
pub fn load_restaurants<P: AsRef<Path>>(path: P) -> Result<Vec<Restaurant>, DataError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let restaurants = parse_restaurants(&contents)?;
    tracing::info!("Loaded {} restaurants from {}", restaurants.len(), path.display());
    Ok(restaurants)
}

/// Parse a JSON array of raw records into normalized restaurants
///
/// Records are numbered from 1 in document order; ids are `d{n}`.
pub fn parse_restaurants(json: &str) -> Result<Vec<Restaurant>, DataError> {
    let document: Value = serde_json::from_str(json)?;
    let records = document.as_array().ok_or(DataError::NotAnArray)?;

    Ok(records
        .iter()
        .enumerate()
        .map(|(index, raw)| normalize_restaurant(raw, index + 1))
        .collect())
}

/// Normalize one raw import record
///
/// Never fails: every missing or malformed field falls back to a default.
pub fn normalize_restaurant(raw: &Value, number: usize) -> Restaurant {
    let name = text_field(raw, "name").unwrap_or_else(|| format!("Restaurant {}", number));

    let price_label = text_field(raw, "price_range");
    let known_price = price_label.as_deref().map(PriceRange::from_label);
    let price_range = known_price.flatten().unwrap_or(PriceRange::Budget);

    // Unrecognised tiers are treated as the most expensive for distance
    let distance_level = match known_price {
        Some(Some(price)) => DistanceLevel::from(price),
        Some(None) => DistanceLevel::Far,
        None => DistanceLevel::Near,
    };

    let cuisine = match text_field(raw, "cuisine") {
        Some(label) => Cuisine::from_label(&label).unwrap_or(Cuisine::Other),
        None => Cuisine::Cafe,
    };

    Restaurant {
        id: format!("d{}", number),
        name,
        rating: normalize_rating(raw.get("rating")),
        price_range,
        cuisine,
        distance_level,
        spiciness_level: normalize_spice(raw.get("spiciness_level")),
        diet_tags: normalize_diet_tags(raw.get("diet_tags")),
        hours: normalize_hours(raw.get("hours")),
        photos: string_list(raw.get("photos")),
        comments: normalize_comments(raw.get("comments")),
        menu_sample: string_list(raw.get("menu_sample")),
        source: text_field(raw, "source").unwrap_or_default(),
        description: text_field(raw, "description"),
        aggregate_comment: text_field(raw, "aggregate_comment"),
    }
}

/// Trimmed, non-empty string field
fn text_field(raw: &Value, key: &str) -> Option<String> {
    raw.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn normalize_rating(value: Option<&Value>) -> f64 {
    let rating = match value {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) if text.trim().is_empty() => Some(0.0),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    rating.filter(|r| r.is_finite()).unwrap_or(0.0)
}

/// Spice arrives as 1-3, either as a number or a string
fn normalize_spice(value: Option<&Value>) -> SpiceLevel {
    let level = match value {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    match level {
        Some(level) if level == 3.0 => SpiceLevel::Hot,
        Some(level) if level == 2.0 => SpiceLevel::Medium,
        _ => SpiceLevel::Mild,
    }
}

fn normalize_diet_tags(value: Option<&Value>) -> BTreeSet<DietTag> {
    string_list(value)
        .iter()
        .filter_map(|tag| DietTag::from_label(&tag.to_lowercase()))
        .collect()
}

fn normalize_hours(value: Option<&Value>) -> Vec<String> {
    string_list(value)
        .into_iter()
        .map(|entry| entry.replace("Open now", "").replace("Closed now", "").trim().to_string())
        .filter(|entry| !entry.is_empty())
        .collect()
}

/// Comments are plain strings or `[author, text]` pairs
fn normalize_comments(value: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(entries)) = value else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| match entry {
            Value::String(text) => Some(text.trim().to_string()),
            Value::Array(pair) if pair.len() >= 2 => Some(
                format!("{}: {}", display_value(&pair[0]), display_value(&pair[1]))
                    .trim()
                    .to_string(),
            ),
            _ => None,
        })
        .filter(|comment| !comment.is_empty())
        .collect()
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
