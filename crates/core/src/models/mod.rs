//! Game records returned by the search API.
//!
//! The service is loosely typed: collections may be missing, hold plain
//! strings or objects, and numbers sometimes arrive as strings. Decoding is
//! deliberately forgiving so a sloppy record never takes the renderer down.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

mod lenient;

/// Summary of a game as listed in search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    /// Identifier used with the game-by-id endpoint.
    #[serde(default, alias = "game_id", deserialize_with = "lenient::integer_or_zero")]
    pub id: i64,
    /// Display name.
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub name: String,
    /// Cover image URL.
    #[serde(
        default,
        rename = "background_image",
        deserialize_with = "lenient::optional_string"
    )]
    pub cover_image: Option<String>,
    /// Genre names.
    #[serde(default, deserialize_with = "lenient::name_list")]
    pub genres: Vec<String>,
    /// Platform names.
    #[serde(default, deserialize_with = "lenient::name_list")]
    pub platforms: Vec<String>,
    /// Average user rating out of 5.
    #[serde(default, deserialize_with = "lenient::optional_float")]
    pub rating: Option<f64>,
    /// Metacritic score out of 100.
    #[serde(default, deserialize_with = "lenient::optional_integer")]
    pub metacritic: Option<i64>,
    /// Release date as sent by the service (`YYYY-MM-DD` or ISO timestamp).
    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub released: Option<String>,
    /// Long-form description.
    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub description: Option<String>,
    /// Search score assigned by the service.
    #[serde(default, deserialize_with = "lenient::optional_float")]
    pub relevance_score: Option<f64>,
    /// Query terms the service matched.
    #[serde(default, deserialize_with = "lenient::name_list")]
    pub matched_terms: Vec<String>,
}

impl Game {
    /// Decode every object in a response array, skipping non-object entries.
    pub fn from_values(values: Vec<Value>) -> Vec<Game> {
        values
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|value| serde_json::from_value(value).ok())
            .collect()
    }

    /// Parsed release date, if the service sent a recognisable one.
    pub fn released_on(&self) -> Option<NaiveDate> {
        let raw = self.released.as_deref()?.trim();
        let date_part = raw.get(..10).unwrap_or(raw);
        NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
    }

    /// Rating formatted for display.
    pub fn rating_label(&self) -> String {
        match self.rating {
            Some(rating) if rating > 0.0 => format!("{rating:.1}/5"),
            _ => "No rating".to_string(),
        }
    }

    /// Description shortened to at most `max_chars` characters on a word boundary.
    pub fn snippet(&self, max_chars: usize) -> String {
        let text = self
            .description
            .as_deref()
            .map(|value| value.split_whitespace().collect::<Vec<_>>().join(" "))
            .unwrap_or_default();
        if text.chars().count() <= max_chars {
            return text;
        }
        let cut: String = text.chars().take(max_chars).collect();
        let trimmed = match cut.rfind(' ') {
            Some(index) if index > 0 => &cut[..index],
            _ => cut.as_str(),
        };
        format!("{}…", trimmed.trim_end())
    }
}

/// Store listing for a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreLink {
    /// Store slug, e.g. `steam`.
    pub slug: String,
    /// Product page URL.
    pub url: String,
}

/// Full record returned by the game-by-id endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameDetail {
    /// Fields shared with the search summary.
    #[serde(flatten)]
    pub summary: Game,
    /// Average playtime in hours.
    #[serde(default, deserialize_with = "lenient::optional_integer")]
    pub playtime: Option<i64>,
    /// Tag names.
    #[serde(default, deserialize_with = "lenient::name_list")]
    pub tags: Vec<String>,
    /// Screenshot URLs.
    #[serde(default, deserialize_with = "lenient::image_list")]
    pub screenshots: Vec<String>,
    /// Official website.
    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub website: Option<String>,
    /// Store listings.
    #[serde(default, deserialize_with = "store_links")]
    pub stores: Vec<StoreLink>,
}

impl GameDetail {
    /// URL of the listing in the store with the given slug (`steam`, `epic-games`, `gog`).
    pub fn store_url(&self, slug: &str) -> Option<&str> {
        self.stores
            .iter()
            .find(|store| store.slug == slug)
            .map(|store| store.url.as_str())
    }
}

fn store_links<'de, D>(deserializer: D) -> Result<Vec<StoreLink>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(entries) = value else {
        return Ok(Vec::new());
    };
    Ok(entries
        .iter()
        .filter_map(|entry| {
            // RAWG nests the slug under `store`, flattened records carry it directly.
            let slug = entry
                .pointer("/store/slug")
                .or_else(|| entry.get("slug"))
                .and_then(Value::as_str)?;
            let url = entry.get("url").and_then(Value::as_str)?;
            Some(StoreLink {
                slug: slug.to_string(),
                url: url.to_string(),
            })
        })
        .collect())
}
