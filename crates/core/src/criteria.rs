//! Search criteria and their canonical shareable query-string form.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

/// Query-string keys recognised in a shareable link.
pub const SHARE_KEYS: [&str; 5] = ["q", "platform", "genre", "sort", "rating"];

const NO_PLATFORM: &str = "All Platforms";
const NO_GENRE: &str = "All Genres";

/// Ordering requested from the search API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Best textual match first.
    #[default]
    Relevance,
    /// Highest rated first.
    Rating,
    /// Most recent release first.
    ReleaseDate,
    /// Alphabetical.
    Name,
}

impl SortKey {
    /// Every sort key in display order.
    pub const ALL: [SortKey; 4] = [
        SortKey::Relevance,
        SortKey::Rating,
        SortKey::ReleaseDate,
        SortKey::Name,
    ];

    /// Wire value used in both the share link and the API request.
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Relevance => "relevance",
            SortKey::Rating => "rating",
            SortKey::ReleaseDate => "release_date",
            SortKey::Name => "name",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            SortKey::Relevance => "Relevance",
            SortKey::Rating => "Top Rated",
            SortKey::ReleaseDate => "Release Date",
            SortKey::Name => "Name",
        }
    }

    /// The key following this one, wrapping around.
    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|key| *key == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == value.trim())
            .ok_or_else(|| format!("unknown sort key '{value}'"))
    }
}

/// Minimum rating threshold in half-star steps between 0 and 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct MinRating(u8);

impl MinRating {
    /// Highest representable threshold.
    pub const MAX: MinRating = MinRating(10);

    /// Round to the nearest half step and clamp into `[0, 5]`. Non-finite input maps to 0.
    pub fn from_stars(value: f64) -> Self {
        if !value.is_finite() {
            return Self::default();
        }
        let halves = (value * 2.0).round().clamp(0.0, 10.0);
        Self(halves as u8)
    }

    /// Threshold expressed in stars.
    pub fn stars(self) -> f64 {
        f64::from(self.0) / 2.0
    }

    /// Whether no threshold is applied.
    pub fn is_unset(self) -> bool {
        self.0 == 0
    }

    /// Raise by half a star, saturating at 5.
    pub fn step_up(self) -> Self {
        Self((self.0 + 1).min(Self::MAX.0))
    }

    /// Lower by half a star, saturating at 0.
    pub fn step_down(self) -> Self {
        Self(self.0.saturating_sub(1))
    }
}

impl fmt::Display for MinRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 2 == 0 {
            write!(f, "{}", self.0 / 2)
        } else {
            write!(f, "{}.5", self.0 / 2)
        }
    }
}

impl FromStr for MinRating {
    type Err = std::num::ParseFloatError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value.trim().parse::<f64>().map(Self::from_stars)
    }
}

/// A single adjustment to the criteria made through the filter controls.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterChange {
    /// Restrict results to a platform, or `None` for every platform.
    Platform(Option<String>),
    /// Restrict results to a genre, or `None` for every genre.
    Genre(Option<String>),
    /// Change the result ordering.
    Sort(SortKey),
    /// Change the minimum rating threshold.
    MinRating(MinRating),
}

/// Snapshot of everything that defines a search, plus the page cursor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchCriteria {
    /// Free-text search term; empty means no search.
    pub query_text: String,
    /// Platform filter.
    pub platform: Option<String>,
    /// Genre filter.
    pub genre: Option<String>,
    /// Requested ordering.
    pub sort_key: SortKey,
    /// Minimum rating threshold.
    #[serde(with = "min_rating_serde")]
    pub min_rating: MinRating,
    /// 1-based page index within the current search.
    pub page_cursor: u32,
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self {
            query_text: String::new(),
            platform: None,
            genre: None,
            sort_key: SortKey::default(),
            min_rating: MinRating::default(),
            page_cursor: 1,
        }
    }
}

impl SearchCriteria {
    /// Whether the query text would trigger a search.
    pub fn has_query(&self) -> bool {
        !self.query_text.trim().is_empty()
    }

    /// Equality ignoring the page cursor.
    pub fn same_search(&self, other: &Self) -> bool {
        self.query_text == other.query_text
            && self.platform == other.platform
            && self.genre == other.genre
            && self.sort_key == other.sort_key
            && self.min_rating == other.min_rating
    }

    /// Apply a filter adjustment, returning whether anything changed.
    ///
    /// Any effective change resets the page cursor to 1.
    pub fn apply(&mut self, change: FilterChange) -> bool {
        let changed = match change {
            FilterChange::Platform(value) => {
                replace_if_changed(&mut self.platform, normalize_filter(value, NO_PLATFORM))
            }
            FilterChange::Genre(value) => {
                replace_if_changed(&mut self.genre, normalize_filter(value, NO_GENRE))
            }
            FilterChange::Sort(key) => replace_if_changed(&mut self.sort_key, key),
            FilterChange::MinRating(rating) => replace_if_changed(&mut self.min_rating, rating),
        };
        if changed {
            self.page_cursor = 1;
        }
        changed
    }

    /// Parse a share query string (leading `?` allowed).
    ///
    /// Unknown keys are ignored, invalid values fall back to their defaults and
    /// the cursor always starts at 1.
    pub fn from_query_string(query: &str) -> Self {
        let query = query.trim().trim_start_matches('?');
        let mut criteria = Self::default();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "q" => criteria.query_text = value.into_owned(),
                "platform" => {
                    criteria.platform = normalize_filter(Some(value.into_owned()), NO_PLATFORM)
                }
                "genre" => criteria.genre = normalize_filter(Some(value.into_owned()), NO_GENRE),
                "sort" => criteria.sort_key = value.parse().unwrap_or_default(),
                "rating" => criteria.min_rating = value.parse().unwrap_or_default(),
                _ => {}
            }
        }
        criteria
    }

    /// Canonical share parameters, omitting every key that holds its default.
    pub fn share_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if self.has_query() {
            params.push(("q", self.query_text.clone()));
        }
        if let Some(platform) = &self.platform {
            params.push(("platform", platform.clone()));
        }
        if let Some(genre) = &self.genre {
            params.push(("genre", genre.clone()));
        }
        if self.sort_key != SortKey::default() {
            params.push(("sort", self.sort_key.as_str().to_string()));
        }
        if !self.min_rating.is_unset() {
            params.push(("rating", self.min_rating.to_string()));
        }
        params
    }

    /// Canonical share query string without a leading `?`.
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.share_params())
            .finish()
    }
}

fn replace_if_changed<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

fn normalize_filter(value: Option<String>, sentinel: &str) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty() && value != sentinel)
}

mod min_rating_serde {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::MinRating;

    pub fn serialize<S: Serializer>(value: &MinRating, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.stars())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<MinRating, D::Error> {
        f64::deserialize(deserializer).map(MinRating::from_stars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn share_link_round_trips_with_defaults_omitted() {
        let criteria = SearchCriteria::from_query_string("q=halo&rating=3");
        assert_eq!(criteria.query_text, "halo");
        assert_eq!(criteria.min_rating, MinRating::from_stars(3.0));
        assert_eq!(criteria.platform, None);
        assert_eq!(criteria.sort_key, SortKey::Relevance);
        assert_eq!(criteria.page_cursor, 1);

        assert_eq!(
            criteria.share_params(),
            vec![("q", "halo".to_string()), ("rating", "3".to_string())]
        );
        assert_eq!(criteria.to_query_string(), "q=halo&rating=3");
    }

    #[test]
    fn full_share_link_is_canonically_ordered_and_encoded() {
        let criteria = SearchCriteria {
            query_text: "zelda breath".to_string(),
            platform: Some("Nintendo Switch".to_string()),
            genre: Some("RPG".to_string()),
            sort_key: SortKey::ReleaseDate,
            min_rating: MinRating::from_stars(3.5),
            page_cursor: 4,
        };
        let query = criteria.to_query_string();
        assert_eq!(
            query,
            "q=zelda+breath&platform=Nintendo+Switch&genre=RPG&sort=release_date&rating=3.5"
        );

        let parsed = SearchCriteria::from_query_string(&format!("?{query}"));
        assert!(parsed.same_search(&criteria));
        assert_eq!(parsed.page_cursor, 1);
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let criteria =
            SearchCriteria::from_query_string("q=doom&sort=popularity&rating=lots&page=7&x=1");
        assert_eq!(criteria.query_text, "doom");
        assert_eq!(criteria.sort_key, SortKey::Relevance);
        assert!(criteria.min_rating.is_unset());
        assert_eq!(criteria.to_query_string(), "q=doom");
    }

    #[test]
    fn blank_query_is_left_out_of_share_link() {
        let criteria = SearchCriteria {
            query_text: "   ".to_string(),
            genre: Some("Indie".to_string()),
            ..SearchCriteria::default()
        };
        assert!(!criteria.has_query());
        assert_eq!(criteria.to_query_string(), "genre=Indie");

        let criteria = SearchCriteria {
            query_text: " ".to_string(),
            ..SearchCriteria::default()
        };
        assert_eq!(criteria.to_query_string(), "");
    }

    #[test]
    fn sentinel_filters_mean_no_filter() {
        let criteria =
            SearchCriteria::from_query_string("platform=All+Platforms&genre=&q=portal");
        assert_eq!(criteria.platform, None);
        assert_eq!(criteria.genre, None);

        let mut criteria = SearchCriteria::default();
        assert!(!criteria.apply(FilterChange::Genre(Some(NO_GENRE.to_string()))));
        assert!(criteria.apply(FilterChange::Genre(Some(" Indie ".to_string()))));
        assert_eq!(criteria.genre.as_deref(), Some("Indie"));
    }

    #[test]
    fn applying_a_change_resets_cursor_only_when_effective() {
        let mut criteria = SearchCriteria {
            page_cursor: 3,
            ..SearchCriteria::default()
        };
        assert!(!criteria.apply(FilterChange::Sort(SortKey::Relevance)));
        assert_eq!(criteria.page_cursor, 3);

        assert!(criteria.apply(FilterChange::Sort(SortKey::Name)));
        assert_eq!(criteria.page_cursor, 1);
    }

    #[test]
    fn rating_is_clamped_to_half_steps() {
        assert_eq!(MinRating::from_stars(3.3).to_string(), "3.5");
        assert_eq!(MinRating::from_stars(3.2).to_string(), "3");
        assert_eq!(MinRating::from_stars(9.0), MinRating::MAX);
        assert!(MinRating::from_stars(-1.0).is_unset());
        assert!(MinRating::from_stars(f64::NAN).is_unset());
        assert_eq!(MinRating::MAX.step_up(), MinRating::MAX);
        assert_eq!(MinRating::default().step_down(), MinRating::default());
        assert_eq!(MinRating::default().step_up().stars(), 0.5);
    }

    #[test]
    fn sort_keys_cycle() {
        assert_eq!(SortKey::Name.next(), SortKey::Relevance);
        assert_eq!("release_date".parse::<SortKey>(), Ok(SortKey::ReleaseDate));
    }
}
