use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;
use url::Url;

use crate::RecordId;

/// Shown whenever a destination has no usable image
pub const PLACEHOLDER_IMAGE: &str = "data:image/svg+xml;base64,PHN2ZyB4bWxucz0iaHR0cDovL3d3dy53My5vcmcvMjAwMC9zdmciIHZpZXdCb3g9IjAgMCAzMDAgMjAwIj48cmVjdCB3aWR0aD0iMzAwIiBoZWlnaHQ9IjIwMCIgZmlsbD0iI2VlZSIvPjx0ZXh0IHg9IjUwJSIgeT0iNTAlIiBkb21pbmFudC1iYXNlbGluZT0ibWlkZGxlIiB0ZXh0LWFuY2hvcj0ibWlkZGxlIiBmaWxsPSIjYWFhIiBmb250LWZhbWlseT0iQXJpYWwiIGZvbnQtc2l6ZT0iMTYiPk5vIEltYWdlPC90ZXh0Pjwvc3ZnPg==";

pub const DEFAULT_DESCRIPTION: &str = "No description available";
pub const DEFAULT_SEASON: &str = "All year";

/// A destination record as the API sends it. Anything may be missing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JsonDestination {
    pub destination_id: Option<RecordId>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub cost_per_day: Option<f64>,
    pub average_rating: Option<f64>,
    pub recommended_for: Option<Vec<Option<String>>>,
    pub activity_tags: Option<Vec<Option<String>>>,
    pub description: Option<String>,
    pub image_path: Option<String>,
    pub best_season_to_visit: Option<String>,
    pub popularity_score: Option<f64>,
    pub added_time: Option<String>,
}

/// A destination with every default applied; what the filters work on
#[derive(Debug, Clone, PartialEq)]
pub struct Destination {
    pub id: RecordId,
    pub name: String,
    /// Category label, empty when the record had none
    pub kind: String,
    pub price: f64,
    pub rating: f64,
    pub tags: Vec<String>,
    pub description: String,
    pub image: String,
    pub best_season: String,
    pub popularity: f64,
    pub added_time: Option<NaiveDateTime>,
}

impl Destination {
    #[must_use]
    pub fn is_categorized(&self) -> bool {
        !self.kind.is_empty()
    }
}

impl JsonDestination {
    pub fn as_destination(&self, images: &ImageResolver) -> Destination {
        Destination {
            id: self.destination_id.clone().unwrap_or_default(),
            name: self.name.clone().unwrap_or_default(),
            kind: self.kind.clone().unwrap_or_default(),
            price: non_negative(self.cost_per_day),
            rating: self.average_rating.unwrap_or(0.0).clamp(0.0, 5.0),
            tags: normalize_tags(
                self.recommended_for.as_deref().unwrap_or_default(),
                self.activity_tags.as_deref().unwrap_or_default(),
            ),
            description: self
                .description
                .clone()
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            image: images.resolve(self.image_path.as_deref()),
            best_season: self
                .best_season_to_visit
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_SEASON.to_string()),
            popularity: non_negative(self.popularity_score),
            added_time: self.added_time.as_deref().and_then(parse_added_time),
        }
    }
}

fn non_negative(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}

/// The API emits local date-times (`2024-05-01T10:20:30.123`); accept RFC 3339 too
fn parse_added_time(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.naive_utc())
        })
}

/// Union of both tag lists in first-seen order with empty entries dropped and
/// the first letter capitalised. Duplicates are removed by exact comparison
/// after capitalisation, so "Beach" and "BEACH" stay distinct.
pub fn normalize_tags(recommended_for: &[Option<String>], activity_tags: &[Option<String>]) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();

    for tag in recommended_for.iter().chain(activity_tags).flatten() {
        if tag.is_empty() {
            continue;
        }
        let tag = capitalize_first(tag);
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }

    tags
}

fn capitalize_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Turns relative image paths from the API into display URLs under the image base
#[derive(Debug, Clone)]
pub struct ImageResolver {
    base: Option<Url>,
}

impl ImageResolver {
    /// A base that does not parse leaves every destination on the placeholder
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        let base = Url::parse(&format!("{}/", base_url.trim_end_matches('/'))).ok();
        Self { base }
    }

    #[must_use]
    pub fn resolve(&self, image_path: Option<&str>) -> String {
        let Some(path) = image_path.map(str::trim).filter(|p| !p.is_empty()) else {
            return PLACEHOLDER_IMAGE.to_string();
        };
        let path = path.replace('\\', "/");
        let segments: Vec<&str> = path
            .split('/')
            .filter(|segment| !matches!(*segment, "" | "." | ".."))
            .collect();
        let Some(mut url) = self.base.clone().filter(|_| !segments.is_empty()) else {
            return PLACEHOLDER_IMAGE.to_string();
        };

        // always below the base, even for paths that look like absolute URLs
        match url.path_segments_mut() {
            Ok(mut parts) => {
                parts.pop_if_empty().extend(&segments);
            }
            Err(()) => return PLACEHOLDER_IMAGE.to_string(),
        }
        url.to_string()
    }
}
