use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;

const UNSPECIFIED_SEASON: &str = "Not specified";

static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

/// Plain text for a JSON scalar the server may send as a number or a string
fn value_text(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// One headline figure from `/destination/stats`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StatCard {
    pub title: String,
    pub value: Value,
    pub change: Value,
    pub trend: Option<String>,
}

impl StatCard {
    #[must_use]
    pub fn value_text(&self) -> String {
        value_text(&self.value)
    }

    /// The change with an arrow for its trend; empty when the server sent none
    #[must_use]
    pub fn change_text(&self) -> String {
        if self.change.is_null() {
            return String::new();
        }
        let arrow = if self.trend.as_deref() == Some("up") { "▲" } else { "▼" };
        format!("{arrow} {}", value_text(&self.change))
    }
}

/// An entry of the admin activity feed
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Activity {
    pub icon: Option<String>,
    pub color: Option<String>,
    /// May carry inline HTML markup
    pub title: String,
    pub time: String,
}

impl Activity {
    #[must_use]
    pub fn plain_title(&self) -> String {
        HTML_TAG.replace_all(&self.title, "").trim().to_string()
    }
}

/// Destinations per best season; the blank season is labelled "Not specified"
#[must_use]
pub fn season_counts(raw: BTreeMap<String, u64>) -> Vec<(String, u64)> {
    raw.into_iter()
        .map(|(season, count)| {
            if season.trim().is_empty() {
                (UNSPECIFIED_SEASON.to_string(), count)
            } else {
                (season, count)
            }
        })
        .collect()
}

/// Activity tags, most used first
#[must_use]
pub fn tag_counts(raw: BTreeMap<String, u64>) -> Vec<(String, u64)> {
    let mut tags: Vec<(String, u64)> = raw.into_iter().collect();
    tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    tags
}

/// The admin overview. Each section loads on its own, so one failing endpoint
/// leaves the others in place.
#[derive(Debug)]
pub struct Dashboard {
    pub stats: Result<Vec<StatCard>>,
    pub seasons: Result<Vec<(String, u64)>>,
    pub activities: Result<Vec<Activity>>,
    pub tags: Result<Vec<(String, u64)>>,
}
