use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::{contains_lowercase, Destination, Error};

pub const ALL_LABEL: &str = "All";
pub const RECOMMENDATION_LABEL: &str = "Recommendation";

/// Category selection. `Recommendation` means the raw collection came from the
/// personalised endpoint and must not be narrowed locally.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Category {
    #[default]
    All,
    Recommendation,
    Named(String),
}

impl Category {
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label {
            ALL_LABEL => Category::All,
            RECOMMENDATION_LABEL => Category::Recommendation,
            other => Category::Named(other.to_string()),
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Category::All => ALL_LABEL,
            Category::Recommendation => RECOMMENDATION_LABEL,
            Category::Named(name) => name,
        }
    }
}

/// Inclusive price bounds, per day
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

pub struct PriceBucket {
    pub label: &'static str,
    pub range: PriceRange,
}

pub const PRICE_BUCKETS: [PriceBucket; 5] = [
    PriceBucket { label: "$0-50", range: PriceRange { min: 0.0, max: 50.0 } },
    PriceBucket { label: "$50-100", range: PriceRange { min: 50.0, max: 100.0 } },
    PriceBucket { label: "$100-200", range: PriceRange { min: 100.0, max: 200.0 } },
    PriceBucket { label: "$200-300", range: PriceRange { min: 200.0, max: 300.0 } },
    PriceBucket { label: "$300+", range: PriceRange { min: 300.0, max: f64::INFINITY } },
];

impl PriceRange {
    #[must_use]
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && price <= self.max
    }

    #[must_use]
    pub fn label(&self) -> String {
        if let Some(bucket) = PRICE_BUCKETS.iter().find(|b| b.range == *self) {
            return bucket.label.to_string();
        }
        if self.max.is_infinite() {
            format!("${}+", self.min)
        } else {
            format!("${}-{}", self.min, self.max)
        }
    }
}

impl FromStr for PriceRange {
    type Err = Error;

    /// Accepts a bucket label (`$50-100`), `MIN-MAX` or `MIN+`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidArgument(format!("unrecognised price range '{s}'"));
        let trimmed = s.trim();
        if let Some(bucket) = PRICE_BUCKETS.iter().find(|b| b.label == trimmed) {
            return Ok(bucket.range);
        }

        let bounds = trimmed.trim_start_matches('$');
        if let Some(min) = bounds.strip_suffix('+') {
            let min: f64 = min.trim().parse().map_err(|_| invalid())?;
            return Ok(PriceRange::new(min, f64::INFINITY));
        }
        match bounds.split_once('-') {
            Some((min, max)) => {
                let min: f64 = min.trim().parse().map_err(|_| invalid())?;
                let max: f64 = max.trim().parse().map_err(|_| invalid())?;
                Ok(PriceRange::new(min, max))
            }
            None => Err(invalid()),
        }
    }
}

/// What the user has selected. Owned by the caller and passed in on every call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    pub category: Category,
    pub price_range: Option<PriceRange>,
    pub search_query: String,
}

impl FilterState {
    /// Whether anything differs from the defaults, i.e. "Clear all" is worth offering
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.category != Category::All
            || self.price_range.is_some()
            || !self.search_query.is_empty()
    }

    /// Labels of the removable filter chips shown above the results
    #[must_use]
    pub fn active_labels(&self) -> Vec<String> {
        let mut labels = Vec::new();
        if matches!(self.category, Category::All | Category::Recommendation)
            && self.price_range.is_none()
        {
            return labels;
        }
        if self.category != Category::All {
            labels.push(self.category.label().to_string());
        }
        if let Some(range) = &self.price_range {
            labels.push(range.label());
        }
        labels
    }
}

impl fmt::Display for FilterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "category={}", self.category.label())?;
        if let Some(range) = &self.price_range {
            write!(f, " price={}", range.label())?;
        }
        if !self.search_query.is_empty() {
            write!(f, " search={:?}", self.search_query)?;
        }
        Ok(())
    }
}

/// The default filter state: every destination, any price, no search text
#[must_use]
pub fn clear_filters() -> FilterState {
    FilterState::default()
}

/// "All" and "Recommendation" followed by the distinct non-empty categories
/// of the raw collection in lexicographic (case-sensitive) order
#[must_use]
pub fn derive_categories(raw: &[Destination]) -> Vec<String> {
    let kinds: BTreeSet<&str> = raw
        .iter()
        .map(|d| d.kind.as_str())
        .filter(|kind| !kind.is_empty() && *kind != ALL_LABEL && *kind != RECOMMENDATION_LABEL)
        .collect();

    [ALL_LABEL, RECOMMENDATION_LABEL]
        .into_iter()
        .chain(kinds)
        .map(String::from)
        .collect()
}

/// Destinations matching every active filter, in their original order.
/// In recommendation mode the whole raw collection is returned as is.
#[must_use]
pub fn apply_filters<'a>(raw: &'a [Destination], state: &FilterState) -> Vec<&'a Destination> {
    if state.category == Category::Recommendation {
        return raw.iter().collect();
    }

    let query = state.search_query.to_lowercase();
    raw.iter()
        .filter(|d| match &state.category {
            Category::Named(name) => d.kind == *name,
            _ => true,
        })
        .filter(|d| {
            query.is_empty()
                || contains_lowercase(&d.name, &query)
                || contains_lowercase(&d.description, &query)
        })
        .filter(|d| state.price_range.is_none_or(|range| range.contains(d.price)))
        .collect()
}

/// Admin list search: name, category, description or any tag containing `term`
#[must_use]
pub fn search_catalog<'a>(raw: &'a [Destination], term: &str) -> Vec<&'a Destination> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return raw.iter().collect();
    }

    raw.iter()
        .filter(|d| {
            contains_lowercase(&d.name, &term)
                || contains_lowercase(&d.kind, &term)
                || contains_lowercase(&d.description, &term)
                || d.tags.iter().any(|tag| contains_lowercase(tag, &term))
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::RecordId;

    fn destination(id: i64, name: &str, kind: &str, price: f64, description: &str) -> Destination {
        Destination {
            id: RecordId::Number(id),
            name: name.to_string(),
            kind: kind.to_string(),
            price,
            rating: 0.0,
            tags: Vec::new(),
            description: description.to_string(),
            image: String::new(),
            best_season: String::new(),
            popularity: 0.0,
            added_time: None,
        }
    }

    fn sample() -> Vec<Destination> {
        vec![
            destination(1, "Goa Beach", "beach", 40.0, "sunny"),
            destination(2, "Everest Base", "mountain", 150.0, "cold"),
            destination(3, "Beach Resort", "beach", 90.0, "luxury"),
        ]
    }

    fn names(view: &[&Destination]) -> Vec<String> {
        view.iter().map(|d| d.name.clone()).collect()
    }

    #[test]
    fn test_clear_filters() {
        let cleared = clear_filters();
        assert_eq!(cleared.category, Category::All);
        assert_eq!(cleared.price_range, None);
        assert_eq!(cleared.search_query, "");
        assert!(!cleared.is_active());
        assert_eq!(clear_filters(), cleared);
    }

    #[test]
    fn test_derive_categories_is_sorted_and_deduplicated() {
        let raw: Vec<Destination> = ["beach", "Beach", "mountain", "beach", "", ""]
            .iter()
            .enumerate()
            .map(|(i, kind)| destination(i as i64, "x", kind, 0.0, ""))
            .collect();

        assert_eq!(
            derive_categories(&raw),
            vec!["All", "Recommendation", "Beach", "beach", "mountain"]
        );
    }

    #[test]
    fn test_derive_categories_skips_sentinel_names() {
        let raw = vec![
            destination(1, "x", "All", 0.0, ""),
            destination(2, "y", "lake", 0.0, ""),
        ];
        assert_eq!(derive_categories(&raw), vec!["All", "Recommendation", "lake"]);
    }

    #[test]
    fn test_empty_collection() {
        assert_eq!(derive_categories(&[]), vec!["All", "Recommendation"]);

        let state = FilterState {
            category: Category::Named("beach".to_string()),
            price_range: Some(PriceRange::new(0.0, 50.0)),
            search_query: "goa".to_string(),
        };
        assert!(apply_filters(&[], &state).is_empty());
        assert!(apply_filters(&[], &clear_filters()).is_empty());
    }

    #[test]
    fn test_recommendation_bypasses_filters() {
        let raw = sample();
        let state = FilterState {
            category: Category::Recommendation,
            price_range: Some(PriceRange::new(0.0, 1.0)),
            search_query: "nothing matches this".to_string(),
        };
        let view = apply_filters(&raw, &state);

        assert_eq!(view.len(), raw.len());
        for (filtered, original) in view.iter().zip(&raw) {
            assert!(std::ptr::eq(*filtered, original));
        }
    }

    #[test]
    fn test_composed_filters() {
        let raw = sample();
        let state = FilterState {
            category: Category::Named("beach".to_string()),
            price_range: Some(PriceRange::new(0.0, 50.0)),
            search_query: String::new(),
        };
        assert_eq!(names(&apply_filters(&raw, &state)), vec!["Goa Beach"]);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let raw = sample();
        let state = FilterState {
            search_query: "EVEREST".to_string(),
            ..clear_filters()
        };
        assert_eq!(names(&apply_filters(&raw, &state)), vec!["Everest Base"]);

        // description matches too
        let state = FilterState {
            search_query: "Lux".to_string(),
            ..clear_filters()
        };
        assert_eq!(names(&apply_filters(&raw, &state)), vec!["Beach Resort"]);
    }

    #[test]
    fn test_category_match_is_case_sensitive() {
        let raw = sample();
        let state = FilterState {
            category: Category::Named("Beach".to_string()),
            ..clear_filters()
        };
        assert!(apply_filters(&raw, &state).is_empty());
    }

    #[test]
    fn test_price_bounds_are_inclusive_and_order_is_kept() {
        let raw = sample();
        let state = FilterState {
            price_range: Some(PriceRange::new(40.0, 150.0)),
            ..clear_filters()
        };
        assert_eq!(
            names(&apply_filters(&raw, &state)),
            vec!["Goa Beach", "Everest Base", "Beach Resort"]
        );

        let inverted = FilterState {
            price_range: Some(PriceRange::new(100.0, 10.0)),
            ..clear_filters()
        };
        assert!(apply_filters(&raw, &inverted).is_empty());
    }

    #[test]
    fn test_filtering_does_not_touch_input() {
        let raw = sample();
        let before = raw.clone();
        let state = FilterState {
            category: Category::Named("mountain".to_string()),
            ..clear_filters()
        };
        let first = names(&apply_filters(&raw, &state));
        let second = names(&apply_filters(&raw, &state));

        assert_eq!(raw, before);
        assert_eq!(first, second);
    }

    #[test]
    fn test_price_range_parsing_and_labels() {
        assert_eq!("$50-100".parse::<PriceRange>().unwrap(), PriceRange::new(50.0, 100.0));
        assert_eq!("$300+".parse::<PriceRange>().unwrap().max, f64::INFINITY);
        assert_eq!("10-75.5".parse::<PriceRange>().unwrap(), PriceRange::new(10.0, 75.5));
        assert_eq!("400+".parse::<PriceRange>().unwrap().label(), "$400+");
        assert!("cheap".parse::<PriceRange>().is_err());
        assert!("10-".parse::<PriceRange>().is_err());

        assert_eq!(PriceRange::new(0.0, 50.0).label(), "$0-50");
        assert_eq!(PriceRange::new(10.0, 75.5).label(), "$10-75.5");
    }

    #[test]
    fn test_active_labels() {
        assert!(clear_filters().active_labels().is_empty());

        let recommendation = FilterState {
            category: Category::Recommendation,
            ..clear_filters()
        };
        assert!(recommendation.active_labels().is_empty());
        assert!(recommendation.is_active());

        let with_price = FilterState {
            category: Category::Recommendation,
            price_range: Some(PRICE_BUCKETS[1].range),
            ..clear_filters()
        };
        assert_eq!(with_price.active_labels(), vec!["Recommendation", "$50-100"]);

        let beach = FilterState {
            category: Category::from_label("beach"),
            ..clear_filters()
        };
        assert_eq!(beach.active_labels(), vec!["beach"]);

        let search_only = FilterState {
            search_query: "goa".to_string(),
            ..clear_filters()
        };
        assert!(search_only.active_labels().is_empty());
        assert!(search_only.is_active());
    }

    #[test]
    fn test_search_catalog() {
        let mut raw = sample();
        raw[1].tags = vec!["Hiking".to_string()];

        assert_eq!(search_catalog(&raw, "").len(), 3);
        assert_eq!(names(&search_catalog(&raw, "hik")), vec!["Everest Base"]);
        assert_eq!(names(&search_catalog(&raw, "BEACH")), vec!["Goa Beach", "Beach Resort"]);
        assert_eq!(names(&search_catalog(&raw, "mount")), vec!["Everest Base"]);
    }
}
