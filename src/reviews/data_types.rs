use serde::{Deserialize, Deserializer, Serialize};

use crate::{contains_lowercase, error::Result, Error, FormErrors, RecordId, Session};

/// A rating left on a destination, as the API returns it
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Review {
    pub id: Option<RecordId>,
    #[serde(deserialize_with = "zero_if_null")]
    pub rating: f64,
    pub feedback: Option<String>,
    pub user_name: Option<String>,
    pub destination_name: Option<String>,
}

fn zero_if_null<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

/// What the review form collects before the user is attached
#[derive(Debug, Clone)]
pub struct ReviewDraft {
    pub destination_id: RecordId,
    /// Stars, 1 to 5; 0 means nothing was picked yet
    pub rating: u8,
    pub feedback: String,
}

/// Request body for a new review
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub destination_id: RecordId,
    pub rating: u8,
    pub feedback: String,
    pub user_id: RecordId,
}

impl ReviewDraft {
    /// Check the draft and attach the signed-in user
    pub fn validate(&self, session: Option<&Session>) -> Result<NewReview> {
        let mut errors = FormErrors::default();
        if self.rating == 0 {
            errors.add("rating", "Please select a rating");
        } else if self.rating > 5 {
            errors.add("rating", "Rating must be between 1 and 5");
        }
        errors.into_result()?;

        let session = session.ok_or(Error::NotSignedIn)?;
        Ok(NewReview {
            destination_id: self.destination_id.clone(),
            rating: self.rating,
            feedback: self.feedback.trim().to_string(),
            user_id: session.id.clone(),
        })
    }
}

/// Mean rating, 0 when there are no reviews
#[must_use]
pub fn average_rating(reviews: &[Review]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let count = reviews.len() as f64;
    reviews.iter().map(|r| r.rating).sum::<f64>() / count
}

/// Put a freshly submitted review on top and return the new average
pub fn add_review(reviews: &mut Vec<Review>, review: Review) -> f64 {
    reviews.insert(0, review);
    average_rating(reviews)
}

/// Moderation search over reviewer, destination and feedback text
#[must_use]
pub fn search_feedback<'a>(reviews: &'a [Review], term: &str) -> Vec<&'a Review> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return reviews.iter().collect();
    }

    reviews
        .iter()
        .filter(|r| {
            [&r.user_name, &r.destination_name, &r.feedback]
                .into_iter()
                .flatten()
                .any(|field| contains_lowercase(field, &term))
        })
        .collect()
}
