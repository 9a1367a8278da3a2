use reqwest::Client;
use tracing::{debug, info};

use crate::{
    api_url, check_status, config::AppConfig, error::Result, http_client, NewReview, RecordId,
    Review,
};

pub struct ReviewFetcher {
    client: Client,
    api_base_url: String,
}

impl ReviewFetcher {
    pub fn new(config: &AppConfig) -> Result<ReviewFetcher> {
        Ok(Self {
            client: http_client(config)?,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, segments: &[&str]) -> Result<url::Url> {
        let mut path = vec!["api", "v1", "destination-rating"];
        path.extend_from_slice(segments);
        api_url(&self.api_base_url, &path)
    }

    async fn get_reviews(&self, url: url::Url) -> Result<Vec<Review>> {
        debug!(%url, "fetching reviews");
        let response = check_status(self.client.get(url).send().await?).await?;
        Ok(response.json::<Vec<Review>>().await?)
    }

    /// Reviews left on one destination
    pub async fn list_for(&self, destination_id: &RecordId) -> Result<Vec<Review>> {
        let destination_id = destination_id.as_segment()?;
        self.get_reviews(self.url(&["list", destination_id.as_str()])?)
            .await
    }

    /// Every review, for moderation
    pub async fn list_all(&self) -> Result<Vec<Review>> {
        self.get_reviews(self.url(&["list"])?).await
    }

    /// Submit a review; the server answers with the stored record
    pub async fn submit(&self, review: &NewReview) -> Result<Review> {
        let url = self.url(&["add"])?;
        let response = check_status(self.client.post(url).json(review).send().await?).await?;
        let stored = response.json::<Review>().await?;
        info!(destination = %review.destination_id, rating = review.rating, "review submitted");

        Ok(stored)
    }

    pub async fn delete(&self, id: &RecordId) -> Result<()> {
        let segment = id.as_segment()?;
        let url = self.url(&["delete", segment.as_str()])?;
        check_status(self.client.delete(url).send().await?).await?;
        info!(%id, "review deleted");

        Ok(())
    }
}
