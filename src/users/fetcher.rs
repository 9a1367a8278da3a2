use reqwest::Client;
use tracing::{debug, info};

use crate::{
    api_url, check_status, config::AppConfig, error::Result, http_client, NewProfile,
    ProfileDetails, ProfileUpdate, RecordId, User,
};

pub struct UserFetcher {
    client: Client,
    api_base_url: String,
}

impl UserFetcher {
    pub fn new(config: &AppConfig) -> Result<UserFetcher> {
        Ok(Self {
            client: http_client(config)?,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, segments: &[&str]) -> Result<url::Url> {
        let mut path = vec!["api", "v1", "user"];
        path.extend_from_slice(segments);
        api_url(&self.api_base_url, &path)
    }

    /// Every registered traveller, for the admin user list
    pub async fn list(&self) -> Result<Vec<User>> {
        let url = self.url(&["list"])?;
        debug!(%url, "fetching users");
        let response = check_status(self.client.get(url).send().await?).await?;
        Ok(response.json::<Vec<User>>().await?)
    }

    pub async fn get(&self, id: &RecordId) -> Result<User> {
        let segment = id.as_segment()?;
        let url = self.url(&[segment.as_str()])?;
        debug!(%url, "fetching user");
        let response = check_status(self.client.get(url).send().await?).await?;
        Ok(response.json::<User>().await?)
    }

    /// First-time travel profile for a freshly registered login
    pub async fn add_details(&self, email: &str, details: &ProfileDetails) -> Result<()> {
        let email = email.trim();
        let url = self.url(&["add", email])?;
        let body = NewProfile {
            user_login_id: email,
            details,
        };
        check_status(self.client.post(url).json(&body).send().await?).await?;
        info!(email, "travel profile added");

        Ok(())
    }

    pub async fn update(&self, update: &ProfileUpdate) -> Result<()> {
        let url = self.url(&["update"])?;
        check_status(self.client.put(url).json(update).send().await?).await?;
        info!(id = %update.user_id, "travel profile updated");

        Ok(())
    }
}
