use std::collections::BTreeMap;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::{
    api_url, check_status, config::AppConfig, error::Result, http_client, season_counts,
    tag_counts, Activity, Dashboard, StatCard,
};

pub struct DashboardFetcher {
    client: Client,
    api_base_url: String,
}

impl DashboardFetcher {
    pub fn new(config: &AppConfig) -> Result<DashboardFetcher> {
        Ok(Self {
            client: http_client(config)?,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let mut path = vec!["api", "v1"];
        path.extend_from_slice(segments);
        let url = api_url(&self.api_base_url, &path)?;
        debug!(%url, "fetching dashboard section");

        let response = check_status(self.client.get(url).send().await?).await?;
        Ok(response.json::<T>().await?)
    }

    /// Load all four sections concurrently
    pub async fn load(&self) -> Dashboard {
        let (stats, seasons, activities, tags) = tokio::join!(
            self.get_json::<Vec<StatCard>>(&["destination", "stats"]),
            self.get_json::<BTreeMap<String, u64>>(&["destination", "season-stats"]),
            self.get_json::<Vec<Activity>>(&["activities", "recent"]),
            self.get_json::<BTreeMap<String, u64>>(&["destination", "activity-tags"]),
        );

        let dashboard = Dashboard {
            stats,
            seasons: seasons.map(season_counts),
            activities,
            tags: tags.map(tag_counts),
        };
        for (section, error) in [
            ("stats", dashboard.stats.as_ref().err()),
            ("seasons", dashboard.seasons.as_ref().err()),
            ("activities", dashboard.activities.as_ref().err()),
            ("tags", dashboard.tags.as_ref().err()),
        ] {
            if let Some(e) = error {
                warn!(section, "dashboard section failed: {e}");
            }
        }

        dashboard
    }
}
