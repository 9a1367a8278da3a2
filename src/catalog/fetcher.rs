use std::path::Path;

use reqwest::{
    multipart::{Form, Part},
    Client,
};
use tracing::{debug, info, warn};

use crate::{
    api_url, apply_filters, check_status, config::AppConfig, derive_categories, error::Result,
    http_client, image_mime, upload_file_name, Category, Destination, DestinationPayload, Error,
    FilterState, ImageResolver, JsonDestination, RecordId, Session,
};

/// Which endpoint fills the raw collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    All,
    Recommended { user_id: RecordId },
}

impl CatalogSource {
    /// Recommendation mode reads the personalised endpoint and so needs a signed-in user
    pub fn for_filters(state: &FilterState, session: Option<&Session>) -> Result<Self> {
        match state.category {
            Category::Recommendation => match session {
                Some(session) => Ok(CatalogSource::Recommended {
                    user_id: session.id.clone(),
                }),
                None => Err(Error::NotSignedIn),
            },
            _ => Ok(CatalogSource::All),
        }
    }
}

pub struct CatalogFetcher {
    client: Client,
    api_base_url: String,
    images: ImageResolver,
}

impl CatalogFetcher {
    /// Create a new fetcher with the given configuration
    pub fn new(config: &AppConfig) -> Result<CatalogFetcher> {
        Ok(Self {
            client: http_client(config)?,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            images: ImageResolver::new(&config.get_image_base_url()),
        })
    }

    #[cfg(test)]
    fn with_base_url(&mut self, base_url: String) -> &mut Self {
        self.api_base_url = base_url;
        self
    }

    fn url(&self, segments: &[&str]) -> Result<url::Url> {
        let mut path = vec!["api", "v1", "destination"];
        path.extend_from_slice(segments);
        api_url(&self.api_base_url, &path)
    }

    /// Fetch the destinations for a source and normalise every record
    pub async fn fetch(&self, source: &CatalogSource) -> Result<Vec<Destination>> {
        let url = match source {
            CatalogSource::All => self.url(&["list"])?,
            CatalogSource::Recommended { user_id } => {
                let user_id = user_id.as_segment()?;
                self.url(&["recommend", user_id.as_str()])?
            }
        };
        debug!(%url, "fetching destinations");

        let response = check_status(self.client.get(url).send().await?).await?;
        let records = response.json::<Vec<JsonDestination>>().await?;
        info!(count = records.len(), ?source, "fetched destinations");

        Ok(records
            .iter()
            .map(|record| record.as_destination(&self.images))
            .collect())
    }

    /// The stored record as the API sends it, for prefilling the edit form
    pub async fn fetch_record(&self, id: &RecordId) -> Result<JsonDestination> {
        let id = id.as_segment()?;
        let url = self.url(&[id.as_str()])?;
        let response = check_status(self.client.get(url).send().await?).await?;
        Ok(response.json::<JsonDestination>().await?)
    }

    /// Fetch a single destination by its ID
    pub async fn fetch_destination(&self, id: &RecordId) -> Result<Destination> {
        Ok(self.fetch_record(id).await?.as_destination(&self.images))
    }

    pub async fn delete_destination(&self, id: &RecordId) -> Result<()> {
        let segment = id.as_segment()?;
        let url = self.url(&["delete", segment.as_str()])?;
        check_status(self.client.delete(url).send().await?).await?;
        info!(%id, "deleted destination");

        Ok(())
    }

    /// Create a destination; the record goes up as the `destination` part of
    /// a multipart body with an optional `imageFile` part
    pub async fn add_destination(
        &self,
        payload: &DestinationPayload,
        image_file: Option<&Path>,
    ) -> Result<()> {
        let url = self.url(&["add"])?;
        let form = upload_form(payload, image_file).await?;
        let response = self.client.post(url).multipart(form).send().await?;
        if let Err(e) = check_status(response).await {
            return Err(match e {
                Error::Api { status: 400, message } if message == "Destination already exists" => {
                    Error::DestinationExists
                }
                other => other,
            });
        }
        info!(name = %payload.name, "added destination");

        Ok(())
    }

    pub async fn update_destination(
        &self,
        id: &RecordId,
        payload: &DestinationPayload,
        image_file: Option<&Path>,
    ) -> Result<()> {
        let segment = id.as_segment()?;
        let url = self.url(&["update", segment.as_str()])?;
        let form = upload_form(payload, image_file).await?;
        check_status(self.client.put(url).multipart(form).send().await?).await?;
        info!(%id, "updated destination");

        Ok(())
    }
}

async fn upload_form(payload: &DestinationPayload, image_file: Option<&Path>) -> Result<Form> {
    let destination = Part::text(serde_json::to_string(payload)?).mime_str("application/json")?;
    let mut form = Form::new().part("destination", destination);

    if let Some(path) = image_file {
        let bytes = tokio::fs::read(path).await?;
        let image = Part::bytes(bytes)
            .file_name(upload_file_name(path))
            .mime_str(image_mime(path))?;
        form = form.part("imageFile", image);
    }
    Ok(form)
}

/// Issued for every fetch; only the most recent one may replace the collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    source: CatalogSource,
}

impl FetchTicket {
    pub fn source(&self) -> &CatalogSource {
        &self.source
    }
}

/// Holds the raw collection as last fetched. Facets and filtered views are
/// always derived from it on demand.
#[derive(Debug, Default)]
pub struct Catalog {
    raw: Vec<Destination>,
    latest_generation: u64,
}

impl Catalog {
    #[must_use]
    pub fn raw(&self) -> &[Destination] {
        &self.raw
    }

    pub fn begin_fetch(&mut self, source: CatalogSource) -> FetchTicket {
        self.latest_generation += 1;
        FetchTicket {
            generation: self.latest_generation,
            source,
        }
    }

    fn is_latest(&self, ticket: &FetchTicket) -> bool {
        ticket.generation == self.latest_generation
    }

    /// Replace the collection with a fetch result unless a newer fetch was
    /// issued in the meantime. Returns whether the result was applied.
    pub fn complete_fetch(&mut self, ticket: &FetchTicket, records: Vec<Destination>) -> bool {
        if !self.is_latest(ticket) {
            debug!(
                generation = ticket.generation,
                latest = self.latest_generation,
                "discarding stale destination response"
            );
            return false;
        }
        self.raw = records;
        true
    }

    /// A failed latest fetch leaves an empty collection behind
    pub fn fail_fetch(&mut self, ticket: &FetchTicket, error: &Error) -> bool {
        if !self.is_latest(ticket) {
            return false;
        }
        warn!(%error, source = ?ticket.source, "failed to load destinations");
        self.raw.clear();
        true
    }

    /// Fetch from `source` and apply the result if it is still the latest request
    pub async fn refresh(&mut self, fetcher: &CatalogFetcher, source: CatalogSource) -> Result<bool> {
        let ticket = self.begin_fetch(source);
        match fetcher.fetch(ticket.source()).await {
            Ok(records) => Ok(self.complete_fetch(&ticket, records)),
            Err(e) => {
                self.fail_fetch(&ticket, &e);
                Err(e)
            }
        }
    }

    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        derive_categories(&self.raw)
    }

    #[must_use]
    pub fn view(&self, state: &FilterState) -> Vec<&Destination> {
        apply_filters(&self.raw, state)
    }
}
