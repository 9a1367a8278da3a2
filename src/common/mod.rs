use std::fmt;

use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::warn;
use url::Url;

use crate::{config::AppConfig, error::Result, Error};

/// Remote identifiers come as either numbers or strings depending on the endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl Default for RecordId {
    fn default() -> Self {
        RecordId::Text(String::new())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(id) => write!(f, "{id}"),
            RecordId::Text(id) => write!(f, "{id}"),
        }
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        RecordId::Number(id)
    }
}

impl From<&str> for RecordId {
    /// Numeric strings become numbers, the way the API keys its records
    fn from(id: &str) -> Self {
        match id.trim().parse::<i64>() {
            Ok(number) => RecordId::Number(number),
            Err(_) => RecordId::Text(id.to_string()),
        }
    }
}

impl RecordId {
    /// The id as one URL path segment. Text ids that would be dropped or
    /// change the path on their own (empty, `.` or `..`) are refused.
    pub fn as_segment(&self) -> Result<String> {
        let segment = self.to_string();
        match segment.trim() {
            "" | "." | ".." => Err(Error::InvalidArgument(format!(
                "'{segment}' is not a usable record id"
            ))),
            _ => Ok(segment),
        }
    }
}

/// `base` followed by `segments`. Every segment is percent-encoded on its own,
/// so `/` or `?` inside one never reaches another endpoint.
pub fn api_url(base: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|()| Error::InvalidArgument(format!("'{base}' cannot be used as a base URL")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Build the HTTP client shared by all API collaborators
pub fn http_client(config: &AppConfig) -> Result<Client> {
    let client = Client::builder()
        .timeout(config.get_request_timeout())
        .build()?;
    Ok(client)
}

#[derive(Deserialize)]
struct ApiMessage {
    message: Option<String>,
    error: Option<String>,
}

/// Pass successful responses through, turn everything else into `Error::Api`
/// carrying the server's message when it sent one
pub async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = match response.json::<ApiMessage>().await {
        Ok(body) => body.message.or(body.error),
        Err(_) => None,
    }
    .unwrap_or_else(|| format!("Server returned {} status", status.as_u16()));
    warn!(status = status.as_u16(), %message, "API request failed");

    if status == StatusCode::UNAUTHORIZED {
        return Err(Error::InvalidCredentials);
    }
    Err(Error::Api {
        status: status.as_u16(),
        message,
    })
}

/// Case-insensitive substring check; `needle` must already be lower-cased
pub fn contains_lowercase(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

pub mod prelude {
    pub use super::{api_url, check_status, contains_lowercase, http_client, RecordId};
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_record_id_from_wire() {
        let ids: Vec<RecordId> = serde_json::from_str(r#"[7, "abc", "12"]"#).unwrap();
        assert_eq!(ids[0], RecordId::Number(7));
        assert_eq!(ids[1], RecordId::Text("abc".to_string()));
        // strings stay strings on the wire; only CLI input is coerced
        assert_eq!(ids[2], RecordId::Text("12".to_string()));
        assert_eq!(RecordId::from("12"), RecordId::Number(12));
        assert_eq!(RecordId::from("x-1").to_string(), "x-1");
    }

    #[test]
    fn test_api_url_encodes_each_segment() {
        let url = api_url("http://localhost:9000", &["api", "v1", "destination", "a/b?c"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:9000/api/v1/destination/a%2Fb%3Fc");

        let url = api_url("http://localhost:9000/prefix/", &["api", "v1", "user", "asha@example.com"])
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:9000/prefix/api/v1/user/asha@example.com");

        assert!(matches!(api_url("not a url", &["api"]), Err(Error::Url(_))));
        assert!(matches!(
            api_url("mailto:someone@example.com", &["api"]),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_dot_segments_are_refused() {
        assert_eq!(RecordId::Number(7).as_segment().unwrap(), "7");
        assert_eq!(RecordId::from("goa-1").as_segment().unwrap(), "goa-1");
        assert!(RecordId::from("..").as_segment().is_err());
        assert!(RecordId::from(".").as_segment().is_err());
        assert!(RecordId::Text(String::new()).as_segment().is_err());
    }

    #[test]
    fn test_contains_lowercase() {
        assert!(contains_lowercase("Everest Base", "everest"));
        assert!(!contains_lowercase("Everest Base", "EVEREST"));
        assert!(contains_lowercase("anything", ""));
    }

    #[tokio::test]
    async fn test_check_status_maps_errors() {
        use httpmock::prelude::*;

        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/conflict");
                then.status(400)
                    .header("content-type", "application/json")
                    .body(r#"{"error": "Destination already exists"}"#);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/denied");
                then.status(401);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/broken");
                then.status(500).body("oops");
            })
            .await;

        let conflict = reqwest::get(server.url("/conflict")).await.unwrap();
        match check_status(conflict).await {
            Err(Error::Api { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "Destination already exists");
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let denied = reqwest::get(server.url("/denied")).await.unwrap();
        assert!(matches!(
            check_status(denied).await,
            Err(Error::InvalidCredentials)
        ));

        let broken = reqwest::get(server.url("/broken")).await.unwrap();
        match check_status(broken).await {
            Err(Error::Api { message, .. }) => assert_eq!(message, "Server returned 500 status"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
