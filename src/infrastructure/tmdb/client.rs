//! The Movie Database HTTP client.

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::dto::{ConfigurationResponse, GenresResponse};
use crate::domain::entities::{Configuration, Genre, ResultSet};
use crate::domain::errors::{CatalogError, NetworkError};
use crate::domain::ports::{ImageSourcePort, MovieCatalogPort};

/// Default API root.
pub const TMDB_API_BASE: &str = "https://api.themoviedb.org/3";
/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Catalog and poster client for TMDB.
pub struct TmdbClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl std::fmt::Debug for TmdbClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TmdbClient")
            .field("base_url", &self.base_url)
            .field("has_api_key", &self.api_key.is_some())
            .finish_non_exhaustive()
    }
}

impl TmdbClient {
    /// Creates a client against the public API.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn new(api_key: Option<String>) -> Result<Self, CatalogError> {
        Self::with_base_url(TMDB_API_BASE, api_key, DEFAULT_TIMEOUT)
    }

    /// Creates a client with a custom API root.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, CatalogError> {
        let url = format!("{}{path}", self.base_url);
        debug!(path, "Requesting catalog endpoint");

        let mut request = self.client.get(&url).query(query);
        if let Some(api_key) = &self.api_key {
            request = request.query(&[("api_key", api_key.as_str())]);
        }

        let body = self.send(request, path).await?;
        decode_body(&body)
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        endpoint: &str,
    ) -> Result<Bytes, CatalogError> {
        let response = request.send().await.map_err(|e| {
            warn!(endpoint, error = %e, "Failed to reach catalog");
            transport_error(&e)
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| transport_error(&e))?;

        if !status.is_success() {
            let error = error_from_status(status, &body);
            warn!(endpoint, %status, error = %error, "Catalog rejected request");
            return Err(error);
        }

        Ok(body)
    }
}

fn transport_error(error: &reqwest::Error) -> CatalogError {
    if error.is_timeout() {
        CatalogError::transport("request timed out")
    } else if error.is_connect() {
        CatalogError::transport("failed to connect to the catalog")
    } else {
        CatalogError::transport(error.to_string())
    }
}

/// Maps a non-success response to a catalog error.
///
/// Uses the API's status payload when the body carries one; otherwise the
/// HTTP status itself.
pub fn error_from_status(status: StatusCode, body: &[u8]) -> CatalogError {
    let detail = serde_json::from_slice::<NetworkError>(body).unwrap_or_else(|_| {
        NetworkError::new(
            i32::from(status.as_u16()),
            status.canonical_reason().unwrap_or("unexpected status"),
        )
    });

    if status.is_server_error() {
        CatalogError::Server(detail)
    } else {
        CatalogError::Client(detail)
    }
}

fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, CatalogError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(CatalogError::NoData);
    }
    serde_json::from_slice(body).map_err(|e| {
        warn!(error = %e, "Failed to parse catalog response");
        CatalogError::decode(e.to_string())
    })
}

#[async_trait]
impl MovieCatalogPort for TmdbClient {
    async fn get_configuration(&self) -> Result<Configuration, CatalogError> {
        let response: ConfigurationResponse = self.get_json("/configuration", &[]).await?;
        let configuration = Configuration::from(response);
        debug!(
            poster_sizes = configuration.poster_sizes.len(),
            "Loaded catalog configuration"
        );
        Ok(configuration)
    }

    async fn get_genres(&self) -> Result<BTreeSet<Genre>, CatalogError> {
        let response: GenresResponse = self.get_json("/genre/movie/list", &[]).await?;
        Ok(response.genres.into_iter().collect())
    }

    async fn search_movies(&self, query: &str, page: u32) -> Result<ResultSet, CatalogError> {
        let page = page.to_string();
        let results: ResultSet = self
            .get_json("/search/movie", &[("query", query), ("page", page.as_str())])
            .await?;
        debug!(query, %results, "Search page received");
        Ok(results)
    }
}

#[async_trait]
impl ImageSourcePort for TmdbClient {
    async fn fetch_image(&self, url: &str) -> Result<Bytes, CatalogError> {
        let body = self.send(self.client.get(url), url).await?;
        if body.is_empty() {
            return Err(CatalogError::NoData);
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::UNKNOWN_STATUS_CODE;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Serves one canned response and reports the request line.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request: Vec<u8> = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let request = String::from_utf8_lossy(&request);
            let request_line = request.lines().next().unwrap_or_default().to_string();
            let _ = tx.send(request_line);

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        (format!("http://{addr}"), rx)
    }

    fn client(base_url: &str) -> TmdbClient {
        TmdbClient::with_base_url(base_url, Some("secret".to_string()), Duration::from_secs(5))
            .unwrap()
    }

    #[test]
    fn test_client_creation() {
        assert!(TmdbClient::new(None).is_ok());
    }

    #[test]
    fn test_error_from_api_payload() {
        let body = br#"{"status_code":34,"status_message":"The resource you requested could not be found.","success":false}"#;

        let error = error_from_status(StatusCode::NOT_FOUND, body);

        assert_eq!(
            error,
            CatalogError::Client(NetworkError::new(
                34,
                "The resource you requested could not be found."
            ))
        );
    }

    #[test]
    fn test_error_synthesised_from_status() {
        let error = error_from_status(StatusCode::SERVICE_UNAVAILABLE, b"<html>busy</html>");

        assert_eq!(
            error,
            CatalogError::Server(NetworkError::new(503, "Service Unavailable"))
        );
    }

    #[test]
    fn test_empty_body_is_no_data() {
        assert_eq!(decode_body::<ResultSet>(b""), Err(CatalogError::NoData));
        assert_eq!(decode_body::<ResultSet>(b" \n"), Err(CatalogError::NoData));
    }

    #[test]
    fn test_invalid_json_is_decode_error() {
        let error = decode_body::<ResultSet>(b"{\"page\":").unwrap_err();
        assert!(matches!(error, CatalogError::Decode { .. }));
        assert_eq!(NetworkError::from(error).status_code, UNKNOWN_STATUS_CODE);
    }

    #[tokio::test]
    async fn test_search_sends_query_page_and_key() {
        let body = r#"{"page":2,"total_pages":3,"total_results":41,"results":[{"id":11,"title":"Star Wars","release_date":"1977-05-25"}]}"#;
        let (base_url, request) = serve_once("200 OK", body).await;

        let results = client(&base_url).search_movies("star wars", 2).await.unwrap();

        let request_line = request.await.unwrap();
        assert!(request_line.starts_with("GET /search/movie?"));
        assert!(request_line.contains("query=star+wars"));
        assert!(request_line.contains("page=2"));
        assert!(request_line.contains("api_key=secret"));
        assert_eq!(results.page, 2);
        assert_eq!(results.total_results, 41);
        assert_eq!(results.items[0].title(), "Star Wars");
    }

    #[tokio::test]
    async fn test_rejected_key_maps_to_client_error() {
        let body = r#"{"status_code":7,"status_message":"Invalid API key: You must be granted a valid key.","success":false}"#;
        let (base_url, _request) = serve_once("401 Unauthorized", body).await;

        let error = client(&base_url).get_configuration().await.unwrap_err();

        assert_eq!(error.api_status().map(|s| s.status_code), Some(7));
        assert!(matches!(error, CatalogError::Client(_)));
    }

    #[tokio::test]
    async fn test_image_fetch_omits_api_key() {
        let (base_url, request) = serve_once("200 OK", "bytes").await;

        let body = client(&base_url)
            .fetch_image(&format!("{base_url}/t/p/w185/a.jpg"))
            .await
            .unwrap();

        assert_eq!(&body[..], b"bytes");
        let request_line = request.await.unwrap();
        assert!(request_line.starts_with("GET /t/p/w185/a.jpg "));
        assert!(!request_line.contains("api_key"));
    }

    #[tokio::test]
    async fn test_unreachable_catalog_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let error = client(&format!("http://{addr}"))
            .get_genres()
            .await
            .unwrap_err();

        assert!(error.is_transport());
    }
}
