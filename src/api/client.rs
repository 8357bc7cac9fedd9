use futures::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Largest response body accepted from the API.
const MAX_RESPONSE_SIZE: usize = 10 * 1024 * 1024; // 10MB

const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// Errors from a single API call.
///
/// Every variant renders as "Request failed: ..." so callers can surface them
/// uniformly. [`ApiError::is_transport`] separates failures where no usable
/// response arrived from those where the server answered with an error status.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[source] reqwest::Error),
    /// Request exceeded the configured timeout
    #[error("Request failed: timed out")]
    Timeout,
    /// Server answered with a non-2xx status
    #[error("Request failed: HTTP status {0}")]
    HttpStatus(u16),
    /// Body was not the JSON shape we expected
    #[error("Request failed: invalid JSON ({0})")]
    Parse(#[from] serde_json::Error),
    /// Body exceeded the 10MB limit
    #[error("Request failed: response too large")]
    ResponseTooLarge,
    /// Base URL cannot carry path segments (e.g. `mailto:`)
    #[error("Request failed: invalid base URL '{0}'")]
    InvalidBaseUrl(String),
}

impl ApiError {
    /// True when the request never produced a usable response.
    ///
    /// HTTP status errors are the only non-transport failures.
    pub fn is_transport(&self) -> bool {
        !matches!(self, ApiError::HttpStatus(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::Network(e)
        }
    }
}

/// HTTP client for a JSONPlaceholder-style REST API.
///
/// Each collection (`posts`, `comments`, ...) lives under the base URL and
/// supports list, get-by-id, filter-by-query, create, update and delete.
/// Cheap to clone: the inner `reqwest::Client` is reference counted, so
/// spawned request tasks take their own copy.
#[derive(Clone, Debug)]
pub struct ResourceClient {
    http: reqwest::Client,
    base: Url,
}

impl ResourceClient {
    /// Build a client for `base_url` with connection pooling.
    ///
    /// `timeout` of `None` leaves requests unbounded.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(60));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ApiError::Network)?;
        Self::with_http(http, base_url)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_http(http: reqwest::Client, base_url: &str) -> Result<Self, ApiError> {
        let base =
            Url::parse(base_url).map_err(|_| ApiError::InvalidBaseUrl(base_url.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// `<base>/<segments...>`, each segment percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// `GET /{collection}`
    pub async fn list<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>, ApiError> {
        let url = self.url(&[collection])?;
        self.fetch_json(self.http.get(url)).await
    }

    /// `GET /{collection}/{id}`
    ///
    /// `id` is passed through as typed by the user; it is only encoded, never
    /// validated.
    pub async fn get<T: DeserializeOwned>(&self, collection: &str, id: &str) -> Result<T, ApiError> {
        let url = self.url(&[collection, id])?;
        self.fetch_json(self.http.get(url)).await
    }

    /// `GET /{collection}?{key}={value}`
    pub async fn filter<T: DeserializeOwned>(
        &self,
        collection: &str,
        key: &str,
        value: &str,
    ) -> Result<Vec<T>, ApiError> {
        let mut url = self.url(&[collection])?;
        url.query_pairs_mut().append_pair(key, value);
        self.fetch_json(self.http.get(url)).await
    }

    /// `POST /{collection}` with a JSON body; returns the created record.
    pub async fn create<B, T>(&self, collection: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(&[collection])?;
        self.fetch_json(self.with_json(Method::POST, url, body)?)
            .await
    }

    /// `PUT /{collection}/{id}` with a JSON body; returns the updated record.
    pub async fn update<B, T>(&self, collection: &str, id: i64, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(&[collection, &id.to_string()])?;
        self.fetch_json(self.with_json(Method::PUT, url, body)?)
            .await
    }

    /// `DELETE /{collection}/{id}`; the response body is ignored.
    pub async fn delete(&self, collection: &str, id: i64) -> Result<(), ApiError> {
        let url = self.url(&[collection, &id.to_string()])?;
        self.send(self.http.delete(url)).await?;
        Ok(())
    }

    fn with_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: &B,
    ) -> Result<RequestBuilder, ApiError> {
        let bytes = serde_json::to_vec(body)?;
        Ok(self
            .http
            .request(method, url)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(bytes))
    }

    async fn fetch_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let bytes = self.send(request).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Vec<u8>, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        tracing::debug!(
            url = %response.url(),
            status = status.as_u16(),
            "API response"
        );

        if !status.is_success() {
            return Err(ApiError::HttpStatus(status.as_u16()));
        }

        read_limited_bytes(response, MAX_RESPONSE_SIZE).await
    }
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, ApiError> {
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(ApiError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(ApiError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: i64,
        title: String,
    }

    fn client(server: &MockServer) -> ResourceClient {
        ResourceClient::new(&server.uri(), Some(Duration::from_secs(5))).unwrap()
    }

    #[tokio::test]
    async fn test_list_parses_sequence() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/posts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "title": "A"},
                {"id": 2, "title": "B"}
            ])))
            .mount(&server)
            .await;

        let items: Vec<Item> = client(&server).list("posts").await.unwrap();
        assert_eq!(
            items,
            vec![
                Item { id: 1, title: "A".into() },
                Item { id: 2, title: "B".into() }
            ]
        );
    }

    #[tokio::test]
    async fn test_get_encodes_id_segment() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/posts/1%202"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server)
            .get::<Item>("posts", "1 2")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::HttpStatus(404)));
        assert!(!err.is_transport());
    }

    #[tokio::test]
    async fn test_filter_sends_query_param() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/comments"))
            .and(query_param("postId", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 11, "title": "c"}
            ])))
            .mount(&server)
            .await;

        let items: Vec<Item> = client(&server)
            .filter("comments", "postId", "3")
            .await
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, 11);
    }

    #[tokio::test]
    async fn test_create_posts_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/albums"))
            .and(header("content-type", JSON_CONTENT_TYPE))
            .and(body_json(json!({"title": "Holiday", "userId": 7})))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!({"id": 101, "title": "Holiday"})),
            )
            .mount(&server)
            .await;

        let created: Item = client(&server)
            .create("albums", &json!({"title": "Holiday", "userId": 7}))
            .await
            .unwrap();
        assert_eq!(created.id, 101);
    }

    #[tokio::test]
    async fn test_update_puts_to_record_path() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/posts/4"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": 4, "title": "new"})),
            )
            .mount(&server)
            .await;

        let updated: Item = client(&server)
            .update("posts", 4, &json!({"title": "new"}))
            .await
            .unwrap();
        assert_eq!(updated.title, "new");
    }

    #[tokio::test]
    async fn test_delete_ignores_body() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/users/2"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;

        client(&server).delete("users", 2).await.unwrap();
    }

    #[tokio::test]
    async fn test_malformed_json_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
            .mount(&server)
            .await;

        let err = client(&server).list::<Item>("posts").await.unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
        assert!(err.is_transport());
        assert!(err.to_string().starts_with("Request failed"));
    }

    #[tokio::test]
    async fn test_server_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server).list::<Item>("posts").await.unwrap_err();
        assert!(matches!(err, ApiError::HttpStatus(503)));
    }

    #[tokio::test]
    async fn test_base_url_with_path_prefix() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/albums"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let client =
            ResourceClient::new(&format!("{}/api/", server.uri()), None).unwrap();
        let items: Vec<Item> = client.list("albums").await.unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_rejects_non_base_url() {
        let err = ResourceClient::new("mailto:someone@example.com", None).unwrap_err();
        assert!(matches!(err, ApiError::InvalidBaseUrl(_)));
    }

    #[test]
    fn test_rejects_unparseable_url() {
        assert!(ResourceClient::new("not a url", None).is_err());
    }
}
