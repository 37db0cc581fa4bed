use async_trait::async_trait;
use hyper::client::HttpConnector;
use hyper::http::uri::InvalidUri;
use hyper::{Body, Client, Method, Request, Uri};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use serde_json::Value;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

use crate::errors::UpdateError;
use crate::middleware::add_request_headers;


/// Where the upstream document comes from.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    fn url(&self) -> &str;

    async fn fetch(&self) -> Result<Value, UpdateError>;
}

/// Single-shot GET over HTTP or HTTPS. No retries.
pub struct HttpFetcher {
    client: Client<HttpsConnector<HttpConnector>>,
    url: String,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        let https = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .build();
        Self {
            client: Client::builder().build(https),
            url: url.into(),
            timeout,
        }
    }
}

#[async_trait]
impl DocumentSource for HttpFetcher {
    fn url(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> Result<Value, UpdateError> {
        let uri: Uri = self
            .url
            .parse()
            .map_err(|e: InvalidUri| UpdateError::InvalidUri(e.to_string()))?;

        let mut req = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .map_err(|e| UpdateError::InvalidUri(e.to_string()))?;
        add_request_headers(req.headers_mut());

        let exchange = async {
            let response = self.client.request(req).await?;
            let status = response.status();
            let body = hyper::body::to_bytes(response.into_body()).await?;
            Ok::<_, hyper::Error>((status, body))
        };

        let (status, body) = match timeout(self.timeout, exchange).await {
            Ok(result) => result.map_err(|e| UpdateError::Network(e.to_string()))?,
            Err(_) => return Err(UpdateError::Timeout(self.timeout)),
        };
        debug!(%status, bytes = body.len(), "upstream responded");

        if !status.is_success() {
            return Err(UpdateError::Http { status });
        }

        serde_json::from_slice(&body).map_err(UpdateError::Parse)
    }
}
