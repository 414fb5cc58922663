// sieve-core/src/infrastructure/adapters/http.rs

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

use crate::error::SieveError;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::UrlProber;

const USER_AGENT: &str = concat!("sieve/", env!("CARGO_PKG_VERSION"));

/// Liveness check over HTTP: HEAD first, GET when the server refuses HEAD.
pub struct HttpProber {
    client: Client,
}

impl HttpProber {
    pub fn new(timeout: Duration) -> Result<Self, SieveError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(InfrastructureError::Http)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl UrlProber for HttpProber {
    async fn probe(&self, url: &str) -> Result<bool, SieveError> {
        let head = self
            .client
            .head(url)
            .send()
            .await
            .map_err(InfrastructureError::Http)?;

        let status = if head.status() == StatusCode::METHOD_NOT_ALLOWED {
            self.client
                .get(url)
                .send()
                .await
                .map_err(InfrastructureError::Http)?
                .status()
        } else {
            head.status()
        };

        debug!(url, status = status.as_u16(), "Probed URL");
        Ok(status.as_u16() < 400)
    }
}
