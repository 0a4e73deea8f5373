//! HTTP Ledger Client
//!
//! [`Ledger`] implementation over the ledger's REST API using `reqwest`.
//! No timeout is configured: a hung request only stalls the caller awaiting it.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::{ClaimRequest, Ledger, LedgerError, RegisterRequest, SignupReceipt, Tally, UserProfile};

/// Ledger reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpLedger {
    base_url: Url,
    client: Client,
}

impl HttpLedger {
    pub fn new(base_url: &str) -> Result<Self, LedgerError> {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: &str, client: Client) -> Result<Self, LedgerError> {
        let parsed = Url::parse(base_url).map_err(|e| LedgerError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(LedgerError::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self { base_url: parsed, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends path segments to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        tracing::trace!("ledger request {}", url);
        url
    }
}

/// Rejects any non-2xx response.
fn require_success(response: Response) -> Result<Response, LedgerError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        tracing::debug!("ledger rejected {}: {}", response.url(), status);
        Err(LedgerError::status(status.as_u16()))
    }
}

/// Reads the whole body and decodes it as JSON.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, LedgerError> {
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(LedgerError::Decode)
}

#[async_trait]
impl Ledger for HttpLedger {
    async fn register(&self, id: &str, opts_in: Option<bool>) -> Result<SignupReceipt, LedgerError> {
        let mut request = self.client.post(self.endpoint(&["user", id]));
        if let Some(opts_in) = opts_in {
            request = request.json(&RegisterRequest { opts_in });
        }
        let response = request.send().await?;

        // Registration is strict: only 200 counts.
        if response.status() != StatusCode::OK {
            return Err(LedgerError::status(response.status().as_u16()));
        }
        decode(response).await
    }

    async fn list_users(&self) -> Result<Vec<String>, LedgerError> {
        let response = self.client.get(self.endpoint(&["user"])).send().await?;
        decode(require_success(response)?).await
    }

    async fn profile(&self, id: &str) -> Result<UserProfile, LedgerError> {
        let response = self.client.get(self.endpoint(&["user", id])).send().await?;
        decode(require_success(response)?).await
    }

    async fn tally(&self, id: &str) -> Result<Tally, LedgerError> {
        let response = self
            .client
            .get(self.endpoint(&["points", id, "tally"]))
            .send()
            .await?;
        decode(require_success(response)?).await
    }

    async fn transfer(&self, from: &str, to: &str, amount: u64) -> Result<(), LedgerError> {
        let amount = amount.to_string();
        let response = self
            .client
            .put(self.endpoint(&["points", "transfer", from, to, &amount]))
            .send()
            .await?;
        require_success(response)?;
        Ok(())
    }

    async fn claim(&self, id: &str, index: usize) -> Result<(), LedgerError> {
        let response = self
            .client
            .put(self.endpoint(&["points", "claim", id]))
            .json(&ClaimRequest { index })
            .send()
            .await?;
        require_success(response)?;
        Ok(())
    }
}
