use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::Serialize;

use crate::{InventoryBackend, InventoryError, Item, ItemQuery};

/// Where the inventory API listens by default.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

#[derive(Serialize)]
struct PurchaseRequest {
    id: u64,
    quantity: i64,
}

/// A client of the inventory HTTP API.
#[derive(Clone, Debug)]
pub struct HttpInventory {
    client: Client,
    base_url: String,
}

impl HttpInventory {
    /// Creates a client for the API at `base_url`.
    #[inline]
    pub fn new(base_url: &str) -> Result<Self, InventoryError> {
        Self::with_client(Client::new(), base_url)
    }

    /// Creates a client for the API at `base_url` that sends requests with
    /// `client`.
    pub fn with_client(
        client: Client,
        base_url: &str,
    ) -> Result<Self, InventoryError> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        Url::parse(&base_url)
            .map_err(|err| InventoryError::InvalidUrl(format!("{err}")))?;
        Ok(Self { client, base_url })
    }

    /// Returns the base URL of the API.
    #[inline]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Url, InventoryError> {
        let url = format!("{}{path}", self.base_url);
        Url::parse_with_params(&url, params)
            .map_err(|err| InventoryError::InvalidUrl(format!("{err}")))
    }
}

#[async_trait]
impl InventoryBackend for HttpInventory {
    async fn categories(&self) -> Result<Vec<String>, InventoryError> {
        let url = self.url("/category", &[])?;
        debug!("GET {url}");
        let resp = check_status(self.client.get(url).send().await?).await?;
        Ok(resp.json().await?)
    }

    async fn get_items(
        &self,
        query: &ItemQuery,
    ) -> Result<Vec<Item>, InventoryError> {
        let params = match query {
            ItemQuery::All => vec![],
            // An empty filter would select everything on the server side.
            ItemQuery::Ids(ids) if ids.is_empty() => return Ok(vec![]),
            ItemQuery::Categories(c) if c.is_empty() => return Ok(vec![]),
            ItemQuery::Ids(ids) => {
                let ids: Vec<_> = ids.iter().map(u64::to_string).collect();
                vec![("id", ids.join(","))]
            }
            ItemQuery::Categories(categories) => {
                vec![("category", categories.join(","))]
            }
        };
        let url = self.url("/item", &params)?;
        debug!("GET {url}");
        let resp = check_status(self.client.get(url).send().await?).await?;
        Ok(resp.json().await?)
    }

    async fn purchase(
        &self,
        id: u64,
        quantity: i64,
    ) -> Result<Item, InventoryError> {
        let url = self.url("/item/purchase", &[])?;
        debug!("POST {url} ({id} x {quantity})");
        let resp = self
            .client
            .post(url)
            .json(&PurchaseRequest { id, quantity })
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(InventoryError::NotFound(id));
        }
        let resp = check_status(resp).await?;
        Ok(resp.json().await?)
    }
}

async fn check_status(resp: Response) -> Result<Response, InventoryError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    warn!("inventory API returned {status}: {body}");
    Err(InventoryError::Status {
        status: status.as_u16(),
        body,
    })
}
