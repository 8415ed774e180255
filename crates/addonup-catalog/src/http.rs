use anyhow::{Context, Result};
use reqwest::blocking::Client;

use crate::wire::{parse_catalog_version, parse_item_info};
use crate::{CatalogSource, ItemInfo};

pub const DEFAULT_CATALOG_URL: &str = "https://addons-ecs.forgesvc.net/api/v2";

// The upstream service rejects requests with a non-browser agent.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/87.0.4280.88 Safari/537.36";

#[derive(Debug, Clone)]
pub struct HttpCatalog {
    base_url: String,
    client: Client,
}

impl HttpCatalog {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build catalog http client")?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    fn get_text(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("catalog request failed to send: {url}"))?;

        let status = response.status();
        let body = response
            .text()
            .with_context(|| format!("catalog response body was unreadable: {url}"))?;
        if !status.is_success() {
            anyhow::bail!("catalog request failed: status={status} body='{body}'");
        }
        Ok(body)
    }
}

impl CatalogSource for HttpCatalog {
    fn item_info(&self, id: u64) -> Result<ItemInfo> {
        let url = format!("{}/addon/{id}", self.base_url);
        let body = self.get_text(&url)?;
        parse_item_info(&body).with_context(|| format!("catalog item info for addon {id}"))
    }

    fn catalog_version(&self) -> Result<String> {
        let url = format!("{}/addon/timestamp", self.base_url);
        let body = self.get_text(&url)?;
        parse_catalog_version(&body)
    }
}
