use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use crate::services::catalog_api::{CatalogApi, ResourceDetail, ResourceRef};

/// Client for a CKAN open-data portal's action API.
pub struct CkanClient {
    base_url: String,
    http: reqwest::Client,
}

impl CkanClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn action(&self, action: &str, id: &str) -> Result<Value> {
        let url = format!("{}/api/3/action/{}", self.base_url, action);

        let response = self
            .http
            .get(&url)
            .query(&[("id", id)])
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to send {action} request: {e}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("{action} returned status {status}: {body}"));
        }

        response
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to parse {action} response: {e}"))
    }
}

#[async_trait]
impl CatalogApi for CkanClient {
    async fn package_resources(&self, dataset_id: &str) -> Result<Vec<ResourceRef>> {
        let json = self.action("package_show", dataset_id).await?;

        // Parse as generic JSON and extract only the fields we need
        let resources = json["result"]["resources"]
            .as_array()
            .cloned()
            .unwrap_or_default();

        let refs = resources
            .into_iter()
            .filter_map(|item| {
                let id = item["id"].as_str()?.to_string();
                let name = item["name"].as_str().unwrap_or("").to_string();
                let datastore_active = item["datastore_active"].as_bool().unwrap_or(false);

                Some(ResourceRef {
                    id,
                    name,
                    datastore_active,
                })
            })
            .collect();

        Ok(refs)
    }

    async fn resource_detail(&self, resource_id: &str) -> Result<ResourceDetail> {
        let json = self.action("resource_show", resource_id).await?;
        let result = &json["result"];

        let name = result["name"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("resource_show result missing name"))?
            .to_string();
        let url = result["url"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("resource_show result missing url"))?
            .to_string();

        Ok(ResourceDetail { name, url })
    }
}
