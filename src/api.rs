use anyhow::Context;
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest_middleware::ClientWithMiddleware;
use serde::de::DeserializeOwned;
use typesafe_repository::async_ops::{Get, Select};
use typesafe_repository::prelude::*;
use url::Url;
use wl_types::category::{ByUrl, Category, CategoryRepository};
use wl_types::product::{ProductRepository, Products, ProductsFetch};

/// Client of the remote catalog API serving categories and product listings.
#[derive(Clone)]
pub struct CatalogApi {
    client: ClientWithMiddleware,
    base: Url,
    token: Option<String>,
}

impl CatalogApi {
    pub fn new(
        client: ClientWithMiddleware,
        base: &str,
        token: Option<String>,
    ) -> Result<Self, anyhow::Error> {
        let base = Url::parse(base).with_context(|| format!("Invalid catalog api url {base}"))?;
        Ok(Self {
            client,
            base,
            token: token.filter(|t| !t.is_empty()),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base.as_str().trim_end_matches('/'))
    }

    /// GETs a json document. A 404 is reported as `None`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>, anyhow::Error> {
        let url = self.endpoint(path);
        let mut req = self.client.get(&url).query(query);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let res = req.send().await?;
        if res.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let res = res
            .error_for_status()
            .with_context(|| format!("Catalog api request {url} failed"))?;
        let body = res.text().await?;
        let value = serde_json::from_str(&body)
            .with_context(|| format!("Unexpected catalog api response from {url}"))?;
        Ok(Some(value))
    }
}

impl Repository<Category> for CatalogApi {
    type Error = anyhow::Error;
}

#[async_trait]
impl Get<Category> for CatalogApi {
    async fn get_one(&self, id: &IdentityOf<Category>) -> Result<Option<Category>, Self::Error> {
        self.get_json(&format!("categories/{id}"), &[]).await
    }
}

#[async_trait]
impl Select<Category, ByUrl> for CatalogApi {
    async fn select(&self, ByUrl(url): &ByUrl) -> Result<Vec<Category>, Self::Error> {
        Ok(self
            .get_json("categories", &[("url", url.clone())])
            .await?
            .into_iter()
            .collect())
    }
}

impl CategoryRepository for CatalogApi {}

impl ProductRepository for CatalogApi {
    fn fetch_products_by_url(&self, url: &str, fields: &[&str], limit: usize) -> ProductsFetch {
        let api = self.clone();
        let query = vec![
            ("url", url.to_string()),
            ("fields", fields.join(",")),
            ("limit", limit.to_string()),
        ];
        ProductsFetch::spawn(async move { api.get_json::<Products>("products", &query).await })
    }
}
