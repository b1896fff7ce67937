use crate::category::CategoryId;
use crate::filter::FilterState;
use log_error::LogError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::future::Future;
use tokio::task::JoinHandle;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Offer {
    pub id: String,
    pub title: String,
    pub price: Decimal,
    #[serde(default)]
    pub shop_name: String,
    #[serde(default)]
    pub click_url: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Product {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub producer_name: Option<String>,
    #[serde(default)]
    pub price_min: Option<Decimal>,
    #[serde(default)]
    pub price_max: Option<Decimal>,
    #[serde(default)]
    pub offer_count: u32,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub click_url: Option<String>,
    #[serde(default)]
    pub offer_with_best_price: Option<Offer>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Paging {
    pub current: u32,
    /// Number of pages.
    pub total: u32,
    #[serde(default)]
    pub url_template: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Sort {
    pub name: String,
    /// Value of the `sort:` url segment. Empty for the default ordering.
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub is_filter: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Query {
    #[serde(default)]
    pub phrase: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PriceRange {
    #[serde(default)]
    pub min: Option<Decimal>,
    #[serde(default)]
    pub max: Option<Decimal>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub is_filter: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Producer {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub is_filter: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PropertyValue {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub is_filter: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Property {
    pub id: u64,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub values: Vec<PropertyValue>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CategoryFacet {
    pub id: CategoryId,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub is_filter: bool,
}

/// Raw facet data returned alongside a listing, one list per dimension.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct FacetData {
    #[serde(default)]
    pub price_ranges: Vec<PriceRange>,
    #[serde(default)]
    pub producers: Vec<Producer>,
    #[serde(default)]
    pub properties: Vec<Property>,
    #[serde(default)]
    pub categories: Vec<CategoryFacet>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Metadata {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub paging: Paging,
    #[serde(default)]
    pub sorts: Vec<Sort>,
    #[serde(default)]
    pub canonical: String,
    #[serde(default)]
    pub query: Query,
    #[serde(default)]
    pub facets: FacetData,
    /// Filters resolved from the request url. Filled in by the url filters.
    #[serde(skip)]
    pub filter: FilterState,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Products {
    #[serde(default)]
    pub entities: Vec<Product>,
    #[serde(rename = "_metadata", default)]
    pub metadata: Metadata,
}

impl Products {
    pub fn is_empty(&self) -> bool {
        self.metadata.total == 0
    }
}

/// Product listing request that is already in flight.
pub struct ProductsFetch(JoinHandle<Result<Option<Products>, anyhow::Error>>);

impl ProductsFetch {
    pub fn spawn<F>(fetch: F) -> Self
    where
        F: Future<Output = Result<Option<Products>, anyhow::Error>> + Send + 'static,
    {
        Self(tokio::spawn(fetch))
    }

    pub fn ready(products: Option<Products>) -> Self {
        Self::spawn(async move { Ok(products) })
    }

    /// Waits for the listing. A failed fetch is logged and reported as no
    /// listing at all.
    pub async fn result(self) -> Option<Products> {
        self.0
            .await
            .map_err(anyhow::Error::from)
            .and_then(|res| res)
            .log_error("Unable to fetch products")
            .flatten()
    }
}

pub trait ProductRepository: Send + Sync {
    fn fetch_products_by_url(&self, url: &str, fields: &[&str], limit: usize) -> ProductsFetch;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn failed_fetch_is_absent_listing() {
        let fetch = ProductsFetch::spawn(async { Err(anyhow::anyhow!("timeout")) });
        assert_eq!(fetch.result().await, None);
    }

    #[tokio::test]
    async fn ready_fetch_yields_listing() {
        let products = Products::default();
        let fetch = ProductsFetch::ready(Some(products.clone()));
        assert_eq!(fetch.result().await, Some(products));
    }

    #[test]
    fn deserializes_api_listing() {
        let json = r#"{
            "entities": [{"id": "p1", "title": "Phone", "price_min": 99.5}],
            "_metadata": {
                "total": 1,
                "paging": {"current": 1, "total": 1},
                "facets": {
                    "producers": [{"slug": "acme", "name": "Acme", "total": 1}],
                    "price_ranges": [{"min": 10, "max": 100, "total": 1}]
                }
            }
        }"#;
        let products: Products = serde_json::from_str(json).expect("valid listing");
        assert_eq!(products.entities.len(), 1);
        assert_eq!(products.metadata.facets.producers[0].name, "Acme");
        assert!(!products.is_empty());
    }
}
