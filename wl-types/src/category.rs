use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use typesafe_repository::async_ops::{Get, Select};
use typesafe_repository::macros::Id;
use typesafe_repository::prelude::*;
use typesafe_repository::{SelectBy, Selector};

pub type CategoryId = u64;

/// One step of a category's ancestor path, root first.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PathStep {
    pub id: CategoryId,
    pub title: String,
    pub url: String,
}

#[derive(Id, Serialize, Deserialize, Clone, Debug)]
pub struct Category {
    #[id]
    pub id: CategoryId,
    pub title: String,
    pub url: String,
    /// Ancestors from the root down to and including the category itself.
    #[serde(default)]
    pub path: Vec<PathStep>,
}

impl Category {
    pub fn parent(&self) -> Option<&PathStep> {
        match self.path.as_slice() {
            [.., parent, last] if last.id == self.id => Some(parent),
            [.., last] if last.id != self.id => Some(last),
            _ => None,
        }
    }
}

impl PartialEq for Category {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Category {}

impl std::hash::Hash for Category {
    fn hash<H>(&self, state: &mut H)
    where
        H: std::hash::Hasher,
    {
        self.id.hash(state)
    }
}

/// Selects categories by their url slug.
pub struct ByUrl(pub String);

impl Selector for ByUrl {}
impl SelectBy<ByUrl> for Category {}

#[async_trait]
pub trait CategoryRepository:
    Repository<Category, Error = anyhow::Error>
    + Get<Category>
    + Select<Category, ByUrl>
    + Send
    + Sync
{
    async fn get_by_url(&self, url: &str) -> Result<Option<Category>, Self::Error> {
        Ok(self
            .select(&ByUrl(url.to_string()))
            .await?
            .into_iter()
            .next())
    }
}
