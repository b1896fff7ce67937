use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::Path;
use wl_types::category::{Category, CategoryId, PathStep};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryGroup {
    pub name: String,
    #[serde(default)]
    pub categories: HashSet<CategoryId>,
}

#[derive(Debug, Display, Error)]
#[display("Category {id} is not allowed")]
pub struct CategoryNotAllowed {
    pub id: CategoryId,
}

/// Which categories are publicly navigable, and the group labels shown in
/// front of them in breadcrumbs. Loaded once at startup.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct CategoriesAllowed {
    #[serde(default)]
    allowed: HashSet<CategoryId>,
    #[serde(default)]
    groups: Vec<CategoryGroup>,
}

impl CategoriesAllowed {
    pub fn new(allowed: impl IntoIterator<Item = CategoryId>, groups: Vec<CategoryGroup>) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
            groups,
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let path = path.as_ref();
        let input = match std::fs::read_to_string(path) {
            Ok(input) => input,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                log::warn!(
                    "Allowed categories file {} not found, no category will be visible",
                    path.display()
                );
                return Ok(Self::default());
            }
            Err(err) => return Err(err.into()),
        };
        let policy: Self = serde_yaml::from_str(&input)?;
        log::info!(
            "Loaded {} allowed categories in {} groups",
            policy.allowed.len(),
            policy.groups.len()
        );
        Ok(policy)
    }

    pub fn is_category_allowed(&self, id: CategoryId) -> bool {
        self.allowed.contains(&id)
    }

    pub fn allowed_category_ids(&self) -> &HashSet<CategoryId> {
        &self.allowed
    }

    pub fn grouped_allowed_categories(&self) -> &[CategoryGroup] {
        &self.groups
    }

    /// Names of every group listing the category, in configuration order.
    pub fn group_names(&self, id: CategoryId) -> impl Iterator<Item = &str> {
        self.groups
            .iter()
            .filter(move |g| g.categories.contains(&id))
            .map(|g| g.name.as_str())
    }

    /// Index of the first path step that starts the visible part of the tree.
    pub fn first_visible(&self, path: &[PathStep]) -> Option<usize> {
        path.iter().position(|step| self.is_category_allowed(step.id))
    }

    /// A category is reachable when it or one of its ancestors is allowed.
    pub fn check_allowed_category(&self, category: &Category) -> Result<(), CategoryNotAllowed> {
        let allowed = self.is_category_allowed(category.id)
            || self.first_visible(&category.path).is_some();
        if allowed {
            Ok(())
        } else {
            Err(CategoryNotAllowed { id: category.id })
        }
    }
}
