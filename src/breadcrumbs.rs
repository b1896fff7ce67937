use crate::categories_allowed::CategoriesAllowed;
use crate::filters::FilterGroup;
use itertools::Itertools;
use serde::Serialize;
use wl_types::category::Category;

pub const CURRENCY: &str = " zł";
pub const SEARCH_LABEL: &str = "Szukaj: ";

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Breadcrumb {
    pub title: String,
    pub url: Option<String>,
}

impl Breadcrumb {
    pub fn new(title: impl Into<String>, url: Option<String>) -> Self {
        Self {
            title: title.into(),
            url,
        }
    }

    pub fn label(title: impl Into<String>) -> Self {
        Self::new(title, None)
    }
}

pub struct BreadcrumbsBuilder<'a> {
    allowed: &'a CategoriesAllowed,
}

impl<'a> BreadcrumbsBuilder<'a> {
    pub fn new(allowed: &'a CategoriesAllowed) -> Self {
        Self { allowed }
    }

    /// Category path from the first allowed step down to the category itself.
    /// The allowed step is preceded by the labels of the groups listing it.
    pub fn build(&self, category: &Category, url: impl Fn(&str) -> String) -> Vec<Breadcrumb> {
        let Some(start) = self.allowed.first_visible(&category.path) else {
            return vec![];
        };
        let first = &category.path[start];
        self.allowed
            .group_names(first.id)
            .map(Breadcrumb::label)
            .chain(
                category.path[start..]
                    .iter()
                    .map(|step| Breadcrumb::new(step.title.clone(), Some(url(&step.url)))),
            )
            .collect()
    }

    pub fn search(&self, phrase: &str) -> Vec<Breadcrumb> {
        vec![Breadcrumb::label(format!("{SEARCH_LABEL}{}", phrase.trim()))]
    }
}

/// Appends one unlinked crumb summarizing the applied filters, e.g.
/// `Ceny: 100 - 500 zł, Producent: Apple`.
pub fn append_filter_summary(breadcrumbs: &[Breadcrumb], groups: &[FilterGroup]) -> Vec<Breadcrumb> {
    let summary = groups
        .iter()
        .map(|g| {
            let suffix = if g.is_price() { CURRENCY } else { "" };
            format!("{}: {}{suffix}", g.name, g.value())
        })
        .join(", ");
    let summary = summary.trim();
    let mut crumbs = breadcrumbs.to_vec();
    if !summary.is_empty() {
        crumbs.push(Breadcrumb::label(summary));
    }
    crumbs
}
