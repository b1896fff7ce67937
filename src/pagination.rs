use wl_types::filter::{PAGE_KEY, PAGE_PLACEHOLDER};
use wl_types::product::Products;

/// Pages shown on each side of the current one.
const WINDOW: u32 = 2;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pagination {
    /// Number of pages.
    pub total: u32,
    pub current_page: u32,
    pub url_template: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageLink {
    pub number: u32,
    pub url: String,
    pub is_current: bool,
}

impl Pagination {
    pub fn from_products(products: Option<&Products>) -> Self {
        products
            .map(|p| Self {
                total: p.metadata.paging.total,
                current_page: p.metadata.paging.current.max(1),
                url_template: p.metadata.paging.url_template.clone(),
            })
            .unwrap_or_default()
    }

    /// Url of a page. The first page has no page segment.
    pub fn url(&self, page: u32) -> String {
        if page <= 1 {
            return self
                .url_template
                .replace(&format!("/{PAGE_KEY}:{PAGE_PLACEHOLDER}"), "");
        }
        self.url_template.replace(PAGE_PLACEHOLDER, &page.to_string())
    }

    pub fn is_paged(&self) -> bool {
        self.total > 1
    }

    pub fn previous(&self) -> Option<String> {
        (self.current_page > 1 && self.is_paged()).then(|| self.url(self.current_page - 1))
    }

    pub fn next(&self) -> Option<String> {
        (self.current_page < self.total).then(|| self.url(self.current_page + 1))
    }

    pub fn pages(&self) -> Vec<PageLink> {
        if !self.is_paged() {
            return vec![];
        }
        let first = self.current_page.saturating_sub(WINDOW).max(1);
        let last = self.current_page.saturating_add(WINDOW).min(self.total);
        (first..=last)
            .map(|number| PageLink {
                number,
                url: self.url(number),
                is_current: number == self.current_page,
            })
            .collect()
    }
}
