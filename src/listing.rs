use crate::breadcrumbs::{append_filter_summary, Breadcrumb, BreadcrumbsBuilder};
use crate::categories_allowed::CategoriesAllowed;
use crate::filters::{
    category_filters, extract_selected, price_filters, producer_filters, property_filters, Facets,
    FilterGroup,
};
use crate::pagination::Pagination;
use crate::routing::{Route, UrlBuilder};
use crate::url_filter::UrlFilter;
use actix_web::http::StatusCode;
use std::sync::Arc;
use wl_types::category::{Category, CategoryRepository};
use wl_types::filter::FilterState;
use wl_types::product::{ProductRepository, Products, Sort};

pub const PAGE_SIZE: usize = 24;

pub const PRODUCT_FIELDS: &[&str] = &[
    "id",
    "title",
    "url",
    "producer_name",
    "price_min",
    "price_max",
    "offer_count",
    "image",
    "click_url",
    "offer_with_best_price",
    "category_id",
    "_metadata",
    "_categories.url_in",
];

pub struct ListingView {
    pub category: Option<Category>,
    pub phrase: Option<String>,
    pub products: Products,
    pub breadcrumbs: Vec<Breadcrumb>,
    pub pagination: Pagination,
    pub subcategories: Facets,
    pub price_filters: Facets,
    pub producer_filters: Facets,
    pub property_filters: Vec<Facets>,
    pub selected_filters: Vec<FilterGroup>,
    pub sorts: Vec<Sort>,
    pub canonical: String,
    pub h1: String,
    pub title: String,
}

impl ListingView {
    /// Facet collections in sidebar order.
    pub fn facet_groups(&self) -> Vec<&Facets> {
        [&self.subcategories, &self.price_filters, &self.producer_filters]
            .into_iter()
            .chain(self.property_filters.iter())
            .collect()
    }
}

/// Listing without products, rendered with a status other than 200.
pub struct EmptyView {
    pub status: StatusCode,
    pub phrase: Option<String>,
    pub breadcrumbs: Vec<Breadcrumb>,
    pub selected_filters: Vec<FilterGroup>,
    pub canonical: String,
    pub title: String,
}

pub enum ListingOutcome {
    Page(Box<ListingView>),
    Empty(EmptyView),
    /// Permanent redirect.
    Redirect(String),
    NotFound,
}

pub struct CatalogService {
    categories: Arc<dyn CategoryRepository>,
    products: Arc<dyn ProductRepository>,
    allowed: Arc<CategoriesAllowed>,
    urls: Arc<dyn UrlBuilder>,
}

impl CatalogService {
    pub fn new(
        categories: Arc<dyn CategoryRepository>,
        products: Arc<dyn ProductRepository>,
        allowed: Arc<CategoriesAllowed>,
        urls: Arc<dyn UrlBuilder>,
    ) -> Self {
        Self {
            categories,
            products,
            allowed,
            urls,
        }
    }

    pub fn allowed(&self) -> &CategoriesAllowed {
        &self.allowed
    }

    pub fn urls(&self) -> &dyn UrlBuilder {
        self.urls.as_ref()
    }

    pub async fn category_page(&self, path: &str) -> Result<ListingOutcome, anyhow::Error> {
        let filter = UrlFilter::category(self.urls.clone());
        let state = filter.parse(path);
        let Some(slug) = state.category_slug().filter(|s| !s.is_empty()) else {
            return Ok(ListingOutcome::NotFound);
        };
        let Some(mut category) = self.categories.get_by_url(slug).await? else {
            log::info!("Category {slug} not found");
            return Ok(ListingOutcome::NotFound);
        };
        if let Err(err) = self.allowed.check_allowed_category(&category) {
            log::info!("{err}, redirecting to homepage");
            return Ok(ListingOutcome::Redirect(self.urls.url(Route::Homepage, "")));
        }

        let mut products = self.fetch(&filter, &state).await;
        filter.filter(products.as_mut(), &state);
        filter.filter_category(&mut category);
        let products = products.as_ref();

        let selected_filters = extract_selected(products);
        let breadcrumbs = BreadcrumbsBuilder::new(&self.allowed)
            .build(&category, |url| self.urls.url(Route::Category, url));
        let breadcrumbs = append_filter_summary(&breadcrumbs, &selected_filters);
        let pagination = Pagination::from_products(products);
        let title = metadata_title(
            &breadcrumbs,
            !selected_filters.is_empty(),
            pagination.current_page,
        );
        let canonical = products
            .map(|p| p.metadata.canonical.clone())
            .unwrap_or_default();

        let Some(listing) = products.filter(|p| !p.is_empty()) else {
            return Ok(ListingOutcome::Empty(EmptyView {
                status: StatusCode::GONE,
                phrase: None,
                breadcrumbs,
                selected_filters,
                canonical,
                title,
            }));
        };

        Ok(ListingOutcome::Page(Box::new(ListingView {
            subcategories: category_filters(
                Some(listing),
                Some(&category),
                &self.allowed,
                self.urls.as_ref(),
            ),
            price_filters: price_filters(Some(listing)),
            producer_filters: producer_filters(Some(listing)),
            property_filters: property_filters(Some(listing)),
            sorts: listing.metadata.sorts.clone(),
            products: listing.clone(),
            h1: category.title.clone(),
            category: Some(category),
            phrase: None,
            breadcrumbs,
            pagination,
            selected_filters,
            canonical,
            title,
        })))
    }

    pub async fn search_page(&self, path: &str) -> Result<ListingOutcome, anyhow::Error> {
        let filter = UrlFilter::search(self.urls.clone(), self.allowed.clone());
        let state = filter.parse(path);
        if state.phrase_text().map_or(true, str::is_empty) {
            return Ok(ListingOutcome::NotFound);
        }

        let mut products = self.fetch(&filter, &state).await;
        filter.filter(products.as_mut(), &state);
        let products = products.as_ref();

        let phrase = products
            .and_then(|p| p.metadata.query.phrase.clone())
            .or_else(|| state.phrase_text().map(str::to_string))
            .unwrap_or_default();
        let selected_filters = extract_selected(products);
        let breadcrumbs = BreadcrumbsBuilder::new(&self.allowed).search(&phrase);
        let breadcrumbs = append_filter_summary(&breadcrumbs, &selected_filters);
        let pagination = Pagination::from_products(products);
        let title = metadata_title(
            &breadcrumbs,
            !selected_filters.is_empty(),
            pagination.current_page,
        );
        let canonical = products
            .map(|p| p.metadata.canonical.clone())
            .unwrap_or_default();

        let Some(listing) = products.filter(|p| !p.is_empty()) else {
            return Ok(ListingOutcome::Empty(EmptyView {
                status: StatusCode::NOT_FOUND,
                phrase: Some(phrase),
                breadcrumbs,
                selected_filters,
                canonical,
                title,
            }));
        };

        Ok(ListingOutcome::Page(Box::new(ListingView {
            subcategories: category_filters(Some(listing), None, &self.allowed, self.urls.as_ref()),
            price_filters: price_filters(Some(listing)),
            producer_filters: producer_filters(Some(listing)),
            property_filters: property_filters(Some(listing)),
            sorts: listing.metadata.sorts.clone(),
            products: listing.clone(),
            category: None,
            h1: phrase.clone(),
            phrase: Some(phrase),
            breadcrumbs,
            pagination,
            selected_filters,
            canonical,
            title,
        })))
    }

    async fn fetch(&self, filter: &UrlFilter, state: &FilterState) -> Option<Products> {
        let path = filter.api_path(state);
        log::debug!("Fetching products for {path}");
        self.products
            .fetch_products_by_url(&path, PRODUCT_FIELDS, PAGE_SIZE)
            .result()
            .await
    }
}

/// Page title built from the last breadcrumbs. With filters applied the last
/// crumb is the filter summary, so the one before it names the category.
pub fn metadata_title(breadcrumbs: &[Breadcrumb], has_selection: bool, page: u32) -> String {
    let title = match breadcrumbs {
        [.., before, last] if has_selection => format!("{} {}", before.title, last.title),
        [.., last] => last.title.clone(),
        [] => String::new(),
    };
    let mut title = title.trim().to_string();
    if page > 1 {
        title.push_str(&format!(" (str. {page})"));
    }
    title
}
