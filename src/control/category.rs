use super::filters;
use crate::control::{listing_response, Response};
use crate::listing::{CatalogService, ListingView};
use actix_web::get;
use actix_web::web::{Data, Path};
use askama::Template;
use std::sync::Arc;

#[derive(Template)]
#[template(path = "category/index.html")]
pub struct CategoryPage {
    view: Box<ListingView>,
}

#[get("/{category_url:.+}")]
pub async fn index(
    category_url: Path<String>,
    service: Data<Arc<CatalogService>>,
) -> Response {
    let outcome = service.category_page(&category_url).await?;
    listing_response(outcome, |view| CategoryPage { view })
}
