use crate::categories_allowed::CategoryGroup;
use crate::control::{render_template, Response};
use crate::listing::CatalogService;
use actix_web::get;
use actix_web::web::Data;
use askama::Template;
use std::sync::Arc;

#[derive(Template)]
#[template(path = "index.html")]
pub struct HomePage {
    groups: Vec<CategoryGroup>,
}

#[get("/")]
pub async fn index(service: Data<Arc<CatalogService>>) -> Response {
    render_template(HomePage {
        groups: service.allowed().grouped_allowed_categories().to_vec(),
    })
}
