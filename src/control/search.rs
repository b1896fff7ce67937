use super::filters;
use crate::control::{listing_response, Response};
use crate::listing::{CatalogService, ListingView};
use crate::routing::Route;
use actix_web::web::{Data, Path, Query};
use actix_web::{get, HttpResponse};
use askama::Template;
use serde::Deserialize;
use std::sync::Arc;
use wl_types::filter::encode_phrase;

#[derive(Template)]
#[template(path = "search/index.html")]
pub struct SearchPage {
    view: Box<ListingView>,
}

#[derive(Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    q: String,
}

#[get("/szukaj/{phrase:.+}")]
pub async fn index(phrase: Path<String>, service: Data<Arc<CatalogService>>) -> Response {
    let outcome = service.search_page(&phrase).await?;
    listing_response(outcome, |view| SearchPage { view })
}

/// Search box submission, redirected to the phrase url.
#[get("/szukaj")]
pub async fn form(form: Query<SearchForm>, service: Data<Arc<CatalogService>>) -> Response {
    let phrase = form.q.trim();
    let location = if phrase.is_empty() {
        service.urls().url(Route::Homepage, "")
    } else {
        service.urls().url(Route::Search, &encode_phrase(phrase))
    };
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", location))
        .finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories_allowed::CategoriesAllowed;
    use crate::listing::tests::{listing, service};
    use actix_web::http::StatusCode;
    use actix_web::{test, App};

    #[actix_web::test]
    async fn empty_search_is_not_found() {
        let app = test::init_service(
            App::new()
                .app_data(Data::new(Arc::new(service(
                    CategoriesAllowed::new([2], vec![]),
                    Some(listing(0)),
                ))))
                .service(index),
        )
        .await;
        let req = test::TestRequest::get().uri("/szukaj/nic").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body = test::read_body(res).await;
        assert!(String::from_utf8_lossy(&body).contains("Szukaj: nic"));
    }

    #[actix_web::test]
    async fn form_redirects_to_phrase_url() {
        let app = test::init_service(
            App::new()
                .app_data(Data::new(Arc::new(service(CategoriesAllowed::default(), None))))
                .service(form),
        )
        .await;
        let req = test::TestRequest::get().uri("/szukaj?q=etui+iphone").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            res.headers().get("Location").and_then(|v| v.to_str().ok()),
            Some("/szukaj/etui+iphone")
        );
    }
}
