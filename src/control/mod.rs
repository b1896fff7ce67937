use crate::click::UnsupportedEntity;
use crate::listing::{EmptyView, ListingOutcome, ListingView};
use actix_web::http::header::{ContentType, LOCATION};
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use anyhow::anyhow;
use askama::Template;
use derive_more::{Display, Error};
use log_error::LogError;

pub mod category;
pub mod filters;
pub mod homepage;
pub mod search;

pub type Response = Result<HttpResponse, ControllerError>;

#[derive(Debug, Display, Error)]
pub enum ControllerError {
    NotFound,
    #[error(ignore)]
    InternalServerError(anyhow::Error),
    #[display("{_0}")]
    UnsupportedEntity(UnsupportedEntity),
}

impl From<anyhow::Error> for ControllerError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalServerError(err)
    }
}

impl From<askama::Error> for ControllerError {
    fn from(err: askama::Error) -> Self {
        match err {
            askama::Error::Custom(err) => err
                .downcast::<UnsupportedEntity>()
                .map(|e| Self::UnsupportedEntity(*e))
                .unwrap_or_else(|e| Self::InternalServerError(anyhow!(e))),
            err => Self::InternalServerError(err.into()),
        }
    }
}

impl actix_web::error::ResponseError for ControllerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        log::warn!("{self:?}\n");
        match self {
            Self::NotFound => NotFoundPage
                .render()
                .log_error("Unable to render error template")
                .map(|res| {
                    HttpResponse::NotFound()
                        .content_type(ContentType::html())
                        .body(res)
                })
                .unwrap_or_else(|| HttpResponse::NotFound().body(())),
            Self::InternalServerError(_) | Self::UnsupportedEntity(_) => InternalServerErrorPage {
                error: self.to_string(),
            }
            .render()
            .log_error("Unable to render error template")
            .map(|res| {
                HttpResponse::InternalServerError()
                    .content_type(ContentType::html())
                    .body(res)
            })
            .unwrap_or_else(|| HttpResponse::InternalServerError().body(self.to_string())),
        }
    }
}

#[derive(Template)]
#[template(path = "500.html")]
pub struct InternalServerErrorPage {
    error: String,
}

#[derive(Template)]
#[template(path = "404.html")]
pub struct NotFoundPage;

/// Listing without results. Category and search listings share it.
#[derive(Template)]
#[template(path = "category/non_result.html")]
pub struct NonResultPage {
    view: EmptyView,
}

pub async fn not_found() -> Response {
    Err(ControllerError::NotFound)
}

pub fn render_template(t: impl Template) -> Response {
    render_with_status(t, StatusCode::OK)
}

pub fn render_with_status(t: impl Template, status: StatusCode) -> Response {
    let result = t.render()?;
    Ok(HttpResponse::build(status)
        .content_type(ContentType::html())
        .body(result))
}

pub fn redirect(url: &str) -> HttpResponse {
    HttpResponse::MovedPermanently()
        .insert_header((LOCATION, url))
        .finish()
}

/// Maps a listing outcome to a response, rendering full pages with `page`.
pub fn listing_response<T: Template>(
    outcome: ListingOutcome,
    page: impl FnOnce(Box<ListingView>) -> T,
) -> Response {
    match outcome {
        ListingOutcome::Page(view) => render_template(page(view)),
        ListingOutcome::Empty(view) => {
            let status = view.status;
            render_with_status(NonResultPage { view }, status)
        }
        ListingOutcome::Redirect(url) => Ok(redirect(&url)),
        ListingOutcome::NotFound => Err(ControllerError::NotFound),
    }
}
