#![deny(clippy::unwrap_used)]

use anyhow::Context;
use log_error::LogError;
use once_cell::sync::Lazy;

pub mod api;
pub mod breadcrumbs;
pub mod categories_allowed;
pub mod click;
pub mod control;
pub mod filters;
pub mod listing;
pub mod pagination;
pub mod routing;
pub mod url_filter;

pub static CATALOG_API_URL: Lazy<String> = Lazy::new(|| {
    envmnt::get_parse("CATALOG_API_URL")
        .context("CATALOG_API_URL not set")
        .log_error("Unable to get CATALOG_API_URL")
        .unwrap_or("https://api.example.invalid/v2".to_string())
});

pub static CATALOG_API_TOKEN: Lazy<Option<String>> =
    Lazy::new(|| envmnt::get_parse("CATALOG_API_TOKEN").ok());

/// Prefix of outbound click urls. Empty keeps click paths relative.
pub static CLICK_URL_BASE: Lazy<String> =
    Lazy::new(|| envmnt::get_parse("CLICK_URL_BASE").unwrap_or_default());

pub static ALLOWED_CATEGORIES_PATH: Lazy<String> = Lazy::new(|| {
    envmnt::get_parse("ALLOWED_CATEGORIES_PATH").unwrap_or("allowed_categories.yml".to_string())
});

pub static BIND_ADDR: Lazy<String> = Lazy::new(|| {
    envmnt::get_parse("BIND_ADDR")
        .context("BIND_ADDR not set")
        .log_error("Unable to get BIND_ADDR")
        .unwrap_or("0.0.0.0".to_string())
});

pub static PORT: Lazy<u16> = Lazy::new(|| envmnt::get_parse("PORT").unwrap_or(8080));
