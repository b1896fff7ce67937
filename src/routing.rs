pub const SEARCH_PREFIX: &str = "szukaj";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    Homepage,
    Category,
    Search,
}

pub trait UrlBuilder: Send + Sync {
    fn url(&self, route: Route, path: &str) -> String;
}

/// Urls of the site's own routes, relative to the host.
#[derive(Clone, Copy, Debug, Default)]
pub struct SiteUrlBuilder;

impl UrlBuilder for SiteUrlBuilder {
    fn url(&self, route: Route, path: &str) -> String {
        let path = prepare_api_url(path);
        match route {
            Route::Homepage => "/".to_string(),
            Route::Category => format!("/{path}"),
            Route::Search => format!("/{SEARCH_PREFIX}/{path}"),
        }
    }
}

/// Catalog API urls carry leading and trailing slashes the routes don't.
pub fn prepare_api_url(url: &str) -> &str {
    url.trim_matches('/')
}
