use actix_web::middleware::{Compress, NormalizePath, TrailingSlash};
use actix_web::{guard, web::Data, App, HttpServer};
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest_middleware::ClientBuilder;
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use std::env;
use std::sync::Arc;
use std::time::Duration;
use wl_site::api::CatalogApi;
use wl_site::categories_allowed::CategoriesAllowed;
use wl_site::control;
use wl_site::listing::CatalogService;
use wl_site::routing::SiteUrlBuilder;

static DEFAULT_ACCEPT_ENCODING: &str = "br;q=1.0, gzip;q=0.6, deflate;q=0.4, *;q=0.2";

#[actix_web::main]
async fn main() -> Result<(), anyhow::Error> {
    if let Err(env::VarError::NotPresent) = env::var("RUST_LOG") {
        env::set_var("RUST_LOG", "INFO");
    }
    pretty_env_logger::formatted_timed_builder()
        .parse_default_env()
        .init();

    match std::fs::File::open(".env") {
        Ok(_) => envmnt::load_file(".env")?,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            std::fs::File::create(".env")?;
            envmnt::load_file(".env")?;
        }
        Err(err) => {
            return Err(anyhow::anyhow!("Unable to open .env file: {err}"));
        }
    }

    let allowed = Arc::new(CategoriesAllowed::load(wl_site::ALLOWED_CATEGORIES_PATH.as_str())?);

    let mut map = HeaderMap::new();
    map.append(
        reqwest::header::ACCEPT_ENCODING,
        HeaderValue::from_str(DEFAULT_ACCEPT_ENCODING)?,
    );
    let client = reqwest::ClientBuilder::new()
        .connect_timeout(Duration::from_secs(5))
        .timeout(Duration::from_secs(15))
        .use_rustls_tls()
        .default_headers(map)
        .build()?;
    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(2);
    let client = ClientBuilder::new(client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build();

    let api = Arc::new(CatalogApi::new(
        client,
        wl_site::CATALOG_API_URL.as_str(),
        wl_site::CATALOG_API_TOKEN.clone(),
    )?);
    let service = Arc::new(CatalogService::new(
        api.clone(),
        api,
        allowed,
        Arc::new(SiteUrlBuilder),
    ));

    let addr = (wl_site::BIND_ADDR.clone(), *wl_site::PORT);
    log::info!("Listening on {}:{}", addr.0, addr.1);
    HttpServer::new(move || {
        App::new()
            .wrap(Compress::default())
            .wrap(NormalizePath::new(TrailingSlash::Trim))
            .app_data(Data::new(service.clone()))
            .service(actix_files::Files::new("/static", "static"))
            .service(control::homepage::index)
            .service(control::search::form)
            .service(control::search::index)
            .service(control::category::index)
            .default_service(
                actix_web::web::route()
                    .guard(guard::Not(guard::Get()))
                    .to(control::not_found),
            )
    })
    .bind(addr.clone())
    .with_context(|| format!("Failed to bind server to {}:{}", addr.0, addr.1))?
    .run()
    .await?;
    Ok(())
}
