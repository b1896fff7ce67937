use crate::CLICK_URL_BASE;
use derive_more::{Display, Error};
use wl_types::category::Category;
use wl_types::product::{Offer, Product};

#[derive(Debug, Display, Error)]
#[display("unsupported entity {kind} for generate click")]
pub struct UnsupportedEntity {
    #[error(not(source))]
    pub kind: &'static str,
}

/// Entities a template may ask an outbound click url for.
pub trait Clickable {
    fn kind(&self) -> &'static str;

    /// Click path of the entity, `None` when it can't be clicked out.
    fn click_path(&self) -> Option<String> {
        None
    }
}

impl<T: Clickable + ?Sized> Clickable for &T {
    fn kind(&self) -> &'static str {
        (**self).kind()
    }

    fn click_path(&self) -> Option<String> {
        (**self).click_path()
    }
}

impl Clickable for Product {
    fn kind(&self) -> &'static str {
        "Product"
    }

    fn click_path(&self) -> Option<String> {
        self.click_url
            .clone()
            .or_else(|| self.offer_with_best_price.as_ref().and_then(Offer::click_path))
            .or_else(|| Some(format!("/click/product/{}", self.id)))
    }
}

impl Clickable for Offer {
    fn kind(&self) -> &'static str {
        "Offer"
    }

    fn click_path(&self) -> Option<String> {
        self.click_url
            .clone()
            .or_else(|| Some(format!("/click/offer/{}", self.id)))
    }
}

impl Clickable for Category {
    fn kind(&self) -> &'static str {
        "Category"
    }
}

pub fn click_url(entity: &impl Clickable) -> Result<String, UnsupportedEntity> {
    let path = entity.click_path().ok_or(UnsupportedEntity {
        kind: entity.kind(),
    })?;
    Ok(with_base(&CLICK_URL_BASE, &path))
}

fn with_base(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") || base.is_empty() {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn offer(click_url: Option<&str>) -> Offer {
        Offer {
            id: "o1".to_string(),
            title: "Oferta".to_string(),
            price: dec!(99.99),
            shop_name: "Sklep".to_string(),
            click_url: click_url.map(str::to_string),
        }
    }

    #[test]
    fn joins_base_and_path() {
        assert_eq!(with_base("https://c.example/", "/go/1"), "https://c.example/go/1");
        assert_eq!(with_base("", "/go/1"), "/go/1");
        assert_eq!(with_base("https://c.example", "https://shop.example/x"), "https://shop.example/x");
    }

    #[test]
    fn offer_uses_its_click_url() {
        assert_eq!(offer(Some("/go/o1")).click_path().as_deref(), Some("/go/o1"));
        assert_eq!(offer(None).click_path().as_deref(), Some("/click/offer/o1"));
    }

    #[test]
    fn category_is_not_clickable() {
        let category = Category {
            id: 1,
            title: "Telefony".to_string(),
            url: "telefony".to_string(),
            path: vec![],
        };
        let err = click_url(&category).unwrap_err();
        assert_eq!(err.to_string(), "unsupported entity Category for generate click");
    }
}
