//! Facet collections shown next to a listing: price ranges, producers,
//! properties and subcategories, each decorated by a fixed recipe.

use crate::categories_allowed::CategoriesAllowed;
use crate::routing::UrlBuilder;
use itertools::Itertools;
use wl_types::category::{Category, CategoryId};
use wl_types::filter::PriceBounds;
use wl_types::product::Products;

pub mod converter;
pub mod decorator;
pub mod selected;

pub use converter::{convert, convert_properties, convert_selected};
pub use decorator::Decorator;
pub use selected::{extract_selected, FilterGroup};

pub const PRICE_LABEL: &str = "Ceny";
pub const PRODUCER_LABEL: &str = "Producent";
pub const CATEGORY_LABEL: &str = "Kategoria";

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Dimension {
    Price,
    Producer,
    Property { id: u64, slug: String },
    Category,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FacetValue {
    Price(PriceBounds),
    Producer(String),
    Property(String),
    Category(CategoryId),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Facet {
    pub id: String,
    pub name: String,
    pub url: String,
    pub total: u64,
    pub value: FacetValue,
    /// Selected by the request url.
    pub is_filter: bool,
    pub is_active: bool,
    pub is_excluded: bool,
    pub is_nofollow: bool,
    pub is_popular: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Link {
    pub name: String,
    pub url: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Facets {
    pub dimension: Dimension,
    pub name: String,
    pub unit: Option<String>,
    pub entries: Vec<Facet>,
    pub parent: Option<Link>,
}

impl Facets {
    pub fn empty(dimension: Dimension, name: impl Into<String>) -> Self {
        Self {
            dimension,
            name: name.into(),
            unit: None,
            entries: vec![],
            parent: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entry labels joined for display, e.g. in breadcrumbs.
    pub fn value(&self) -> String {
        self.entries.iter().map(|f| f.name.as_str()).join(", ")
    }

    pub fn is_price(&self) -> bool {
        self.dimension == Dimension::Price
    }
}

pub fn price_filters(products: Option<&Products>) -> Facets {
    convert(products, &Dimension::Price, &[Decorator::SetIsNofollow])
}

pub fn producer_filters(products: Option<&Products>) -> Facets {
    convert(
        products,
        &Dimension::Producer,
        &[
            Decorator::SetIsNofollow,
            Decorator::SetIsPopular,
            Decorator::SetIsActive,
            Decorator::SortByName,
        ],
    )
}

pub fn property_filters(products: Option<&Products>) -> Vec<Facets> {
    convert_properties(
        products,
        &[
            Decorator::SetIsActive,
            Decorator::SetIsExcluded,
            Decorator::SetIsNofollow,
            Decorator::SortDefault,
        ],
    )
}

/// Subcategory facets. Inside a category listing the current category is
/// dropped and a link to its visible parent is attached.
pub fn category_filters(
    products: Option<&Products>,
    category: Option<&Category>,
    allowed: &CategoriesAllowed,
    urls: &dyn UrlBuilder,
) -> Facets {
    let mut steps = vec![
        Decorator::ReduceIncorrectCategories,
        Decorator::SetIsExcluded,
        Decorator::SortByName,
    ];
    if let Some(category) = category {
        steps.push(Decorator::SetParentCategory {
            category,
            allowed,
            urls,
        });
    }
    convert(products, &Dimension::Category, &steps)
}

pub fn price_selected_filters(products: Option<&Products>) -> Facets {
    convert_selected(products, &Dimension::Price, &[Decorator::SetIsNofollow])
}

pub fn producer_selected_filters(products: Option<&Products>) -> Facets {
    convert_selected(products, &Dimension::Producer, &[Decorator::SetIsNofollow])
}

pub fn property_selected_filters(products: Option<&Products>) -> Vec<Facets> {
    let Some(products) = products else {
        return vec![];
    };
    products
        .metadata
        .facets
        .properties
        .iter()
        .map(|p| Dimension::Property {
            id: p.id,
            slug: p.slug.clone(),
        })
        .map(|d| convert_selected(Some(products), &d, &[Decorator::SetIsNofollow]))
        .collect()
}
