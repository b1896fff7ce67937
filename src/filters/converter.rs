use super::{
    Decorator, Dimension, Facet, FacetValue, Facets, CATEGORY_LABEL, PRICE_LABEL, PRODUCER_LABEL,
};
use rust_decimal::Decimal;
use wl_types::filter::PriceBounds;
use wl_types::product::{Products, Property};

/// Facets of one dimension, decorated by `decorators` in order.
/// An absent listing gives an empty collection.
pub fn convert(products: Option<&Products>, dimension: &Dimension, decorators: &[Decorator]) -> Facets {
    fold(products, dimension, decorators, |_| true)
}

/// Only the facets selected by the request url.
pub fn convert_selected(
    products: Option<&Products>,
    dimension: &Dimension,
    decorators: &[Decorator],
) -> Facets {
    fold(products, dimension, decorators, |f| f.is_filter)
}

/// One collection per property dimension of the listing.
pub fn convert_properties(products: Option<&Products>, decorators: &[Decorator]) -> Vec<Facets> {
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
        .map(|d| convert(Some(products), &d, decorators))
        .collect()
}

fn fold(
    products: Option<&Products>,
    dimension: &Dimension,
    decorators: &[Decorator],
    keep: impl Fn(&Facet) -> bool,
) -> Facets {
    let Some(products) = products else {
        return Facets::empty(dimension.clone(), label(dimension, None));
    };
    let property = match dimension {
        Dimension::Property { id, .. } => products
            .metadata
            .facets
            .properties
            .iter()
            .find(|p| p.id == *id),
        _ => None,
    };
    let mut facets = Facets::empty(dimension.clone(), label(dimension, property));
    facets.unit = property.and_then(|p| p.unit.clone());
    facets.entries = entries(products, dimension, property)
        .into_iter()
        .filter(|f| keep(f))
        .collect();
    decorators
        .iter()
        .fold(facets, |facets, decorator| decorator.apply(facets, products))
}

fn label(dimension: &Dimension, property: Option<&Property>) -> String {
    match dimension {
        Dimension::Price => PRICE_LABEL.to_string(),
        Dimension::Producer => PRODUCER_LABEL.to_string(),
        Dimension::Category => CATEGORY_LABEL.to_string(),
        Dimension::Property { slug, .. } => property
            .map(|p| p.name.clone())
            .unwrap_or_else(|| slug.clone()),
    }
}

fn entries(products: &Products, dimension: &Dimension, property: Option<&Property>) -> Vec<Facet> {
    let facets = &products.metadata.facets;
    match dimension {
        Dimension::Price => facets
            .price_ranges
            .iter()
            .map(|r| {
                let bounds = PriceBounds::new(r.min, r.max);
                facet(
                    price_id(&bounds),
                    price_name(&bounds),
                    &r.url,
                    r.total,
                    FacetValue::Price(bounds),
                    r.is_filter,
                )
            })
            .collect(),
        Dimension::Producer => facets
            .producers
            .iter()
            .map(|p| {
                facet(
                    p.slug.clone(),
                    p.name.clone(),
                    &p.url,
                    p.total,
                    FacetValue::Producer(p.slug.clone()),
                    p.is_filter,
                )
            })
            .collect(),
        Dimension::Property { .. } => property
            .into_iter()
            .flat_map(|p| p.values.iter())
            .map(|v| {
                facet(
                    v.slug.clone(),
                    v.name.clone(),
                    &v.url,
                    v.total,
                    FacetValue::Property(v.slug.clone()),
                    v.is_filter,
                )
            })
            .collect(),
        Dimension::Category => facets
            .categories
            .iter()
            .map(|c| {
                facet(
                    c.id.to_string(),
                    c.name.clone(),
                    &c.url,
                    c.total,
                    FacetValue::Category(c.id),
                    c.is_filter,
                )
            })
            .collect(),
    }
}

fn facet(id: String, name: String, url: &str, total: u64, value: FacetValue, is_filter: bool) -> Facet {
    Facet {
        id,
        name,
        url: url.to_string(),
        total,
        value,
        is_filter,
        is_active: false,
        is_excluded: false,
        is_nofollow: false,
        is_popular: false,
    }
}

fn amount(d: Decimal) -> String {
    d.normalize().to_string()
}

fn price_id(bounds: &PriceBounds) -> String {
    let bound = |b: Option<Decimal>| b.map(amount).unwrap_or_default();
    format!("{}~{}", bound(bounds.min), bound(bounds.max))
}

pub fn price_name(bounds: &PriceBounds) -> String {
    match (bounds.min, bounds.max) {
        (Some(min), Some(max)) => format!("{} - {}", amount(min), amount(max)),
        (Some(min), None) => format!("od {}", amount(min)),
        (None, Some(max)) => format!("do {}", amount(max)),
        (None, None) => String::new(),
    }
}
