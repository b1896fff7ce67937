use super::{price_selected_filters, producer_selected_filters, property_selected_filters, Facets};
use wl_types::product::Products;

/// Facets of one dimension the visitor has applied, with the dimension label.
pub type FilterGroup = Facets;

/// Applied filters in display order: price, producer, then properties.
/// Dimensions without a selection are left out.
pub fn extract_selected(products: Option<&Products>) -> Vec<FilterGroup> {
    let mut groups = vec![
        price_selected_filters(products),
        producer_selected_filters(products),
    ];
    groups.extend(property_selected_filters(products));
    groups.retain(|g| !g.is_empty());
    groups
}
