use super::{Dimension, Facet, FacetValue, Facets, Link};
use crate::categories_allowed::CategoriesAllowed;
use crate::routing::{Route, UrlBuilder};
use lazy_regex::regex_captures;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::str::FromStr;
use wl_types::category::Category;
use wl_types::product::Products;

pub const POPULAR_PRODUCERS: usize = 10;

/// One step of a facet decoration chain. Steps run in the order given, so
/// flags a sort depends on have to come before it.
pub enum Decorator<'a> {
    SetIsActive,
    SetIsExcluded,
    SetIsNofollow,
    SetIsPopular,
    SortByName,
    SortDefault,
    ReduceIncorrectCategories,
    SetParentCategory {
        category: &'a Category,
        allowed: &'a CategoriesAllowed,
        urls: &'a dyn UrlBuilder,
    },
}

impl Decorator<'_> {
    pub fn apply(&self, mut facets: Facets, products: &Products) -> Facets {
        match self {
            Self::SetIsActive => {
                for facet in facets.entries.iter_mut() {
                    facet.is_active = facet.is_filter;
                }
            }
            Self::SetIsExcluded => {
                let any_selected = facets.entries.iter().any(|f| f.is_filter);
                let is_category = facets.dimension == Dimension::Category;
                for facet in facets.entries.iter_mut() {
                    facet.is_excluded = !facet.is_filter
                        && (facet.total == 0 || (is_category && any_selected));
                }
            }
            Self::SetIsNofollow => {
                let filter = &products.metadata.filter;
                let selected = filter.selected_count();
                let replaced = match facets.dimension {
                    Dimension::Price => filter.price.iter().count(),
                    _ => 0,
                };
                for facet in facets.entries.iter_mut() {
                    let target = if facet.is_filter {
                        selected.saturating_sub(1)
                    } else {
                        selected.saturating_sub(replaced) + 1
                    };
                    facet.is_nofollow = target > 1;
                }
            }
            Self::SetIsPopular => {
                let mut ranked: Vec<&Facet> = facets.entries.iter().collect();
                ranked.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| by_name(a, b)));
                let popular: HashSet<String> = ranked
                    .into_iter()
                    .take(POPULAR_PRODUCERS)
                    .map(|f| f.id.clone())
                    .collect();
                for facet in facets.entries.iter_mut() {
                    facet.is_popular = popular.contains(&facet.id);
                }
            }
            Self::SortByName => facets.entries.sort_by(by_name),
            Self::SortDefault => facets.entries.sort_by(by_leading_number),
            Self::ReduceIncorrectCategories => facets
                .entries
                .retain(|f| !f.name.trim().is_empty() && !f.url.is_empty() && f.total > 0),
            Self::SetParentCategory {
                category,
                allowed,
                urls,
            } => {
                facets
                    .entries
                    .retain(|f| f.value != FacetValue::Category(category.id));
                facets.parent = parent_link(category, allowed, *urls);
            }
        }
        facets
    }
}

/// Link one level up the tree, unless the parent is above the visible part
/// of the category path.
fn parent_link(
    category: &Category,
    allowed: &CategoriesAllowed,
    urls: &dyn UrlBuilder,
) -> Option<Link> {
    let parent = category.parent()?;
    let visible_from = allowed.first_visible(&category.path)?;
    let parent_at = category.path.iter().position(|s| s.id == parent.id)?;
    (parent_at >= visible_from).then(|| Link {
        name: parent.title.clone(),
        url: urls.url(Route::Category, &parent.url),
    })
}

fn by_name(a: &Facet, b: &Facet) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.id.cmp(&b.id))
}

fn leading_number(name: &str) -> Option<Decimal> {
    let (_, number) = regex_captures!(r"^\s*(\d+(?:[.,]\d+)?)", name)?;
    Decimal::from_str(&number.replace(',', ".")).ok()
}

/// Values starting with a number go first in numeric order, the rest follow
/// alphabetically.
fn by_leading_number(a: &Facet, b: &Facet) -> Ordering {
    match (leading_number(&a.name), leading_number(&b.name)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| by_name(a, b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => by_name(a, b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories_allowed::tests::{category, step};
    use crate::routing::SiteUrlBuilder;

    fn facet(id: &str, name: &str, total: u64, is_filter: bool) -> Facet {
        Facet {
            id: id.to_string(),
            name: name.to_string(),
            url: format!("/{id}"),
            total,
            value: FacetValue::Producer(id.to_string()),
            is_filter,
            is_active: false,
            is_excluded: false,
            is_nofollow: false,
            is_popular: false,
        }
    }

    fn facets(dimension: Dimension, entries: Vec<Facet>) -> Facets {
        Facets {
            dimension,
            name: "Test".to_string(),
            unit: None,
            entries,
            parent: None,
        }
    }

    fn names(facets: &Facets) -> Vec<&str> {
        facets.entries.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn default_sort_puts_numbers_first() {
        let sorted = Decorator::SortDefault.apply(
            facets(
                Dimension::Producer,
                vec![
                    facet("a", "czarny", 1, false),
                    facet("b", "128 GB", 1, false),
                    facet("c", "32 GB", 1, false),
                    facet("d", "Biały", 1, false),
                ],
            ),
            &Products::default(),
        );
        assert_eq!(names(&sorted), vec!["32 GB", "128 GB", "Biały", "czarny"]);
    }

    #[test]
    fn popular_is_top_by_total() {
        let entries = (0..12)
            .map(|i| facet(&format!("p{i:02}"), &format!("P{i:02}"), i, false))
            .collect();
        let decorated = Decorator::SetIsPopular.apply(facets(Dimension::Producer, entries), &Products::default());
        let popular = decorated.entries.iter().filter(|f| f.is_popular).count();
        assert_eq!(popular, POPULAR_PRODUCERS);
        assert!(!decorated.entries[0].is_popular);
        assert!(!decorated.entries[1].is_popular);
        assert!(decorated.entries[11].is_popular);
    }

    #[test]
    fn nofollow_when_target_has_more_than_one_filter() {
        let mut products = Products::default();
        products.metadata.filter = wl_types::filter::FilterState::category("x").toggle_producer("a");
        let decorated = Decorator::SetIsNofollow.apply(
            facets(
                Dimension::Producer,
                vec![facet("a", "A", 1, true), facet("b", "B", 1, false)],
            ),
            &products,
        );
        assert!(!decorated.entries[0].is_nofollow);
        assert!(decorated.entries[1].is_nofollow);
    }

    #[test]
    fn price_selection_replaces_previous_price() {
        let mut products = Products::default();
        products.metadata.filter = wl_types::filter::FilterState::category("x").with_price(Some(
            wl_types::filter::PriceBounds::new(None, Some(Decimal::ONE_HUNDRED)),
        ));
        let decorated = Decorator::SetIsNofollow.apply(
            facets(Dimension::Price, vec![facet("p", "od 100", 1, false)]),
            &products,
        );
        assert!(!decorated.entries[0].is_nofollow);
    }

    #[test]
    fn excluded_category_when_sibling_selected() {
        let decorated = Decorator::SetIsExcluded.apply(
            facets(
                Dimension::Category,
                vec![facet("a", "A", 3, true), facet("b", "B", 3, false)],
            ),
            &Products::default(),
        );
        assert!(!decorated.entries[0].is_excluded);
        assert!(decorated.entries[1].is_excluded);
    }

    #[test]
    fn parent_link_stays_inside_visible_tree() {
        let urls = SiteUrlBuilder;
        let phones = category(vec![step(1, "Elektronika"), step(2, "Telefony"), step(3, "Smartfony")]);

        let allowed = CategoriesAllowed::new([2], vec![]);
        let link = parent_link(&phones, &allowed, &urls).expect("parent is visible");
        assert_eq!(link.name, "Telefony");
        assert_eq!(link.url, "/telefony");

        let allowed = CategoriesAllowed::new([3], vec![]);
        assert!(parent_link(&phones, &allowed, &urls).is_none());
    }

    #[test]
    fn parent_category_step_drops_current_category() {
        let urls = SiteUrlBuilder;
        let allowed = CategoriesAllowed::new([1], vec![]);
        let phones = category(vec![step(1, "Elektronika"), step(3, "Smartfony")]);
        let mut current = facet("3", "Smartfony", 5, false);
        current.value = FacetValue::Category(3);
        let mut other = facet("4", "Tablety", 5, false);
        other.value = FacetValue::Category(4);
        let decorated = Decorator::SetParentCategory {
            category: &phones,
            allowed: &allowed,
            urls: &urls,
        }
        .apply(facets(Dimension::Category, vec![current, other]), &Products::default());
        assert_eq!(names(&decorated), vec!["Tablety"]);
        assert_eq!(decorated.parent.map(|p| p.name).as_deref(), Some("Elektronika"));
    }
}
