use itertools::Itertools;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};
use url::form_urlencoded;

pub const PRICE_KEY: &str = "cena";
pub const PRODUCER_KEY: &str = "producent";
pub const CATEGORY_KEY: &str = "kategoria";
pub const CATEGORY_IDS_KEY: &str = "kategorie";
pub const SORT_KEY: &str = "sort";
pub const PAGE_KEY: &str = "strona";
pub const PAGE_PLACEHOLDER: &str = "{page}";

const VALUE_SEPARATOR: &str = ",";
const RANGE_SEPARATOR: &str = "~";

/// What the listing is scoped to: a category slug or a free-text phrase.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Scope {
    #[default]
    Unscoped,
    Category(String),
    Phrase(String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PriceBounds {
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
}

impl PriceBounds {
    pub fn new(min: Option<Decimal>, max: Option<Decimal>) -> Self {
        Self { min, max }
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    fn segment(&self) -> String {
        let bound = |b: Option<Decimal>| b.map(|d| d.normalize().to_string()).unwrap_or_default();
        format!(
            "{PRICE_KEY}:{}{RANGE_SEPARATOR}{}",
            bound(self.min),
            bound(self.max)
        )
    }
}

/// Filters requested by the current url, in a form that can be rendered back
/// into a canonical path.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterState {
    pub scope: Scope,
    /// Category slugs narrowing a phrase search.
    pub categories: BTreeSet<String>,
    pub price: Option<PriceBounds>,
    pub producers: BTreeSet<String>,
    /// Property slug to selected value slugs.
    pub properties: BTreeMap<String, BTreeSet<String>>,
    pub sort: Option<String>,
    pub page: Option<u32>,
}

impl FilterState {
    pub fn category(slug: impl Into<String>) -> Self {
        Self {
            scope: Scope::Category(slug.into()),
            ..Default::default()
        }
    }

    pub fn phrase(phrase: impl Into<String>) -> Self {
        Self {
            scope: Scope::Phrase(phrase.into()),
            ..Default::default()
        }
    }

    pub fn phrase_text(&self) -> Option<&str> {
        match &self.scope {
            Scope::Phrase(p) => Some(p),
            _ => None,
        }
    }

    pub fn category_slug(&self) -> Option<&str> {
        match &self.scope {
            Scope::Category(slug) => Some(slug),
            _ => None,
        }
    }

    /// Number of facets the state constrains the listing with.
    pub fn selected_count(&self) -> usize {
        self.price.iter().count()
            + self.producers.len()
            + self.categories.len()
            + self.properties.values().map(BTreeSet::len).sum::<usize>()
    }

    pub fn has_selection(&self) -> bool {
        self.selected_count() > 0
    }

    pub fn current_page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn is_producer_selected(&self, slug: &str) -> bool {
        self.producers.contains(slug)
    }

    pub fn is_property_selected(&self, property: &str, value: &str) -> bool {
        self.properties
            .get(property)
            .is_some_and(|values| values.contains(value))
    }

    /// Whether the category narrows the listing. The category a listing is
    /// scoped to is where the visitor is, not a selection.
    pub fn is_category_selected(&self, slug: &str) -> bool {
        self.categories.contains(slug)
    }

    pub fn with_price(&self, price: Option<PriceBounds>) -> Self {
        Self {
            price,
            page: None,
            ..self.clone()
        }
    }

    pub fn toggle_producer(&self, slug: &str) -> Self {
        let mut state = Self {
            page: None,
            ..self.clone()
        };
        toggle(&mut state.producers, slug);
        state
    }

    pub fn toggle_property(&self, property: &str, value: &str) -> Self {
        let mut state = Self {
            page: None,
            ..self.clone()
        };
        let values = state.properties.entry(property.to_string()).or_default();
        toggle(values, value);
        if values.is_empty() {
            state.properties.remove(property);
        }
        state
    }

    pub fn toggle_category(&self, slug: &str) -> Self {
        let mut state = Self {
            page: None,
            ..self.clone()
        };
        toggle(&mut state.categories, slug);
        state
    }

    /// Moves a category listing into another category. Properties belong to
    /// the category they were picked in, so they are dropped.
    pub fn in_category(&self, slug: &str) -> Self {
        Self {
            scope: Scope::Category(slug.to_string()),
            properties: BTreeMap::new(),
            page: None,
            ..self.clone()
        }
    }

    pub fn with_sort(&self, sort: Option<String>) -> Self {
        Self {
            sort,
            page: None,
            ..self.clone()
        }
    }

    pub fn with_page(&self, page: Option<u32>) -> Self {
        Self {
            page: page.filter(|p| *p > 1),
            ..self.clone()
        }
    }

    /// State without sort and page, as used for the canonical url.
    pub fn canonical(&self) -> Self {
        Self {
            sort: None,
            page: None,
            ..self.clone()
        }
    }

    pub fn to_path(&self) -> String {
        let mut segments = self.segments();
        if let Some(page) = self.page.filter(|p| *p > 1) {
            segments.push(format!("{PAGE_KEY}:{page}"));
        }
        segments.join("/")
    }

    /// Path with a `{page}` placeholder in place of the page number.
    pub fn to_page_template(&self) -> String {
        let mut segments = self.segments();
        segments.push(format!("{PAGE_KEY}:{PAGE_PLACEHOLDER}"));
        segments.join("/")
    }

    fn segments(&self) -> Vec<String> {
        let mut segments = vec![];
        match &self.scope {
            Scope::Unscoped => (),
            Scope::Category(slug) => segments.push(slug.clone()),
            Scope::Phrase(phrase) => segments.push(encode_phrase(phrase)),
        }
        if !self.categories.is_empty() {
            segments.push(list_segment(CATEGORY_KEY, &self.categories));
        }
        if let Some(price) = self.price.filter(|p| !p.is_unbounded()) {
            segments.push(price.segment());
        }
        if !self.producers.is_empty() {
            segments.push(list_segment(PRODUCER_KEY, &self.producers));
        }
        segments.extend(
            self.properties
                .iter()
                .filter(|(_, values)| !values.is_empty())
                .map(|(property, values)| list_segment(property, values)),
        );
        if let Some(sort) = &self.sort {
            segments.push(format!("{SORT_KEY}:{sort}"));
        }
        segments
    }
}

fn toggle(set: &mut BTreeSet<String>, value: &str) {
    if !set.remove(value) {
        set.insert(value.to_string());
    }
}

fn list_segment(key: &str, values: &BTreeSet<String>) -> String {
    format!("{key}:{}", values.iter().join(VALUE_SEPARATOR))
}

pub fn encode_phrase(phrase: &str) -> String {
    form_urlencoded::byte_serialize(phrase.trim().as_bytes()).collect()
}

pub fn decode_phrase(segment: &str) -> String {
    form_urlencoded::parse(segment.as_bytes())
        .map(|(key, value)| {
            if value.is_empty() {
                key.into_owned()
            } else {
                format!("{key}={value}")
            }
        })
        .join("&")
        .trim()
        .to_string()
}

pub fn split_values(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(VALUE_SEPARATOR)
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

pub fn split_range(raw: &str) -> Option<(&str, &str)> {
    raw.split_once(RANGE_SEPARATOR)
}
