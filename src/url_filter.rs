use crate::categories_allowed::CategoriesAllowed;
use crate::routing::{prepare_api_url, Route, UrlBuilder};
use itertools::Itertools;
use lazy_regex::regex_captures;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use wl_types::category::Category;
use wl_types::filter::{
    decode_phrase, split_values, FilterState, PriceBounds, Scope, CATEGORY_IDS_KEY, CATEGORY_KEY,
    PAGE_KEY, PRICE_KEY, PRODUCER_KEY, SORT_KEY,
};
use wl_types::product::{PriceRange, Products};

/// Url filters of a category listing: `<category-slug>/<segment>/...`.
pub struct CategoryUrlFilter {
    urls: Arc<dyn UrlBuilder>,
}

/// Url filters of a phrase search: `<phrase>/<segment>/...`. Searches are
/// always narrowed to the allowed categories, on top of any the visitor picked.
pub struct SearchUrlFilter {
    urls: Arc<dyn UrlBuilder>,
    allowed: Arc<CategoriesAllowed>,
}

pub enum UrlFilter {
    Category(CategoryUrlFilter),
    Search(SearchUrlFilter),
}

impl UrlFilter {
    pub fn category(urls: Arc<dyn UrlBuilder>) -> Self {
        Self::Category(CategoryUrlFilter { urls })
    }

    pub fn search(urls: Arc<dyn UrlBuilder>, allowed: Arc<CategoriesAllowed>) -> Self {
        Self::Search(SearchUrlFilter { urls, allowed })
    }

    pub fn route(&self) -> Route {
        match self {
            Self::Category(_) => Route::Category,
            Self::Search(_) => Route::Search,
        }
    }

    fn urls(&self) -> &dyn UrlBuilder {
        match self {
            Self::Category(f) => f.urls.as_ref(),
            Self::Search(f) => f.urls.as_ref(),
        }
    }

    fn href(&self, state: &FilterState) -> String {
        self.urls().url(self.route(), &state.to_path())
    }

    /// Parses the request path. Malformed segments are skipped one by one.
    pub fn parse(&self, path: &str) -> FilterState {
        let mut segments = prepare_api_url(path).split('/').filter(|s| !s.is_empty());
        let head = segments.next().unwrap_or_default();
        let mut state = match self {
            Self::Category(_) => FilterState::category(head),
            Self::Search(_) => FilterState::phrase(decode_phrase(head)),
        };
        for segment in segments {
            self.parse_segment(&mut state, segment);
        }
        state
    }

    fn parse_segment(&self, state: &mut FilterState, segment: &str) {
        let Some((key, raw)) = segment.split_once(':') else {
            log::warn!("Skipping url segment without a filter key: {segment}");
            return;
        };
        match key {
            PRICE_KEY => match parse_price(raw) {
                Some(price) => state.price = Some(price),
                None => log::warn!("Skipping unparseable price range {raw}"),
            },
            PRODUCER_KEY => extend_values(&mut state.producers, key, raw),
            CATEGORY_KEY if matches!(self, Self::Search(_)) => {
                extend_values(&mut state.categories, key, raw)
            }
            SORT_KEY if !raw.trim().is_empty() => state.sort = Some(raw.trim().to_string()),
            PAGE_KEY => match raw.trim().parse::<u32>() {
                Ok(page) if page >= 1 => state.page = Some(page),
                _ => log::warn!("Skipping unparseable page number {raw}"),
            },
            SORT_KEY | CATEGORY_KEY | CATEGORY_IDS_KEY => {
                log::warn!("Skipping url segment {segment}")
            }
            property => {
                let mut values = Default::default();
                extend_values(&mut values, property, raw);
                if !values.is_empty() {
                    state
                        .properties
                        .entry(property.to_string())
                        .or_default()
                        .extend(values);
                }
            }
        }
    }

    /// Path of the listing request sent to the catalog API.
    pub fn api_path(&self, state: &FilterState) -> String {
        let path = state.to_path();
        match self {
            Self::Search(f) => {
                let ids = f.allowed.allowed_category_ids().iter().sorted().join(",");
                if ids.is_empty() {
                    path
                } else {
                    format!("{path}/{CATEGORY_IDS_KEY}:{ids}")
                }
            }
            Self::Category(_) => path,
        }
    }

    /// Annotates the listing with the request filters: selection flags and
    /// navigation urls of every facet, sort option and page.
    pub fn filter(&self, products: Option<&mut Products>, state: &FilterState) {
        let Some(products) = products else {
            return;
        };
        let derive_canonical = products.metadata.canonical.is_empty();
        self.filter_url(products, state);
        self.filter_properties(products);
        self.filter_sort(products);
        if derive_canonical {
            products.metadata.canonical = self.href(&products.metadata.filter.canonical());
        }
    }

    /// Category urls coming from the API are made relative to the routes.
    pub fn filter_category(&self, category: &mut Category) {
        category.url = prepare_api_url(&category.url).to_string();
        for step in category.path.iter_mut() {
            step.url = prepare_api_url(&step.url).to_string();
        }
    }

    fn filter_url(&self, products: &mut Products, state: &FilterState) {
        let metadata = &mut products.metadata;
        metadata.filter = state.clone();
        if let Scope::Phrase(phrase) = &state.scope {
            metadata.query.phrase.get_or_insert_with(|| phrase.clone());
        }
        if let Some(price) = state.price {
            let ranges = &mut metadata.facets.price_ranges;
            if !ranges.iter().any(|r| PriceBounds::new(r.min, r.max) == price) {
                ranges.push(PriceRange {
                    min: price.min,
                    max: price.max,
                    total: metadata.total,
                    url: String::new(),
                    is_filter: true,
                });
                ranges.sort_by_key(|r| (r.min.unwrap_or_default(), r.max.unwrap_or(Decimal::MAX)));
            }
        }
        self.link(products);
    }

    fn filter_properties(&self, products: &mut Products) {
        let metadata = &mut products.metadata;
        let properties = &metadata.facets.properties;
        let mut pruned = false;
        for (slug, values) in metadata.filter.properties.iter_mut() {
            let known = properties.iter().find(|p| &p.slug == slug);
            let before = values.len();
            values.retain(|v| known.is_some_and(|p| p.values.iter().any(|pv| &pv.slug == v)));
            if values.len() != before {
                log::warn!("Skipping unknown values of property {slug} for this listing");
                pruned = true;
            }
        }
        metadata.filter.properties.retain(|_, values| !values.is_empty());
        if pruned {
            self.link(products);
        }

        let state = products.metadata.filter.clone();
        for property in products.metadata.facets.properties.iter_mut() {
            for value in property.values.iter_mut() {
                value.is_filter = state.is_property_selected(&property.slug, &value.slug);
                value.url = self.href(&state.toggle_property(&property.slug, &value.slug));
            }
        }
        products
            .metadata
            .facets
            .properties
            .retain(|p| p.values.iter().any(|v| v.total > 0 || v.is_filter));
    }

    fn filter_sort(&self, products: &mut Products) {
        let state = products.metadata.filter.clone();
        let current = state.sort.as_deref().unwrap_or_default();
        for sort in products.metadata.sorts.iter_mut() {
            sort.is_filter = sort.key == current;
            let key = Some(sort.key.clone()).filter(|k| !k.is_empty());
            sort.url = self.href(&state.with_sort(key));
        }
        if !current.is_empty() && !products.metadata.sorts.iter().any(|s| s.is_filter) {
            log::warn!("Unknown sort {current}");
        }
    }

    /// Fills selection flags and urls of price, producer and category facets
    /// and the page url template.
    fn link(&self, products: &mut Products) {
        let state = products.metadata.filter.clone();
        let metadata = &mut products.metadata;
        for range in metadata.facets.price_ranges.iter_mut() {
            let bounds = PriceBounds::new(range.min, range.max);
            range.is_filter = state.price == Some(bounds);
            let target = if range.is_filter { None } else { Some(bounds) };
            range.url = self.href(&state.with_price(target));
        }
        for producer in metadata.facets.producers.iter_mut() {
            producer.is_filter = state.is_producer_selected(&producer.slug);
            producer.url = self.href(&state.toggle_producer(&producer.slug));
        }
        for category in metadata.facets.categories.iter_mut() {
            category.is_filter = state.is_category_selected(&category.slug);
            let target = match self {
                Self::Category(_) => state.in_category(&category.slug),
                Self::Search(_) => state.toggle_category(&category.slug),
            };
            category.url = self.href(&target);
        }
        metadata.paging.url_template = self.urls().url(self.route(), &state.to_page_template());
        if metadata.paging.current == 0 {
            metadata.paging.current = state.current_page();
        }
    }
}

fn extend_values(target: &mut std::collections::BTreeSet<String>, key: &str, raw: &str) {
    let before = target.len();
    target.extend(split_values(raw).map(str::to_string));
    if target.len() == before {
        log::warn!("Skipping empty {key} filter");
    }
}

fn parse_price(raw: &str) -> Option<PriceBounds> {
    let (_, min, max) = regex_captures!(r"^(\d+(?:[.,]\d+)?)?~(\d+(?:[.,]\d+)?)?$", raw.trim())?;
    let bound = |b: &str| {
        Some(b)
            .filter(|b| !b.is_empty())
            .map(|b| Decimal::from_str(&b.replace(',', ".")))
            .transpose()
    };
    let price = PriceBounds::new(bound(min).ok()?, bound(max).ok()?);
    match (price.min, price.max) {
        (None, None) => None,
        (Some(min), Some(max)) if min > max => None,
        _ => Some(price),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::routing::SiteUrlBuilder;
    use rust_decimal_macros::dec;
    use wl_types::product::{CategoryFacet, Producer, Property, PropertyValue, Sort};

    pub(crate) fn category_filter() -> UrlFilter {
        UrlFilter::category(Arc::new(SiteUrlBuilder))
    }

    pub(crate) fn search_filter(allowed: CategoriesAllowed) -> UrlFilter {
        UrlFilter::search(Arc::new(SiteUrlBuilder), Arc::new(allowed))
    }

    fn producer(slug: &str, name: &str, total: u64) -> Producer {
        Producer {
            slug: slug.to_string(),
            name: name.to_string(),
            total,
            url: String::new(),
            is_filter: false,
        }
    }

    fn category_facet(id: u64, slug: &str, total: u64) -> CategoryFacet {
        CategoryFacet {
            id,
            slug: slug.to_string(),
            name: slug.to_string(),
            total,
            url: String::new(),
            is_filter: false,
        }
    }

    fn value(slug: &str, total: u64) -> PropertyValue {
        PropertyValue {
            slug: slug.to_string(),
            name: slug.to_uppercase(),
            total,
            url: String::new(),
            is_filter: false,
        }
    }

    #[test]
    fn parses_category_path() {
        let state = category_filter()
            .parse("/smartfony/cena:100~500/producent:apple,samsung/pamiec:64-gb/sort:cena/strona:2");
        assert_eq!(state.scope, Scope::Category("smartfony".to_string()));
        assert_eq!(state.price, Some(PriceBounds::new(Some(dec!(100)), Some(dec!(500)))));
        assert_eq!(state.producers.len(), 2);
        assert!(state.is_property_selected("pamiec", "64-gb"));
        assert_eq!(state.sort.as_deref(), Some("cena"));
        assert_eq!(state.page, Some(2));
    }

    #[test]
    fn skips_only_the_malformed_constraint() {
        let state = category_filter().parse("smartfony/cena:abc~/producent:apple/strona:zero/kolor");
        assert_eq!(state.price, None);
        assert_eq!(state.page, None);
        assert!(state.is_producer_selected("apple"));
        assert!(state.properties.is_empty());
    }

    #[test]
    fn rejects_inverted_price_range() {
        assert_eq!(parse_price("500~100"), None);
        assert_eq!(parse_price("~"), None);
        assert_eq!(
            parse_price("~99,99"),
            Some(PriceBounds::new(None, Some(dec!(99.99))))
        );
    }

    #[test]
    fn category_narrowing_is_search_only() {
        let state = category_filter().parse("smartfony/kategoria:tablety");
        assert!(state.categories.is_empty());
        let state = search_filter(CategoriesAllowed::default()).parse("ipad/kategoria:tablety");
        assert!(state.categories.contains("tablety"));
        assert_eq!(state.phrase_text(), Some("ipad"));
    }

    #[test]
    fn search_is_narrowed_to_allowed_categories() {
        let filter = search_filter(CategoriesAllowed::new([12, 3], vec![]));
        let state = filter.parse("etui+iphone");
        assert_eq!(filter.api_path(&state), "etui+iphone/kategorie:3,12");
        let narrowed = filter.parse("etui+iphone/kategoria:etui");
        assert_eq!(
            filter.api_path(&narrowed),
            "etui+iphone/kategoria:etui/kategorie:3,12"
        );
    }

    #[test]
    fn hidden_category_narrowing_keeps_allowed_ids() {
        let filter = search_filter(CategoriesAllowed::new([2], vec![]));
        let state = filter.parse("iphone/kategoria:ukryta");
        assert_eq!(filter.api_path(&state), "iphone/kategoria:ukryta/kategorie:2");
    }

    #[test]
    fn absent_listing_is_left_alone() {
        let filter = category_filter();
        let state = filter.parse("smartfony/producent:apple");
        filter.filter(None, &state);
    }

    #[test]
    fn annotates_producers_with_selection_and_toggle_urls() {
        let filter = category_filter();
        let state = filter.parse("smartfony/producent:apple");
        let mut products = Products::default();
        products.metadata.facets.producers = vec![producer("apple", "Apple", 3), producer("lg", "LG", 2)];
        filter.filter(Some(&mut products), &state);
        let producers = &products.metadata.facets.producers;
        assert!(producers[0].is_filter);
        assert_eq!(producers[0].url, "/smartfony");
        assert!(!producers[1].is_filter);
        assert_eq!(producers[1].url, "/smartfony/producent:apple,lg");
        assert_eq!(products.metadata.paging.url_template, "/smartfony/producent:apple/strona:{page}");
        assert_eq!(products.metadata.canonical, "/smartfony/producent:apple");
    }

    #[test]
    fn unmatched_price_range_becomes_a_selected_bucket() {
        let filter = category_filter();
        let state = filter.parse("smartfony/cena:150~250");
        let mut products = Products::default();
        products.metadata.total = 4;
        products.metadata.facets.price_ranges = vec![PriceRange {
            min: Some(dec!(0)),
            max: Some(dec!(100)),
            total: 10,
            url: String::new(),
            is_filter: false,
        }];
        filter.filter(Some(&mut products), &state);
        let ranges = &products.metadata.facets.price_ranges;
        assert_eq!(ranges.len(), 2);
        assert!(ranges[1].is_filter);
        assert_eq!(ranges[1].total, 4);
        assert_eq!(ranges[1].url, "/smartfony");
        assert_eq!(ranges[0].url, "/smartfony/cena:0~100");
    }

    #[test]
    fn unknown_properties_are_dropped_and_links_rebuilt() {
        let filter = category_filter();
        let state = filter.parse("smartfony/kolor:czarny/rozmiar:xl");
        let mut products = Products::default();
        products.metadata.facets.producers = vec![producer("apple", "Apple", 3)];
        products.metadata.facets.properties = vec![Property {
            id: 1,
            slug: "kolor".to_string(),
            name: "Kolor".to_string(),
            unit: None,
            values: vec![value("czarny", 2), value("bialy", 0), value("zloty", 1)],
        }];
        filter.filter(Some(&mut products), &state);
        assert!(!products.metadata.filter.properties.contains_key("rozmiar"));
        let values = &products.metadata.facets.properties[0].values;
        assert_eq!(values.len(), 3);
        assert!(values[0].is_filter);
        assert_eq!(values[0].url, "/smartfony");
        assert_eq!(values[2].url, "/smartfony/kolor:czarny,zloty");
        assert_eq!(
            products.metadata.facets.producers[0].url,
            "/smartfony/producent:apple/kolor:czarny"
        );
        assert_eq!(products.metadata.canonical, "/smartfony/kolor:czarny");
    }

    #[test]
    fn canonical_from_the_api_is_kept() {
        let filter = category_filter();
        let state = filter.parse("smartfony/rozmiar:xl");
        let mut products = Products::default();
        products.metadata.canonical = "/smartfony-i-telefony".to_string();
        filter.filter(Some(&mut products), &state);
        assert_eq!(products.metadata.canonical, "/smartfony-i-telefony");
    }

    #[test]
    fn current_category_is_not_a_selection() {
        let filter = category_filter();
        let state = filter.parse("smartfony");
        let mut products = Products::default();
        products.metadata.facets.categories = vec![
            category_facet(7, "tablety", 4),
            category_facet(2, "smartfony", 3),
        ];
        filter.filter(Some(&mut products), &state);
        let categories = &products.metadata.facets.categories;
        assert!(categories.iter().all(|c| !c.is_filter));
        assert_eq!(categories[0].url, "/tablety");
    }

    #[test]
    fn empty_property_dimensions_are_removed() {
        let filter = category_filter();
        let state = filter.parse("smartfony");
        let mut products = Products::default();
        products.metadata.facets.properties = vec![Property {
            id: 2,
            slug: "rozmiar".to_string(),
            name: "Rozmiar".to_string(),
            unit: None,
            values: vec![value("xl", 0), value("xxl", 0)],
        }];
        filter.filter(Some(&mut products), &state);
        assert!(products.metadata.facets.properties.is_empty());
    }

    #[test]
    fn marks_the_active_sort() {
        let filter = category_filter();
        let state = filter.parse("smartfony/sort:cena/strona:3");
        let mut products = Products::default();
        products.metadata.sorts = vec![
            Sort {
                name: "Trafność".to_string(),
                key: String::new(),
                url: String::new(),
                is_filter: false,
            },
            Sort {
                name: "Cena".to_string(),
                key: "cena".to_string(),
                url: String::new(),
                is_filter: false,
            },
        ];
        filter.filter(Some(&mut products), &state);
        let sorts = &products.metadata.sorts;
        assert!(!sorts[0].is_filter);
        assert_eq!(sorts[0].url, "/smartfony");
        assert!(sorts[1].is_filter);
        assert_eq!(sorts[1].url, "/smartfony/sort:cena");
        assert_eq!(products.metadata.paging.current, 3);
    }

    #[test]
    fn search_keeps_the_phrase_in_query() {
        let filter = search_filter(CategoriesAllowed::default());
        let state = filter.parse("etui+iphone");
        let mut products = Products::default();
        filter.filter(Some(&mut products), &state);
        assert_eq!(products.metadata.query.phrase.as_deref(), Some("etui iphone"));
        assert_eq!(products.metadata.canonical, "/szukaj/etui+iphone");
    }

    #[test]
    fn category_urls_lose_surrounding_slashes() {
        let filter = category_filter();
        let mut category = crate::categories_allowed::tests::category(vec![
            crate::categories_allowed::tests::step(1, "Elektronika"),
        ]);
        category.url = "/elektronika/".to_string();
        filter.filter_category(&mut category);
        assert_eq!(category.url, "elektronika");
        assert_eq!(category.path[0].url, "elektronika");
    }
}
