//! Custom askama filters used by the listing templates.

use crate::click::{click_url, Clickable};

/// Splits a list into rows of `size` items.
pub fn chunk<T: Clone>(input: &[T], size: usize) -> askama::Result<Vec<Vec<T>>> {
    Ok(input.chunks(size.max(1)).map(<[T]>::to_vec).collect())
}

/// Outbound click url of a product or offer.
pub fn click<T: Clickable>(entity: &T) -> askama::Result<String> {
    click_url(entity).map_err(|err| askama::Error::Custom(Box::new(err)))
}
