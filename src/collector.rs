//! Aggregation of paginated JSON:API listings.
//!
//! The total page count is only known once the first page has been read, so
//! collection is two-phase: [`fetch_first`] then [`fetch_rest`], strictly in
//! page order. Any failing page aborts the whole collection.

use crate::api::{ApiError, Page, PageMeta, PageQuery, WafApi};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum CollectError {
    /// The first page came back without records.
    #[error("no records found for {query}")]
    NoRecords { query: String },

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Every record of a listing, in page order then in-page order.
#[derive(Debug, Clone)]
pub struct Collected<T> {
    pub records: Vec<T>,
    pub included: Vec<T>,
    /// Metadata reported by the first page.
    pub meta: PageMeta,
}

impl<T> Collected<T> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Phase one: read page 1 and refuse an empty listing.
pub async fn fetch_first(api: &dyn WafApi, query: &PageQuery) -> Result<Page<Value>, CollectError> {
    let first = api.fetch_page(query, 1).await?;
    if first.data.is_empty() {
        return Err(CollectError::NoRecords {
            query: query.to_string(),
        });
    }
    Ok(first)
}

/// Phase two: read the pages after `first` up to its reported total.
pub async fn fetch_rest(
    api: &dyn WafApi,
    query: &PageQuery,
    first: &Page<Value>,
) -> Result<Vec<Page<Value>>, CollectError> {
    let current = first.meta.current_page.max(1);
    let total = first.meta.total_pages;
    let mut pages = Vec::with_capacity(total.saturating_sub(current) as usize);

    for number in (current + 1)..=total {
        info!("Reading page: {} out of {}", number, total);
        pages.push(api.fetch_page(query, number).await?);
    }

    Ok(pages)
}

/// Fetch every page of `query` and decode the concatenated records.
pub async fn collect_all<T: DeserializeOwned>(
    api: &dyn WafApi,
    query: &PageQuery,
) -> Result<Collected<T>, CollectError> {
    let first = fetch_first(api, query).await?;
    info!(
        "Read Total Pages: {} with {} records",
        first.meta.total_pages, first.meta.record_count
    );
    let rest = fetch_rest(api, query, &first).await?;

    let meta = first.meta.clone();
    let mut records = Vec::with_capacity(meta.record_count as usize);
    let mut included = Vec::new();

    for page in std::iter::once(first).chain(rest) {
        for value in page.data {
            records.push(decode(value)?);
        }
        for value in page.included {
            included.push(decode(value)?);
        }
    }

    Ok(Collected {
        records,
        included,
        meta,
    })
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, CollectError> {
    serde_json::from_value(value).map_err(|e| CollectError::Api(ApiError::Decode(e)))
}
