//! Conversation queries and pagination.
//!
//! Both query shapes sort by packet index before slicing, so repeated
//! calls without intervening appends return identical pages.

use std::sync::Arc;

use serde::Serialize;

use crate::error::QueryError;
use crate::record::PacketRecord;
use crate::stream::{ConversationIndex, ConversationKey};

/// Page size used when the caller gives none or an invalid one.
pub const DEFAULT_PAGE_LIMIT: usize = 50;

/// A validated page request.
///
/// `page` is 1-based. Out-of-range inputs are normalized rather than
/// rejected: page below 1 becomes 1, limit below 1 becomes
/// [`DEFAULT_PAGE_LIMIT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub limit: usize,
}

impl PageRequest {
    pub fn new(page: i64, limit: i64) -> Self {
        let page = if page < 1 {
            1
        } else {
            usize::try_from(page).unwrap_or(usize::MAX)
        };
        let limit = if limit < 1 {
            DEFAULT_PAGE_LIMIT
        } else {
            usize::try_from(limit).unwrap_or(usize::MAX)
        };
        Self { page, limit }
    }

    /// Build a request from raw query-string values.
    ///
    /// Missing or non-numeric values count as 0 and are then normalized.
    pub fn from_query(page: Option<&str>, limit: Option<&str>) -> Self {
        let parse = |value: Option<&str>| {
            value
                .and_then(|v| v.trim().parse::<i64>().ok())
                .unwrap_or(0)
        };
        Self::new(parse(page), parse(limit))
    }

    /// Half-open slice bounds for a sequence of `len` records.
    fn bounds(&self, len: usize) -> (usize, usize) {
        let start = (self.page - 1).saturating_mul(self.limit).min(len);
        let end = start.saturating_add(self.limit).min(len);
        (start, end)
    }

    fn total_pages(&self, len: usize) -> usize {
        len.div_ceil(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_LIMIT as i64)
    }
}

/// One page of records plus the page count for the whole sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PacketPage {
    pub packets: Vec<Arc<PacketRecord>>,

    #[serde(rename = "totalPages")]
    pub total_pages: usize,
}

/// Sort `records` by index and cut out the requested page.
pub fn paginate(mut records: Vec<Arc<PacketRecord>>, request: PageRequest) -> PacketPage {
    // Stable, so the duplicate entries of the global view keep their order
    records.sort_by_key(|r| r.index);

    let total_pages = request.total_pages(records.len());
    let (start, end) = request.bounds(records.len());
    records.truncate(end);
    records.drain(..start);

    PacketPage {
        packets: records,
        total_pages,
    }
}

/// Fetch one page of a single conversation.
pub fn fetch_stream(
    index: &ConversationIndex,
    key: &str,
    request: PageRequest,
) -> Result<PacketPage, QueryError> {
    let records = index.get(key).ok_or_else(|| QueryError::StreamNotFound {
        key: key.to_string(),
    })?;
    Ok(paginate(records, request))
}

/// Fetch one page over every record under every key.
///
/// Each packet is filed under two keys and therefore shows up twice.
pub fn fetch_all(index: &ConversationIndex, request: PageRequest) -> PacketPage {
    paginate(index.all_records(), request)
}

/// All conversation keys, sorted for stable output.
pub fn list_streams(index: &ConversationIndex) -> Vec<ConversationKey> {
    let mut keys = index.keys();
    keys.sort_unstable();
    keys
}
