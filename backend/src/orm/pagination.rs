//! Response metadata for list endpoints
//!
//! Page-based lists report `totalPages`; range-based lists report a
//! react-admin style `Content-Range: <entity> <start>-<end>/<total>` and expose
//! that header to browsers.

use std::collections::BTreeMap;

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use tracing::warn;

use super::params::RangeDescriptor;

pub const TOTAL_PAGES_HEADER: &str = "totalPages";
pub const CONTENT_RANGE_HEADER: &str = "Content-Range";
pub const EXPOSE_HEADERS_HEADER: &str = "Access-Control-Expose-Headers";

/// Destination for response metadata.
pub trait MetadataSink {
    fn insert(&mut self, name: &str, value: String);
}

impl MetadataSink for HeaderMap {
    fn insert(&mut self, name: &str, value: String) {
        match (
            HeaderName::try_from(name),
            HeaderValue::try_from(value.as_str()),
        ) {
            (Ok(name), Ok(value)) => {
                HeaderMap::insert(self, name, value);
            }
            _ => warn!(header = name, value = %value, "Dropping invalid response header"),
        }
    }
}

/// In-memory metadata, used where no HTTP response is at hand.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ResponseMetadata(BTreeMap<String, String>);

impl ResponseMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Copy every entry onto an HTTP header map.
    pub fn write_to(&self, headers: &mut HeaderMap) {
        for (name, value) in &self.0 {
            MetadataSink::insert(headers, name, value.clone());
        }
    }
}

impl MetadataSink for ResponseMetadata {
    fn insert(&mut self, name: &str, value: String) {
        self.0.insert(name.to_string(), value);
    }
}

/// `ceil(total / records_per_page)`; `None` for a non-positive page size.
pub fn total_pages(total: i64, records_per_page: i64) -> Option<i64> {
    if records_per_page <= 0 {
        return None;
    }
    Some((total.max(0) + records_per_page - 1) / records_per_page)
}

pub fn emit_total_pages(sink: &mut impl MetadataSink, total: i64, records_per_page: i64) {
    if let Some(pages) = total_pages(total, records_per_page) {
        sink.insert(TOTAL_PAGES_HEADER, pages.to_string());
    }
}

/// Content-Range with the pre-slice `total`; a missing range reports `0-0`.
pub fn emit_content_range(
    sink: &mut impl MetadataSink,
    entity: &str,
    range: Option<&RangeDescriptor>,
    total: i64,
) {
    let (start, end) = range.map(|r| (r.start, r.end)).unwrap_or((0, 0));
    sink.insert(EXPOSE_HEADERS_HEADER, CONTENT_RANGE_HEADER.to_string());
    sink.insert(
        CONTENT_RANGE_HEADER,
        format!("{entity} {start}-{end}/{total}"),
    );
}
