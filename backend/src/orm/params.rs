//! Query-string descriptors for list endpoints
//!
//! `filter`, `sort` and `range` arrive as JSON strings
//! (`{"title":"bat"}`, `["title","DESC"]`, `[0,9]`). Parsing is lenient: a
//! malformed descriptor is logged and treated as absent. The page descriptor
//! is the exception, an invalid page is a caller error.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::warn;

use super::traits::OrderDirection;
use super::validation::ValidationErrors;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_RECORDS_PER_PAGE: i64 = 10;
pub const MAX_RECORDS_PER_PAGE: i64 = 50;

/// Raw query parameters of a filtered list request.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ListParams {
    pub filter: Option<String>,
    pub sort: Option<String>,
    pub range: Option<String>,
}

impl ListParams {
    pub fn filter(&self) -> FilterDescriptor {
        FilterDescriptor::parse(self.filter.as_deref())
    }

    pub fn sort(&self) -> Option<SortDescriptor> {
        SortDescriptor::parse(self.sort.as_deref())
    }

    pub fn range(&self) -> Option<RangeDescriptor> {
        RangeDescriptor::parse(self.range.as_deref())
    }
}

/// Mapping from dotted property path to the literal it must match.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FilterDescriptor(BTreeMap<String, JsonValue>);

impl FilterDescriptor {
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self::default();
        };

        match serde_json::from_str::<JsonValue>(raw) {
            Ok(JsonValue::Object(map)) => Self(map.into_iter().collect()),
            Ok(other) => {
                warn!(filter = %raw, kind = json_kind(&other), "Ignoring filter that is not a JSON object");
                Self::default()
            }
            Err(e) => {
                warn!(filter = %raw, error = %e, "Ignoring malformed filter");
                Self::default()
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &JsonValue)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, JsonValue)> for FilterDescriptor {
    fn from_iter<I: IntoIterator<Item = (K, JsonValue)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Single-key ordering request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortDescriptor {
    pub path: String,
    pub direction: OrderDirection,
}

impl SortDescriptor {
    pub fn new(path: impl Into<String>, direction: OrderDirection) -> Self {
        Self {
            path: path.into(),
            direction,
        }
    }

    /// `["path", "DESC"]`: first element is the path, last is the direction.
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;

        let parts: Vec<String> = match serde_json::from_str(raw) {
            Ok(parts) => parts,
            Err(e) => {
                warn!(sort = %raw, error = %e, "Ignoring malformed sort");
                return None;
            }
        };

        let Some(path) = parts.first() else {
            warn!(sort = %raw, "Ignoring empty sort");
            return None;
        };

        let direction = if parts.len() > 1 {
            OrderDirection::from_token(parts.last().map(String::as_str))
        } else {
            OrderDirection::Asc
        };

        Some(Self::new(path.clone(), direction))
    }
}

/// Inclusive row window `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeDescriptor {
    pub start: i64,
    pub end: i64,
}

impl RangeDescriptor {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// `[start, end]`: first and last elements of an integer array.
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;

        let bounds: Vec<i64> = match serde_json::from_str(raw) {
            Ok(bounds) => bounds,
            Err(e) => {
                warn!(range = %raw, error = %e, "Ignoring malformed range");
                return None;
            }
        };

        match (bounds.first(), bounds.last()) {
            (Some(&start), Some(&end)) => Some(Self::new(start, end)),
            _ => {
                warn!(range = %raw, "Ignoring empty range");
                None
            }
        }
    }

    /// Rows to skip (negative starts clamp to zero)
    pub fn offset(&self) -> i64 {
        self.start.max(0)
    }

    /// Rows to take; zero when the window is empty or inverted
    pub fn limit(&self) -> i64 {
        self.end.saturating_sub(self.start).saturating_add(1).max(0)
    }
}

/// Raw `page` / `recordsPerPage` query parameters.
#[derive(Debug, Default, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    pub page: Option<i64>,
    pub records_per_page: Option<i64>,
}

/// Validated page-based slice request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageDescriptor {
    page: i64,
    records_per_page: i64,
}

impl Default for PageDescriptor {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            records_per_page: DEFAULT_RECORDS_PER_PAGE,
        }
    }
}

impl PageDescriptor {
    /// `records_per_page` above `max_records_per_page` is capped.
    pub fn new(page: i64, records_per_page: i64, max_records_per_page: i64) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if page < 1 {
            errors.add("page", "page must be at least 1");
        }
        if records_per_page < 1 {
            errors.add("recordsPerPage", "recordsPerPage must be at least 1");
        }
        errors.into_result()?;

        Ok(Self {
            page,
            records_per_page: records_per_page.min(max_records_per_page.max(1)),
        })
    }

    pub fn from_params(
        params: PageParams,
        default_records_per_page: i64,
        max_records_per_page: i64,
    ) -> Result<Self, ValidationErrors> {
        Self::new(
            params.page.unwrap_or(DEFAULT_PAGE),
            params.records_per_page.unwrap_or(default_records_per_page),
            max_records_per_page,
        )
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn records_per_page(&self) -> i64 {
        self.records_per_page
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.records_per_page)
    }

    pub fn limit(&self) -> i64 {
        self.records_per_page
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_filter_parse_is_lenient() {
        assert!(FilterDescriptor::parse(None).is_empty());
        assert!(FilterDescriptor::parse(Some("  ")).is_empty());
        assert!(FilterDescriptor::parse(Some("{not json")).is_empty());
        assert!(FilterDescriptor::parse(Some("[1,2]")).is_empty());

        let filter = FilterDescriptor::parse(Some(r#"{"title":"bat","inTheaters":true}"#));
        let keys: Vec<_> = filter.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["inTheaters", "title"]);
    }

    #[test]
    fn test_sort_parse() {
        assert_eq!(
            SortDescriptor::parse(Some(r#"["title","DESC"]"#)),
            Some(SortDescriptor::new("title", OrderDirection::Desc))
        );
        assert_eq!(
            SortDescriptor::parse(Some(r#"["title","whatever"]"#)),
            Some(SortDescriptor::new("title", OrderDirection::Asc))
        );
        assert_eq!(
            SortDescriptor::parse(Some(r#"["title"]"#)),
            Some(SortDescriptor::new("title", OrderDirection::Asc))
        );
        assert_eq!(SortDescriptor::parse(Some("[]")), None);
        assert_eq!(SortDescriptor::parse(Some("title")), None);
    }

    #[test]
    fn test_range_window() {
        let range = RangeDescriptor::parse(Some("[0, 9]")).unwrap();
        assert_eq!((range.offset(), range.limit()), (0, 10));

        let range = RangeDescriptor::parse(Some("[-5, 2]")).unwrap();
        assert_eq!(range.offset(), 0);

        let inverted = RangeDescriptor::new(5, 3);
        assert_eq!(inverted.limit(), 0);

        assert_eq!(RangeDescriptor::parse(Some(r#"["a"]"#)), None);
        assert_eq!(RangeDescriptor::parse(Some("[]")), None);
    }

    #[test]
    fn test_page_descriptor_validation() {
        let page = PageDescriptor::new(3, 10, MAX_RECORDS_PER_PAGE).unwrap();
        assert_eq!((page.offset(), page.limit()), (20, 10));

        let capped = PageDescriptor::new(1, 500, MAX_RECORDS_PER_PAGE).unwrap();
        assert_eq!(capped.records_per_page(), 50);

        let err = PageDescriptor::new(0, 0, MAX_RECORDS_PER_PAGE).unwrap_err();
        assert!(err.get("page").is_some());
        assert!(err.get("recordsPerPage").is_some());
    }

    #[test]
    fn test_page_params_defaults() {
        let page = PageDescriptor::from_params(PageParams::default(), 10, 50).unwrap();
        assert_eq!(page, PageDescriptor::default());
    }
}
