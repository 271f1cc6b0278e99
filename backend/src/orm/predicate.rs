//! Dynamic predicate builder
//!
//! Turns a [`FilterDescriptor`] into a typed [`Predicate`] tree. Text fields
//! match by substring through SQLite `LIKE`, which folds ASCII case only
//! (`"ñ"` does not match `"Ñ"` without the ICU extension); every other kind by
//! equality after converting the literal into the field's scalar type.
//! Paths that do not resolve and literals that do not convert are skipped,
//! never fatal.

use chrono::NaiveDate;
use serde_json::Value as JsonValue;
use tracing::debug;

use super::descriptor::{EntityDescriptor, FieldKind, FieldPath, resolve_path};
use super::params::FilterDescriptor;
use super::traits::SqlValue;

/// A SQL fragment with its positional bind values, in textual order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlFragment {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// Composable boolean filter over resolved field paths.
#[derive(Debug, Clone)]
pub enum Predicate {
    /// Identity: matches every row
    All,
    /// Substring match on a text field (ASCII case folded)
    Contains(FieldPath, String),
    /// Equality on a typed value (`IS NULL` for [`SqlValue::Null`])
    Eq(FieldPath, SqlValue),
    And(Vec<Predicate>),
}

impl Predicate {
    /// Equality on `path`, or `None` if the path does not resolve.
    pub fn eq(
        descriptor: &'static EntityDescriptor,
        path: &str,
        value: impl Into<SqlValue>,
    ) -> Option<Self> {
        resolve_path(descriptor, path).map(|p| Predicate::Eq(p, value.into()))
    }

    /// Substring match on `path`, or `None` if the path does not resolve to text.
    pub fn contains(
        descriptor: &'static EntityDescriptor,
        path: &str,
        needle: impl Into<String>,
    ) -> Option<Self> {
        resolve_path(descriptor, path)
            .filter(|p| p.kind().is_textual())
            .map(|p| Predicate::Contains(p, needle.into()))
    }

    /// Logical AND; `All` is the identity on both sides.
    pub fn and(self, other: Predicate) -> Predicate {
        match (self, other) {
            (Predicate::All, p) | (p, Predicate::All) => p,
            (Predicate::And(mut left), Predicate::And(right)) => {
                left.extend(right);
                Predicate::And(left)
            }
            (Predicate::And(mut left), p) => {
                left.push(p);
                Predicate::And(left)
            }
            (p, Predicate::And(mut right)) => {
                right.insert(0, p);
                Predicate::And(right)
            }
            (a, b) => Predicate::And(vec![a, b]),
        }
    }

    pub fn is_all(&self) -> bool {
        match self {
            Predicate::All => true,
            Predicate::And(parts) => parts.iter().all(Predicate::is_all),
            _ => false,
        }
    }

    /// Compile into a WHERE condition; `None` when the predicate matches everything.
    pub fn to_sql(&self) -> Option<SqlFragment> {
        match self {
            Predicate::All => None,
            Predicate::Contains(path, needle) => {
                let condition = format!("{} LIKE ? ESCAPE '\\'", path.field.column);
                Some(wrap_hops(
                    path,
                    condition,
                    vec![SqlValue::Text(like_pattern(needle))],
                ))
            }
            Predicate::Eq(path, SqlValue::Null) => {
                Some(wrap_hops(path, format!("{} IS NULL", path.field.column), Vec::new()))
            }
            Predicate::Eq(path, value) => Some(wrap_hops(
                path,
                format!("{} = ?", path.field.column),
                vec![value.clone()],
            )),
            Predicate::And(parts) => {
                let compiled: Vec<SqlFragment> = parts.iter().filter_map(Predicate::to_sql).collect();
                if compiled.is_empty() {
                    return None;
                }
                let sql = compiled
                    .iter()
                    .map(|f| format!("({})", f.sql))
                    .collect::<Vec<_>>()
                    .join(" AND ");
                let values = compiled.into_iter().flat_map(|f| f.values).collect();
                Some(SqlFragment { sql, values })
            }
        }
    }
}

/// Walk reference hops outwards: `fk IN (SELECT pk FROM target WHERE …)`.
fn wrap_hops(path: &FieldPath, condition: String, values: Vec<SqlValue>) -> SqlFragment {
    let sql = path.hops.iter().rev().fold(condition, |inner, hop| {
        format!(
            "{} IN (SELECT {} FROM {} WHERE {})",
            hop.column, hop.target.primary_key, hop.target.table, inner
        )
    });
    SqlFragment { sql, values }
}

/// `%needle%` with LIKE wildcards in the needle escaped.
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Render a JSON filter value as the literal string it stands for.
fn literal_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        JsonValue::Null | JsonValue::Array(_) | JsonValue::Object(_) => None,
    }
}

/// Convert a literal into the scalar type of `kind`.
pub fn convert_literal(kind: FieldKind, raw: &str) -> Option<SqlValue> {
    match kind {
        FieldKind::Text => Some(SqlValue::Text(raw.to_string())),
        FieldKind::Integer => raw.trim().parse::<i64>().ok().map(SqlValue::Int),
        FieldKind::Real => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(SqlValue::Float),
        FieldKind::Boolean => {
            let raw = raw.trim();
            if raw.eq_ignore_ascii_case("true") {
                Some(SqlValue::Bool(true))
            } else if raw.eq_ignore_ascii_case("false") {
                Some(SqlValue::Bool(false))
            } else {
                None
            }
        }
        FieldKind::Date => parse_date(raw.trim()).map(SqlValue::from),
        FieldKind::Enum(variants) => variants
            .iter()
            .find(|v| v.eq_ignore_ascii_case(raw.trim()))
            .map(|v| SqlValue::Text((*v).to_string())),
        FieldKind::Reference(_) => None,
    }
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (date part is used).
fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
        chrono::DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.date_naive())
    })
}

/// Build the AND of every usable `(path, value)` pair in `filter`.
pub fn build_predicate(descriptor: &'static EntityDescriptor, filter: &FilterDescriptor) -> Predicate {
    let mut predicate = Predicate::All;

    for (key, value) in filter.iter() {
        let Some(path) = resolve_path(descriptor, key) else {
            debug!(entity = descriptor.name, path = %key, "Skipping filter on unknown path");
            continue;
        };

        let Some(raw) = literal_text(value) else {
            debug!(entity = descriptor.name, path = %key, "Skipping filter with non-scalar value");
            continue;
        };

        let part = if path.kind().is_textual() {
            Predicate::Contains(path, raw)
        } else {
            match convert_literal(path.kind(), &raw) {
                Some(converted) => Predicate::Eq(path, converted),
                None => {
                    debug!(
                        entity = descriptor.name,
                        path = %key,
                        value = %raw,
                        "Skipping filter value that does not convert to the field type"
                    );
                    continue;
                }
            }
        };

        predicate = predicate.and(part);
    }

    predicate
}
