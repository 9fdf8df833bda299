//! Rewriting of textual repeat expressions.
//!
//! Template-driven hosts render lists from expressions such as
//! `item in items track by item.id`. A [`LazyRepeater`](crate::LazyRepeater)
//! limits such a list by splicing a `limitTo` filter driven by its limit
//! getter into the expression, ahead of any `track by` clause.

use crate::attributes::AttributeError;

/// Getter name used by [`RepeatExpression::rewrite_default`].
pub const DEFAULT_LIMIT_GETTER: &str = "getLazyLimit";

const TRACK_BY: &str = "track by";

/// A repeat expression with a length-limiting filter applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepeatExpression {
    /// The full rewritten expression.
    pub rewritten: String,
    /// The collection expression the list is read from.
    pub source: String,
}

impl RepeatExpression {
    /// Splices `| limitTo: <getter>()` into `expression`.
    pub fn rewrite(expression: &str, getter: &str) -> Result<Self, AttributeError> {
        let source = source_of(expression)
            .ok_or_else(|| AttributeError::MalformedRepeat(expression.to_owned()))?;

        let filter = format!("| limitTo: {getter}()");
        let rewritten = match expression.find(TRACK_BY) {
            Some(index) => {
                let (head, tail) = expression.split_at(index);
                format!("{} {filter} {tail}", head.trim_end())
            }
            None => format!("{} {filter}", expression.trim_end()),
        };

        Ok(Self {
            rewritten,
            source: source.to_owned(),
        })
    }

    pub fn rewrite_default(expression: &str) -> Result<Self, AttributeError> {
        Self::rewrite(expression, DEFAULT_LIMIT_GETTER)
    }
}

/// The token following the first standalone `in` keyword, up to whitespace
/// or a filter pipe.
fn source_of(expression: &str) -> Option<&str> {
    let bytes = expression.as_bytes();
    let mut search_from = 0;
    while let Some(offset) = expression[search_from..].find("in") {
        let start = search_from + offset;
        let end = start + 2;
        let standalone_before = start == 0
            || bytes[start - 1].is_ascii_whitespace()
            || bytes[start - 1] == b')';
        let standalone_after = end < bytes.len() && bytes[end].is_ascii_whitespace();
        if standalone_before && standalone_after {
            let rest = expression[end..].trim_start();
            let token_end = rest
                .find(|ch: char| ch.is_whitespace() || ch == '|')
                .unwrap_or(rest.len());
            let token = &rest[..token_end];
            return (!token.is_empty()).then_some(token);
        }
        search_from = end;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appends_filter() {
        let expr = RepeatExpression::rewrite_default("item in items").unwrap();
        assert_eq!(expr.rewritten, "item in items | limitTo: getLazyLimit()");
        assert_eq!(expr.source, "items");
    }

    #[test]
    fn test_inserts_before_track_by() {
        let expr = RepeatExpression::rewrite("obj in data track by obj.index", "limit").unwrap();
        assert_eq!(expr.rewritten, "obj in data | limitTo: limit() track by obj.index");
        assert_eq!(expr.source, "data");
    }

    #[test]
    fn test_source_stops_at_pipe() {
        let expr = RepeatExpression::rewrite_default("(key, value) in ctrl.rows|orderBy:'name'").unwrap();
        assert_eq!(expr.source, "ctrl.rows");
    }

    #[test]
    fn test_ignores_in_inside_identifiers() {
        let expr = RepeatExpression::rewrite_default("index in indexes").unwrap();
        assert_eq!(expr.source, "indexes");
    }

    #[test]
    fn test_rejects_missing_in() {
        let err = RepeatExpression::rewrite_default("items").unwrap_err();
        assert_eq!(err, AttributeError::MalformedRepeat("items".into()));
    }
}
