//! Range/partial matching and AND/OR combination.

use super::constraint::{Constraint, Constraints};
use super::pagination::{paginate, Pagination};
use bundledb_commons::{Bundle, Row, RowId};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// How per-field matches combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Operator {
    /// Keep rows that matched every common field.
    #[default]
    And,
    /// Keep rows that matched any common field.
    Or,
}

impl Operator {
    /// Case-insensitive; absent means AND and anything other than AND means OR.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => Operator::And,
            Some(op) if op.eq_ignore_ascii_case("and") => Operator::And,
            Some(_) => Operator::Or,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::And => "AND",
            Operator::Or => "OR",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully parsed query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub constraints: Constraints,
    pub strict: bool,
    pub operator: Operator,
    pub pagination: Option<Pagination>,
}

impl Query {
    pub fn new(constraints: Constraints) -> Self {
        Self {
            constraints,
            strict: false,
            operator: Operator::And,
            pagination: None,
        }
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn operator(mut self, operator: Operator) -> Self {
        self.operator = operator;
        self
    }

    pub fn paginate(mut self, pagination: Option<Pagination>) -> Self {
        self.pagination = pagination;
        self
    }
}

fn as_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Date-like strings: `/`- or `-`-delimited, exactly three components, at least
/// ten characters, and the components of the first ten characters are integers.
pub fn is_date(s: &str) -> bool {
    let delim = if s.contains('/') {
        '/'
    } else if s.contains('-') {
        '-'
    } else {
        return false;
    };
    if s.split(delim).count() != 3 || s.chars().count() < 10 {
        return false;
    }
    let head: String = s.chars().take(10).collect();
    head.split(delim).all(|c| c.parse::<i64>().is_ok())
}

/// Inclusive range test of `candidate` between the first two bounds.
///
/// Numeric when the candidate and both bounds parse as numbers, lexicographic
/// otherwise. In strict mode the candidate must equal one of the bounds.
pub fn is_range_match(candidate: &str, bounds: &[String], strict: bool, negated: bool) -> bool {
    let Some(first) = bounds.first() else {
        return negated;
    };
    let second = bounds.get(1).unwrap_or(first);

    let matched = if strict {
        candidate == first || candidate == second
    } else {
        let candidate = candidate.to_lowercase();
        match (as_number(&candidate), as_number(first), as_number(second)) {
            (Some(c), Some(a), Some(b)) => c >= a.min(b) && c <= a.max(b),
            _ => {
                let (upper, lower) = if first >= second {
                    (first.as_str(), second.as_str())
                } else {
                    (second.as_str(), first.as_str())
                };
                candidate.as_str() >= lower && candidate.as_str() <= upper
            },
        }
    };
    matched != negated
}

/// Substring test of `candidate` against any option.
///
/// Non-strict: case-folded containment in either direction. Strict: equality.
pub fn is_partial_match(candidate: &str, options: &[String], strict: bool, negated: bool) -> bool {
    let matched = if strict {
        options.iter().any(|o| o == candidate)
    } else {
        let candidate = candidate.to_lowercase();
        options
            .iter()
            .any(|o| candidate.contains(o.as_str()) || o.contains(candidate.as_str()))
    };
    matched != negated
}

fn bucket_matches(key: &str, constraint: &Constraint, strict: bool) -> bool {
    if as_number(key).is_some() || is_date(key) {
        is_range_match(key, &constraint.bounds, strict, constraint.negated)
    } else {
        is_partial_match(key, &constraint.bounds, strict, constraint.negated)
    }
}

/// Resolve `query` against `bundle`, returning visible row ids.
///
/// Pagination is applied to the raw match list (duplicates included under AND)
/// before de-duplication and the soft-delete filter.
pub fn determine_matches(bundle: &Bundle, query: &Query) -> Vec<RowId> {
    let constraints = match &query.constraints {
        Constraints::All => return bundle.visible_rows().map(|(id, _)| *id).collect(),
        Constraints::Fields(fields) => fields,
    };

    let dataform = &bundle.register.dataform;
    let common: Vec<&Constraint> = constraints
        .iter()
        .filter(|c| dataform.contains(&c.field) && bundle.index.contains_key(&c.field))
        .collect();

    let mut pool: Vec<RowId> = Vec::new();
    for constraint in &common {
        if let Some(buckets) = bundle.index.get(&constraint.field) {
            for (key, ids) in buckets {
                if bucket_matches(key, constraint, query.strict) {
                    pool.extend(ids.iter().copied());
                }
            }
        }
    }

    let matches: Vec<RowId> = match query.operator {
        Operator::And => {
            let mut counts: HashMap<RowId, usize> = HashMap::new();
            for id in &pool {
                *counts.entry(*id).or_default() += 1;
            }
            pool.iter()
                .copied()
                .filter(|id| counts.get(id) == Some(&common.len()))
                .collect()
        },
        Operator::Or => dedup(&pool),
    };

    dedup(&paginate(&matches, query.pagination))
        .into_iter()
        .filter(|id| bundle.visible_row(id).is_some())
        .collect()
}

fn dedup(ids: &[RowId]) -> Vec<RowId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

/// Look up visible rows by id, in the given order.
pub fn materialize(bundle: &Bundle, ids: &[RowId]) -> Vec<Row> {
    ids.iter()
        .filter_map(|id| bundle.visible_row(id).cloned())
        .collect()
}

/// Keep only the `restrict`ed fields of a row; `None` keeps everything.
pub fn apply_restrict(row: Row, restrict: Option<&[String]>) -> Row {
    match restrict {
        None => row,
        Some(fields) => row
            .into_iter()
            .filter(|(k, _)| fields.iter().any(|f| f == k))
            .collect::<serde_json::Map<String, Value>>(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::users_bundle;
    use serde_json::json;

    fn query(constraints: Value) -> Query {
        Query::new(Constraints::parse(&constraints, false).unwrap())
    }

    fn names(bundle: &Bundle, ids: &[RowId]) -> Vec<String> {
        materialize(bundle, ids)
            .iter()
            .map(|r| r["name"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn test_is_date() {
        assert!(is_date("2021-03-04"));
        assert!(is_date("04/03/2021"));
        assert!(is_date("2021-03-04T10:00:00"));
        assert!(!is_date("21-3-4"));
        assert!(!is_date("abcd-ef-ghij"));
        assert!(!is_date("2021-03-04-05"));
        assert!(!is_date("plain"));
    }

    #[test]
    fn test_range_match_numeric_and_lexicographic() {
        let b = |a: &str, c: &str| vec![a.to_string(), c.to_string()];
        assert!(is_range_match("25", &b("28", "20"), false, false));
        assert!(is_range_match("9", &b("8", "10"), false, false));
        assert!(!is_range_match("30", &b("20", "28"), false, false));
        assert!(is_range_match("30", &b("20", "28"), false, true));
        assert!(is_range_match("2021-02-01", &b("2021-01-01", "2021-03-01"), false, false));
        assert!(!is_range_match("2021-04-01", &b("2021-01-01", "2021-03-01"), false, false));
    }

    #[test]
    fn test_range_match_strict_requires_endpoint() {
        let bounds = vec!["20".to_string(), "28".to_string()];
        assert!(!is_range_match("25", &bounds, true, false));
        assert!(is_range_match("28", &bounds, true, false));
        assert!(is_range_match("25", &bounds, true, true));
    }

    #[test]
    fn test_partial_match() {
        let opts = vec!["an".to_string(), "an".to_string()];
        assert!(is_partial_match("Ann", &opts, false, false));
        assert!(is_partial_match("a", &opts, false, false));
        assert!(!is_partial_match("Bo", &opts, false, false));
        assert!(is_partial_match("Bo", &opts, false, true));
        assert!(!is_partial_match("Ann", &opts, true, false));
        let exact = vec!["Ann".to_string(), "Ann".to_string()];
        assert!(is_partial_match("Ann", &exact, true, false));
    }

    #[test]
    fn test_operator_parse() {
        assert_eq!(Operator::parse(None), Operator::And);
        assert_eq!(Operator::parse(Some("and")), Operator::And);
        assert_eq!(Operator::parse(Some("Or")), Operator::Or);
        assert_eq!(Operator::parse(Some("xor")), Operator::Or);
    }

    #[test]
    fn test_age_range_returns_bo() {
        let bundle = users_bundle();
        let ids = determine_matches(&bundle, &query(json!({"age": [20, 28]})));
        assert_eq!(names(&bundle, &ids), vec!["Bo"]);
    }

    #[test]
    fn test_substring_returns_ann() {
        let bundle = users_bundle();
        let ids = determine_matches(&bundle, &query(json!({"name": "an"})));
        assert_eq!(names(&bundle, &ids), vec!["Ann"]);
    }

    #[test]
    fn test_and_versus_or() {
        let bundle = users_bundle();
        let and = determine_matches(&bundle, &query(json!({"name": "bo", "age": 30})));
        assert!(and.is_empty());

        let or = determine_matches(
            &bundle,
            &query(json!({"name": "bo", "age": 30})).operator(Operator::Or),
        );
        let mut got = names(&bundle, &or);
        got.sort();
        assert_eq!(got, vec!["Ann", "Bo"]);
    }

    #[test]
    fn test_negation_is_complement_over_pool() {
        let bundle = users_bundle();
        let pos = determine_matches(&bundle, &query(json!({"age": [20, 28]})));
        let neg = determine_matches(&bundle, &query(json!({"age_NOT": [20, 28]})));
        assert_eq!(names(&bundle, &pos), vec!["Bo"]);
        assert_eq!(names(&bundle, &neg), vec!["Ann"]);
    }

    #[test]
    fn test_unknown_fields_match_nothing_under_and() {
        let bundle = users_bundle();
        assert!(determine_matches(&bundle, &query(json!({"email": "x"}))).is_empty());
    }

    #[test]
    fn test_match_all_skips_private_rows() {
        let mut bundle = users_bundle();
        bundle
            .table
            .get_mut(&RowId::new(1))
            .unwrap()
            .insert("__private__".into(), json!(1));
        let ids = determine_matches(&bundle, &query(json!("*")));
        assert_eq!(names(&bundle, &ids), vec!["Bo"]);
        let ids = determine_matches(&bundle, &query(json!({"name": "an"})));
        assert!(ids.is_empty());
    }

    #[test]
    fn test_pagination_applies_before_dedup() {
        let bundle = users_bundle();
        // Under AND with two common fields every match appears twice, so the
        // list has four entries and a second page of three still holds one row.
        let q = query(json!({"name": "", "age": [0, 100]})).paginate(Some(Pagination {
            page_size: 3,
            this_page: 2,
        }));
        let ids = determine_matches(&bundle, &q);
        assert_eq!(ids.len(), 1);

        let unpaged = determine_matches(&bundle, &query(json!({"name": "", "age": [0, 100]})));
        assert_eq!(unpaged.len(), 2);
    }

    #[test]
    fn test_strict_text_is_case_sensitive() {
        let bundle = users_bundle();
        let strict = Query::new(Constraints::parse(&json!({"name": "ann"}), true).unwrap())
            .strict(true);
        assert!(determine_matches(&bundle, &strict).is_empty());
        let strict = Query::new(Constraints::parse(&json!({"name": "Ann"}), true).unwrap())
            .strict(true);
        assert_eq!(names(&bundle, &determine_matches(&bundle, &strict)), vec!["Ann"]);
    }

    #[test]
    fn test_apply_restrict() {
        let row = json!({"name": "Ann", "age": 30}).as_object().cloned().unwrap();
        let restricted = apply_restrict(row.clone(), Some(&["name".to_string()]));
        assert_eq!(Value::Object(restricted), json!({"name": "Ann"}));
        assert_eq!(apply_restrict(row.clone(), None), row);
    }
}
