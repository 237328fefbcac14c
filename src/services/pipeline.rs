//! Filter/sort pipeline over the fetched recommendation list
//!
//! Pure functions only: the displayed list is a view over the immutable fetched records
//! and is recomputed from scratch whenever one of its inputs changes. Stages run in a
//! fixed order, each narrowing the previous one:
//!
//! 1. free-text search (case-insensitive substring over name, description, explanation,
//!    test type and job levels)
//! 2. test type tab
//! 3. job level (substring match on the raw `job_levels` string)
//! 4. stable sort by the active criterion
use std::cmp::Ordering;
use std::collections::HashSet;

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::models::{Facet, Filters, Recommendation, SortBy, ALL};

/// Produces the displayed list for `filters`
pub fn apply<'a>(
    recommendations: &'a [Recommendation],
    filters: &Filters,
) -> Vec<&'a Recommendation> {
    let needle = filters.search.to_lowercase();

    let mut displayed: Vec<&Recommendation> = recommendations
        .iter()
        .filter(|rec| needle.is_empty() || rec.matches_search(&needle))
        .filter(|rec| match &filters.test_type {
            Facet::All => true,
            Facet::Only(test_type) => rec.test_type == *test_type,
        })
        .filter(|rec| match &filters.job_level {
            Facet::All => true,
            Facet::Only(level) => rec.job_levels.contains(level.as_str()),
        })
        .collect();

    sort(&mut displayed, filters.sort_by);
    displayed
}

/// Stable sort by one criterion
pub fn sort(displayed: &mut [&Recommendation], sort_by: SortBy) {
    match sort_by {
        SortBy::Relevance => displayed.sort_by(|a, b| b.score().total_cmp(&a.score())),
        SortBy::Name => displayed.sort_by(|a, b| compare_names(&a.name, &b.name)),
        SortBy::Duration => displayed.sort_by_key(|rec| rec.duration_minutes()),
    }
}

/// Locale-aware name comparison
///
/// Primary ordering ignores case and accents. Names equal there are ordered by accents
/// (unaccented first), then by case (lowercase first).
pub fn compare_names(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| accent_key(a).cmp(&accent_key(b)))
        .then_with(|| case_key(a).cmp(&case_key(b)))
        .then_with(|| a.cmp(b))
}

fn collation_key(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// One flag per base character: whether it carries a combining mark
fn accent_key(name: &str) -> Vec<bool> {
    let mut key = Vec::new();
    for c in name.nfd() {
        if is_combining_mark(c) {
            if let Some(accented) = key.last_mut() {
                *accented = true;
            }
        } else {
            key.push(false);
        }
    }
    key
}

/// One flag per base character: whether it is uppercase
fn case_key(name: &str) -> Vec<bool> {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(char::is_uppercase)
        .collect()
}

/// Type tabs: `"all"` followed by the distinct test types in first-encountered order
pub fn type_tabs(recommendations: &[Recommendation]) -> Vec<String> {
    distinct_in_order(recommendations.iter().map(|rec| rec.test_type.as_str()))
}

/// Job level choices: `"all"` followed by the distinct levels in first-encountered order
pub fn job_levels(recommendations: &[Recommendation]) -> Vec<String> {
    distinct_in_order(recommendations.iter().flat_map(Recommendation::job_level_labels))
}

fn distinct_in_order<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::from([ALL]);
    let mut out = vec![ALL.to_string()];
    for value in values {
        if seen.insert(value) {
            out.push(value.to_string());
        }
    }
    out
}
