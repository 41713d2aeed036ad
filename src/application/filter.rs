use regex::{Regex, RegexBuilder};

use crate::domain::criteria::FilterCriteria;
use crate::domain::payment::PaymentRecord;

/// Returns the records matching every active criterion, preserving input
/// order. Inputs are not mutated; the result borrows from `records`.
pub fn filter<'a, I>(records: I, criteria: &FilterCriteria) -> Vec<&'a PaymentRecord>
where
    I: IntoIterator<Item = &'a PaymentRecord>,
{
    let min = criteria.min_bound();
    let max = criteria.max_bound();
    let matcher = TextMatcher::compile(&criteria.query);

    records
        .into_iter()
        .filter(|p| {
            if let Some(status) = &criteria.status
                && p.status != *status
            {
                return false;
            }
            if let Some(direction) = criteria.direction
                && p.direction != direction
            {
                return false;
            }
            if let Some(stage) = &criteria.stage
                && !p.hops.iter().any(|h| h.stage == *stage)
            {
                return false;
            }
            if let Some(min) = min
                && p.value < min
            {
                return false;
            }
            if let Some(max) = max
                && p.value > max
            {
                return false;
            }
            if let Some(kind) = criteria.payment_type
                && p.payment_type != kind
            {
                return false;
            }
            if let Some(window) = criteria.window
                && !window.contains(p.created)
            {
                return false;
            }
            matcher.matches(&p.search_haystack())
        })
        .collect()
}

/// Text predicate, compiled once per filter pass.
enum TextMatcher {
    Any,
    Substring(String),
    Glob(Regex),
}

impl TextMatcher {
    fn compile(query: &str) -> Self {
        if query.is_empty() {
            Self::Any
        } else if query.contains('*') {
            match glob_regex(query) {
                Some(rx) => Self::Glob(rx),
                None => Self::Any,
            }
        } else {
            Self::Substring(query.to_lowercase())
        }
    }

    fn matches(&self, haystack: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Substring(needle) => haystack.to_lowercase().contains(needle),
            Self::Glob(rx) => rx.is_match(haystack),
        }
    }
}

/// Builds the anchored, case-insensitive regex for a `*` glob: literal
/// segments are escaped and each run of `*` becomes a single
/// match-anything. A pattern that is all stars matches everything.
fn glob_regex(pattern: &str) -> Option<Regex> {
    let mut collapsed = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if c == '*' && collapsed.ends_with('*') {
            continue;
        }
        collapsed.push(c);
    }
    let body = collapsed
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    let body = if body.is_empty() {
        String::from(".*")
    } else {
        body
    };
    RegexBuilder::new(&format!("^{body}$"))
        .case_insensitive(true)
        .build()
        .ok()
}
