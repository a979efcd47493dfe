// 🛵 Courier Matching - selected name vs free-text delivery rows
// Strategies tried in order: Exact → Contains → FirstName → Fuzzy

use crate::aliases::fold_diacritics;
use crate::table::Table;
use anyhow::Result;
use serde::{Deserialize, Serialize};

// ============================================================================
// MATCH STRATEGY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStrategy {
    /// Same text after normalization
    Exact,

    /// One name's words appear as a run in the other ("joao silva" in "entrega joao silva moto")
    Contains,

    /// Same first token ("Joao S." vs "Joao Silva")
    FirstName,

    /// Within Levenshtein distance of the threshold, scaled down for short names
    Fuzzy,
}

/// Names shorter than this are too ambiguous to match partially ("jo", "ze", "s")
const MIN_PARTIAL_LEN: usize = 3;

/// One allowed edit per this many chars of the shorter name
const CHARS_PER_EDIT: usize = 4;

// ============================================================================
// COURIER MATCHER
// ============================================================================

#[derive(Debug, Clone)]
pub struct CourierMatcher {
    name: String,
    normalized: String,
    fuzzy_threshold: usize,
}

impl CourierMatcher {
    pub fn new(name: &str) -> Self {
        CourierMatcher {
            name: name.to_string(),
            normalized: normalize_courier_name(name),
            fuzzy_threshold: 2,
        }
    }

    pub fn with_fuzzy_threshold(mut self, threshold: usize) -> Self {
        self.fuzzy_threshold = threshold;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Which strategy (if any) accepts this entry
    pub fn match_entry(&self, entry: &str) -> Option<MatchStrategy> {
        let candidate = normalize_courier_name(entry);
        if self.normalized.is_empty() || candidate.is_empty() {
            return None;
        }

        if candidate == self.normalized {
            return Some(MatchStrategy::Exact);
        }

        if contains_token_run(&candidate, &self.normalized)
            || contains_token_run(&self.normalized, &candidate)
        {
            return Some(MatchStrategy::Contains);
        }

        let first_selected = self.normalized.split(' ').next().unwrap_or("");
        let first_candidate = candidate.split(' ').next().unwrap_or("");
        if first_selected.chars().count() >= MIN_PARTIAL_LEN && first_selected == first_candidate {
            return Some(MatchStrategy::FirstName);
        }

        let shorter = candidate.chars().count().min(self.normalized.chars().count());
        let threshold = self.fuzzy_threshold.min(shorter / CHARS_PER_EDIT);
        if levenshtein_distance(&candidate, &self.normalized) <= threshold {
            return Some(MatchStrategy::Fuzzy);
        }

        None
    }

    pub fn matches(&self, entry: &str) -> bool {
        self.match_entry(entry).is_some()
    }

    /// Indices of rows whose `column` cell matches this courier
    pub fn filter_rows(&self, table: &Table, column: &str) -> Result<Vec<usize>> {
        let col = table.column(column)?;
        let hits: Vec<usize> = (0..table.len())
            .filter(|&row| self.matches(table.cell(row, col)))
            .collect();

        tracing::debug!(courier = %self.name, hits = hits.len(), "filtered delivery rows");
        Ok(hits)
    }
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Lowercase, strip accents and punctuation, collapse whitespace
fn normalize_courier_name(s: &str) -> String {
    fold_diacritics(&s.to_lowercase())
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whole-word containment: the words of `needle` appear consecutively in `haystack`
fn contains_token_run(haystack: &str, needle: &str) -> bool {
    if needle.chars().count() < MIN_PARTIAL_LEN {
        return false;
    }

    let hay: Vec<&str> = haystack.split(' ').collect();
    let run: Vec<&str> = needle.split(' ').collect();
    run.len() <= hay.len() && hay.windows(run.len()).any(|window| window == run.as_slice())
}

/// Edit distance over chars (insert, delete, substitute)
fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_courier_name() {
        assert_eq!(normalize_courier_name("  João  da Silva "), "joao da silva");
        assert_eq!(normalize_courier_name("JOÃO-SILVA (moto)"), "joao silva moto");
    }

    #[test]
    fn test_levenshtein_distance() {
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("", "abc"), 3);
        assert_eq!(levenshtein_distance("marcos", "marcos"), 0);
        assert_eq!(levenshtein_distance("joão", "joao"), 1);
    }

    #[test]
    fn test_strategy_chain_order() {
        let matcher = CourierMatcher::new("João Silva");

        assert_eq!(matcher.match_entry("joao silva"), Some(MatchStrategy::Exact));
        assert_eq!(matcher.match_entry("Entrega João Silva - moto"), Some(MatchStrategy::Contains));
        assert_eq!(matcher.match_entry("Joao Pereira"), Some(MatchStrategy::FirstName));
        assert_eq!(matcher.match_entry("Joap Silba"), Some(MatchStrategy::Fuzzy));
        assert_eq!(matcher.match_entry("Marcos Lima"), None);
    }

    #[test]
    fn test_short_first_name_not_enough() {
        let matcher = CourierMatcher::new("Zé Carlos");
        assert_eq!(matcher.match_entry("Zé Maria Souza"), None);
    }

    #[test]
    fn test_empty_never_matches() {
        assert!(!CourierMatcher::new("").matches("qualquer"));
        assert!(!CourierMatcher::new("Ana").matches(""));
        assert!(!CourierMatcher::new("Ana").matches("  --  "));
    }

    #[test]
    fn test_fuzzy_threshold_configurable() {
        let strict = CourierMatcher::new("Rafael").with_fuzzy_threshold(0);
        assert!(!strict.matches("Rafeal"));

        let loose = CourierMatcher::new("Rafael");
        assert_eq!(loose.match_entry("Rafaek"), Some(MatchStrategy::Fuzzy));
        // Two edits need at least 8 chars
        assert_eq!(loose.match_entry("Rafeal"), None);
    }

    #[test]
    fn test_short_names_do_not_fuzzy_match() {
        let matcher = CourierMatcher::new("Ana");
        assert_eq!(matcher.match_entry("Bia"), None);
        assert_eq!(matcher.match_entry("Eva"), None);
        assert_eq!(matcher.match_entry("ana"), Some(MatchStrategy::Exact));
    }

    #[test]
    fn test_contains_needs_whole_words() {
        let ana = CourierMatcher::new("Ana");
        assert_eq!(ana.match_entry("Mariana Souza"), None);
        assert_eq!(ana.match_entry("Ana Paula"), Some(MatchStrategy::Contains));

        let joao = CourierMatcher::new("João Silva");
        assert_eq!(joao.match_entry("S"), None);
        assert_eq!(joao.match_entry("a"), None);
        assert_eq!(joao.match_entry("silva"), Some(MatchStrategy::Contains));
        assert_eq!(joao.match_entry("Silvana Costa"), None);
    }

    #[test]
    fn test_contains_token_run() {
        assert!(contains_token_run("entrega joao silva moto", "joao silva"));
        assert!(!contains_token_run("joao moto silva", "joao silva"));
        assert!(!contains_token_run("joao da silva", "da"));
        assert!(!contains_token_run("joao", "joao silva"));
    }

    #[test]
    fn test_filter_rows() {
        let table = Table::new(
            vec!["Entregador".to_string(), "Km".to_string()],
            vec![
                vec!["joão silva".to_string(), "3,2".to_string()],
                vec!["Marcos".to_string(), "5".to_string()],
                vec!["JOAO".to_string(), "1,0".to_string()],
            ],
        );

        let rows = CourierMatcher::new("João Silva").filter_rows(&table, "entregador").unwrap();
        assert_eq!(rows, vec![0, 2]);

        assert!(CourierMatcher::new("x").filter_rows(&table, "Motoboy").is_err());
    }
}
