// 🏷️ Alias Rules - Product names as data
// Noisy product text → canonical inventory key, first declared rule wins

use anyhow::{Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

// ============================================================================
// RULE DEFINITION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasRule {
    /// Substring to look for (case-insensitive)
    pub pattern: String,

    /// Name returned when the pattern matches
    pub canonical: String,
}

impl AliasRule {
    pub fn new(pattern: impl Into<String>, canonical: impl Into<String>) -> Self {
        AliasRule {
            pattern: pattern.into(),
            canonical: canonical.into(),
        }
    }
}

/// How input and patterns are folded before substring matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// Lower-case + trim
    Lowercase,

    /// Lower-case + trim + strip accents ("gás" → "gas")
    #[default]
    FoldDiacritics,
}

impl Normalization {
    pub fn apply(&self, text: &str) -> String {
        let lowered = text.trim().to_lowercase();
        match self {
            Normalization::Lowercase => lowered,
            Normalization::FoldDiacritics => fold_diacritics(&lowered),
        }
    }
}

/// Decompose (NFD) and drop combining marks
pub(crate) fn fold_diacritics(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

// ============================================================================
// RESOLUTION RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Matched { canonical: String, rule_index: usize },
    Unmatched,
}

impl Resolution {
    pub fn is_match(&self) -> bool {
        matches!(self, Resolution::Matched { .. })
    }
}

// ============================================================================
// ALIAS RESOLVER
// ============================================================================

#[derive(Debug, Clone)]
struct PreparedRule {
    rule: AliasRule,
    /// Position in the caller's list, before empty patterns were dropped
    declared_at: usize,
    folded_pattern: String,
}

/// Ordered alias table. Declaration order is the tie-break.
#[derive(Debug, Clone)]
pub struct AliasResolver {
    rules: Vec<PreparedRule>,
    normalization: Normalization,
}

impl AliasResolver {
    /// Build from a caller-supplied ordered list
    pub fn new(rules: Vec<AliasRule>) -> Self {
        Self::with_normalization(rules, Normalization::default())
    }

    pub fn with_normalization(rules: Vec<AliasRule>, normalization: Normalization) -> Self {
        let rules = rules
            .into_iter()
            .enumerate()
            .filter_map(|(declared_at, rule)| {
                let folded_pattern = normalization.apply(&rule.pattern);
                if folded_pattern.is_empty() {
                    // An empty pattern is a substring of everything
                    tracing::warn!(canonical = %rule.canonical, "dropping alias rule with empty pattern");
                    return None;
                }
                Some(PreparedRule {
                    rule,
                    declared_at,
                    folded_pattern,
                })
            })
            .collect();

        AliasResolver {
            rules,
            normalization,
        }
    }

    /// Load rules from a JSON array of `{ "pattern", "canonical" }`
    pub fn from_file<P: AsRef<Path>>(path: P, normalization: Normalization) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read alias file: {:?}", path.as_ref()))?;

        let rules: Vec<AliasRule> =
            serde_json::from_str(&content).context("Failed to parse alias rules JSON")?;

        tracing::info!(count = rules.len(), path = ?path.as_ref(), "loaded alias rules");
        Ok(Self::with_normalization(rules, normalization))
    }

    /// Resolver over the built-in product table
    pub fn with_default_rules() -> Self {
        Self::new(default_rules())
    }

    /// Canonical name for `raw`, or `raw` unchanged when nothing matches
    pub fn normalize(&self, raw: &str) -> String {
        match self.resolve(raw) {
            Resolution::Matched { canonical, .. } => canonical,
            Resolution::Unmatched => raw.to_string(),
        }
    }

    pub fn resolve(&self, raw: &str) -> Resolution {
        let folded = self.normalization.apply(raw);

        self.rules
            .iter()
            .find(|prepared| folded.contains(&prepared.folded_pattern))
            .map(|prepared| Resolution::Matched {
                canonical: prepared.rule.canonical.clone(),
                rule_index: prepared.declared_at,
            })
            .unwrap_or(Resolution::Unmatched)
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn rules(&self) -> impl Iterator<Item = &AliasRule> {
        self.rules.iter().map(|prepared| &prepared.rule)
    }

    pub fn normalization(&self) -> Normalization {
        self.normalization
    }
}

impl Default for AliasResolver {
    fn default() -> Self {
        Self::with_default_rules()
    }
}

/// Product table used by the stock pages. More specific patterns come first.
pub fn default_rules() -> Vec<AliasRule> {
    vec![
        AliasRule::new("agua com gas", "agua com gas"),
        AliasRule::new("agua tonica", "agua tonica"),
        AliasRule::new("agua", "agua sem gas"),
        AliasRule::new("coca zero", "coca-cola zero"),
        AliasRule::new("coca", "coca-cola"),
        AliasRule::new("guarana", "guarana antarctica"),
        AliasRule::new("heineken", "heineken long neck"),
        AliasRule::new("brahma", "brahma lata"),
        AliasRule::new("gelo", "gelo 5kg"),
        AliasRule::new("carvao", "carvao 3kg"),
    ]
}

// ============================================================================
// TESTS
// ============================================================================
