use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Words that always count as key terms when building matching keys
const DEFAULT_TERMS: &[&str] = &[
    "bitcoin", "btc", "ethereum", "eth", "solana", "sol", "xrp", "doge",
    "election", "president", "senate", "house", "governor", "primary",
    "wins", "win", "reach", "above", "below", "fed", "rates", "cut", "hike",
    "recession", "inflation", "trump", "biden", "harris", "super", "bowl",
];

/// Vocabulary file layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabularyFile {
    /// Domain words kept as key terms regardless of length
    pub terms: Vec<String>,

    /// Asset symbols and the words that name them
    #[serde(default)]
    pub assets: Vec<AssetAliasEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetAliasEntry {
    /// Oracle symbol (e.g., "BTC")
    pub symbol: String,
    /// Words naming the asset in market questions
    pub aliases: Vec<String>,
}

/// Domain vocabulary used by the event matcher and oracle scanner
#[derive(Debug, Clone)]
pub struct Vocabulary {
    terms: HashSet<String>,
    /// Map of alias -> asset symbol
    assets: HashMap<String, String>,
}

impl Vocabulary {
    /// Create a vocabulary with no terms
    pub fn empty() -> Self {
        Self {
            terms: HashSet::new(),
            assets: HashMap::new(),
        }
    }

    /// Built-in crypto and politics vocabulary
    pub fn builtin() -> Self {
        let mut vocabulary = Self::empty();
        for term in DEFAULT_TERMS {
            vocabulary.add_term(term);
        }
        vocabulary.add_asset("BTC", &["bitcoin", "btc"]);
        vocabulary.add_asset("ETH", &["ethereum", "eth", "ether"]);
        vocabulary.add_asset("SOL", &["solana", "sol"]);
        vocabulary
    }

    /// Load vocabulary from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).context("Failed to read vocabulary file")?;

        let file: VocabularyFile =
            serde_json::from_str(&content).context("Failed to parse vocabulary JSON")?;

        let mut vocabulary = Self::empty();
        for term in &file.terms {
            vocabulary.add_term(term);
        }
        for entry in &file.assets {
            let aliases: Vec<&str> = entry.aliases.iter().map(String::as_str).collect();
            vocabulary.add_asset(&entry.symbol, &aliases);
        }

        info!(
            "Loaded {} vocabulary terms and {} asset aliases",
            vocabulary.terms.len(),
            vocabulary.assets.len()
        );

        Ok(vocabulary)
    }

    pub fn add_term(&mut self, term: &str) {
        self.terms.insert(term.trim().to_lowercase());
    }

    /// Register an asset; its aliases also become key terms
    pub fn add_asset(&mut self, symbol: &str, aliases: &[&str]) {
        let symbol = symbol.trim().to_uppercase();
        for alias in aliases {
            let alias = alias.trim().to_lowercase();
            self.terms.insert(alias.clone());
            self.assets.insert(alias, symbol.clone());
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.terms.contains(word)
    }

    /// Asset symbol named by a normalized word, if any
    pub fn asset_for(&self, word: &str) -> Option<&str> {
        self.assets.get(word).map(String::as_str)
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_assets() {
        let vocabulary = Vocabulary::builtin();

        assert_eq!(vocabulary.asset_for("bitcoin"), Some("BTC"));
        assert_eq!(vocabulary.asset_for("eth"), Some("ETH"));
        assert_eq!(vocabulary.asset_for("dogecoin"), None);
        assert!(vocabulary.contains("election"));
    }

    #[test]
    fn test_terms_are_lowercased() {
        let mut vocabulary = Vocabulary::empty();
        vocabulary.add_term("  Playoffs ");
        vocabulary.add_asset("link", &["Chainlink"]);

        assert!(vocabulary.contains("playoffs"));
        assert!(vocabulary.contains("chainlink"));
        assert_eq!(vocabulary.asset_for("chainlink"), Some("LINK"));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join("spread_scout_vocabulary_test.json");
        std::fs::write(
            &path,
            r#"{ "terms": ["nba", "finals"], "assets": [{ "symbol": "btc", "aliases": ["bitcoin"] }] }"#,
        )
        .unwrap();

        let vocabulary = Vocabulary::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(vocabulary.contains("nba"));
        assert!(vocabulary.contains("bitcoin"));
        assert!(!vocabulary.contains("election"));
        assert_eq!(vocabulary.asset_for("bitcoin"), Some("BTC"));
    }
}
