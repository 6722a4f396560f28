use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, info};

use crate::matching::Vocabulary;
use crate::models::{EventCluster, Outcome, Quote};

const BASE_CONFIDENCE: f64 = 50.0;
const MAX_CONFIDENCE: f64 = 95.0;

const MONTHS: &[&str] = &[
    "january", "february", "march", "april", "may", "june", "july", "august",
    "september", "october", "november", "december", "jan", "feb", "mar", "apr",
    "jun", "jul", "aug", "sep", "sept", "oct", "nov", "dec",
];

/// Lowercase, drop non-alphanumeric characters, collapse whitespace
pub fn normalize(question: &str) -> String {
    let stripped: String = question
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Digits followed by a magnitude suffix, e.g. "100k", "2m", "1b"
pub fn is_numeric_token(word: &str) -> bool {
    match word.char_indices().last() {
        Some((idx, suffix)) if matches!(suffix, 'k' | 'm' | 'b') => {
            let digits = &word[..idx];
            !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
        }
        _ => false,
    }
}

/// Four-digit year or a month name
pub fn is_date_token(word: &str) -> bool {
    let is_year = word.len() == 4
        && word.chars().all(|c| c.is_ascii_digit())
        && (word.starts_with("19") || word.starts_with("20"));

    is_year || MONTHS.contains(&word)
}

/// Groups quotes from different platforms that refer to the same event and outcome
pub struct EventMatcher {
    vocabulary: Arc<Vocabulary>,
}

impl EventMatcher {
    pub fn new(vocabulary: Arc<Vocabulary>) -> Self {
        Self { vocabulary }
    }

    /// Key terms of a normalized question: vocabulary words, numeric tokens, and long words
    pub fn key_terms(&self, normalized: &str) -> Vec<String> {
        normalized
            .split_whitespace()
            .filter(|w| self.vocabulary.contains(w) || is_numeric_token(w) || w.chars().count() > 6)
            .map(str::to_string)
            .collect()
    }

    /// Matching key for a question and outcome, or `None` when it has no key terms
    ///
    /// Terms are sorted and deduplicated so word order does not split clusters.
    pub fn matching_key(&self, question: &str, outcome: Outcome) -> Option<String> {
        let mut terms = self.key_terms(&normalize(question));
        if terms.is_empty() {
            return None;
        }
        terms.sort();
        terms.dedup();

        Some(format!("{}_{}", terms.join("_"), outcome.as_str()))
    }

    /// Cluster quotes by matching key, keeping only groups spanning two or more platforms
    pub fn match_quotes(&self, quotes: &[Quote]) -> Vec<EventCluster> {
        let mut order: Vec<(String, Outcome)> = Vec::new();
        let mut groups: HashMap<String, Vec<Quote>> = HashMap::new();

        for quote in quotes {
            let Some(key) = self.matching_key(&quote.question, quote.outcome) else {
                debug!("No key terms in question: {}", quote.question);
                continue;
            };

            groups
                .entry(key.clone())
                .or_insert_with(|| {
                    order.push((key, quote.outcome));
                    Vec::new()
                })
                .push(quote.clone());
        }

        let mut clusters = Vec::new();

        for (key, outcome) in order {
            let Some(quotes) = groups.remove(&key) else {
                continue;
            };

            let platforms: HashSet<_> = quotes.iter().map(|q| q.platform).collect();
            if platforms.len() < 2 {
                debug!("Dropping single-platform group {}", key);
                continue;
            }

            let (match_confidence, matched_keywords) = score_group(&quotes);

            debug!(
                "Cluster {} | {} quotes | {} platforms | confidence {:.0}",
                key,
                quotes.len(),
                platforms.len(),
                match_confidence
            );

            clusters.push(EventCluster {
                key,
                outcome,
                quotes,
                match_confidence,
                matched_keywords,
            });
        }

        info!(
            "Matched {} quotes into {} cross-platform clusters",
            quotes.len(),
            clusters.len()
        );

        clusters
    }
}

/// Match confidence and shared keywords for a group of quotes
fn score_group(quotes: &[Quote]) -> (f64, Vec<String>) {
    let normalized: Vec<String> = quotes.iter().map(|q| normalize(&q.question)).collect();

    // Words longer than 3 characters, counted once per question
    let mut seen_order: Vec<&str> = Vec::new();
    let mut question_counts: HashMap<&str, usize> = HashMap::new();
    for question in &normalized {
        let mut in_question = HashSet::new();
        for word in question.split_whitespace().filter(|w| w.chars().count() > 3) {
            if !in_question.insert(word) {
                continue;
            }
            let count = question_counts.entry(word).or_insert(0);
            if *count == 0 {
                seen_order.push(word);
            }
            *count += 1;
        }
    }

    let matched_keywords: Vec<String> = seen_order
        .into_iter()
        .filter(|w| question_counts.get(w).copied().unwrap_or(0) >= 2)
        .map(str::to_string)
        .collect();

    let mut confidence = BASE_CONFIDENCE;

    confidence += match matched_keywords.len() {
        0 => 0.0,
        1 => 10.0,
        2 => 20.0,
        _ => 30.0,
    };

    let mut numeric_counts: HashMap<&str, usize> = HashMap::new();
    let mut date_tokens = 0;
    for word in normalized.iter().flat_map(|q| q.split_whitespace()) {
        if is_numeric_token(word) {
            *numeric_counts.entry(word).or_insert(0) += 1;
        }
        if is_date_token(word) {
            date_tokens += 1;
        }
    }

    let repeated_numbers = numeric_counts.values().filter(|&&count| count >= 2).count();
    if repeated_numbers == 1 {
        confidence += 25.0;
    }

    if date_tokens >= 2 {
        confidence += 15.0;
    }

    (confidence.clamp(0.0, MAX_CONFIDENCE), matched_keywords)
}
