//! Category highlighter: tags regex matches in contract text as Extracted Terms.

use std::collections::HashSet;

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::category::Category;
use crate::confidence::jittered_confidence;

/// A tagged substring of the contract text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedTerm {
    pub id: Uuid,
    pub text: String,
    pub category: Category,
    pub confidence: f32,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

impl ExtractedTerm {
    pub fn new<R: Rng + ?Sized>(text: &str, category: Category, start: usize, rng: &mut R) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.to_string(),
            category,
            confidence: jittered_confidence(rng),
            start,
            end: start + text.len(),
        }
    }

    /// Identity used for de-duplication: matched text plus start offset.
    pub fn dedup_key(&self) -> (String, usize) {
        (self.text.clone(), self.start)
    }
}

/// Highlight every match of `category_id`'s patterns in `text`.
///
/// Empty text, an empty id, or an unknown id produce no terms.
pub fn highlight(text: &str, category_id: &str) -> Vec<ExtractedTerm> {
    highlight_with_rng(text, category_id, &mut rand::thread_rng())
}

pub fn highlight_with_rng<R: Rng + ?Sized>(
    text: &str,
    category_id: &str,
    rng: &mut R,
) -> Vec<ExtractedTerm> {
    match Category::from_id(category_id) {
        Some(category) => highlight_category(text, category, rng),
        None => Vec::new(),
    }
}

pub fn highlight_category<R: Rng + ?Sized>(
    text: &str,
    category: Category,
    rng: &mut R,
) -> Vec<ExtractedTerm> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut seen: HashSet<(&str, usize)> = HashSet::new();
    let mut terms = Vec::new();
    for re in category.patterns() {
        for m in re.find_iter(text) {
            if m.as_str().is_empty() {
                continue;
            }
            if seen.insert((m.as_str(), m.start())) {
                terms.push(ExtractedTerm::new(m.as_str(), category, m.start(), rng));
            }
        }
    }
    terms
}

/// Highlight all categories. The same substring may appear under several
/// categories; no cross-category reconciliation is done.
pub fn highlight_all(text: &str) -> Vec<ExtractedTerm> {
    highlight_all_with_rng(text, &mut rand::thread_rng())
}

pub fn highlight_all_with_rng<R: Rng + ?Sized>(text: &str, rng: &mut R) -> Vec<ExtractedTerm> {
    Category::ALL
        .iter()
        .flat_map(|c| highlight_category(text, *c, rng))
        .collect()
}

/// Accumulates highlight batches while keeping `(text, start)` unique.
#[derive(Debug, Clone, Default)]
pub struct TermSet {
    terms: Vec<ExtractedTerm>,
    keys: HashSet<(String, usize)>,
}

impl TermSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one term; returns false if an equal `(text, start)` is present.
    pub fn insert(&mut self, term: ExtractedTerm) -> bool {
        if self.keys.insert(term.dedup_key()) {
            self.terms.push(term);
            true
        } else {
            false
        }
    }

    /// Merge a batch, returning how many terms were new.
    pub fn extend<I: IntoIterator<Item = ExtractedTerm>>(&mut self, batch: I) -> usize {
        let mut added = 0;
        for term in batch {
            if self.insert(term) {
                added += 1;
            }
        }
        added
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn as_slice(&self) -> &[ExtractedTerm] {
        &self.terms
    }

    pub fn clear(&mut self) {
        self.terms.clear();
        self.keys.clear();
    }

    pub fn into_vec(self) -> Vec<ExtractedTerm> {
        self.terms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contralyst_test_utils::fixtures;
    use rand::{rngs::StdRng, SeedableRng};

    fn rng() -> StdRng {
        StdRng::seed_from_u64(1)
    }

    #[test]
    fn test_empty_inputs_yield_nothing() {
        assert!(highlight_with_rng("", "advances", &mut rng()).is_empty());
        assert!(highlight_with_rng(fixtures::STREAMING_LICENSE, "", &mut rng()).is_empty());
        assert!(highlight_with_rng(fixtures::STREAMING_LICENSE, "royalties", &mut rng()).is_empty());
    }

    #[test]
    fn test_offsets_point_at_matched_text() {
        let text = fixtures::STREAMING_LICENSE;
        let terms = highlight_with_rng(text, "minimum-guaranteed", &mut rng());
        assert!(!terms.is_empty());
        for t in &terms {
            assert_eq!(&text[t.start..t.end], t.text);
            assert_eq!(t.category, Category::MinimumGuaranteed);
        }
        assert!(terms.iter().any(|t| t.text.contains("$12,500")));
    }

    #[test]
    fn test_confidence_band() {
        for t in highlight_all_with_rng(fixtures::STREAMING_LICENSE, &mut rng()) {
            assert!(t.confidence >= 0.85 && t.confidence < 0.95);
        }
    }

    #[test]
    fn test_no_duplicates_within_one_call() {
        // Both reporting patterns can hit the same span
        let text = "Quarterly reports within 30 days. Quarterly reports within 30 days.";
        let terms = highlight_with_rng(text, "reporting", &mut rng());
        let keys: HashSet<_> = terms.iter().map(|t| t.dedup_key()).collect();
        assert_eq!(keys.len(), terms.len());
    }

    #[test]
    fn test_repeated_runs_merge_without_duplicates() {
        let text = fixtures::STREAMING_LICENSE;
        let mut set = TermSet::new();
        let first = set.extend(highlight_with_rng(text, "reporting", &mut rng()));
        let second = set.extend(highlight_with_rng(text, "reporting", &mut rng()));
        assert!(first > 0);
        assert_eq!(second, 0);
        let keys: HashSet<_> = set.as_slice().iter().map(|t| t.dedup_key()).collect();
        assert_eq!(keys.len(), set.len());
    }

    #[test]
    fn test_categories_overlap_independently() {
        let text = "Licensee pays 30% of advertising revenue and 30% of subscription revenue.";
        let all = highlight_all_with_rng(text, &mut rng());
        assert!(all.iter().any(|t| t.category == Category::RevShareAd));
        assert!(all.iter().any(|t| t.category == Category::RevShareSubscription));
    }

    #[test]
    fn test_territory_and_duration() {
        let text = fixtures::STREAMING_LICENSE;
        let territory = highlight_with_rng(text, "territory", &mut rng());
        assert!(territory.iter().any(|t| t.text.eq_ignore_ascii_case("worldwide")));
        let duration = highlight_with_rng(text, "term-duration", &mut rng());
        assert!(duration.iter().any(|t| t.text.contains("years")));
    }
}
