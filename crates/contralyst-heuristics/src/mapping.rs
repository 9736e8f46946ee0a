//! Maps relay result values back onto the contract text.
//!
//! Each value becomes one or more candidate strings that are searched for
//! literally; only the first occurrence is used and values that do not occur
//! verbatim are dropped.

use rand::Rng;
use tracing::debug;

use contralyst_common::ExtractionResult;

use crate::category::Category;
use crate::highlighter::{ExtractedTerm, TermSet};

/// Candidate spellings of a percentage share, e.g. 15.0 → "15%", "15 percent".
fn share_spellings(share: f64) -> Vec<String> {
    if !share.is_finite() || share <= 0.0 {
        return Vec::new();
    }
    vec![format!("{}%", share), format!("{} percent", share)]
}

fn candidates(result: &ExtractionResult) -> Vec<(Category, Vec<String>)> {
    let mut out = vec![
        (Category::MinimumGuaranteed, vec![result.minimum_guarantee.clone()]),
        (Category::Advances, vec![result.advance.clone()]),
        (Category::RevShareSubscription, share_spellings(result.rev_share_subscription_revenue)),
        (Category::RevShareAd, share_spellings(result.rev_share_advertising_revenue)),
    ];
    for fee in result.per_user_fee_premium.iter().chain(&result.per_user_fee_student) {
        out.push((Category::PerUserFee, vec![fee.amount.clone()]));
    }
    for field in &result.report_fields {
        out.push((Category::Reporting, vec![field.field_description.clone()]));
    }
    out
}

/// Locate the values of `result` in `text` and turn them into terms.
pub fn map_result_to_terms<R: Rng + ?Sized>(
    result: &ExtractionResult,
    text: &str,
    rng: &mut R,
) -> Vec<ExtractedTerm> {
    let mut set = TermSet::new();
    let mut dropped = 0usize;

    for (category, spellings) in candidates(result) {
        let hit = spellings
            .iter()
            .filter(|s| !s.trim().is_empty())
            .find_map(|s| text.find(s.as_str()).map(|start| (s, start)));

        match hit {
            Some((s, start)) => {
                set.insert(ExtractedTerm::new(s, category, start, rng));
            }
            None => dropped += 1,
        }
    }

    debug!(mapped = set.len(), dropped, "Mapped relay result onto contract text");
    set.into_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthesizer::synthesize;
    use contralyst_test_utils::fixtures;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_share_spellings() {
        assert_eq!(share_spellings(15.0), vec!["15%", "15 percent"]);
        assert_eq!(share_spellings(12.5), vec!["12.5%", "12.5 percent"]);
        assert!(share_spellings(0.0).is_empty());
        assert!(share_spellings(f64::NAN).is_empty());
    }

    #[test]
    fn test_maps_synthesized_fixture() {
        let text = fixtures::STREAMING_LICENSE;
        let result = synthesize(text);
        let terms = map_result_to_terms(&result, text, &mut StdRng::seed_from_u64(3));

        let find = |c: Category| terms.iter().find(|t| t.category == c);
        assert_eq!(find(Category::MinimumGuaranteed).map(|t| t.text.as_str()), Some("$12,500"));
        assert_eq!(find(Category::Advances).map(|t| t.text.as_str()), Some("$25,000"));
        assert_eq!(find(Category::RevShareSubscription).map(|t| t.text.as_str()), Some("55%"));
        assert_eq!(find(Category::RevShareAd).map(|t| t.text.as_str()), Some("50 percent"));
        for t in &terms {
            assert_eq!(&text[t.start..t.end], t.text);
        }
    }

    #[test]
    fn test_first_occurrence_only() {
        let text = "An advance of $5,000. A second advance of $5,000.";
        let mut result = synthesize("");
        result.advance = "$5,000".to_string();
        let terms = map_result_to_terms(&result, text, &mut StdRng::seed_from_u64(3));
        let advances: Vec<_> = terms.iter().filter(|t| t.category == Category::Advances).collect();
        assert_eq!(advances.len(), 1);
        assert_eq!(advances[0].start, text.find("$5,000").unwrap());
    }

    #[test]
    fn test_unmatched_values_are_dropped() {
        let text = "Nothing in here matches any value.";
        let terms = map_result_to_terms(&synthesize(""), text, &mut StdRng::seed_from_u64(3));
        assert!(terms.is_empty());
    }
}
