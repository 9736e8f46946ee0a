//! Royalty term categories and the patterns that recognise them.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// A class of royalty term, as shown in the Term Extraction tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    MinimumGuaranteed,
    Advances,
    Reporting,
    RevShareAd,
    RevShareSubscription,
    PerUserFee,
    PaymentTerms,
    Territory,
    TermDuration,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::MinimumGuaranteed,
        Category::Advances,
        Category::Reporting,
        Category::RevShareAd,
        Category::RevShareSubscription,
        Category::PerUserFee,
        Category::PaymentTerms,
        Category::Territory,
        Category::TermDuration,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Category::MinimumGuaranteed => "minimum-guaranteed",
            Category::Advances => "advances",
            Category::Reporting => "reporting",
            Category::RevShareAd => "rev-share-ad",
            Category::RevShareSubscription => "rev-share-subscription",
            Category::PerUserFee => "per-user-fee",
            Category::PaymentTerms => "payment-terms",
            Category::Territory => "territory",
            Category::TermDuration => "term-duration",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::MinimumGuaranteed => "Minimum Guaranteed",
            Category::Advances => "Advances",
            Category::Reporting => "Reporting",
            Category::RevShareAd => "Revenue Share (Advertising)",
            Category::RevShareSubscription => "Revenue Share (Subscription)",
            Category::PerUserFee => "Per-User Fees",
            Category::PaymentTerms => "Payment Terms",
            Category::Territory => "Territory",
            Category::TermDuration => "Term Duration",
        }
    }

    /// Look up a category by its identifier. Unknown or empty ids yield `None`.
    pub fn from_id(id: &str) -> Option<Category> {
        let id = id.trim();
        Category::ALL.iter().copied().find(|c| c.id() == id)
    }

    pub fn patterns(&self) -> &'static [Regex] {
        category_patterns()
            .get(self)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

const AMOUNT: &str = r"(?:\$[\d,]+(?:\.\d+)?|[\d,]+ dollars)";
const PERCENT: &str = r"\d+(?:\.\d+)?\s*(?:%|percent)";

fn pattern_sources(category: Category) -> Vec<String> {
    match category {
        Category::MinimumGuaranteed => vec![
            format!(r"(?i)minimum guarantee[d]?[^.\n]*?{AMOUNT}"),
            format!(r"(?i)guaranteed minimum[^.\n]*?{AMOUNT}"),
            r"\bMG\b".to_string(),
        ],
        Category::Advances => vec![
            format!(r"(?i)\badvances?\b[^.\n]*?{AMOUNT}"),
            r"(?i)\b(?:non-)?recoupable\b".to_string(),
        ],
        Category::Reporting => vec![
            r"(?i)\b(?:monthly|quarterly|annual|semi-annual)\s+(?:statements?|reports?|accountings?)".to_string(),
            r"(?i)\breport(?:s|ing)?\b[^.\n]*?\bwithin\s+\d+\s+days".to_string(),
            r"(?i)\baudit rights?\b".to_string(),
        ],
        Category::RevShareAd => vec![
            format!(r"(?i){PERCENT}\s+of\s+(?:net\s+|gross\s+)?advertising revenues?"),
            format!(r"(?i)advertising revenues?[^.\n]*?{PERCENT}"),
        ],
        Category::RevShareSubscription => vec![
            format!(r"(?i){PERCENT}\s+of\s+(?:net\s+|gross\s+)?subscription revenues?"),
            format!(r"(?i)subscription revenues?[^.\n]*?{PERCENT}"),
        ],
        Category::PerUserFee => vec![
            r"(?i)\$\d+(?:\.\d{2})?\s+per\s+(?:user|subscriber|member)".to_string(),
            r"(?i)\bper[- ](?:user|subscriber) fees?\b".to_string(),
        ],
        Category::PaymentTerms => vec![
            r"(?i)payment due[^.\n]*?\d+\s+days".to_string(),
            r"(?i)\bnet\s+\d+\b".to_string(),
        ],
        Category::Territory => vec![
            r"(?i)\b(?:worldwide|the world|United States|European Union|United Kingdom|Canada|Latin America)\b".to_string(),
            r"(?i)\bthe territory\b".to_string(),
        ],
        Category::TermDuration => vec![
            r"(?i)\bterm of\s+(?:\w+\s+)?(?:\(\d+\)\s+)?(?:years?|months?)".to_string(),
            r"(?i)\b\d+\s+(?:years?|months?)\b".to_string(),
        ],
    }
}

fn category_patterns() -> &'static HashMap<Category, Vec<Regex>> {
    static PATTERNS: OnceLock<HashMap<Category, Vec<Regex>>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        Category::ALL
            .iter()
            .map(|c| {
                let compiled = pattern_sources(*c)
                    .iter()
                    .map(|src| Regex::new(src).expect("category patterns are valid regexes"))
                    .collect();
                (*c, compiled)
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrip() {
        for c in Category::ALL {
            assert_eq!(Category::from_id(c.id()), Some(c));
        }
    }

    #[test]
    fn test_unknown_and_empty_ids() {
        assert_eq!(Category::from_id(""), None);
        assert_eq!(Category::from_id("royalties"), None);
        assert_eq!(Category::from_id(" advances "), Some(Category::Advances));
    }

    #[test]
    fn test_every_category_has_patterns() {
        for c in Category::ALL {
            assert!(!c.patterns().is_empty(), "{} has no patterns", c);
        }
    }

    #[test]
    fn test_serde_uses_kebab_ids() {
        let json = serde_json::to_string(&Category::RevShareAd).unwrap();
        assert_eq!(json, "\"rev-share-ad\"");
        let back: Category = serde_json::from_str("\"minimum-guaranteed\"").unwrap();
        assert_eq!(back, Category::MinimumGuaranteed);
    }
}
