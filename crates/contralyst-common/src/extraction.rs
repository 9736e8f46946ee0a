//! Royalty term records exchanged between the relay, its upstreams and the client.
//! Upstream responses are not schema-checked; these types describe what the
//! synthesizer produces and what the workflow reads back.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Extraction result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    #[serde(serialize_with = "serialize_share")]
    pub rev_share_subscription_revenue: f64,
    #[serde(serialize_with = "serialize_share")]
    pub rev_share_advertising_revenue: f64,
    pub minimum_guarantee: String,  // e.g. "$10,000"
    pub advance: String,            // e.g. "$5,000"
    pub per_user_fee_premium: Vec<PerUserFee>,
    pub per_user_fee_student: Vec<PerUserFee>,
    pub report_fields: Vec<ReportField>,
}

/// Whole percentages go out as JSON integers (`15`, not `15.0`).
fn serialize_share<S: Serializer>(share: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    // below 2^53 every whole f64 converts to i64 exactly
    if share.fract() == 0.0 && share.abs() < 9_007_199_254_740_992.0 {
        serializer.serialize_i64(*share as i64)
    } else {
        serializer.serialize_f64(*share)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerUserFee {
    pub market_name: String,
    pub amount: String,   // decimal string, e.g. "2.50"
    pub currency: String, // ISO 4217
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportField {
    pub field_name: String,
    pub field_description: String,
}

impl ExtractionResult {
    /// Read an arbitrary upstream payload into a result.
    ///
    /// Missing or mistyped fields are left empty; numeric shares may arrive as
    /// numbers or as strings like "15" / "15%".
    pub fn from_value(value: &Value) -> Self {
        Self {
            rev_share_subscription_revenue: lenient_f64(&value["rev_share_subscription_revenue"]).unwrap_or(0.0),
            rev_share_advertising_revenue: lenient_f64(&value["rev_share_advertising_revenue"]).unwrap_or(0.0),
            minimum_guarantee: lenient_string(&value["minimum_guarantee"]),
            advance: lenient_string(&value["advance"]),
            per_user_fee_premium: fee_list(&value["per_user_fee_premium"]),
            per_user_fee_student: fee_list(&value["per_user_fee_student"]),
            report_fields: value["report_fields"]
                .as_array()
                .map(|items| {
                    items.iter().map(|f| ReportField {
                        field_name: lenient_string(&f["field_name"]),
                        field_description: lenient_string(&f["field_description"]),
                    }).collect()
                })
                .unwrap_or_default(),
        }
    }
}

fn lenient_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse().ok(),
        _ => None,
    }
}

fn lenient_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn fee_list(v: &Value) -> Vec<PerUserFee> {
    v.as_array()
        .map(|items| {
            items.iter().map(|f| PerUserFee {
                market_name: lenient_string(&f["market_name"]),
                amount: lenient_string(&f["amount"]),
                currency: lenient_string(&f["currency"]),
            }).collect()
        })
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Result provenance
// ---------------------------------------------------------------------------

/// Where a relay result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSource {
    Upstream,
    Synthesized,
}

impl ResultSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultSource::Upstream => "upstream",
            ResultSource::Synthesized => "synthesized",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "upstream" => Some(ResultSource::Upstream),
            "synthesized" => Some(ResultSource::Synthesized),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_value_reads_full_payload() {
        let v = serde_json::json!({
            "rev_share_subscription_revenue": 12.5,
            "rev_share_advertising_revenue": "30%",
            "minimum_guarantee": "$12,500",
            "advance": "$2,000",
            "per_user_fee_premium": [{"market_name": "EU", "amount": "3.00", "currency": "EUR"}],
            "per_user_fee_student": [],
            "report_fields": [{"field_name": "Streams", "field_description": "Monthly streams"}]
        });
        let r = ExtractionResult::from_value(&v);
        assert_eq!(r.rev_share_subscription_revenue, 12.5);
        assert_eq!(r.rev_share_advertising_revenue, 30.0);
        assert_eq!(r.minimum_guarantee, "$12,500");
        assert_eq!(r.per_user_fee_premium[0].currency, "EUR");
        assert!(r.per_user_fee_student.is_empty());
        assert_eq!(r.report_fields[0].field_description, "Monthly streams");
    }

    #[test]
    fn test_from_value_tolerates_garbage() {
        let r = ExtractionResult::from_value(&serde_json::json!(["not", "an", "object"]));
        assert_eq!(r.rev_share_subscription_revenue, 0.0);
        assert!(r.minimum_guarantee.is_empty());
        assert!(r.report_fields.is_empty());
    }

    #[test]
    fn test_whole_shares_serialize_as_integers() {
        let mut r = ExtractionResult::from_value(&serde_json::json!({}));
        r.rev_share_subscription_revenue = 15.0;
        r.rev_share_advertising_revenue = 12.5;

        let json = serde_json::to_string(&r).unwrap();
        assert!(json.contains(r#""rev_share_subscription_revenue":15,"#));
        assert!(json.contains(r#""rev_share_advertising_revenue":12.5,"#));

        let back: ExtractionResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn test_result_source_strings() {
        assert_eq!(ResultSource::Upstream.as_str(), "upstream");
        assert_eq!(ResultSource::parse("synthesized"), Some(ResultSource::Synthesized));
        assert_eq!(ResultSource::parse("cached"), None);
    }
}
