//! Fallback synthesizer: fabricates a plausible Extraction Result from raw
//! contract text when no upstream analyzer answered.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use contralyst_common::{ExtractionResult, PerUserFee, ReportField};

pub const DEFAULT_SUBSCRIPTION_SHARE: f64 = 15.0;
pub const DEFAULT_ADVERTISING_SHARE: f64 = 20.0;
pub const DEFAULT_MINIMUM_GUARANTEE: &str = "$10,000";
pub const DEFAULT_ADVANCE: &str = "$5,000";
pub const DEFAULT_PAYMENT_DUE_DAYS: &str = "30";

fn percent_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // "15%", "12.5%", "20 percent"
        Regex::new(r"(\d+(?:\.\d+)?%)|(\d+(?:\.\d+)? percent)").expect("valid percent regex")
    })
}

fn minimum_guarantee_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)minimum guarantee.*?(\$[\d,]+|[\d,]+ dollars)").expect("valid MG regex")
    })
}

fn advance_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)advance.*?(\$[\d,]+|[\d,]+ dollars)").expect("valid advance regex")
    })
}

fn payment_due_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)payment due.*?(\d+) days").expect("valid payment regex")
    })
}

/// All percentages in the text, in order of appearance, as plain numbers.
pub fn extract_percentages(text: &str) -> Vec<f64> {
    percent_regex()
        .find_iter(text)
        .filter_map(|m| {
            m.as_str()
                .trim_end_matches(" percent")
                .trim_end_matches('%')
                .parse::<f64>()
                .ok()
        })
        .collect()
}

fn first_capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}

/// Days in the first "payment due ... N days" clause, as written but without
/// leading zeros. The digits are kept as text so no count overflows.
pub fn extract_payment_due_days(text: &str) -> Option<String> {
    first_capture(payment_due_regex(), text).map(|digits| {
        match digits.trim_start_matches('0') {
            "" => "0".to_string(),
            trimmed => trimmed.to_string(),
        }
    })
}

/// Build an Extraction Result from contract text using regex heuristics,
/// filling fixed defaults wherever a pattern does not match.
pub fn synthesize(text: &str) -> ExtractionResult {
    let rates = extract_percentages(text);
    let minimum_guarantee = first_capture(minimum_guarantee_regex(), text)
        .unwrap_or_else(|| DEFAULT_MINIMUM_GUARANTEE.to_string());
    let advance = first_capture(advance_regex(), text)
        .unwrap_or_else(|| DEFAULT_ADVANCE.to_string());
    let payment_due = extract_payment_due_days(text)
        .unwrap_or_else(|| DEFAULT_PAYMENT_DUE_DAYS.to_string());

    debug!(
        n_rates = rates.len(),
        minimum_guarantee = %minimum_guarantee,
        advance = %advance,
        payment_due = %payment_due,
        "Synthesized extraction"
    );

    ExtractionResult {
        rev_share_subscription_revenue: rates.first().copied().unwrap_or(DEFAULT_SUBSCRIPTION_SHARE),
        rev_share_advertising_revenue: rates.get(1).copied().unwrap_or(DEFAULT_ADVERTISING_SHARE),
        minimum_guarantee,
        advance,
        per_user_fee_premium: vec![PerUserFee {
            market_name: "US Market".to_string(),
            amount: "2.50".to_string(),
            currency: "USD".to_string(),
        }],
        per_user_fee_student: vec![PerUserFee {
            market_name: "Education Sector".to_string(),
            amount: "1.25".to_string(),
            currency: "USD".to_string(),
        }],
        report_fields: vec![
            ReportField {
                field_name: "Total Streams".to_string(),
                field_description: "Number of content streams".to_string(),
            },
            ReportField {
                field_name: "Revenue Generated".to_string(),
                field_description: "Total revenue generated from streams".to_string(),
            },
            ReportField {
                field_name: "Payment Due".to_string(),
                field_description: format!("Payment due within {} days", payment_due),
            },
        ],
    }
}
