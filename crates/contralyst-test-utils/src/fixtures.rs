//! Sample contracts and upstream payloads.

/// A short streaming licence with one of every recognised term.
pub const STREAMING_LICENSE: &str = "MUSIC STREAMING LICENSE AGREEMENT

1. Term. This Agreement has a term of three (3) years and applies worldwide.
2. Revenue Share. Licensee shall pay Licensor 55% of net subscription revenue and 50 percent of net advertising revenue.
3. Minimum Guarantee. Licensee shall pay a minimum guarantee of $12,500 per contract year.
4. Advance. Licensee shall pay a recoupable advance of $25,000 upon signature.
5. Per-User Fees. Licensee shall pay $2.50 per subscriber for premium accounts.
6. Reporting. Licensee shall deliver monthly statements and reports within 30 days of month end.
7. Payment. Payment due within 45 days of receipt of invoice.
8. Audit. Licensor has audit rights once per year.
";

/// Contract text with no recognisable royalty terms.
pub const BARE_CONTRACT: &str = "This agreement is entered into by and between the parties named below.";

/// Build a contract whose first 100 characters are fixed and whose tail varies.
pub fn contract_with_tail(tail: &str) -> String {
    let head = "LICENSE AGREEMENT between Licensor and Licensee concerning the exploitation of sound recordings. ";
    let mut text = head.chars().cycle().take(100).collect::<String>();
    text.push_str(tail);
    text
}

/// What a real analyzer service returns for `STREAMING_LICENSE`.
pub fn upstream_payload() -> serde_json::Value {
    serde_json::json!({
        "rev_share_subscription_revenue": 55.0,
        "rev_share_advertising_revenue": 50.0,
        "minimum_guarantee": "$12,500",
        "advance": "$25,000",
        "per_user_fee_premium": [
            { "market_name": "Worldwide", "amount": "2.50", "currency": "USD" }
        ],
        "per_user_fee_student": [],
        "report_fields": [
            { "field_name": "Statements", "field_description": "monthly statements" }
        ]
    })
}
