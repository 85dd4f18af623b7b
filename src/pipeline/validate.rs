//! The promotion gate from untrusted candidate to trusted record.
//!
//! A `ValidatedRecord` is only ever built here. The single hard rule is the
//! amount check: nothing with a zero, negative, or uncoercible amount ever
//! reaches the ledger.

use std::str::FromStr;

use chrono::Utc;
use rust_decimal::Decimal;

use crate::error::PipelineError;
use crate::pipeline::types::{
    CandidateRecord, FALLBACK_CATEGORY, FALLBACK_MERCHANT, ValidatedRecord,
};

/// Validate a candidate and promote it, stamping capture time and submitter.
///
/// Category is kept as the model produced it — the instruction block pins
/// the category list and membership is not re-checked here. Merchant and
/// note get fixed fallbacks when absent.
pub fn validate(
    candidate: CandidateRecord,
    submitter: &str,
) -> Result<ValidatedRecord, PipelineError> {
    let amount = coerce_amount(candidate.amount.as_ref());
    if amount <= Decimal::ZERO {
        return Err(PipelineError::NoAmount);
    }

    let category = candidate
        .category
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_CATEGORY.to_string());
    let merchant = candidate
        .merchant
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_MERCHANT.to_string());
    let note = candidate.note.unwrap_or_default();

    Ok(ValidatedRecord {
        amount,
        category,
        merchant,
        note,
        timestamp: Utc::now(),
        submitter: submitter.to_string(),
    })
}

/// Coerce the model's amount value to a decimal; coercion failure is zero.
///
/// JSON numbers go through their exact text representation rather than an
/// f64 round-trip, so `0.1` stays `0.1`. Strings are trimmed and parsed.
fn coerce_amount(value: Option<&serde_json::Value>) -> Decimal {
    match value {
        Some(serde_json::Value::Number(n)) => {
            Decimal::from_str(&n.to_string()).unwrap_or(Decimal::ZERO)
        }
        Some(serde_json::Value::String(s)) => Decimal::from_str(s.trim()).unwrap_or(Decimal::ZERO),
        _ => Decimal::ZERO,
    }
}
