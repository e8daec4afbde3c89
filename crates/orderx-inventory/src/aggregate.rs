//! Fold fetched rows into per-key verdicts

use std::collections::HashMap;

use crate::envelope::LookupResult;
use crate::executor::{RawRow, SqlValue};
use crate::request::LookupRequest;

/// Build one [`LookupResult`] per requested key, in request order
///
/// Rows are read as `(available_amount, key)`. When the same key appears in
/// more than one row the last row wins. Keys with no row are reported as
/// unavailable with an amount of 0. Rows whose key cell is null or missing
/// are skipped.
pub fn aggregate(request: &LookupRequest, rows: &[RawRow]) -> Vec<LookupResult> {
    let mut available: HashMap<String, u64> = HashMap::with_capacity(rows.len());
    for row in rows {
        let Some(key) = row.get(1).and_then(key_of) else {
            tracing::debug!(?row, "Skipping row without a usable key");
            continue;
        };
        let amount = row.first().map(amount_of).unwrap_or(0);
        available.insert(key, amount);
    }

    request
        .pairs()
        .map(|(key, required)| {
            let available_amount = available.get(key).copied().unwrap_or(0);
            LookupResult {
                key: key.to_string(),
                available_amount,
                required_amount: required,
                satisfied: available_amount >= required,
                scope: request.scope().to_string(),
            }
        })
        .collect()
}

fn key_of(value: &SqlValue) -> Option<String> {
    match value {
        SqlValue::Text(s) => Some(s.clone()),
        SqlValue::Integer(n) => Some(n.to_string()),
        SqlValue::Null | SqlValue::Real(_) => None,
    }
}

/// Null counts as 0, reals truncate, negatives clamp to 0
fn amount_of(value: &SqlValue) -> u64 {
    match value {
        SqlValue::Integer(n) => u64::try_from(*n).unwrap_or(0),
        SqlValue::Real(x) if x.is_finite() && *x > 0.0 => x.trunc() as u64,
        SqlValue::Text(s) => s
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(|n| u64::try_from(n).ok())
            .unwrap_or(0),
        SqlValue::Real(_) | SqlValue::Null => 0,
    }
}
