use orderx_inventory::{LookupRequest, SqlValue, aggregate};
use proptest::prelude::*;
use std::collections::HashMap;

fn key() -> impl Strategy<Value = String> {
    // A small alphabet so duplicates and misses both show up.
    prop::sample::select(vec!["A", "B", "C", "D", "E"]).prop_map(str::to_string)
}

proptest! {
    #[test]
    fn results_follow_request_order(
        pairs in prop::collection::vec((key(), 0i64..10_000), 1..12),
        rows in prop::collection::vec((key(), -50i64..10_000), 0..12),
    ) {
        let (keys, amounts): (Vec<String>, Vec<i64>) = pairs.into_iter().unzip();
        let request = LookupRequest::new(keys.clone(), amounts.clone(), "bu").unwrap();
        let raw: Vec<_> = rows
            .iter()
            .map(|(k, n)| vec![SqlValue::Integer(*n), SqlValue::Text(k.clone())])
            .collect();

        let results = aggregate(&request, &raw);

        // One result per requested key, same order, scope echoed
        prop_assert_eq!(results.len(), keys.len());
        for (result, (key, amount)) in results.iter().zip(keys.iter().zip(amounts.iter())) {
            prop_assert_eq!(&result.key, key);
            prop_assert_eq!(result.required_amount, *amount as u64);
            prop_assert_eq!(result.scope.as_str(), "bu");
            prop_assert_eq!(result.satisfied, result.available_amount >= result.required_amount);
        }

        // Last row wins; keys without rows read as zero
        let mut last: HashMap<&str, u64> = HashMap::new();
        for (k, n) in &rows {
            last.insert(k.as_str(), (*n).max(0) as u64);
        }
        for result in &results {
            let expected = last.get(result.key.as_str()).copied().unwrap_or(0);
            prop_assert_eq!(result.available_amount, expected);
        }
    }

    #[test]
    fn aggregation_is_idempotent(
        pairs in prop::collection::vec((key(), 0i64..100), 1..8),
        rows in prop::collection::vec((key(), 0i64..100), 0..8),
    ) {
        let (keys, amounts): (Vec<String>, Vec<i64>) = pairs.into_iter().unzip();
        let request = LookupRequest::new(keys, amounts, "bu").unwrap();
        let raw: Vec<_> = rows
            .into_iter()
            .map(|(k, n)| vec![SqlValue::Integer(n), SqlValue::Text(k)])
            .collect();

        prop_assert_eq!(aggregate(&request, &raw), aggregate(&request, &raw));
    }
}
