//! Timestamp-gated merge of canonical quote batches.
//!
//! The merge is a pure fold: it never mutates the previous namespace and it
//! never suspends, so a caller holding the store's write guard applies a
//! whole batch atomically with respect to readers.
//!
//! Per-record rule, against the record's key in the namespace:
//! - no prior record        -> accept, change fields zeroed
//! - newer timestamp        -> accept, change fields = delta vs prior
//! - equal timestamp        -> keep prior values, change fields reset to zero
//! - older timestamp        -> discard
//!
//! Records fold in input order against the partially updated map, so a later
//! record in the same batch supersedes an earlier one under the same rules.

use std::collections::HashMap;

use super::record::MergeRecord;

/// What happened to one record during the fold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// First observation for the key.
    Seeded,
    /// Newer timestamp accepted, changes recomputed against the prior record.
    Accepted,
    /// Equal timestamp: prior values kept, change fields reset to zero.
    Squelched,
    /// Older timestamp: record discarded.
    Stale,
}

/// Fold one record into `namespace`.
pub fn apply_record<R: MergeRecord>(
    namespace: &mut HashMap<String, R>,
    mut record: R,
) -> MergeOutcome {
    let key = record.key().to_owned();
    match namespace.get(&key) {
        None => {
            record.set_changes(0.0, 0.0);
            namespace.insert(key, record);
            MergeOutcome::Seeded
        }
        Some(prev) => {
            if record.timestamp() > prev.timestamp() {
                let price_change = delta(record.price(), prev.price());
                let yield_change = delta(record.yield_pct(), prev.yield_pct());
                record.set_changes(price_change, yield_change);
                namespace.insert(key, record);
                MergeOutcome::Accepted
            } else if record.timestamp() == prev.timestamp() {
                // Redelivery of the already-stored observation. Values stay,
                // but a change computed on an earlier cycle must not outlive
                // the tick that produced it.
                let mut kept = prev.clone();
                kept.set_changes(0.0, 0.0);
                namespace.insert(key, kept);
                MergeOutcome::Squelched
            } else {
                MergeOutcome::Stale
            }
        }
    }
}

/// Merge a batch into `current`, returning the next namespace.
pub fn merge_batch<R: MergeRecord>(
    current: &HashMap<String, R>,
    incoming: Vec<R>,
) -> HashMap<String, R> {
    let mut next = current.clone();
    for record in incoming {
        apply_record(&mut next, record);
    }
    next
}

/// Futures variant: the same fold one level down, keyed
/// `(contract family, ticker)`.
pub fn merge_family_batch<R: MergeRecord>(
    current: &HashMap<String, HashMap<String, R>>,
    data_name: &str,
    incoming: Vec<R>,
) -> HashMap<String, HashMap<String, R>> {
    let mut next = current.clone();
    let family = next.entry(data_name.to_owned()).or_default();
    for record in incoming {
        apply_record(family, record);
    }
    next
}

/// Component-wise change. A side with no observable value contributes no
/// delta; the stored change stays at zero rather than going NaN.
fn delta(new: Option<f64>, prev: Option<f64>) -> f64 {
    match (new, prev) {
        (Some(n), Some(p)) => n - p,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quotes::record::{FuturesQuote, OtrQuote};
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    fn otr(name: &str, ts_secs: i64, price: Option<f64>, yield_pct: Option<f64>) -> OtrQuote {
        OtrQuote {
            standard_name: name.to_string(),
            price,
            price_change: 0.0,
            yield_pct,
            yield_change: 0.0,
            timestamp: Utc.timestamp_opt(ts_secs, 0).unwrap(),
            display_price: None,
        }
    }

    fn fut(ticker: &str, ts_secs: i64, price: Option<f64>) -> FuturesQuote {
        FuturesQuote {
            ticker: ticker.to_string(),
            month: "SEP 2026".to_string(),
            product_name: "10-Year T-Note Futures".to_string(),
            last: price,
            price,
            prior_settle: None,
            price_change: 0.0,
            volume: None,
            expiration_date: None,
            timestamp: Utc.timestamp_opt(ts_secs, 0).unwrap(),
        }
    }

    #[test]
    fn first_observation_seeds_with_zero_changes() {
        let current = HashMap::new();
        let next = merge_batch(&current, vec![otr("US 10Y", 100, Some(99.5), Some(4.27))]);

        let stored = &next["US 10Y"];
        assert_eq!(stored.price, Some(99.5));
        assert_eq!(stored.price_change, 0.0);
        assert_eq!(stored.yield_change, 0.0);
    }

    #[test]
    fn newer_record_carries_component_wise_deltas() {
        let current = merge_batch(
            &HashMap::new(),
            vec![otr("US 10Y", 100, Some(100.0), Some(4.30))],
        );
        let next = merge_batch(&current, vec![otr("US 10Y", 101, Some(103.0), Some(4.25))]);

        let stored = &next["US 10Y"];
        assert_eq!(stored.price, Some(103.0));
        assert_eq!(stored.price_change, 3.0);
        assert!((stored.yield_change - (-0.05)).abs() < 1e-12);
    }

    #[test]
    fn equal_timestamp_redelivery_resets_changes_only() {
        let current = merge_batch(
            &HashMap::new(),
            vec![
                otr("US 10Y", 100, Some(100.0), None),
                otr("US 10Y", 101, Some(103.0), None),
            ],
        );
        assert_eq!(current["US 10Y"].price_change, 3.0);

        let next = merge_batch(&current, vec![otr("US 10Y", 101, Some(100.0), None)]);
        let stored = &next["US 10Y"];

        // Values from the stored record survive; only the changes reset.
        assert_eq!(stored.price, Some(103.0));
        assert_eq!(stored.price_change, 0.0);
        assert_eq!(stored.timestamp, Utc.timestamp_opt(101, 0).unwrap());
    }

    #[test]
    fn stale_record_never_changes_state() {
        let current = merge_batch(
            &HashMap::new(),
            vec![otr("US 10Y", 200, Some(99.5), Some(4.27))],
        );
        let next = merge_batch(&current, vec![otr("US 10Y", 150, Some(50.0), Some(9.99))]);

        let stored = &next["US 10Y"];
        assert_eq!(stored.price, Some(99.5));
        assert_eq!(stored.yield_pct, Some(4.27));
        assert_eq!(stored.timestamp, Utc.timestamp_opt(200, 0).unwrap());
    }

    #[test]
    fn later_batch_entry_supersedes_earlier_one() {
        let next = merge_batch(
            &HashMap::new(),
            vec![
                otr("US 10Y", 100, Some(100.0), None),
                otr("US 10Y", 105, Some(101.5), None),
            ],
        );

        let stored = &next["US 10Y"];
        assert_eq!(stored.price, Some(101.5));
        assert_eq!(stored.price_change, 1.5);
    }

    #[test]
    fn absent_price_on_either_side_yields_zero_change() {
        // Seed with a sentinel (absent) price, then a real one, then absent again.
        let s1 = merge_batch(&HashMap::new(), vec![otr("US 10Y", 100, None, Some(4.30))]);
        let s2 = merge_batch(&s1, vec![otr("US 10Y", 101, Some(99.5), Some(4.28))]);
        let s3 = merge_batch(&s2, vec![otr("US 10Y", 102, None, Some(4.26))]);

        assert_eq!(s2["US 10Y"].price_change, 0.0);
        assert!(!s2["US 10Y"].price_change.is_nan());
        assert_eq!(s3["US 10Y"].price, None);
        assert_eq!(s3["US 10Y"].price_change, 0.0);
        assert!((s3["US 10Y"].yield_change - (-0.02)).abs() < 1e-12);
    }

    #[test]
    fn remerging_the_same_batch_is_value_idempotent() {
        let batch = vec![
            otr("US 2Y", 100, Some(99.9), Some(4.80)),
            otr("US 10Y", 100, Some(99.5), Some(4.27)),
        ];
        let first = merge_batch(&HashMap::new(), batch.clone());
        let second = merge_batch(&first, batch);

        for key in ["US 2Y", "US 10Y"] {
            assert_eq!(second[key].price, first[key].price);
            assert_eq!(second[key].yield_pct, first[key].yield_pct);
            assert_eq!(second[key].timestamp, first[key].timestamp);
            assert_eq!(second[key].price_change, 0.0);
            assert_eq!(second[key].yield_change, 0.0);
        }
    }

    #[test]
    fn merge_does_not_touch_the_previous_namespace() {
        let current = merge_batch(&HashMap::new(), vec![otr("US 10Y", 100, Some(100.0), None)]);
        let _next = merge_batch(&current, vec![otr("US 10Y", 101, Some(103.0), None)]);

        // The input namespace is still the pre-merge view.
        assert_eq!(current["US 10Y"].price, Some(100.0));
        assert_eq!(current["US 10Y"].timestamp, Utc.timestamp_opt(100, 0).unwrap());
    }

    #[test]
    fn family_merge_isolates_contract_families() {
        let current = merge_family_batch(&HashMap::new(), "tens", vec![fut("ZNU6", 100, Some(110.5))]);
        let next = merge_family_batch(&current, "bonds", vec![fut("ZBU6", 100, Some(120.0))]);

        assert_eq!(next["tens"]["ZNU6"].price, Some(110.5));
        assert_eq!(next["bonds"]["ZBU6"].price, Some(120.0));
        assert!(!next["tens"].contains_key("ZBU6"));
    }

    #[test]
    fn family_merge_applies_the_same_timestamp_gate() {
        let s1 = merge_family_batch(&HashMap::new(), "tens", vec![fut("ZNU6", 100, Some(110.0))]);
        let s2 = merge_family_batch(&s1, "tens", vec![fut("ZNU6", 105, Some(110.25))]);
        let s3 = merge_family_batch(&s2, "tens", vec![fut("ZNU6", 90, Some(1.0))]);

        assert_eq!(s2["tens"]["ZNU6"].price_change, 0.25);
        assert_eq!(s3["tens"]["ZNU6"].price, Some(110.25));
    }

    proptest! {
        /// Whatever the arrival order, the stored timestamp per key never
        /// goes backwards.
        #[test]
        fn stored_timestamp_is_monotonic(
            stamps in proptest::collection::vec((0i64..1_000, 0u32..100_000u32), 1..64)
        ) {
            let mut namespace = HashMap::new();
            let mut last_seen = None;

            for (ts, centi_price) in stamps {
                apply_record(
                    &mut namespace,
                    otr("US 10Y", ts, Some(centi_price as f64 / 100.0), None),
                );
                let stored = namespace["US 10Y"].timestamp;
                if let Some(prev) = last_seen {
                    prop_assert!(stored >= prev);
                }
                last_seen = Some(stored);
            }
        }
    }
}
