use crate::filter::{filter_by_date, observed_range, resolve_range};
use chrono::NaiveDate;
use shared_types::{
    CallOutcome, CallOutcomeCount, CallRecord, CategoryCount, DailyPurchases, DashboardMetrics,
    DashboardSnapshot, HistogramBin, MergedRecord, OrderRecord, Table,
};
use std::collections::{BTreeMap, HashMap, HashSet};

pub const HISTOGRAM_BINS: usize = 20;

/// A call counts as picked up only above this many seconds.
pub const PICKED_UP_MIN_SECS: f64 = 1.0;

pub fn picked_up_calls(calls: &[&CallRecord]) -> usize {
    calls
        .iter()
        .filter(|c| c.total_duration_secs > PICKED_UP_MIN_SECS)
        .count()
}

pub fn purchases_after_calls(merged: &[&MergedRecord]) -> usize {
    merged.iter().filter(|r| r.has_order()).count()
}

/// `purchases / picked_up * 100` rounded to two decimals, 0.0 when nothing was picked up.
pub fn conversion_percentage(purchases: usize, picked_up: usize) -> f64 {
    if picked_up == 0 {
        return 0.0;
    }
    let ratio = purchases as f64 / picked_up as f64 * 100.0;
    (ratio * 100.0).round() / 100.0
}

pub fn compute_metrics(merged: &[&MergedRecord], calls: &[&CallRecord]) -> DashboardMetrics {
    let picked_up = picked_up_calls(calls);
    let purchases = purchases_after_calls(merged);

    DashboardMetrics {
        total_calls: merged.len(),
        picked_up_calls: picked_up,
        purchases_after_calls: purchases,
        conversion_percentage: conversion_percentage(purchases, picked_up),
    }
}

/// Orders whose contact email also appears on some call, ignoring case.
///
/// Works over the full tables; date filters do not apply.
pub fn email_matched_purchases(calls: &[CallRecord], orders: &[OrderRecord]) -> usize {
    let call_emails: HashSet<String> = calls
        .iter()
        .filter_map(|c| c.email.as_deref())
        .map(|e| e.to_lowercase())
        .collect();

    orders
        .iter()
        .filter_map(|o| o.contact_email.as_deref())
        .filter(|e| call_emails.contains(&e.to_lowercase()))
        .count()
}

/// Purchases per call date, including days with calls but no purchase.
pub fn daily_purchases(merged: &[&MergedRecord]) -> Vec<DailyPurchases> {
    let mut by_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();

    for record in merged {
        if let Some(date) = record.call_date {
            let purchases = by_day.entry(date).or_insert(0);
            if record.has_order() {
                *purchases += 1;
            }
        }
    }

    by_day
        .into_iter()
        .map(|(date, purchases)| DailyPurchases { date, purchases })
        .collect()
}

/// Occurrences of each non-missing label, most frequent first, ties by label.
pub fn value_counts<'a, I>(labels: I) -> Vec<CategoryCount>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for label in labels.into_iter().flatten() {
        *counts.entry(label).or_insert(0) += 1;
    }

    let mut out: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(label, count)| CategoryCount {
            label: label.to_string(),
            count,
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    out
}

pub fn sentiment_counts(merged: &[&MergedRecord]) -> Vec<CategoryCount> {
    value_counts(merged.iter().map(|r| r.user_sentiment.as_deref()))
}

pub fn disconnection_reason_counts(merged: &[&MergedRecord]) -> Vec<CategoryCount> {
    value_counts(merged.iter().map(|r| r.disconnection_reason.as_deref()))
}

pub fn call_outcome_counts(merged: &[&MergedRecord]) -> Vec<CallOutcomeCount> {
    value_counts(merged.iter().map(|r| r.call_successful.as_deref()))
        .into_iter()
        .map(|c| CallOutcomeCount {
            outcome: CallOutcome::classify(&c.label),
            status: c.label,
            count: c.count,
        })
        .collect()
}

/// Equal-width bins over `[min, max]` of `values`.
///
/// When every value is equal the bins have width 1 and all counts land in
/// the first one.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let width = if max > min {
        (max - min) / bins as f64
    } else {
        1.0
    };

    let mut counts = vec![0usize; bins];
    for value in values {
        let idx = ((value - min) / width).floor() as usize;
        counts[idx.min(bins - 1)] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: min + width * i as f64,
            upper: min + width * (i + 1) as f64,
            count,
        })
        .collect()
}

pub fn duration_histogram(merged: &[&MergedRecord]) -> Vec<HistogramBin> {
    let durations: Vec<f64> = merged.iter().filter_map(|r| r.duration_seconds).collect();
    histogram(&durations, HISTOGRAM_BINS)
}

/// Filters both tables by the same bounds and aggregates everything the page shows.
///
/// Missing bounds default to the min/max call dates of the merged table.
pub fn build_snapshot(
    merged: &Table<MergedRecord>,
    calls: &Table<CallRecord>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> DashboardSnapshot {
    let observed = observed_range(&merged.records);
    let range = resolve_range(start, end, observed.as_ref());

    let merged_rows = filter_by_date(&merged.records, range.as_ref());
    let call_rows = filter_by_date(&calls.records, range.as_ref());

    tracing::debug!(
        "Snapshot for {:?}: {} merged rows, {} call rows",
        range,
        merged_rows.len(),
        call_rows.len()
    );

    DashboardSnapshot {
        range,
        observed,
        metrics: compute_metrics(&merged_rows, &call_rows),
        daily_purchases: daily_purchases(&merged_rows),
        duration_histogram: duration_histogram(&merged_rows),
        sentiment: sentiment_counts(&merged_rows),
        disconnection_reasons: disconnection_reason_counts(&merged_rows),
        call_outcomes: call_outcome_counts(&merged_rows),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::DateRange;

    fn day(d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2024, 1, d)
    }

    fn merged(date: Option<NaiveDate>, order: Option<&str>) -> MergedRecord {
        MergedRecord {
            start_timestamp: String::new(),
            call_date: date,
            user_sentiment: Some("Neutral".to_string()),
            disconnection_reason: Some("user_hangup".to_string()),
            duration_seconds: Some(30.0),
            call_successful: Some("1".to_string()),
            order_number: order.map(|o| o.to_string()),
            cells: Vec::new(),
        }
    }

    fn call(date: Option<NaiveDate>, secs: f64, email: Option<&str>) -> CallRecord {
        CallRecord {
            start_timestamp: String::new(),
            call_date: date,
            total_duration_secs: secs,
            email: email.map(|e| e.to_string()),
        }
    }

    #[test]
    fn test_headline_scenario() {
        let merged_rows: Vec<MergedRecord> = (0..10)
            .map(|i| {
                let order = if i < 3 { Some("#1") } else { None };
                merged(day(1 + i % 3), order)
            })
            .collect();
        let call_rows: Vec<CallRecord> = [0.0, 1.0, 0.5, 2.0, 30.0, 45.0, 60.0, 1.5]
            .iter()
            .map(|secs| call(day(2), *secs, None))
            .collect();

        let snapshot = build_snapshot(
            &Table::new(Vec::new(), merged_rows),
            &Table::new(Vec::new(), call_rows),
            None,
            None,
        );

        assert_eq!(snapshot.metrics.total_calls, 10);
        assert_eq!(snapshot.metrics.picked_up_calls, 5);
        assert_eq!(snapshot.metrics.purchases_after_calls, 3);
        assert_eq!(snapshot.metrics.conversion_percentage, 60.0);
        assert_eq!(snapshot.range, Some(DateRange::new(day(1).unwrap(), day(3).unwrap())));
    }

    #[test]
    fn test_picked_up_excludes_one_second_and_coerced_zero() {
        let rows = vec![
            call(day(1), 0.0, None),
            call(day(1), 1.0, None),
            call(day(1), 1.01, None),
        ];
        let refs: Vec<&CallRecord> = rows.iter().collect();
        assert_eq!(picked_up_calls(&refs), 1);
    }

    #[test]
    fn test_conversion_rounding_and_zero_guard() {
        assert_eq!(conversion_percentage(1, 3), 33.33);
        assert_eq!(conversion_percentage(2, 3), 66.67);
        assert_eq!(conversion_percentage(5, 0), 0.0);
        assert_eq!(conversion_percentage(0, 0), 0.0);
    }

    #[test]
    fn test_email_match_is_case_insensitive() {
        let calls = vec![
            call(day(1), 10.0, Some("A@X.com")),
            call(day(1), 10.0, None),
        ];
        let orders = vec![
            OrderRecord {
                contact_email: Some("a@x.com".to_string()),
            },
            OrderRecord {
                contact_email: Some("other@x.com".to_string()),
            },
            OrderRecord {
                contact_email: None,
            },
        ];
        assert_eq!(email_matched_purchases(&calls, &orders), 1);
    }

    #[test]
    fn test_daily_purchases_includes_zero_days() {
        let rows = vec![
            merged(day(2), Some("#1")),
            merged(day(1), None),
            merged(day(2), Some("#2")),
        ];
        let refs: Vec<&MergedRecord> = rows.iter().collect();

        let daily = daily_purchases(&refs);
        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].date, day(1).unwrap());
        assert_eq!(daily[0].purchases, 0);
        assert_eq!(daily[1].purchases, 2);
    }

    #[test]
    fn test_value_counts_order() {
        let counts = value_counts(vec![
            Some("Negative"),
            Some("Positive"),
            None,
            Some("Positive"),
            Some("Neutral"),
        ]);

        let labels: Vec<&str> = counts.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Positive", "Negative", "Neutral"]);
        assert_eq!(counts[0].count, 2);
    }

    #[test]
    fn test_call_outcomes_are_classified() {
        let mut rows = vec![merged(day(1), None), merged(day(1), None)];
        rows[1].call_successful = Some("0".to_string());
        let refs: Vec<&MergedRecord> = rows.iter().collect();

        let outcomes = call_outcome_counts(&refs);
        assert_eq!(outcomes.len(), 2);
        let failed = outcomes.iter().find(|o| o.status == "0").unwrap();
        assert_eq!(failed.outcome, CallOutcome::Failed);
    }

    #[test]
    fn test_histogram_has_twenty_bins() {
        let values: Vec<f64> = (0..=100).map(|v| v as f64).collect();
        let bins = histogram(&values, HISTOGRAM_BINS);

        assert_eq!(bins.len(), 20);
        assert_eq!(bins[0].lower, 0.0);
        assert_eq!(bins[19].upper, 100.0);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), values.len());
        // the maximum lands in the closed last bin
        assert_eq!(bins[19].count, 6);
    }

    #[test]
    fn test_histogram_constant_and_empty() {
        let bins = histogram(&[7.0, 7.0, 7.0], HISTOGRAM_BINS);
        assert_eq!(bins.len(), 20);
        assert_eq!(bins[0].count, 3);
        assert_eq!(bins[0].lower, 7.0);
        assert_eq!(bins[0].upper, 8.0);

        assert!(histogram(&[], HISTOGRAM_BINS).is_empty());
    }

    #[test]
    fn test_snapshot_with_zero_picked_up_does_not_fail() {
        let snapshot = build_snapshot(
            &Table::new(Vec::new(), vec![merged(day(1), Some("#9"))]),
            &Table::new(Vec::new(), vec![call(day(1), 0.0, None)]),
            None,
            None,
        );
        assert_eq!(snapshot.metrics.picked_up_calls, 0);
        assert_eq!(snapshot.metrics.conversion_percentage, 0.0);
    }

    #[test]
    fn test_snapshot_filters_both_tables_with_same_bounds() {
        let snapshot = build_snapshot(
            &Table::new(
                Vec::new(),
                vec![merged(day(1), None), merged(day(5), Some("#1")), merged(None, Some("#2"))],
            ),
            &Table::new(
                Vec::new(),
                vec![call(day(1), 10.0, None), call(day(5), 10.0, None)],
            ),
            day(5),
            day(6),
        );

        assert_eq!(snapshot.metrics.total_calls, 1);
        assert_eq!(snapshot.metrics.picked_up_calls, 1);
        assert_eq!(snapshot.metrics.purchases_after_calls, 1);
        assert_eq!(snapshot.observed, Some(DateRange::new(day(1).unwrap(), day(5).unwrap())));
    }
}
