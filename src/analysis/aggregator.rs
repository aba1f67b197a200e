//! Usage aggregation and statistics.
//!
//! This module derives the dashboard summary from the raw analytics
//! entries. It keeps no state of its own: every call recomputes from
//! the entries it is given.

use crate::models::{AnalyticsEntry, AnalyticsSummary, Feature, FeatureUsage};

/// Sum of request counts across `entries`.
pub fn total_requests(entries: &[AnalyticsEntry]) -> i64 {
    entries.iter().map(|e| e.request_count).sum()
}

/// Sum of request counts for a single feature.
pub fn requests_for(entries: &[AnalyticsEntry], feature: &Feature) -> i64 {
    entries
        .iter()
        .filter(|e| &e.feature == feature)
        .map(|e| e.request_count)
        .sum()
}

/// Per-feature request counts, busiest first.
///
/// Features with equal counts stay in the order they first appeared.
pub fn feature_breakdown(entries: &[AnalyticsEntry]) -> Vec<FeatureUsage> {
    let total = total_requests(entries);
    let mut counts: Vec<(&Feature, i64)> = Vec::new();

    for entry in entries {
        match counts.iter().position(|(f, _)| *f == &entry.feature) {
            Some(i) => counts[i].1 += entry.request_count,
            None => counts.push((&entry.feature, entry.request_count)),
        }
    }

    // sort_by_key is stable
    counts.sort_by_key(|(_, count)| std::cmp::Reverse(*count));

    counts
        .into_iter()
        .map(|(feature, count)| FeatureUsage {
            feature: feature.to_string(),
            count,
            percentage: percentage(count, total),
        })
        .collect()
}

/// Mean response time in milliseconds, counting unmeasured entries as 0.
pub fn average_response_time(entries: &[AnalyticsEntry]) -> f64 {
    if entries.is_empty() {
        return 0.0;
    }

    let sum: i64 = entries.iter().map(|e| e.response_time.unwrap_or(0)).sum();
    sum as f64 / entries.len() as f64
}

fn percentage(count: i64, total: i64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// Compute the full summary for the dashboard.
pub fn summarize(entries: &[AnalyticsEntry], active_projects: usize) -> AnalyticsSummary {
    AnalyticsSummary {
        total_requests: total_requests(entries),
        images_analyzed: requests_for(entries, &Feature::Vision),
        content_generated: requests_for(entries, &Feature::Content),
        active_projects,
        feature_breakdown: feature_breakdown(entries),
        avg_response_time: average_response_time(entries),
    }
}
