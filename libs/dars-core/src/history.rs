//! Reporting queries over review history.
//!
//! These sit beside the scheduler and never influence scheduling.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::{ItemId, Quality, ReviewRecord};

const EASY: Quality = 5;
const GOOD: Quality = 4;
/// Good-or-better ratings after which an item counts as learned.
const GOOD_RATINGS_TO_LEARN: usize = 3;

/// Whether an item still needs practice, given its review records.
///
/// Only ratings since the most recent lapse count. The item is learned once
/// its latest rating is Easy, or once it has been rated Good or better three
/// times. An item without history needs practice.
pub fn needs_practice(records: &[ReviewRecord]) -> bool {
    let mut ordered: Vec<&ReviewRecord> = records.iter().collect();
    ordered.sort_by_key(|record| record.reviewed_at);

    let since_lapse = match ordered.iter().rposition(|record| !record.passed) {
        Some(lapse) => &ordered[lapse + 1..],
        None => &ordered[..],
    };

    let Some(latest) = since_lapse.last() else {
        return true;
    };
    if latest.quality >= EASY {
        return false;
    }
    let good = since_lapse.iter().filter(|record| record.quality >= GOOD).count();
    good < GOOD_RATINGS_TO_LEARN
}

/// Per-item review counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemSummary {
    pub reviews: usize,
    pub passes: usize,
    pub lapses: usize,
    pub last_quality: Option<Quality>,
    pub needs_practice: bool,
}

/// Summarize a mixed list of review records by item.
pub fn summarize(records: &[ReviewRecord]) -> BTreeMap<ItemId, ItemSummary> {
    let mut by_item: BTreeMap<ItemId, Vec<ReviewRecord>> = BTreeMap::new();
    for record in records {
        by_item
            .entry(record.item_id.clone())
            .or_default()
            .push(record.clone());
    }

    by_item
        .into_iter()
        .map(|(item_id, mut records)| {
            records.sort_by_key(|record| record.reviewed_at);
            let passes = records.iter().filter(|record| record.passed).count();
            let summary = ItemSummary {
                reviews: records.len(),
                passes,
                lapses: records.len() - passes,
                last_quality: records.last().map(|record| record.quality),
                needs_practice: needs_practice(&records),
            };
            (item_id, summary)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};
    use pretty_assertions::assert_eq;

    fn records(id: &str, qualities: &[Quality]) -> Vec<ReviewRecord> {
        let start = DateTime::parse_from_rfc3339("2024-02-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        qualities
            .iter()
            .enumerate()
            .map(|(i, &quality)| ReviewRecord {
                item_id: ItemId::new(id).unwrap(),
                quality,
                reviewed_at: start + Duration::days(i as i64),
                passed: quality >= 3,
                interval_before: 1,
                interval_after: 1,
                ease_before: 2.5,
                ease_after: 2.5,
            })
            .collect()
    }

    #[test]
    fn no_history_needs_practice() {
        assert!(needs_practice(&[]));
    }

    #[test]
    fn easy_rating_means_learned() {
        assert!(!needs_practice(&records("a", &[1, 5])));
    }

    #[test]
    fn three_good_ratings_mean_learned() {
        assert!(needs_practice(&records("a", &[4, 4])));
        assert!(needs_practice(&records("a", &[4, 3, 4])));
        assert!(!needs_practice(&records("a", &[4, 3, 4, 4])));
    }

    #[test]
    fn lapse_restarts_the_count() {
        assert!(needs_practice(&records("a", &[4, 4, 4, 1])));
        assert!(needs_practice(&records("a", &[5, 5, 2, 4])));
    }

    #[test]
    fn order_of_input_does_not_matter() {
        let mut shuffled = records("a", &[1, 4, 4, 4]);
        shuffled.reverse();
        assert!(!needs_practice(&shuffled));
    }

    #[test]
    fn summarize_groups_by_item() {
        let mut all = records("a", &[1, 4, 5]);
        all.extend(records("b", &[3]));

        let summary = summarize(&all);
        assert_eq!(
            summary[&ItemId::new("a").unwrap()],
            ItemSummary {
                reviews: 3,
                passes: 2,
                lapses: 1,
                last_quality: Some(5),
                needs_practice: false,
            }
        );
        assert_eq!(summary[&ItemId::new("b").unwrap()].needs_practice, true);
    }
}
