//! Top-N revenue rankings
//!
//! Groups line revenue by country or product and keeps the highest-revenue
//! groups. Rows without a value for the grouping key are skipped, so a
//! file without the optional columns yields an empty ranking rather than
//! an error.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::types::{RankKey, RankingEntry, Record};

/// Top `n` groups by summed revenue, ties broken by first appearance
pub fn top_by_revenue(records: &[Record], key: RankKey, n: usize) -> Vec<RankingEntry> {
    let mut totals: HashMap<&str, (usize, f64)> = HashMap::new();
    for record in records {
        let value = match key {
            RankKey::Country => record.country.as_deref(),
            RankKey::Product => record.description.as_deref(),
        };
        if let Some(name) = value {
            let next_index = totals.len();
            let entry = totals.entry(name).or_insert((next_index, 0.0));
            entry.1 += record.revenue();
        }
    }

    let mut ranked: Vec<(&str, usize, f64)> = totals
        .into_iter()
        .map(|(name, (first_seen, revenue))| (name, first_seen, revenue))
        .collect();
    ranked.sort_by(|a, b| {
        b.2.partial_cmp(&a.2)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.1.cmp(&b.1))
    });
    ranked.truncate(n);

    ranked
        .into_iter()
        .enumerate()
        .map(|(i, (name, _, revenue))| RankingEntry {
            name: name.to_string(),
            revenue,
            rank: i + 1,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(country: Option<&str>, description: Option<&str>, revenue: f64) -> Record {
        Record {
            date: NaiveDate::from_ymd_opt(2011, 3, 7)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            quantity: 1,
            unit_price: revenue,
            country: country.map(String::from),
            description: description.map(String::from),
            customer_id: None,
        }
    }

    #[test]
    fn test_groups_and_orders_by_revenue() {
        let records = vec![
            record(Some("United Kingdom"), None, 50.0),
            record(Some("France"), None, 80.0),
            record(Some("United Kingdom"), None, 40.0),
            record(Some("Germany"), None, 30.0),
        ];
        let ranked = top_by_revenue(&records, RankKey::Country, 10);

        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].name, "United Kingdom");
        assert!((ranked[0].revenue - 90.0).abs() < 1e-9);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[1].name, "France");
        assert_eq!(ranked[2].name, "Germany");
        assert_eq!(ranked[2].rank, 3);
    }

    #[test]
    fn test_truncates_to_n() {
        let records: Vec<Record> = (0..15)
            .map(|i| record(Some(&format!("Country{i:02}")), None, i as f64))
            .collect();
        let ranked = top_by_revenue(&records, RankKey::Country, 10);

        assert_eq!(ranked.len(), 10);
        assert_eq!(ranked[0].name, "Country14");
        assert!(ranked.windows(2).all(|w| w[0].revenue >= w[1].revenue));
        for (i, entry) in ranked.iter().enumerate() {
            assert_eq!(entry.rank, i + 1);
        }
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let records = vec![
            record(Some("Norway"), None, 25.0),
            record(Some("Austria"), None, 25.0),
        ];
        let ranked = top_by_revenue(&records, RankKey::Country, 10);

        assert_eq!(ranked[0].name, "Norway");
        assert_eq!(ranked[1].name, "Austria");
    }

    #[test]
    fn test_tie_order_survives_interleaved_rows() {
        let records = vec![
            record(Some("Norway"), None, 10.0),
            record(Some("Austria"), None, 25.0),
            record(Some("Norway"), None, 15.0),
        ];
        let ranked = top_by_revenue(&records, RankKey::Country, 10);

        assert_eq!(ranked[0].name, "Norway");
        assert_eq!(ranked[1].name, "Austria");
    }

    #[test]
    fn test_skips_rows_without_key() {
        let records = vec![
            record(None, Some("WHITE HANGING HEART"), 12.0),
            record(Some("France"), None, 8.0),
        ];

        let by_country = top_by_revenue(&records, RankKey::Country, 10);
        assert_eq!(by_country.len(), 1);
        assert_eq!(by_country[0].name, "France");

        let by_product = top_by_revenue(&records, RankKey::Product, 10);
        assert_eq!(by_product.len(), 1);
        assert_eq!(by_product[0].name, "WHITE HANGING HEART");
    }

    #[test]
    fn test_empty_when_column_absent() {
        let records = vec![record(None, None, 5.0)];
        assert!(top_by_revenue(&records, RankKey::Country, 10).is_empty());
    }
}
