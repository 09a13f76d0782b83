//! Weekly aggregation and headline KPIs
//!
//! Buckets transactions into Monday-start calendar weeks and reduces each
//! bucket to revenue, volume and average order value. Weeks with no
//! transactions do not appear in the series.

use std::collections::{BTreeMap, HashSet};

use chrono::{Datelike, Duration, NaiveDate};

use crate::types::{KpiSet, LensError, Record, Result, WeeklyAggregate};

/// Monday of the week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Reduce cleaned records to one row per calendar week, in chronological
/// order.
///
/// `unique_countries` is populated when at least one record in the dataset
/// carries a country; a week where none of its rows do then counts zero.
/// Without any country data at all the field stays `None` for every week.
pub fn aggregate_weekly(records: &[Record]) -> Result<Vec<WeeklyAggregate>> {
    if records.is_empty() {
        return Err(LensError::EmptyDataset);
    }

    #[derive(Default)]
    struct WeekAccum<'a> {
        revenue: f64,
        transactions: u64,
        countries: HashSet<&'a str>,
    }

    let has_countries = records.iter().any(|r| r.country.is_some());

    let mut weeks: BTreeMap<NaiveDate, WeekAccum> = BTreeMap::new();
    for record in records {
        let accum = weeks.entry(week_start(record.date.date())).or_default();
        accum.revenue += record.revenue();
        accum.transactions += 1;
        if let Some(country) = &record.country {
            accum.countries.insert(country.as_str());
        }
    }

    Ok(weeks
        .into_iter()
        .map(|(week_start, accum)| WeeklyAggregate {
            week_start,
            revenue: accum.revenue,
            transactions: accum.transactions,
            avg_order_value: accum.revenue / accum.transactions as f64,
            unique_countries: has_countries.then(|| accum.countries.len() as u64),
        })
        .collect())
}

/// Dataset-wide headline figures
pub fn compute_kpis(records: &[Record]) -> Result<KpiSet> {
    if records.is_empty() {
        return Err(LensError::EmptyDataset);
    }

    let total_revenue: f64 = records.iter().map(Record::revenue).sum();
    let transactions = records.len() as u64;

    let customers: HashSet<&str> = records
        .iter()
        .filter_map(|r| r.customer_id.as_deref())
        .collect();
    let unique_customers = (!customers.is_empty()).then(|| customers.len() as u64);

    let mut dates = records.iter().map(|r| r.date.date());
    let first = dates.next().unwrap_or_default();
    let date_range = dates.fold((first, first), |(min, max), d| (min.min(d), max.max(d)));

    Ok(KpiSet {
        total_revenue,
        transactions,
        avg_order_value: total_revenue / transactions as f64,
        unique_customers,
        date_range,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(ymd: (i32, u32, u32), quantity: i64, price: f64, country: Option<&str>) -> Record {
        Record {
            date: NaiveDate::from_ymd_opt(ymd.0, ymd.1, ymd.2)
                .unwrap()
                .and_hms_opt(14, 0, 0)
                .unwrap(),
            quantity,
            unit_price: price,
            country: country.map(String::from),
            description: None,
            customer_id: None,
        }
    }

    #[test]
    fn test_week_start_is_monday() {
        // 2011-03-07 is a Monday
        let monday = NaiveDate::from_ymd_opt(2011, 3, 7).unwrap();
        assert_eq!(week_start(monday), monday);

        // Sunday belongs to the week of the preceding Monday
        let sunday = NaiveDate::from_ymd_opt(2011, 3, 13).unwrap();
        assert_eq!(week_start(sunday), monday);

        let wednesday = NaiveDate::from_ymd_opt(2011, 3, 9).unwrap();
        assert_eq!(week_start(wednesday), monday);
    }

    #[test]
    fn test_week_start_crosses_year_boundary() {
        // 2011-01-01 is a Saturday; its week starts 2010-12-27
        let saturday = NaiveDate::from_ymd_opt(2011, 1, 1).unwrap();
        assert_eq!(
            week_start(saturday),
            NaiveDate::from_ymd_opt(2010, 12, 27).unwrap()
        );
    }

    #[test]
    fn test_aggregate_buckets_and_sums() {
        let records = vec![
            record((2011, 3, 7), 2, 10.0, Some("France")),
            record((2011, 3, 9), 1, 5.0, Some("Germany")),
            record((2011, 3, 13), 4, 2.5, Some("France")),
            // Next week starts Monday the 14th
            record((2011, 3, 14), 10, 1.0, Some("France")),
        ];
        let weekly = aggregate_weekly(&records).unwrap();

        assert_eq!(weekly.len(), 2);

        let first = &weekly[0];
        assert_eq!(first.week_start, NaiveDate::from_ymd_opt(2011, 3, 7).unwrap());
        assert!((first.revenue - 35.0).abs() < 1e-9);
        assert_eq!(first.transactions, 3);
        assert!((first.avg_order_value - 35.0 / 3.0).abs() < 1e-9);
        assert_eq!(first.unique_countries, Some(2));

        let second = &weekly[1];
        assert_eq!(
            second.week_start,
            NaiveDate::from_ymd_opt(2011, 3, 14).unwrap()
        );
        assert!((second.revenue - 10.0).abs() < 1e-9);
        assert_eq!(second.transactions, 1);
    }

    #[test]
    fn test_aggregate_is_sparse_and_ordered() {
        // Three-week gap between the two records
        let records = vec![
            record((2011, 3, 28), 1, 1.0, None),
            record((2011, 3, 7), 1, 1.0, None),
        ];
        let weekly = aggregate_weekly(&records).unwrap();

        assert_eq!(weekly.len(), 2);
        assert!(weekly[0].week_start < weekly[1].week_start);
    }

    #[test]
    fn test_aggregate_without_countries() {
        let records = vec![record((2011, 3, 7), 1, 1.0, None)];
        let weekly = aggregate_weekly(&records).unwrap();
        assert_eq!(weekly[0].unique_countries, None);
    }

    #[test]
    fn test_aggregate_empty_dataset() {
        assert!(matches!(
            aggregate_weekly(&[]),
            Err(LensError::EmptyDataset)
        ));
    }

    #[test]
    fn test_kpis() {
        let mut records = vec![
            record((2011, 3, 7), 2, 10.0, None),
            record((2011, 3, 21), 1, 40.0, None),
        ];
        records[0].customer_id = Some("17850".to_string());
        records[1].customer_id = Some("13047".to_string());

        let kpis = compute_kpis(&records).unwrap();
        assert!((kpis.total_revenue - 60.0).abs() < 1e-9);
        assert_eq!(kpis.transactions, 2);
        assert!((kpis.avg_order_value - 30.0).abs() < 1e-9);
        assert_eq!(kpis.unique_customers, Some(2));
        assert_eq!(
            kpis.date_range,
            (
                NaiveDate::from_ymd_opt(2011, 3, 7).unwrap(),
                NaiveDate::from_ymd_opt(2011, 3, 21).unwrap()
            )
        );
    }

    #[test]
    fn test_kpis_without_customer_column() {
        let records = vec![record((2011, 3, 7), 1, 1.0, None)];
        let kpis = compute_kpis(&records).unwrap();
        assert_eq!(kpis.unique_customers, None);
    }
}
