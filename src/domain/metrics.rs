// Derived metrics over fetched collections
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;

const AGED_INVENTORY_DAYS: i64 = 60;

/// Sum of `selector` over the collection
pub fn total<T, F>(collection: &[T], selector: F) -> f64
where
    F: Fn(&T) -> f64,
{
    collection.iter().map(selector).sum()
}

/// Percentage of the collection total contributed by `item`.
///
/// Returns 0 instead of NaN/inf when the collection total is zero.
pub fn share<T, F>(item: &T, collection: &[T], selector: F) -> f64
where
    F: Fn(&T) -> f64,
{
    let sum = total(collection, &selector);
    percentage_of(selector(item), sum)
}

/// `share` for every element, summing to the total only once
pub fn shares<T, F>(collection: &[T], selector: F) -> Vec<f64>
where
    F: Fn(&T) -> f64,
{
    let sum = total(collection, &selector);
    collection
        .iter()
        .map(|item| percentage_of(selector(item), sum))
        .collect()
}

fn percentage_of(value: f64, sum: f64) -> f64 {
    if sum == 0.0 || !sum.is_finite() {
        return 0.0;
    }
    value / sum * 100.0
}

/// The `n` highest items by `key`, ties kept in insertion order.
/// NaN keys rank below every number.
pub fn top_n<T, F>(collection: &[T], n: usize, key: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T) -> f64,
{
    let mut ranked: Vec<&T> = collection.iter().collect();
    // sort_by is stable
    ranked.sort_by(|a, b| descending(key(a), key(b)));
    ranked.into_iter().take(n).cloned().collect()
}

fn descending(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

/// Case-insensitive substring filter on one text field.
/// A blank term returns the collection unchanged.
pub fn filter_by<T, F>(collection: &[T], term: &str, field: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T) -> &str,
{
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return collection.to_vec();
    }
    collection
        .iter()
        .filter(|item| field(item).to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// `value` as a percentage of the largest value in the collection (bar widths)
pub fn relative_to_max<T, F>(value: f64, collection: &[T], selector: F) -> f64
where
    F: Fn(&T) -> f64,
{
    let max = collection
        .iter()
        .map(selector)
        .filter(|v| !v.is_nan())
        .fold(f64::NEG_INFINITY, f64::max);
    if max <= 0.0 || !max.is_finite() {
        return 0.0;
    }
    value / max * 100.0
}

pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// How quickly a model sells, by average days to sell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SellSpeed {
    Fast,
    Good,
    Slow,
    Critical,
}

impl SellSpeed {
    pub fn classify(days_to_sell: f64) -> Self {
        if days_to_sell <= 15.0 {
            SellSpeed::Fast
        } else if days_to_sell <= 30.0 {
            SellSpeed::Good
        } else if days_to_sell <= 45.0 {
            SellSpeed::Slow
        } else {
            SellSpeed::Critical
        }
    }
}

pub fn is_aged(days_on_lot: i64) -> bool {
    days_on_lot > AGED_INVENTORY_DAYS
}

/// Human label for how long ago the data was refreshed
pub fn format_last_updated(now: DateTime<Utc>, at: Option<DateTime<Utc>>) -> String {
    let Some(at) = at else {
        return "Never".to_string();
    };

    let minutes = (now - at).num_minutes();
    if minutes < 1 {
        return "Just now".to_string();
    }
    if minutes < 60 {
        return format!("{}m ago", minutes);
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}h ago", hours);
    }

    at.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dashboard::SalesByBrand;
    use chrono::{Duration, TimeZone};

    fn brand(name: &str, sales_count: i64) -> SalesByBrand {
        SalesByBrand {
            brand: name.to_string(),
            sales_count,
            percentage: 0.0,
            avg_sale_price: 25000.0,
        }
    }

    fn sales(b: &SalesByBrand) -> f64 {
        b.sales_count as f64
    }

    #[test]
    fn test_share_of_two_brands() {
        let brands = vec![brand("Toyota", 40), brand("Honda", 10)];

        assert_eq!(share(&brands[0], &brands, sales), 80.0);
        assert_eq!(share(&brands[1], &brands, sales), 20.0);
    }

    #[test]
    fn test_shares_sum_to_hundred() {
        let collections = vec![
            vec![brand("A", 1), brand("B", 2), brand("C", 3)],
            vec![brand("A", 7)],
            vec![brand("A", 13), brand("B", 17), brand("C", 19), brand("D", 23)],
            vec![brand("A", 1), brand("B", 0), brand("C", 999_999)],
        ];

        for brands in collections {
            let sum: f64 = shares(&brands, sales).iter().sum();
            assert!((sum - 100.0).abs() < 1e-9, "sum was {}", sum);
        }
    }

    #[test]
    fn test_share_zero_total() {
        let brands = vec![brand("A", 0), brand("B", 0)];

        assert_eq!(share(&brands[0], &brands, sales), 0.0);
        assert_eq!(shares(&brands, sales), vec![0.0, 0.0]);
        assert!(shares(&Vec::<SalesByBrand>::new(), sales).is_empty());
    }

    #[test]
    fn test_top_n_orders_descending_with_stable_ties() {
        let brands = vec![
            brand("A", 5),
            brand("B", 9),
            brand("C", 5),
            brand("D", 9),
            brand("E", 1),
        ];

        let top: Vec<String> = top_n(&brands, 4, sales).into_iter().map(|b| b.brand).collect();
        assert_eq!(top, vec!["B", "D", "A", "C"]);
    }

    #[test]
    fn test_top_n_is_idempotent() {
        let brands = vec![brand("A", 3), brand("B", 3), brand("C", 8), brand("D", 2)];

        let once = top_n(&brands, 3, sales);
        let twice = top_n(&once, 3, sales);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_top_n_larger_than_collection() {
        let brands = vec![brand("A", 1), brand("B", 2)];
        assert_eq!(top_n(&brands, 10, sales).len(), 2);
        assert!(top_n(&brands, 0, sales).is_empty());
    }

    #[test]
    fn test_top_n_ranks_nan_last() {
        let values = vec![f64::NAN, 2.0, 5.0];
        assert_eq!(top_n(&values, 2, |v| *v), vec![5.0, 2.0]);
    }

    #[test]
    fn test_filter_empty_term_is_identity() {
        let brands = vec![brand("Toyota", 1), brand("Honda", 2)];

        assert_eq!(filter_by(&brands, "", |b| b.brand.as_str()), brands);
        assert_eq!(filter_by(&brands, "   ", |b| b.brand.as_str()), brands);
    }

    #[test]
    fn test_filter_is_case_insensitive_substring() {
        let brands = vec![brand("Toyota", 1), brand("Honda", 2), brand("MINI", 3)];

        let hits = filter_by(&brands, "ON", |b| b.brand.as_str());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].brand, "Honda");

        let hits = filter_by(&brands, "mini", |b| b.brand.as_str());
        assert_eq!(hits[0].brand, "MINI");

        assert!(filter_by(&brands, "tesla", |b| b.brand.as_str()).is_empty());
    }

    #[test]
    fn test_relative_to_max() {
        let weeks = vec![4.0, 8.0, 2.0];
        assert_eq!(relative_to_max(4.0, &weeks, |v| *v), 50.0);
        assert_eq!(relative_to_max(0.0, &[0.0, 0.0], |v: &f64| *v), 0.0);
        assert_eq!(relative_to_max(1.0, &Vec::<f64>::new(), |v| *v), 0.0);
    }

    #[test]
    fn test_safe_ratio() {
        assert_eq!(safe_ratio(1000.0, 4.0), 250.0);
        assert_eq!(safe_ratio(1000.0, 0.0), 0.0);
    }

    #[test]
    fn test_sell_speed_boundaries() {
        assert_eq!(SellSpeed::classify(15.0), SellSpeed::Fast);
        assert_eq!(SellSpeed::classify(15.1), SellSpeed::Good);
        assert_eq!(SellSpeed::classify(30.0), SellSpeed::Good);
        assert_eq!(SellSpeed::classify(45.0), SellSpeed::Slow);
        assert_eq!(SellSpeed::classify(45.5), SellSpeed::Critical);
    }

    #[test]
    fn test_is_aged() {
        assert!(!is_aged(60));
        assert!(is_aged(61));
    }

    #[test]
    fn test_format_last_updated() {
        let now = Utc.with_ymd_and_hms(2024, 6, 3, 12, 0, 0).unwrap();

        assert_eq!(format_last_updated(now, None), "Never");
        assert_eq!(format_last_updated(now, Some(now - Duration::seconds(30))), "Just now");
        assert_eq!(format_last_updated(now, Some(now - Duration::minutes(5))), "5m ago");
        assert_eq!(format_last_updated(now, Some(now - Duration::minutes(135))), "2h ago");
        assert_eq!(format_last_updated(now, Some(now - Duration::days(3))), "2024-05-31");
    }
}
