// Presentation helpers: local ordering of a fetched page and pagination chrome

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::cmp::Ordering;

use crate::{filters::SortBy, models::Listing};

/// Page size of the public listing page.
pub const PUBLIC_PAGE_SIZE: u32 = 5;

// At or below this many pages every page number is shown
const PLAIN_WINDOW_LIMIT: u32 = 6;

// --- Sorting ---

/// Sorts one page of results in place. The sort is stable, so listings that
/// compare equal keep the order the backend returned them in.
pub fn sort_listings(listings: &mut [Listing], sort_by: SortBy) {
    match sort_by {
        SortBy::Newest => {
            listings.sort_by(|a, b| compare_missing_last(created_timestamp(a), created_timestamp(b), true))
        }
        SortBy::PriceAsc => listings.sort_by(|a, b| compare_missing_last(a.price, b.price, false)),
        SortBy::PriceDesc => listings.sort_by(|a, b| compare_missing_last(a.price, b.price, true)),
        SortBy::MileageAsc => listings.sort_by(|a, b| compare_missing_last(a.mileage, b.mileage, false)),
        SortBy::MileageDesc => listings.sort_by(|a, b| compare_missing_last(a.mileage, b.mileage, true)),
        SortBy::YearAsc => listings.sort_by(|a, b| compare_missing_last(year(a), year(b), false)),
        SortBy::YearDesc => listings.sort_by(|a, b| compare_missing_last(year(a), year(b), true)),
    }
}

// Listings without a value sort after every listing that has one, whatever the direction
fn compare_missing_last(a: Option<f64>, b: Option<f64>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => {
            let ordering = x.total_cmp(&y);
            if descending { ordering.reverse() } else { ordering }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn year(listing: &Listing) -> Option<f64> {
    listing.year.map(f64::from)
}

fn created_timestamp(listing: &Listing) -> Option<f64> {
    listing.created_at.as_deref().and_then(parse_timestamp).map(|ts| ts as f64)
}

/// Milliseconds since the epoch for the date formats the backend emits.
pub fn parse_timestamp(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc().timestamp_millis());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}

// --- Display ---

/// Whole amount with thousands separators ("12,500"); cents are rounded away.
pub fn group_thousands(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{}", rounded.abs() as u64);
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

// --- Pagination ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(u32),
    Ellipsis,
}

// Pages serialize as numbers, gaps as "..."
impl Serialize for PageItem {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PageItem::Page(number) => serializer.serialize_u32(*number),
            PageItem::Ellipsis => serializer.serialize_str("..."),
        }
    }
}

/// Visible page list: first page, a window around `current`, last page, with
/// ellipses for the gaps. Up to six pages are listed in full.
pub fn page_window(current: u32, total: u32) -> Vec<PageItem> {
    if total <= PLAIN_WINDOW_LIMIT {
        return (1..=total).map(PageItem::Page).collect();
    }

    let mut items = vec![PageItem::Page(1)];
    if current > 3 {
        items.push(PageItem::Ellipsis);
    }

    let start = current.saturating_sub(1).max(2);
    let end = current.saturating_add(1).min(total - 1);
    items.extend((start..=end).map(PageItem::Page));

    if current < total.saturating_sub(2) {
        items.push(PageItem::Ellipsis);
    }
    items.push(PageItem::Page(total));
    items
}

/// Page `page` (1-based) of an already-fetched list. Out-of-range pages are empty.
pub fn paginate<T>(items: &[T], page: u32, per_page: u32) -> &[T] {
    let per_page = per_page.max(1) as usize;
    let start = (page.max(1) as usize - 1).saturating_mul(per_page);
    if start >= items.len() {
        return &[];
    }
    let end = (start + per_page).min(items.len());
    &items[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Specification;
    use PageItem::{Ellipsis, Page};

    fn listing(id: &str, price: Option<f64>, mileage: Option<f64>, year: Option<i32>, created: Option<&str>) -> Listing {
        Listing {
            id: id.to_string(),
            manufacturer: None,
            model: None,
            year,
            mileage,
            price,
            tax_rate: None,
            specification: Specification::default(),
            images: vec![],
            features: vec![],
            showrooms: vec![],
            status: None,
            created_at: created.map(str::to_string),
        }
    }

    fn ids(listings: &[Listing]) -> Vec<&str> {
        listings.iter().map(|l| l.id.as_str()).collect()
    }

    fn sample() -> Vec<Listing> {
        vec![
            listing("a", Some(30000.0), Some(50000.0), Some(2018), Some("2024-03-01")),
            listing("b", Some(12000.0), Some(120000.0), Some(2012), Some("2024-05-10T08:00:00Z")),
            listing("c", Some(45000.0), Some(9000.0), Some(2022), Some("2023-12-24T10:30:00.123")),
            listing("d", Some(21000.0), None, None, None),
        ]
    }

    #[test]
    fn price_desc_reverses_price_asc_for_distinct_prices() {
        let mut asc = sample();
        sort_listings(&mut asc, SortBy::PriceAsc);
        assert_eq!(ids(&asc), vec!["b", "d", "a", "c"]);

        let mut desc = sample();
        sort_listings(&mut desc, SortBy::PriceDesc);
        let mut reversed = ids(&asc);
        reversed.reverse();
        assert_eq!(ids(&desc), reversed);
    }

    #[test]
    fn sorting_twice_gives_identical_order() {
        for sort in SortBy::ALL {
            let mut once = sample();
            sort_listings(&mut once, sort);
            let mut twice = once.clone();
            sort_listings(&mut twice, sort);
            assert_eq!(ids(&once), ids(&twice), "{sort} is not stable");
        }
    }

    #[test]
    fn missing_values_sort_last_both_ways() {
        let mut asc = sample();
        sort_listings(&mut asc, SortBy::MileageAsc);
        assert_eq!(ids(&asc), vec!["c", "a", "b", "d"]);

        let mut desc = sample();
        sort_listings(&mut desc, SortBy::YearDesc);
        assert_eq!(ids(&desc), vec!["c", "a", "b", "d"]);
    }

    #[test]
    fn newest_orders_by_date_descending() {
        let mut listings = sample();
        sort_listings(&mut listings, SortBy::Newest);
        assert_eq!(ids(&listings), vec!["b", "a", "c", "d"]);
    }

    #[test]
    fn equal_keys_keep_backend_order() {
        let mut listings = vec![
            listing("x", Some(100.0), None, None, None),
            listing("y", Some(100.0), None, None, None),
            listing("z", Some(50.0), None, None, None),
        ];
        sort_listings(&mut listings, SortBy::PriceDesc);
        assert_eq!(ids(&listings), vec!["x", "y", "z"]);
    }

    #[test]
    fn window_centered_on_current_page() {
        assert_eq!(page_window(5, 10), vec![Page(1), Ellipsis, Page(4), Page(5), Page(6), Ellipsis, Page(10)]);
    }

    #[test]
    fn small_totals_list_every_page() {
        for current in 1..=4 {
            assert_eq!(page_window(current, 4), vec![Page(1), Page(2), Page(3), Page(4)]);
        }
        assert_eq!(page_window(1, 6).len(), 6);
        assert!(page_window(1, 0).is_empty());
    }

    #[test]
    fn window_edges() {
        assert_eq!(page_window(1, 10), vec![Page(1), Page(2), Ellipsis, Page(10)]);
        assert_eq!(page_window(3, 10), vec![Page(1), Page(2), Page(3), Page(4), Ellipsis, Page(10)]);
        assert_eq!(page_window(8, 10), vec![Page(1), Ellipsis, Page(7), Page(8), Page(9), Page(10)]);
        assert_eq!(page_window(10, 10), vec![Page(1), Ellipsis, Page(9), Page(10)]);
        assert_eq!(page_window(4, 7), vec![Page(1), Ellipsis, Page(3), Page(4), Page(5), Ellipsis, Page(7)]);
    }

    #[test]
    fn window_serializes_ellipsis_as_dots() {
        let json = serde_json::to_string(&page_window(5, 10)).unwrap();
        assert_eq!(json, r#"[1,"...",4,5,6,"...",10]"#);
    }

    #[test]
    fn paginate_slices_pages() {
        let items: Vec<u32> = (1..=12).collect();
        assert_eq!(paginate(&items, 1, 5), &[1, 2, 3, 4, 5]);
        assert_eq!(paginate(&items, 3, 5), &[11, 12]);
        assert!(paginate(&items, 4, 5).is_empty());
        assert_eq!(paginate(&items, 0, 5), &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn groups_thousands() {
        assert_eq!(group_thousands(0.0), "0");
        assert_eq!(group_thousands(999.0), "999");
        assert_eq!(group_thousands(12500.0), "12,500");
        assert_eq!(group_thousands(1234567.4), "1,234,567");
        assert_eq!(group_thousands(-4200.0), "-4,200");
    }

    #[test]
    fn parses_backend_date_formats() {
        assert!(parse_timestamp("2024-05-10T08:00:00Z").is_some());
        assert!(parse_timestamp("2024-05-10T08:00:00").is_some());
        assert!(parse_timestamp("2024-05-10").is_some());
        assert_eq!(parse_timestamp("yesterday"), None);
    }
}
