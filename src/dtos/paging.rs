// src/dtos/paging.rs
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PagingParams {
    pub page_number: Option<u32>,
    pub page_size: Option<u32>,
    pub sort_column: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl PagingParams {
    pub fn page_number(&self) -> u32 {
        self.page_number.filter(|&p| p > 0).unwrap_or(1)
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
            .filter(|&s| s > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page_number() - 1) * i64::from(self.page_size())
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size())
    }

    pub fn sort_order(&self, default: SortOrder) -> SortOrder {
        match self.sort_order.as_deref().map(str::trim) {
            Some(o) if o.eq_ignore_ascii_case("asc") => SortOrder::Asc,
            Some(o) if o.eq_ignore_ascii_case("desc") => SortOrder::Desc,
            _ => default,
        }
    }

    /// Builds an `ORDER BY` body from a whitelist of `(api name, sql column)`.
    /// Unknown columns fall back to `default_column`, so user input never
    /// reaches the SQL text.
    pub fn order_by(&self, allowed: &[(&str, &'static str)], default_column: &'static str, default_order: SortOrder) -> String {
        let column = self
            .sort_column
            .as_deref()
            .and_then(|requested| {
                allowed
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(requested.trim()))
                    .map(|(_, sql)| *sql)
            })
            .unwrap_or(default_column);
        format!("{column} {}", self.sort_order(default_order).as_sql())
    }
}

#[derive(Debug, Serialize)]
pub struct PagedList<T> {
    pub items: Vec<T>,
    pub page_number: u32,
    pub page_size: u32,
    pub total_item_count: i64,
    pub page_count: i64,
    pub has_previous_page: bool,
    pub has_next_page: bool,
}

impl<T> PagedList<T> {
    pub fn new(items: Vec<T>, paging: &PagingParams, total_item_count: i64) -> Self {
        let page_number = paging.page_number();
        let page_size = paging.page_size();
        let page_count = if total_item_count <= 0 {
            0
        } else {
            (total_item_count + i64::from(page_size) - 1) / i64::from(page_size)
        };

        Self {
            items,
            page_number,
            page_size,
            total_item_count,
            page_count,
            has_previous_page: page_number > 1,
            has_next_page: i64::from(page_number) < page_count,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PagedList<U> {
        PagedList {
            items: self.items.into_iter().map(f).collect(),
            page_number: self.page_number,
            page_size: self.page_size,
            total_item_count: self.total_item_count,
            page_count: self.page_count,
            has_previous_page: self.has_previous_page,
            has_next_page: self.has_next_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<u32>, size: Option<u32>) -> PagingParams {
        PagingParams { page_number: page, page_size: size, ..Default::default() }
    }

    #[test]
    fn defaults_and_clamping() {
        let p = params(None, None);
        assert_eq!((p.page_number(), p.page_size(), p.offset()), (1, 10, 0));

        let p = params(Some(0), Some(0));
        assert_eq!((p.page_number(), p.page_size()), (1, 10));

        let p = params(Some(3), Some(1000));
        assert_eq!(p.page_size(), MAX_PAGE_SIZE);
        assert_eq!(p.offset(), 200);
    }

    #[test]
    fn page_metadata() {
        let list = PagedList::new(vec![1, 2, 3], &params(Some(2), Some(3)), 7);
        assert_eq!(list.page_count, 3);
        assert!(list.has_previous_page);
        assert!(list.has_next_page);

        let last = PagedList::new(vec![7], &params(Some(3), Some(3)), 7);
        assert!(!last.has_next_page);

        let empty: PagedList<i32> = PagedList::new(vec![], &params(None, None), 0);
        assert_eq!(empty.page_count, 0);
        assert!(!empty.has_next_page && !empty.has_previous_page);
    }

    #[test]
    fn map_keeps_metadata() {
        let list = PagedList::new(vec![1, 2], &params(Some(1), Some(2)), 5).map(|n| n * 10);
        assert_eq!(list.items, vec![10, 20]);
        assert_eq!(list.total_item_count, 5);
        assert_eq!(list.page_count, 3);
    }

    #[test]
    fn order_by_uses_whitelist_only() {
        let allowed = [("name", "p.name"), ("price", "p.price")];
        let mut p = PagingParams { sort_column: Some("Price".into()), sort_order: Some("asc".into()), ..Default::default() };
        assert_eq!(p.order_by(&allowed, "p.create_date", SortOrder::Desc), "p.price ASC");

        p.sort_column = Some("price; DROP TABLE products".into());
        p.sort_order = Some("sideways".into());
        assert_eq!(p.order_by(&allowed, "p.create_date", SortOrder::Desc), "p.create_date DESC");
    }
}
