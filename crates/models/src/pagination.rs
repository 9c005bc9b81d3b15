use serde::{Deserialize, Serialize};

/// 1-based page request used by the portal's list screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: usize,
    pub per_page: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

/// Slice one page out of an in-memory list.
///
/// A page past the end is clamped to the last page, and an empty list yields
/// page 1 with no items. `per_page` of 0 is treated as 1.
pub fn paginate<T: Clone>(items: &[T], request: PageRequest) -> Page<T> {
    let per_page = request.per_page.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page).max(1);
    let page = request.page.clamp(1, total_pages);

    let start = (page - 1) * per_page;
    let end = (start + per_page).min(total_items);

    Page {
        items: items.get(start..end).map(<[T]>::to_vec).unwrap_or_default(),
        page,
        per_page,
        total_items,
        total_pages,
    }
}

/// Keep items where any of the extracted fields contains `keyword`, ignoring case
pub fn filter_by_keyword<'a, T, F>(items: &'a [T], keyword: &str, fields: F) -> Vec<&'a T>
where
    F: Fn(&T) -> Vec<&str>,
{
    let needle = keyword.trim().to_lowercase();
    if needle.is_empty() {
        return items.iter().collect();
    }

    items
        .iter()
        .filter(|item| {
            fields(item)
                .into_iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginate_middle_and_last_page() {
        let items: Vec<u32> = (1..=23).collect();

        let second = paginate(&items, PageRequest { page: 2, per_page: 10 });
        assert_eq!(second.items, (11..=20).collect::<Vec<_>>());
        assert_eq!(second.total_pages, 3);

        let last = paginate(&items, PageRequest { page: 3, per_page: 10 });
        assert_eq!(last.items, vec![21, 22, 23]);
    }

    #[test]
    fn test_paginate_clamps_out_of_range_page() {
        let items = vec!["a", "b", "c"];
        let page = paginate(&items, PageRequest { page: 9, per_page: 2 });
        assert_eq!(page.page, 2);
        assert_eq!(page.items, vec!["c"]);

        let empty: Vec<u8> = Vec::new();
        let page = paginate(&empty, PageRequest { page: 4, per_page: 0 });
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, 1);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_filter_by_keyword_is_case_insensitive() {
        let people = vec![("Kim Minsu", "KIST"), ("Lee Jiwon", "kaist"), ("Park", "SNU")];

        let hits = filter_by_keyword(&people, "kist", |p| vec![p.0, p.1]);
        assert_eq!(hits.len(), 1);

        let hits = filter_by_keyword(&people, "  ", |p| vec![p.0, p.1]);
        assert_eq!(hits.len(), 3);
    }
}
