use serde::Serialize;

/// Rows per listings page
pub const PAGE_SIZE: usize = 20;

/// One page of an already refined result set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paginated<'a, T> {
    pub items: &'a [T],
    pub page: u32,
    pub total_pages: usize,
    pub total_items: usize,
}

impl<T> Paginated<'_, T> {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        (self.page as usize) < self.total_pages
    }
}

/// Slice out `page` (1-based) of `items`.
///
/// The page is taken as given; a page past the end yields no rows rather
/// than being clamped.
pub fn paginate<T>(items: &[T], page: u32) -> Paginated<'_, T> {
    let total_items = items.len();
    let total_pages = total_items.div_ceil(PAGE_SIZE);

    let start = (page.max(1) as usize - 1).saturating_mul(PAGE_SIZE);
    let end = start.saturating_add(PAGE_SIZE).min(total_items);
    let slice: &[T] = if start < total_items {
        &items[start..end]
    } else {
        &[]
    };

    Paginated {
        items: slice,
        page,
        total_pages,
        total_items,
    }
}
