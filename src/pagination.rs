//! Fixed-size pages over an ordered listing.

use sea_orm::{ConnectionTrait, EntityTrait, FromQueryResult, PaginatorTrait, Select};

use crate::error::Result;

pub const PAGE_SIZE: u64 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based.
    pub number: u64,
    pub num_pages: u64,
    pub count: u64,
}

impl<T> Page<T> {
    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            count: self.count,
        }
    }
}

/// Number of pages for `count` items; an empty listing still has one page.
pub fn page_count(count: u64, page_size: u64) -> u64 {
    count.div_ceil(page_size).max(1)
}

/// Turns the raw `page` query value into a valid 1-based page number.
/// Missing or non-numeric values give the first page, `last` and anything
/// past the end give the last page.
pub fn resolve_page(requested: Option<&str>, num_pages: u64) -> u64 {
    let num_pages = num_pages.max(1);
    match requested.map(str::trim) {
        Some("last") => num_pages,
        Some(raw) => match raw.parse::<i64>() {
            Ok(n) if n < 1 => 1,
            Ok(n) => u64::try_from(n).map_or(num_pages, |n| n.min(num_pages)),
            // too large for i64, so past the end
            Err(_) if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) => num_pages,
            Err(_) => 1,
        },
        None => 1,
    }
}

pub async fn fetch_page<C, E>(
    db: &C,
    select: Select<E>,
    requested: Option<&str>,
) -> Result<Page<E::Model>>
where
    C: ConnectionTrait,
    E: EntityTrait,
    E::Model: FromQueryResult + Sized + Send + Sync + 'static,
{
    let paginator = select.paginate(db, PAGE_SIZE);
    let count = paginator.num_items().await?;
    let num_pages = page_count(count, PAGE_SIZE);
    let number = resolve_page(requested, num_pages);
    let items = paginator.fetch_page(number - 1).await?;
    Ok(Page {
        items,
        number,
        num_pages,
        count,
    })
}
