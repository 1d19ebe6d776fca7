//! Offset pagination over sea-orm paginators with lenient page selection.
//!
//! A missing or malformed page number selects the first page. A number below
//! one or past the end selects the last page, and an empty listing still has
//! one (empty) page.

use sea_orm::{ConnectionTrait, DbErr, Paginator, SelectorTrait};
use serde::Serialize;

/// How many neighbours of the current page the page links show on each side.
const LINK_WINDOW: u64 = 2;

/// A page number as it arrives from the query string, before the listing
/// size is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageRequest {
    #[default]
    First,
    Number(u64),
    Last,
}

impl PageRequest {
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim) else {
            return PageRequest::First;
        };

        let Ok(number) = raw.parse::<i64>() else {
            return PageRequest::First;
        };

        if number < 1 {
            PageRequest::Last
        } else {
            PageRequest::Number(number as u64)
        }
    }

    /// Resolves to a 1-based page number in `1..=num_pages`.
    pub fn resolve(self, num_pages: u64) -> u64 {
        let num_pages = num_pages.max(1);
        match self {
            PageRequest::First => 1,
            PageRequest::Number(number) if number <= num_pages => number,
            PageRequest::Number(_) | PageRequest::Last => num_pages,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageLink {
    pub number: u64,
    pub current: bool,
    /// Pages were skipped between the previous link and this one.
    pub gap_before: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub total: u64,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous: u64,
    pub next: u64,
    pub links: Vec<PageLink>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, number: u64, num_pages: u64, total: u64) -> Self {
        let num_pages = num_pages.max(1);
        let number = number.clamp(1, num_pages);

        Page {
            items,
            number,
            num_pages,
            total,
            has_previous: number > 1,
            has_next: number < num_pages,
            previous: number.saturating_sub(1).max(1),
            next: (number + 1).min(num_pages),
            links: page_links(number, num_pages),
        }
    }

    pub fn empty() -> Self {
        Page::new(Vec::new(), 1, 1, 0)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Same page position carrying different items, e.g. hydrated cards.
    pub fn with_items<U>(self, items: Vec<U>) -> Page<U> {
        Page {
            items,
            number: self.number,
            num_pages: self.num_pages,
            total: self.total,
            has_previous: self.has_previous,
            has_next: self.has_next,
            previous: self.previous,
            next: self.next,
            links: self.links,
        }
    }
}

fn page_links(current: u64, num_pages: u64) -> Vec<PageLink> {
    let mut links = Vec::new();
    let mut last_shown = 0;

    for number in 1..=num_pages {
        let near_current = number.abs_diff(current) <= LINK_WINDOW;
        if number == 1 || number == num_pages || near_current {
            links.push(PageLink {
                number,
                current: number == current,
                gap_before: last_shown != 0 && number > last_shown + 1,
            });
            last_shown = number;
        }
    }

    links
}

/// Loads the requested page from a paginator built with the listing's page
/// size.
pub async fn load_page<'db, C, S>(
    paginator: Paginator<'db, C, S>,
    request: PageRequest,
) -> Result<Page<S::Item>, DbErr>
where
    C: ConnectionTrait,
    S: SelectorTrait + 'db,
{
    let counts = paginator.num_items_and_pages().await?;
    let number = request.resolve(counts.number_of_pages);

    let items = if counts.number_of_items == 0 {
        Vec::new()
    } else {
        paginator.fetch_page(number - 1).await?
    };

    Ok(Page::new(
        items,
        number,
        counts.number_of_pages,
        counts.number_of_items,
    ))
}
