use serde::Serialize;

/// Fixed-size pages over a ranked list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page_size: usize,
}

/// Resolved page: 1-based `number` plus the half-open `start..end` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    pub number: usize,
    pub num_pages: usize,
    #[serde(skip)]
    pub start: usize,
    #[serde(skip)]
    pub end: usize,
}

impl PageWindow {
    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }
}

impl Paginator {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Missing or non-numeric pages resolve to the first page; pages past
    /// either end clamp to the last page. An empty list still has one page.
    pub fn window(&self, total: usize, requested: Option<&str>) -> PageWindow {
        let num_pages = total.div_ceil(self.page_size).max(1);
        let number = match requested.map(|raw| raw.trim().parse::<i64>()) {
            None | Some(Err(_)) => 1,
            Some(Ok(page)) if page >= 1 && (page as u64) <= num_pages as u64 => page as usize,
            Some(Ok(_)) => num_pages,
        };

        let start = (number - 1) * self.page_size;
        let end = (start + self.page_size).min(total);
        PageWindow {
            number,
            num_pages,
            start,
            end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_first_page() {
        let paginator = Paginator::new(20);
        let window = paginator.window(45, None);
        assert_eq!((window.number, window.start, window.end), (1, 0, 20));
        assert_eq!(paginator.window(45, Some("abc")).number, 1);
    }

    #[test]
    fn final_page_is_partial() {
        let window = Paginator::new(20).window(45, Some("3"));
        assert_eq!((window.number, window.num_pages), (3, 3));
        assert_eq!((window.start, window.end), (40, 45));
        assert!(!window.has_next());
    }

    #[test]
    fn out_of_range_pages_clamp_to_last() {
        let paginator = Paginator::new(20);
        assert_eq!(paginator.window(45, Some("9")).number, 3);
        assert_eq!(paginator.window(45, Some("0")).number, 3);
        assert_eq!(paginator.window(45, Some("-2")).number, 3);
    }

    #[test]
    fn empty_lists_have_one_empty_page() {
        let window = Paginator::new(20).window(0, Some("2"));
        assert_eq!((window.number, window.num_pages), (1, 1));
        assert_eq!((window.start, window.end), (0, 0));
    }
}
