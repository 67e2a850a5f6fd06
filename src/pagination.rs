pub const PAGE_SIZE: usize = 10;

/// One page worth of work for the recipe API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: usize,
}

impl PageRequest {
    pub fn new(page: u32) -> Self {
        PageRequest {
            page: page.max(1),
            page_size: PAGE_SIZE,
        }
    }

    pub fn offset(&self) -> usize {
        (self.page as usize - 1) * self.page_size
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub page: u32,
    pub page_size: usize,
    pub has_more: bool,
}

impl Default for Cursor {
    fn default() -> Self {
        Cursor {
            page: 1,
            page_size: PAGE_SIZE,
            has_more: true,
        }
    }
}

impl Cursor {
    /// Moves to the next page before its fetch has completed.
    pub fn advance(&mut self) -> u32 {
        self.page += 1;
        self.page
    }

    /// A short page means the upstream list is exhausted. Once cleared the flag stays cleared.
    pub fn record_page(&mut self, received: usize) {
        if received < self.page_size {
            self.has_more = false;
        }
    }
}
