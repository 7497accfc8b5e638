//! Client-side pagination of a venue's reviews.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reviews shown per page.
pub const REVIEW_PAGE_SIZE: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub author: String,
    pub rating: f32,
    pub text: String,
    pub created_at: Option<DateTime<Utc>>,
    pub url: Option<String>,
}

/// One rendered page plus the state of the navigation controls.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewPage<'a> {
    /// 1-based page number.
    pub page: usize,
    pub last_page: usize,
    pub reviews: &'a [Review],
    pub previous_disabled: bool,
    pub next_disabled: bool,
}

/// Ordered review list with a 1-based cursor.
///
/// An empty list still has one (empty) page so both controls are disabled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewPager {
    reviews: Vec<Review>,
    page: usize,
}

impl ReviewPager {
    #[must_use]
    pub fn new(reviews: Vec<Review>) -> Self {
        Self { reviews, page: 1 }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.reviews.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }

    #[must_use]
    pub fn reviews(&self) -> &[Review] {
        &self.reviews
    }

    #[must_use]
    pub fn page(&self) -> usize {
        self.page.max(1)
    }

    /// `ceil(len / REVIEW_PAGE_SIZE)`, never less than 1.
    #[must_use]
    pub fn last_page(&self) -> usize {
        self.reviews.len().div_ceil(REVIEW_PAGE_SIZE).max(1)
    }

    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.page() > 1
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.page() < self.last_page()
    }

    /// Advances one page; no-op on the last page.
    pub fn next(&mut self) {
        if self.has_next() {
            self.page = self.page() + 1;
        }
    }

    /// Goes back one page; no-op on the first page.
    pub fn previous(&mut self) {
        if self.has_previous() {
            self.page = self.page() - 1;
        }
    }

    /// Jumps to `page`, clamped to `1..=last_page`.
    pub fn go_to(&mut self, page: usize) {
        self.page = page.clamp(1, self.last_page());
    }

    #[must_use]
    pub fn current(&self) -> ReviewPage<'_> {
        let page = self.page();
        let start = (page - 1) * REVIEW_PAGE_SIZE;
        let end = (start + REVIEW_PAGE_SIZE).min(self.reviews.len());
        let reviews = self.reviews.get(start..end).unwrap_or_default();
        ReviewPage {
            page,
            last_page: self.last_page(),
            reviews,
            previous_disabled: !self.has_previous(),
            next_disabled: !self.has_next(),
        }
    }
}
