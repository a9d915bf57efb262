// SPDX-License-Identifier: MPL-2.0
//! Page image load tracking.
//!
//! Single mode keeps a small window around the current page and requests the
//! current page plus lookahead. Continuous mode declares every page, requests
//! the first eagerly, and leaves the rest to [`PageLoadTracker::page_visible`].
//!
//! Outcomes are only accepted for pages that are tracked and `Loading`;
//! anything else is stale and ignored.

use crate::domain::reader::PreloadCount;
use std::collections::BTreeMap;

/// Load state of one page image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageLoadState {
    #[default]
    Unrequested,
    Loading,
    Loaded,
    Failed,
}

impl PageLoadState {
    fn needs_request(self) -> bool {
        matches!(self, Self::Unrequested | Self::Failed)
    }
}

/// Per-page load states for one chapter.
#[derive(Debug, Clone, Default)]
pub struct PageLoadTracker {
    states: BTreeMap<u32, PageLoadState>,
    total_pages: u32,
    lookahead: PreloadCount,
}

impl PageLoadTracker {
    #[must_use]
    pub fn new(lookahead: PreloadCount) -> Self {
        Self {
            states: BTreeMap::new(),
            total_pages: 0,
            lookahead,
        }
    }

    /// Forgets every page and starts over with a new page count.
    pub fn reset(&mut self, total_pages: u32) {
        self.states.clear();
        self.total_pages = total_pages;
    }

    #[must_use]
    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// State of a page; untracked pages are `Unrequested`.
    #[must_use]
    pub fn state(&self, page: u32) -> PageLoadState {
        self.states.get(&page).copied().unwrap_or_default()
    }

    /// Every tracked page and its state, in page order.
    #[must_use]
    pub fn states(&self) -> &BTreeMap<u32, PageLoadState> {
        &self.states
    }

    #[must_use]
    pub fn is_tracked(&self, page: u32) -> bool {
        self.states.contains_key(&page)
    }

    /// Single mode: focuses on `page`.
    ///
    /// Drops pages outside `[page - lookahead, page + lookahead]`, then marks
    /// `page` and its lookahead `Loading` unless already loading or loaded.
    /// Returns the pages that need a request, current page first.
    pub fn focus(&mut self, page: u32) -> Vec<u32> {
        if page == 0 || page > self.total_pages {
            return Vec::new();
        }
        let reach = self.lookahead.value();
        let low = page.saturating_sub(reach).max(1);
        let high = page.saturating_add(reach);
        self.states.retain(|p, _| (low..=high).contains(p));

        let last = page.saturating_add(reach - 1).min(self.total_pages);
        (page..=last).filter(|&p| self.request(p)).collect()
    }

    /// Continuous mode: declares every page and requests the first.
    ///
    /// Pages already loaded or loading keep their state.
    pub fn declare_all(&mut self) -> Vec<u32> {
        for page in 1..=self.total_pages {
            self.states.entry(page).or_default();
        }
        if self.total_pages > 0 && self.request(1) {
            vec![1]
        } else {
            Vec::new()
        }
    }

    /// Continuous mode: a page scrolled into view.
    ///
    /// Returns `true` if it needs a request.
    pub fn page_visible(&mut self, page: u32) -> bool {
        if page == 0 || page > self.total_pages {
            return false;
        }
        self.request(page)
    }

    /// Re-requests a page whose load failed. Returns `true` if it needs a request.
    pub fn retry(&mut self, page: u32) -> bool {
        match self.states.get_mut(&page) {
            Some(state) if *state == PageLoadState::Failed => {
                *state = PageLoadState::Loading;
                true
            }
            _ => false,
        }
    }

    /// Records a successful load. Returns `false` for stale outcomes.
    pub fn mark_loaded(&mut self, page: u32) -> bool {
        self.settle(page, PageLoadState::Loaded)
    }

    /// Records a failed load. Returns `false` for stale outcomes.
    pub fn mark_failed(&mut self, page: u32) -> bool {
        self.settle(page, PageLoadState::Failed)
    }

    fn request(&mut self, page: u32) -> bool {
        let state = self.states.entry(page).or_default();
        if state.needs_request() {
            *state = PageLoadState::Loading;
            true
        } else {
            false
        }
    }

    fn settle(&mut self, page: u32, outcome: PageLoadState) -> bool {
        match self.states.get_mut(&page) {
            Some(state) if *state == PageLoadState::Loading => {
                *state = outcome;
                true
            }
            _ => false,
        }
    }
}
