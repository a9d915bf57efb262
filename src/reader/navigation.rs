// SPDX-License-Identifier: MPL-2.0
//! Page navigation state machine.
//!
//! ```text
//!            begin_loading            load_content
//!   Idle ───────────────▶ AwaitingContent ───────────▶ Displaying(page) ◀──┐
//!                                 │                     │  advance/retreat ┘
//!                                 │ 0 pages             │ past first/last page
//!                                 ▼                     ▼
//!                               Empty ────────────▶ Transitioning(chapter)
//!                                      prev/next
//! ```
//!
//! `Transitioning` is terminal for the session: the caller navigates to the
//! target chapter and starts a new one.

/// Where the reader currently is.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NavigationState {
    #[default]
    Idle,
    AwaitingContent,
    /// A 1-based page is shown.
    Displaying(u32),
    /// Leaving for another chapter.
    Transitioning(String),
    /// The chapter has no pages.
    Empty,
}

impl NavigationState {
    #[must_use]
    pub fn displayed_page(&self) -> Option<u32> {
        match self {
            Self::Displaying(page) => Some(*page),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Transitioning(_))
    }
}

/// Page position within a chapter and links to its neighbors.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NavigationContext {
    /// 1-based; within `[1, total_pages]` whenever `total_pages > 0`.
    pub current_page: u32,
    pub total_pages: u32,
    pub prev_chapter_id: Option<String>,
    pub next_chapter_id: Option<String>,
}

impl NavigationContext {
    #[must_use]
    pub fn is_first_page(&self) -> bool {
        self.current_page <= 1
    }

    #[must_use]
    pub fn is_last_page(&self) -> bool {
        self.current_page >= self.total_pages
    }
}

/// Outcome of a navigation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Nothing changed.
    None,
    /// Entered `Displaying(page)`.
    Page(u32),
    /// Entered `Transitioning(chapter_id)`.
    Chapter(String),
    /// Entered `Empty`.
    Empty,
}

/// Navigation state machine for one chapter view.
#[derive(Debug, Clone, Default)]
pub struct Navigator {
    state: NavigationState,
    context: NavigationContext,
}

impl Navigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    #[must_use]
    pub fn context(&self) -> &NavigationContext {
        &self.context
    }

    /// Chapter content was requested. Ignored once transitioning.
    pub fn begin_loading(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        self.state = NavigationState::AwaitingContent;
        self.context = NavigationContext::default();
    }

    /// Chapter content arrived.
    ///
    /// Enters `Empty` for a chapter without pages, otherwise displays
    /// `start_page` clamped into range. Ignored unless awaiting content.
    pub fn load_content(
        &mut self,
        total_pages: u32,
        prev_chapter_id: Option<String>,
        next_chapter_id: Option<String>,
        start_page: u32,
    ) -> Transition {
        if self.state != NavigationState::AwaitingContent {
            return Transition::None;
        }

        self.context = NavigationContext {
            current_page: 0,
            total_pages,
            prev_chapter_id,
            next_chapter_id,
        };

        if total_pages == 0 {
            self.state = NavigationState::Empty;
            return Transition::Empty;
        }
        self.display(start_page.clamp(1, total_pages))
    }

    /// Moves one page forward, or to the next chapter from the last page.
    pub fn advance(&mut self) -> Transition {
        match self.state {
            NavigationState::Displaying(page) if page < self.context.total_pages => {
                self.display(page + 1)
            }
            NavigationState::Displaying(_) | NavigationState::Empty => {
                match self.context.next_chapter_id.clone() {
                    Some(id) => self.transition_to(id),
                    None => Transition::None,
                }
            }
            _ => Transition::None,
        }
    }

    /// Moves one page back, or to the previous chapter from the first page.
    pub fn retreat(&mut self) -> Transition {
        match self.state {
            NavigationState::Displaying(page) if page > 1 => self.display(page - 1),
            NavigationState::Displaying(_) | NavigationState::Empty => {
                match self.context.prev_chapter_id.clone() {
                    Some(id) => self.transition_to(id),
                    None => Transition::None,
                }
            }
            _ => Transition::None,
        }
    }

    /// Jumps to a 1-based page. Out-of-range pages are ignored.
    pub fn jump_to_page(&mut self, page: u32) -> Transition {
        match self.state {
            NavigationState::Displaying(current)
                if page != current && (1..=self.context.total_pages).contains(&page) =>
            {
                self.display(page)
            }
            _ => Transition::None,
        }
    }

    /// Leaves for any chapter. Ignored once transitioning.
    pub fn jump_to_chapter(&mut self, chapter_id: &str) -> Transition {
        if self.state.is_terminal() {
            return Transition::None;
        }
        self.transition_to(chapter_id.to_string())
    }

    /// Changes the page count (the image variant changed), keeping the
    /// current page when it is still in range.
    pub fn set_total_pages(&mut self, total_pages: u32) -> Transition {
        if !matches!(
            self.state,
            NavigationState::Displaying(_) | NavigationState::Empty
        ) {
            return Transition::None;
        }
        self.context.total_pages = total_pages;
        if total_pages == 0 {
            self.context.current_page = 0;
            self.state = NavigationState::Empty;
            return Transition::Empty;
        }
        let page = self.context.current_page.clamp(1, total_pages);
        self.display(page)
    }

    fn display(&mut self, page: u32) -> Transition {
        self.context.current_page = page;
        self.state = NavigationState::Displaying(page);
        Transition::Page(page)
    }

    fn transition_to(&mut self, chapter_id: String) -> Transition {
        self.state = NavigationState::Transitioning(chapter_id.clone());
        Transition::Chapter(chapter_id)
    }
}
