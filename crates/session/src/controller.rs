//! Search state: debounced query text, the result set, pagination and the
//! selection.
//!
//! The controller does no I/O. The session loop feeds it edits and clock
//! readings, runs the [`SearchTicket`]s it hands out, and passes the outcomes
//! back through [`QueryController::apply`]. Every ticket carries the
//! generation it was issued under; a new settled query or a quality switch
//! bumps the generation, so late answers to older tickets are dropped.

use giffos_core::{
    GifRef, GiffosError, QualityMode, ResultSet, SearchConfig, SearchRequest, Selection,
};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMode {
    Replace,
    Append,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchTicket {
    pub generation: u64,
    pub mode: PageMode,
    pub request: SearchRequest,
}

/// What happened when the debounce window closed.
#[derive(Debug, Clone, PartialEq)]
pub enum Settled {
    /// Blank query, results were dropped without a search
    Cleared,
    Search(SearchTicket),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    Replaced,
    Appended,
    /// Issued under an older generation, ignored
    Stale,
    /// The call failed; results are untouched
    Failed(GiffosError),
}

pub struct QueryController {
    debounce: Duration,
    page_size: u32,
    query: String,
    quality: QualityMode,
    /// Query the result set holds pages of; only a successful first page
    /// changes it
    shown: Option<String>,
    generation: u64,
    deadline: Option<Instant>,
    replace_in_flight: bool,
    results: ResultSet,
    selection: Selection,
}

impl QueryController {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            debounce: config.debounce(),
            page_size: config.page_size,
            query: String::new(),
            quality: QualityMode::default(),
            shown: None,
            generation: 0,
            deadline: None,
            replace_in_flight: false,
            results: ResultSet::new(),
            selection: Selection::default(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    pub fn selection(&self) -> Option<usize> {
        self.selection.get()
    }

    pub fn selected(&self) -> Option<&GifRef> {
        self.selection.get().and_then(|i| self.results.get(i))
    }

    /// When the pending debounce window closes, if one is open.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Records new query text and restarts the debounce window.
    pub fn edit_query(&mut self, text: String, now: Instant) {
        self.query = text;
        self.rearm(now);
    }

    /// Restarts the debounce window without touching the text, e.g. after
    /// the API key changed.
    pub fn rearm(&mut self, now: Instant) {
        self.deadline = Some(now + self.debounce);
    }

    /// Switches quality and starts over: text, results, selection and any
    /// pending or in-flight search are dropped. Returns `false` if `mode` is
    /// already active.
    pub fn set_quality(&mut self, mode: QualityMode) -> bool {
        if mode == self.quality {
            return false;
        }
        self.quality = mode;
        self.query.clear();
        self.shown = None;
        self.deadline = None;
        self.replace_in_flight = false;
        self.generation += 1;
        self.results.clear();
        self.selection.clear();
        true
    }

    /// Closes the debounce window if it has expired by `now`.
    pub fn settle(&mut self, now: Instant, api_key: &str) -> Option<Settled> {
        match self.deadline {
            Some(deadline) if now >= deadline => self.deadline = None,
            _ => return None,
        }
        self.generation += 1;

        if self.query.trim().is_empty() {
            self.shown = None;
            self.replace_in_flight = false;
            self.results.clear();
            self.selection.clear();
            return Some(Settled::Cleared);
        }

        self.replace_in_flight = true;
        let query = self.query.clone();
        Some(Settled::Search(self.ticket(query, PageMode::Replace, 0, api_key)))
    }

    /// Next page of the query the results belong to. `None` while there is
    /// nothing to page through or a first page is still on its way.
    pub fn load_more(&mut self, api_key: &str) -> Option<SearchTicket> {
        if self.replace_in_flight || self.results.is_empty() {
            return None;
        }
        let query = self.shown.clone()?;
        let offset = self.results.advance(self.page_size);
        Some(self.ticket(query, PageMode::Append, offset, api_key))
    }

    pub fn apply(
        &mut self,
        ticket: &SearchTicket,
        outcome: Result<Vec<GifRef>, GiffosError>,
    ) -> Applied {
        if ticket.generation != self.generation {
            return Applied::Stale;
        }
        if ticket.mode == PageMode::Replace {
            self.replace_in_flight = false;
        }

        let gifs = match outcome {
            Ok(gifs) => gifs,
            Err(e) => return Applied::Failed(e),
        };

        match ticket.mode {
            PageMode::Replace => {
                self.shown = Some(ticket.request.query.clone());
                self.results.replace(gifs);
                self.selection.clear();
                Applied::Replaced
            }
            PageMode::Append => {
                self.results.append(gifs);
                self.selection.fit(self.results.len());
                Applied::Appended
            }
        }
    }

    /// Selects `index` if it is within the current results.
    pub fn select(&mut self, index: usize) -> bool {
        self.selection.set(index, self.results.len())
    }

    fn ticket(&self, query: String, mode: PageMode, offset: u32, api_key: &str) -> SearchTicket {
        SearchTicket {
            generation: self.generation,
            mode,
            request: SearchRequest {
                query,
                offset,
                limit: self.page_size,
                quality: self.quality,
                api_key: api_key.to_string(),
            },
        }
    }
}
