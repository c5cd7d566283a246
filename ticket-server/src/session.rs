//! Per-conversation result store.
//!
//! Holds the result set of the latest query for each conversation and the
//! filtered/paged view over it. The original records are never mutated
//! after a query lands; refinements always recompute from them and only
//! replace the view, so a refinement can be retried or widened without
//! re-fetching. A conversation idle for ten minutes is dropped wholesale.
//!
//! Turns for one conversation are already serialized by the host dispatch;
//! the mutex here only guards against different conversations sharing the
//! map.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::domain::{Segment, TrainQuery, TransferItinerary};

/// Results per page.
const PAGE_SIZE: usize = 10;

/// Hard cap on rendered rows per reply, whatever the page size says.
const MAX_RENDERED_ROWS: usize = 20;

/// Idle time after which a conversation's results are dropped.
const IDLE_EXPIRY: Duration = Duration::from_secs(10 * 60);

/// One result row: a direct segment or a transfer itinerary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    Direct(Segment),
    Transfer(TransferItinerary),
}

impl Record {
    /// Reference price: the segment's reference fare, or the itinerary's
    /// summed total.
    pub fn price(&self) -> f64 {
        match self {
            Record::Direct(seg) => seg.reference_price(),
            Record::Transfer(it) => it.total_price,
        }
    }

    /// Total travel time in minutes.
    pub fn duration_minutes(&self) -> i64 {
        match self {
            Record::Direct(seg) => seg.duration_minutes(),
            Record::Transfer(it) => it.total_duration_minutes,
        }
    }

    /// Wait at the hub; None for direct segments.
    pub fn transfer_minutes(&self) -> Option<i64> {
        match self {
            Record::Direct(_) => None,
            Record::Transfer(it) => Some(it.transfer_minutes),
        }
    }

    /// The transfer hub; None for direct segments.
    pub fn transfer_hub(&self) -> Option<&str> {
        match self {
            Record::Direct(_) => None,
            Record::Transfer(it) => Some(&it.transfer_hub),
        }
    }

    /// Train numbers on this record, one or two.
    pub fn train_numbers(&self) -> Vec<&str> {
        match self {
            Record::Direct(seg) => vec![&seg.train_no],
            Record::Transfer(it) => vec![&it.first_leg.train_no, &it.second_leg.train_no],
        }
    }
}

/// What kind of query produced the current results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Direct,
    Transfer,
}

/// Pagination direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDirection {
    Next,
    Prev,
}

/// Errors from store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// No live result set for this conversation
    #[error("no prior results for this conversation")]
    NoPriorResults,

    /// paginate(prev) at page 1
    #[error("already at the first page")]
    AlreadyFirstPage,

    /// paginate(next) at the last page
    #[error("already at the last page")]
    AlreadyLastPage,

    /// Refinement matched nothing; the prior view is kept
    #[error("no results match that refinement")]
    NoMatch,
}

/// One page of the current view, ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageView {
    pub records: Vec<Record>,
    pub page: usize,
    pub total_pages: usize,
    pub total_matches: usize,
    pub mode: Mode,
}

struct SessionState {
    /// Result set of the latest query; immutable until the next query.
    original: Vec<Record>,

    /// Latest refinement of `original`; what pagination walks.
    view: Vec<Record>,

    page: usize,
    mode: Mode,
    last_query: TrainQuery,
    last_activity: Instant,
}

impl SessionState {
    fn total_pages(&self, page_size: usize) -> usize {
        self.view.len().div_ceil(page_size).max(1)
    }

    fn page_view(&self, page_size: usize) -> PageView {
        let start = (self.page - 1) * page_size;
        let end = (start + page_size.min(MAX_RENDERED_ROWS)).min(self.view.len());
        PageView {
            records: self.view[start.min(end)..end].to_vec(),
            page: self.page,
            total_pages: self.total_pages(page_size),
            total_matches: self.view.len(),
            mode: self.mode,
        }
    }
}

/// Result store over all live conversations.
pub struct SessionStore {
    sessions: Mutex<HashMap<String, SessionState>>,
    page_size: usize,
    idle_expiry: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_settings(PAGE_SIZE, IDLE_EXPIRY)
    }

    /// Custom page size and idle expiry, for tests and tuning.
    pub fn with_settings(page_size: usize, idle_expiry: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            page_size: page_size.max(1),
            idle_expiry,
        }
    }

    /// Replace a conversation's results wholesale with a fresh query's.
    pub fn new_query(
        &self,
        conversation: &str,
        query: TrainQuery,
        records: Vec<Record>,
        mode: Mode,
    ) -> PageView {
        let mut sessions = self.sessions.lock().expect("session map lock");
        let state = SessionState {
            view: records.clone(),
            original: records,
            page: 1,
            mode,
            last_query: query,
            last_activity: Instant::now(),
        };
        let view = state.page_view(self.page_size);
        sessions.insert(conversation.to_string(), state);
        view
    }

    /// Move one page forward or back through the current view.
    pub fn paginate(
        &self,
        conversation: &str,
        direction: PageDirection,
    ) -> Result<PageView, SessionError> {
        let mut sessions = self.sessions.lock().expect("session map lock");
        let state = self.live(&mut sessions, conversation)?;

        match direction {
            PageDirection::Next => {
                if state.page >= state.total_pages(self.page_size) {
                    return Err(SessionError::AlreadyLastPage);
                }
                state.page += 1;
            }
            PageDirection::Prev => {
                if state.page <= 1 {
                    return Err(SessionError::AlreadyFirstPage);
                }
                state.page -= 1;
            }
        }
        state.last_activity = Instant::now();
        Ok(state.page_view(self.page_size))
    }

    /// The original (unrefined) records of the latest query, plus its mode
    /// and parameters. Refinement always starts from these.
    pub fn originals(
        &self,
        conversation: &str,
    ) -> Result<(Vec<Record>, Mode, TrainQuery), SessionError> {
        let mut sessions = self.sessions.lock().expect("session map lock");
        let state = self.live(&mut sessions, conversation)?;
        Ok((state.original.clone(), state.mode, state.last_query.clone()))
    }

    /// Install a refinement result as the new view, back at page 1.
    ///
    /// An empty result is `NoMatch` and leaves the prior view intact so
    /// the user can rephrase without losing their place.
    pub fn apply_refinement(
        &self,
        conversation: &str,
        filtered: Vec<Record>,
    ) -> Result<PageView, SessionError> {
        let mut sessions = self.sessions.lock().expect("session map lock");
        let state = self.live(&mut sessions, conversation)?;

        if filtered.is_empty() {
            return Err(SessionError::NoMatch);
        }

        state.view = filtered;
        state.page = 1;
        state.last_activity = Instant::now();
        Ok(state.page_view(self.page_size))
    }

    /// The current page without moving it.
    pub fn current_page(&self, conversation: &str) -> Result<PageView, SessionError> {
        let mut sessions = self.sessions.lock().expect("session map lock");
        let state = self.live(&mut sessions, conversation)?;
        state.last_activity = Instant::now();
        Ok(state.page_view(self.page_size))
    }

    /// Fetch a conversation's state, dropping it first if it sat idle past
    /// the expiry window.
    fn live<'a>(
        &self,
        sessions: &'a mut HashMap<String, SessionState>,
        conversation: &str,
    ) -> Result<&'a mut SessionState, SessionError> {
        if let Some(state) = sessions.get(conversation) {
            if state.last_activity.elapsed() > self.idle_expiry {
                sessions.remove(conversation);
            }
        }
        sessions
            .get_mut(conversation)
            .ok_or(SessionError::NoPriorResults)
    }
}
