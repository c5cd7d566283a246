//! Conversation-turn dispatch.
//!
//! One turn in, one structured reply out. Reserved `+` commands page or
//! refine the previous result set; everything else is resolved as a fresh
//! direct or transfer query. Every error from the layers below is
//! recovered here and mapped to a user-visible message; nothing a turn
//! does is process-fatal. Text that does not read as a ticket query at
//! all is ignored so other handlers on the host platform can claim it.

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::TrainQuery;
use crate::nlq::{self, Interpreter, NlqError, TransferRequest};
use crate::provider::{ProviderError, SegmentSource};
use crate::refine;
use crate::routing::{RouteError, RouterConfig, TransferRouter, fetch_filtered};
use crate::session::{Mode, PageDirection, PageView, Record, SessionError, SessionStore};

/// Structured reply for one turn. Rendering to chat text happens outside
/// this crate; the reply carries everything the renderer needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TurnReply {
    /// A page of results plus pagination footer data.
    Results(PageView),

    /// A user-visible message (errors, empty results).
    Message { text: String },

    /// Not a ticket query; no reply at all.
    Ignored,
}

impl TurnReply {
    fn message(text: impl Into<String>) -> Self {
        TurnReply::Message { text: text.into() }
    }
}

/// The query engine behind a conversation surface.
pub struct TurnEngine<S, I> {
    source: S,
    interpreter: Option<I>,
    store: SessionStore,
    router_config: RouterConfig,
}

impl<S, I> TurnEngine<S, I>
where
    S: SegmentSource + Sync,
    I: Interpreter + Sync,
{
    /// Create an engine over a segment source.
    ///
    /// `interpreter` is optional by design: with `None` every
    /// natural-language path runs on the deterministic fallback rules.
    pub fn new(source: S, interpreter: Option<I>, router_config: RouterConfig) -> Self {
        Self {
            source,
            interpreter,
            store: SessionStore::new(),
            router_config,
        }
    }

    /// Process one turn against today's date.
    pub async fn handle_turn(&self, conversation: &str, text: &str) -> TurnReply {
        self.handle_turn_on(conversation, text, Local::now().date_naive())
            .await
    }

    /// Process one turn with an explicit reference date.
    pub async fn handle_turn_on(
        &self,
        conversation: &str,
        text: &str,
        today: NaiveDate,
    ) -> TurnReply {
        let text = text.trim();
        if text.is_empty() {
            return TurnReply::Ignored;
        }
        debug!(conversation, text, "handling turn");

        match text {
            "+next page" | "+下一页" => return self.paginate(conversation, PageDirection::Next),
            "+previous page" | "+上一页" => {
                return self.paginate(conversation, PageDirection::Prev);
            }
            _ => {}
        }
        if let Some(instruction) = text.strip_prefix('+') {
            return self.refine_turn(conversation, instruction.trim()).await;
        }

        if let Some(request) = nlq::detect_transfer(text) {
            return self.transfer_turn(conversation, &request, today).await;
        }

        if let Some(query) = nlq::parse_shorthand(text, today) {
            return self.direct_turn(conversation, query).await;
        }

        if !nlq::is_ticket_query(text, self.interpreter.as_ref()).await {
            debug!(conversation, "not a ticket query, ignoring");
            return TurnReply::Ignored;
        }
        match nlq::normalize(text, today, self.interpreter.as_ref()).await {
            Ok(query) => self.direct_turn(conversation, query).await,
            Err(NlqError::Unparseable) => TurnReply::message(
                "could not work out a route from that; try: high-speed Beijing Shanghai 2024-06-05 09:00",
            ),
        }
    }

    async fn direct_turn(&self, conversation: &str, query: TrainQuery) -> TurnReply {
        info!(
            conversation,
            train_type = %query.train_type,
            from = %query.from,
            to = %query.to,
            date = %query.date,
            "direct query"
        );

        let segments = match fetch_filtered(
            &self.source,
            query.train_type,
            &query.from,
            &query.to,
            query.date,
            &query.time,
        )
        .await
        {
            Ok(segments) => segments,
            Err(e) => return source_failure(e),
        };

        if segments.is_empty() {
            return TurnReply::message("no trains match this query");
        }

        let records = segments.into_iter().map(Record::Direct).collect();
        TurnReply::Results(self.store.new_query(conversation, query, records, Mode::Direct))
    }

    async fn transfer_turn(
        &self,
        conversation: &str,
        request: &TransferRequest,
        today: NaiveDate,
    ) -> TurnReply {
        let query =
            match nlq::normalize(&request.rest, today, self.interpreter.as_ref()).await {
                Ok(query) => query,
                Err(NlqError::Unparseable) => {
                    return TurnReply::message(
                        "could not work out a transfer route from that; try: transfer+high-speed Chengdu Shanghai 2024-06-05",
                    );
                }
            };

        info!(
            conversation,
            from = %query.from,
            to = %query.to,
            hub_hint = request.hub_hint.as_deref(),
            "transfer query"
        );

        let router = TransferRouter::new(&self.source, &self.router_config);
        match router.route(&query, request.hub_hint.as_deref()).await {
            Ok(itineraries) => {
                let records = itineraries.into_iter().map(Record::Transfer).collect();
                TurnReply::Results(self.store.new_query(
                    conversation,
                    query,
                    records,
                    Mode::Transfer,
                ))
            }
            Err(RouteError::NoHubs) => TurnReply::message(format!(
                "no transfer hubs available between {} and {}",
                query.from, query.to
            )),
            Err(RouteError::NoFeasibleRoute) => TurnReply::message(format!(
                "no feasible transfer route found from {} to {}",
                query.from, query.to
            )),
        }
    }

    fn paginate(&self, conversation: &str, direction: PageDirection) -> TurnReply {
        match self.store.paginate(conversation, direction) {
            Ok(view) => TurnReply::Results(view),
            Err(e) => session_failure(e),
        }
    }

    async fn refine_turn(&self, conversation: &str, instruction: &str) -> TurnReply {
        let (originals, _, _) = match self.store.originals(conversation) {
            Ok(entry) => entry,
            Err(e) => return session_failure(e),
        };

        let filtered = refine::refine(&originals, instruction, self.interpreter.as_ref()).await;
        match self.store.apply_refinement(conversation, filtered) {
            Ok(view) => TurnReply::Results(view),
            Err(e) => session_failure(e),
        }
    }
}

fn source_failure(error: ProviderError) -> TurnReply {
    warn!(error = %error, "segment fetch failed");
    match error {
        ProviderError::Unavailable => {
            TurnReply::message("the ticket source is not responding, try again later")
        }
        _ => TurnReply::message("ticket lookup failed, try again later"),
    }
}

fn session_failure(error: SessionError) -> TurnReply {
    let text = match error {
        SessionError::NoPriorResults => "run a ticket query first",
        SessionError::AlreadyFirstPage => "already at the first page",
        SessionError::AlreadyLastPage => "already at the last page",
        SessionError::NoMatch => "no results match that refinement",
    };
    TurnReply::message(text)
}
