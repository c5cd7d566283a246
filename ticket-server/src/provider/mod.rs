//! Ticket source client.
//!
//! HTTP client for the external ticket data provider, which answers
//! `(from, to, date, type)` queries with raw direct-segment records.
//!
//! Key characteristics of the provider:
//! - Times are bare "HH:MM" clock strings with no date
//! - The success envelope carries its own status code alongside the HTTP one
//! - Field types are loose: prices and inventories arrive as numbers or
//!   numeric strings
//! - No retries here; a failed fetch fails only the leg that issued it

mod client;
mod convert;
mod error;
mod types;

use std::future::Future;

use chrono::NaiveDate;

use crate::domain::{Segment, TrainType};

pub use client::{TicketClient, TicketClientConfig};
pub use convert::convert_segments;
pub use error::ProviderError;
pub use types::{RawFare, RawSegment, TicketResponse};

/// Source of direct-segment candidates.
///
/// This abstraction lets the router and turn engine be tested with mock
/// data, and lets the caching wrapper be dropped in transparently.
pub trait SegmentSource {
    /// Fetch raw segment candidates for a route on a date.
    fn fetch_segments(
        &self,
        train_type: TrainType,
        from: &str,
        to: &str,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Vec<Segment>, ProviderError>> + Send;
}

impl SegmentSource for TicketClient {
    async fn fetch_segments(
        &self,
        train_type: TrainType,
        from: &str,
        to: &str,
        date: NaiveDate,
    ) -> Result<Vec<Segment>, ProviderError> {
        TicketClient::fetch_segments(self, train_type, from, to, date).await
    }
}
