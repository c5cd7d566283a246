//! Query routing: segment filtering and transfer composition.
//!
//! The direct path is fetch + filter; the transfer path runs two such
//! fetches per candidate hub and joins the results under a transfer-time
//! constraint.

mod config;
mod filter;
mod transfer;

pub mod hubs;

use chrono::NaiveDate;

use crate::domain::{Segment, TimeSpec, TrainType};
use crate::provider::{ProviderError, SegmentSource};

pub use config::RouterConfig;
pub use filter::{filter_segments, matches_time};
pub use transfer::{RouteError, TransferRouter};

/// Fetch segments for a route and apply the type/time filter.
///
/// This is the building block both query paths share: the direct path
/// calls it once, the transfer router twice per hub.
pub async fn fetch_filtered<S: SegmentSource>(
    source: &S,
    train_type: TrainType,
    from: &str,
    to: &str,
    date: NaiveDate,
    time: &TimeSpec,
) -> Result<Vec<Segment>, ProviderError> {
    let raw = source.fetch_segments(train_type, from, to, date).await?;
    Ok(filter_segments(raw, train_type, time))
}
