//! Domain types for the ticket query engine.
//!
//! This module contains the core domain model. Types enforce their
//! invariants at construction time (distinct stations on a query, the
//! transfer window on an itinerary), so code that receives these values
//! can trust their validity.

mod itinerary;
mod query;
mod segment;
mod time;
mod train_type;

pub use itinerary::TransferItinerary;
pub use query::{Daypart, QueryError, TimeSpec, TrainQuery};
pub use segment::{Fare, Segment, parse_run_time};
pub use time::{ClockError, ClockTime};
pub use train_type::TrainType;
