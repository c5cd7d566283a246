//! Ticket provider response DTOs.
//!
//! These types map directly to the provider's JSON responses. Fields use
//! `Option` and untyped values liberally because the provider is loose
//! about types (prices arrive as numbers or strings) and omits fields
//! rather than sending null.

use serde::Deserialize;
use serde_json::Value;

/// Top-level response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct TicketResponse {
    /// Provider status code; 200 on success.
    pub code: Option<i64>,

    /// Human-readable status message.
    pub msg: Option<String>,

    /// Raw segment records; absent on error responses.
    pub data: Option<Vec<RawSegment>>,
}

/// One raw direct-segment record.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSegment {
    /// Train number, e.g. "G1234".
    pub trainumber: Option<String>,

    /// Service type label.
    pub traintype: Option<String>,

    /// Origin station name.
    pub departstation: Option<String>,

    /// Destination station name.
    pub arrivestation: Option<String>,

    /// Departure clock, "HH:MM".
    pub departtime: Option<String>,

    /// Arrival clock, "HH:MM".
    pub arrivetime: Option<String>,

    /// Run-time string, e.g. "4h31m".
    pub runtime: Option<String>,

    /// Fare entries in provider order.
    pub ticket_info: Option<Vec<RawFare>>,
}

/// One raw fare entry.
#[derive(Debug, Clone, Deserialize)]
pub struct RawFare {
    /// Seat class name.
    pub seatname: Option<String>,

    /// Price; number or numeric string depending on provider mood.
    pub seatprice: Option<Value>,

    /// Remaining inventory; number or numeric string.
    pub seatinventory: Option<Value>,

    /// Bookability flag; boolean or a label string.
    pub bookable: Option<Value>,
}
