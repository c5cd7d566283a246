//! Two-leg transfer itineraries.

use serde::Serialize;

use super::segment::Segment;

/// A feasible two-leg journey through a transfer hub.
///
/// Constructed only via [`TransferItinerary::pair`], which enforces the
/// transfer window, so any value of this type satisfies
/// `min <= transfer_minutes <= max` and
/// `total_duration_minutes == leg1 + transfer + leg2`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferItinerary {
    pub first_leg: Segment,
    pub second_leg: Segment,

    /// Station where the change happens.
    pub transfer_hub: String,

    /// Minutes between first-leg arrival and second-leg departure.
    pub transfer_minutes: i64,

    /// Sum of both legs' reference fares.
    pub total_price: f64,

    /// First leg run time + transfer wait + second leg run time.
    pub total_duration_minutes: i64,
}

impl TransferItinerary {
    /// Try to pair two legs through a hub under a transfer-window constraint.
    ///
    /// The wait is measured from first-leg arrival forward to second-leg
    /// departure, adding 24h when the second leg departs "earlier" on the
    /// clock (overnight continuation). Returns None when either clock is
    /// missing or the wait falls outside `[min_transfer, max_transfer]`.
    pub fn pair(
        first_leg: &Segment,
        second_leg: &Segment,
        hub: &str,
        min_transfer: i64,
        max_transfer: i64,
    ) -> Option<Self> {
        let arrival = first_leg.arrival?;
        let departure = second_leg.departure?;

        let transfer_minutes = departure.minutes_since(arrival);
        if transfer_minutes < min_transfer || transfer_minutes > max_transfer {
            return None;
        }

        let total_price = first_leg.reference_price() + second_leg.reference_price();
        let total_duration_minutes =
            first_leg.duration_minutes() + transfer_minutes + second_leg.duration_minutes();

        Some(Self {
            first_leg: first_leg.clone(),
            second_leg: second_leg.clone(),
            transfer_hub: hub.to_string(),
            transfer_minutes,
            total_price,
            total_duration_minutes,
        })
    }
}
