//! Rail ticket query server.
//!
//! Answers rail-ticket queries expressed either in structured shorthand
//! ("high-speed Beijing Shanghai 2024-06-05 09:00") or free text, returning
//! ranked, paginated results, including two-leg transfer itineraries
//! synthesized from pairs of direct-segment queries.

pub mod cache;
pub mod config;
pub mod domain;
pub mod nlq;
pub mod provider;
pub mod refine;
pub mod routing;
pub mod session;
pub mod turn;
pub mod web;
