//! Query normalization: raw text to canonical queries.
//!
//! Three layers: compiled pattern sets, relative-date resolution, and the
//! normalizer itself, which prefers structured shorthand, then the
//! external interpretation service, then deterministic fallback rules.
//! The service is strictly best-effort; its failures never surface past
//! this module.

mod interpreter;
mod normalize;
mod patterns;
mod relative_date;

pub use interpreter::{ChatClient, ChatClientConfig, Interpreter, InterpreterError, unwrap_code_fence};
pub use normalize::{
    NlqError, TransferRequest, detect_transfer, fallback_parse, is_ticket_query,
    looks_like_ticket_query, normalize, parse_shorthand,
};
pub use relative_date::{date_table, find_in_text, next_weekday, this_weekday};
