//! Service type classification.

use std::fmt;

use serde::Serialize;

/// Canonical train service type.
///
/// The provider and the query language both use a three-way split:
/// high-speed (G class), inter-city EMU (D class), and everything slower.
/// All synonyms are folded into these three at the parsing boundary so the
/// rest of the crate compares plain enum values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrainType {
    HighSpeed,
    InterCity,
    Ordinary,
}

impl TrainType {
    /// Parse a type label or synonym.
    ///
    /// Recognizes the canonical labels, the original CJK keywords, and the
    /// common colloquial names for conventional-rail services.
    pub fn parse(s: &str) -> Option<Self> {
        let norm = s.trim().to_lowercase();
        match norm.as_str() {
            "high-speed" | "highspeed" | "high speed" | "bullet" | "g-train" | "高铁" => {
                Some(TrainType::HighSpeed)
            }
            "inter-city" | "intercity" | "inter city" | "emu" | "d-train" | "动车" => {
                Some(TrainType::InterCity)
            }
            "ordinary" | "normal" | "regular" | "conventional" | "express" | "k-train"
            | "hard-seat" | "hard-seat service" | "普通" | "普快" | "快速" => {
                Some(TrainType::Ordinary)
            }
            _ => None,
        }
    }

    /// The canonical label, as sent to the ticket provider and used in
    /// shorthand queries.
    pub fn as_str(&self) -> &'static str {
        match self {
            TrainType::HighSpeed => "high-speed",
            TrainType::InterCity => "inter-city",
            TrainType::Ordinary => "ordinary",
        }
    }
}

impl fmt::Display for TrainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
