//! The item catalogue
//!
//! The market trades a small fixed set of fish kinds. Single-letter codes
//! match the tags used in the result sink.

use crate::error::TypeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A kind of item offered at auction
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Hake,
    Sole,
    Tuna,
}

impl ItemKind {
    /// Every kind the market trades
    pub const ALL: [ItemKind; 3] = [ItemKind::Hake, ItemKind::Sole, ItemKind::Tuna];

    /// Single-letter code used in logs and reports
    pub fn code(&self) -> &'static str {
        match self {
            Self::Hake => "H",
            Self::Sole => "S",
            Self::Tuna => "T",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Hake => "hake",
            Self::Sole => "sole",
            Self::Tuna => "tuna",
        }
    }

    /// Parse from a code or label
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "h" | "hake" => Ok(Self::Hake),
            "s" | "sole" => Ok(Self::Sole),
            "t" | "tuna" => Ok(Self::Tuna),
            _ => Err(TypeError::UnknownItemKind {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
