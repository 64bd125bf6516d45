//! Identity types for afslag
//!
//! All identity types are strongly typed wrappers around UUIDs to prevent
//! accidental mixing of different ID types.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Macro to generate ID types with common implementations
macro_rules! define_id_type {
    ($name:ident, $prefix:literal, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create from an existing UUID
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Parse from a string (with or without prefix)
            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                let s = s.strip_prefix(concat!($prefix, "_")).unwrap_or(s);
                Ok(Self(Uuid::parse_str(s)?))
            }

            /// Get the inner UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Convert to prefixed string
            pub fn to_prefixed_string(&self) -> String {
                format!("{}_{}", $prefix, self.0)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}_{}", $prefix, self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl AsRef<Uuid> for $name {
            fn as_ref(&self) -> &Uuid {
                &self.0
            }
        }
    };
}

define_id_type!(SellerId, "sel", "Unique identifier for a seller agent");
define_id_type!(BuyerId, "buy", "Unique identifier for a buyer agent");
define_id_type!(LotId, "lot", "Unique identifier for a lot offered at auction");
define_id_type!(SessionId, "ses", "Unique identifier for an auction session");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seller_id_creation() {
        let id = SellerId::new();
        let s = id.to_string();
        assert!(s.starts_with("sel_"));
    }

    #[test]
    fn test_id_parsing() {
        let id = LotId::new();
        let s = id.to_string();
        let parsed = LotId::parse(&s).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_id_parsing_without_prefix() {
        let id = BuyerId::new();
        let bare = id.as_uuid().to_string();
        let parsed = BuyerId::parse(&bare).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_id_equality() {
        let uuid = uuid::Uuid::new_v4();
        let id1 = BuyerId::from_uuid(uuid);
        let id2 = BuyerId::from_uuid(uuid);
        assert_eq!(id1, id2);
    }
}
