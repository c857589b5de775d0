//! Typed ID wrappers for rundown entities.
//!
//! Identifiers arrive from the persistence layer as opaque strings. Each ID
//! type is a newtype over `String`, so a `PartId` can never be passed where a
//! `SegmentId` is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Generate a newtype ID wrapper over `String`.
///
/// The macro produces a struct with:
/// - `new()` to mint a random v4 UUID string
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`, `Serialize`, `Deserialize`
/// - `Display`, `FromStr` and `AsRef<str>` over the inner string
/// - `From<&str>` and `From<String>` conversions
macro_rules! typed_id {
    ($($(#[doc = $doc:expr])* $name:ident),+ $(,)?) => {
        $(
            $(#[doc = $doc])*
            #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
            #[serde(transparent)]
            pub struct $name(String);

            impl $name {
                /// Mint a new random ID.
                #[must_use]
                pub fn new() -> Self {
                    Self(Uuid::new_v4().to_string())
                }

                /// Borrow the inner string.
                #[must_use]
                pub fn as_str(&self) -> &str {
                    &self.0
                }
            }

            impl Default for $name {
                fn default() -> Self {
                    Self::new()
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl FromStr for $name {
                type Err = std::convert::Infallible;

                fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                    Ok(Self(s.to_owned()))
                }
            }

            impl AsRef<str> for $name {
                fn as_ref(&self) -> &str {
                    &self.0
                }
            }

            impl From<&str> for $name {
                fn from(s: &str) -> Self {
                    Self(s.to_owned())
                }
            }

            impl From<String> for $name {
                fn from(s: String) -> Self {
                    Self(s)
                }
            }
        )+
    };
}

typed_id! {
    /// Identifier of a rundown.
    RundownId,
    /// Identifier of a segment within a rundown.
    SegmentId,
    /// Identifier of a part within a segment.
    PartId,
    /// Identifier of a piece within a part.
    PieceId,
}
