//! Validated string identifiers.
//!
//! Product codes, pickup location names, site ids, user ids and cart ids all
//! share the same basic shape: a non-empty, bounded, printable string. Each one
//! gets its own type so that a location name can never be passed where a
//! product code is expected.

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a code.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CodeError {
    /// The input string is empty or whitespace only.
    #[error("{kind} cannot be empty")]
    Empty {
        /// Human readable name of the code kind.
        kind: &'static str,
    },
    /// The input string is too long.
    #[error("{kind} must be at most {max} characters")]
    TooLong {
        /// Human readable name of the code kind.
        kind: &'static str,
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains control characters.
    #[error("{kind} must not contain control characters")]
    ControlCharacter {
        /// Human readable name of the code kind.
        kind: &'static str,
    },
}

/// Maximum length of any code.
pub const MAX_CODE_LENGTH: usize = 255;

fn validate(kind: &'static str, s: &str) -> Result<(), CodeError> {
    if s.trim().is_empty() {
        return Err(CodeError::Empty { kind });
    }
    if s.chars().count() > MAX_CODE_LENGTH {
        return Err(CodeError::TooLong {
            kind,
            max: MAX_CODE_LENGTH,
        });
    }
    if s.chars().any(char::is_control) {
        return Err(CodeError::ControlCharacter { kind });
    }
    Ok(())
}

/// Macro to define a validated string code.
///
/// The generated type deserializes through `parse`.
macro_rules! define_code {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Parse from a string.
            ///
            /// # Errors
            ///
            /// Returns an error if the input is empty, longer than
            /// [`MAX_CODE_LENGTH`] characters, or contains control characters.
            pub fn parse(s: &str) -> Result<Self, CodeError> {
                validate($kind, s)?;
                Ok(Self(s.to_owned()))
            }

            /// Returns the code as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the code and returns its inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = CodeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = CodeError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                validate($kind, &s)?;
                Ok(Self(s))
            }
        }

        impl From<$name> for String {
            fn from(code: $name) -> Self {
                code.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_code!(
    /// Code identifying a product in the catalog.
    ProductCode,
    "product code"
);

define_code!(
    /// Name of a point of service where an entry can be picked up.
    ///
    /// Comparison is exact and case-sensitive.
    LocationName,
    "location name"
);

define_code!(
    /// Identifier of a base site (storefront).
    SiteId,
    "site id"
);

define_code!(
    /// Identifier of the user owning a cart.
    UserId,
    "user id"
);

define_code!(
    /// Session-scoped or persisted cart identifier.
    CartId,
    "cart id"
);
