//! Newtype ordinals for cart entries and entry groups.
//!
//! Use the `define_ordinal!` macro to create type-safe wrappers that prevent
//! accidentally passing an entry number where an entry group number is
//! expected.

/// Macro to define a type-safe ordinal wrapper.
///
/// Creates a newtype wrapper around `u32` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `PartialOrd`, `Ord`, `Hash`
/// - Conversion methods: `new()`, `as_u32()`
/// - `From<u32>` and `Into<u32>` implementations
///
/// # Example
///
/// ```rust
/// # use cart_entries_core::define_ordinal;
/// define_ordinal!(LineNumber);
/// define_ordinal!(BundleNumber);
///
/// let line = LineNumber::new(1);
/// let bundle = BundleNumber::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: LineNumber = bundle;
/// ```
#[macro_export]
macro_rules! define_ordinal {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Create a new ordinal from a u32 value.
            #[must_use]
            pub const fn new(value: u32) -> Self {
                Self(value)
            }

            /// Get the underlying u32 value.
            #[must_use]
            pub const fn as_u32(&self) -> u32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(value: u32) -> Self {
                Self(value)
            }
        }

        impl From<$name> for u32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

// Entry numbers start at zero and are assigned in ascending creation order.
define_ordinal!(EntryNumber);

// Entry group numbers start at one; zero never identifies a group.
define_ordinal!(EntryGroupNumber);

impl EntryNumber {
    /// The entry number following this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl EntryGroupNumber {
    /// Whether this number can identify an entry group.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 > 0
    }
}
