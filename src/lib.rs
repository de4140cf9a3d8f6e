//! # mapset
//!
//! A generic mutable hash set offered in two interchangeable flavours behind
//! one capability interface, [`MapSet`].
//!
//! ## Overview
//!
//! - [`UnsafeSet`]: an unordered set of unique elements backed by a hash map
//!   from element to a zero-size presence marker. No internal locking.
//! - [`SafeSet`]: one `UnsafeSet` plus one reader/writer lock. Reads share
//!   the lock, mutations take it exclusively.
//! - [`json`]: encoding to and decoding from a JSON array of scalars.
//!
//! Elements only need `Eq + Hash` (and `Clone` for the operations that hand
//! out owned members). Enumeration order is never part of any contract.
//!
//! ## Feature Flags
//!
//! - `json` (default): JSON array encoding, implies `serde`
//! - `serde`: `Serialize`/`Deserialize` for both set types
//! - `fxhash`: [`FxUnsafeSet`]/[`FxSafeSet`] aliases using `rustc-hash`
//! - `ahash`: [`AUnsafeSet`]/[`ASafeSet`] aliases using `ahash`
//! - `full`: all of the above
//!
//! ## Example
//!
//! ```rust
//! use mapset::prelude::*;
//!
//! let set = map_set![3, 1, 2];
//! assert!(set.add(4));
//! assert!(!set.add(4));
//! assert!(set.contains_all(&[1, 2, 3, 4]));
//!
//! let copy = set.clone_set();
//! copy.remove(&1);
//! assert_eq!(set.len(), 4);
//! assert_eq!(copy.len(), 3);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// Re-exports the set types, the [`MapSet`] trait, the construction helpers
/// and macros, and the JSON types when the `json` feature is enabled.
///
/// # Usage
///
/// ```rust
/// use mapset::prelude::*;
/// ```
pub mod prelude {
    pub use crate::set::*;
    pub use crate::{map_set, unsafe_set};

    #[cfg(feature = "json")]
    pub use crate::json::{JsonError, Scalar};
}

pub mod set;

#[cfg(feature = "json")]
pub mod json;

pub use set::{
    IntoIter, Iter, MapSet, SafeSet, UnsafeSet, new_set, new_unsafe_set, set_from, unsafe_set_from,
};

#[cfg(feature = "fxhash")]
pub use set::{FxSafeSet, FxUnsafeSet};

#[cfg(feature = "ahash")]
pub use set::{ASafeSet, AUnsafeSet};
