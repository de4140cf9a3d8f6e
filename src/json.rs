//! JSON array encoding for both set types.
//!
//! A set is persisted as a JSON array holding one scalar per member:
//! a string, a number, a boolean or `null`. This is the only wire format
//! the crate defines.
//!
//! - Encoding fails as a whole if any member serializes to an array or an
//!   object ([`JsonError::UnsupportedElement`]).
//! - Decoding requires the top-level value to be an array
//!   ([`JsonError::NotAnArray`]). Array and object entries inside it are
//!   skipped without failing the decode; every scalar entry becomes a member.
//! - Numbers keep their exact decimal text (`serde_json` is built with
//!   `arbitrary_precision`), so large integers round-trip without passing
//!   through `f64`.
//!
//! [`Scalar`] is a dynamically-typed element able to hold any of the
//! accepted entries, for data whose element types are only known at runtime.
//!
//! # Examples
//!
//! ```rust
//! use mapset::UnsafeSet;
//! use mapset::json::Scalar;
//!
//! let set: UnsafeSet<Scalar> =
//!     UnsafeSet::from_json(r#"["a", 12345678901234567890123, true, null, [1, 2]]"#).unwrap();
//!
//! assert_eq!(set.len(), 4); // the nested array is skipped
//! assert!(set.contains(&Scalar::Number("12345678901234567890123".to_string())));
//!
//! let restored: UnsafeSet<Scalar> = UnsafeSet::from_json(&set.to_json().unwrap()).unwrap();
//! assert_eq!(set, restored);
//! ```

use std::fmt;
use std::hash::{BuildHasher, Hash};

use serde::de::{self, DeserializeOwned, Unexpected};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

use crate::set::{SafeSet, UnsafeSet};

/// Errors raised while converting a set to or from its JSON array form.
#[derive(Debug, Error)]
pub enum JsonError {
    /// The input is not valid JSON.
    #[error("malformed JSON input")]
    Syntax(#[source] serde_json::Error),

    /// The input is valid JSON but its top-level value is not an array.
    #[error("expected a JSON array, found {found}")]
    NotAnArray {
        /// Kind of the value that was found instead.
        found: &'static str,
    },

    /// A member serializes to a composite value.
    #[error("set member encodes as a JSON {kind}; only scalar members are supported")]
    UnsupportedElement {
        /// Kind of the composite value (`array` or `object`).
        kind: &'static str,
    },

    /// A member failed to serialize at all.
    #[error("failed to encode set member")]
    Encode(#[source] serde_json::Error),

    /// A scalar entry could not be converted to the element type.
    #[error("array entry {index} does not match the element type")]
    Element {
        /// Position of the entry in the input array.
        index: usize,
        /// Underlying conversion error.
        #[source]
        source: serde_json::Error,
    },
}

const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

const fn is_composite(value: &Value) -> bool {
    matches!(value, Value::Array(_) | Value::Object(_))
}

/// Encodes `elements` as a JSON array of scalars.
///
/// # Errors
///
/// Returns [`JsonError::UnsupportedElement`] if any element serializes to an
/// array or object, or [`JsonError::Encode`] if serialization itself fails.
///
/// # Examples
///
/// ```rust
/// use mapset::json::{self, JsonError};
///
/// assert_eq!(json::encode(&[1, 2]).unwrap(), "[1,2]");
///
/// let nested = [vec![1], vec![2]];
/// assert!(matches!(json::encode(&nested), Err(JsonError::UnsupportedElement { .. })));
/// ```
pub fn encode<'a, T, I>(elements: I) -> Result<String, JsonError>
where
    T: Serialize + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let entries = elements
        .into_iter()
        .map(encode_element)
        .collect::<Result<Vec<_>, _>>()?;
    serde_json::to_string(&Value::Array(entries)).map_err(JsonError::Encode)
}

fn encode_element<T: Serialize>(element: &T) -> Result<Value, JsonError> {
    let value = serde_json::to_value(element).map_err(JsonError::Encode)?;
    if is_composite(&value) {
        return Err(JsonError::UnsupportedElement {
            kind: kind_of(&value),
        });
    }
    Ok(value)
}

/// Decodes a JSON array into its scalar entries, in input order.
///
/// Array and object entries are skipped. Duplicates are kept; collapsing
/// them is left to the set being populated.
///
/// # Errors
///
/// Returns [`JsonError::Syntax`] for malformed input,
/// [`JsonError::NotAnArray`] if the top-level value is not an array, and
/// [`JsonError::Element`] if a scalar entry does not fit `T`.
///
/// # Examples
///
/// ```rust
/// use mapset::json;
///
/// let strings: Vec<String> = json::decode(r#"["x", {"skip": true}, "y"]"#).unwrap();
/// assert_eq!(strings, vec!["x".to_string(), "y".to_string()]);
///
/// assert!(json::decode::<i32>("{}").is_err());
/// ```
pub fn decode<T: DeserializeOwned>(input: &str) -> Result<Vec<T>, JsonError> {
    let entries = match serde_json::from_str::<Value>(input).map_err(JsonError::Syntax)? {
        Value::Array(entries) => entries,
        other => {
            return Err(JsonError::NotAnArray {
                found: kind_of(&other),
            });
        }
    };

    let mut elements = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        if is_composite(&entry) {
            log::debug!(
                "skipping {} entry at index {index} while decoding a set",
                kind_of(&entry)
            );
            continue;
        }
        let element =
            serde_json::from_value(entry).map_err(|source| JsonError::Element { index, source })?;
        elements.push(element);
    }
    log::trace!("decoded {} set members from JSON", elements.len());
    Ok(elements)
}

// =============================================================================
// Scalar
// =============================================================================

/// A JSON scalar usable as a set member.
///
/// Numbers are held as their exact decimal text, so `1` and `1.0` are
/// distinct members and no precision is lost.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scalar {
    /// JSON `null`.
    Null,
    /// JSON boolean.
    Bool(bool),
    /// JSON number, as written.
    Number(String),
    /// JSON string.
    String(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => formatter.write_str("null"),
            Self::Bool(value) => write!(formatter, "{value}"),
            Self::Number(text) | Self::String(text) => formatter.write_str(text),
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(value) => serializer.serialize_bool(*value),
            Self::Number(text) => text
                .parse::<serde_json::Number>()
                .map_err(serde::ser::Error::custom)?
                .serialize(serializer),
            Self::String(text) => serializer.serialize_str(text),
        }
    }
}

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(Self::Null),
            Value::Bool(value) => Ok(Self::Bool(value)),
            Value::Number(number) => Ok(Self::Number(number.to_string())),
            Value::String(text) => Ok(Self::String(text)),
            other => Err(de::Error::invalid_type(
                Unexpected::Other(kind_of(&other)),
                &"a JSON scalar",
            )),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<serde_json::Number> for Scalar {
    fn from(value: serde_json::Number) -> Self {
        Self::Number(value.to_string())
    }
}

macro_rules! scalar_from_integer {
    ($($integer:ty),+) => {
        $(
            impl From<$integer> for Scalar {
                fn from(value: $integer) -> Self {
                    Self::Number(value.to_string())
                }
            }
        )+
    };
}

scalar_from_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

// =============================================================================
// Set Methods
// =============================================================================

impl<T: Serialize, S> UnsafeSet<T, S> {
    /// Encodes the set as a JSON array of scalars, in unspecified order.
    ///
    /// # Errors
    ///
    /// See [`encode`].
    pub fn to_json(&self) -> Result<String, JsonError> {
        encode(self.iter())
    }
}

impl<T, S> UnsafeSet<T, S>
where
    T: DeserializeOwned + Eq + Hash,
    S: BuildHasher,
{
    /// Adds every scalar entry of a JSON array to the set, keeping existing
    /// members. Returns the number of newly inserted members.
    ///
    /// On error the set is left unchanged.
    ///
    /// # Errors
    ///
    /// See [`decode`].
    pub fn extend_from_json(&mut self, input: &str) -> Result<usize, JsonError> {
        let elements = decode::<T>(input)?;
        Ok(elements
            .into_iter()
            .map(|element| usize::from(self.add(element)))
            .sum())
    }
}

impl<T, S> UnsafeSet<T, S>
where
    T: DeserializeOwned + Eq + Hash,
    S: BuildHasher + Default,
{
    /// Builds a set from a JSON array of scalars.
    ///
    /// # Errors
    ///
    /// See [`decode`].
    pub fn from_json(input: &str) -> Result<Self, JsonError> {
        let mut set = Self::default();
        set.extend_from_json(input)?;
        Ok(set)
    }
}

impl<T: Serialize, S> SafeSet<T, S> {
    /// Encodes the set as a JSON array of scalars under the read lock.
    ///
    /// # Errors
    ///
    /// See [`encode`].
    pub fn to_json(&self) -> Result<String, JsonError> {
        self.with_read(UnsafeSet::to_json)
    }
}

impl<T, S> SafeSet<T, S>
where
    T: DeserializeOwned + Eq + Hash,
    S: BuildHasher,
{
    /// Adds every scalar entry of a JSON array to the set and returns the
    /// number of newly inserted members.
    ///
    /// Parsing happens before the lock is taken; the members are then
    /// inserted under one write-lock acquisition.
    ///
    /// # Errors
    ///
    /// See [`decode`]. On error the set is left unchanged.
    pub fn extend_from_json(&self, input: &str) -> Result<usize, JsonError> {
        let elements = decode::<T>(input)?;
        Ok(self.add_all(elements))
    }
}

impl<T, S> SafeSet<T, S>
where
    T: DeserializeOwned + Eq + Hash,
    S: BuildHasher + Default,
{
    /// Builds a set from a JSON array of scalars.
    ///
    /// # Errors
    ///
    /// See [`decode`].
    pub fn from_json(input: &str) -> Result<Self, JsonError> {
        Ok(UnsafeSet::from_json(input)?.into())
    }
}

// =============================================================================
// Tests
// =============================================================================
