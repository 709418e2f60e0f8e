//! # Tracker Types
//!
//! Validated value types shared by every tracker crate.
//!
//! - [`NonEmptyText`] for identifiers that must carry visible characters (patient ids)
//! - [`Location`] for the closed set of scan points inside the hospital

use std::fmt;
use std::str::FromStr;

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
}

/// A string type that guarantees non-empty content.
///
/// Unlike a free-form label, patient identifiers are opaque: surrounding whitespace is
/// significant to the caller's QR payload, so the input is only checked, never trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// Returns `Err(TextError::Empty)` if the input is empty or contains only whitespace.
    pub fn new(input: impl Into<String>) -> Result<Self, TextError> {
        let input = input.into();
        if input.trim().is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(input))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(s).map_err(serde::de::Error::custom)
    }
}

/// Error returned when a string is not one of the known scan locations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unrecognised location: {0:?}")]
pub struct LocationError(pub String);

/// A scan point inside the hospital.
///
/// Matching is exact and case-sensitive: `"parking"` is valid, `"PARKING"` is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Location {
    Parking,
    MainEntrance,
    Registration,
    Consultation,
    Lab,
    Radiology,
    Pharmacy,
    Exit,
}

impl Location {
    /// Every location, in the order a patient typically walks through them.
    pub const ALL: [Location; 8] = [
        Location::Parking,
        Location::MainEntrance,
        Location::Registration,
        Location::Consultation,
        Location::Lab,
        Location::Radiology,
        Location::Pharmacy,
        Location::Exit,
    ];

    /// The wire code for this location.
    pub const fn as_str(self) -> &'static str {
        match self {
            Location::Parking => "parking",
            Location::MainEntrance => "main-entrance",
            Location::Registration => "registration",
            Location::Consultation => "consultation",
            Location::Lab => "lab",
            Location::Radiology => "radiology",
            Location::Pharmacy => "pharmacy",
            Location::Exit => "exit",
        }
    }
}

impl FromStr for Location {
    type Err = LocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Location::ALL
            .into_iter()
            .find(|location| location.as_str() == s)
            .ok_or_else(|| LocationError(s.to_owned()))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl serde::Serialize for Location {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for Location {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
