// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Management Resource Addresses
//!
//! A [`PathAddress`] locates a resource in the management model as an ordered
//! list of `key=value` [`PathElement`]s starting at the root, rendered as
//! `/host=primary/server=server-one`. The root address renders as `/`.
//!
//! Values may be the wildcard `*` (used by resource patterns and by
//! requirements that probe "any instance"), or the redaction placeholder
//! produced by incremental address authorization.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Value matching any instance of a key.
pub const WILDCARD: &str = "*";

/// Placeholder substituted for values the caller is not allowed to see.
pub const REDACTED: &str = "<redacted>";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressParseError {
    #[error("Malformed address element '{0}': expected key=value")]
    MalformedElement(String),
}

/// One `key=value` segment of a [`PathAddress`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PathElement {
    pub key: String,
    pub value: String,
}

impl PathElement {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn wildcard(key: impl Into<String>) -> Self {
        Self::new(key, WILDCARD)
    }

    /// Element whose value has been hidden from the caller.
    pub fn redacted(key: impl Into<String>) -> Self {
        Self::new(key, REDACTED)
    }

    pub fn is_wildcard(&self) -> bool {
        self.value == WILDCARD
    }

    pub fn is_redacted(&self) -> bool {
        self.value == REDACTED
    }

    /// Whether `self`, used as a pattern, matches `other`.
    pub fn matches(&self, other: &PathElement) -> bool {
        self.key == other.key && (self.is_wildcard() || self.value == other.value)
    }
}

impl fmt::Display for PathElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Address of a resource in the management model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PathAddress(Vec<PathElement>);

impl PathAddress {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn new(elements: Vec<PathElement>) -> Self {
        Self(elements)
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self(pairs.into_iter().map(|(k, v)| PathElement::new(k, v)).collect())
    }

    pub fn elements(&self) -> &[PathElement] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<&PathElement> {
        self.0.first()
    }

    pub fn last(&self) -> Option<&PathElement> {
        self.0.last()
    }

    /// A copy of this address with `element` appended.
    pub fn append(&self, element: PathElement) -> Self {
        let mut elements = self.0.clone();
        elements.push(element);
        Self(elements)
    }

    /// A copy of this address with every element of `other` appended.
    pub fn join(&self, other: &PathAddress) -> Self {
        let mut elements = self.0.clone();
        elements.extend(other.0.iter().cloned());
        Self(elements)
    }

    /// The first `len` elements (the whole address if `len` exceeds it).
    pub fn prefix(&self, len: usize) -> Self {
        Self(self.0.iter().take(len).cloned().collect())
    }

    /// Value of the first element with the given key.
    pub fn value_of(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.value.as_str())
    }

    /// Whether `self`, used as a pattern, matches `address` element by element.
    pub fn matches(&self, address: &PathAddress) -> bool {
        self.len() == address.len()
            && self
                .0
                .iter()
                .zip(address.0.iter())
                .all(|(pattern, element)| pattern.matches(element))
    }

    pub fn is_redacted(&self) -> bool {
        self.0.iter().any(PathElement::is_redacted)
    }
}

impl fmt::Display for PathAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "/");
        }
        for element in &self.0 {
            write!(f, "/{}", element)?;
        }
        Ok(())
    }
}

impl FromStr for PathAddress {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut elements = Vec::new();
        for segment in s.trim().split('/').filter(|seg| !seg.is_empty()) {
            let (key, value) = segment
                .split_once('=')
                .ok_or_else(|| AddressParseError::MalformedElement(segment.to_string()))?;
            if key.is_empty() || value.is_empty() {
                return Err(AddressParseError::MalformedElement(segment.to_string()));
            }
            elements.push(PathElement::new(key, value));
        }
        Ok(Self(elements))
    }
}

impl TryFrom<String> for PathAddress {
    type Error = AddressParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PathAddress> for String {
    fn from(address: PathAddress) -> Self {
        address.to_string()
    }
}

impl FromIterator<PathElement> for PathAddress {
    fn from_iter<T: IntoIterator<Item = PathElement>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
