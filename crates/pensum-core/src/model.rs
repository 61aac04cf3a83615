//! Course and relation model shared by every pensum crate.
//!
//! # Identity
//!
//! A [`CourseId`] is the only identity a course ever has. It comes from the
//! catalog service and is never regenerated, hashed or randomized, so the
//! same input always produces the same graph, the same dense indices and the
//! same render descriptors.
//!
//! Catalogs mix numeric primary keys (`42`) and textual codes (`"MAT-101"`).
//! Both are accepted. A string made only of canonical decimal digits (`"42"`)
//! is the same id as the number `42`; this keeps JSON object keys (always
//! strings) and JSON values (numbers) pointing at the same course.
//!
//! # Ordering
//!
//! Numeric ids sort before textual ids; numeric ids compare by value and
//! textual ids lexicographically. Every traversal in pensum visits courses in
//! this order, which is what makes cycle reports and levels reproducible.

#![allow(clippy::module_name_repetitions)]

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ---------------------------------------------------------------------------
// CourseId
// ---------------------------------------------------------------------------

/// Stable course identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CourseId {
    /// Numeric primary key from the catalog.
    Numeric(u64),
    /// Textual identifier (course code or opaque key).
    Text(String),
}

impl CourseId {
    /// Build a textual id, folding canonical decimal strings into
    /// [`CourseId::Numeric`]. Surrounding whitespace is dropped.
    #[must_use]
    pub fn text(raw: impl Into<String>) -> Self {
        let mut raw = raw.into();
        if raw.trim().len() != raw.len() {
            raw = raw.trim().to_string();
        }
        match raw.parse::<u64>() {
            Ok(n) if n.to_string() == raw => Self::Numeric(n),
            _ => Self::Text(raw),
        }
    }

    /// Returns the numeric value when this id is numeric.
    #[must_use]
    pub const fn as_numeric(&self) -> Option<u64> {
        match self {
            Self::Numeric(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

impl From<u64> for CourseId {
    fn from(value: u64) -> Self {
        Self::Numeric(value)
    }
}

impl From<u32> for CourseId {
    fn from(value: u32) -> Self {
        Self::Numeric(u64::from(value))
    }
}

impl From<&str> for CourseId {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<String> for CourseId {
    fn from(value: String) -> Self {
        Self::text(value)
    }
}

impl FromStr for CourseId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::text(s))
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl Serialize for CourseId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Numeric(n) => serializer.serialize_u64(*n),
            Self::Text(s) => serializer.serialize_str(s),
        }
    }
}

struct CourseIdVisitor;

impl Visitor<'_> for CourseIdVisitor {
    type Value = CourseId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative integer or a non-empty string course id")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(CourseId::Numeric(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        u64::try_from(v)
            .map(CourseId::Numeric)
            .map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        if v.trim().is_empty() {
            return Err(E::invalid_value(de::Unexpected::Str(v), &self));
        }
        Ok(CourseId::text(v))
    }
}

impl<'de> Deserialize<'de> for CourseId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(CourseIdVisitor)
    }
}

// ---------------------------------------------------------------------------
// Course
// ---------------------------------------------------------------------------

/// A course as delivered by the catalog collaborator.
///
/// Immutable once added to a graph: a later course with the same `id` is
/// ignored, so the first-seen attributes win.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub credits: u32,
    /// Term (trimester/semester number) the course is scheduled in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term: Option<u32>,
    /// Accumulated credits required before enrolling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_credits: Option<u32>,
}

impl Course {
    /// Create a course with no term and no credit requirement.
    #[must_use]
    pub fn new(
        id: impl Into<CourseId>,
        code: impl Into<String>,
        name: impl Into<String>,
        credits: u32,
    ) -> Self {
        Self {
            id: id.into(),
            code: code.into(),
            name: name.into(),
            credits,
            term: None,
            required_credits: None,
        }
    }

    /// Builder-style setter for the scheduled term.
    #[must_use]
    pub const fn with_term(mut self, term: u32) -> Self {
        self.term = Some(term);
        self
    }

    /// Builder-style setter for the credit requirement.
    #[must_use]
    pub const fn with_required_credits(mut self, credits: u32) -> Self {
        self.required_credits = Some(credits);
        self
    }

    /// Multi-line label shown inside a diagram node.
    ///
    /// ```text
    /// MAT-101
    /// Calculus I
    /// (Term 2)
    /// ```
    #[must_use]
    pub fn display_label(&self) -> String {
        match self.term {
            Some(term) => format!("{}\n{}\n(Term {term})", self.code, self.name),
            None => format!("{}\n{}", self.code, self.name),
        }
    }
}

// ---------------------------------------------------------------------------
// Relations
// ---------------------------------------------------------------------------

/// Kind of requirement between two courses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    /// `from` must be completed before `to`.
    Prerequisite,
    /// Both courses are taken in the same term. Unordered.
    Corequisite,
}

impl RelationKind {
    /// Only prerequisites have a direction.
    #[must_use]
    pub const fn is_directional(self) -> bool {
        matches!(self, Self::Prerequisite)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Prerequisite => "prerequisite",
            Self::Corequisite => "corequisite",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed (prerequisite) or unordered (corequisite) relation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relation {
    pub from: CourseId,
    pub to: CourseId,
    pub kind: RelationKind,
}

impl Relation {
    #[must_use]
    pub fn prerequisite(from: impl Into<CourseId>, to: impl Into<CourseId>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind: RelationKind::Prerequisite,
        }
    }

    #[must_use]
    pub fn corequisite(a: impl Into<CourseId>, b: impl Into<CourseId>) -> Self {
        Self {
            from: a.into(),
            to: b.into(),
            kind: RelationKind::Corequisite,
        }
    }

}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            RelationKind::Prerequisite => write!(f, "{} → {}", self.from, self.to),
            RelationKind::Corequisite => write!(f, "{} ~ {}", self.from, self.to),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
