// src/models/target.rs
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The three kinds of listing a review can be attached to.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Business,
    Event,
    Service,
}

impl TargetKind {
    pub const ALL: [TargetKind; 3] = [TargetKind::Business, TargetKind::Event, TargetKind::Service];

    pub fn as_str(self) -> &'static str {
        match self {
            TargetKind::Business => "business",
            TargetKind::Event => "event",
            TargetKind::Service => "service",
        }
    }

    /// Plural path segment used by the listing routes (`/businesses/{id}/reviews`).
    pub fn collection(self) -> &'static str {
        match self {
            TargetKind::Business => "businesses",
            TargetKind::Event => "events",
            TargetKind::Service => "services",
        }
    }

    pub fn from_collection(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.collection() == segment)
    }

    pub fn with_id(self, id: i64) -> TargetRef {
        match self {
            TargetKind::Business => TargetRef::Business(id),
            TargetKind::Event => TargetRef::Event(id),
            TargetKind::Service => TargetRef::Service(id),
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            TargetKind::Business => "Business",
            TargetKind::Event => "Event",
            TargetKind::Service => "Service",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "business" => Ok(TargetKind::Business),
            "event" => Ok(TargetKind::Event),
            "service" => Ok(TargetKind::Service),
            _ => Err(()),
        }
    }
}

/// Exactly one listing a review belongs to.
///
/// Storage keeps three nullable foreign keys; they only exist at the
/// database and wire edge (see [`TargetColumns`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetRef {
    Business(i64),
    Event(i64),
    Service(i64),
}

impl TargetRef {
    pub fn kind(&self) -> TargetKind {
        match self {
            TargetRef::Business(_) => TargetKind::Business,
            TargetRef::Event(_) => TargetKind::Event,
            TargetRef::Service(_) => TargetKind::Service,
        }
    }

    pub fn id(&self) -> i64 {
        match *self {
            TargetRef::Business(id) | TargetRef::Event(id) | TargetRef::Service(id) => id,
        }
    }

    pub fn columns(&self) -> TargetColumns {
        let mut cols = TargetColumns::default();
        match *self {
            TargetRef::Business(id) => cols.business_id = Some(id),
            TargetRef::Event(id) => cols.event_id = Some(id),
            TargetRef::Service(id) => cols.service_id = Some(id),
        }
        cols
    }
}

impl fmt::Display for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind().label(), self.id())
    }
}

impl Serialize for TargetRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.columns().serialize(serializer)
    }
}

/// The three nullable target columns as stored and as sent to clients.
#[derive(Serialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TargetColumns {
    #[serde(rename = "businessID")]
    pub business_id: Option<i64>,
    #[serde(rename = "eventID")]
    pub event_id: Option<i64>,
    #[serde(rename = "serviceID")]
    pub service_id: Option<i64>,
}

impl TargetColumns {
    /// Rebuilds the tagged target; `None` unless exactly one column is set.
    pub fn into_target(self) -> Option<TargetRef> {
        match (self.business_id, self.event_id, self.service_id) {
            (Some(id), None, None) => Some(TargetRef::Business(id)),
            (None, Some(id), None) => Some(TargetRef::Event(id)),
            (None, None, Some(id)) => Some(TargetRef::Service(id)),
            _ => None,
        }
    }
}
