//! Declarative markers attached to units and their members
//!
//! The set of marker kinds is closed: discovery never goes through string
//! lookups at runtime, and a descriptor naming an unknown kind is rejected
//! when it is parsed.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of a declarative marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    /// The unit whose entry method boots the application
    EntryPoint,
    /// A method that receives dispatched events or messages
    EventListener,
    /// A type whose listener methods are registered with the event bus
    EventSubscriber,
    /// A plain data type constructed by generated glue
    DataObject,
    /// A resource parser; the marker value names the produced value type
    Parser,
}

impl MarkerKind {
    /// Every marker kind, in declaration order
    pub const ALL: [MarkerKind; 5] = [
        MarkerKind::EntryPoint,
        MarkerKind::EventListener,
        MarkerKind::EventSubscriber,
        MarkerKind::DataObject,
        MarkerKind::Parser,
    ];

    /// Identifier used in unit descriptors
    pub fn as_str(self) -> &'static str {
        match self {
            MarkerKind::EntryPoint => "entry_point",
            MarkerKind::EventListener => "event_listener",
            MarkerKind::EventSubscriber => "event_subscriber",
            MarkerKind::DataObject => "data_object",
            MarkerKind::Parser => "parser",
        }
    }
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A marker instance, optionally carrying a declared value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    pub kind: MarkerKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Marker {
    pub fn new(kind: MarkerKind) -> Self {
        Self { kind, value: None }
    }

    pub fn with_value(kind: MarkerKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: Some(value.into()),
        }
    }
}

impl From<MarkerKind> for Marker {
    fn from(kind: MarkerKind) -> Self {
        Marker::new(kind)
    }
}
