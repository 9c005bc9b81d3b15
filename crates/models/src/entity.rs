use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Prefix carried by every locally generated identifier
pub const DRAFT_PREFIX: &str = "temp";

/// Identifier issued by the remote store once an entity is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RemoteId(pub i64);

impl RemoteId {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for RemoteId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.0)
    }
}

// The store returns ids as numbers from some routes and as numeric strings from others.
impl<'de> Deserialize<'de> for RemoteId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(RemoteId(n)),
            Raw::Text(s) => s
                .trim()
                .parse::<i64>()
                .map(RemoteId)
                .map_err(|_| serde::de::Error::custom(format!("invalid remote id: {}", s))),
        }
    }
}

/// Identifier of an entity that only exists on this side of the wire
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct LocalId(String);

impl LocalId {
    /// Wrap a generated identifier. Returns `None` unless it carries the draft prefix.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.starts_with(DRAFT_PREFIX) {
            Some(Self(value))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for LocalId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        LocalId::new(value.as_str()).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "invalid draft id (expected `{}` prefix): {}",
                DRAFT_PREFIX, value
            ))
        })
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of an organization or member.
///
/// Drafts are created by user actions and become `Persisted` only after the
/// remote store confirms a create call. Every code path that talks to the
/// store matches on this enum instead of inspecting id strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Persisted(RemoteId),
    Draft(LocalId),
}

impl EntityId {
    pub fn is_draft(&self) -> bool {
        matches!(self, EntityId::Draft(_))
    }

    pub fn is_persisted(&self) -> bool {
        matches!(self, EntityId::Persisted(_))
    }

    pub fn remote(&self) -> Option<RemoteId> {
        match self {
            EntityId::Persisted(id) => Some(*id),
            EntityId::Draft(_) => None,
        }
    }

    /// Classify a textual id: draft-prefixed strings are drafts, integers are persisted.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Some(local) = LocalId::new(value) {
            return Some(EntityId::Draft(local));
        }
        value.parse::<i64>().ok().map(|n| EntityId::Persisted(RemoteId(n)))
    }
}

impl From<RemoteId> for EntityId {
    fn from(id: RemoteId) -> Self {
        EntityId::Persisted(id)
    }
}

impl From<LocalId> for EntityId {
    fn from(id: LocalId) -> Self {
        EntityId::Draft(id)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Persisted(id) => write!(f, "{}", id),
            EntityId::Draft(id) => write!(f, "{}", id),
        }
    }
}
