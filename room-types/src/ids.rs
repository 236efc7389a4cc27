//! Identity and ordering types for roomsync.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a client (one browser tab, one app instance).
///
/// Assigned by the sync runtime; opaque to mutators.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    /// Create a ClientId from an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Create a new random ClientId (UUID v4).
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClientId({})", self.0)
    }
}

impl From<&str> for ClientId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Identifier of a room: one isolated authoritative datastore.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Create a RoomId.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RoomId({})", self.0)
    }
}

impl From<&str> for RoomId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Identifier of an authenticated user.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Create a UserId.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserId({})", self.0)
    }
}

/// A monotonically increasing store version.
///
/// Bumped once per committed transaction that wrote at least one key.
/// Version zero is an empty store.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct Version(u64);

impl Version {
    /// Create a new Version with the given value.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the numeric value of this Version.
    pub fn value(&self) -> u64 {
        self.0
    }

    /// The version of a store nothing has been committed to.
    pub fn zero() -> Self {
        Self(0)
    }

    /// Increment the version by one.
    pub fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Version({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_id_random_is_uuid() {
        let id = ClientId::random();
        assert!(uuid::Uuid::parse_str(id.as_str()).is_ok());
    }

    #[test]
    fn client_ids_differ() {
        assert_ne!(ClientId::random(), ClientId::random());
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let room = RoomId::new("lobby");
        assert_eq!(serde_json::to_string(&room).unwrap(), "\"lobby\"");

        let client: ClientId = serde_json::from_str("\"c-1\"").unwrap();
        assert_eq!(client.as_str(), "c-1");
    }

    #[test]
    fn id_debug_shows_value() {
        assert_eq!(format!("{:?}", RoomId::from("A")), "RoomId(A)");
        assert_eq!(format!("{:?}", UserId::new("u")), "UserId(u)");
    }

    #[test]
    fn version_ordering() {
        let v1 = Version::new(1);
        let v2 = Version::new(2);
        assert!(v1 < v2);
        assert_eq!(v1.next(), v2);
    }

    #[test]
    fn version_zero_is_default() {
        assert_eq!(Version::default(), Version::zero());
    }

    #[test]
    fn version_saturating_add() {
        let v = Version::new(u64::MAX);
        assert_eq!(v.next().value(), u64::MAX);
    }
}
