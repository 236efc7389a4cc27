//! Validated authentication payload.
//!
//! The sync runtime hands mutators an untyped auth value produced by the
//! application's auth handler. Mutators that depend on it go through
//! [`AuthData::from_value`] so a missing or malformed payload fails with a
//! typed error instead of being read blindly.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{MutatorError, RoomId, UserId};

/// Authentication data attached to a transaction.
///
/// Wire shape: `{ "userID": "...", "roomID": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthData {
    /// Authenticated user.
    #[serde(rename = "userID")]
    pub user_id: UserId,
    /// Room the connection is bound to.
    #[serde(rename = "roomID")]
    pub room_id: RoomId,
}

impl AuthData {
    /// Create auth data for a user in a room.
    pub fn new(user_id: UserId, room_id: RoomId) -> Self {
        Self { user_id, room_id }
    }

    /// Validate a raw auth payload.
    ///
    /// `None` and JSON `null` are reported as [`MutatorError::MissingAuth`];
    /// anything else that is not an object with non-empty string `userID`
    /// and `roomID` fields is [`MutatorError::InvalidAuth`].
    pub fn from_value(value: Option<&Value>) -> Result<Self, MutatorError> {
        let value = match value {
            None | Some(Value::Null) => return Err(MutatorError::MissingAuth),
            Some(v) => v,
        };

        let object = value.as_object().ok_or_else(|| MutatorError::InvalidAuth {
            field: "auth".to_string(),
            reason: "expected an object".to_string(),
        })?;

        Ok(Self {
            user_id: UserId::new(required_str(object, "userID")?),
            room_id: RoomId::new(required_str(object, "roomID")?),
        })
    }

    /// Convert to the raw payload form carried by transactions.
    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "userID": self.user_id.as_str(),
            "roomID": self.room_id.as_str(),
        })
    }
}

fn required_str<'a>(object: &'a Map<String, Value>, field: &str) -> Result<&'a str, MutatorError> {
    match object.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s),
        Some(Value::String(_)) => Err(MutatorError::InvalidAuth {
            field: field.to_string(),
            reason: "must not be empty".to_string(),
        }),
        Some(_) => Err(MutatorError::InvalidAuth {
            field: field.to_string(),
            reason: "expected a string".to_string(),
        }),
        None => Err(MutatorError::InvalidAuth {
            field: field.to_string(),
            reason: "missing".to_string(),
        }),
    }
}
