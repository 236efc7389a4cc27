//! Per-client presence records.

use serde::{Deserialize, Serialize};

use crate::ClientId;

/// A pointer position in room coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Position {
    /// Create a position.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Display information for the user behind a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    /// Display name.
    pub name: String,
    /// Avatar URL or emoji.
    #[serde(default)]
    pub avatar: String,
    /// Cursor color, CSS syntax.
    pub color: String,
}

impl Default for UserInfo {
    fn default() -> Self {
        Self {
            name: "Anonymous".to_string(),
            avatar: String::new(),
            color: "#808080".to_string(),
        }
    }
}

/// Presence state of one client.
///
/// Wire shape: `{ "id", "cursor": { "x", "y" }, "userInfo" }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientState {
    /// Client this record belongs to.
    pub id: ClientId,
    /// Last reported cursor position.
    pub cursor: Position,
    /// Who is behind the client.
    #[serde(default)]
    pub user_info: UserInfo,
}

impl ClientState {
    /// A fresh record with the cursor at the origin.
    pub fn new(id: ClientId, user_info: UserInfo) -> Self {
        Self {
            id,
            cursor: Position::default(),
            user_info,
        }
    }

    /// Merge a partial update into this record.
    pub fn apply(mut self, update: ClientStateUpdate) -> Self {
        if let Some(cursor) = update.cursor {
            self.cursor = cursor;
        }
        if let Some(user_info) = update.user_info {
            self.user_info = user_info;
        }
        self
    }
}

/// Partial update of a [`ClientState`]; `None` fields are left untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClientStateUpdate {
    /// Client whose record is updated.
    pub id: ClientId,
    /// New cursor, if changed.
    pub cursor: Option<Position>,
    /// New user info, if changed.
    pub user_info: Option<UserInfo>,
}

impl ClientStateUpdate {
    /// An update that only moves the cursor.
    pub fn cursor(id: ClientId, cursor: Position) -> Self {
        Self {
            id,
            cursor: Some(cursor),
            user_info: None,
        }
    }
}
