//! Record Capability Interface
//!
//! Traits the host implements over its own board/column/card records, plus
//! ready-made serde structs for hosts whose data is already plain JSON.
//!
//! Accessors return `Option` so absent fields pass through as defaults
//! (empty id, sort key 0) instead of dropping the record; validation stays
//! with the host data layer.

use serde::{Deserialize, Serialize};

/// Accessors for an external board record
pub trait BoardSource: Clone + PartialEq + Send + Sync + 'static {
    fn id(&self) -> Option<String>;
    fn sort_key(&self) -> Option<f64>;
    /// Opaque title content
    fn title(&self) -> String;
}

/// Accessors for an external column record
pub trait ColumnSource: Clone + PartialEq + Send + Sync + 'static {
    fn id(&self) -> Option<String>;
    /// Id of the owning board (ignored in single-board mode)
    fn board_id(&self) -> Option<String>;
    fn sort_key(&self) -> Option<f64>;
    /// Opaque title content
    fn title(&self) -> String;
}

/// Accessors for an external card record
pub trait CardSource: Clone + PartialEq + Send + Sync + 'static {
    fn id(&self) -> Option<String>;
    /// Id of the owning column
    fn column_id(&self) -> Option<String>;
    fn sort_key(&self) -> Option<f64>;
    /// Opaque presentation markup for the card body
    fn content(&self) -> String;
}

/// Plain board record (matches a JSON data layer)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub order: f64,
}

/// Plain column record (matches a JSON data layer)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnRecord {
    pub id: String,
    #[serde(rename = "boardId", default)]
    pub board_id: String,
    pub title: String,
    #[serde(default)]
    pub order: f64,
}

/// Plain card record (matches a JSON data layer)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardRecord {
    pub id: String,
    #[serde(rename = "columnId")]
    pub column_id: String,
    #[serde(default)]
    pub order: f64,
    /// Rendered card body, passed through opaquely
    #[serde(default)]
    pub content: String,
}

impl BoardSource for BoardRecord {
    fn id(&self) -> Option<String> {
        Some(self.id.clone())
    }
    fn sort_key(&self) -> Option<f64> {
        Some(self.order)
    }
    fn title(&self) -> String {
        self.title.clone()
    }
}

impl ColumnSource for ColumnRecord {
    fn id(&self) -> Option<String> {
        Some(self.id.clone())
    }
    fn board_id(&self) -> Option<String> {
        Some(self.board_id.clone())
    }
    fn sort_key(&self) -> Option<f64> {
        Some(self.order)
    }
    fn title(&self) -> String {
        self.title.clone()
    }
}

impl CardSource for CardRecord {
    fn id(&self) -> Option<String> {
        Some(self.id.clone())
    }
    fn column_id(&self) -> Option<String> {
        Some(self.column_id.clone())
    }
    fn sort_key(&self) -> Option<f64> {
        Some(self.order)
    }
    fn content(&self) -> String {
        self.content.clone()
    }
}
