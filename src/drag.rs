//! Drag Session Tracker
//!
//! State machine over a single drag gesture. Each event reads the currently
//! displayed tree fresh, so authoritative rebuilds mid-drag cannot desync
//! hover computation. Column lookups always span every board; a cross-board
//! move is just a column id change.

use leptos_pointer_dnd::DropTarget;

use crate::tree::Tree;

/// Live hover annotation for insertion-point feedback
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoverMark {
    /// Card would move into this column, no specific index
    IntoColumn { column_id: String },
    /// Card would be inserted after this card
    AfterCard { column_id: String, card_id: String },
}

/// A drop resolved to a concrete destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMove {
    pub card_id: String,
    pub source_column_id: String,
    pub target_column_id: String,
    /// None means end-of-list
    pub target_index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ActiveDrag {
    card_id: String,
}

/// Per-gesture drag state: Idle -> Dragging (with hover annotation) -> Idle
#[derive(Debug, Default)]
pub struct DragSession {
    active: Option<ActiveDrag>,
    hover: Option<HoverMark>,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    pub fn dragged_card_id(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.card_id.as_str())
    }

    pub fn hover(&self) -> Option<&HoverMark> {
        self.hover.as_ref()
    }

    /// Begin a gesture. Ignored if the card is not in the displayed tree.
    pub fn on_drag_start<K>(&mut self, tree: &Tree<K>, card_id: &str) {
        if tree.column_of_card(card_id).is_none() {
            return;
        }
        self.active = Some(ActiveDrag { card_id: card_id.to_string() });
        self.hover = None;
    }

    /// Update the hover annotation from the current drop target
    pub fn on_drag_over<K>(&mut self, tree: &Tree<K>, target: Option<&DropTarget>) {
        let Some(active) = &self.active else {
            return;
        };
        let Some(current) = tree.column_of_card(&active.card_id) else {
            self.hover = None;
            return;
        };
        self.hover = match target {
            Some(DropTarget::Column(column_id)) if *column_id != current.id => {
                Some(HoverMark::IntoColumn { column_id: column_id.clone() })
            }
            Some(DropTarget::Card(card_id)) => match tree.column_of_card(card_id) {
                // Same-column card hover gets no mark; the sortable list
                // itself is the visual feedback there
                Some(col) if col.id != current.id => Some(HoverMark::AfterCard {
                    column_id: col.id.clone(),
                    card_id: card_id.clone(),
                }),
                _ => None,
            },
            _ => None,
        };
    }

    /// Finish the gesture, resolving the drop target to a destination.
    /// Returns a move only when it would actually change the tree; always
    /// returns the session to idle.
    pub fn on_drag_end<K>(&mut self, tree: &Tree<K>, target: Option<&DropTarget>) -> Option<ResolvedMove> {
        let active = self.active.take()?;
        self.hover = None;

        let target = target?;
        let current = tree.column_of_card(&active.card_id)?;
        let source_column_id = current.id.clone();
        let current_index = current.position_of(&active.card_id)?;

        let (target_column_id, target_index) = match target {
            DropTarget::Card(over_id) => match tree.column_of_card(over_id) {
                Some(col) if col.id != source_column_id => {
                    // Insert-after for cross-column drops
                    let pos = col.position_of(over_id)?;
                    (col.id.clone(), Some(pos + 1))
                }
                Some(col) => {
                    // Exact position for same-column reorders
                    let pos = col.position_of(over_id)?;
                    (col.id.clone(), Some(pos))
                }
                // Card vanished between hover and drop: fall back to the
                // source column, which resolves to a no-op below
                None => (source_column_id.clone(), None),
            },
            DropTarget::Column(column_id) => match tree.find_column(column_id) {
                Some(col) => (col.id.clone(), None),
                None => (source_column_id.clone(), None),
            },
        };

        // Idempotence guard: emit only a move that changes membership or
        // position
        let changes_column = target_column_id != source_column_id;
        let changes_index = matches!(target_index, Some(i) if i != current_index);
        if !changes_column && !changes_index {
            return None;
        }

        Some(ResolvedMove {
            card_id: active.card_id,
            source_column_id,
            target_column_id,
            target_index,
        })
    }
}
