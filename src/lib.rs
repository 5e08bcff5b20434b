//! Leptos Kanban Widget
//!
//! Kanban boards with pointer drag-and-drop and optimistic reordering. The
//! host supplies flat board/column/card records and persistence hooks; the
//! widget applies each move to its local tree immediately and reconciles
//! against the host's next authoritative data push, reverting after a
//! timeout if that push never matches.

pub mod commit;
pub mod components;
pub mod context;
pub mod drag;
pub mod models;
pub mod store;
pub mod tree;

pub use commit::{CardPosition, ChangePayload, CommitSink};
pub use components::{KanbanBoard, KanbanBoards};
pub use context::{KanbanContext, KanbanHooks};
pub use drag::{DragSession, HoverMark, ResolvedMove};
pub use models::{BoardRecord, BoardSource, CardRecord, CardSource, ColumnRecord, ColumnSource};
pub use store::{OptimisticStore, Reconciliation, DEFAULT_RECONCILE_TIMEOUT_MS};
pub use tree::{build_single, build_tree, Board, Card, Column, Tree};
