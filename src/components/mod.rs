//! UI Components
//!
//! Presentation adapter over the headless core: board surfaces, columns,
//! and cards, wired to the pointer-dnd signals.

mod board_view;
mod card_view;
mod column_view;

pub use board_view::{BoardLanes, KanbanBoard, KanbanBoards};
pub use card_view::CardView;
pub use column_view::ColumnView;
