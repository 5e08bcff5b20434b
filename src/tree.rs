//! Entity Tree Builder
//!
//! Builds the ordered Board -> Column -> Card tree from the host's flat
//! record collections. Pure: identical inputs produce structurally equal
//! trees, which is what reconciliation in `store` compares against.

use crate::models::{BoardSource, CardSource, ColumnSource};

/// A card positioned inside a column
#[derive(Debug, Clone, PartialEq)]
pub struct Card<K> {
    pub id: String,
    /// View key; rewritten on every cross-column move so keyed lists
    /// remount the card in its destination column
    pub display_key: String,
    /// Opaque presentation markup
    pub content: String,
    /// Sort key from the source record; only establishes initial position
    pub order: f64,
    /// Back-reference to the record that produced this card
    pub source: K,
}

/// An ordered lane of cards
#[derive(Debug, Clone, PartialEq)]
pub struct Column<K> {
    pub id: String,
    pub title: String,
    pub order: f64,
    pub cards: Vec<Card<K>>,
}

/// An ordered group of columns
#[derive(Debug, Clone, PartialEq)]
pub struct Board<K> {
    pub id: String,
    pub title: String,
    pub order: f64,
    pub columns: Vec<Column<K>>,
}

/// The full widget tree. Single-board mode uses one implicit board with an
/// empty id and title.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree<K> {
    pub boards: Vec<Board<K>>,
}

impl<K> Column<K> {
    /// Index of a card within this column
    pub fn position_of(&self, card_id: &str) -> Option<usize> {
        self.cards.iter().position(|c| c.id == card_id)
    }
}

impl<K> Tree<K> {
    pub fn empty() -> Self {
        Tree { boards: Vec::new() }
    }

    /// Find a column by id, searching every board
    pub fn find_column(&self, column_id: &str) -> Option<&Column<K>> {
        self.boards
            .iter()
            .flat_map(|b| b.columns.iter())
            .find(|c| c.id == column_id)
    }

    pub fn find_column_mut(&mut self, column_id: &str) -> Option<&mut Column<K>> {
        self.boards
            .iter_mut()
            .flat_map(|b| b.columns.iter_mut())
            .find(|c| c.id == column_id)
    }

    /// The column currently holding a card, searching every board
    pub fn column_of_card(&self, card_id: &str) -> Option<&Column<K>> {
        self.boards
            .iter()
            .flat_map(|b| b.columns.iter())
            .find(|c| c.cards.iter().any(|card| card.id == card_id))
    }

    pub fn find_card(&self, card_id: &str) -> Option<&Card<K>> {
        self.boards
            .iter()
            .flat_map(|b| b.columns.iter())
            .flat_map(|c| c.cards.iter())
            .find(|card| card.id == card_id)
    }
}

/// Build the multi-board tree from flat record collections
pub fn build_tree<B, C, K>(boards: &[B], columns: &[C], cards: &[K]) -> Tree<K>
where
    B: BoardSource,
    C: ColumnSource,
    K: CardSource,
{
    let mut out: Vec<Board<K>> = boards
        .iter()
        .map(|b| Board {
            id: b.id().unwrap_or_default(),
            title: b.title(),
            order: b.sort_key().unwrap_or(0.0),
            columns: Vec::new(),
        })
        .collect();
    // Vec::sort_by is stable, so equal keys keep input order
    out.sort_by(|a, b| a.order.total_cmp(&b.order));
    for board in &mut out {
        board.columns = build_columns(columns, cards, Some(&board.id));
    }
    Tree { boards: out }
}

/// Build a single-board tree: the column collection is top-level and board
/// parentage is not consulted
pub fn build_single<C, K>(columns: &[C], cards: &[K]) -> Tree<K>
where
    C: ColumnSource,
    K: CardSource,
{
    Tree {
        boards: vec![Board {
            id: String::new(),
            title: String::new(),
            order: 0.0,
            columns: build_columns(columns, cards, None),
        }],
    }
}

fn build_columns<C, K>(columns: &[C], cards: &[K], board_id: Option<&str>) -> Vec<Column<K>>
where
    C: ColumnSource,
    K: CardSource,
{
    let mut out: Vec<Column<K>> = columns
        .iter()
        .filter(|c| match board_id {
            Some(bid) => c.board_id().unwrap_or_default() == bid,
            None => true,
        })
        .map(|c| Column {
            id: c.id().unwrap_or_default(),
            title: c.title(),
            order: c.sort_key().unwrap_or(0.0),
            cards: Vec::new(),
        })
        .collect();
    out.sort_by(|a, b| a.order.total_cmp(&b.order));
    for column in &mut out {
        column.cards = build_cards(cards, &column.id);
    }
    out
}

fn build_cards<K: CardSource>(cards: &[K], column_id: &str) -> Vec<Card<K>> {
    let mut out: Vec<Card<K>> = cards
        .iter()
        .filter(|k| k.column_id().unwrap_or_default() == column_id)
        .map(|k| {
            let id = k.id().unwrap_or_default();
            Card {
                display_key: id.clone(),
                id,
                content: k.content(),
                order: k.sort_key().unwrap_or(0.0),
                source: k.clone(),
            }
        })
        .collect();
    out.sort_by(|a, b| a.order.total_cmp(&b.order));
    out
}
