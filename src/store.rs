//! Optimistic State Store
//!
//! Holds the authoritative tree plus an optional pending override created
//! by a committed move. The pending tree is cleared when a rebuilt
//! authoritative tree structurally matches it, or when the reconciliation
//! timeout fires, whichever comes first. Also owns the cached-presentation
//! map that bridges a moved card's markup until the next authoritative
//! render.
//!
//! Timer scheduling is the caller's job (see `context::schedule_expiry`);
//! this module stays free of web APIs so it tests off-wasm.

use std::collections::HashMap;

use crate::tree::Tree;

/// How long a pending tree may outlive its commit without a matching
/// authoritative rebuild. Tunable per widget instance.
pub const DEFAULT_RECONCILE_TIMEOUT_MS: u32 = 3000;

/// Outcome of an authoritative rebuild
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// No pending override existed
    NoPending,
    /// Authoritative state caught up; pending override cleared
    Converged,
    /// Pending kept; caller should restart the timeout for this generation
    Diverged { generation: u64 },
}

struct Pending<K> {
    tree: Tree<K>,
    generation: u64,
}

/// Authoritative + optional pending tree, plus cached card markup
pub struct OptimisticStore<K> {
    authoritative: Tree<K>,
    pending: Option<Pending<K>>,
    cached_content: HashMap<String, String>,
    generation: u64,
}

impl<K: Clone> Default for OptimisticStore<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone> OptimisticStore<K> {
    pub fn new() -> Self {
        OptimisticStore {
            authoritative: Tree::empty(),
            pending: None,
            cached_content: HashMap::new(),
            generation: 0,
        }
    }

    /// The tree the UI should display right now
    pub fn current_tree(&self) -> &Tree<K> {
        match &self.pending {
            Some(p) => &p.tree,
            None => &self.authoritative,
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Install a freshly built authoritative tree and reconcile any pending
    /// override against it
    pub fn set_authoritative(&mut self, tree: Tree<K>) -> Reconciliation {
        self.authoritative = tree;
        match &self.pending {
            None => Reconciliation::NoPending,
            Some(p) if trees_match(&p.tree, &self.authoritative) => {
                self.clear_pending();
                Reconciliation::Converged
            }
            Some(_) => {
                // Restart the timeout under a fresh generation; the old
                // timer becomes a no-op
                self.generation += 1;
                let generation = self.generation;
                if let Some(p) = &mut self.pending {
                    p.generation = generation;
                }
                Reconciliation::Diverged { generation }
            }
        }
    }

    /// Install a new pending tree after a move. Returns the generation the
    /// caller should schedule the timeout under; any earlier timer is
    /// implicitly cancelled.
    pub fn commit_pending(&mut self, tree: Tree<K>) -> u64 {
        self.generation += 1;
        self.pending = Some(Pending { tree, generation: self.generation });
        self.generation
    }

    /// Timeout firing: drop the pending override unless it has been
    /// replaced or reconciled since the timer was scheduled. Returns
    /// whether anything was cleared.
    pub fn expire_pending(&mut self, generation: u64) -> bool {
        if self.pending.as_ref().is_some_and(|p| p.generation == generation) {
            self.clear_pending();
            true
        } else {
            false
        }
    }

    /// Commit-failure revert: back to last known good authoritative state
    pub fn discard_pending(&mut self) {
        self.clear_pending();
    }

    /// Snapshot a card's presentation markup for the gap between the
    /// optimistic move and the next authoritative render
    pub fn cache_content(&mut self, card_id: &str, markup: String) {
        self.cached_content.insert(card_id.to_string(), markup);
    }

    pub fn cached_content(&self, card_id: &str) -> Option<&str> {
        self.cached_content.get(card_id).map(|s| s.as_str())
    }

    fn clear_pending(&mut self) {
        self.pending = None;
        self.cached_content.clear();
    }
}

/// Structural match: for every column in the pending tree the authoritative
/// tree's same-id column holds the same ordered card-id sequence, and every
/// pending board's ordered column-id sequence matches one level up.
fn trees_match<K>(pending: &Tree<K>, authoritative: &Tree<K>) -> bool {
    for board in &pending.boards {
        let Some(auth_board) = authoritative.boards.iter().find(|b| b.id == board.id) else {
            return false;
        };
        let pending_cols: Vec<&str> = board.columns.iter().map(|c| c.id.as_str()).collect();
        let auth_cols: Vec<&str> = auth_board.columns.iter().map(|c| c.id.as_str()).collect();
        if pending_cols != auth_cols {
            return false;
        }
        for column in &board.columns {
            let Some(auth_col) = auth_board.columns.iter().find(|c| c.id == column.id) else {
                return false;
            };
            let pending_ids: Vec<&str> = column.cards.iter().map(|c| c.id.as_str()).collect();
            let auth_ids: Vec<&str> = auth_col.cards.iter().map(|c| c.id.as_str()).collect();
            if pending_ids != auth_ids {
                return false;
            }
        }
    }
    true
}

/// Apply one card move to a tree, returning a new tree. Never mutates the
/// input; any missing id makes this a silent no-op (stale drag targets are
/// expected when data changes mid-gesture, not errors).
pub fn apply_move<K: Clone>(
    tree: &Tree<K>,
    card_id: &str,
    source_column_id: &str,
    target_column_id: &str,
    target_index: Option<usize>,
) -> Tree<K> {
    let mut next = tree.clone();

    if next.find_column(target_column_id).is_none() {
        return next;
    }
    let Some(source) = next.find_column_mut(source_column_id) else {
        return next;
    };
    let Some(pos) = source.position_of(card_id) else {
        return next;
    };
    let mut card = source.cards.remove(pos);

    // Re-key so keyed views treat the card as new in its destination;
    // identity (id, source) is unchanged
    card.display_key.push_str("::");
    card.display_key.push_str(target_column_id);

    // Target existence was checked above; source may have been the same
    // column, so look it up only now that the card is out
    if let Some(target) = next.find_column_mut(target_column_id) {
        let at = match target_index {
            Some(i) => i.min(target.cards.len()),
            None => target.cards.len(),
        };
        target.cards.insert(at, card);
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CardRecord, ColumnRecord};
    use crate::tree::build_single;

    fn make_column(id: &str, order: f64) -> ColumnRecord {
        ColumnRecord {
            id: id.to_string(),
            board_id: String::new(),
            title: id.to_string(),
            order,
        }
    }

    fn make_card(id: &str, column_id: &str, order: f64) -> CardRecord {
        CardRecord {
            id: id.to_string(),
            column_id: column_id.to_string(),
            order,
            content: format!("<p>{}</p>", id),
        }
    }

    fn two_column_tree() -> Tree<CardRecord> {
        let columns = vec![make_column("todo", 0.0), make_column("done", 1.0)];
        let cards = vec![
            make_card("cardA", "todo", 0.0),
            make_card("cardB", "todo", 1.0),
        ];
        build_single(&columns, &cards)
    }

    fn card_ids(tree: &Tree<CardRecord>, column: &str) -> Vec<String> {
        tree.find_column(column)
            .map(|c| c.cards.iter().map(|card| card.id.clone()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_cross_column_move() {
        let tree = two_column_tree();
        let moved = apply_move(&tree, "cardA", "todo", "done", None);

        assert_eq!(card_ids(&moved, "todo"), vec!["cardB"]);
        assert_eq!(card_ids(&moved, "done"), vec!["cardA"]);
        // Input untouched
        assert_eq!(card_ids(&tree, "todo"), vec!["cardA", "cardB"]);
    }

    #[test]
    fn test_move_clamps_index() {
        let tree = two_column_tree();
        let moved = apply_move(&tree, "cardA", "todo", "done", Some(99));
        assert_eq!(card_ids(&moved, "done"), vec!["cardA"]);
    }

    #[test]
    fn test_same_column_reorder_preserves_others() {
        let columns = vec![make_column("todo", 0.0)];
        let cards = vec![
            make_card("a", "todo", 0.0),
            make_card("b", "todo", 1.0),
            make_card("c", "todo", 2.0),
        ];
        let tree = build_single(&columns, &cards);

        let moved = apply_move(&tree, "c", "todo", "todo", Some(0));
        assert_eq!(card_ids(&moved, "todo"), vec!["c", "a", "b"]);

        let moved = apply_move(&tree, "a", "todo", "todo", Some(2));
        assert_eq!(card_ids(&moved, "todo"), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_move_rekeys_card() {
        let tree = two_column_tree();
        let moved = apply_move(&tree, "cardA", "todo", "done", None);
        let card = moved.find_card("cardA").unwrap();
        assert_eq!(card.display_key, "cardA::done");
        assert_eq!(card.id, "cardA");
        assert_eq!(card.source.id, "cardA");
    }

    #[test]
    fn test_missing_ids_are_silent_noops() {
        let tree = two_column_tree();
        assert_eq!(apply_move(&tree, "ghost", "todo", "done", None), tree);
        assert_eq!(apply_move(&tree, "cardA", "ghost", "done", None), tree);
        assert_eq!(apply_move(&tree, "cardA", "todo", "ghost", None), tree);
    }

    #[test]
    fn test_reconciliation_converges_on_match() {
        let mut store = OptimisticStore::new();
        store.set_authoritative(two_column_tree());

        let moved = apply_move(store.current_tree(), "cardA", "todo", "done", None);
        store.cache_content("cardA", "<p>cardA</p>".into());
        store.commit_pending(moved);
        assert!(store.has_pending());

        // Authoritative rebuild now reflects the move
        let columns = vec![make_column("todo", 0.0), make_column("done", 1.0)];
        let cards = vec![
            make_card("cardB", "todo", 0.0),
            make_card("cardA", "done", 0.0),
        ];
        let outcome = store.set_authoritative(build_single(&columns, &cards));

        assert_eq!(outcome, Reconciliation::Converged);
        assert!(!store.has_pending());
        assert_eq!(store.cached_content("cardA"), None);
        assert_eq!(card_ids(store.current_tree(), "done"), vec!["cardA"]);
    }

    #[test]
    fn test_reconciliation_diverged_keeps_pending() {
        let mut store = OptimisticStore::new();
        store.set_authoritative(two_column_tree());

        let moved = apply_move(store.current_tree(), "cardA", "todo", "done", None);
        store.commit_pending(moved);

        // Stale rebuild: still the pre-move layout
        let outcome = store.set_authoritative(two_column_tree());
        let generation = match outcome {
            Reconciliation::Diverged { generation } => generation,
            other => panic!("expected Diverged, got {:?}", other),
        };
        assert!(store.has_pending());
        assert_eq!(card_ids(store.current_tree(), "done"), vec!["cardA"]);

        // Timeout fires: revert to the stale authoritative layout
        store.expire_pending(generation);
        assert!(!store.has_pending());
        assert_eq!(card_ids(store.current_tree(), "todo"), vec!["cardA", "cardB"]);
    }

    #[test]
    fn test_stale_timer_generation_is_ignored() {
        let mut store = OptimisticStore::new();
        store.set_authoritative(two_column_tree());

        let first = store.commit_pending(apply_move(
            store.current_tree(),
            "cardA",
            "todo",
            "done",
            None,
        ));
        // A second move replaces the pending tree wholesale
        let moved = apply_move(store.current_tree(), "cardB", "todo", "done", None);
        store.commit_pending(moved);

        // The first commit's timer must not clear the newer pending state
        store.expire_pending(first);
        assert!(store.has_pending());
        assert_eq!(card_ids(store.current_tree(), "done"), vec!["cardA", "cardB"]);
    }

    #[test]
    fn test_current_tree_prefers_pending() {
        let mut store = OptimisticStore::new();
        store.set_authoritative(two_column_tree());
        assert_eq!(card_ids(store.current_tree(), "todo"), vec!["cardA", "cardB"]);

        let moved = apply_move(store.current_tree(), "cardA", "todo", "done", None);
        store.commit_pending(moved);
        assert_eq!(card_ids(store.current_tree(), "todo"), vec!["cardB"]);

        store.discard_pending();
        assert_eq!(card_ids(store.current_tree(), "todo"), vec!["cardA", "cardB"]);
    }

    #[test]
    fn test_match_requires_same_column_layout() {
        let mut store = OptimisticStore::new();
        store.set_authoritative(two_column_tree());
        let moved = apply_move(store.current_tree(), "cardA", "todo", "done", None);
        store.commit_pending(moved);

        // Card layout matches but a pending column is gone
        let columns = vec![make_column("done", 1.0)];
        let cards = vec![make_card("cardA", "done", 0.0)];
        let outcome = store.set_authoritative(build_single(&columns, &cards));
        assert!(matches!(outcome, Reconciliation::Diverged { .. }));
    }
}
