//! Move Commit Pipeline
//!
//! Turns a resolved move into the optimistic state update plus the two
//! external payloads, then pokes the host's commit trigger. The pipeline is
//! fire-and-forget toward the host: it never waits for a response, and any
//! sink failure reverts the optimistic state locally. Reconciliation in
//! `store` is what eventually aligns the UI either way.

use serde::Serialize;

use crate::drag::ResolvedMove;
use crate::store::{apply_move, OptimisticStore};

/// Point-in-time description of one committed move
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangePayload {
    #[serde(rename = "cardId")]
    pub card_id: String,
    #[serde(rename = "oldParentColumnId")]
    pub old_parent_column_id: String,
    #[serde(rename = "newParentColumnId")]
    pub new_parent_column_id: String,
}

/// One entry of the destination column's post-move order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardPosition {
    #[serde(rename = "cardId")]
    pub card_id: String,
    pub order: usize,
}

/// External-facing half of a committed move. Hosts with infallible hooks
/// can return `Ok(())` everywhere; see `context::HookSink`.
pub trait CommitSink {
    fn push_change(&mut self, change: ChangePayload) -> Result<(), String>;
    fn push_sort_order(&mut self, order: Vec<CardPosition>) -> Result<(), String>;
    /// Whether the commit trigger is currently invokable
    fn ready(&self) -> bool;
    fn trigger_commit(&mut self) -> Result<(), String>;
}

/// Run the full pipeline for one resolved move.
///
/// Returns the pending generation to schedule the reconciliation timeout
/// under, or `None` when a sink failed and the optimistic state was
/// reverted.
pub fn commit_move<K: Clone>(
    store: &mut OptimisticStore<K>,
    sink: &mut impl CommitSink,
    mv: &ResolvedMove,
) -> Option<u64> {
    // Snapshot presentation markup before any state change; a missing card
    // just means no cached fallback, not an error
    let snapshot = store.current_tree().find_card(&mv.card_id).map(|c| c.content.clone());
    if let Some(markup) = snapshot {
        store.cache_content(&mv.card_id, markup);
    }

    // Instantaneous visual update
    let moved = apply_move(
        store.current_tree(),
        &mv.card_id,
        &mv.source_column_id,
        &mv.target_column_id,
        mv.target_index,
    );
    let generation = store.commit_pending(moved);

    match push_payloads(store, sink, mv) {
        Ok(()) => Some(generation),
        Err(_) => {
            // Revert to last known good state; the host's own
            // confirmation path is the source of truth
            store.discard_pending();
            None
        }
    }
}

fn push_payloads<K: Clone>(
    store: &OptimisticStore<K>,
    sink: &mut impl CommitSink,
    mv: &ResolvedMove,
) -> Result<(), String> {
    sink.push_change(ChangePayload {
        card_id: mv.card_id.clone(),
        old_parent_column_id: mv.source_column_id.clone(),
        new_parent_column_id: mv.target_column_id.clone(),
    })?;

    let target = store
        .current_tree()
        .find_column(&mv.target_column_id)
        .ok_or_else(|| format!("target column {} missing after move", mv.target_column_id))?;
    let order: Vec<CardPosition> = target
        .cards
        .iter()
        .enumerate()
        .map(|(i, card)| CardPosition { card_id: card.id.clone(), order: i })
        .collect();
    sink.push_sort_order(order)?;

    if sink.ready() {
        sink.trigger_commit()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drag::ResolvedMove;
    use crate::models::{CardRecord, ColumnRecord};
    use crate::tree::build_single;

    #[derive(Default)]
    struct RecordingSink {
        changes: Vec<ChangePayload>,
        orders: Vec<Vec<CardPosition>>,
        commits: u32,
        ready: bool,
        fail_order: bool,
    }

    impl CommitSink for RecordingSink {
        fn push_change(&mut self, change: ChangePayload) -> Result<(), String> {
            self.changes.push(change);
            Ok(())
        }
        fn push_sort_order(&mut self, order: Vec<CardPosition>) -> Result<(), String> {
            if self.fail_order {
                return Err("sink unavailable".to_string());
            }
            self.orders.push(order);
            Ok(())
        }
        fn ready(&self) -> bool {
            self.ready
        }
        fn trigger_commit(&mut self) -> Result<(), String> {
            self.commits += 1;
            Ok(())
        }
    }

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

    fn store_with(columns: Vec<ColumnRecord>, cards: Vec<CardRecord>) -> OptimisticStore<CardRecord> {
        let mut store = OptimisticStore::new();
        store.set_authoritative(build_single(&columns, &cards));
        store
    }

    fn card_ids(store: &OptimisticStore<CardRecord>, column: &str) -> Vec<String> {
        store
            .current_tree()
            .find_column(column)
            .map(|c| c.cards.iter().map(|card| card.id.clone()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_empty_column_drop_payloads() {
        // Scenario: todo = [cardA, cardB], done = [], drop cardA on done
        let mut store = store_with(
            vec![make_column("todo", 0.0), make_column("done", 1.0)],
            vec![make_card("cardA", "todo", 0.0), make_card("cardB", "todo", 1.0)],
        );
        let mut sink = RecordingSink { ready: true, ..Default::default() };

        let mv = ResolvedMove {
            card_id: "cardA".into(),
            source_column_id: "todo".into(),
            target_column_id: "done".into(),
            target_index: None,
        };
        let generation = commit_move(&mut store, &mut sink, &mv);

        assert!(generation.is_some());
        assert_eq!(card_ids(&store, "todo"), vec!["cardB"]);
        assert_eq!(card_ids(&store, "done"), vec!["cardA"]);
        assert_eq!(
            sink.changes,
            vec![ChangePayload {
                card_id: "cardA".into(),
                old_parent_column_id: "todo".into(),
                new_parent_column_id: "done".into(),
            }]
        );
        assert_eq!(
            sink.orders,
            vec![vec![CardPosition { card_id: "cardA".into(), order: 0 }]]
        );
        assert_eq!(sink.commits, 1);
        assert_eq!(store.cached_content("cardA"), Some("<p>cardA</p>"));
    }

    #[test]
    fn test_same_column_reorder_payloads() {
        // Scenario: todo = [cardA, cardB, cardC], drag cardC onto cardA
        let mut store = store_with(
            vec![make_column("todo", 0.0)],
            vec![
                make_card("cardA", "todo", 0.0),
                make_card("cardB", "todo", 1.0),
                make_card("cardC", "todo", 2.0),
            ],
        );
        let mut sink = RecordingSink { ready: true, ..Default::default() };

        let mv = ResolvedMove {
            card_id: "cardC".into(),
            source_column_id: "todo".into(),
            target_column_id: "todo".into(),
            target_index: Some(0),
        };
        commit_move(&mut store, &mut sink, &mv);

        assert_eq!(card_ids(&store, "todo"), vec!["cardC", "cardA", "cardB"]);
        assert_eq!(
            sink.orders,
            vec![vec![
                CardPosition { card_id: "cardC".into(), order: 0 },
                CardPosition { card_id: "cardA".into(), order: 1 },
                CardPosition { card_id: "cardB".into(), order: 2 },
            ]]
        );
    }

    #[test]
    fn test_sink_failure_reverts_optimistic_state() {
        let mut store = store_with(
            vec![make_column("todo", 0.0), make_column("done", 1.0)],
            vec![make_card("cardA", "todo", 0.0)],
        );
        let mut sink = RecordingSink { ready: true, fail_order: true, ..Default::default() };

        let mv = ResolvedMove {
            card_id: "cardA".into(),
            source_column_id: "todo".into(),
            target_column_id: "done".into(),
            target_index: None,
        };
        let generation = commit_move(&mut store, &mut sink, &mv);

        assert_eq!(generation, None);
        assert!(!store.has_pending());
        assert_eq!(card_ids(&store, "todo"), vec!["cardA"]);
        assert_eq!(store.cached_content("cardA"), None);
        assert_eq!(sink.commits, 0);
    }

    #[test]
    fn test_trigger_skipped_when_not_ready() {
        let mut store = store_with(
            vec![make_column("todo", 0.0), make_column("done", 1.0)],
            vec![make_card("cardA", "todo", 0.0)],
        );
        let mut sink = RecordingSink { ready: false, ..Default::default() };

        let mv = ResolvedMove {
            card_id: "cardA".into(),
            source_column_id: "todo".into(),
            target_column_id: "done".into(),
            target_index: None,
        };
        let generation = commit_move(&mut store, &mut sink, &mv);

        assert!(generation.is_some());
        assert_eq!(sink.commits, 0);
        assert_eq!(sink.changes.len(), 1);
    }

    #[test]
    fn test_payload_wire_shape() {
        let change = ChangePayload {
            card_id: "cardA".into(),
            old_parent_column_id: "todo".into(),
            new_parent_column_id: "done".into(),
        };
        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "cardId": "cardA",
                "oldParentColumnId": "todo",
                "newParentColumnId": "done",
            })
        );

        let order = vec![CardPosition { card_id: "cardA".into(), order: 0 }];
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json, serde_json::json!([{ "cardId": "cardA", "order": 0 }]));
    }
}
