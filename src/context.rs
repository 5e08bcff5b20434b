//! Widget Context
//!
//! Shared signals and host hooks handed down the component tree. Also home
//! to the reconciliation timeout scheduling, the only place the core's
//! generations meet an actual timer.

use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_pointer_dnd::DndSignals;

use crate::commit::{CardPosition, ChangePayload, CommitSink};
use crate::drag::DragSession;
use crate::models::CardSource;
use crate::store::OptimisticStore;
use crate::tree::Tree;

/// Host-facing hooks for a widget instance
#[derive(Clone, Copy)]
pub struct KanbanHooks {
    /// Receives the change payload of every committed move
    pub on_change: Callback<ChangePayload>,
    /// Receives the destination column's full post-move order
    pub on_sort_order: Callback<Vec<CardPosition>>,
    /// Whether the host can persist right now
    pub commit_ready: Signal<bool>,
    /// "Persist the above now"
    pub on_commit: Callback<()>,
}

/// Adapts the host's infallible callbacks to the pipeline's sink trait
pub struct HookSink {
    pub hooks: KanbanHooks,
}

impl CommitSink for HookSink {
    fn push_change(&mut self, change: ChangePayload) -> Result<(), String> {
        self.hooks.on_change.run(change);
        Ok(())
    }
    fn push_sort_order(&mut self, order: Vec<CardPosition>) -> Result<(), String> {
        self.hooks.on_sort_order.run(order);
        Ok(())
    }
    fn ready(&self) -> bool {
        self.hooks.commit_ready.get_untracked()
    }
    fn trigger_commit(&mut self) -> Result<(), String> {
        self.hooks.on_commit.run(());
        Ok(())
    }
}

/// Widget-wide state handles, passed down the component tree
pub struct KanbanContext<K: CardSource> {
    pub store: RwSignal<OptimisticStore<K>>,
    /// Pending-or-authoritative tree, memoized for rendering
    pub displayed: Memo<Tree<K>>,
    pub drag: RwSignal<DragSession>,
    pub dnd: DndSignals,
    pub hooks: KanbanHooks,
    pub reconcile_timeout_ms: u32,
}

impl<K: CardSource> Clone for KanbanContext<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K: CardSource> Copy for KanbanContext<K> {}

impl<K: CardSource> KanbanContext<K> {
    pub fn new(dnd: DndSignals, hooks: KanbanHooks, reconcile_timeout_ms: u32) -> Self {
        let store = RwSignal::new(OptimisticStore::new());
        let displayed = Memo::new(move |_| store.with(|s| s.current_tree().clone()));
        KanbanContext {
            store,
            displayed,
            drag: RwSignal::new(DragSession::new()),
            dnd,
            hooks,
            reconcile_timeout_ms,
        }
    }
}

/// Arm the reconciliation timeout for one pending generation. A later
/// commit or diverged rebuild bumps the generation, turning this timer
/// into a no-op when it fires.
pub fn schedule_expiry<K: CardSource>(
    store: RwSignal<OptimisticStore<K>>,
    generation: u64,
    timeout_ms: u32,
) {
    spawn_local(async move {
        TimeoutFuture::new(timeout_ms).await;
        let expired = store
            .try_update(|s| s.expire_pending(generation))
            .unwrap_or(false);
        if expired {
            web_sys::console::log_1(
                &format!("[KANBAN] Reconciliation timed out, reverting to authoritative state (gen {})", generation).into(),
            );
        }
    });
}
