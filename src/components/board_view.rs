//! Board Components
//!
//! `KanbanBoard` renders a single implicit board; `KanbanBoards` renders a
//! board collection. Both own the widget wiring: rebuilding the
//! authoritative tree when host records change, driving the drag session
//! from pointer signals, and committing resolved drops.

use leptos::prelude::*;
use leptos_pointer_dnd::{bind_global_mouseup, create_dnd_signals};

use crate::commit::{commit_move, CardPosition, ChangePayload};
use crate::components::ColumnView;
use crate::context::{schedule_expiry, HookSink, KanbanContext, KanbanHooks};
use crate::models::{BoardSource, CardSource, ColumnSource};
use crate::store::{Reconciliation, DEFAULT_RECONCILE_TIMEOUT_MS};
use crate::tree::{build_single, build_tree, Tree};

/// Multi-board Kanban widget
#[component]
pub fn KanbanBoards<B, C, K>(
    boards: ReadSignal<Vec<B>>,
    columns: ReadSignal<Vec<C>>,
    cards: ReadSignal<Vec<K>>,
    on_change: Callback<ChangePayload>,
    on_sort_order: Callback<Vec<CardPosition>>,
    #[prop(into)] commit_ready: Signal<bool>,
    on_commit: Callback<()>,
    #[prop(optional)] reconcile_timeout_ms: Option<u32>,
) -> impl IntoView
where
    B: BoardSource,
    C: ColumnSource,
    K: CardSource,
{
    let hooks = KanbanHooks { on_change, on_sort_order, commit_ready, on_commit };
    let ctx: KanbanContext<K> = init_widget(hooks, reconcile_timeout_ms);

    install_authoritative(ctx, move || build_tree(&boards.get(), &columns.get(), &cards.get()));

    let board_heads = Memo::new(move |_| {
        ctx.displayed.with(|t| {
            t.boards
                .iter()
                .map(|b| (b.id.clone(), b.title.clone()))
                .collect::<Vec<_>>()
        })
    });

    view! {
        <div class="kanban-boards">
            <For
                each=move || board_heads.get()
                key=|(id, title)| (id.clone(), title.clone())
                children=move |(id, title)| {
                    view! {
                        <section class="kanban-board">
                            <header class="kanban-board-title">{title}</header>
                            <BoardLanes ctx=ctx board_id=id />
                        </section>
                    }
                }
            />
        </div>
    }
}

/// Single-board Kanban widget: the column collection is top-level
#[component]
pub fn KanbanBoard<C, K>(
    columns: ReadSignal<Vec<C>>,
    cards: ReadSignal<Vec<K>>,
    on_change: Callback<ChangePayload>,
    on_sort_order: Callback<Vec<CardPosition>>,
    #[prop(into)] commit_ready: Signal<bool>,
    on_commit: Callback<()>,
    #[prop(optional)] reconcile_timeout_ms: Option<u32>,
) -> impl IntoView
where
    C: ColumnSource,
    K: CardSource,
{
    let hooks = KanbanHooks { on_change, on_sort_order, commit_ready, on_commit };
    let ctx: KanbanContext<K> = init_widget(hooks, reconcile_timeout_ms);

    install_authoritative(ctx, move || build_single(&columns.get(), &cards.get()));

    view! {
        <div class="kanban-board">
            <BoardLanes ctx=ctx board_id=String::new() />
        </div>
    }
}

/// One board's columns side by side
#[component]
pub fn BoardLanes<K: CardSource>(ctx: KanbanContext<K>, board_id: String) -> impl IntoView {
    let column_heads = Memo::new(move |_| {
        ctx.displayed.with(|t| {
            t.boards
                .iter()
                .find(|b| b.id == board_id)
                .map(|b| {
                    b.columns
                        .iter()
                        .map(|c| (c.id.clone(), c.title.clone()))
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default()
        })
    });

    view! {
        <div class="kanban-lanes">
            <For
                each=move || column_heads.get()
                key=|(id, title)| (id.clone(), title.clone())
                children=move |(id, title)| {
                    view! { <ColumnView ctx=ctx column_id=id title=title /> }
                }
            />
        </div>
    }
}

/// Per-instance wiring shared by both widget flavors
fn init_widget<K: CardSource>(hooks: KanbanHooks, reconcile_timeout_ms: Option<u32>) -> KanbanContext<K> {
    let dnd = create_dnd_signals();
    let ctx = KanbanContext::new(
        dnd,
        hooks,
        reconcile_timeout_ms.unwrap_or(DEFAULT_RECONCILE_TIMEOUT_MS),
    );

    // Drive the drag session from the pointer signals. The displayed tree
    // is read fresh per event, so a rebuild mid-drag cannot desync hover.
    Effect::new(move |_| {
        let dragging = ctx.dnd.dragging_id_read.get();
        let target = ctx.dnd.drop_target_read.get();
        ctx.drag.update(|session| {
            if let Some(id) = &dragging {
                if !session.is_dragging() {
                    ctx.store.with_untracked(|s| session.on_drag_start(s.current_tree(), id));
                }
            }
            if session.is_dragging() {
                ctx.store.with_untracked(|s| session.on_drag_over(s.current_tree(), target.as_ref()));
            }
        });
    });

    bind_global_mouseup(ctx.dnd, move |dragged_id, target| {
        web_sys::console::log_1(
            &format!("[DND] Drop: card={} target={:?}", dragged_id, target).into(),
        );
        let resolved = ctx
            .drag
            .try_update(|session| {
                ctx.store.with_untracked(|s| {
                    // The drive effect may not have run yet for a very
                    // short gesture; start the session from here if so
                    if !session.is_dragging() {
                        session.on_drag_start(s.current_tree(), &dragged_id);
                    }
                    session.on_drag_end(s.current_tree(), target.as_ref())
                })
            })
            .flatten();
        let Some(mv) = resolved else { return };

        web_sys::console::log_1(
            &format!(
                "[KANBAN] Move: card={} {}->{} index={:?}",
                mv.card_id, mv.source_column_id, mv.target_column_id, mv.target_index
            )
            .into(),
        );
        let generation = ctx
            .store
            .try_update(|s| {
                let mut sink = HookSink { hooks: ctx.hooks };
                commit_move(s, &mut sink, &mv)
            })
            .flatten();
        if let Some(generation) = generation {
            schedule_expiry(ctx.store, generation, ctx.reconcile_timeout_ms);
        }
    });

    ctx
}

/// Rebuild the authoritative tree whenever the host's record signals change
fn install_authoritative<K: CardSource>(
    ctx: KanbanContext<K>,
    build: impl Fn() -> Tree<K> + Send + Sync + 'static,
) {
    Effect::new(move |_| {
        let tree = build();
        let outcome = ctx.store.try_update(|s| s.set_authoritative(tree));
        match outcome {
            Some(Reconciliation::Converged) => {
                web_sys::console::log_1(&"[KANBAN] Pending state reconciled".into());
            }
            Some(Reconciliation::Diverged { generation }) => {
                schedule_expiry(ctx.store, generation, ctx.reconcile_timeout_ms);
            }
            _ => {}
        }
    });
}
