//! Card Component
//!
//! A draggable card. The body is opaque markup from the host record; while
//! a moved card waits for its next authoritative render, the snapshot taken
//! at commit time is served from the store's presentation cache instead.

use leptos::prelude::*;
use leptos_pointer_dnd::{
    make_on_card_mouseenter, make_on_card_mouseleave, make_on_mousedown, DropTarget,
};

use crate::context::KanbanContext;
use crate::models::CardSource;

#[component]
pub fn CardView<K: CardSource>(
    ctx: KanbanContext<K>,
    card_id: String,
    column_id: String,
    content: String,
) -> impl IntoView {
    let on_mousedown = make_on_mousedown(ctx.dnd, card_id.clone());
    let on_mouseenter = make_on_card_mouseenter(ctx.dnd, card_id.clone());
    let on_mouseleave = make_on_card_mouseleave(ctx.dnd, column_id);

    // Swallow the click that fires right after a drop, so host click
    // handlers up the tree don't treat the drag release as a card click
    let on_click = move |ev: web_sys::MouseEvent| {
        if ctx.dnd.drag_just_ended_read.get_untracked() {
            ev.prevent_default();
            ev.stop_propagation();
        }
    };

    let id_for_drag = card_id.clone();
    let is_dragging = move || ctx.dnd.dragging_id_read.get().as_deref() == Some(id_for_drag.as_str());
    let id_for_target = card_id.clone();
    let is_drop_target = move || {
        matches!(ctx.dnd.drop_target_read.get(), Some(DropTarget::Card(id)) if id == id_for_target)
    };

    let card_class = move || {
        let mut c = String::from("kanban-card");
        if is_dragging() {
            c.push_str(" dragging");
        }
        if is_drop_target() {
            c.push_str(" drop-target");
        }
        c
    };

    let id_for_body = card_id.clone();
    let body = move || {
        ctx.store
            .with(|s| s.cached_content(&id_for_body).map(|m| m.to_string()))
            .unwrap_or_else(|| content.clone())
    };

    view! {
        <div
            class=card_class
            on:mousedown=on_mousedown
            on:mouseenter=on_mouseenter
            on:mouseleave=on_mouseleave
            on:click=on_click
        >
            <div class="kanban-card-body" inner_html=body></div>
        </div>
    }
}
