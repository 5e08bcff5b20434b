//! Column Component
//!
//! One lane of cards. The column surface is itself a drop target (resolving
//! to an end-of-list insert), and an insertion mark is shown after the card
//! the drag is hovering, per the session's hover annotation.

use leptos::prelude::*;
use leptos_pointer_dnd::{make_on_column_mouseenter, make_on_mouseleave};

use crate::components::CardView;
use crate::context::KanbanContext;
use crate::drag::HoverMark;
use crate::models::CardSource;

#[component]
pub fn ColumnView<K: CardSource>(
    ctx: KanbanContext<K>,
    column_id: String,
    title: String,
) -> impl IntoView {
    let id_for_cards = column_id.clone();
    let cards = Memo::new(move |_| {
        ctx.displayed.with(|t| {
            t.find_column(&id_for_cards)
                .map(|c| {
                    c.cards
                        .iter()
                        .map(|card| (card.id.clone(), card.display_key.clone(), card.content.clone()))
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default()
        })
    });

    let on_mouseenter = make_on_column_mouseenter(ctx.dnd, column_id.clone());
    let on_mouseleave = make_on_mouseleave(ctx.dnd);

    // Highlight when the session says a card is about to move in here
    let id_for_hover = column_id.clone();
    let is_drop_target = move || {
        ctx.drag.with(|s| {
            matches!(s.hover(), Some(HoverMark::IntoColumn { column_id }) if *column_id == id_for_hover)
        })
    };

    let column_class = move || {
        let mut c = String::from("kanban-column");
        if is_drop_target() {
            c.push_str(" drop-target");
        }
        c
    };

    let column_for_card = column_id.clone();
    view! {
        <div
            class=column_class
            on:mouseenter=on_mouseenter
            on:mouseleave=on_mouseleave
        >
            <div class="kanban-column-title">{title}</div>
            <div class="kanban-column-cards">
                <For
                    each=move || cards.get()
                    key=|(_, display_key, content)| (display_key.clone(), content.clone())
                    children=move |(card_id, _, content)| {
                        let mark_card = card_id.clone();
                        let show_mark = move || {
                            ctx.drag.with(|s| {
                                matches!(
                                    s.hover(),
                                    Some(HoverMark::AfterCard { card_id, .. }) if *card_id == mark_card
                                )
                            })
                        };
                        view! {
                            <CardView
                                ctx=ctx
                                card_id=card_id
                                column_id=column_for_card.clone()
                                content=content
                            />
                            <div class=move || {
                                if show_mark() { "kanban-insertion-mark active" } else { "kanban-insertion-mark" }
                            }></div>
                        }
                    }
                />
            </div>
        </div>
    }
}
