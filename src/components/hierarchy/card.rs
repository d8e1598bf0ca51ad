use std::sync::Arc;

use leptos::ev;
use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::JsCast;
use web_sys::{DragEvent, MouseEvent};

use super::drag::{DragMessage, DragSession, MEDIA_TYPE, TransferPayload, drop_request};
use super::member_list::{MemberAvatar, MemberListPopover, begin_member_drag};
use super::tree::Node;
use super::types::{Member, MoveRequest, NodeId};

/// Avatars shown on the card before the "+N" overflow button.
pub const INLINE_MEMBER_LIMIT: usize = 6;

/// Class the canvas uses to tell card presses from background presses.
pub const CARD_CLASS: &str = "org-card";

/// Mutation entry points handed to each card when the tree is rendered.
#[derive(Clone, Copy)]
pub struct NodeActions {
	pub add_subdepartment: Callback<NodeId>,
	pub edit: Option<Callback<NodeId>>,
	pub delete: Option<Callback<NodeId>>,
	pub move_member: Callback<MoveRequest>,
	pub drag: RwSignal<DragSession>,
}

/// Which per-card popover is open. At most one at a time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CardPopover {
	#[default]
	Closed,
	Menu,
	Members,
}

impl CardPopover {
	pub fn toggle_menu(self) -> Self {
		if self == CardPopover::Menu {
			CardPopover::Closed
		} else {
			CardPopover::Menu
		}
	}

	pub fn toggle_members(self) -> Self {
		if self == CardPopover::Members {
			CardPopover::Closed
		} else {
			CardPopover::Members
		}
	}

	pub fn is_open(self) -> bool {
		self != CardPopover::Closed
	}

	/// State after a press somewhere on the page; closes the open popover
	/// unless the press landed inside it.
	pub fn dismissed(self, in_menu: bool, in_members: bool) -> Self {
		match self {
			CardPopover::Menu if !in_menu => CardPopover::Closed,
			CardPopover::Members if !in_members => CardPopover::Closed,
			other => other,
		}
	}
}

/// Number behind the "+N" button, if any.
pub fn overflow_count(roster_len: usize) -> Option<usize> {
	roster_len
		.checked_sub(INLINE_MEMBER_LIMIT)
		.filter(|extra| *extra > 0)
}

#[component]
pub fn NodeCard(
	id: NodeId,
	node: Memo<Option<Arc<Node>>>,
	/// Left/top of the card in world space.
	#[prop(into)]
	position: Signal<(f64, f64)>,
	width: f64,
	/// Fixed so connectors meet the card's bottom edge.
	height: f64,
	actions: NodeActions,
) -> impl IntoView {
	let popover = RwSignal::new(CardPopover::Closed);
	let menu_ref = NodeRef::<leptos::html::Div>::new();
	let members_ref = NodeRef::<leptos::html::Div>::new();

	let text = move |field: fn(&Node) -> &str| {
		move || node.with(|n| n.as_deref().map(|n| field(n).to_owned()).unwrap_or_default())
	};
	let is_company = move || node.with(|n| n.as_deref().is_some_and(|n| n.is_company));
	let roster = Memo::new(move |_| {
		node.with(|n| n.as_deref().map(|n| n.roster.clone()).unwrap_or_default())
	});
	let overflow = move || roster.with(|r| overflow_count(r.len()));

	let highlighted = {
		let id = id.clone();
		Memo::new(move |_| actions.drag.with(|s| s.highlights(&id)))
	};

	let dismiss = window_event_listener(ev::mousedown, move |ev: MouseEvent| {
		let current = popover.get_untracked();
		if !current.is_open() {
			return;
		}
		let Some(target) = ev.target().and_then(|t| t.dyn_into::<web_sys::Node>().ok()) else {
			return;
		};
		let inside = |r: NodeRef<leptos::html::Div>| {
			r.get_untracked().is_some_and(|el| el.contains(Some(&target)))
		};
		let next = current.dismissed(inside(menu_ref), inside(members_ref));
		if next != current {
			popover.set(next);
		}
	});
	on_cleanup(move || dismiss.remove());

	let run_action = {
		let id = id.clone();
		move |action: Option<Callback<NodeId>>| {
			if let Some(cb) = action {
				cb.run(id.clone());
			} else {
				debug!("no handler registered for card action on {id}");
			}
			popover.set(CardPopover::Closed);
		}
	};
	let (run_add, run_edit, run_delete) = (run_action.clone(), run_action.clone(), run_action);

	let on_dragenter = {
		let id = id.clone();
		move |_: DragEvent| actions.drag.update(|s| s.apply(DragMessage::Enter(id.clone())))
	};
	let on_dragleave = {
		let id = id.clone();
		move |_: DragEvent| actions.drag.update(|s| s.apply(DragMessage::Leave(id.clone())))
	};
	let on_dragover = {
		let id = id.clone();
		move |ev: DragEvent| {
			// A drag that started outside this canvas has no session;
			// let it through and validate on drop.
			let accepts = actions
				.drag
				.with_untracked(|s| s.payload().is_none_or(|p| p.source_node_id != id));
			if accepts {
				ev.prevent_default();
				if let Some(dt) = ev.data_transfer() {
					dt.set_drop_effect("move");
				}
			}
		}
	};
	let on_drop = {
		let id = id.clone();
		move |ev: DragEvent| {
			ev.prevent_default();
			actions.drag.update(|s| s.apply(DragMessage::Drop));
			let raw = ev
				.data_transfer()
				.and_then(|dt| dt.get_data(MEDIA_TYPE).ok())
				.unwrap_or_default();
			match drop_request(&id, &raw) {
				Ok(Some(request)) => actions.move_member.run(request),
				Ok(None) => debug!("member dropped back on {id}"),
				Err(err) => warn!("ignoring drop on {id}: {err}"),
			}
		}
	};

	let popover_node_id = StoredValue::new(id.clone());
	let inline_member = {
		let id = id.clone();
		move |member: Member| {
			let payload = TransferPayload::new(member.id.clone(), id.clone());
			view! {
				<div
					class="org-card__team-avatar"
					draggable="true"
					title=member.name.clone()
					on:dragstart=move |ev: DragEvent| begin_member_drag(&ev, payload.clone(), actions.drag)
					on:dragend=move |_: DragEvent| actions.drag.update(|s| s.apply(DragMessage::End))
				>
					<MemberAvatar member=member.clone() />
				</div>
			}
		}
	};

	view! {
		<div
			class=CARD_CLASS
			class:drop-target=move || highlighted.get()
			data-node-id=id.to_string()
			style:left=move || format!("{}px", position.get().0)
			style:top=move || format!("{}px", position.get().1)
			style:width=format!("{width}px")
			style:height=format!("{height}px")
			style:z-index=move || if popover.get().is_open() { "30" } else { "1" }
			on:dragenter=on_dragenter
			on:dragleave=on_dragleave
			on:dragover=on_dragover
			on:drop=on_drop
		>
			<div node_ref=menu_ref class="org-card__menu-area">
				<button
					class="org-card__menu-button"
					title="Actions"
					on:click=move |ev: MouseEvent| {
						ev.stop_propagation();
						popover.update(|p| *p = p.toggle_menu());
					}
				>
					"⋯"
				</button>
				<Show when=move || popover.get() == CardPopover::Menu>
					<div class="org-card__menu">
						<button class="org-card__menu-item" on:click={
							let run_add = run_add.clone();
							move |_| run_add(Some(actions.add_subdepartment))
						}>
							<span class="org-card__menu-title">"Add subdepartment or team"</span>
							<span class="org-card__menu-description">
								"New department or team will be made subordinate to this department."
							</span>
						</button>
						<button class="org-card__menu-item" on:click={
							let run_edit = run_edit.clone();
							move |_| run_edit(actions.edit)
						}>
							<span class="org-card__menu-title">"Edit department"</span>
						</button>
						<button class="org-card__menu-item org-card__menu-item--danger" on:click={
							let run_delete = run_delete.clone();
							move |_| run_delete(actions.delete)
						}>
							<span class="org-card__menu-title">"Delete"</span>
						</button>
					</div>
				</Show>
			</div>

			<div class="org-card__header">
				<Show when=is_company>
					<span class="org-card__company-badge" title="Company">"◆"</span>
				</Show>
				<h3 class="org-card__title">{text(|n| &n.title)}</h3>
			</div>

			<div class="org-card__info">
				<div class="org-card__avatar">
					<span>{text(|n| &n.initials)}</span>
				</div>
				<div class="org-card__details">
					<span class="org-card__name">{text(|n| &n.name)}</span>
					<span class="org-card__role">{text(|n| &n.role)}</span>
				</div>
			</div>

			<Show when=move || roster.with(|r| !r.is_empty())>
				<div class="org-card__team">
					<For
						each=move || roster.get().into_iter().take(INLINE_MEMBER_LIMIT)
						key=|member| member.id.clone()
						children=inline_member.clone()
					/>
					<div node_ref=members_ref class="org-card__members-area">
						{move || overflow().map(|extra| view! {
							<button
								class="org-card__team-count"
								on:click=move |ev: MouseEvent| {
									ev.stop_propagation();
									popover.update(|p| *p = p.toggle_members());
								}
							>
								{format!("+{extra}")}
							</button>
						})}
						<Show when=move || popover.get() == CardPopover::Members>
							<MemberListPopover node_id=popover_node_id.get_value() roster drag=actions.drag />
						</Show>
					</div>
				</div>
			</Show>
		</div>
	}
}
