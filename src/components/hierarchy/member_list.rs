use leptos::prelude::*;
use log::warn;
use wasm_bindgen::JsCast;
use web_sys::{DragEvent, Element, WheelEvent};

use super::drag::{DragMessage, DragSession, MEDIA_TYPE, TransferPayload};
use super::types::{Member, NodeId};

const AVATAR_SELECTOR: &str = ".member-avatar";
const DRAG_IMAGE_OFFSET: i32 = 16;

/// Put `payload` on the drag data channel and enter the dragging state.
pub(super) fn begin_member_drag(ev: &DragEvent, payload: TransferPayload, drag: RwSignal<DragSession>) {
	let Some(dt) = ev.data_transfer() else {
		warn!("drag start without a data transfer");
		return;
	};
	let raw = match payload.encode() {
		Ok(raw) => raw,
		Err(err) => {
			warn!("could not encode drag payload: {err}");
			return;
		}
	};
	if dt.set_data(MEDIA_TYPE, &raw).is_err() {
		warn!("browser refused drag data for member {}", payload.member_id);
		return;
	}
	dt.set_effect_allowed("move");

	// Drag only the avatar, not the whole row.
	let source = ev.current_target().and_then(|t| t.dyn_into::<Element>().ok());
	let avatar = source.and_then(|el| {
		if el.matches(AVATAR_SELECTOR).unwrap_or(false) {
			Some(el)
		} else {
			el.query_selector(AVATAR_SELECTOR).ok().flatten()
		}
	});
	if let Some(avatar) = avatar {
		dt.set_drag_image(&avatar, DRAG_IMAGE_OFFSET, DRAG_IMAGE_OFFSET);
	}

	drag.update(|s| s.apply(DragMessage::Start(payload)));
}

/// Round avatar: the image when it loads, initials on the member colour
/// otherwise.
#[component]
pub fn MemberAvatar(member: Member, #[prop(default = "")] class: &'static str) -> impl IntoView {
	let failed = RwSignal::new(false);
	let Member {
		name,
		avatar,
		initials,
		color,
		..
	} = member;
	let has_image = avatar.is_some();
	let show_image = move || has_image && !failed.get();

	view! {
		<div
			class=format!("member-avatar {class}")
			style:background-color=move || if show_image() { "transparent".to_string() } else { color.clone() }
		>
			<Show
				when=show_image
				fallback={
					let initials = initials.clone();
					move || view! { <span class="member-avatar__initials">{initials.clone()}</span> }
				}
			>
				<img
					src=avatar.clone().unwrap_or_default()
					alt=name.clone()
					draggable="false"
					on:error=move |_| failed.set(true)
				/>
			</Show>
		</div>
	}
}

/// Full roster of a node, each row a drag source.
#[component]
pub fn MemberListPopover(
	node_id: NodeId,
	roster: Memo<Vec<Member>>,
	drag: RwSignal<DragSession>,
) -> impl IntoView {
	view! {
		// Let the list scroll instead of zooming the canvas.
		<div class="member-list" on:wheel=|ev: WheelEvent| ev.stop_propagation()>
			<For
				each=move || roster.get()
				key=|member| member.id.clone()
				children=move |member: Member| {
					let payload = TransferPayload::new(member.id.clone(), node_id.clone());
					view! {
						<div
							class="member-list__item"
							draggable="true"
							on:dragstart=move |ev: DragEvent| begin_member_drag(&ev, payload.clone(), drag)
							on:dragend=move |_: DragEvent| drag.update(|s| s.apply(DragMessage::End))
						>
							<MemberAvatar member=member.clone() class="member-list__avatar" />
							<div class="member-list__info">
								<span class="member-list__name">{member.name.clone()}</span>
								<span class="member-list__role">{member.role.clone()}</span>
							</div>
						</div>
					}
				}
			/>
		</div>
	}
}
