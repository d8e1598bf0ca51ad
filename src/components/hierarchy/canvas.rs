use leptos::ev;
use leptos::prelude::*;
use log::{debug, error, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Element, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::card::{CARD_CLASS, NodeActions, NodeCard};
use super::chrome::{HierarchyFooter, HierarchyHeader};
use super::drag::DragSession;
use super::layout::{self, LayoutMetrics};
use super::render;
use super::tree::OrgTree;
use super::types::{MoveRequest, NodeId, OrgSeed};
use super::viewport::Viewport;

/// Drawable size of an element, or `None` while it has not been laid out.
fn measured_size(client_width: i32, client_height: i32) -> Option<(f64, f64)> {
	(client_width > 0 && client_height > 0).then(|| (client_width as f64, client_height as f64))
}

fn surface_size(surface: &Element) -> Option<(f64, f64)> {
	measured_size(surface.client_width(), surface.client_height())
}

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
	canvas.get_context("2d").ok()??.dyn_into().ok()
}

fn starts_on_card(ev: &MouseEvent) -> bool {
	ev.target()
		.and_then(|t| t.dyn_into::<Element>().ok())
		.and_then(|el| el.closest(&format!(".{CARD_CLASS}")).ok().flatten())
		.is_some()
}

fn initial_tree(seed: Option<OrgSeed>) -> OrgTree {
	match seed.map(OrgTree::from_seed) {
		Some(Ok(tree)) => tree,
		Some(Err(err)) => {
			error!("invalid hierarchy seed, starting from defaults: {err}");
			OrgTree::default()
		}
		None => OrgTree::default(),
	}
}

/// Pannable, zoomable org chart editor.
///
/// Owns the tree and the viewport; cards only request changes through
/// the callbacks they are handed.
#[component]
pub fn HierarchyCanvas(
	/// Initial chart. Defaults to a lone company root.
	#[prop(optional)]
	seed: Option<OrgSeed>,
	#[prop(optional)] metrics: Option<LayoutMetrics>,
	/// Re-measure the surface whenever the window is resized.
	#[prop(default = true)]
	fullscreen: bool,
	#[prop(optional)] on_next: Option<Callback<()>>,
	#[prop(optional)] on_back: Option<Callback<()>>,
	#[prop(optional)] on_edit: Option<Callback<NodeId>>,
	#[prop(optional)] on_delete: Option<Callback<NodeId>>,
) -> impl IntoView {
	let metrics = metrics.unwrap_or_default();
	let tree = RwSignal::new(initial_tree(seed));
	let layout = Memo::new(move |_| tree.with(|t| layout::compute(t, &metrics)));
	let viewport = RwSignal::new(Viewport::default());
	let size = RwSignal::new((0.0_f64, 0.0_f64));
	let drag = RwSignal::new(DragSession::default());

	let surface_ref = NodeRef::<leptos::html::Div>::new();
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();

	let add_subdepartment = Callback::new(move |parent: NodeId| {
		match tree.with_untracked(|t| t.with_subdepartment(&parent)) {
			Some((next, id)) => {
				debug!("relayout after adding {id}");
				tree.set(next);
			}
			None => warn!("cannot add subdepartment: no node {parent}"),
		}
	});
	let move_member = Callback::new(move |req: MoveRequest| {
		match tree.with_untracked(|t| t.with_member_moved(&req.source, &req.target, &req.member)) {
			Some(next) => tree.set(next),
			None => warn!(
				"declined move of member {} from {} to {}",
				req.member, req.source, req.target
			),
		}
	});

	// Measure the surface once it is mounted and centre the chart.
	Effect::new(move |_| {
		let Some(surface) = surface_ref.get() else {
			return;
		};
		let (w, h) = surface_size(&surface).unwrap_or_else(|| {
			warn!("hierarchy surface has no size yet, using a default");
			(800.0, 600.0)
		});
		size.set((w, h));
		let bounds = layout.with_untracked(|l| l.bounds);
		viewport.update(|v| v.fit(&bounds, w, h));
	});

	// The surface is the flex area between header and footer; a window
	// resize only triggers a fresh measurement of it.
	if fullscreen {
		let resize = window_event_listener(ev::resize, move |_| {
			if let Some(dims) = surface_ref.get_untracked().and_then(|s| surface_size(&s)) {
				size.set(dims);
			}
		});
		on_cleanup(move || resize.remove());
	}

	// Repaint connectors whenever the layout, the viewport or the size moves.
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (w, h) = size.get();
		if w <= 0.0 || h <= 0.0 {
			return;
		}
		if canvas.width() != w as u32 || canvas.height() != h as u32 {
			canvas.set_width(w as u32);
			canvas.set_height(h as u32);
		}
		let Some(ctx) = context_2d(&canvas) else {
			error!("2d canvas context unavailable");
			return;
		};
		let vp = viewport.get();
		layout.with(|l| render::render(l, &vp, w, h, &ctx));
	});

	let local = move |ev: &MouseEvent| -> Option<(f64, f64)> {
		let surface = surface_ref.get_untracked()?;
		let rect = surface.get_bounding_client_rect();
		Some((
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		))
	};

	let on_mousedown = move |ev: MouseEvent| {
		if ev.button() != 0 || starts_on_card(&ev) {
			return;
		}
		if let Some((x, y)) = local(&ev) {
			viewport.update(|v| v.begin_pan(x, y));
		}
	};
	let on_mousemove = move |ev: MouseEvent| {
		if !viewport.with_untracked(Viewport::is_panning) {
			return;
		}
		if let Some((x, y)) = local(&ev) {
			viewport.update(|v| v.pan_to(x, y));
		}
	};
	let on_pan_end = move |_: MouseEvent| {
		if viewport.with_untracked(Viewport::is_panning) {
			viewport.update(Viewport::end_pan);
		}
	};
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let Some((x, y)) = local(&ev) {
			viewport.update(|v| v.wheel(ev.delta_y(), x, y));
		}
	};

	let node_ids = Memo::new(move |_| {
		tree.with(|t| t.flatten().iter().map(|n| n.id.clone()).collect::<Vec<_>>())
	});

	view! {
		<div class="hierarchy">
			<HierarchyHeader on_back=on_back />

			<div
				node_ref=surface_ref
				class="hierarchy__surface"
				class:panning=move || viewport.with(Viewport::is_panning)
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_pan_end
				on:mouseleave=on_pan_end
				on:wheel=on_wheel
			>
				<canvas node_ref=canvas_ref class="hierarchy__canvas" />
				<div class="hierarchy__layer" style:transform=move || viewport.with(Viewport::css_transform)>
					<For
						each=move || node_ids.get()
						key=|id| id.clone()
						children=move |id: NodeId| {
							let node = {
								let id = id.clone();
								Memo::new(move |_| tree.with(|t| t.node_arc(&id)))
							};
							let position = {
								let id = id.clone();
								Signal::derive(move || {
									layout.with(|l| {
										l.slot(&id)
											.map(|s| {
											let card = s.card_rect(&metrics);
											(card.min.x, card.min.y)
										})
											.unwrap_or_default()
									})
								})
							};
							// Bound fresh for every card so handlers always see the current tree.
							let actions = NodeActions {
								add_subdepartment,
								edit: on_edit,
								delete: on_delete,
								move_member,
								drag,
							};
							view! { <NodeCard id node position width=metrics.card_width height=metrics.card_height actions /> }
						}
					/>
				</div>
			</div>

			<HierarchyFooter
				on_zoom_in=Callback::new(move |_| viewport.update(Viewport::zoom_in))
				on_zoom_out=Callback::new(move |_| viewport.update(Viewport::zoom_out))
				on_next=on_next
			/>
		</div>
	}
}
