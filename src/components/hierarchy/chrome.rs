use leptos::prelude::*;

fn fire(cb: Option<Callback<()>>) {
	if let Some(cb) = cb {
		cb.run(());
	}
}

#[component]
pub fn HierarchyHeader(#[prop(default = None)] on_back: Option<Callback<()>>) -> impl IntoView {
	view! {
		<header class="hierarchy-header">
			<button class="hierarchy-header__back" on:click=move |_| fire(on_back)>
				<span>"← Back"</span>
			</button>
			<div class="hierarchy-header__info">
				<h1 class="hierarchy-header__title">"Company Hierarchy"</h1>
				<p class="hierarchy-header__description">
					"Add departments and drag team members between them."
				</p>
			</div>
		</header>
	}
}

#[component]
pub fn HierarchyFooter(
	on_zoom_in: Callback<()>,
	on_zoom_out: Callback<()>,
	#[prop(default = None)] on_next: Option<Callback<()>>,
) -> impl IntoView {
	view! {
		<footer class="hierarchy-footer">
			<div class="hierarchy-footer__zoom">
				<button class="hierarchy-footer__zoom-button" title="Zoom out" on:click=move |_| on_zoom_out.run(())>
					"−"
				</button>
				<div class="hierarchy-footer__divider" />
				<button class="hierarchy-footer__zoom-button" title="Zoom in" on:click=move |_| on_zoom_in.run(())>
					"+"
				</button>
			</div>
			<div class="hierarchy-footer__actions">
				<button class="hierarchy-footer__skip" on:click=move |_| fire(on_next)>
					"Skip"
				</button>
				<button class="hierarchy-footer__next" on:click=move |_| fire(on_next)>
					"Next"
				</button>
			</div>
		</footer>
	}
}
