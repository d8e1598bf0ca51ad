use leptos::prelude::*;
use log::info;

use crate::components::hierarchy::{HierarchyCanvas, MemberSeed, NodeId, OrgSeed};

fn member(color: &str, image: Option<&str>, initial: &str, name: &str, position: &str) -> MemberSeed {
	MemberSeed {
		id: None,
		name: name.into(),
		position: position.into(),
		image: image.map(Into::into),
		initial: initial.into(),
		color: Some(color.into()),
	}
}

fn department(id: &str, title: &str, name: &str, position: &str, team: Vec<MemberSeed>) -> OrgSeed {
	OrgSeed {
		id: id.into(),
		title: title.into(),
		name: name.into(),
		position: position.into(),
		initial: "AA".into(),
		is_company: false,
		team,
		children: Vec::new(),
	}
}

/// Sample company handed over by the company-setup step.
fn sample_company() -> OrgSeed {
	let mut growth = department("2", "Growth", "Kartr Brian", "Senior Product Owner", Vec::new());
	growth.children = vec![
		department(
			"4",
			"Growth",
			"Boolod",
			"Senior Product Owner",
			vec![
				member("#FFA500", None, "AB", "Alex Brown", "Product Manager"),
				member("#6F61FF", None, "MK", "Mike Kelly", "Developer"),
				member("#6F61FF", Some("/user.svg"), "LT", "Lisa Turner", "Designer"),
				member("#409B3F", None, "B", "Bob Smith", "Analyst"),
				member("#F83CE9", Some("/user.svg"), "EJ", "Emma Jones", "QA Engineer"),
			],
		),
		department(
			"5",
			"Growth",
			"Boolod",
			"Senior Product Owner",
			vec![
				member("#FFA500", None, "AB", "Amanda Baker", "Team Lead"),
				member("#6F61FF", Some("/users/user-1.jpg"), "JW", "Jack Wilson", "Developer"),
				member("#6F61FF", None, "IG", "Ivan Garcia", "Backend Developer"),
				member("#409B3F", None, "SS", "Sophie Stone", "Frontend Developer"),
				member("#F83CE9", Some("/users/user-6.jpg"), "RH", "Rachel Harris", "UX Designer"),
				member("#F83CE9", Some("/users/user-5.jpg"), "TM", "Tom Martin", "DevOps"),
				member("#F83CE9", Some("/users/user-7.jpg"), "NC", "Nancy Clark", "Scrum Master"),
				member("#F83CE9", Some("/users/user-8.jpg"), "PL", "Peter Lewis", "Product Owner"),
			],
		),
	];

	let marketing = department(
		"3",
		"Marketing",
		"Ceysi Brian",
		"Head of Marketing",
		vec![
			member("#FFA500", Some("/users/user-1.jpg"), "JD", "John Doe", "Marketing Manager"),
			member("#6F61FF", None, "AG", "Anna Green", "Content Specialist"),
			member("#6F61FF", None, "KG", "Kevin Gray", "SEO Specialist"),
			member("#409B3F", None, "NG", "Nina Gold", "Social Media Manager"),
			member("#F83CE9", Some("/users/user-5.jpg"), "SM", "Sarah Miller", "Brand Manager"),
		],
	);

	OrgSeed {
		children: vec![growth, marketing],
		..OrgSeed::default()
	}
}

/// Hierarchy step of the onboarding flow.
#[component]
pub fn Onboarding() -> impl IntoView {
	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>
			<HierarchyCanvas
				seed=sample_company()
				fullscreen=true
				on_back=Callback::new(|_| info!("hierarchy: back"))
				on_next=Callback::new(|_| info!("hierarchy: next"))
				on_edit=Callback::new(|id: NodeId| info!("hierarchy: edit {id}"))
				on_delete=Callback::new(|id: NodeId| info!("hierarchy: delete {id}"))
			/>
		</ErrorBoundary>
	}
}
