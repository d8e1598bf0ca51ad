use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use log::debug;
use thiserror::Error;

use super::types::{DEFAULT_MEMBER_COLOR, Member, MemberId, MemberSeed, NodeId, OrgSeed};

/// A department or person box in the chart.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	pub id: NodeId,
	pub title: String,
	pub name: String,
	pub role: String,
	pub initials: String,
	pub is_company: bool,
	pub roster: Vec<Member>,
	pub children: Vec<NodeId>,
}

impl Node {
	fn placeholder(id: NodeId) -> Self {
		Self {
			id,
			title: "New Department".into(),
			name: "New Employee".into(),
			role: "Position".into(),
			initials: "NE".into(),
			is_company: false,
			roster: Vec::new(),
			children: Vec::new(),
		}
	}

	pub fn member(&self, id: &MemberId) -> Option<&Member> {
		self.roster.iter().find(|m| &m.id == id)
	}
}

/// Derived parent -> child relation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Edge {
	pub parent: NodeId,
	pub child: NodeId,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SeedError {
	#[error("duplicate node id `{0}` in seed data")]
	DuplicateNode(NodeId),
	#[error("duplicate member id `{0}` in seed data")]
	DuplicateMember(MemberId),
	#[error("node `{0}` is flagged as company but is not the root")]
	NestedCompany(NodeId),
	#[error("seed data has an empty node or member id")]
	EmptyId,
}

/// Session-wide source of fresh node ids.
///
/// Ids are the wall clock in milliseconds, bumped past the last issued
/// value so two calls in the same millisecond still differ. Clones share
/// the counter, which keeps ids unique across tree snapshots.
#[derive(Clone, Debug, Default)]
pub struct NodeIdSource(Arc<AtomicU64>);

impl NodeIdSource {
	pub fn next(&self) -> NodeId {
		let now = now_millis();
		let prev = match self
			.0
			.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |last| {
				Some(now.max(last + 1))
			}) {
			Ok(prev) | Err(prev) => prev,
		};
		NodeId::new(now.max(prev + 1).to_string())
	}
}

#[cfg(target_arch = "wasm32")]
fn now_millis() -> u64 {
	js_sys::Date::now() as u64
}

#[cfg(not(target_arch = "wasm32"))]
fn now_millis() -> u64 {
	std::time::SystemTime::now()
		.duration_since(std::time::UNIX_EPOCH)
		.map(|d| d.as_millis() as u64)
		.unwrap_or_default()
}

/// Rooted org tree stored as an arena keyed by node id.
///
/// Nodes sit behind `Arc`, so cloning a tree is shallow and a mutation
/// only reallocates the nodes it touches. Every mutating operation
/// returns a new snapshot and leaves `self` untouched.
#[derive(Clone, Debug)]
pub struct OrgTree {
	root: NodeId,
	nodes: HashMap<NodeId, Arc<Node>>,
	parents: HashMap<NodeId, NodeId>,
	ids: NodeIdSource,
}

impl PartialEq for OrgTree {
	fn eq(&self, other: &Self) -> bool {
		self.root == other.root && self.nodes == other.nodes && self.parents == other.parents
	}
}

impl Default for OrgTree {
	fn default() -> Self {
		let seed = OrgSeed::default();
		let root = NodeId::new(seed.id);
		let node = Node {
			id: root.clone(),
			title: seed.title,
			name: seed.name,
			role: seed.position,
			initials: seed.initial,
			is_company: seed.is_company,
			roster: Vec::new(),
			children: Vec::new(),
		};
		Self {
			nodes: HashMap::from([(root.clone(), Arc::new(node))]),
			root,
			parents: HashMap::new(),
			ids: NodeIdSource::default(),
		}
	}
}

impl OrgTree {
	pub fn from_seed(seed: OrgSeed) -> Result<Self, SeedError> {
		let mut tree = Self {
			root: NodeId::new(seed.id.clone()),
			nodes: HashMap::new(),
			parents: HashMap::new(),
			ids: NodeIdSource::default(),
		};

		let mut used_members = HashSet::new();
		collect_member_ids(&seed, &mut used_members)?;
		let mut next_member = 1u64;

		let mut stack = vec![(seed, None::<NodeId>)];
		while let Some((seed, parent)) = stack.pop() {
			if seed.id.is_empty() {
				return Err(SeedError::EmptyId);
			}
			let id = NodeId::new(seed.id);
			if tree.nodes.contains_key(&id) {
				return Err(SeedError::DuplicateNode(id));
			}
			if seed.is_company && parent.is_some() {
				return Err(SeedError::NestedCompany(id));
			}

			let roster = seed
				.team
				.into_iter()
				.map(|m| member_from_seed(m, &used_members, &mut next_member))
				.collect();
			let children: Vec<NodeId> =
				seed.children.iter().map(|c| NodeId::new(c.id.clone())).collect();

			if let Some(parent) = parent {
				tree.parents.insert(id.clone(), parent);
			}
			tree.nodes.insert(
				id.clone(),
				Arc::new(Node {
					id: id.clone(),
					title: seed.title,
					name: seed.name,
					role: seed.position,
					initials: seed.initial,
					is_company: seed.is_company,
					roster,
					children,
				}),
			);
			// Reverse so the stack pops children in declaration order.
			for child in seed.children.into_iter().rev() {
				stack.push((child, Some(id.clone())));
			}
		}
		Ok(tree)
	}

	pub fn root(&self) -> &Node {
		&self.nodes[&self.root]
	}

	pub fn node(&self, id: &NodeId) -> Option<&Node> {
		self.nodes.get(id).map(Arc::as_ref)
	}

	/// Shared handle to a node, for renderers that hold on to it.
	pub fn node_arc(&self, id: &NodeId) -> Option<Arc<Node>> {
		self.nodes.get(id).cloned()
	}

	pub fn parent(&self, id: &NodeId) -> Option<&NodeId> {
		self.parents.get(id)
	}

	pub fn depth(&self, id: &NodeId) -> Option<usize> {
		if !self.nodes.contains_key(id) {
			return None;
		}
		let mut depth = 0;
		let mut cur = id;
		while let Some(p) = self.parents.get(cur) {
			depth += 1;
			cur = p;
		}
		Some(depth)
	}

	/// Number of nodes, root included. A tree is never empty.
	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	/// Pre-order walk, root first, children left to right.
	pub fn flatten(&self) -> Vec<&Node> {
		let mut out = Vec::with_capacity(self.nodes.len());
		let mut stack = vec![&self.root];
		while let Some(id) = stack.pop() {
			let Some(node) = self.node(id) else {
				continue;
			};
			out.push(node);
			stack.extend(node.children.iter().rev());
		}
		out
	}

	/// Parent/child pairs in pre-order of the child, read from the
	/// parent index.
	pub fn edges(&self) -> Vec<Edge> {
		self.flatten()
			.into_iter()
			.skip(1)
			.filter_map(|n| {
				Some(Edge {
					parent: self.parents.get(&n.id)?.clone(),
					child: n.id.clone(),
				})
			})
			.collect()
	}

	/// Append a placeholder department under `parent`.
	///
	/// Returns `None` when `parent` is not in the tree.
	pub fn with_subdepartment(&self, parent: &NodeId) -> Option<(Self, NodeId)> {
		if !self.nodes.contains_key(parent) {
			debug!("add subdepartment: unknown parent {parent}");
			return None;
		}
		let mut id = self.ids.next();
		while self.nodes.contains_key(&id) {
			id = self.ids.next();
		}

		let mut next = self.clone();
		next.nodes
			.insert(id.clone(), Arc::new(Node::placeholder(id.clone())));
		next.parents.insert(id.clone(), parent.clone());
		if let Some(p) = next.nodes.get_mut(parent) {
			Arc::make_mut(p).children.push(id.clone());
		}
		debug!("added subdepartment {id} under {parent}");
		Some((next, id))
	}

	/// Move `member` from the roster of `source` to the end of `target`'s.
	///
	/// Returns `None` (nothing changed) when source and target are the
	/// same, either node is missing, or the member is not in the source.
	pub fn with_member_moved(
		&self,
		source: &NodeId,
		target: &NodeId,
		member: &MemberId,
	) -> Option<Self> {
		if source == target || !self.nodes.contains_key(target) {
			return None;
		}
		let pos = self
			.nodes
			.get(source)?
			.roster
			.iter()
			.position(|m| &m.id == member)?;

		let mut next = self.clone();
		let moved = Arc::make_mut(next.nodes.get_mut(source)?).roster.remove(pos);
		Arc::make_mut(next.nodes.get_mut(target)?).roster.push(moved);
		debug!("moved member {member} from {source} to {target}");
		Some(next)
	}
}

fn collect_member_ids(seed: &OrgSeed, used: &mut HashSet<MemberId>) -> Result<(), SeedError> {
	for member in &seed.team {
		if let Some(id) = &member.id {
			if id.is_empty() {
				return Err(SeedError::EmptyId);
			}
			if !used.insert(id.clone()) {
				return Err(SeedError::DuplicateMember(id.clone()));
			}
		}
	}
	seed.children
		.iter()
		.try_for_each(|child| collect_member_ids(child, used))
}

fn member_from_seed(seed: MemberSeed, used: &HashSet<MemberId>, next: &mut u64) -> Member {
	let id = seed.id.unwrap_or_else(|| loop {
		let candidate = MemberId::from(*next);
		*next += 1;
		if !used.contains(&candidate) {
			break candidate;
		}
	});
	Member {
		id,
		name: seed.name,
		role: seed.position,
		avatar: seed.image.filter(|s| !s.is_empty()),
		initials: seed.initial,
		color: seed.color.unwrap_or_else(|| DEFAULT_MEMBER_COLOR.into()),
	}
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;

	use super::*;

	fn member(id: u64, name: &str) -> MemberSeed {
		MemberSeed {
			id: Some(MemberId::from(id)),
			name: name.into(),
			..Default::default()
		}
	}

	fn node(id: &str, team: Vec<MemberSeed>, children: Vec<OrgSeed>) -> OrgSeed {
		OrgSeed {
			id: id.into(),
			title: format!("Dept {id}"),
			name: format!("Lead {id}"),
			is_company: false,
			team,
			children,
			..Default::default()
		}
	}

	fn two_departments() -> OrgTree {
		let mut root = OrgSeed::default();
		root.children = vec![
			node("c1", vec![member(1, "m1"), member(2, "m2")], vec![]),
			node("c2", vec![], vec![]),
		];
		OrgTree::from_seed(root).unwrap()
	}

	fn assert_is_tree(tree: &OrgTree) {
		let flat = tree.flatten();
		assert_eq!(flat.len(), tree.node_count(), "every node reachable from root");
		let unique: HashSet<_> = flat.iter().map(|n| &n.id).collect();
		assert_eq!(unique.len(), flat.len(), "no node visited twice");
		assert!(tree.parent(&tree.root().id).is_none());
		for n in flat.iter().skip(1) {
			let parent = tree.parent(&n.id).expect("non-root has a parent");
			let holders = flat.iter().filter(|p| p.children.contains(&n.id)).count();
			assert_eq!(holders, 1);
			assert!(tree.node(parent).unwrap().children.contains(&n.id));
		}
	}

	#[test]
	fn seed_builds_preorder() {
		let mut root = OrgSeed::default();
		root.children = vec![
			node("2", vec![], vec![node("4", vec![], vec![]), node("5", vec![], vec![])]),
			node("3", vec![], vec![]),
		];
		let tree = OrgTree::from_seed(root).unwrap();
		let order: Vec<_> = tree.flatten().iter().map(|n| n.id.to_string()).collect();
		assert_eq!(order, ["1", "2", "4", "5", "3"]);
		assert_eq!(tree.depth(&"5".into()), Some(2));
		assert_eq!(tree.parent(&"4".into()), Some(&NodeId::from("2")));

		let edges: Vec<_> = tree
			.edges()
			.into_iter()
			.map(|e| (e.parent.to_string(), e.child.to_string()))
			.collect();
		assert_eq!(
			edges,
			[("1", "2"), ("2", "4"), ("2", "5"), ("1", "3")]
				.map(|(a, b)| (a.to_string(), b.to_string()))
		);
		assert_is_tree(&tree);
	}

	#[test]
	fn seed_rejects_duplicates_and_nested_company() {
		let mut root = OrgSeed::default();
		root.children = vec![node("1", vec![], vec![])];
		assert_eq!(
			OrgTree::from_seed(root).unwrap_err(),
			SeedError::DuplicateNode("1".into())
		);

		let mut root = OrgSeed::default();
		root.children = vec![node("2", vec![member(7, "a")], vec![]), node("3", vec![member(7, "b")], vec![])];
		assert_eq!(
			OrgTree::from_seed(root).unwrap_err(),
			SeedError::DuplicateMember(MemberId::from(7u64))
		);

		let mut root = OrgSeed::default();
		let mut nested = node("2", vec![], vec![]);
		nested.is_company = true;
		root.children = vec![nested];
		assert_eq!(
			OrgTree::from_seed(root).unwrap_err(),
			SeedError::NestedCompany("2".into())
		);
	}

	#[test]
	fn seed_rejects_empty_ids() {
		let mut root = OrgSeed::default();
		root.children = vec![node("", vec![], vec![])];
		assert_eq!(OrgTree::from_seed(root).unwrap_err(), SeedError::EmptyId);

		let mut root = OrgSeed::default();
		root.team = vec![MemberSeed {
			id: Some(MemberId::Text(String::new())),
			name: "nameless".into(),
			..Default::default()
		}];
		assert_eq!(OrgTree::from_seed(root).unwrap_err(), SeedError::EmptyId);
	}

	#[test]
	fn seed_assigns_missing_member_ids_without_collisions() {
		let mut root = OrgSeed::default();
		root.team = vec![
			MemberSeed {
				name: "anon".into(),
				..Default::default()
			},
			member(1, "explicit"),
		];
		let tree = OrgTree::from_seed(root).unwrap();
		let ids: Vec<_> = tree.root().roster.iter().map(|m| m.id.clone()).collect();
		assert_eq!(ids, [MemberId::from(2u64), MemberId::from(1u64)]);
		assert_eq!(tree.root().roster[0].color, DEFAULT_MEMBER_COLOR);
	}

	#[test]
	fn add_to_lone_root() {
		let tree = OrgTree::default();
		let (next, id) = tree.with_subdepartment(&"1".into()).unwrap();
		assert_eq!(tree.node_count(), 1, "previous snapshot untouched");
		assert_eq!(next.node_count(), 2);
		assert_eq!(next.parent(&id), Some(&NodeId::from("1")));
		assert_eq!(next.root().children, vec![id.clone()]);
		let added = next.node(&id).unwrap();
		assert_eq!(added.title, "New Department");
		assert_eq!(added.initials, "NE");
		assert!(!added.is_company);
	}

	#[test]
	fn add_to_unknown_parent_is_noop() {
		let tree = OrgTree::default();
		assert!(tree.with_subdepartment(&"missing".into()).is_none());
	}

	#[test]
	fn node_ids_never_repeat() {
		let original = OrgTree::default();
		let mut tree = original.clone();
		let mut seen = HashSet::new();
		for _ in 0..50 {
			let (next, id) = tree.with_subdepartment(&"1".into()).unwrap();
			assert!(seen.insert(id));
			tree = next;
		}
		// Deriving from a stale snapshot must not hand out a used id.
		let (_, stale) = original.with_subdepartment(&"1".into()).unwrap();
		assert!(!seen.contains(&stale));
	}

	#[test]
	fn move_between_departments() {
		let tree = two_departments();
		let next = tree
			.with_member_moved(&"c1".into(), &"c2".into(), &MemberId::from(1u64))
			.unwrap();
		let names = |t: &OrgTree, id: &str| -> Vec<String> {
			t.node(&id.into()).unwrap().roster.iter().map(|m| m.name.clone()).collect()
		};
		assert_eq!(names(&next, "c1"), ["m2"]);
		assert_eq!(names(&next, "c2"), ["m1"]);
		assert_eq!(names(&tree, "c1"), ["m1", "m2"]);
		assert_eq!(next.root(), tree.root());
	}

	#[test]
	fn move_noops() {
		let tree = two_departments();
		let m1 = MemberId::from(1u64);
		assert!(tree.with_member_moved(&"c1".into(), &"c1".into(), &m1).is_none());
		assert!(tree.with_member_moved(&"c1".into(), &"zz".into(), &m1).is_none());
		assert!(tree.with_member_moved(&"zz".into(), &"c2".into(), &m1).is_none());
		assert!(tree
			.with_member_moved(&"c1".into(), &"c2".into(), &MemberId::from(99u64))
			.is_none());
		assert!(tree
			.with_member_moved(&"c2".into(), &"c1".into(), &m1)
			.is_none());
	}

	proptest! {
		#[test]
		fn additions_keep_tree_shape(picks in prop::collection::vec(any::<prop::sample::Index>(), 1..40)) {
			let mut tree = OrgTree::default();
			for pick in picks {
				let ids: Vec<NodeId> = tree.flatten().iter().map(|n| n.id.clone()).collect();
				let parent = pick.get(&ids).clone();
				let (next, id) = tree.with_subdepartment(&parent).unwrap();
				prop_assert_eq!(next.parent(&id), Some(&parent));
				prop_assert_eq!(next.node_count(), tree.node_count() + 1);
				tree = next;
			}
			assert_is_tree(&tree);
		}

		#[test]
		fn moves_keep_members_unique(moves in prop::collection::vec((0usize..4, 0usize..4, 1u64..8), 1..30)) {
			let nodes = ["1", "a", "b", "c"];
			let mut root = OrgSeed::default();
			root.team = (1..4).map(|i| member(i, "r")).collect();
			root.children = vec![
				node("a", (4..6).map(|i| member(i, "a")).collect(), vec![node("c", vec![member(6, "c")], vec![])]),
				node("b", vec![member(7, "b")], vec![]),
			];
			let mut tree = OrgTree::from_seed(root).unwrap();

			for (s, t, m) in moves {
				let (source, target, m) = (NodeId::from(nodes[s]), NodeId::from(nodes[t]), MemberId::from(m));
				let was_in_source = tree.node(&source).unwrap().member(&m).is_some();
				match tree.with_member_moved(&source, &target, &m) {
					Some(next) => {
						prop_assert!(was_in_source && s != t);
						prop_assert!(next.node(&source).unwrap().member(&m).is_none());
						let in_target = next.node(&target).unwrap().roster.iter().filter(|x| x.id == m).count();
						prop_assert_eq!(in_target, 1);
						for other in nodes.iter().map(|n| NodeId::from(*n)) {
							if other != source && other != target {
								prop_assert_eq!(&next.node(&other).unwrap().roster, &tree.node(&other).unwrap().roster);
							}
						}
						tree = next;
					}
					None => prop_assert!(!was_in_source || s == t),
				}
			}
			let total: usize = tree.flatten().iter().map(|n| n.roster.len()).sum();
			prop_assert_eq!(total, 7);
		}
	}
}
