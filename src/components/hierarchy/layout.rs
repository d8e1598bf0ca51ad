use std::collections::HashMap;

use super::tree::{Node, OrgTree};
use super::types::NodeId;

/// Card geometry and spacing used by the layout pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutMetrics {
	pub card_width: f64,
	pub card_height: f64,
	pub horizontal_gap: f64,
	pub vertical_gap: f64,
	pub corner_radius: f64,
}

impl Default for LayoutMetrics {
	fn default() -> Self {
		Self {
			card_width: 300.0,
			card_height: 200.0,
			horizontal_gap: 50.0,
			vertical_gap: 80.0,
			corner_radius: 16.0,
		}
	}
}

impl LayoutMetrics {
	pub fn depth_step(&self) -> f64 {
		self.card_height + self.vertical_gap
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

/// Where a node's card goes. `x`/`y` is the top-centre of the card.
#[derive(Clone, Debug, PartialEq)]
pub struct Slot {
	pub x: f64,
	pub y: f64,
	pub depth: usize,
	/// Horizontal interval reserved for the whole subtree.
	pub span: (f64, f64),
}

impl Slot {
	/// Box the card occupies in world space. Cards are drawn at exactly
	/// this size so connectors meet their edges.
	pub fn card_rect(&self, metrics: &LayoutMetrics) -> Bounds {
		let half = metrics.card_width / 2.0;
		Bounds {
			min: Point::new(self.x - half, self.y),
			max: Point::new(self.x + half, self.y + metrics.card_height),
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
	MoveTo(Point),
	LineTo(Point),
	QuadTo { ctrl: Point, to: Point },
}

/// Routed line from a parent's bottom-centre to a child's top-centre.
#[derive(Clone, Debug, PartialEq)]
pub struct Connector {
	pub parent: NodeId,
	pub child: NodeId,
	pub path: Vec<PathCommand>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds {
	pub min: Point,
	pub max: Point,
}

impl Bounds {
	pub fn width(&self) -> f64 {
		self.max.x - self.min.x
	}

	pub fn height(&self) -> f64 {
		self.max.y - self.min.y
	}

	pub fn center(&self) -> Point {
		Point::new(
			(self.min.x + self.max.x) / 2.0,
			(self.min.y + self.max.y) / 2.0,
		)
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TreeLayout {
	pub slots: HashMap<NodeId, Slot>,
	pub connectors: Vec<Connector>,
	pub bounds: Bounds,
}

impl TreeLayout {
	pub fn slot(&self, id: &NodeId) -> Option<&Slot> {
		self.slots.get(id)
	}
}

/// Lay out the whole tree from scratch.
///
/// Leaves take one card width. An inner node reserves the sum of its
/// children's widths plus the gaps between them and sits midway between
/// its first and last child. Every node at depth `d` gets
/// `y = d * depth_step`.
pub fn compute(tree: &OrgTree, metrics: &LayoutMetrics) -> TreeLayout {
	let mut widths = HashMap::with_capacity(tree.node_count());
	let root = tree.root();
	subtree_width(tree, root, metrics, &mut widths);

	let mut layout = TreeLayout::default();
	let half = widths.get(&root.id).copied().unwrap_or(metrics.card_width) / 2.0;
	place(tree, root, -half, 0, metrics, &widths, &mut layout.slots);

	layout.connectors = tree
		.edges()
		.into_iter()
		.filter_map(|edge| {
			let (p, c) = (layout.slots.get(&edge.parent)?, layout.slots.get(&edge.child)?);
			let from = Point::new(p.x, p.card_rect(metrics).max.y);
			let to = Point::new(c.x, c.card_rect(metrics).min.y);
			Some(Connector {
				path: route(from, to, metrics.corner_radius),
				parent: edge.parent,
				child: edge.child,
			})
		})
		.collect();
	layout.bounds = bounds(&layout.slots, metrics);
	layout
}

fn subtree_width(
	tree: &OrgTree,
	node: &Node,
	metrics: &LayoutMetrics,
	widths: &mut HashMap<NodeId, f64>,
) -> f64 {
	let children: Vec<&Node> = node.children.iter().filter_map(|c| tree.node(c)).collect();
	let width = if children.is_empty() {
		metrics.card_width
	} else {
		let sum: f64 = children
			.iter()
			.map(|c| subtree_width(tree, c, metrics, widths))
			.sum();
		sum + metrics.horizontal_gap * (children.len() - 1) as f64
	};
	widths.insert(node.id.clone(), width);
	width
}

/// Place `node` with its reserved span starting at `left`; returns its x.
fn place(
	tree: &OrgTree,
	node: &Node,
	left: f64,
	depth: usize,
	metrics: &LayoutMetrics,
	widths: &HashMap<NodeId, f64>,
	slots: &mut HashMap<NodeId, Slot>,
) -> f64 {
	let width = widths.get(&node.id).copied().unwrap_or(metrics.card_width);
	let mut cursor = left;
	let mut first_last: Option<(f64, f64)> = None;

	for child in node.children.iter().filter_map(|c| tree.node(c)) {
		let cx = place(tree, child, cursor, depth + 1, metrics, widths, slots);
		first_last = Some(first_last.map_or((cx, cx), |(first, _)| (first, cx)));
		cursor += widths.get(&child.id).copied().unwrap_or(metrics.card_width) + metrics.horizontal_gap;
	}

	let x = match first_last {
		Some((first, last)) => (first + last) / 2.0,
		None => left + width / 2.0,
	};
	slots.insert(
		node.id.clone(),
		Slot {
			x,
			y: depth as f64 * metrics.depth_step(),
			depth,
			span: (left, left + width),
		},
	);
	x
}

/// Orthogonal connector with rounded corners.
///
/// Drops from `from`, turns towards the child at the vertical midpoint,
/// runs horizontally and turns down again into `to`.
pub fn route(from: Point, to: Point, corner_radius: f64) -> Vec<PathCommand> {
	let dx = to.x - from.x;
	if dx.abs() < f64::EPSILON {
		return vec![PathCommand::MoveTo(from), PathCommand::LineTo(to)];
	}

	let mid_y = (from.y + to.y) / 2.0;
	let r = corner_radius
		.min(dx.abs() / 2.0)
		.min(((to.y - from.y) / 2.0).abs());
	let dir = dx.signum();

	vec![
		PathCommand::MoveTo(from),
		PathCommand::LineTo(Point::new(from.x, mid_y - r)),
		PathCommand::QuadTo {
			ctrl: Point::new(from.x, mid_y),
			to: Point::new(from.x + dir * r, mid_y),
		},
		PathCommand::LineTo(Point::new(to.x - dir * r, mid_y)),
		PathCommand::QuadTo {
			ctrl: Point::new(to.x, mid_y),
			to: Point::new(to.x, mid_y + r),
		},
		PathCommand::LineTo(to),
	]
}

fn bounds(slots: &HashMap<NodeId, Slot>, metrics: &LayoutMetrics) -> Bounds {
	let half = metrics.card_width / 2.0;
	let mut it = slots.values();
	let Some(first) = it.next() else {
		return Bounds::default();
	};
	let init = Bounds {
		min: Point::new(first.x - half, first.y),
		max: Point::new(first.x + half, first.y + metrics.card_height),
	};
	it.fold(init, |b, s| Bounds {
		min: Point::new(b.min.x.min(s.x - half), b.min.y.min(s.y)),
		max: Point::new(
			b.max.x.max(s.x + half),
			b.max.y.max(s.y + metrics.card_height),
		),
	})
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;

	use super::*;

	const EPS: f64 = 1e-6;

	fn grow(picks: &[prop::sample::Index]) -> OrgTree {
		let mut tree = OrgTree::default();
		for pick in picks {
			let ids: Vec<NodeId> = tree.flatten().iter().map(|n| n.id.clone()).collect();
			let parent = pick.get(&ids).clone();
			tree = tree.with_subdepartment(&parent).unwrap().0;
		}
		tree
	}

	#[test]
	fn lone_root_gets_one_slot() {
		let tree = OrgTree::default();
		let layout = compute(&tree, &LayoutMetrics::default());
		let slot = layout.slot(&"1".into()).unwrap();
		assert_eq!((slot.x, slot.y, slot.depth), (0.0, 0.0, 0));
		assert_eq!(slot.span, (-150.0, 150.0));
		assert!(layout.connectors.is_empty());
		assert_eq!(layout.bounds.width(), 300.0);
	}

	#[test]
	fn single_child_drops_straight_below() {
		let metrics = LayoutMetrics::default();
		let (tree, child) = OrgTree::default().with_subdepartment(&"1".into()).unwrap();
		let layout = compute(&tree, &metrics);
		assert_eq!(tree.node_count(), 2);

		let root = layout.slot(&"1".into()).unwrap();
		let slot = layout.slot(&child).unwrap();
		assert_eq!(slot.y, root.y + metrics.depth_step());
		assert_eq!(slot.x, root.x);

		let [connector] = layout.connectors.as_slice() else {
			panic!("expected one connector");
		};
		assert_eq!(
			connector.path,
			vec![
				PathCommand::MoveTo(Point::new(root.x, metrics.card_height)),
				PathCommand::LineTo(Point::new(slot.x, slot.y)),
			]
		);
	}

	#[test]
	fn uneven_children_centre_on_midpoints() {
		let metrics = LayoutMetrics::default();
		let (tree, a) = OrgTree::default().with_subdepartment(&"1".into()).unwrap();
		let (tree, b) = tree.with_subdepartment(&"1".into()).unwrap();
		let (tree, _) = tree.with_subdepartment(&a).unwrap();
		let (tree, _) = tree.with_subdepartment(&a).unwrap();
		let (tree, _) = tree.with_subdepartment(&a).unwrap();
		let layout = compute(&tree, &metrics);

		let (sa, sb) = (layout.slot(&a).unwrap(), layout.slot(&b).unwrap());
		// a spans three leaves, b one: 3*300 + 2*50 and 300.
		assert_eq!(sa.span.1 - sa.span.0, 1000.0);
		assert_eq!(sb.span.1 - sb.span.0, 300.0);
		assert_eq!(sb.span.0 - sa.span.1, metrics.horizontal_gap);

		let root = layout.slot(&"1".into()).unwrap();
		assert!((root.x - (sa.x + sb.x) / 2.0).abs() < EPS);
	}

	#[test]
	fn connectors_meet_card_edges() {
		let metrics = LayoutMetrics::default();
		let (tree, a) = OrgTree::default().with_subdepartment(&"1".into()).unwrap();
		let (tree, _) = tree.with_subdepartment(&"1".into()).unwrap();
		let (tree, _) = tree.with_subdepartment(&a).unwrap();
		let layout = compute(&tree, &metrics);

		assert_eq!(layout.connectors.len(), 3);
		for connector in &layout.connectors {
			let parent = layout.slot(&connector.parent).unwrap().card_rect(&metrics);
			let child = layout.slot(&connector.child).unwrap().card_rect(&metrics);
			assert_eq!(parent.height(), metrics.card_height);
			let Some(PathCommand::MoveTo(start)) = connector.path.first() else {
				panic!("connector must open with a move");
			};
			assert!((start.x - parent.center().x).abs() < EPS);
			assert!((start.y - parent.max.y).abs() < EPS);
			let end = match connector.path.last() {
				Some(PathCommand::LineTo(p)) => *p,
				Some(PathCommand::QuadTo { to, .. }) => *to,
				other => panic!("unexpected path end {other:?}"),
			};
			assert!((end.x - child.center().x).abs() < EPS);
			assert!((end.y - child.min.y).abs() < EPS);
		}
	}

	#[test]
	fn route_bends_towards_child() {
		let path = route(Point::new(0.0, 200.0), Point::new(-100.0, 280.0), 16.0);
		assert_eq!(path.len(), 6);
		assert_eq!(path[1], PathCommand::LineTo(Point::new(0.0, 224.0)));
		assert_eq!(
			path[2],
			PathCommand::QuadTo {
				ctrl: Point::new(0.0, 240.0),
				to: Point::new(-16.0, 240.0),
			}
		);
		assert_eq!(path[3], PathCommand::LineTo(Point::new(-84.0, 240.0)));
		assert_eq!(path[5], PathCommand::LineTo(Point::new(-100.0, 280.0)));
	}

	#[test]
	fn route_clamps_radius_on_short_runs() {
		let path = route(Point::new(0.0, 0.0), Point::new(10.0, 80.0), 16.0);
		assert_eq!(path[3], PathCommand::LineTo(Point::new(5.0, 40.0)));
	}

	proptest! {
		#[test]
		fn layout_laws(picks in prop::collection::vec(any::<prop::sample::Index>(), 0..40)) {
			let metrics = LayoutMetrics::default();
			let tree = grow(&picks);
			let layout = compute(&tree, &metrics);
			prop_assert_eq!(layout.slots.len(), tree.node_count());
			prop_assert_eq!(layout.connectors.len(), tree.node_count() - 1);

			for node in tree.flatten() {
				let slot = layout.slot(&node.id).unwrap();
				prop_assert_eq!(Some(slot.depth), tree.depth(&node.id));
				prop_assert_eq!(slot.y, slot.depth as f64 * metrics.depth_step());

				let kids: Vec<&Slot> = node.children.iter().map(|c| layout.slot(c).unwrap()).collect();
				if kids.is_empty() {
					prop_assert!((slot.span.1 - slot.span.0 - metrics.card_width).abs() < EPS);
					continue;
				}
				let lo = kids.iter().map(|k| k.x).fold(f64::INFINITY, f64::min);
				let hi = kids.iter().map(|k| k.x).fold(f64::NEG_INFINITY, f64::max);
				prop_assert!((slot.x - (lo + hi) / 2.0).abs() < EPS);
				for k in &kids {
					prop_assert!(k.y > slot.y);
				}
				for pair in kids.windows(2) {
					prop_assert!(pair[0].span.1 <= pair[1].span.0 + EPS);
				}
			}
		}
	}
}
