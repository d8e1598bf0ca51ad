use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a node in the org chart.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for NodeId {
	fn from(id: &str) -> Self {
		Self(id.to_owned())
	}
}

/// Identifier of a roster member. Upstream data uses both numbers and
/// strings, and the drag payload carries whichever one it was given.
/// Any JSON number is accepted and echoed back in the form it arrived.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MemberId {
	Number(serde_json::Number),
	Text(String),
}

impl MemberId {
	pub fn is_empty(&self) -> bool {
		matches!(self, MemberId::Text(s) if s.is_empty())
	}
}

impl fmt::Display for MemberId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			MemberId::Number(n) => write!(f, "{n}"),
			MemberId::Text(s) => f.write_str(s),
		}
	}
}

impl From<u64> for MemberId {
	fn from(id: u64) -> Self {
		MemberId::Number(id.into())
	}
}

/// One roster entry.
#[derive(Clone, Debug, PartialEq)]
pub struct Member {
	pub id: MemberId,
	pub name: String,
	pub role: String,
	pub avatar: Option<String>,
	pub initials: String,
	pub color: String,
}

pub const DEFAULT_MEMBER_COLOR: &str = "#6F61FF";

/// Seed record for a member, as supplied by the upstream screens.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSeed {
	#[serde(default)]
	pub id: Option<MemberId>,
	pub name: String,
	#[serde(default)]
	pub position: String,
	#[serde(default)]
	pub image: Option<String>,
	#[serde(default)]
	pub initial: String,
	#[serde(default)]
	pub color: Option<String>,
}

/// Seed record for a node and its whole subtree.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgSeed {
	pub id: String,
	pub title: String,
	pub name: String,
	#[serde(default)]
	pub position: String,
	#[serde(default)]
	pub initial: String,
	#[serde(default)]
	pub is_company: bool,
	#[serde(default)]
	pub team: Vec<MemberSeed>,
	#[serde(default)]
	pub children: Vec<OrgSeed>,
}

impl Default for OrgSeed {
	fn default() -> Self {
		Self {
			id: "1".into(),
			title: "Company Name".into(),
			name: "Anton Brian".into(),
			position: "CEO & Founder".into(),
			initial: "AB".into(),
			is_company: true,
			team: Vec::new(),
			children: Vec::new(),
		}
	}
}

/// Request to move `member` from `source` to `target`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveRequest {
	pub source: NodeId,
	pub target: NodeId,
	pub member: MemberId,
}
