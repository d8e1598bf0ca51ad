use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::{MemberId, MoveRequest, NodeId};

/// Media type the payload travels under in the drag data channel.
pub const MEDIA_TYPE: &str = "application/json";

/// Data carried by a member drag, serialized as
/// `{"memberId": .., "sourceNodeId": ".."}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TransferPayload {
	pub member_id: MemberId,
	pub source_node_id: NodeId,
}

#[derive(Debug, Error)]
pub enum PayloadError {
	#[error("drag data is empty")]
	Empty,
	#[error("drag payload is not a JSON object")]
	NotAnObject,
	#[error("malformed drag payload: {0}")]
	Malformed(#[from] serde_json::Error),
	#[error("drag payload is missing `{0}`")]
	MissingField(&'static str),
}

impl TransferPayload {
	pub fn new(member_id: MemberId, source_node_id: NodeId) -> Self {
		Self {
			member_id,
			source_node_id,
		}
	}

	pub fn parse(raw: &str) -> Result<Self, PayloadError> {
		if raw.trim().is_empty() {
			return Err(PayloadError::Empty);
		}
		let value: serde_json::Value = serde_json::from_str(raw)?;
		if !value.is_object() {
			return Err(PayloadError::NotAnObject);
		}
		let payload: Self = serde_json::from_value(value)?;
		if payload.member_id.is_empty() {
			return Err(PayloadError::MissingField("memberId"));
		}
		if payload.source_node_id.is_empty() {
			return Err(PayloadError::MissingField("sourceNodeId"));
		}
		Ok(payload)
	}

	pub fn encode(&self) -> Result<String, PayloadError> {
		Ok(serde_json::to_string(self)?)
	}
}

/// Decide what a drop of `raw` onto `target` does.
///
/// `Ok(None)` when the member would land on the node it came from.
pub fn drop_request(target: &NodeId, raw: &str) -> Result<Option<MoveRequest>, PayloadError> {
	let payload = TransferPayload::parse(raw)?;
	if &payload.source_node_id == target {
		return Ok(None);
	}
	Ok(Some(MoveRequest {
		source: payload.source_node_id,
		target: target.clone(),
		member: payload.member_id,
	}))
}

/// Input to the drag state machine, independent of the pointer API
/// that produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DragMessage {
	Start(TransferPayload),
	Enter(NodeId),
	Leave(NodeId),
	Drop,
	End,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum DragSession {
	#[default]
	Idle,
	Dragging(TransferPayload),
	Hovering {
		payload: TransferPayload,
		target: NodeId,
		/// Enter/leave pairs still open; child elements of a card each
		/// fire their own.
		depth: u32,
	},
}

impl DragSession {
	pub fn apply(&mut self, msg: DragMessage) {
		let current = std::mem::take(self);
		*self = match (current, msg) {
			(_, DragMessage::Start(payload)) => DragSession::Dragging(payload),
			(_, DragMessage::Drop | DragMessage::End) => DragSession::Idle,
			(DragSession::Idle, _) => DragSession::Idle,

			(
				DragSession::Hovering {
					payload,
					target,
					depth,
				},
				DragMessage::Enter(node),
			) if node == target => DragSession::Hovering {
				payload,
				target,
				depth: depth + 1,
			},
			(
				DragSession::Dragging(payload) | DragSession::Hovering { payload, .. },
				DragMessage::Enter(node),
			) => {
				if payload.source_node_id == node {
					DragSession::Dragging(payload)
				} else {
					DragSession::Hovering {
						payload,
						target: node,
						depth: 1,
					}
				}
			}

			(
				DragSession::Hovering {
					payload,
					target,
					depth,
				},
				DragMessage::Leave(node),
			) if node == target => {
				if depth <= 1 {
					DragSession::Dragging(payload)
				} else {
					DragSession::Hovering {
						payload,
						target,
						depth: depth - 1,
					}
				}
			}
			// A leave for some other card; browsers send the new enter first.
			(state, DragMessage::Leave(_)) => state,
		};
	}

	/// Whether `node` should show the drop highlight.
	pub fn highlights(&self, node: &NodeId) -> bool {
		matches!(self, DragSession::Hovering { target, .. } if target == node)
	}

	pub fn payload(&self) -> Option<&TransferPayload> {
		match self {
			DragSession::Idle => None,
			DragSession::Dragging(payload) | DragSession::Hovering { payload, .. } => Some(payload),
		}
	}
}
