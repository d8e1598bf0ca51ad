//! Org chart editor.
//!
//! The tree, layout, viewport and drag modules are plain data and can be
//! driven without a browser; the components on top of them only bind DOM
//! events to those state transitions.

mod canvas;
mod card;
mod chrome;
pub mod drag;
pub mod layout;
mod member_list;
mod render;
pub mod tree;
pub mod types;
pub mod viewport;

pub use canvas::HierarchyCanvas;
pub use types::{Member, MemberId, MemberSeed, MoveRequest, NodeId, OrgSeed};
