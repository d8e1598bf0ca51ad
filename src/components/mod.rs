//! Reusable UI components.

pub mod hierarchy;
