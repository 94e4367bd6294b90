//! Workflow integration tests
//!
//! Complete runs exercising configuration, trigger, inventory and output
//! together.

pub mod tag_groups;
pub mod volume_groups;
