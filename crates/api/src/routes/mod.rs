//! HTTP Routes

pub mod explain;
pub mod metrics;
pub mod predict;
