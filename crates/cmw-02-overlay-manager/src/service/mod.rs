//! Service Layer

mod overlay_manager;

pub use overlay_manager::{OverlayManager, TreeChangeHandler};
