//! Camera views and per-frame focusers

pub mod view;
pub mod focuser;

pub use view::{Camera, NodePlaceable, Placeable, View};
pub use focuser::{BasicPlaceableVerticalFocuser, SmoothPlaceableVerticalFocuser};
