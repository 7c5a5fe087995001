//! # Frame Engine
//!
//! Frame update and operation scheduling core for a scene-graph 3D engine.
//!
//! ## Features
//!
//! - **Operation Scheduler**: Per-frame operations with persistent and one-shot lifecycles
//! - **Interpolators & Intervals**: Time-windowed value animation at a chosen resolution
//! - **Joints**: Hinge chains over scene graph transform groups, ball and slider joints
//! - **Follow Cameras**: Top-down focusers with optional smoothing
//! - **Object Pools**: Recycled screenshot, picker and traversal requests
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use frame_engine::prelude::*;
//!
//! struct MyApp {
//!     frames: u32,
//! }
//!
//! impl Application for MyApp {
//!     fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
//!         let fade = ScalarProperty::new(0.0);
//!         engine
//!             .scheduler_mut()
//!             .schedule_operation(ValueInterpolator::new(1000, 0.0, 1.0, fade));
//!         Ok(())
//!     }
//!
//!     fn update(&mut self, engine: &mut Engine, _frame_time: i64) -> Result<(), AppError> {
//!         self.frames += 1;
//!         if self.frames == 600 {
//!             engine.quit();
//!         }
//!         Ok(())
//!     }
//!
//!     fn cleanup(&mut self, _engine: &mut Engine) {}
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig::default();
//!     let mut app = MyApp { frames: 0 };
//!     Engine::run(config, &mut app)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core engine modules
pub mod core;
pub mod config;
pub mod foundation;

// Frame update
pub mod scheduler;
pub mod pool;
pub mod operations;
pub mod debug;

// Scene
pub mod scene;
pub mod joints;
pub mod camera;

mod application;
mod engine;

#[cfg(test)]
mod tests;

pub use application::{Application, AppError};
pub use engine::{Engine, EngineError};
pub use crate::core::EngineConfig;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        Application, AppError,
        Engine, EngineConfig, EngineError,
        config::Config,
        foundation::{
            math::{Vec3, Point3, Mat4, Mat4Ext},
            time::{Timer, TimingMode},
        },
        scheduler::{
            FrameContext, Interval, IntervalControl, OperationError, OperationId,
            OperationScheduler, OperationState, ScalarProperty, ScheduledOperation,
            ValueInterpolator,
        },
        scene::{NodeHandle, SceneGraph, AABB},
        joints::{HingeJoint, HingeAngleTarget, HingeLengthTarget},
        camera::{Camera, Placeable, View, SmoothPlaceableVerticalFocuser},
        operations::{FrameGrabber, ScheduledPicker, ScheduledScreenshot},
    };
}
