//! Application trait and lifecycle management

use crate::engine::{Engine, EngineError};
use crate::joints::JointError;
use crate::scene::SceneError;
use crate::scheduler::OperationError;
use thiserror::Error;

/// Application lifecycle trait
///
/// Implement this trait to drive your scene through [`Engine::run`].
pub trait Application {
    /// Initialize the application
    ///
    /// Called once after the engine is initialized. Use this to build the
    /// scene and schedule the operations it needs.
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError>;

    /// Update the application
    ///
    /// Called every frame, before the scheduler runs.
    ///
    /// # Arguments
    /// * `engine` - Mutable reference to the engine
    /// * `frame_time` - Time since last frame, in the configured timing mode
    fn update(&mut self, engine: &mut Engine, frame_time: i64) -> Result<(), AppError>;

    /// Cleanup the application
    ///
    /// Called once when the main loop exits.
    fn cleanup(&mut self, engine: &mut Engine);
}

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Engine error propagated to application level
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Operation could not be built or scheduled
    #[error("Operation error: {0}")]
    Operation(#[from] OperationError),

    /// Scene graph error
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Joint configuration error
    #[error("Joint error: {0}")]
    Joint(#[from] JointError),

    /// Custom application error
    #[error("Application error: {0}")]
    Custom(String),
}
