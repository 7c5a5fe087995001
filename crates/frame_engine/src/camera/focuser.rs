//! Top-down follow cameras
//!
//! Both focusers look straight down the Z axis at the followed object:
//! eye `(x, y, height)`, target `(x, y, 0)`, up `+Y`. They are persistent
//! operations and never stop on their own.

use std::cell::RefCell;
use std::rc::Rc;

use crate::camera::{Placeable, View};
use crate::foundation::math::{utils, Point3, Vec3};
use crate::scheduler::{
    FrameContext, OperationError, OperationId, OperationScheduler, OperationState, ScheduledOperation,
};

fn focus(view: &RefCell<dyn View>, position: Point3, height: f32) {
    view.borrow_mut().look_at(
        Point3::new(position.x, position.y, height),
        Point3::new(position.x, position.y, 0.0),
        Vec3::y(),
    );
}

/// Keeps a view centered above a placeable
pub struct BasicPlaceableVerticalFocuser {
    state: OperationState,
    view: Rc<RefCell<dyn View>>,
    placeable: Rc<dyn Placeable>,
    height: f32,
}

impl BasicPlaceableVerticalFocuser {
    /// Follow `placeable` from `height` units above it
    pub fn new(view: Rc<RefCell<dyn View>>, placeable: Rc<dyn Placeable>, height: f32) -> Self {
        Self {
            state: OperationState::persistent(),
            view,
            placeable,
            height,
        }
    }

    /// Create a focuser and register it with `scheduler`
    pub fn attach(
        scheduler: &mut OperationScheduler,
        view: Rc<RefCell<dyn View>>,
        placeable: Rc<dyn Placeable>,
        height: f32,
    ) -> OperationId {
        scheduler.schedule_operation(Self::new(view, placeable, height))
    }

    /// Eye height above the followed position
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Change the eye height
    pub fn set_height(&mut self, height: f32) {
        self.height = height;
    }
}

impl ScheduledOperation for BasicPlaceableVerticalFocuser {
    fn update(&mut self, _frame: &mut FrameContext<'_>) -> Result<(), OperationError> {
        focus(&self.view, self.placeable.position(), self.height);
        Ok(())
    }

    fn is_alive(&self) -> bool {
        self.state.is_alive()
    }

    fn set_alive(&mut self, alive: bool) {
        self.state.set_alive(alive);
    }

    fn is_persistent(&self) -> bool {
        self.state.is_persistent()
    }
}

/// Follow camera that eases toward the placeable
///
/// Each frame `real_pos = lerp(real_pos, position, alpha)`; the first frame
/// starts at the placeable's position so the camera does not sweep in from
/// the origin. The offset is added after blending.
pub struct SmoothPlaceableVerticalFocuser {
    state: OperationState,
    view: Rc<RefCell<dyn View>>,
    placeable: Rc<dyn Placeable>,
    height: f32,
    alpha: f32,
    offset: Vec3,
    real_pos: Option<Point3>,
}

impl SmoothPlaceableVerticalFocuser {
    /// `alpha` must lie in `(0, 1]`; 1 follows without smoothing
    ///
    /// # Arguments
    /// * `view` - View receiving the look-at commands
    /// * `placeable` - Position to follow
    /// * `height` - Distance of the eye above the followed point
    /// * `alpha` - Fraction of the remaining distance covered each frame
    ///
    /// # Returns
    /// `OperationError::InvalidConfiguration` when `alpha` is out of range.
    pub fn new(
        view: Rc<RefCell<dyn View>>,
        placeable: Rc<dyn Placeable>,
        height: f32,
        alpha: f32,
    ) -> Result<Self, OperationError> {
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(OperationError::InvalidConfiguration(format!(
                "focuser alpha must be in (0, 1], got {alpha}"
            )));
        }
        Ok(Self {
            state: OperationState::persistent(),
            view,
            placeable,
            height,
            alpha,
            offset: Vec3::zeros(),
            real_pos: None,
        })
    }

    /// Shift the look-at point by a constant offset
    pub fn with_offset(mut self, offset: Vec3) -> Self {
        self.offset = offset;
        self
    }

    /// Create a focuser and register it with `scheduler`
    pub fn attach(
        scheduler: &mut OperationScheduler,
        view: Rc<RefCell<dyn View>>,
        placeable: Rc<dyn Placeable>,
        height: f32,
        alpha: f32,
    ) -> Result<OperationId, OperationError> {
        let focuser = Self::new(view, placeable, height, alpha)?;
        Ok(scheduler.schedule_operation(focuser))
    }

    /// Blended position, once the first frame ran
    pub fn real_position(&self) -> Option<Point3> {
        self.real_pos
    }

    /// Blend factor applied each frame
    pub fn alpha(&self) -> f32 {
        self.alpha
    }
}

impl ScheduledOperation for SmoothPlaceableVerticalFocuser {
    fn update(&mut self, _frame: &mut FrameContext<'_>) -> Result<(), OperationError> {
        let target = self.placeable.position();
        let real = match self.real_pos {
            Some(previous) => utils::lerp_point(&previous, &target, self.alpha),
            None => target,
        };
        self.real_pos = Some(real);
        focus(&self.view, real + self.offset, self.height);
        Ok(())
    }

    fn is_alive(&self) -> bool {
        self.state.is_alive()
    }

    fn set_alive(&mut self, alive: bool) {
        self.state.set_alive(alive);
    }

    fn is_persistent(&self) -> bool {
        self.state.is_persistent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::foundation::time::TimingMode;
    use approx::assert_relative_eq;
    use std::cell::Cell;

    fn follow_target(at: Point3) -> Rc<Cell<Point3>> {
        Rc::new(Cell::new(at))
    }

    #[test]
    fn test_basic_focuser_looks_down_at_placeable() {
        let camera = Rc::new(RefCell::new(Camera::default()));
        let target = follow_target(Point3::new(3.0, -2.0, 7.0));
        let mut scheduler = OperationScheduler::default();
        BasicPlaceableVerticalFocuser::attach(&mut scheduler, camera.clone(), target.clone(), 50.0);

        scheduler.update(0, 16, TimingMode::Milliseconds);
        let cam = camera.borrow();
        assert_eq!(cam.eye, Point3::new(3.0, -2.0, 50.0));
        assert_eq!(cam.target, Point3::new(3.0, -2.0, 0.0));
        assert_eq!(cam.up, Vec3::y());
    }

    #[test]
    fn test_smooth_focuser_with_full_alpha_matches_basic() {
        let basic_camera = Rc::new(RefCell::new(Camera::default()));
        let smooth_camera = Rc::new(RefCell::new(Camera::default()));
        let target = follow_target(Point3::new(0.1, 0.2, 0.0));

        let mut scheduler = OperationScheduler::default();
        BasicPlaceableVerticalFocuser::attach(&mut scheduler, basic_camera.clone(), target.clone(), 20.0);
        SmoothPlaceableVerticalFocuser::attach(&mut scheduler, smooth_camera.clone(), target.clone(), 20.0, 1.0)
            .unwrap();

        for frame in 0..20_i32 {
            let t = frame as f32 * 0.37;
            target.set(Point3::new(t.sin() * 13.3, t.cos() * 0.7 + t, 0.0));
            scheduler.update(i64::from(frame) * 16, 16, TimingMode::Milliseconds);
            assert_eq!(*basic_camera.borrow(), *smooth_camera.borrow());
        }
        assert_eq!(scheduler.len(), 2);
    }

    #[test]
    fn test_smooth_focuser_eases_without_initial_snap() {
        let camera = Rc::new(RefCell::new(Camera::default()));
        let target = follow_target(Point3::new(10.0, 0.0, 0.0));
        let mut scheduler = OperationScheduler::default();
        SmoothPlaceableVerticalFocuser::attach(&mut scheduler, camera.clone(), target.clone(), 5.0, 0.5).unwrap();

        scheduler.update(0, 16, TimingMode::Milliseconds);
        assert_relative_eq!(camera.borrow().eye, Point3::new(10.0, 0.0, 5.0), epsilon = 1e-6);

        target.set(Point3::new(20.0, 0.0, 0.0));
        scheduler.update(16, 16, TimingMode::Milliseconds);
        assert_relative_eq!(camera.borrow().eye, Point3::new(15.0, 0.0, 5.0), epsilon = 1e-6);

        scheduler.update(32, 16, TimingMode::Milliseconds);
        assert_relative_eq!(camera.borrow().eye, Point3::new(17.5, 0.0, 5.0), epsilon = 1e-6);
    }

    #[test]
    fn test_offset_applied_after_blending() {
        let camera = Rc::new(RefCell::new(Camera::default()));
        let target = follow_target(Point3::new(1.0, 1.0, 0.0));
        let focuser = SmoothPlaceableVerticalFocuser::new(camera.clone(), target, 8.0, 0.25)
            .unwrap()
            .with_offset(Vec3::new(0.0, -3.0, 0.0));
        let mut scheduler = OperationScheduler::default();
        scheduler.schedule_operation(focuser);

        scheduler.update(0, 16, TimingMode::Milliseconds);
        assert_relative_eq!(camera.borrow().target, Point3::new(1.0, -2.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_alpha_validated() {
        let camera: Rc<RefCell<dyn View>> = Rc::new(RefCell::new(Camera::default()));
        let target: Rc<dyn Placeable> = follow_target(Point3::origin());
        assert!(SmoothPlaceableVerticalFocuser::new(camera.clone(), target.clone(), 1.0, 0.0).is_err());
        assert!(SmoothPlaceableVerticalFocuser::new(camera.clone(), target.clone(), 1.0, 1.5).is_err());
        assert!(SmoothPlaceableVerticalFocuser::new(camera.clone(), target.clone(), 1.0, f32::NAN).is_err());
        assert!(SmoothPlaceableVerticalFocuser::new(camera, target, 1.0, 1.0).is_ok());
    }
}
