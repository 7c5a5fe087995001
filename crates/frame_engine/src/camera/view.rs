//! Position providers and look-at views

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::foundation::math::{Mat4, Point3, Vec3};
use crate::scene::{NodeHandle, SceneGraph};

/// Anything with a world-space position a camera can follow
pub trait Placeable {
    /// Current world-space position
    fn position(&self) -> Point3;
}

impl Placeable for Cell<Point3> {
    fn position(&self) -> Point3 {
        self.get()
    }
}

/// Follows the world-space origin of a scene graph node
#[derive(Debug, Clone)]
pub struct NodePlaceable {
    graph: Rc<RefCell<SceneGraph>>,
    node: NodeHandle,
}

impl NodePlaceable {
    /// Follow `node` in `graph`
    pub fn new(graph: Rc<RefCell<SceneGraph>>, node: NodeHandle) -> Self {
        Self { graph, node }
    }
}

impl Placeable for NodePlaceable {
    /// The scene origin if the node no longer exists
    fn position(&self) -> Point3 {
        match self.graph.borrow().world_transform(self.node) {
            Ok(world) => world.transform_point(&Point3::origin()),
            Err(err) => {
                log::debug!("Placeable node unavailable: {err}");
                Point3::origin()
            }
        }
    }
}

/// Receiver of camera look-at commands
pub trait View {
    /// Place the eye and aim it at `target`
    fn look_at(&mut self, eye: Point3, target: Point3, up: Vec3);
}

/// Look-at camera driven through [`View`]
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Camera position in world space
    pub eye: Point3,
    /// Point the camera is looking at in world space
    pub target: Point3,
    /// Up vector for camera orientation
    pub up: Vec3,
}

impl Camera {
    /// Camera at `eye` looking at the origin with +Y up
    pub fn new(eye: Point3) -> Self {
        Self { eye, target: Point3::origin(), up: Vec3::y() }
    }

    /// Right-handed world-to-view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(&self.eye, &self.target, &self.up)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Point3::new(0.0, 0.0, 10.0))
    }
}

impl View for Camera {
    fn look_at(&mut self, eye: Point3, target: Point3, up: Vec3) {
        self.eye = eye;
        self.target = target;
        self.up = up;
        log::trace!("Camera look_at - eye: {:?}, target: {:?}", eye, target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Mat4Ext;
    use approx::assert_relative_eq;

    #[test]
    fn test_view_matrix_moves_target_onto_negative_z() {
        let mut camera = Camera::default();
        camera.look_at(Point3::new(1.0, 2.0, 10.0), Point3::new(1.0, 2.0, 0.0), Vec3::y());
        let target_in_view = camera.view_matrix().transform_point(&camera.target);
        assert_relative_eq!(target_in_view, Point3::new(0.0, 0.0, -10.0), epsilon = 1e-5);
    }

    #[test]
    fn test_node_placeable_follows_world_transform() {
        let mut graph = SceneGraph::new();
        let tg = graph.create_transform_group(Mat4::new_translation(&Vec3::new(4.0, -1.0, 0.0)));
        graph.add_child(graph.root(), tg).unwrap();
        let graph = Rc::new(RefCell::new(graph));

        let placeable = NodePlaceable::new(Rc::clone(&graph), tg);
        assert_relative_eq!(placeable.position(), Point3::new(4.0, -1.0, 0.0), epsilon = 1e-6);

        graph.borrow_mut().set_transform(tg, Mat4::euler(0.0, 0.0, 0.0)).unwrap();
        assert_relative_eq!(placeable.position(), Point3::origin(), epsilon = 1e-6);

        graph.borrow_mut().remove_node(tg).unwrap();
        assert_eq!(placeable.position(), Point3::origin());
    }
}
