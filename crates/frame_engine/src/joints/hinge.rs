//! Scene graph hinge joint
//!
//! ```text
//! rotation TG    axis_angle(rotation_axis, angle)
//!   └── translation TG    translate(translation_axis * length)
//!         └── child joints / shapes
//! ```
//!
//! Chaining hinges under each other's translation group builds articulated
//! limbs. Hinges are not backed by a physics engine.

use crate::foundation::math::{utils, Mat4, Mat4Ext, Point3, Vec3};
use crate::joints::{Joint, JointBody, JointError, JointType};
use crate::scene::{Node, NodeHandle, SceneError, SceneGraph, Traversal};

/// Hinge built from a rotation transform group wrapping a translation one
#[derive(Debug, Clone, PartialEq)]
pub struct HingeJoint {
    rotation_tg: NodeHandle,
    translation_tg: NodeHandle,
    rotation_axis: Vec3,
    translation_axis: Vec3,
    angle: f32,
    length: f32,
}

impl HingeJoint {
    /// Create the joint's transform groups in `graph`, detached
    ///
    /// Both axes are stored normalized; zero-length axes are rejected before
    /// any node is created.
    ///
    /// # Arguments
    /// * `graph` - Scene graph the rotation and translation groups are created in
    /// * `rotation_axis` - Axis the joint turns around
    /// * `translation_axis` - Direction the segment extends along
    /// * `length` - Distance from the joint to the segment's end
    /// * `angle` - Initial rotation in radians
    ///
    /// # Returns
    /// The joint, not yet attached to any parent. Use [`attach_to`](Self::attach_to)
    /// or [`add_child`](Self::add_child) to place it in the hierarchy.
    ///
    /// # Example
    /// ```
    /// use frame_engine::foundation::math::Vec3;
    /// use frame_engine::joints::{HingeJoint, JointError};
    /// use frame_engine::scene::SceneGraph;
    ///
    /// let mut graph = SceneGraph::new();
    /// let shoulder = HingeJoint::new(&mut graph, Vec3::z(), Vec3::x(), 2.0, 0.0)?;
    /// let root = graph.root();
    /// shoulder.attach_to(&mut graph, root)?;
    /// assert_eq!(shoulder.length(), 2.0);
    /// # Ok::<(), JointError>(())
    /// ```
    pub fn new(
        graph: &mut SceneGraph,
        rotation_axis: Vec3,
        translation_axis: Vec3,
        length: f32,
        angle: f32,
    ) -> Result<Self, JointError> {
        let rotation_axis = normalized_axis(rotation_axis, "rotation_axis")?;
        let translation_axis = normalized_axis(translation_axis, "translation_axis")?;

        let rotation_tg = graph.create_transform_group(Mat4::identity());
        let translation_tg = graph.create_transform_group(Mat4::identity());
        graph.add_child(rotation_tg, translation_tg)?;

        let joint = Self {
            rotation_tg,
            translation_tg,
            rotation_axis,
            translation_axis,
            angle,
            length,
        };
        joint.update(graph)?;
        Ok(joint)
    }

    /// Recompute both transform groups from the current parameters
    pub fn update(&self, graph: &mut SceneGraph) -> Result<(), JointError> {
        graph.set_transform(self.rotation_tg, Mat4::axis_angle(&self.rotation_axis, self.angle))?;
        graph.set_transform(
            self.translation_tg,
            Mat4::new_translation(&(self.translation_axis * self.length)),
        )?;
        Ok(())
    }

    /// Set the rotation in radians
    pub fn set_angle(&mut self, graph: &mut SceneGraph, angle: f32) -> Result<(), JointError> {
        self.angle = angle;
        self.update(graph)
    }

    /// Set the extension along the translation axis
    pub fn set_length(&mut self, graph: &mut SceneGraph, length: f32) -> Result<(), JointError> {
        self.length = length;
        self.update(graph)
    }

    /// Change the rotation axis; a zero axis is rejected
    pub fn set_rotation_axis(&mut self, graph: &mut SceneGraph, axis: Vec3) -> Result<(), JointError> {
        self.rotation_axis = normalized_axis(axis, "rotation_axis")?;
        self.update(graph)
    }

    /// Change the translation axis; a zero axis is rejected
    pub fn set_translation_axis(&mut self, graph: &mut SceneGraph, axis: Vec3) -> Result<(), JointError> {
        self.translation_axis = normalized_axis(axis, "translation_axis")?;
        self.update(graph)
    }

    /// Chain `child` beneath this joint's translation group
    pub fn add_child(&self, graph: &mut SceneGraph, child: &HingeJoint) -> Result<(), JointError> {
        graph.add_child(self.translation_tg, child.rotation_tg)?;
        Ok(())
    }

    /// Attach an arbitrary node, e.g. a shape, at the end of the joint
    pub fn add_child_node(&self, graph: &mut SceneGraph, node: NodeHandle) -> Result<(), JointError> {
        graph.add_child(self.translation_tg, node)?;
        Ok(())
    }

    /// Detach a chained joint
    pub fn remove_child(&self, graph: &mut SceneGraph, child: &HingeJoint) -> Result<(), JointError> {
        graph.remove_child(self.translation_tg, child.rotation_tg)?;
        Ok(())
    }

    /// Attach the joint under `parent`
    pub fn attach_to(&self, graph: &mut SceneGraph, parent: NodeHandle) -> Result<(), JointError> {
        graph.add_child(parent, self.rotation_tg)?;
        Ok(())
    }

    /// Depth-first walk of the joint and everything chained beneath it
    pub fn traverse<F>(&self, graph: &SceneGraph, visitor: F) -> Result<(), SceneError>
    where
        F: FnMut(NodeHandle, &Node) -> Traversal,
    {
        graph.traverse(self.rotation_tg, visitor)
    }

    /// World-space position of the end of the joint
    pub fn end_position(&self, graph: &SceneGraph) -> Result<Point3, JointError> {
        let world = graph.world_transform(self.translation_tg)?;
        Ok(world.transform_point(&Point3::origin()))
    }

    /// Transform group carrying the rotation
    pub fn rotation_transform_group(&self) -> NodeHandle {
        self.rotation_tg
    }

    /// Transform group carrying the translation; attach children here
    pub fn translation_transform_group(&self) -> NodeHandle {
        self.translation_tg
    }

    /// Current angle in radians
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Current length
    pub fn length(&self) -> f32 {
        self.length
    }

    /// Unit rotation axis
    pub fn rotation_axis(&self) -> Vec3 {
        self.rotation_axis
    }

    /// Unit translation axis
    pub fn translation_axis(&self) -> Vec3 {
        self.translation_axis
    }
}

fn normalized_axis(axis: Vec3, name: &'static str) -> Result<Vec3, JointError> {
    utils::try_normalize(&axis).ok_or(JointError::DegenerateAxis { name })
}

impl Joint for HingeJoint {
    fn joint_type(&self) -> JointType {
        JointType::Hinge
    }

    fn info(&self) -> Option<String> {
        Some(format!("angle={:.3} length={:.3}", self.angle, self.length))
    }

    fn body1(&self) -> Option<JointBody> {
        Some(JointBody::Node(self.rotation_tg))
    }

    fn body2(&self) -> Option<JointBody> {
        Some(JointBody::Node(self.translation_tg))
    }
}
