//! Node hierarchy used by joints, traversals and pickers
//!
//! Nodes live in a generation-checked [`SlotMap`], so a handle to a removed
//! node is rejected instead of aliasing a newer node.

use slotmap::{new_key_type, SlotMap};
use thiserror::Error;

use crate::foundation::math::{utils, Mat4, Point3, Vec3};
use crate::pool::NodeList;

new_key_type! {
    /// Handle to a node in a [`SceneGraph`]
    pub struct NodeHandle;
}

/// Axis-Aligned Bounding Box for spatial queries
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl AABB {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at a point with given extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Check if this AABB contains a point
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y &&
        point.z >= self.min.z && point.z <= self.max.z
    }

    /// Bounds enclosing this box after `transform`
    pub fn transformed(&self, transform: &Mat4) -> AABB {
        let mut min = Vec3::repeat(f32::INFINITY);
        let mut max = Vec3::repeat(f32::NEG_INFINITY);
        for i in 0..8 {
            let corner = Point3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            );
            let p = transform.transform_point(&corner).coords;
            min = min.inf(&p);
            max = max.sup(&p);
        }
        AABB { min, max }
    }

    /// Test ray intersection with this AABB using slab method
    /// Returns the distance to the entry point if the ray intersects, None otherwise
    pub fn intersect_ray(&self, ray_origin: Vec3, ray_dir: Vec3) -> Option<f32> {
        let inv_dir = Vec3::new(
            if ray_dir.x != 0.0 { 1.0 / ray_dir.x } else { f32::INFINITY },
            if ray_dir.y != 0.0 { 1.0 / ray_dir.y } else { f32::INFINITY },
            if ray_dir.z != 0.0 { 1.0 / ray_dir.z } else { f32::INFINITY },
        );

        let t1 = (self.min.x - ray_origin.x) * inv_dir.x;
        let t2 = (self.max.x - ray_origin.x) * inv_dir.x;
        let t3 = (self.min.y - ray_origin.y) * inv_dir.y;
        let t4 = (self.max.y - ray_origin.y) * inv_dir.y;
        let t5 = (self.min.z - ray_origin.z) * inv_dir.z;
        let t6 = (self.max.z - ray_origin.z) * inv_dir.z;

        let tmin = t1.min(t2).max(t3.min(t4)).max(t5.min(t6));
        let tmax = t1.max(t2).min(t3.max(t4)).min(t5.max(t6));

        if tmax >= tmin && tmax >= 0.0 {
            // 0 when the origin is inside the box
            Some(tmin.max(0.0))
        } else {
            None
        }
    }
}

/// What a node is
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Plain grouping node
    Group,
    /// Group applying a local transform to its children
    TransformGroup(Mat4),
    /// Leaf with local-space bounds
    Shape(AABB),
}

/// Scene graph node
#[derive(Debug, Clone)]
pub struct Node {
    name: Option<String>,
    kind: NodeKind,
    parent: Option<NodeHandle>,
    children: Vec<NodeHandle>,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            name: None,
            kind,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Optional debug name
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Node kind
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Parent node, if attached
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    /// Children in insertion order
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    /// Whether the node can have children
    pub fn is_group(&self) -> bool {
        !matches!(self.kind, NodeKind::Shape(_))
    }

    fn local_transform(&self) -> Option<&Mat4> {
        match &self.kind {
            NodeKind::TransformGroup(m) => Some(m),
            _ => None,
        }
    }
}

/// Visitor verdict during [`SceneGraph::traverse`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    /// Visit the node's children
    Continue,
    /// Skip the node's children
    SkipChildren,
    /// End the traversal
    Stop,
}

/// Shape hit by a pick ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickResult {
    /// Shape node that was hit
    pub node: NodeHandle,
    /// Distance from the ray origin to the entry point, in world units
    pub distance: f32,
}

/// Scene graph errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// The handle does not refer to a live node
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeHandle),

    /// Shapes cannot have children
    #[error("Node {0:?} cannot have children")]
    NotAGroup(NodeHandle),

    /// The node has no transform
    #[error("Node {0:?} is not a transform group")]
    NotATransformGroup(NodeHandle),

    /// The node already has a parent
    #[error("Node {0:?} already has a parent")]
    AlreadyParented(NodeHandle),

    /// Attaching would make a node its own ancestor
    #[error("Attaching {child:?} under {parent:?} would create a cycle")]
    CycleDetected {
        /// Intended parent
        parent: NodeHandle,
        /// Intended child
        child: NodeHandle,
    },

    /// The node is not a child of the given parent
    #[error("Node {child:?} is not a child of {parent:?}")]
    NotAChild {
        /// Expected parent
        parent: NodeHandle,
        /// Node that was not found among its children
        child: NodeHandle,
    },

    /// The root node cannot be removed or re-parented
    #[error("The root node cannot be removed or attached")]
    CannotRemoveRoot,

    /// Pick ray direction has zero length
    #[error("Pick ray direction has zero length")]
    DegenerateRay,
}

/// Hierarchy of groups, transform groups and shapes under a single root
#[derive(Debug, Clone)]
pub struct SceneGraph {
    nodes: SlotMap<NodeHandle, Node>,
    root: NodeHandle,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Create a graph holding only a root group
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::new(NodeKind::Group));
        Self { nodes, root }
    }

    /// Root group
    pub fn root(&self) -> NodeHandle {
        self.root
    }

    /// Create a detached group
    pub fn create_group(&mut self) -> NodeHandle {
        self.nodes.insert(Node::new(NodeKind::Group))
    }

    /// Create a detached transform group
    pub fn create_transform_group(&mut self, transform: Mat4) -> NodeHandle {
        self.nodes.insert(Node::new(NodeKind::TransformGroup(transform)))
    }

    /// Create a detached shape with local-space bounds
    pub fn create_shape(&mut self, bounds: AABB) -> NodeHandle {
        self.nodes.insert(Node::new(NodeKind::Shape(bounds)))
    }

    /// Set a node's debug name
    pub fn set_name(&mut self, handle: NodeHandle, name: impl Into<String>) -> Result<(), SceneError> {
        self.get_mut(handle)?.name = Some(name.into());
        Ok(())
    }

    /// Look up a node
    pub fn node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    /// Whether `handle` refers to a live node
    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.nodes.contains_key(handle)
    }

    /// Number of nodes, including the root and detached nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false; the root is never removed
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn get(&self, handle: NodeHandle) -> Result<&Node, SceneError> {
        self.nodes.get(handle).ok_or(SceneError::NodeNotFound(handle))
    }

    fn get_mut(&mut self, handle: NodeHandle) -> Result<&mut Node, SceneError> {
        self.nodes.get_mut(handle).ok_or(SceneError::NodeNotFound(handle))
    }

    /// Attach a detached node as the last child of `parent`
    pub fn add_child(&mut self, parent: NodeHandle, child: NodeHandle) -> Result<(), SceneError> {
        if !self.get(parent)?.is_group() {
            return Err(SceneError::NotAGroup(parent));
        }
        if child == self.root {
            return Err(SceneError::CannotRemoveRoot);
        }
        if self.get(child)?.parent.is_some() {
            return Err(SceneError::AlreadyParented(child));
        }

        let mut ancestor = Some(parent);
        while let Some(current) = ancestor {
            if current == child {
                return Err(SceneError::CycleDetected { parent, child });
            }
            ancestor = self.get(current)?.parent;
        }

        self.get_mut(child)?.parent = Some(parent);
        self.get_mut(parent)?.children.push(child);
        Ok(())
    }

    /// Detach `child` from `parent`; the child stays in the graph
    pub fn remove_child(&mut self, parent: NodeHandle, child: NodeHandle) -> Result<(), SceneError> {
        if self.get(child)?.parent != Some(parent) {
            return Err(SceneError::NotAChild { parent, child });
        }
        self.get_mut(parent)?.children.retain(|&c| c != child);
        self.get_mut(child)?.parent = None;
        Ok(())
    }

    /// Detach a node and delete it together with its subtree
    pub fn remove_node(&mut self, handle: NodeHandle) -> Result<(), SceneError> {
        if handle == self.root {
            return Err(SceneError::CannotRemoveRoot);
        }
        if let Some(parent) = self.get(handle)?.parent {
            self.remove_child(parent, handle)?;
        }

        let mut stack = vec![handle];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(current) {
                stack.extend(node.children);
            }
        }
        Ok(())
    }

    /// Replace a transform group's local transform
    pub fn set_transform(&mut self, handle: NodeHandle, transform: Mat4) -> Result<(), SceneError> {
        match &mut self.get_mut(handle)?.kind {
            NodeKind::TransformGroup(m) => {
                *m = transform;
                Ok(())
            }
            _ => Err(SceneError::NotATransformGroup(handle)),
        }
    }

    /// A transform group's local transform
    pub fn transform(&self, handle: NodeHandle) -> Result<Mat4, SceneError> {
        self.get(handle)?
            .local_transform()
            .copied()
            .ok_or(SceneError::NotATransformGroup(handle))
    }

    /// Product of every transform from the root down to and including `handle`
    pub fn world_transform(&self, handle: NodeHandle) -> Result<Mat4, SceneError> {
        let node = self.get(handle)?;
        let local = node.local_transform().copied().unwrap_or_else(Mat4::identity);
        Ok(self.ancestors_transform(node)? * local)
    }

    fn ancestors_transform(&self, node: &Node) -> Result<Mat4, SceneError> {
        let mut world = Mat4::identity();
        let mut ancestor = node.parent;
        while let Some(current) = ancestor {
            let node = self.get(current)?;
            if let Some(m) = node.local_transform() {
                world = m * world;
            }
            ancestor = node.parent;
        }
        Ok(world)
    }

    /// Depth-first, pre-order walk starting at `start`
    pub fn traverse<F>(&self, start: NodeHandle, mut visitor: F) -> Result<(), SceneError>
    where
        F: FnMut(NodeHandle, &Node) -> Traversal,
    {
        self.get(start)?;
        let mut stack = vec![start];
        while let Some(handle) = stack.pop() {
            let Some(node) = self.nodes.get(handle) else {
                continue;
            };
            match visitor(handle, node) {
                Traversal::Continue => stack.extend(node.children.iter().rev()),
                Traversal::SkipChildren => {}
                Traversal::Stop => break,
            }
        }
        Ok(())
    }

    /// Append `start` and all of its descendants, in traversal order
    pub fn collect_into(&self, start: NodeHandle, list: &mut NodeList) -> Result<(), SceneError> {
        self.traverse(start, |handle, _| {
            list.push(handle);
            Traversal::Continue
        })
    }

    /// Cast a world-space ray against every shape under `start`
    ///
    /// `results` is cleared and refilled with hits sorted by distance.
    pub fn pick(
        &self,
        start: NodeHandle,
        origin: Point3,
        direction: Vec3,
        results: &mut Vec<PickResult>,
    ) -> Result<(), SceneError> {
        results.clear();
        let direction = utils::try_normalize(&direction).ok_or(SceneError::DegenerateRay)?;

        let base = self.ancestors_transform(self.get(start)?)?;
        let mut stack = vec![(start, base)];
        while let Some((handle, parent_world)) = stack.pop() {
            let Some(node) = self.nodes.get(handle) else {
                continue;
            };
            match &node.kind {
                NodeKind::Shape(bounds) => {
                    let world_bounds = bounds.transformed(&parent_world);
                    if let Some(distance) = world_bounds.intersect_ray(origin.coords, direction) {
                        results.push(PickResult { node: handle, distance });
                    }
                }
                NodeKind::Group => {
                    stack.extend(node.children.iter().rev().map(|&c| (c, parent_world)));
                }
                NodeKind::TransformGroup(m) => {
                    let world = parent_world * m;
                    stack.extend(node.children.iter().rev().map(|&c| (c, world)));
                }
            }
        }

        results.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        Ok(())
    }
}
