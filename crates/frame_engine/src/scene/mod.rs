//! Scene graph collaborator
//!
//! A minimal node store: groups, transform groups and bounded shapes. Hinge
//! joints own transform groups inside it, traversals collect from it and
//! pickers cast rays against its shapes.

mod scene_graph;

pub use scene_graph::{
    Node, NodeHandle, NodeKind, PickResult, SceneError, SceneGraph, Traversal, AABB,
};
