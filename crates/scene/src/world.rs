use std::collections::BTreeMap;

use crate::components::{Transform, Visibility};

/// Blueprint for a node about to enter the world, as produced by an asset
/// loader or a prop catalog entry.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeTemplate {
    pub name: String,
    pub transform: Transform,
}

impl NodeTemplate {
    pub fn new(name: impl Into<String>, transform: Transform) -> Self {
        Self {
            name: name.into(),
            transform,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub visibility: Visibility,
}

/// The scene graph: a flat registry of uniquely named nodes.
///
/// The showcase addresses everything by name: a prop's name doubles as its
/// scene node name. So the world is a `BTreeMap` keyed by name, which also
/// gives the renderer a deterministic draw order.
#[derive(Debug, Default)]
pub struct World {
    nodes: BTreeMap<String, Node>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Inserts a node built from `template`; returns `true` if a node of the
    /// same name was replaced.
    pub fn add_node(&mut self, template: NodeTemplate) -> bool {
        self.nodes
            .insert(
                template.name.clone(),
                Node {
                    name: template.name,
                    transform: template.transform,
                    visibility: Visibility::visible(),
                },
            )
            .is_some()
    }

    /// Removes the named node; returns whether it existed.
    pub fn remove_node(&mut self, name: &str) -> bool {
        self.nodes.remove(name).is_some()
    }

    pub fn find_node(&self, name: &str) -> Option<&Node> {
        self.nodes.get(name)
    }

    pub fn node_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.nodes.get_mut(name)
    }

    pub fn set_visibility(&mut self, name: &str, visibility: Visibility) -> bool {
        match self.nodes.get_mut(name) {
            Some(node) => {
                node.visibility = visibility;
                true
            }
            None => false,
        }
    }

    /// Visible nodes in name order.
    pub fn visible_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(|n| n.visibility.visible)
    }
}

#[cfg(test)]
mod tests {
    use super::{NodeTemplate, World};
    use crate::components::{Transform, Visibility};
    use foundation::math::Vec3;

    #[test]
    fn add_find_remove_by_name() {
        let mut world = World::new();
        let replaced = world.add_node(NodeTemplate::new(
            "phone",
            Transform::translate(Vec3::new(0.2, 0.6, -0.1)),
        ));
        assert!(!replaced);
        assert!(world.find_node("phone").is_some());
        assert!(world.remove_node("phone"));
        assert!(world.find_node("phone").is_none());
        assert!(!world.remove_node("phone"));
    }

    #[test]
    fn adding_same_name_replaces() {
        let mut world = World::new();
        world.add_node(NodeTemplate::new("vehicle", Transform::identity()));
        let replaced = world.add_node(NodeTemplate::new(
            "vehicle",
            Transform::translate(Vec3::new(1.0, 0.0, 0.0)),
        ));
        assert!(replaced);
        assert_eq!(world.len(), 1);
        let node = world.find_node("vehicle").unwrap();
        assert_eq!(node.transform.position, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn hidden_nodes_are_filtered_from_visible_iteration() {
        let mut world = World::new();
        world.add_node(NodeTemplate::new("a", Transform::identity()));
        world.add_node(NodeTemplate::new("b", Transform::identity()));
        world.set_visibility("a", Visibility::hidden());

        let names: Vec<_> = world.visible_nodes().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["b"]);
    }

    #[test]
    fn visible_nodes_iterate_in_name_order() {
        let mut world = World::new();
        world.add_node(NodeTemplate::new("tablet", Transform::identity()));
        world.add_node(NodeTemplate::new("manual", Transform::identity()));
        world.add_node(NodeTemplate::new("phone", Transform::identity()));

        let names: Vec<_> = world.visible_nodes().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["manual", "phone", "tablet"]);
    }
}
