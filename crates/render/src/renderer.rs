use scene::World;
use scene::components::Transform;

use crate::camera::Camera3D;

/// One draw issued to the external rendering collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    Mesh { name: String, transform: Transform },
}

#[derive(Debug, Default, PartialEq)]
pub struct RenderFrame {
    pub camera: Option<Camera3D>,
    pub commands: Vec<RenderCommand>,
}

pub struct Renderer;

impl Renderer {
    /// Collects draw commands for every visible node, in name order.
    pub fn collect(world: &World, camera: Camera3D) -> RenderFrame {
        let mut frame = RenderFrame {
            camera: Some(camera),
            commands: Vec::new(),
        };
        for node in world.visible_nodes() {
            frame.commands.push(RenderCommand::Mesh {
                name: node.name.clone(),
                transform: node.transform,
            });
        }
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::{RenderCommand, Renderer};
    use crate::camera::Camera3D;
    use foundation::math::Vec3;
    use scene::components::{Transform, Visibility};
    use scene::{NodeTemplate, World};

    fn camera() -> Camera3D {
        Camera3D::look_at(Vec3::new(0.0, 1.0, 0.0), Vec3::new(90.0, 0.0, 0.0), 35.0)
    }

    #[test]
    fn collects_visible_meshes_in_name_order() {
        let mut world = World::new();
        world.add_node(NodeTemplate::new("vehicle", Transform::identity()));
        world.add_node(NodeTemplate::new("phone", Transform::identity()));

        let frame = Renderer::collect(&world, camera());
        let names: Vec<_> = frame
            .commands
            .iter()
            .map(|RenderCommand::Mesh { name, .. }| name.as_str())
            .collect();
        assert_eq!(names, vec!["phone", "vehicle"]);
    }

    #[test]
    fn hidden_nodes_are_not_drawn() {
        let mut world = World::new();
        world.add_node(NodeTemplate::new("vehicle", Transform::identity()));
        world.set_visibility("vehicle", Visibility::hidden());

        let frame = Renderer::collect(&world, camera());
        assert!(frame.commands.is_empty());
    }
}
