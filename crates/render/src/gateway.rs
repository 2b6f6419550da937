use foundation::math::Vec3;
use scene::{Node, NodeTemplate, World};

use crate::camera::Camera3D;
use crate::renderer::{RenderFrame, Renderer};

/// Owns the one scene and one camera for the life of the session.
///
/// Every mutation of 3D state funnels through here; the transition engine
/// never touches the world or the camera directly. There is no teardown;
/// the gateway lives until the page does.
#[derive(Debug)]
pub struct SceneGateway {
    world: World,
    camera: Camera3D,
}

impl SceneGateway {
    pub fn new(camera: Camera3D) -> Self {
        Self {
            world: World::new(),
            camera,
        }
    }

    pub fn camera(&self) -> &Camera3D {
        &self.camera
    }

    pub fn set_camera_pose(&mut self, position: Vec3, target: Vec3, fov_y_deg: f64) {
        self.camera.position = position;
        self.camera.target = target;
        self.camera.fov_y_deg = fov_y_deg;
    }

    pub fn set_camera_position(&mut self, position: Vec3) {
        self.camera.position = position;
    }

    pub fn set_camera_target(&mut self, target: Vec3) {
        self.camera.target = target;
    }

    pub fn set_camera_fov(&mut self, fov_y_deg: f64) {
        self.camera.fov_y_deg = fov_y_deg;
    }

    pub fn add_node(&mut self, template: NodeTemplate) -> bool {
        self.world.add_node(template)
    }

    pub fn remove_node(&mut self, name: &str) -> bool {
        self.world.remove_node(name)
    }

    pub fn find_node(&self, name: &str) -> Option<&Node> {
        self.world.find_node(name)
    }

    pub fn node_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.world.node_mut(name)
    }

    /// Collects this tick's draw list for the rendering collaborator.
    pub fn render_frame(&self) -> RenderFrame {
        Renderer::collect(&self.world, self.camera)
    }
}
