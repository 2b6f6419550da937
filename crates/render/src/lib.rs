pub mod camera;
pub mod gateway;
pub mod renderer;

pub use camera::*;
pub use gateway::*;
pub use renderer::*;
