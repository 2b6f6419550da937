pub mod clips;
pub mod engine;
pub mod input;
pub mod transition;

pub use clips::*;
pub use engine::*;
pub use input::*;
pub use transition::*;
