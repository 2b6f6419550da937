pub mod components;
pub mod world;

pub use world::*;
