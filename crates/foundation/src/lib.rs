pub mod easing;
pub mod math;
pub mod time;

// Foundation crate: small, dependency-free primitives only.
pub use easing::*;
pub use time::*;
