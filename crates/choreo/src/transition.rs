/// Tween channels for the camera pose.
///
/// The three camera tweens of a leg always start together with one duration,
/// so their completions land in the same `advance` batch; `CAMERA_TARGET`
/// sorts last of the three, which is what lets the engine treat its
/// completion as "the leg is done" with the full pose already applied.
pub const CAMERA_POSITION: &str = "camera.position";
pub const CAMERA_TARGET: &str = "camera.target";
pub const CAMERA_FOV: &str = "camera.fov";

pub fn prop_position_channel(name: &str) -> String {
    format!("prop.{name}.position")
}

/// Sorts after the position channel, so a prop's rotation completion is the
/// "both transform tweens done" marker.
pub fn prop_rotation_channel(name: &str) -> String {
    format!("prop.{name}.rotation")
}

pub fn prop_channel_prefix(name: &str) -> String {
    format!("prop.{name}.")
}

/// The camera half of the transition state machine.
///
/// Prop deploy/retract and clip playback run concurrently and are tracked
/// separately; only the camera is ever in a leg.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraPhase {
    Idle,
    /// Leg 1: flying to the `home` rest pose; `pending` is the destination
    /// leg 2 will fly to.
    GoingHome { pending: String },
    /// Leg 2: flying from `home` to `target`.
    GoingToDestination { target: String },
}

/// A prop's lifecycle state. Docked/Deployed name the transform currently
/// being animated toward, not a settled position.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PropState {
    Unloaded,
    Loading,
    Docked,
    Deployed,
}

#[cfg(test)]
mod tests {
    use super::{
        CAMERA_FOV, CAMERA_POSITION, CAMERA_TARGET, prop_position_channel, prop_rotation_channel,
    };

    #[test]
    fn camera_target_sorts_last_of_the_camera_channels() {
        let mut channels = vec![CAMERA_TARGET, CAMERA_POSITION, CAMERA_FOV];
        channels.sort();
        assert_eq!(channels.last(), Some(&CAMERA_TARGET));
    }

    #[test]
    fn rotation_sorts_after_position_for_any_prop() {
        assert!(prop_rotation_channel("phone") > prop_position_channel("phone"));
    }
}
