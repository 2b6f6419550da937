use foundation::math::Vec3;

/// Default near plane; chosen to bisect the cabin so interior geometry does
/// not occlude the view while the camera flies between viewpoints.
pub const DEFAULT_NEAR: f64 = 0.1;
pub const DEFAULT_FAR: f64 = 1000.0;

/// Perspective camera: position, look-at target, vertical field of view.
///
/// The field of view is stored in degrees because that is the unit the
/// viewpoint registry records and the unit camera tweens interpolate in.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera3D {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_y_deg: f64,
    pub near: f64,
    pub far: f64,
}

impl Camera3D {
    pub fn look_at(position: Vec3, target: Vec3, fov_y_deg: f64) -> Self {
        Self {
            position,
            target,
            fov_y_deg,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
        }
    }

    pub fn fov_y_rad(&self) -> f64 {
        self.fov_y_deg.to_radians()
    }

    /// Normalized view direction, or zero if position and target coincide.
    pub fn forward(&self) -> Vec3 {
        let d = self.target - self.position;
        let len = d.length();
        if len > 1e-12 { d.scale(1.0 / len) } else { Vec3::ZERO }
    }
}

#[cfg(test)]
mod tests {
    use super::{Camera3D, DEFAULT_FAR, DEFAULT_NEAR};
    use foundation::math::Vec3;

    #[test]
    fn look_at_uses_default_clip_planes() {
        let cam = Camera3D::look_at(Vec3::new(0.0, 1.0, 0.0), Vec3::new(90.0, 0.0, 0.0), 35.0);
        assert_eq!(cam.near, DEFAULT_NEAR);
        assert_eq!(cam.far, DEFAULT_FAR);
    }

    #[test]
    fn fov_converts_to_radians() {
        let cam = Camera3D::look_at(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), 90.0);
        assert!((cam.fov_y_rad() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn forward_is_normalized() {
        let cam = Camera3D::look_at(Vec3::ZERO, Vec3::new(0.0, 0.0, 2.0), 35.0);
        assert_eq!(cam.forward(), Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn forward_of_degenerate_camera_is_zero() {
        let cam = Camera3D::look_at(Vec3::ONE, Vec3::ONE, 35.0);
        assert_eq!(cam.forward(), Vec3::ZERO);
    }
}
