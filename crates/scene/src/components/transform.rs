use foundation::math::Vec3;

/// Node transform: position, Euler rotation (radians), per-axis scale.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }

    pub fn translate(position: Vec3) -> Self {
        Self {
            position,
            ..Self::identity()
        }
    }

    pub fn posed(position: Vec3, rotation: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale: Vec3::ONE,
        }
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::Transform;
    use foundation::math::Vec3;

    #[test]
    fn identity_is_origin_unit_scale() {
        let t = Transform::identity();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.rotation, Vec3::ZERO);
        assert_eq!(t.scale, Vec3::ONE);
    }

    #[test]
    fn posed_keeps_unit_scale() {
        let t = Transform::posed(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.0, 1.5, 0.0));
        assert_eq!(t.scale, Vec3::ONE);
        assert_eq!(t.position, Vec3::new(1.0, 2.0, 3.0));
    }
}
