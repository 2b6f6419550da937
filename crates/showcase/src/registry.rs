use std::collections::BTreeMap;

use foundation::math::Vec3;

use crate::manifest::{ClipActionSpec, ShowcaseManifest};

/// The universal intermediate pose every transition routes through.
pub const HOME_VIEW: &str = "home";

/// Named camera configuration. Immutable after registry construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewpoint {
    pub name: String,
    pub fov_y_deg: f64,
    pub position: Vec3,
    pub target: Vec3,
    pub duration_s: f64,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Vec3,
}

/// A secondary loadable model with docked and deployed poses.
#[derive(Debug, Clone, PartialEq)]
pub struct PropConfig {
    pub name: String,
    /// `None` means the prop arrives with the primary scene load and needs
    /// no fetch of its own.
    pub path: Option<String>,
    pub docked: Pose,
    pub deployed: Pose,
    pub scale: Vec3,
    pub duration_s: f64,
    pub delay_s: f64,
    pub persistent: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClipAction {
    pub model: String,
    pub clip: String,
    pub delay_s: f64,
}

impl From<&ClipActionSpec> for ClipAction {
    fn from(spec: &ClipActionSpec) -> Self {
        Self {
            model: spec.model.clone(),
            clip: spec.clip.clone(),
            delay_s: spec.delay_s,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequiredAsset {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingHome,
    DuplicateViewpoint(String),
    DuplicateProp(String),
    InvalidFov { viewpoint: String },
    NegativeDuration { name: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingHome => {
                write!(f, "viewpoint registry has no '{HOME_VIEW}' entry")
            }
            ConfigError::DuplicateViewpoint(name) => {
                write!(f, "duplicate viewpoint name: {name}")
            }
            ConfigError::DuplicateProp(name) => write!(f, "duplicate prop name: {name}"),
            ConfigError::InvalidFov { viewpoint } => {
                write!(f, "viewpoint {viewpoint} has a non-positive field of view")
            }
            ConfigError::NegativeDuration { name } => {
                write!(f, "{name} has a negative transition duration")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Validated, name-keyed showcase configuration: the Viewpoint Registry, the
/// Prop Catalog, the clip action table and the required initial asset set.
#[derive(Debug, Clone, PartialEq)]
pub struct ShowcaseConfig {
    viewpoints: BTreeMap<String, Viewpoint>,
    props: BTreeMap<String, PropConfig>,
    actions: BTreeMap<String, Vec<ClipAction>>,
    required: Vec<RequiredAsset>,
}

impl ShowcaseConfig {
    pub fn from_manifest(manifest: &ShowcaseManifest) -> Result<Self, ConfigError> {
        let mut viewpoints = BTreeMap::new();
        for spec in &manifest.viewpoints {
            if spec.fov_y_deg <= 0.0 {
                return Err(ConfigError::InvalidFov {
                    viewpoint: spec.name.clone(),
                });
            }
            if spec.duration_s < 0.0 {
                return Err(ConfigError::NegativeDuration {
                    name: spec.name.clone(),
                });
            }
            let viewpoint = Viewpoint {
                name: spec.name.clone(),
                fov_y_deg: spec.fov_y_deg,
                position: spec.position.into(),
                target: spec.target.into(),
                duration_s: spec.duration_s,
            };
            if viewpoints.insert(spec.name.clone(), viewpoint).is_some() {
                return Err(ConfigError::DuplicateViewpoint(spec.name.clone()));
            }
        }
        if !viewpoints.contains_key(HOME_VIEW) {
            return Err(ConfigError::MissingHome);
        }

        let mut props = BTreeMap::new();
        for spec in &manifest.props {
            if spec.duration_s < 0.0 || spec.delay_s < 0.0 {
                return Err(ConfigError::NegativeDuration {
                    name: spec.name.clone(),
                });
            }
            let prop = PropConfig {
                name: spec.name.clone(),
                path: spec.path.clone(),
                docked: Pose {
                    position: spec.docked.position.into(),
                    rotation: spec.docked.rotation.into(),
                },
                deployed: Pose {
                    position: spec.deployed.position.into(),
                    rotation: spec.deployed.rotation.into(),
                },
                scale: spec.scale.into(),
                duration_s: spec.duration_s,
                delay_s: spec.delay_s,
                persistent: spec.persistent,
            };
            if props.insert(spec.name.clone(), prop).is_some() {
                return Err(ConfigError::DuplicateProp(spec.name.clone()));
            }
        }

        let actions = manifest
            .clip_actions
            .iter()
            .map(|(target, specs)| {
                (
                    target.clone(),
                    specs.iter().map(ClipAction::from).collect(),
                )
            })
            .collect();

        let required = manifest
            .required
            .iter()
            .map(|spec| RequiredAsset {
                name: spec.name.clone(),
                path: spec.path.clone(),
            })
            .collect();

        Ok(Self {
            viewpoints,
            props,
            actions,
            required,
        })
    }

    pub fn viewpoint(&self, name: &str) -> Option<&Viewpoint> {
        self.viewpoints.get(name)
    }

    pub fn home(&self) -> &Viewpoint {
        // Guaranteed by `from_manifest`.
        &self.viewpoints[HOME_VIEW]
    }

    pub fn prop(&self, name: &str) -> Option<&PropConfig> {
        self.props.get(name)
    }

    /// Clip actions fired when `target` becomes the destination; empty for
    /// targets without an entry.
    pub fn actions_for(&self, target: &str) -> &[ClipAction] {
        self.actions.get(target).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn required(&self) -> &[RequiredAsset] {
        &self.required
    }

    pub fn viewpoint_names(&self) -> impl Iterator<Item = &str> {
        self.viewpoints.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, HOME_VIEW, ShowcaseConfig};
    use crate::manifest::{ShowcaseManifest, ViewpointSpec};
    use foundation::math::Vec3;
    use pretty_assertions::assert_eq;

    fn viewpoint(name: &str) -> ViewpointSpec {
        ViewpointSpec {
            name: name.to_string(),
            fov_y_deg: 35.0,
            position: [0.0, 1.0, 0.0],
            target: [1.0, 0.0, 0.0],
            duration_s: 2.0,
        }
    }

    #[test]
    fn default_showcase_validates() {
        let config = ShowcaseConfig::from_manifest(&ShowcaseManifest::default_showcase()).unwrap();
        assert!(config.viewpoint(HOME_VIEW).is_some());
        assert!(config.prop("tablet").map(|p| p.persistent).unwrap_or(false));
        assert_eq!(config.required().len(), 2);
        assert_eq!(config.actions_for("manual").len(), 2);
        assert!(config.actions_for("dash").is_empty());
    }

    #[test]
    fn missing_home_is_rejected() {
        let manifest = ShowcaseManifest {
            viewpoints: vec![viewpoint("dash")],
            ..ShowcaseManifest::default_showcase()
        };
        let err = ShowcaseConfig::from_manifest(&manifest).unwrap_err();
        assert_eq!(err, ConfigError::MissingHome);
    }

    #[test]
    fn duplicate_viewpoints_are_rejected() {
        let manifest = ShowcaseManifest {
            viewpoints: vec![viewpoint("home"), viewpoint("dash"), viewpoint("dash")],
            ..ShowcaseManifest::default_showcase()
        };
        let err = ShowcaseConfig::from_manifest(&manifest).unwrap_err();
        assert_eq!(err, ConfigError::DuplicateViewpoint("dash".to_string()));
    }

    #[test]
    fn non_positive_fov_is_rejected() {
        let mut bad = viewpoint("home");
        bad.fov_y_deg = 0.0;
        let manifest = ShowcaseManifest {
            viewpoints: vec![bad],
            ..ShowcaseManifest::default_showcase()
        };
        let err = ShowcaseConfig::from_manifest(&manifest).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidFov {
                viewpoint: "home".to_string()
            }
        );
    }

    #[test]
    fn viewpoint_positions_become_vectors() {
        let config = ShowcaseConfig::from_manifest(&ShowcaseManifest::default_showcase()).unwrap();
        let home = config.home();
        assert_eq!(home.position, Vec3::new(0.05, 0.95, -0.38));
        assert_eq!(home.fov_y_deg, 35.0);
    }
}
