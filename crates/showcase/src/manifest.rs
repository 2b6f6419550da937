use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const MANIFEST_VERSION: &str = "1.0";

/// Serialized showcase configuration: viewpoints, props, the required
/// initial asset set, and the viewpoint → clip action table.
///
/// The built-in default ([`ShowcaseManifest::default_showcase`]) describes
/// the car showcase this engine ships with; a JSON document of the same
/// shape can replace it wholesale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShowcaseManifest {
    pub version: String,
    pub viewpoints: Vec<ViewpointSpec>,
    #[serde(default)]
    pub props: Vec<PropSpec>,
    #[serde(default)]
    pub required: Vec<RequiredAssetSpec>,
    #[serde(default)]
    pub clip_actions: BTreeMap<String, Vec<ClipActionSpec>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ViewpointSpec {
    pub name: String,
    pub fov_y_deg: f64,
    pub position: [f64; 3],
    pub target: [f64; 3],
    pub duration_s: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PropSpec {
    pub name: String,
    /// Absent for props bundled with the primary scene load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub docked: PoseSpec,
    pub deployed: PoseSpec,
    #[serde(default = "unit_scale")]
    pub scale: [f64; 3],
    pub duration_s: f64,
    #[serde(default)]
    pub delay_s: f64,
    /// Persistent props keep their scene node after retracting to the docked
    /// pose; everything else is destroyed and reloaded on the next deploy.
    #[serde(default)]
    pub persistent: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PoseSpec {
    pub position: [f64; 3],
    /// Euler rotation, radians.
    #[serde(default = "zero3")]
    pub rotation: [f64; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RequiredAssetSpec {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClipActionSpec {
    pub model: String,
    pub clip: String,
    #[serde(default)]
    pub delay_s: f64,
}

fn unit_scale() -> [f64; 3] {
    [1.0, 1.0, 1.0]
}

fn zero3() -> [f64; 3] {
    [0.0, 0.0, 0.0]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestParseError(pub String);

impl std::fmt::Display for ManifestParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "showcase manifest parse error: {}", self.0)
    }
}

impl std::error::Error for ManifestParseError {}

impl ShowcaseManifest {
    pub fn from_json_str(raw: &str) -> Result<Self, ManifestParseError> {
        serde_json::from_str(raw).map_err(|e| ManifestParseError(e.to_string()))
    }

    pub fn to_json_string(&self) -> Result<String, ManifestParseError> {
        serde_json::to_string_pretty(self).map_err(|e| ManifestParseError(e.to_string()))
    }

    /// The shipped car showcase: a coupe interior with phone, manual and
    /// tablet props. Coordinates are cabin-local meters; the driver's seat
    /// rest pose is `home`.
    pub fn default_showcase() -> Self {
        Self {
            version: MANIFEST_VERSION.to_string(),
            viewpoints: vec![
                ViewpointSpec {
                    name: "home".to_string(),
                    fov_y_deg: 35.0,
                    position: [0.05, 0.95, -0.38],
                    target: [4.0, 0.7, -0.38],
                    duration_s: 2.0,
                },
                ViewpointSpec {
                    name: "dash".to_string(),
                    fov_y_deg: 30.0,
                    position: [0.32, 0.92, -0.38],
                    target: [0.78, 0.68, -0.38],
                    duration_s: 3.5,
                },
                ViewpointSpec {
                    name: "visor".to_string(),
                    fov_y_deg: 28.0,
                    position: [0.25, 0.98, -0.38],
                    target: [0.45, 1.18, -0.38],
                    duration_s: 2.5,
                },
                ViewpointSpec {
                    name: "phone".to_string(),
                    fov_y_deg: 32.0,
                    position: [0.18, 0.85, -0.15],
                    target: [0.35, 0.64, 0.06],
                    duration_s: 2.0,
                },
                ViewpointSpec {
                    name: "manual".to_string(),
                    fov_y_deg: 34.0,
                    position: [0.3, 0.9, 0.1],
                    target: [0.62, 0.6, 0.4],
                    duration_s: 2.8,
                },
                ViewpointSpec {
                    name: "nav".to_string(),
                    fov_y_deg: 26.0,
                    position: [0.35, 0.88, -0.2],
                    target: [0.68, 0.72, 0.0],
                    duration_s: 2.2,
                },
                ViewpointSpec {
                    name: "tablet".to_string(),
                    fov_y_deg: 33.0,
                    position: [0.2, 0.95, 0.05],
                    target: [0.36, 0.7, 0.32],
                    duration_s: 2.4,
                },
            ],
            props: vec![
                PropSpec {
                    name: "phone".to_string(),
                    path: Some("assets/images/phoneV2Comp.glb".to_string()),
                    docked: PoseSpec {
                        position: [0.3, 0.45, 0.05],
                        rotation: [0.0, 0.0, 0.0],
                    },
                    deployed: PoseSpec {
                        position: [0.33, 0.66, 0.06],
                        rotation: [-0.35, 0.0, 0.0],
                    },
                    scale: [1.0, 1.0, 1.0],
                    duration_s: 1.2,
                    delay_s: 0.3,
                    persistent: false,
                },
                PropSpec {
                    name: "manual".to_string(),
                    path: Some("assets/images/manualComp.glb".to_string()),
                    docked: PoseSpec {
                        position: [0.66, 0.52, 0.4],
                        rotation: [0.0, 0.0, 0.0],
                    },
                    deployed: PoseSpec {
                        position: [0.56, 0.64, 0.36],
                        rotation: [-0.5, 0.35, 0.0],
                    },
                    scale: [1.0, 1.0, 1.0],
                    duration_s: 1.5,
                    delay_s: 0.5,
                    persistent: false,
                },
                PropSpec {
                    name: "tablet".to_string(),
                    path: Some("assets/images/tabletV2Comp.glb".to_string()),
                    docked: PoseSpec {
                        position: [0.15, 0.5, 0.3],
                        rotation: [0.0, 0.0, 0.0],
                    },
                    deployed: PoseSpec {
                        position: [0.32, 0.72, 0.3],
                        rotation: [-0.4, 0.0, 0.0],
                    },
                    scale: [1.0, 1.0, 1.0],
                    duration_s: 1.4,
                    delay_s: 0.3,
                    persistent: true,
                },
            ],
            required: vec![
                RequiredAssetSpec {
                    name: "environment".to_string(),
                    path: "assets/images/bg.exr".to_string(),
                },
                RequiredAssetSpec {
                    name: "vehicle".to_string(),
                    path: "assets/images/blackSupraComp2.glb".to_string(),
                },
            ],
            clip_actions: BTreeMap::from([
                (
                    "manual".to_string(),
                    vec![
                        ClipActionSpec {
                            model: "vehicle".to_string(),
                            clip: "OpenGlovebox".to_string(),
                            delay_s: 0.0,
                        },
                        ClipActionSpec {
                            model: "manual".to_string(),
                            clip: "OpenBook".to_string(),
                            delay_s: 0.4,
                        },
                    ],
                ),
                (
                    "visor".to_string(),
                    vec![ClipActionSpec {
                        model: "vehicle".to_string(),
                        clip: "OpenVisor".to_string(),
                        delay_s: 0.6,
                    }],
                ),
                (
                    "nav".to_string(),
                    vec![ClipActionSpec {
                        model: "vehicle".to_string(),
                        clip: "ScreenOn".to_string(),
                        delay_s: 0.2,
                    }],
                ),
            ]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ShowcaseManifest;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_showcase_round_trips_through_json() {
        let manifest = ShowcaseManifest::default_showcase();
        let json = manifest.to_json_string().unwrap();
        let back = ShowcaseManifest::from_json_str(&json).unwrap();
        assert_eq!(back, manifest);
    }

    #[test]
    fn optional_fields_default() {
        let raw = r#"{
            "version": "1.0",
            "viewpoints": [
                {"name": "home", "fov_y_deg": 35.0,
                 "position": [0.0, 1.0, 0.0], "target": [1.0, 0.0, 0.0],
                 "duration_s": 2.0}
            ],
            "props": [
                {"name": "phone",
                 "docked": {"position": [0.0, 0.0, 0.0]},
                 "deployed": {"position": [0.0, 1.0, 0.0]},
                 "duration_s": 1.0}
            ]
        }"#;
        let manifest = ShowcaseManifest::from_json_str(raw).unwrap();
        let prop = &manifest.props[0];
        assert_eq!(prop.path, None);
        assert_eq!(prop.scale, [1.0, 1.0, 1.0]);
        assert_eq!(prop.delay_s, 0.0);
        assert!(!prop.persistent);
        assert_eq!(prop.docked.rotation, [0.0, 0.0, 0.0]);
        assert!(manifest.required.is_empty());
        assert!(manifest.clip_actions.is_empty());
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let err = ShowcaseManifest::from_json_str("{").unwrap_err();
        assert!(err.to_string().contains("parse error"));
    }
}
