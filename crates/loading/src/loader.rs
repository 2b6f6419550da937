use std::collections::BTreeMap;

use scene::NodeTemplate;

/// A playable clip embedded in a loaded model.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipDescriptor {
    pub name: String,
    pub duration_s: f64,
}

/// A resolved asset: the scene subtree plus any embedded animation clips.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedAsset {
    pub root: NodeTemplate,
    pub clips: Vec<ClipDescriptor>,
}

impl LoadedAsset {
    pub fn mesh_only(root: NodeTemplate) -> Self {
        Self {
            root,
            clips: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    Network { path: String },
    Parse { path: String, detail: String },
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Network { path } => write!(f, "network error fetching {path}"),
            LoadError::Parse { path, detail } => write!(f, "failed to parse {path}: {detail}"),
        }
    }
}

impl std::error::Error for LoadError {}

/// The asynchronous loader collaborator (GLTF-equivalent subtree loading).
///
/// `begin` issues a fetch; results are pumped per frame via
/// `drain_completed`, never delivered re-entrantly from `begin`. The
/// coordinator owns deduplication; a loader may be asked to fetch a path it
/// has seen before and should treat each `begin` as a fresh fetch.
pub trait AssetLoader {
    fn begin(&mut self, name: &str, path: &str);

    /// Drains loads that finished since the last call, in completion order.
    fn drain_completed(&mut self) -> Vec<(String, Result<LoadedAsset, LoadError>)>;
}

#[derive(Debug, Clone)]
struct Scripted {
    result: Result<LoadedAsset, LoadError>,
    latency_pumps: u32,
}

#[derive(Debug)]
struct InFlight {
    name: String,
    path: String,
    remaining_pumps: u32,
}

/// Deterministic scripted loader for tests and headless runs.
///
/// Each named outcome resolves after a fixed number of `drain_completed`
/// pumps, so "slow" assets are expressed in frames, not wall time. Names
/// without a scripted outcome fail with a network error.
#[derive(Debug, Default)]
pub struct ScriptedLoader {
    outcomes: BTreeMap<String, Scripted>,
    in_flight: Vec<InFlight>,
    begun: BTreeMap<String, u32>,
}

impl ScriptedLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts `name` to resolve with `asset` on the next pump.
    pub fn resolve_with(&mut self, name: impl Into<String>, asset: LoadedAsset) {
        self.resolve_after(name, asset, 0);
    }

    /// Scripts `name` to resolve after `latency_pumps` additional pumps.
    pub fn resolve_after(&mut self, name: impl Into<String>, asset: LoadedAsset, latency_pumps: u32) {
        self.outcomes.insert(
            name.into(),
            Scripted {
                result: Ok(asset),
                latency_pumps,
            },
        );
    }

    pub fn fail_with(&mut self, name: impl Into<String>, error: LoadError) {
        self.outcomes.insert(
            name.into(),
            Scripted {
                result: Err(error),
                latency_pumps: 0,
            },
        );
    }

    /// How many times `begin` was called for `name`; the dedup assertions in
    /// coordinator tests hinge on this.
    pub fn begin_count(&self, name: &str) -> u32 {
        self.begun.get(name).copied().unwrap_or(0)
    }
}

impl AssetLoader for ScriptedLoader {
    fn begin(&mut self, name: &str, path: &str) {
        *self.begun.entry(name.to_string()).or_insert(0) += 1;
        let remaining_pumps = self
            .outcomes
            .get(name)
            .map(|s| s.latency_pumps)
            .unwrap_or(0);
        self.in_flight.push(InFlight {
            name: name.to_string(),
            path: path.to_string(),
            remaining_pumps,
        });
    }

    fn drain_completed(&mut self) -> Vec<(String, Result<LoadedAsset, LoadError>)> {
        let mut done = Vec::new();
        let mut still_pending = Vec::new();
        for mut flight in self.in_flight.drain(..) {
            if flight.remaining_pumps > 0 {
                flight.remaining_pumps -= 1;
                still_pending.push(flight);
                continue;
            }
            let result = match self.outcomes.get(&flight.name) {
                Some(scripted) => scripted.result.clone(),
                None => Err(LoadError::Network { path: flight.path }),
            };
            done.push((flight.name, result));
        }
        self.in_flight = still_pending;
        done
    }
}

#[cfg(test)]
mod tests {
    use super::{AssetLoader, LoadError, LoadedAsset, ScriptedLoader};
    use scene::NodeTemplate;
    use scene::components::Transform;

    fn asset(name: &str) -> LoadedAsset {
        LoadedAsset::mesh_only(NodeTemplate::new(name, Transform::identity()))
    }

    #[test]
    fn resolves_on_next_pump() {
        let mut loader = ScriptedLoader::new();
        loader.resolve_with("vehicle", asset("vehicle"));
        loader.begin("vehicle", "assets/vehicle.glb");

        let done = loader.drain_completed();
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].0, "vehicle");
        assert!(done[0].1.is_ok());
        assert!(loader.drain_completed().is_empty());
    }

    #[test]
    fn latency_defers_completion_by_pumps() {
        let mut loader = ScriptedLoader::new();
        loader.resolve_after("manual", asset("manual"), 2);
        loader.begin("manual", "assets/manual.glb");

        assert!(loader.drain_completed().is_empty());
        assert!(loader.drain_completed().is_empty());
        assert_eq!(loader.drain_completed().len(), 1);
    }

    #[test]
    fn unscripted_names_fail_with_network_error() {
        let mut loader = ScriptedLoader::new();
        loader.begin("ghost", "assets/ghost.glb");
        let done = loader.drain_completed();
        assert_eq!(
            done[0].1,
            Err(LoadError::Network {
                path: "assets/ghost.glb".to_string()
            })
        );
    }

    #[test]
    fn begin_count_tracks_every_fetch() {
        let mut loader = ScriptedLoader::new();
        loader.resolve_with("phone", asset("phone"));
        loader.begin("phone", "a");
        loader.begin("phone", "a");
        assert_eq!(loader.begin_count("phone"), 2);
        assert_eq!(loader.begin_count("tablet"), 0);
    }
}
