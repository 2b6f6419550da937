use std::collections::{BTreeMap, BTreeSet};

use runtime::event_bus::EventBus;
use runtime::frame::Frame;

use crate::loader::{AssetLoader, LoadedAsset};
use crate::phase::LoadPhase;

#[derive(Debug)]
enum AssetEntry {
    Loading,
    Resident(LoadedAsset),
    Failed,
}

impl AssetEntry {
    fn phase(&self) -> LoadPhase {
        match self {
            AssetEntry::Loading => LoadPhase::Loading,
            AssetEntry::Resident(_) => LoadPhase::Resident,
            AssetEntry::Failed => LoadPhase::Failed,
        }
    }
}

/// An asset that resolved during this pump.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAsset {
    pub name: String,
    pub asset: LoadedAsset,
}

#[derive(Debug, Default)]
pub struct PumpOutcome {
    pub resolved: Vec<ResolvedAsset>,
    /// True on the single pump where the readiness flag flipped.
    pub ready: bool,
}

/// Tracks asynchronous asset resolution and fires scene readiness once.
///
/// Deduplication is keyed on the asset *name*, not on a scene-graph lookup:
/// two clicks racing toward the same prop join the one in-flight fetch
/// instead of issuing a second one. A resolved asset's template stays
/// here for the rest of the session, so re-deploying a prop whose scene node
/// was destroyed re-instantiates without another fetch.
#[derive(Debug)]
pub struct LoadCoordinator {
    entries: BTreeMap<String, AssetEntry>,
    required: BTreeSet<String>,
    ready_fired: bool,
}

impl LoadCoordinator {
    pub fn new(required: impl IntoIterator<Item = String>) -> Self {
        Self {
            entries: BTreeMap::new(),
            required: required.into_iter().collect(),
            ready_fired: false,
        }
    }

    pub fn phase(&self, name: &str) -> Option<LoadPhase> {
        self.entries.get(name).map(AssetEntry::phase)
    }

    /// The loaded template for a resident asset.
    pub fn resident(&self, name: &str) -> Option<&LoadedAsset> {
        match self.entries.get(name) {
            Some(AssetEntry::Resident(asset)) => Some(asset),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready_fired
    }

    /// Begins loading `name` unless it is already in flight or resident.
    ///
    /// Idempotent per distinct name: only an absent or failed entry issues a
    /// fetch. Returns the phase after the call.
    pub fn begin_load(&mut self, loader: &mut dyn AssetLoader, name: &str, path: &str) -> LoadPhase {
        match self.entries.get(name) {
            Some(AssetEntry::Loading) => LoadPhase::Loading,
            Some(AssetEntry::Resident(_)) => LoadPhase::Resident,
            Some(AssetEntry::Failed) | None => {
                loader.begin(name, path);
                self.entries.insert(name.to_string(), AssetEntry::Loading);
                LoadPhase::Loading
            }
        }
    }

    /// Drains loader completions, updates phases, and settles readiness.
    ///
    /// Failures are reported on the bus and count toward readiness
    /// settlement, so the loading screen can never hang on one bad asset.
    pub fn pump(
        &mut self,
        loader: &mut dyn AssetLoader,
        frame: Frame,
        bus: &mut EventBus,
    ) -> PumpOutcome {
        let mut outcome = PumpOutcome::default();

        for (name, result) in loader.drain_completed() {
            if !matches!(self.entries.get(&name), Some(AssetEntry::Loading)) {
                bus.emit(frame, "load", format!("dropped stale completion for {name}"));
                continue;
            }
            match result {
                Ok(asset) => {
                    bus.emit(frame, "load", format!("{name} resolved"));
                    self.entries
                        .insert(name.clone(), AssetEntry::Resident(asset.clone()));
                    outcome.resolved.push(ResolvedAsset { name, asset });
                }
                Err(err) => {
                    bus.emit(frame, "load", format!("{name} failed: {err}"));
                    self.entries.insert(name, AssetEntry::Failed);
                }
            }
        }

        if !self.ready_fired && self.required_settled() {
            self.ready_fired = true;
            outcome.ready = true;
            bus.emit(frame, "ready", "all required assets settled");
        }

        outcome
    }

    fn required_settled(&self) -> bool {
        self.required.iter().all(|name| {
            self.entries
                .get(name)
                .map(|e| e.phase().is_settled())
                .unwrap_or(false)
        })
    }
}
