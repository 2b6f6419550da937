/// Lifecycle of a named asset as seen by the coordinator.
///
/// `Loading → Resident | Failed`. A `Failed` asset may be retried by a later
/// `begin_load`; a `Resident` one never refetches; its loaded template is
/// handed back instead.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LoadPhase {
    Loading,
    Resident,
    Failed,
}

impl LoadPhase {
    /// Settled assets count toward readiness, whether they resolved or not,
    /// so a failed required asset can never deadlock the loading screen.
    pub fn is_settled(self) -> bool {
        matches!(self, LoadPhase::Resident | LoadPhase::Failed)
    }
}
