use crate::frame::Frame;

/// Diagnostic event emitted by engine components.
///
/// Every "reported error" in the showcase is an event on the bus rather than
/// a panic: a missing viewpoint, a failed asset load, an unknown clip. The
/// shell decides what to surface; tests assert on the log directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub frame_index: u64,
    pub kind: &'static str,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct EventBus {
    events: Vec<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, frame: Frame, kind: &'static str, message: impl Into<String>) {
        self.events.push(Event {
            frame_index: frame.index,
            kind,
            message: message.into(),
        });
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Events of one kind, in emission order.
    pub fn of_kind(&self, kind: &str) -> Vec<&Event> {
        self.events.iter().filter(|e| e.kind == kind).collect()
    }

    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::EventBus;
    use crate::frame::Frame;

    #[test]
    fn records_events_with_frame_index() {
        let mut bus = EventBus::new();
        let f = Frame::new(2, 0.1);
        bus.emit(f, "load", "vehicle resolved");
        assert_eq!(bus.events().len(), 1);
        assert_eq!(bus.events()[0].frame_index, 2);
    }

    #[test]
    fn of_kind_filters_and_preserves_order() {
        let mut bus = EventBus::new();
        let f = Frame::new(0, 1.0);
        bus.emit(f, "load", "a");
        bus.emit(f, "clip", "b");
        bus.emit(f, "load", "c");

        let loads = bus.of_kind("load");
        let msgs: Vec<_> = loads.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(msgs, vec!["a", "c"]);
    }

    #[test]
    fn drain_clears_events() {
        let mut bus = EventBus::new();
        bus.emit(Frame::new(0, 1.0), "k", "m");
        let drained = bus.drain();
        assert_eq!(drained.len(), 1);
        assert!(bus.events().is_empty());
    }
}
