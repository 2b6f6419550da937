use loading::AssetLoader;
use runtime::event_bus::EventBus;
use runtime::frame::Frame;

use crate::engine::Showcase;

/// The data attribute a clickable element carries to name its viewpoint.
pub const VIEW_ATTRIBUTE: &str = "data-view";

/// Routes the single delegated document click listener into the engine.
///
/// The shell extracts the clicked element's [`VIEW_ATTRIBUTE`] value and
/// passes it here; clicks outside any annotated element arrive as `None` and
/// are ignored. Name validation belongs to the engine; the dispatcher only
/// normalizes and forwards.
pub struct InputDispatcher;

impl InputDispatcher {
    pub fn dispatch<L: AssetLoader>(
        showcase: &mut Showcase<L>,
        view_attr: Option<&str>,
        frame: Frame,
        bus: &mut EventBus,
    ) {
        let Some(raw) = view_attr else {
            return;
        };
        let name = raw.trim();
        if name.is_empty() {
            return;
        }
        bus.emit(frame, "input", format!("click -> {name}"));
        showcase.request_view(name, frame, bus);
    }
}

#[cfg(test)]
mod tests {
    use super::InputDispatcher;
    use crate::engine::Showcase;
    use crate::transition::CameraPhase;
    use loading::ScriptedLoader;
    use runtime::event_bus::EventBus;
    use runtime::frame::Frame;
    use showcase::{ShowcaseConfig, ShowcaseManifest};

    fn rig() -> (Showcase<ScriptedLoader>, EventBus, Frame) {
        let config = ShowcaseConfig::from_manifest(&ShowcaseManifest::default_showcase()).unwrap();
        let showcase = Showcase::new(config, ScriptedLoader::new());
        (showcase, EventBus::new(), Frame::new(0, 1.0 / 60.0))
    }

    #[test]
    fn clicks_without_the_attribute_are_ignored() {
        let (mut showcase, mut bus, frame) = rig();
        InputDispatcher::dispatch(&mut showcase, None, frame, &mut bus);
        InputDispatcher::dispatch(&mut showcase, Some("   "), frame, &mut bus);
        assert_eq!(showcase.phase(), &CameraPhase::Idle);
        assert!(bus.of_kind("input").is_empty());
    }

    #[test]
    fn annotated_clicks_start_a_transition() {
        let (mut showcase, mut bus, frame) = rig();
        InputDispatcher::dispatch(&mut showcase, Some(" dash "), frame, &mut bus);
        assert_eq!(
            showcase.phase(),
            &CameraPhase::GoingHome {
                pending: "dash".to_string()
            }
        );
        assert_eq!(bus.of_kind("input").len(), 1);
    }

    #[test]
    fn unknown_names_are_forwarded_for_the_engine_to_report() {
        let (mut showcase, mut bus, frame) = rig();
        InputDispatcher::dispatch(&mut showcase, Some("trunk"), frame, &mut bus);
        assert_eq!(showcase.phase(), &CameraPhase::Idle);
        assert_eq!(bus.of_kind("transition").len(), 1);
    }
}
