use foundation::easing::Easing;
use foundation::math::Vec3;
use foundation::time::Time;
use loading::{AssetLoader, LoadCoordinator, LoadPhase, LoadedAsset};
use render::{Camera3D, RenderFrame, SceneGateway};
use runtime::event_bus::EventBus;
use runtime::frame::Frame;
use runtime::tween::{TweenValue, Tweens};
use scene::NodeTemplate;
use scene::components::Transform;
use showcase::{HOME_VIEW, PropConfig, ShowcaseConfig, Viewpoint};
use std::collections::BTreeMap;

use crate::clips::{AnimationRegistry, PlayDirection};
use crate::transition::{
    CAMERA_FOV, CAMERA_POSITION, CAMERA_TARGET, CameraPhase, PropState, prop_channel_prefix,
    prop_position_channel, prop_rotation_channel,
};

/// Camera boot pose before the intro flight: above the driver's seat, before
/// any asset has arrived.
const BOOT_POSITION: Vec3 = Vec3 {
    x: 0.0,
    y: 1.0,
    z: 0.0,
};

#[derive(Debug, Clone)]
enum Action {
    Deploy {
        prop: String,
    },
    PlayClip {
        model: String,
        clip: String,
        direction: PlayDirection,
        once: bool,
    },
}

#[derive(Debug, Clone)]
struct Scheduled {
    due: Time,
    action: Action,
}

/// The application context: one scene, one camera, one tween scheduler, one
/// clip registry, one load coordinator, owned here rather than living as
/// process globals, so interruption semantics are testable on an instance.
///
/// Drive it with `advance` once per display-refresh frame; route clicks to
/// `request_view`. Every user-triggered camera move runs as two legs through
/// the `home` rest pose: viewpoints are not mutually visible without clipping
/// through cabin geometry, so `home` is the one known-safe waypoint.
pub struct Showcase<L: AssetLoader> {
    config: ShowcaseConfig,
    gateway: SceneGateway,
    tweens: Tweens,
    clips: AnimationRegistry,
    coordinator: LoadCoordinator,
    loader: L,
    phase: CameraPhase,
    /// Destination of the most recent request; its registered duration paces
    /// the return leg when the next request leaves it.
    leaving_view: String,
    /// The single "currently open destination" slot. Only one destination is
    /// ever open, so departure knows exactly what to reverse.
    open_target: Option<String>,
    retracting: Option<String>,
    awaiting_deploy: Option<String>,
    scheduled: Vec<Scheduled>,
    prop_states: BTreeMap<String, PropState>,
    intro_started: bool,
}

impl<L: AssetLoader> Showcase<L> {
    pub fn new(config: ShowcaseConfig, loader: L) -> Self {
        let home = config.home();
        let camera = Camera3D::look_at(BOOT_POSITION, home.target, home.fov_y_deg);
        let required: Vec<String> = config.required().iter().map(|r| r.name.clone()).collect();
        Self {
            gateway: SceneGateway::new(camera),
            tweens: Tweens::new(),
            clips: AnimationRegistry::new(),
            coordinator: LoadCoordinator::new(required),
            loader,
            phase: CameraPhase::Idle,
            leaving_view: HOME_VIEW.to_string(),
            open_target: None,
            retracting: None,
            awaiting_deploy: None,
            scheduled: Vec::new(),
            prop_states: BTreeMap::new(),
            intro_started: false,
            config,
        }
    }

    /// Requests the mandatory initial assets. The intro flight starts on its
    /// own once they have all settled.
    pub fn start(&mut self, frame: Frame, bus: &mut EventBus) {
        let required: Vec<_> = self.config.required().to_vec();
        bus.emit(
            frame,
            "load",
            format!("requesting {} required assets", required.len()),
        );
        for asset in required {
            self.coordinator
                .begin_load(&mut self.loader, &asset.name, &asset.path);
        }
    }

    /// One display-refresh tick: pump loads, advance tweens and clips, apply
    /// their values, and step the transition state machine on completions.
    pub fn advance(&mut self, frame: Frame, bus: &mut EventBus) {
        let outcome = self.coordinator.pump(&mut self.loader, frame, bus);
        for resolved in outcome.resolved {
            self.on_asset_resolved(resolved.name, resolved.asset, frame, bus);
        }
        if outcome.ready {
            self.maybe_start_intro(frame, bus);
        }

        let completions = self.tweens.advance(frame.dt_s);
        for (channel, value) in self.tweens.samples() {
            self.apply_channel(&channel, value);
        }
        for completion in completions {
            self.apply_channel(&completion.channel, completion.value);
            self.on_tween_complete(&completion.channel, frame, bus);
        }

        self.run_due_actions(frame, bus);
        self.clips.advance(frame.dt_s);
    }

    /// Starts a user-triggered transition to the named viewpoint.
    ///
    /// Unknown names are reported and ignored. A request arriving mid-flight
    /// cancels the in-flight camera and prop tweens (by channel identity) and
    /// restarts leg 1 from the camera's current pose.
    pub fn request_view(&mut self, name: &str, frame: Frame, bus: &mut EventBus) {
        if self.config.viewpoint(name).is_none() {
            bus.emit(frame, "transition", format!("unknown viewpoint: {name}"));
            return;
        }

        // Pending deploys and clip starts from the interrupted transition
        // must never fire after this point.
        self.scheduled.clear();
        self.awaiting_deploy = None;
        self.begin_departure_effects(frame, bus);

        let home = self.config.home().clone();
        // Leaving the settled rest pose needs no leg 1; otherwise the return
        // trip uses the timing of the place being left.
        let leg1_duration = if self.camera_matches(&home) {
            0.0
        } else {
            self.config
                .viewpoint(&self.leaving_view)
                .map(|v| v.duration_s)
                .unwrap_or(home.duration_s)
        };
        self.start_camera_flight(home.position, home.target, home.fov_y_deg, leg1_duration);
        self.phase = CameraPhase::GoingHome {
            pending: name.to_string(),
        };
        self.leaving_view = name.to_string();
        bus.emit(frame, "transition", format!("{name}: leg 1 toward {HOME_VIEW}"));
    }

    pub fn camera(&self) -> &Camera3D {
        self.gateway.camera()
    }

    pub fn gateway(&self) -> &SceneGateway {
        &self.gateway
    }

    pub fn phase(&self) -> &CameraPhase {
        &self.phase
    }

    pub fn open_target(&self) -> Option<&str> {
        self.open_target.as_deref()
    }

    pub fn tweens(&self) -> &Tweens {
        &self.tweens
    }

    pub fn clips(&self) -> &AnimationRegistry {
        &self.clips
    }

    pub fn coordinator(&self) -> &LoadCoordinator {
        &self.coordinator
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn is_ready(&self) -> bool {
        self.coordinator.is_ready()
    }

    /// Lifecycle state of a cataloged prop; `None` for unknown names.
    pub fn prop_state(&self, name: &str) -> Option<PropState> {
        self.config.prop(name)?;
        Some(
            self.prop_states
                .get(name)
                .copied()
                .unwrap_or(PropState::Unloaded),
        )
    }

    /// This tick's draw list for the rendering collaborator.
    pub fn render(&self) -> RenderFrame {
        self.gateway.render_frame()
    }

    fn maybe_start_intro(&mut self, frame: Frame, bus: &mut EventBus) {
        if self.intro_started {
            return;
        }
        self.intro_started = true;
        if !matches!(self.phase, CameraPhase::Idle) {
            bus.emit(frame, "transition", "intro skipped: already navigating");
            return;
        }
        let home = self.config.home().clone();
        self.start_camera_flight(home.position, home.target, home.fov_y_deg, home.duration_s);
        self.phase = CameraPhase::GoingToDestination {
            target: HOME_VIEW.to_string(),
        };
        bus.emit(frame, "transition", format!("intro: flying to {HOME_VIEW}"));
    }

    fn on_asset_resolved(
        &mut self,
        name: String,
        asset: LoadedAsset,
        frame: Frame,
        bus: &mut EventBus,
    ) {
        for clip in &asset.clips {
            self.clips.register(&name, &clip.name, clip.duration_s);
        }
        if let Some(prop) = self.config.prop(&name).cloned() {
            if self.awaiting_deploy.as_deref() == Some(name.as_str()) {
                self.awaiting_deploy = None;
                self.spawn_prop_node(&prop);
                self.prop_states.insert(name.clone(), PropState::Docked);
                // The camera flight already covered this prop's delay while
                // the fetch ran; deploy on the next tick.
                self.schedule(frame, 0.0, Action::Deploy { prop: name });
            } else {
                // Resolved after the user moved on: keep the template cached,
                // spawn nothing.
                self.prop_states.insert(name, PropState::Unloaded);
            }
        } else {
            // Primary assets enter the scene with their authored transform.
            self.gateway.add_node(asset.root.clone());
        }
    }

    fn begin_departure_effects(&mut self, frame: Frame, bus: &mut EventBus) {
        let Some(prev) = self.open_target.take() else {
            return;
        };
        // Close whatever the arrival opened.
        let actions: Vec<_> = self.config.actions_for(&prev).to_vec();
        for action in actions {
            self.clips.play(
                &action.model,
                &action.clip,
                PlayDirection::Reverse,
                true,
                frame,
                bus,
            );
        }

        let Some(prop) = self.config.prop(&prev).cloned() else {
            return;
        };
        if self.gateway.find_node(&prop.name).is_some() {
            self.start_prop_tweens(
                &prop.name,
                prop.docked.position,
                prop.docked.rotation,
                prop.duration_s,
            );
            self.retracting = Some(prop.name.clone());
            self.prop_states.insert(prop.name.clone(), PropState::Docked);
            bus.emit(frame, "transition", format!("retracting {}", prop.name));
        } else {
            // The load never produced a node (still in flight, or failed);
            // there is nothing in the scene to animate back.
            self.tweens.cancel_prefix(&prop_channel_prefix(&prop.name));
            if self.coordinator.phase(&prop.name) != Some(LoadPhase::Loading) {
                self.prop_states.insert(prop.name, PropState::Unloaded);
            }
        }
    }

    fn on_tween_complete(&mut self, channel: &str, frame: Frame, bus: &mut EventBus) {
        // CAMERA_TARGET sorts last of the three camera channels, so the whole
        // pose is already applied when the leg machine steps.
        if channel == CAMERA_TARGET {
            match std::mem::replace(&mut self.phase, CameraPhase::Idle) {
                CameraPhase::GoingHome { pending } => {
                    let Some(vp) = self.config.viewpoint(&pending).cloned() else {
                        bus.emit(frame, "transition", format!("viewpoint lost: {pending}"));
                        return;
                    };
                    self.start_camera_flight(vp.position, vp.target, vp.fov_y_deg, vp.duration_s);
                    self.phase = CameraPhase::GoingToDestination {
                        target: pending.clone(),
                    };
                    self.trigger_arrival_effects(&pending, frame, bus);
                    bus.emit(
                        frame,
                        "transition",
                        format!("{pending}: leg 2 from {HOME_VIEW}"),
                    );
                }
                CameraPhase::GoingToDestination { target } => {
                    bus.emit(frame, "transition", format!("arrived at {target}"));
                }
                CameraPhase::Idle => {}
            }
            return;
        }

        if let Some(retracting) = self.retracting.clone()
            && channel == prop_rotation_channel(&retracting)
        {
            self.finish_retraction(&retracting, frame, bus);
        }
    }

    fn trigger_arrival_effects(&mut self, target: &str, frame: Frame, bus: &mut EventBus) {
        self.open_target = Some(target.to_string());

        if let Some(prop) = self.config.prop(target).cloned() {
            if self.gateway.find_node(&prop.name).is_some() {
                self.schedule(
                    frame,
                    prop.delay_s,
                    Action::Deploy {
                        prop: prop.name.clone(),
                    },
                );
            } else if self.coordinator.resident(&prop.name).is_some() {
                // Loaded earlier, node destroyed on retraction: re-instantiate
                // from the cached template without another fetch.
                self.spawn_prop_node(&prop);
                self.prop_states.insert(prop.name.clone(), PropState::Docked);
                self.schedule(
                    frame,
                    prop.delay_s,
                    Action::Deploy {
                        prop: prop.name.clone(),
                    },
                );
            } else if let Some(path) = prop.path.clone() {
                self.prop_states.insert(prop.name.clone(), PropState::Loading);
                self.coordinator
                    .begin_load(&mut self.loader, &prop.name, &path);
                self.awaiting_deploy = Some(prop.name.clone());
            } else {
                bus.emit(
                    frame,
                    "load",
                    format!("prop {} is neither resident nor fetchable", prop.name),
                );
            }
        }

        let actions: Vec<_> = self.config.actions_for(target).to_vec();
        for action in actions {
            self.schedule(
                frame,
                action.delay_s,
                Action::PlayClip {
                    model: action.model,
                    clip: action.clip,
                    direction: PlayDirection::Forward,
                    once: true,
                },
            );
        }
    }

    fn finish_retraction(&mut self, name: &str, frame: Frame, bus: &mut EventBus) {
        self.retracting = None;
        let persistent = self
            .config
            .prop(name)
            .map(|p| p.persistent)
            .unwrap_or(false);
        if persistent {
            bus.emit(frame, "transition", format!("{name} docked"));
        } else {
            self.gateway.remove_node(name);
            self.prop_states
                .insert(name.to_string(), PropState::Unloaded);
            bus.emit(frame, "transition", format!("{name} retracted and removed"));
        }
    }

    fn start_deploy(&mut self, name: &str, frame: Frame, bus: &mut EventBus) {
        let Some(prop) = self.config.prop(name).cloned() else {
            return;
        };
        if self.gateway.find_node(name).is_none() {
            // A retraction can finish (and destroy the node) inside this
            // deploy's delay window; respawn from the cached template.
            if self.coordinator.resident(name).is_some() {
                self.spawn_prop_node(&prop);
            } else {
                bus.emit(frame, "transition", format!("deploy of {name} skipped: no node"));
                return;
            }
        }
        if self.retracting.as_deref() == Some(name) {
            self.retracting = None;
        }
        self.start_prop_tweens(
            name,
            prop.deployed.position,
            prop.deployed.rotation,
            prop.duration_s,
        );
        self.prop_states
            .insert(name.to_string(), PropState::Deployed);
        bus.emit(frame, "transition", format!("deploying {name}"));
    }

    fn run_due_actions(&mut self, frame: Frame, bus: &mut EventBus) {
        let now = frame.time;
        let mut due = Vec::new();
        self.scheduled.retain(|s| {
            if s.due.0 <= now.0 {
                due.push(s.clone());
                false
            } else {
                true
            }
        });
        for item in due {
            match item.action {
                Action::Deploy { prop } => self.start_deploy(&prop, frame, bus),
                Action::PlayClip {
                    model,
                    clip,
                    direction,
                    once,
                } => self.clips.play(&model, &clip, direction, once, frame, bus),
            }
        }
    }

    fn schedule(&mut self, frame: Frame, delay_s: f64, action: Action) {
        self.scheduled.push(Scheduled {
            due: frame.time + delay_s.max(0.0),
            action,
        });
    }

    fn spawn_prop_node(&mut self, prop: &PropConfig) {
        let transform =
            Transform::posed(prop.docked.position, prop.docked.rotation).with_scale(prop.scale);
        self.gateway
            .add_node(NodeTemplate::new(prop.name.clone(), transform));
    }

    fn start_prop_tweens(&mut self, name: &str, to_position: Vec3, to_rotation: Vec3, duration_s: f64) {
        let Some(node) = self.gateway.find_node(name) else {
            return;
        };
        let from_position = node.transform.position;
        let from_rotation = node.transform.rotation;
        self.tweens.start(
            prop_position_channel(name),
            TweenValue::Vector(from_position),
            TweenValue::Vector(to_position),
            duration_s,
            Easing::QuadInOut,
        );
        self.tweens.start(
            prop_rotation_channel(name),
            TweenValue::Vector(from_rotation),
            TweenValue::Vector(to_rotation),
            duration_s,
            Easing::QuadInOut,
        );
    }

    fn start_camera_flight(&mut self, position: Vec3, target: Vec3, fov_y_deg: f64, duration_s: f64) {
        let cam = *self.gateway.camera();
        self.tweens.start(
            CAMERA_POSITION,
            TweenValue::Vector(cam.position),
            TweenValue::Vector(position),
            duration_s,
            Easing::QuadInOut,
        );
        self.tweens.start(
            CAMERA_TARGET,
            TweenValue::Vector(cam.target),
            TweenValue::Vector(target),
            duration_s,
            Easing::QuadInOut,
        );
        self.tweens.start(
            CAMERA_FOV,
            TweenValue::Scalar(cam.fov_y_deg),
            TweenValue::Scalar(fov_y_deg),
            duration_s,
            Easing::QuadInOut,
        );
    }

    fn camera_matches(&self, vp: &Viewpoint) -> bool {
        let cam = self.gateway.camera();
        cam.position == vp.position && cam.target == vp.target && cam.fov_y_deg == vp.fov_y_deg
    }

    fn apply_channel(&mut self, channel: &str, value: TweenValue) {
        match (channel, value) {
            (CAMERA_POSITION, TweenValue::Vector(v)) => self.gateway.set_camera_position(v),
            (CAMERA_TARGET, TweenValue::Vector(v)) => self.gateway.set_camera_target(v),
            (CAMERA_FOV, TweenValue::Scalar(s)) => self.gateway.set_camera_fov(s),
            _ => {
                let Some(rest) = channel.strip_prefix("prop.") else {
                    return;
                };
                let Some((name, field)) = rest.rsplit_once('.') else {
                    return;
                };
                let TweenValue::Vector(v) = value else {
                    return;
                };
                // A completion for a node removed in the same batch lands
                // here and applies to nothing.
                let Some(node) = self.gateway.node_mut(name) else {
                    return;
                };
                match field {
                    "position" => node.transform.position = v,
                    "rotation" => node.transform.rotation = v,
                    _ => {}
                }
            }
        }
    }
}
