use std::collections::BTreeMap;

use runtime::event_bus::EventBus;
use runtime::frame::Frame;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PlayDirection {
    Forward,
    Reverse,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClipState {
    pub duration_s: f64,
    pub playhead_s: f64,
    pub direction: PlayDirection,
    /// Play once and hold at the boundary; `false` loops.
    pub once: bool,
    pub playing: bool,
}

/// Playback registry for clips embedded in loaded models.
///
/// Keyed by `(model, clip)`; entries are registered as models resolve and
/// never destroyed during the session. Playing a clip in reverse resets its
/// playhead to the clip end, so a "close" mirrors the "open" it undoes.
#[derive(Debug, Default)]
pub struct AnimationRegistry {
    clips: BTreeMap<(String, String), ClipState>,
}

impl AnimationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a clip; an already-registered `(model, clip)` is left
    /// untouched so a model reload cannot reset a live playhead.
    pub fn register(&mut self, model: &str, clip: &str, duration_s: f64) {
        self.clips
            .entry((model.to_string(), clip.to_string()))
            .or_insert(ClipState {
                duration_s: duration_s.max(0.0),
                playhead_s: 0.0,
                direction: PlayDirection::Forward,
                once: true,
                playing: false,
            });
    }

    pub fn is_registered(&self, model: &str, clip: &str) -> bool {
        self.clips
            .contains_key(&(model.to_string(), clip.to_string()))
    }

    pub fn playhead(&self, model: &str, clip: &str) -> Option<f64> {
        self.clips
            .get(&(model.to_string(), clip.to_string()))
            .map(|c| c.playhead_s)
    }

    pub fn is_playing(&self, model: &str, clip: &str) -> bool {
        self.clips
            .get(&(model.to_string(), clip.to_string()))
            .map(|c| c.playing)
            .unwrap_or(false)
    }

    pub fn state(&self, model: &str, clip: &str) -> Option<&ClipState> {
        self.clips.get(&(model.to_string(), clip.to_string()))
    }

    /// Starts playback. Forward restarts from the beginning; reverse restarts
    /// from the end. An unknown `(model, clip)` is reported and ignored.
    pub fn play(
        &mut self,
        model: &str,
        clip: &str,
        direction: PlayDirection,
        once: bool,
        frame: Frame,
        bus: &mut EventBus,
    ) {
        let Some(state) = self.clips.get_mut(&(model.to_string(), clip.to_string())) else {
            bus.emit(frame, "clip", format!("unknown clip {model}/{clip} on play"));
            return;
        };
        state.direction = direction;
        state.once = once;
        state.playing = true;
        state.playhead_s = match direction {
            PlayDirection::Forward => 0.0,
            PlayDirection::Reverse => state.duration_s,
        };
    }

    /// Pauses playback, holding the current playhead. An unknown
    /// `(model, clip)` is reported and ignored.
    pub fn stop(&mut self, model: &str, clip: &str, frame: Frame, bus: &mut EventBus) {
        let Some(state) = self.clips.get_mut(&(model.to_string(), clip.to_string())) else {
            bus.emit(frame, "clip", format!("unknown clip {model}/{clip} on stop"));
            return;
        };
        state.playing = false;
    }

    /// Advances every playing clip by `dt_s`.
    pub fn advance(&mut self, dt_s: f64) {
        let dt_s = dt_s.max(0.0);
        for state in self.clips.values_mut() {
            if !state.playing {
                continue;
            }
            match state.direction {
                PlayDirection::Forward => {
                    state.playhead_s += dt_s;
                    if state.playhead_s >= state.duration_s {
                        if state.once {
                            state.playhead_s = state.duration_s;
                            state.playing = false;
                        } else if state.duration_s > 0.0 {
                            state.playhead_s %= state.duration_s;
                        } else {
                            state.playhead_s = 0.0;
                        }
                    }
                }
                PlayDirection::Reverse => {
                    state.playhead_s -= dt_s;
                    if state.playhead_s <= 0.0 {
                        if state.once {
                            state.playhead_s = 0.0;
                            state.playing = false;
                        } else if state.duration_s > 0.0 {
                            state.playhead_s = state.playhead_s.rem_euclid(state.duration_s);
                        } else {
                            state.playhead_s = 0.0;
                        }
                    }
                }
            }
        }
    }
}
