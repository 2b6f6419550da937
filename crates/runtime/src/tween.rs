use std::collections::BTreeMap;

use foundation::easing::Easing;
use foundation::math::Vec3;

/// A value a tween can interpolate.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TweenValue {
    Scalar(f64),
    Vector(Vec3),
}

impl TweenValue {
    fn sample(from: TweenValue, to: TweenValue, t: f64) -> TweenValue {
        match (from, to) {
            (TweenValue::Scalar(a), TweenValue::Scalar(b)) => {
                TweenValue::Scalar(a + (b - a) * t)
            }
            (TweenValue::Vector(a), TweenValue::Vector(b)) => TweenValue::Vector(a.lerp(b, t)),
            // `Tweens::start` rejects mismatched endpoints, so this arm is
            // unreachable through the public API.
            (_, to) => to,
        }
    }

    fn same_kind(self, other: TweenValue) -> bool {
        matches!(
            (self, other),
            (TweenValue::Scalar(_), TweenValue::Scalar(_))
                | (TweenValue::Vector(_), TweenValue::Vector(_))
        )
    }
}

#[derive(Debug, Clone)]
struct Tween {
    from: TweenValue,
    to: TweenValue,
    duration_s: f64,
    elapsed_s: f64,
    easing: Easing,
}

impl Tween {
    fn progress(&self) -> f64 {
        if self.duration_s <= 0.0 {
            1.0
        } else {
            (self.elapsed_s / self.duration_s).clamp(0.0, 1.0)
        }
    }

    fn value(&self) -> TweenValue {
        let t = self.easing.apply(self.progress());
        if t >= 1.0 {
            // Land exactly on the registered end value, not a lerp of it.
            self.to
        } else {
            TweenValue::sample(self.from, self.to, t)
        }
    }
}

/// A finished tween, reported exactly once from [`Tweens::advance`].
#[derive(Debug, Clone, PartialEq)]
pub struct TweenCompletion {
    pub channel: String,
    /// The tween's registered end value.
    pub value: TweenValue,
}

/// Per-channel tween scheduler.
///
/// A channel is a stable string key naming one mutable field
/// ("camera.position", "prop.phone.rotation"). At most one tween is active
/// per channel: starting a tween on an occupied channel cancels the previous
/// one, which is the cancel-before-restart discipline that replaces locking
/// in the single-threaded frame loop. A cancelled tween never reports a
/// completion.
///
/// Determinism:
/// - Channels live in a `BTreeMap`, so sampling and completion order is the
///   channel's lexicographic order, independent of start order.
/// - A zero-duration tween completes on the first `advance`, even at dt 0.
#[derive(Debug, Default)]
pub struct Tweens {
    active: BTreeMap<String, Tween>,
}

impl Tweens {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn is_active(&self, channel: &str) -> bool {
        self.active.contains_key(channel)
    }

    /// Starts (or restarts) the tween on `channel`.
    ///
    /// Returns `false` (and starts nothing) if the endpoints are not the same
    /// value kind.
    pub fn start(
        &mut self,
        channel: impl Into<String>,
        from: TweenValue,
        to: TweenValue,
        duration_s: f64,
        easing: Easing,
    ) -> bool {
        if !from.same_kind(to) {
            return false;
        }
        self.active.insert(
            channel.into(),
            Tween {
                from,
                to,
                duration_s: duration_s.max(0.0),
                elapsed_s: 0.0,
                easing,
            },
        );
        true
    }

    /// Cancels the tween on `channel`; returns whether one was active.
    pub fn cancel(&mut self, channel: &str) -> bool {
        self.active.remove(channel).is_some()
    }

    /// Cancels every channel starting with `prefix`; returns how many.
    pub fn cancel_prefix(&mut self, prefix: &str) -> usize {
        let doomed: Vec<String> = self
            .active
            .keys()
            .filter(|c| c.starts_with(prefix))
            .cloned()
            .collect();
        for channel in &doomed {
            self.active.remove(channel);
        }
        doomed.len()
    }

    /// Current interpolated value of an active channel.
    pub fn value(&self, channel: &str) -> Option<TweenValue> {
        self.active.get(channel).map(Tween::value)
    }

    /// In-flight samples for every active channel, in channel order.
    pub fn samples(&self) -> Vec<(String, TweenValue)> {
        self.active
            .iter()
            .map(|(channel, tween)| (channel.clone(), tween.value()))
            .collect()
    }

    /// Advances every active tween by `dt_s` and removes the finished ones.
    ///
    /// Completions carry the exact registered end value and are returned in
    /// channel order.
    pub fn advance(&mut self, dt_s: f64) -> Vec<TweenCompletion> {
        let dt_s = dt_s.max(0.0);
        let mut completed = Vec::new();
        for (channel, tween) in self.active.iter_mut() {
            tween.elapsed_s += dt_s;
            if tween.progress() >= 1.0 {
                completed.push(TweenCompletion {
                    channel: channel.clone(),
                    value: tween.to,
                });
            }
        }
        for completion in &completed {
            self.active.remove(&completion.channel);
        }
        completed
    }
}
