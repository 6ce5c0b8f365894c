//! Parameter automation — breakpoint envelopes with WebAudio AudioParam semantics.
//!
//! An [`Automation`] is a time-sorted list of events. Between events the value
//! either holds (after a `set`) or follows the ramp that ends at the next event.
//! Times are seconds relative to the owning voice's start.

/// How an event's value is approached.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Curve {
    /// Jump to the value at the event time.
    Step,
    /// Linear interpolation from the previous event.
    Linear,
    /// Exponential interpolation from the previous event.
    Exponential,
}

#[derive(Debug, Clone, Copy)]
struct Event {
    time: f64,
    value: f64,
    curve: Curve,
}

/// A scheduled parameter timeline.
#[derive(Debug, Clone)]
pub struct Automation {
    default_value: f64,
    events: Vec<Event>,
}

impl Automation {
    /// A timeline that holds `default_value` until the first event.
    pub fn new(default_value: f64) -> Self {
        Automation {
            default_value,
            events: Vec::new(),
        }
    }

    /// A timeline with no events at all.
    pub fn constant(value: f64) -> Self {
        Self::new(value)
    }

    pub fn set_value_at_time(&mut self, value: f64, time: f64) -> &mut Self {
        self.insert(Event { time, value, curve: Curve::Step })
    }

    pub fn linear_ramp_to_value_at_time(&mut self, value: f64, time: f64) -> &mut Self {
        self.insert(Event { time, value, curve: Curve::Linear })
    }

    pub fn exponential_ramp_to_value_at_time(&mut self, value: f64, time: f64) -> &mut Self {
        self.insert(Event { time, value, curve: Curve::Exponential })
    }

    /// Events at the same time keep their insertion order.
    fn insert(&mut self, event: Event) -> &mut Self {
        let idx = self.events.partition_point(|e| e.time <= event.time);
        self.events.insert(idx, event);
        self
    }

    /// Value of the parameter at `t` seconds.
    pub fn value_at(&self, t: f64) -> f64 {
        let next = self.events.partition_point(|e| e.time <= t);
        let held = if next == 0 {
            self.default_value
        } else {
            self.events[next - 1].value
        };

        let Some(end) = self.events.get(next) else {
            return held;
        };

        let (t0, v0) = if next == 0 {
            (0.0, self.default_value)
        } else {
            let prev = &self.events[next - 1];
            (prev.time, prev.value)
        };
        let span = end.time - t0;
        if span <= 0.0 {
            return held;
        }
        let frac = ((t - t0) / span).clamp(0.0, 1.0);

        match end.curve {
            Curve::Step => held,
            Curve::Linear => v0 + (end.value - v0) * frac,
            Curve::Exponential => {
                // Undefined across zero or a sign change: hold the start value.
                if v0 * end.value <= 0.0 {
                    v0
                } else {
                    v0 * (end.value / v0).powf(frac)
                }
            }
        }
    }
}
