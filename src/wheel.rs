//! Prize wheel: configurable integer range, randomized spins, scoring handoff.

use crate::config::{
    DEFAULT_WHEEL_MAX, DEFAULT_WHEEL_MIN, EXTRA_SPIN_TURNS, MAX_WHEEL_SPAN, MIN_SPIN_TURNS,
    SPIN_DURATION_MS, SPIN_TICK_BASE_MS, SPIN_TICK_COUNT, SPIN_TICK_STEP_MS, WHEEL_COLORS,
    WHEEL_VALUE_LIMIT,
};
use crate::random::RandomSource;
use crate::schedule::{cancel_slot, Scheduler, TaskHandle, Wake};
use crate::utils::parse_leading_int;
use log::{debug, info};

/// Inclusive integer range shown on the wheel.
///
/// Always satisfies `-20 <= min <= max <= 20` and `max - min <= 40`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WheelConfig {
    min: i32,
    max: i32,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            min: DEFAULT_WHEEL_MIN,
            max: DEFAULT_WHEEL_MAX,
        }
    }
}

impl WheelConfig {
    /// Build a config from raw bounds, clamping each to the value limit and
    /// shrinking an oversized span from the top. `None` when `min > max`.
    pub fn normalized(min: i32, max: i32) -> Option<Self> {
        let min = min.clamp(-WHEEL_VALUE_LIMIT, WHEEL_VALUE_LIMIT);
        let mut max = max.clamp(-WHEEL_VALUE_LIMIT, WHEEL_VALUE_LIMIT);
        if min > max {
            return None;
        }
        if max - min > MAX_WHEEL_SPAN {
            max = min + MAX_WHEEL_SPAN;
        }
        Some(Self { min, max })
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn num_segments(&self) -> u32 {
        (self.max - self.min + 1) as u32
    }

    pub fn segment_angle(&self) -> f64 {
        360.0 / self.num_segments() as f64
    }

    /// Clockwise angle from the top pointer to the center of segment `index`.
    pub fn segment_center(&self, index: u32) -> f64 {
        let angle = self.segment_angle();
        index as f64 * angle + angle / 2.0
    }

    pub fn segments(&self) -> Vec<Segment> {
        let angle = self.segment_angle();
        (0..self.num_segments())
            .map(|index| Segment {
                index,
                value: self.min + index as i32,
                start_deg: index as f64 * angle,
                end_deg: (index + 1) as f64 * angle,
                color: WHEEL_COLORS[index as usize % WHEEL_COLORS.len()],
            })
            .collect()
    }
}

/// One equal-angle slice of the wheel. Angles run clockwise from the top.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub index: u32,
    pub value: i32,
    pub start_deg: f64,
    pub end_deg: f64,
    pub color: &'static str,
}

impl Segment {
    pub fn sweep(&self) -> f64 {
        self.end_deg - self.start_deg
    }

    pub fn center_deg(&self) -> f64 {
        (self.start_deg + self.end_deg) / 2.0
    }
}

/// Result of a range update request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeUpdate {
    /// New config in effect; fields should display these values.
    Accepted(WheelConfig),
    /// Update refused; fields should be restored to these values.
    Rejected(WheelConfig),
}

impl RangeUpdate {
    pub fn config(&self) -> WheelConfig {
        match self {
            RangeUpdate::Accepted(c) | RangeUpdate::Rejected(c) => *c,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelState {
    Closed,
    Open,
    Spinning,
    Resolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelSignal {
    /// The `n`-th spin tick (1-based) is due.
    Tick(u32),
    Resolved,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinOutcome {
    pub value: i32,
    pub rotation_deg: f64,
    pub resolved: bool,
}

/// Cumulative rotation after a spin that lands `center_deg` under the top
/// pointer, starting from `current_deg`.
///
/// The result is always at least `MIN_SPIN_TURNS` full turns past the last
/// whole turn of `current_deg`, so it strictly exceeds `current_deg`.
///
/// `current_deg` is rounded down to a whole turn first. Adding the offset to
/// the raw rotation would carry the previous landing angle into the next
/// spin, and a repeat spin without closing would then stop off-center.
pub fn spin_target(current_deg: f64, turns: u32, center_deg: f64) -> f64 {
    let whole_turns = current_deg - current_deg.rem_euclid(360.0);
    whole_turns + turns as f64 * 360.0 + (360.0 - center_deg)
}

/// Delay before tick `n + 1`, given that tick `n` just played.
pub fn spin_tick_delay(n: u32) -> u32 {
    SPIN_TICK_BASE_MS + SPIN_TICK_STEP_MS * n
}

#[derive(Debug)]
pub struct Wheel {
    config: WheelConfig,
    state: WheelState,
    rotation_deg: f64,
    animated: bool,
    outcome: Option<SpinOutcome>,
    resolve: Option<TaskHandle>,
    ticks: Option<TaskHandle>,
}

impl Default for Wheel {
    fn default() -> Self {
        Self::new(WheelConfig::default())
    }
}

impl Wheel {
    pub fn new(config: WheelConfig) -> Self {
        Self {
            config,
            state: WheelState::Closed,
            rotation_deg: 0.0,
            animated: false,
            outcome: None,
            resolve: None,
            ticks: None,
        }
    }

    pub fn config(&self) -> WheelConfig {
        self.config
    }

    pub fn state(&self) -> WheelState {
        self.state
    }

    pub fn rotation_deg(&self) -> f64 {
        self.rotation_deg
    }

    /// Whether the current rotation should be reached with the spin
    /// transition rather than snapped to.
    pub fn is_animated(&self) -> bool {
        self.animated
    }

    pub fn outcome(&self) -> Option<SpinOutcome> {
        self.outcome
    }

    /// Value waiting to be awarded, once the spin has resolved.
    pub fn pending_value(&self) -> Option<i32> {
        self.outcome.filter(|o| o.resolved).map(|o| o.value)
    }

    pub fn segments(&self) -> Vec<Segment> {
        self.config.segments()
    }

    pub fn has_pending_tasks(&self) -> bool {
        self.resolve.is_some() || self.ticks.is_some()
    }

    pub fn open(&mut self) {
        self.cancel_all();
        self.outcome = None;
        self.state = WheelState::Open;
        debug!(
            "Wheel opened with {} segments ({}..={})",
            self.config.num_segments(),
            self.config.min,
            self.config.max
        );
    }

    /// Apply a range typed into the two range fields.
    ///
    /// Unparseable input falls back to the default bound for that field.
    /// Refused while a spin is in flight. Accepting a range discards a
    /// resolved result that has not been awarded yet.
    pub fn update_range(&mut self, min_text: &str, max_text: &str) -> RangeUpdate {
        if self.state == WheelState::Spinning {
            debug!("Range update ignored while spinning");
            return RangeUpdate::Rejected(self.config);
        }
        let min = parse_leading_int(min_text).unwrap_or(DEFAULT_WHEEL_MIN);
        let max = parse_leading_int(max_text).unwrap_or(DEFAULT_WHEEL_MAX);
        match WheelConfig::normalized(min, max) {
            Some(config) => {
                self.config = config;
                self.rotation_deg = 0.0;
                self.animated = false;
                // A waiting result may lie outside the new range.
                if self.state == WheelState::Resolved {
                    self.cancel_all();
                    self.outcome = None;
                    self.state = WheelState::Open;
                }
                info!("Wheel range set to {}..={}", config.min, config.max);
                RangeUpdate::Accepted(config)
            }
            None => {
                debug!("Rejected wheel range {}..={}", min, max);
                RangeUpdate::Rejected(self.config)
            }
        }
    }

    /// Pick the outcome and start the spin animation. Returns `None` when the
    /// wheel is closed or already spinning.
    ///
    /// The caller plays the first spin tick; [`WheelSignal::Tick`] delivers
    /// the rest, and [`WheelSignal::Resolved`] fires after the animation.
    pub fn spin(
        &mut self,
        rng: &mut dyn RandomSource,
        scheduler: &dyn Scheduler,
        wake: &Wake<WheelSignal>,
    ) -> Option<SpinOutcome> {
        match self.state {
            WheelState::Open | WheelState::Resolved => {}
            WheelState::Spinning => {
                debug!("Wheel already spinning");
                return None;
            }
            WheelState::Closed => return None,
        }
        self.cancel_all();

        let index = rng.index(self.config.num_segments() as usize) as u32;
        let turns = MIN_SPIN_TURNS + rng.between(0, EXTRA_SPIN_TURNS as i64) as u32;
        let value = self.config.min + index as i32;
        let center = self.config.segment_center(index);
        self.rotation_deg = spin_target(self.rotation_deg, turns, center);
        self.animated = true;

        let outcome = SpinOutcome {
            value,
            rotation_deg: self.rotation_deg,
            resolved: false,
        };
        self.outcome = Some(outcome);
        self.state = WheelState::Spinning;

        let w = wake.clone();
        self.resolve = Some(scheduler.timeout(
            SPIN_DURATION_MS,
            Box::new(move || w(WheelSignal::Resolved)),
        ));
        self.schedule_tick(1, scheduler, wake);

        debug!(
            "Spin picked segment {} (value {}), {} turns, rotation {:.1}°",
            index, value, turns, self.rotation_deg
        );
        Some(outcome)
    }

    /// Tick `n` just played; queue the next one while fewer than the full
    /// sequence have played.
    pub fn tick_played(&mut self, n: u32, scheduler: &dyn Scheduler, wake: &Wake<WheelSignal>) {
        self.ticks = None;
        if n < SPIN_TICK_COUNT && self.state != WheelState::Closed {
            self.schedule_tick(n, scheduler, wake);
        }
    }

    /// The spin animation finished. Returns the value now up for award.
    pub fn resolve(&mut self) -> Option<i32> {
        self.resolve = None;
        if self.state != WheelState::Spinning {
            return None;
        }
        let outcome = self.outcome.as_mut()?;
        outcome.resolved = true;
        self.state = WheelState::Resolved;
        info!("Spin resolved to {}", outcome.value);
        Some(outcome.value)
    }

    /// Hand over the resolved value and close the wheel. `None` (and no state
    /// change) when nothing is pending.
    pub fn take_award(&mut self) -> Option<i32> {
        let value = self.pending_value()?;
        self.close_now();
        Some(value)
    }

    /// Close from `Open` or `Resolved`. Returns `false` while spinning or
    /// already closed.
    pub fn close(&mut self) -> bool {
        match self.state {
            WheelState::Open | WheelState::Resolved => {
                self.close_now();
                true
            }
            WheelState::Spinning => {
                debug!("Wheel close ignored while spinning");
                false
            }
            WheelState::Closed => false,
        }
    }

    fn close_now(&mut self) {
        self.cancel_all();
        self.outcome = None;
        self.rotation_deg = 0.0;
        self.animated = false;
        self.state = WheelState::Closed;
    }

    fn schedule_tick(&mut self, played: u32, scheduler: &dyn Scheduler, wake: &Wake<WheelSignal>) {
        let w = wake.clone();
        let next = played + 1;
        self.ticks = Some(scheduler.timeout(
            spin_tick_delay(played),
            Box::new(move || w(WheelSignal::Tick(next))),
        ));
    }

    fn cancel_all(&mut self) {
        cancel_slot(&mut self.resolve);
        cancel_slot(&mut self.ticks);
    }
}
