//! Session coordinator.
//!
//! Owns the [`AppMode`] and every controller, and enforces the round
//! protocol: countdown → alarm → wheel → award → idle. Controllers schedule
//! their own callbacks; those callbacks come back here through weak
//! references, so a dropped session is never re-entered.
//!
//! The listener is invoked while the session is borrowed. It must not call
//! back into the session synchronously; the Yew layer only schedules a
//! re-render from it.

use crate::countdown::{draw_duration, Countdown, CountdownSignal, CountdownState};
use crate::random::RandomSource;
use crate::schedule::{Scheduler, Wake};
use crate::score::{Contestant, ScoreLedger};
use crate::tone::ToneEngine;
use crate::wheel::{
    RangeUpdate, Segment, SpinOutcome, Wheel, WheelConfig, WheelSignal, WheelState,
};
use log::{debug, info, warn};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Idle,
    CountdownActive,
    AlarmActive,
    WheelActive,
    /// Only reported by [`Session::visible_mode`]; help overlays the primary mode.
    HelpActive,
}

/// Notifications for the rendering layer.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    ModeChanged(AppMode),
    HelpToggled(bool),
    ProgressChanged(f64),
    CountdownExpired,
    SpinStarted { rotation_deg: f64 },
    SpinResolved(i32),
    ScoreChanged { contestant: Contestant, score: i32 },
    RangeChanged(WheelConfig),
    /// Wheel rotation snapped back to zero without animation.
    WheelReset,
}

pub type Listener = Rc<dyn Fn(GameEvent)>;

/// Everything the view needs for one render.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub mode: AppMode,
    pub help_open: bool,
    pub progress: f64,
    pub wheel_state: WheelState,
    pub wheel_config: WheelConfig,
    pub segments: Vec<Segment>,
    pub rotation_deg: f64,
    pub animate_rotation: bool,
    /// Resolved spin value awaiting an award.
    pub result: Option<i32>,
    pub scores: [i32; 2],
}

struct Core {
    mode: AppMode,
    help_open: bool,
    countdown: Countdown,
    wheel: Wheel,
    ledger: ScoreLedger,
    tones: ToneEngine,
    rng: Box<dyn RandomSource>,
    scheduler: Rc<dyn Scheduler>,
    listener: Listener,
    countdown_wake: Wake<CountdownSignal>,
    wheel_wake: Wake<WheelSignal>,
}

/// Run `f` on the core if it is still alive and not already borrowed.
fn deliver(core: &Weak<RefCell<Core>>, f: impl FnOnce(&mut Core)) {
    let Some(rc) = core.upgrade() else {
        return;
    };
    match rc.try_borrow_mut() {
        Ok(mut core) => f(&mut core),
        Err(_) => warn!("Session busy, scheduled callback dropped"),
    };
}

impl Core {
    fn emit(&self, event: GameEvent) {
        (self.listener)(event);
    }

    fn set_mode(&mut self, mode: AppMode) {
        if self.mode != mode {
            info!("Mode {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
            self.emit(GameEvent::ModeChanged(mode));
        }
    }

    fn on_countdown(&mut self, signal: CountdownSignal) {
        match signal {
            CountdownSignal::Tick => {
                if self.countdown.is_running() {
                    self.tones.clock_tick();
                }
            }
            CountdownSignal::Frame => {
                if let Some(progress) =
                    self.countdown.frame(self.scheduler.as_ref(), &self.countdown_wake)
                {
                    self.emit(GameEvent::ProgressChanged(progress));
                }
            }
            CountdownSignal::Expired => {
                if self.countdown.expire() {
                    self.enter_alarm();
                }
            }
        }
    }

    fn enter_alarm(&mut self) {
        self.tones.start_siren();
        self.emit(GameEvent::ProgressChanged(self.countdown.progress()));
        self.emit(GameEvent::CountdownExpired);
        self.set_mode(AppMode::AlarmActive);
    }

    fn on_wheel(&mut self, signal: WheelSignal) {
        match signal {
            WheelSignal::Tick(n) => {
                self.tones.spin_tick();
                self.wheel.tick_played(n, self.scheduler.as_ref(), &self.wheel_wake);
            }
            WheelSignal::Resolved => {
                if let Some(value) = self.wheel.resolve() {
                    self.tones.win_chime();
                    self.emit(GameEvent::SpinResolved(value));
                }
            }
        }
    }

    fn start_countdown(&mut self) -> bool {
        if self.mode != AppMode::Idle {
            debug!("Countdown start ignored in {:?}", self.mode);
            return false;
        }
        let duration_ms = draw_duration(self.rng.as_mut());
        if !self
            .countdown
            .start(duration_ms, self.scheduler.as_ref(), &self.countdown_wake)
        {
            return false;
        }
        self.tones.clock_tick();
        self.emit(GameEvent::ProgressChanged(1.0));
        self.set_mode(AppMode::CountdownActive);
        true
    }

    fn dismiss_alarm(&mut self) -> bool {
        if self.mode != AppMode::AlarmActive {
            return false;
        }
        self.tones.stop_siren();
        self.countdown.reset();
        self.emit(GameEvent::ProgressChanged(self.countdown.progress()));
        self.wheel.open();
        self.set_mode(AppMode::WheelActive);
        true
    }

    fn open_wheel(&mut self) -> bool {
        if self.mode != AppMode::Idle {
            debug!("Wheel open ignored in {:?}", self.mode);
            return false;
        }
        self.wheel.open();
        self.set_mode(AppMode::WheelActive);
        true
    }

    fn close_wheel(&mut self) -> bool {
        if self.mode != AppMode::WheelActive || !self.wheel.close() {
            return false;
        }
        self.emit(GameEvent::WheelReset);
        self.set_mode(AppMode::Idle);
        true
    }

    fn update_range(&mut self, min_text: &str, max_text: &str) -> RangeUpdate {
        let update = self.wheel.update_range(min_text, max_text);
        if let RangeUpdate::Accepted(config) = update {
            self.emit(GameEvent::RangeChanged(config));
            self.emit(GameEvent::WheelReset);
        }
        update
    }

    fn spin(&mut self) -> bool {
        if self.mode != AppMode::WheelActive {
            return false;
        }
        let Some(outcome) =
            self.wheel
                .spin(self.rng.as_mut(), self.scheduler.as_ref(), &self.wheel_wake)
        else {
            return false;
        };
        self.tones.spin_tick();
        self.emit(GameEvent::SpinStarted {
            rotation_deg: outcome.rotation_deg,
        });
        true
    }

    fn award(&mut self, contestant: Contestant) -> bool {
        if self.mode != AppMode::WheelActive {
            return false;
        }
        let Some(value) = self.wheel.take_award() else {
            debug!("No resolved spin to award");
            return false;
        };
        let score = self.ledger.adjust(contestant, value);
        info!("Awarded {} to {} (now {})", value, contestant, score);
        self.emit(GameEvent::ScoreChanged { contestant, score });
        self.emit(GameEvent::WheelReset);
        self.set_mode(AppMode::Idle);
        true
    }

    fn adjust_score(&mut self, contestant: Contestant, delta: i32) -> i32 {
        let score = self.ledger.adjust(contestant, delta);
        self.emit(GameEvent::ScoreChanged { contestant, score });
        score
    }

    fn set_help(&mut self, open: bool) {
        if self.help_open != open {
            self.help_open = open;
            self.emit(GameEvent::HelpToggled(open));
        }
    }

    fn key_pressed(&mut self, key: &str) {
        // Any key at all silences the alarm, not just a dedicated one.
        if self.mode == AppMode::AlarmActive {
            debug!("Key {:?} dismissed the alarm", key);
            self.dismiss_alarm();
        }
        if key == "Escape" && self.help_open {
            self.set_help(false);
        }
    }

    fn view(&self) -> SessionView {
        SessionView {
            mode: self.mode,
            help_open: self.help_open,
            progress: self.countdown.progress(),
            wheel_state: self.wheel.state(),
            wheel_config: self.wheel.config(),
            segments: self.wheel.segments(),
            rotation_deg: self.wheel.rotation_deg(),
            animate_rotation: self.wheel.is_animated(),
            result: self.wheel.pending_value(),
            scores: Contestant::ALL.map(|c| self.ledger.score(c)),
        }
    }
}

/// Handle to one game session. Cloning shares the same session.
#[derive(Clone)]
pub struct Session {
    core: Rc<RefCell<Core>>,
}

impl Session {
    pub fn new(
        scheduler: Rc<dyn Scheduler>,
        tones: ToneEngine,
        rng: Box<dyn RandomSource>,
        listener: Listener,
    ) -> Self {
        let core = Rc::new_cyclic(|weak: &Weak<RefCell<Core>>| {
            let countdown_wake: Wake<CountdownSignal> = {
                let weak = weak.clone();
                Rc::new(move |signal: CountdownSignal| {
                    deliver(&weak, |core| core.on_countdown(signal))
                })
            };
            let wheel_wake: Wake<WheelSignal> = {
                let weak = weak.clone();
                Rc::new(move |signal: WheelSignal| deliver(&weak, |core| core.on_wheel(signal)))
            };
            RefCell::new(Core {
                mode: AppMode::Idle,
                help_open: false,
                countdown: Countdown::new(),
                wheel: Wheel::default(),
                ledger: ScoreLedger::new(),
                tones,
                rng,
                scheduler,
                listener,
                countdown_wake,
                wheel_wake,
            })
        });
        Self { core }
    }

    /// Primary mode, ignoring the help overlay.
    pub fn mode(&self) -> AppMode {
        self.core.borrow().mode
    }

    /// What the player sees on top: help when open, else the primary mode.
    pub fn visible_mode(&self) -> AppMode {
        let core = self.core.borrow();
        if core.help_open {
            AppMode::HelpActive
        } else {
            core.mode
        }
    }

    pub fn view(&self) -> SessionView {
        self.core.borrow().view()
    }

    pub fn countdown_state(&self) -> CountdownState {
        self.core.borrow().countdown.state()
    }

    pub fn outcome(&self) -> Option<SpinOutcome> {
        self.core.borrow().wheel.outcome()
    }

    pub fn score(&self, contestant: Contestant) -> i32 {
        self.core.borrow().ledger.score(contestant)
    }

    pub fn is_negative(&self, contestant: Contestant) -> bool {
        self.core.borrow().ledger.is_negative(contestant)
    }

    pub fn siren_playing(&self) -> bool {
        self.core.borrow().tones.siren_playing()
    }

    /// True while any countdown or wheel callback is still scheduled.
    pub fn has_pending_tasks(&self) -> bool {
        let core = self.core.borrow();
        core.countdown.has_pending_tasks() || core.wheel.has_pending_tasks()
    }

    pub fn start_countdown(&self) -> bool {
        self.core.borrow_mut().start_countdown()
    }

    pub fn dismiss_alarm(&self) -> bool {
        self.core.borrow_mut().dismiss_alarm()
    }

    pub fn open_wheel(&self) -> bool {
        self.core.borrow_mut().open_wheel()
    }

    pub fn close_wheel(&self) -> bool {
        self.core.borrow_mut().close_wheel()
    }

    pub fn update_range(&self, min_text: &str, max_text: &str) -> RangeUpdate {
        self.core.borrow_mut().update_range(min_text, max_text)
    }

    pub fn spin(&self) -> bool {
        self.core.borrow_mut().spin()
    }

    pub fn award(&self, contestant: Contestant) -> bool {
        self.core.borrow_mut().award(contestant)
    }

    pub fn adjust_score(&self, contestant: Contestant, delta: i32) -> i32 {
        self.core.borrow_mut().adjust_score(contestant, delta)
    }

    pub fn open_help(&self) {
        self.core.borrow_mut().set_help(true);
    }

    pub fn close_help(&self) {
        self.core.borrow_mut().set_help(false);
    }

    pub fn key_pressed(&self, key: &str) {
        self.core.borrow_mut().key_pressed(key);
    }
}
