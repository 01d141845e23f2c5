//! Random-duration countdown with a ticking clock and a progress loop.

use crate::config::{CLOCK_TICK_PERIOD_MS, MAX_COUNTDOWN_MS, MIN_COUNTDOWN_MS};
use crate::random::RandomSource;
use crate::schedule::{cancel_slot, Scheduler, TaskHandle, Wake};
use log::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownState {
    Idle,
    Running,
    Expired,
}

/// Callbacks the countdown schedules for itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownSignal {
    Tick,
    Frame,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CountdownSession {
    pub duration_ms: u32,
    pub started_at_ms: f64,
}

/// Draw a countdown length uniformly from `[MIN_COUNTDOWN_MS, MAX_COUNTDOWN_MS]`.
pub fn draw_duration(rng: &mut dyn RandomSource) -> u32 {
    rng.between(MIN_COUNTDOWN_MS as i64, MAX_COUNTDOWN_MS as i64) as u32
}

/// Fraction of the countdown still remaining at `now_ms`, in `[0, 1]`.
pub fn progress_at(session: &CountdownSession, now_ms: f64) -> f64 {
    let elapsed = (now_ms - session.started_at_ms).max(0.0);
    let remaining = (session.duration_ms as f64 - elapsed).max(0.0);
    remaining / session.duration_ms as f64
}

#[derive(Debug)]
pub struct Countdown {
    state: CountdownState,
    session: Option<CountdownSession>,
    progress: f64,
    expiry: Option<TaskHandle>,
    ticker: Option<TaskHandle>,
    frame: Option<TaskHandle>,
}

impl Default for Countdown {
    fn default() -> Self {
        Self {
            state: CountdownState::Idle,
            session: None,
            progress: 1.0,
            expiry: None,
            ticker: None,
            frame: None,
        }
    }
}

impl Countdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CountdownState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == CountdownState::Running
    }

    pub fn session(&self) -> Option<&CountdownSession> {
        self.session.as_ref()
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// True while any of the countdown's callbacks are still scheduled.
    pub fn has_pending_tasks(&self) -> bool {
        self.expiry.is_some() || self.ticker.is_some() || self.frame.is_some()
    }

    /// Arm a countdown of `duration_ms`. Rejected (returns `false`) while one
    /// is already running.
    ///
    /// The caller plays the immediate first tick; the ticker delivers
    /// [`CountdownSignal::Tick`] every period after that.
    pub fn start(
        &mut self,
        duration_ms: u32,
        scheduler: &dyn Scheduler,
        wake: &Wake<CountdownSignal>,
    ) -> bool {
        if self.is_running() {
            debug!("Countdown already running, start ignored");
            return false;
        }
        // Leftovers from an expired countdown that was never reset.
        self.cancel_all();

        let duration_ms = duration_ms.clamp(MIN_COUNTDOWN_MS, MAX_COUNTDOWN_MS);
        self.session = Some(CountdownSession {
            duration_ms,
            started_at_ms: scheduler.now_ms(),
        });
        self.state = CountdownState::Running;
        self.progress = 1.0;

        let w = wake.clone();
        self.expiry = Some(scheduler.timeout(
            duration_ms,
            Box::new(move || w(CountdownSignal::Expired)),
        ));
        let w = wake.clone();
        self.ticker = Some(scheduler.interval(
            CLOCK_TICK_PERIOD_MS,
            Box::new(move || w(CountdownSignal::Tick)),
        ));
        self.request_frame(scheduler, wake);

        info!("Countdown started for {} ms", duration_ms);
        true
    }

    /// Recompute progress for a display refresh and keep the loop going while
    /// time remains. Returns the new progress, or `None` when not running.
    pub fn frame(
        &mut self,
        scheduler: &dyn Scheduler,
        wake: &Wake<CountdownSignal>,
    ) -> Option<f64> {
        self.frame = None;
        if !self.is_running() {
            return None;
        }
        let session = self.session?;
        // A wall clock stepping backwards must not refill the donut.
        self.progress = progress_at(&session, scheduler.now_ms()).min(self.progress);
        if self.progress > 0.0 {
            self.request_frame(scheduler, wake);
        }
        Some(self.progress)
    }

    /// Natural end of the countdown. Returns `true` only on the first call
    /// for a running countdown.
    pub fn expire(&mut self) -> bool {
        self.expiry = None;
        if !self.is_running() {
            return false;
        }
        cancel_slot(&mut self.ticker);
        cancel_slot(&mut self.frame);
        self.state = CountdownState::Expired;
        self.progress = 0.0;
        info!("Countdown expired");
        true
    }

    /// Stop everything and return to a full, idle countdown. Safe to repeat.
    pub fn reset(&mut self) {
        self.cancel_all();
        if self.state != CountdownState::Idle {
            debug!("Countdown reset from {:?}", self.state);
        }
        self.state = CountdownState::Idle;
        self.session = None;
        self.progress = 1.0;
    }

    fn request_frame(&mut self, scheduler: &dyn Scheduler, wake: &Wake<CountdownSignal>) {
        let w = wake.clone();
        self.frame = Some(
            scheduler.animation_frame(Box::new(move || w(CountdownSignal::Frame))),
        );
    }

    fn cancel_all(&mut self) {
        cancel_slot(&mut self.expiry);
        cancel_slot(&mut self.ticker);
        cancel_slot(&mut self.frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::Scripted;
    use crate::schedule::ManualScheduler;
    use std::cell::RefCell;
    use std::rc::{Rc, Weak};

    /// A countdown wired to a manual scheduler, looping its own signals back in.
    struct Rig {
        sched: ManualScheduler,
        countdown: Rc<RefCell<Countdown>>,
        signals: Rc<RefCell<Vec<CountdownSignal>>>,
        progress: Rc<RefCell<Vec<f64>>>,
        wake: Wake<CountdownSignal>,
    }

    impl Rig {
        fn new() -> Self {
            let sched = ManualScheduler::new();
            let countdown = Rc::new(RefCell::new(Countdown::new()));
            let signals: Rc<RefCell<Vec<CountdownSignal>>> = Rc::default();
            let progress: Rc<RefCell<Vec<f64>>> = Rc::default();
            let me: Rc<RefCell<Option<Weak<dyn Fn(CountdownSignal)>>>> = Rc::default();
            let wake: Wake<CountdownSignal> = {
                let (sched, countdown, signals, progress, me) = (
                    sched.clone(),
                    countdown.clone(),
                    signals.clone(),
                    progress.clone(),
                    me.clone(),
                );
                Rc::new(move |signal: CountdownSignal| {
                    signals.borrow_mut().push(signal);
                    let Some(wake) = me.borrow().as_ref().and_then(Weak::upgrade) else {
                        return;
                    };
                    match signal {
                        CountdownSignal::Frame => {
                            if let Some(p) = countdown.borrow_mut().frame(&sched, &wake) {
                                progress.borrow_mut().push(p);
                            }
                        }
                        CountdownSignal::Expired => {
                            countdown.borrow_mut().expire();
                        }
                        CountdownSignal::Tick => {}
                    }
                })
            };
            *me.borrow_mut() = Some(Rc::downgrade(&wake));
            Self { sched, countdown, signals, progress, wake }
        }

        fn start(&self, duration_ms: u32) -> bool {
            self.countdown.borrow_mut().start(duration_ms, &self.sched, &self.wake)
        }

        fn count(&self, wanted: CountdownSignal) -> usize {
            self.signals.borrow().iter().filter(|s| **s == wanted).count()
        }
    }

    #[test]
    fn durations_cover_the_closed_interval() {
        let mut low = Scripted::new([i64::MIN]);
        let mut high = Scripted::new([i64::MAX]);
        assert_eq!(draw_duration(&mut low), MIN_COUNTDOWN_MS);
        assert_eq!(draw_duration(&mut high), MAX_COUNTDOWN_MS);
    }

    #[test]
    fn progress_is_clamped() {
        let s = CountdownSession { duration_ms: 1_000, started_at_ms: 100.0 };
        assert_eq!(progress_at(&s, 100.0), 1.0);
        assert_eq!(progress_at(&s, 600.0), 0.5);
        assert_eq!(progress_at(&s, 5_000.0), 0.0);
        assert_eq!(progress_at(&s, 0.0), 1.0);
    }

    #[test]
    fn repeated_start_is_rejected() {
        let rig = Rig::new();
        assert!(rig.start(30_000));
        let before = *rig.countdown.borrow().session().unwrap();
        rig.sched.advance(1_000.0);
        for _ in 0..5 {
            assert!(!rig.start(2_000));
        }
        let cd = rig.countdown.borrow();
        assert_eq!(*cd.session().unwrap(), before);
        assert_eq!(cd.state(), CountdownState::Running);
    }

    #[test]
    fn expires_exactly_once_and_stops_ticking() {
        let rig = Rig::new();
        assert!(rig.start(1_000));
        rig.sched.advance(999.0);
        assert_eq!(rig.count(CountdownSignal::Expired), 0);
        assert_eq!(rig.count(CountdownSignal::Tick), 1);

        rig.sched.advance(10_000.0);
        assert_eq!(rig.count(CountdownSignal::Expired), 1);
        // The expiry was armed before the ticker, so it wins the tie at 1000 ms.
        assert_eq!(rig.count(CountdownSignal::Tick), 1);
        assert_eq!(rig.countdown.borrow().state(), CountdownState::Expired);
        assert!(!rig.countdown.borrow().has_pending_tasks());
        assert_eq!(rig.sched.pending(), 0);
    }

    #[test]
    fn progress_decreases_monotonically() {
        let rig = Rig::new();
        rig.start(2_000);
        rig.sched.advance(2_500.0);
        let progress = rig.progress.borrow();
        assert!(progress.len() > 10);
        assert!(progress.windows(2).all(|w| w[1] <= w[0]));
        assert!(progress.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn reset_cancels_everything() {
        let rig = Rig::new();
        rig.start(5_000);
        rig.sched.advance(1_200.0);
        let ticks = rig.count(CountdownSignal::Tick);
        let frames = rig.count(CountdownSignal::Frame);

        rig.countdown.borrow_mut().reset();
        rig.countdown.borrow_mut().reset();
        assert_eq!(rig.sched.pending(), 0);
        rig.sched.advance(60_000.0);

        assert_eq!(rig.count(CountdownSignal::Tick), ticks);
        assert_eq!(rig.count(CountdownSignal::Frame), frames);
        assert_eq!(rig.count(CountdownSignal::Expired), 0);
        let cd = rig.countdown.borrow();
        assert_eq!(cd.state(), CountdownState::Idle);
        assert_eq!(cd.progress(), 1.0);
        assert!(cd.session().is_none());
    }

    #[test]
    fn restart_after_reset() {
        let rig = Rig::new();
        rig.start(5_000);
        rig.countdown.borrow_mut().reset();
        assert!(rig.start(1_000));
        rig.sched.advance(1_000.0);
        assert_eq!(rig.count(CountdownSignal::Expired), 1);
    }
}
