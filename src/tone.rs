//! Synthesized game sounds.
//!
//! Every sound is described as plain data ([`Tone`], [`Siren`]) and handed to
//! an [`AudioBackend`] for rendering. The [`ToneEngine`] is fire-and-forget:
//! backend failures are logged and swallowed so visuals keep working without
//! an audio device.

use crate::config::{CLOCK_TICK_LEVEL, SPIN_TICK_LEVEL};
use log::{debug, info, warn};
use std::fmt;

pub const CHIME_NOTES_HZ: [f32; 4] = [523.25, 659.25, 783.99, 1046.50];
/// Stand-in for silence at the end of exponential ramps, which cannot reach zero.
pub const NEAR_SILENT: f32 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Sawtooth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Curve {
    /// Jump to the value.
    Step,
    Linear,
    Exponential,
}

/// One automation point, `offset_s` seconds after the tone starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub offset_s: f64,
    pub value: f32,
    pub curve: Curve,
}

impl Point {
    pub const fn step(offset_s: f64, value: f32) -> Self {
        Self { offset_s, value, curve: Curve::Step }
    }

    pub const fn linear(offset_s: f64, value: f32) -> Self {
        Self { offset_s, value, curve: Curve::Linear }
    }

    pub const fn exponential(offset_s: f64, value: f32) -> Self {
        Self { offset_s, value, curve: Curve::Exponential }
    }
}

/// A short one-shot oscillator voice.
#[derive(Debug, Clone, PartialEq)]
pub struct Tone {
    pub waveform: Waveform,
    /// Seconds from "now" until the voice starts.
    pub delay_s: f64,
    /// Seconds the oscillator runs once started.
    pub duration_s: f64,
    pub frequency: Vec<Point>,
    pub gain: Vec<Point>,
    /// Bus gain applied on top of the envelope.
    pub level: f32,
}

impl Tone {
    /// Sine pulse sweeping 800 → 400 Hz, decaying from 0.3 over 100 ms.
    pub fn tick() -> Self {
        Self {
            waveform: Waveform::Sine,
            delay_s: 0.0,
            duration_s: 0.1,
            frequency: vec![Point::step(0.0, 800.0), Point::exponential(0.05, 400.0)],
            gain: vec![Point::step(0.0, 0.3), Point::exponential(0.1, NEAR_SILENT)],
            level: 1.0,
        }
    }

    pub fn with_level(mut self, level: f32) -> Self {
        self.level = level;
        self
    }
}

/// Four rising notes, 100 ms apart, each with a 50 ms attack and a 300 ms tail.
pub fn win_chime() -> [Tone; 4] {
    let mut note = 0;
    CHIME_NOTES_HZ.map(|hz| {
        let delay_s = note as f64 * 0.1;
        note += 1;
        Tone {
            waveform: Waveform::Sine,
            delay_s,
            duration_s: 0.3,
            frequency: vec![Point::step(0.0, hz)],
            gain: vec![
                Point::step(0.0, 0.0),
                Point::linear(0.05, 0.2),
                Point::exponential(0.3, NEAR_SILENT),
            ],
            level: 1.0,
        }
    })
}

/// A sustained frequency-modulated alarm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Siren {
    pub waveform: Waveform,
    pub carrier_hz: f32,
    pub lfo_hz: f32,
    /// Peak frequency deviation in Hz.
    pub depth_hz: f32,
    pub gain: f32,
}

impl Default for Siren {
    fn default() -> Self {
        Self {
            waveform: Waveform::Sawtooth,
            carrier_hz: 440.0,
            lfo_hz: 4.0,
            depth_hz: 400.0,
            gain: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AudioError {
    /// The platform refused to create or resume an audio device.
    Unavailable(String),
    /// Building or scheduling a node failed.
    Graph(String),
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioError::Unavailable(why) => write!(f, "Audio output unavailable: {}", why),
            AudioError::Graph(why) => write!(f, "Failed to schedule sound: {}", why),
        }
    }
}

impl std::error::Error for AudioError {}

/// A running sustained voice.
pub trait SustainedVoice {
    fn stop(self: Box<Self>) -> Result<(), AudioError>;
}

/// Renders tone descriptions on an output device.
///
/// Implementations initialise the device lazily on first use and resume it
/// when suspended before scheduling anything.
pub trait AudioBackend {
    fn play(&mut self, tone: &Tone) -> Result<(), AudioError>;
    fn sustain(&mut self, siren: &Siren) -> Result<Box<dyn SustainedVoice>, AudioError>;
}

pub struct ToneEngine {
    backend: Option<Box<dyn AudioBackend>>,
    siren: Option<Box<dyn SustainedVoice>>,
}

impl ToneEngine {
    pub fn new(backend: Box<dyn AudioBackend>) -> Self {
        Self {
            backend: Some(backend),
            siren: None,
        }
    }

    /// An engine that never makes a sound.
    pub fn silent() -> Self {
        Self {
            backend: None,
            siren: None,
        }
    }

    pub fn is_silent(&self) -> bool {
        self.backend.is_none()
    }

    pub fn siren_playing(&self) -> bool {
        self.siren.is_some()
    }

    /// Countdown clock tick through the faint clock bus.
    pub fn clock_tick(&mut self) {
        self.play(&Tone::tick().with_level(CLOCK_TICK_LEVEL));
    }

    pub fn spin_tick(&mut self) {
        self.play(&Tone::tick().with_level(SPIN_TICK_LEVEL));
    }

    pub fn win_chime(&mut self) {
        for tone in win_chime() {
            self.play(&tone);
        }
    }

    pub fn start_siren(&mut self) {
        if self.siren.is_some() {
            debug!("Siren already playing");
            return;
        }
        let Some(backend) = self.backend.as_mut() else {
            return;
        };
        match backend.sustain(&Siren::default()) {
            Ok(voice) => {
                info!("Siren started");
                self.siren = Some(voice);
            }
            Err(e) => self.degrade(e),
        }
    }

    pub fn stop_siren(&mut self) {
        let Some(voice) = self.siren.take() else {
            return;
        };
        match voice.stop() {
            Ok(()) => info!("Siren stopped"),
            Err(e) => warn!("{}", e),
        }
    }

    fn play(&mut self, tone: &Tone) {
        let Some(backend) = self.backend.as_mut() else {
            return;
        };
        if let Err(e) = backend.play(tone) {
            self.degrade(e);
        }
    }

    fn degrade(&mut self, error: AudioError) {
        warn!("{}", error);
        if matches!(error, AudioError::Unavailable(_)) {
            warn!("Continuing without sound");
            self.backend = None;
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Played {
        Tone(Tone),
        SirenStarted,
        SirenStopped,
    }

    /// Records every sound instead of playing it.
    #[derive(Clone, Default)]
    pub struct Recorder {
        pub log: Rc<RefCell<Vec<Played>>>,
        pub fail_with: Option<AudioError>,
    }

    impl Recorder {
        pub fn ticks(&self) -> usize {
            self.log
                .borrow()
                .iter()
                .filter(|p| matches!(p, Played::Tone(t) if t.frequency[0].value == 800.0))
                .count()
        }

        pub fn count(&self, wanted: &Played) -> usize {
            self.log.borrow().iter().filter(|p| *p == wanted).count()
        }
    }

    struct RecordedSiren(Rc<RefCell<Vec<Played>>>);

    impl SustainedVoice for RecordedSiren {
        fn stop(self: Box<Self>) -> Result<(), AudioError> {
            self.0.borrow_mut().push(Played::SirenStopped);
            Ok(())
        }
    }

    impl AudioBackend for Recorder {
        fn play(&mut self, tone: &Tone) -> Result<(), AudioError> {
            if let Some(e) = &self.fail_with {
                return Err(e.clone());
            }
            self.log.borrow_mut().push(Played::Tone(tone.clone()));
            Ok(())
        }

        fn sustain(&mut self, _siren: &Siren) -> Result<Box<dyn SustainedVoice>, AudioError> {
            if let Some(e) = &self.fail_with {
                return Err(e.clone());
            }
            self.log.borrow_mut().push(Played::SirenStarted);
            Ok(Box::new(RecordedSiren(self.log.clone())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{Played, Recorder};
    use super::*;

    #[test]
    fn tick_sweeps_down_and_decays() {
        let tick = Tone::tick();
        assert_eq!(tick.waveform, Waveform::Sine);
        assert_eq!(tick.frequency, vec![Point::step(0.0, 800.0), Point::exponential(0.05, 400.0)]);
        assert_eq!(tick.gain[0], Point::step(0.0, 0.3));
        assert_eq!(tick.gain[1].offset_s, 0.1);
        assert!(tick.gain[1].value < 0.01);
    }

    #[test]
    fn chime_notes_are_staggered() {
        let chime = win_chime();
        for (i, tone) in chime.iter().enumerate() {
            assert_eq!(tone.frequency[0].value, CHIME_NOTES_HZ[i]);
            assert!((tone.delay_s - i as f64 * 0.1).abs() < 1e-9);
            assert_eq!(tone.gain[1], Point::linear(0.05, 0.2));
            assert_eq!(tone.gain[2].offset_s, 0.3);
            assert_eq!(tone.gain[2].curve, Curve::Exponential);
        }
    }

    #[test]
    fn siren_defaults() {
        let s = Siren::default();
        assert_eq!(s.waveform, Waveform::Sawtooth);
        assert_eq!((s.carrier_hz, s.lfo_hz, s.depth_hz, s.gain), (440.0, 4.0, 400.0, 0.5));
    }

    #[test]
    fn siren_is_single_instance() {
        let rec = Recorder::default();
        let mut engine = ToneEngine::new(Box::new(rec.clone()));
        engine.stop_siren();
        engine.start_siren();
        engine.start_siren();
        assert!(engine.siren_playing());
        engine.stop_siren();
        engine.stop_siren();
        assert_eq!(rec.count(&Played::SirenStarted), 1);
        assert_eq!(rec.count(&Played::SirenStopped), 1);
        assert!(!engine.siren_playing());
    }

    #[test]
    fn unavailable_device_goes_silent() {
        let rec = Recorder {
            fail_with: Some(AudioError::Unavailable("blocked".into())),
            ..Recorder::default()
        };
        let mut engine = ToneEngine::new(Box::new(rec.clone()));
        engine.clock_tick();
        assert!(engine.is_silent());
        engine.start_siren();
        engine.win_chime();
        assert!(!engine.siren_playing());
        assert!(rec.log.borrow().is_empty());
    }

    #[test]
    fn graph_errors_keep_the_backend() {
        let rec = Recorder {
            fail_with: Some(AudioError::Graph("node".into())),
            ..Recorder::default()
        };
        let mut engine = ToneEngine::new(Box::new(rec));
        engine.spin_tick();
        assert!(!engine.is_silent());
    }

    #[test]
    fn bus_levels_scale_the_tick() {
        let rec = Recorder::default();
        let mut engine = ToneEngine::new(Box::new(rec.clone()));
        engine.clock_tick();
        engine.spin_tick();
        let log = rec.log.borrow();
        let levels: Vec<f32> = log
            .iter()
            .filter_map(|p| match p {
                Played::Tone(t) => Some(t.level),
                _ => None,
            })
            .collect();
        assert_eq!(levels, vec![CLOCK_TICK_LEVEL, SPIN_TICK_LEVEL]);
        assert_eq!(rec.ticks(), 2);
    }
}
