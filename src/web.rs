//! Browser implementations of the scheduling, audio and storage seams.

use crate::schedule::{Scheduler, TaskHandle};
use crate::theme::{PreferenceStore, Theme};
use crate::tone::{AudioBackend, AudioError, Curve, Point, Siren, SustainedVoice, Tone, Waveform};
use gloo_timers::callback::{Interval, Timeout};
use log::debug;
use wasm_bindgen::JsValue;
use web_sys::{AudioContext, AudioContextState, AudioParam, GainNode, OscillatorNode, OscillatorType};

fn js_message(value: JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

fn graph_error(value: JsValue) -> AudioError {
    AudioError::Graph(js_message(value))
}

/// Timers via `setTimeout` / `setInterval`, frames via `requestAnimationFrame`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserScheduler;

impl Scheduler for BrowserScheduler {
    fn now_ms(&self) -> f64 {
        js_sys::Date::now()
    }

    fn timeout(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> TaskHandle {
        let timeout = Timeout::new(delay_ms, task);
        TaskHandle::new(move || drop(timeout.cancel()))
    }

    fn interval(&self, period_ms: u32, mut task: Box<dyn FnMut()>) -> TaskHandle {
        let interval = Interval::new(period_ms, move || task());
        TaskHandle::new(move || drop(interval.cancel()))
    }

    fn animation_frame(&self, task: Box<dyn FnOnce()>) -> TaskHandle {
        let frame = gloo_render::request_animation_frame(move |_timestamp| task());
        TaskHandle::new(move || drop(frame))
    }
}

/// Web Audio renderer. The context is created on first use, since browsers
/// only allow audio after a user gesture.
#[derive(Default)]
pub struct WebAudio {
    ctx: Option<AudioContext>,
}

impl WebAudio {
    pub fn new() -> Self {
        Self::default()
    }

    fn context(&mut self) -> Result<&AudioContext, AudioError> {
        if self.ctx.is_none() {
            let ctx = AudioContext::new().map_err(|e| AudioError::Unavailable(js_message(e)))?;
            debug!("Audio context created");
            self.ctx = Some(ctx);
        }
        let ctx = self
            .ctx
            .as_ref()
            .ok_or_else(|| AudioError::Unavailable("no audio context".into()))?;
        if ctx.state() == AudioContextState::Suspended {
            // Resumption completes asynchronously; sounds queued meanwhile
            // play once it does.
            let _ = ctx.resume().map_err(|e| AudioError::Unavailable(js_message(e)))?;
        }
        Ok(ctx)
    }
}

fn oscillator_type(waveform: Waveform) -> OscillatorType {
    match waveform {
        Waveform::Sine => OscillatorType::Sine,
        Waveform::Sawtooth => OscillatorType::Sawtooth,
    }
}

fn automate(param: &AudioParam, start: f64, points: &[Point]) -> Result<(), AudioError> {
    for point in points {
        let at = start + point.offset_s;
        match point.curve {
            Curve::Step => param.set_value_at_time(point.value, at),
            Curve::Linear => param.linear_ramp_to_value_at_time(point.value, at),
            Curve::Exponential => param.exponential_ramp_to_value_at_time(point.value, at),
        }
        .map_err(graph_error)?;
    }
    Ok(())
}

fn fixed_gain(ctx: &AudioContext, value: f32) -> Result<GainNode, AudioError> {
    let gain = ctx.create_gain().map_err(graph_error)?;
    gain.gain().set_value_at_time(value, ctx.current_time()).map_err(graph_error)?;
    Ok(gain)
}

impl AudioBackend for WebAudio {
    fn play(&mut self, tone: &Tone) -> Result<(), AudioError> {
        let ctx = self.context()?;
        let start = ctx.current_time() + tone.delay_s;

        let osc = ctx.create_oscillator().map_err(graph_error)?;
        osc.set_type(oscillator_type(tone.waveform));
        automate(&osc.frequency(), start, &tone.frequency)?;

        let envelope = ctx.create_gain().map_err(graph_error)?;
        automate(&envelope.gain(), start, &tone.gain)?;
        osc.connect_with_audio_node(&envelope).map_err(graph_error)?;

        if tone.level == 1.0 {
            envelope.connect_with_audio_node(&ctx.destination()).map_err(graph_error)?;
        } else {
            let bus = fixed_gain(ctx, tone.level)?;
            envelope.connect_with_audio_node(&bus).map_err(graph_error)?;
            bus.connect_with_audio_node(&ctx.destination()).map_err(graph_error)?;
        }

        osc.start_with_when(start).map_err(graph_error)?;
        osc.stop_with_when(start + tone.duration_s).map_err(graph_error)?;
        Ok(())
    }

    fn sustain(&mut self, siren: &Siren) -> Result<Box<dyn SustainedVoice>, AudioError> {
        let ctx = self.context()?;
        let now = ctx.current_time();

        let carrier = ctx.create_oscillator().map_err(graph_error)?;
        carrier.set_type(oscillator_type(siren.waveform));
        carrier.frequency().set_value_at_time(siren.carrier_hz, now).map_err(graph_error)?;

        let lfo = ctx.create_oscillator().map_err(graph_error)?;
        lfo.frequency().set_value_at_time(siren.lfo_hz, now).map_err(graph_error)?;
        let depth = fixed_gain(ctx, siren.depth_hz)?;
        lfo.connect_with_audio_node(&depth).map_err(graph_error)?;
        depth.connect_with_audio_param(&carrier.frequency()).map_err(graph_error)?;

        let output = fixed_gain(ctx, siren.gain)?;
        carrier.connect_with_audio_node(&output).map_err(graph_error)?;
        output.connect_with_audio_node(&ctx.destination()).map_err(graph_error)?;

        lfo.start().map_err(graph_error)?;
        carrier.start().map_err(graph_error)?;
        Ok(Box::new(WebSiren { carrier, lfo }))
    }
}

struct WebSiren {
    carrier: OscillatorNode,
    lfo: OscillatorNode,
}

impl SustainedVoice for WebSiren {
    fn stop(self: Box<Self>) -> Result<(), AudioError> {
        self.carrier.stop().map_err(graph_error)?;
        self.lfo.stop().map_err(graph_error)
    }
}

/// `window.localStorage`. Reads fail soft when storage is blocked.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStore;

impl LocalStore {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }
}

impl PreferenceStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok()?
    }

    fn set(&self, key: &str, value: &str) -> Result<(), String> {
        let storage = Self::storage().ok_or_else(|| "localStorage unavailable".to_string())?;
        storage.set_item(key, value).map_err(js_message)
    }
}

/// Reflect the theme on `<html data-theme="…">` for the stylesheet.
pub fn apply_theme(theme: Theme) {
    if let Some(root) = gloo_utils::document().document_element() {
        let _ = root.set_attribute("data-theme", theme.as_str());
    }
}
