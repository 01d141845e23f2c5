use anything_goes::web::{BrowserScheduler, WebAudio};
use anything_goes::{GameEvent, Listener, RangeUpdate, Session, ToneEngine};
use log::info;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{HtmlInputElement, KeyboardEvent};
use yew::prelude::*;

/// The page's one game session. Every session event schedules a re-render.
#[hook]
pub fn use_session() -> Session {
    let redraw = use_force_update();
    let session = use_memo((), move |_| {
        let listener: Listener = Rc::new(move |event: GameEvent| {
            if let GameEvent::SpinResolved(value) = event {
                info!("Wheel landed on {}", value);
            }
            redraw.force_update();
        });
        Session::new(
            Rc::new(BrowserScheduler),
            ToneEngine::new(Box::new(WebAudio::new())),
            Box::new(rand::rng()),
            listener,
        )
    });
    (*session).clone()
}

/// Route document keydowns to the session for as long as the component lives.
#[hook]
pub fn use_keyboard(session: Session) {
    use_effect_with((), move |_| {
        let document = gloo_utils::document();
        let on_key = Closure::<dyn Fn(KeyboardEvent)>::new(move |e: KeyboardEvent| {
            session.key_pressed(&e.key());
        });
        if let Err(e) =
            document.add_event_listener_with_callback("keydown", on_key.as_ref().unchecked_ref())
        {
            log::warn!("Keyboard shortcuts unavailable: {:?}", e);
        }
        move || {
            let _ = document
                .remove_event_listener_with_callback("keydown", on_key.as_ref().unchecked_ref());
        }
    });
}

/// Text state for the wheel's min/max fields.
#[derive(Clone)]
pub struct RangeInputs {
    pub min_text: String,
    pub max_text: String,
    pub on_min_input: Callback<InputEvent>,
    pub on_max_input: Callback<InputEvent>,
    /// Apply both fields to the wheel. The fields are rewritten with the
    /// range the wheel ended up with, so a rejected edit restores the old
    /// values and a clamped one shows the clamp.
    pub on_commit: Callback<()>,
}

#[hook]
pub fn use_range_inputs(session: Session) -> RangeInputs {
    let initial = session.view().wheel_config;
    let min_text = use_state(|| initial.min().to_string());
    let max_text = use_state(|| initial.max().to_string());

    let on_min_input = {
        let min_text = min_text.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            min_text.set(input.value());
        })
    };
    let on_max_input = {
        let max_text = max_text.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            max_text.set(input.value());
        })
    };

    let on_commit = {
        let min_text = min_text.clone();
        let max_text = max_text.clone();
        Callback::from(move |_| {
            let update = session.update_range(&min_text, &max_text);
            if let RangeUpdate::Rejected(_) = update {
                log::debug!("Range {:?}..{:?} rejected", *min_text, *max_text);
            }
            let config = update.config();
            min_text.set(config.min().to_string());
            max_text.set(config.max().to_string());
        })
    };

    RangeInputs {
        min_text: (*min_text).clone(),
        max_text: (*max_text).clone(),
        on_min_input,
        on_max_input,
        on_commit,
    }
}
