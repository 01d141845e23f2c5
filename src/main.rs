//! Yew front end for Anything Goes.
//! Wires the session, theme and keyboard hooks to the view components.

use anything_goes::theme::{load_theme, toggle_theme};
use anything_goes::web::{apply_theme, LocalStore};
use anything_goes::{AppMode, Contestant, Theme, WheelState};
use yew::prelude::*;

mod components;
mod hooks;

use components::{CountdownDonut, HelpPanel, ResultBanner, ScoreCard, WheelFace};
use hooks::{use_keyboard, use_range_inputs, use_session};

/// Enter in a range field commits it, like leaving the field does.
fn commit_on_enter(commit: Callback<()>) -> Callback<KeyboardEvent> {
    Callback::from(move |e: KeyboardEvent| {
        if e.key() == "Enter" {
            commit.emit(());
        }
    })
}

#[function_component]
pub fn App() -> Html {
    let session = use_session();
    use_keyboard(session.clone());
    let range = use_range_inputs(session.clone());
    let theme = use_state(|| load_theme(&LocalStore));
    let names = use_state(|| [String::new(), String::new()]);

    use_effect_with(*theme, |theme| {
        apply_theme(*theme);
        || ()
    });

    let view = session.view();
    let display_name = |contestant: Contestant| {
        let name = names[contestant.id() as usize - 1].trim();
        if name.is_empty() {
            contestant.default_name()
        } else {
            name.to_string()
        }
    };

    let on_theme = {
        let theme = theme.clone();
        Callback::from(move |_: MouseEvent| theme.set(toggle_theme(&LocalStore, *theme)))
    };
    let on_help = {
        let session = session.clone();
        Callback::from(move |_: MouseEvent| session.open_help())
    };
    let on_help_close = {
        let session = session.clone();
        Callback::from(move |()| session.close_help())
    };
    let on_start = {
        let session = session.clone();
        Callback::from(move |_: MouseEvent| {
            session.start_countdown();
        })
    };
    let on_open_wheel = {
        let session = session.clone();
        Callback::from(move |_: MouseEvent| {
            session.open_wheel();
        })
    };
    let on_dismiss = {
        let session = session.clone();
        Callback::from(move |_: MouseEvent| {
            session.dismiss_alarm();
        })
    };
    let on_spin = {
        let session = session.clone();
        Callback::from(move |_: MouseEvent| {
            session.spin();
        })
    };
    let on_close_wheel = {
        let session = session.clone();
        Callback::from(move |_: MouseEvent| {
            session.close_wheel();
        })
    };

    let score_cards = Contestant::ALL
        .into_iter()
        .map(|contestant| {
            let slot = contestant.id() as usize - 1;
            let on_rename = {
                let names = names.clone();
                Callback::from(move |name: String| {
                    let mut next = (*names).clone();
                    next[slot] = name;
                    names.set(next);
                })
            };
            let on_adjust = {
                let session = session.clone();
                Callback::from(move |delta: i32| {
                    session.adjust_score(contestant, delta);
                })
            };
            html! {
                <ScoreCard
                    {contestant}
                    name={names[slot].clone()}
                    score={view.scores[slot]}
                    {on_rename}
                    {on_adjust}
                />
            }
        })
        .collect::<Html>();

    let award_buttons = Contestant::ALL
        .into_iter()
        .map(|contestant| {
            let session = session.clone();
            let onclick = Callback::from(move |_: MouseEvent| {
                session.award(contestant);
            });
            html! {
                <button class="btn-award" {onclick}>
                    { format!("Give to {}", display_name(contestant)) }
                </button>
            }
        })
        .collect::<Html>();

    let idle = view.mode == AppMode::Idle;
    let spinning = view.wheel_state == WheelState::Spinning;

    html! {
        <div class="app">
            <header class="app-header">
                <h1>{ "Anything Goes" }</h1>
                <div class="header-actions">
                    <button class="btn-secondary" onclick={on_theme}>
                        { if *theme == Theme::Dark { "Light mode" } else { "Dark mode" } }
                    </button>
                    <button class="btn-secondary" onclick={on_help}>{ "Help" }</button>
                </div>
            </header>

            <section class="clock-section">
                <CountdownDonut
                    progress={view.progress}
                    running={view.mode == AppMode::CountdownActive}
                />
                <div class="clock-actions">
                    <button class="btn-primary" disabled={!idle} onclick={on_start}>
                        { "Start Clock" }
                    </button>
                    <button class="btn-secondary" disabled={!idle} onclick={on_open_wheel}>
                        { "Open Wheel" }
                    </button>
                </div>
            </section>

            <section class="scoreboard">
                { score_cards }
            </section>

            if view.mode == AppMode::AlarmActive {
                <div class="overlay alarm-overlay">
                    <div class="panel alarm-panel">
                        <h2>{ "Time's up!" }</h2>
                        <button class="btn-primary" onclick={on_dismiss}>{ "Stop Siren" }</button>
                        <p class="hint">{ "or press any key" }</p>
                    </div>
                </div>
            }

            if view.mode == AppMode::WheelActive {
                <div class="overlay wheel-overlay">
                    <div class="panel wheel-panel">
                        <div class="range-inputs">
                            <label>
                                { "Min" }
                                <input type="text" inputmode="numeric"
                                    value={range.min_text.clone()}
                                    disabled={spinning}
                                    oninput={range.on_min_input.clone()}
                                    onchange={range.on_commit.reform(|_: Event| ())}
                                    onkeydown={commit_on_enter(range.on_commit.clone())}
                                />
                            </label>
                            <label>
                                { "Max" }
                                <input type="text" inputmode="numeric"
                                    value={range.max_text.clone()}
                                    disabled={spinning}
                                    oninput={range.on_max_input.clone()}
                                    onchange={range.on_commit.reform(|_: Event| ())}
                                    onkeydown={commit_on_enter(range.on_commit.clone())}
                                />
                            </label>
                        </div>
                        <WheelFace
                            segments={view.segments.clone()}
                            rotation_deg={view.rotation_deg}
                            animate={view.animate_rotation}
                        />
                        <ResultBanner value={view.result} />
                        <div class="wheel-actions">
                            <button class="btn-primary" disabled={spinning} onclick={on_spin}>
                                { "Spin" }
                            </button>
                            if view.result.is_some() {
                                { award_buttons }
                            }
                            <button class="btn-secondary" disabled={spinning} onclick={on_close_wheel}>
                                { "Close" }
                            </button>
                        </div>
                    </div>
                </div>
            }

            if view.help_open {
                <HelpPanel on_close={on_help_close} />
            }
        </div>
    }
}

fn main() {
    console_error_panic_hook::set_once();
    // Fails only if a logger is already installed.
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Starting Anything Goes");
    yew::Renderer::<App>::new().render();
}
