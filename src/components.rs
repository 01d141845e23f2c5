//! Stateless view components. Each renders from props only.

use anything_goes::config::{
    DONUT_RADIUS, SPIN_TRANSITION, WHEEL_CENTER, WHEEL_LABEL_RADIUS, WHEEL_RADIUS,
};
use anything_goes::utils::{format_percent, format_signed};
use anything_goes::{Contestant, Segment};
use std::f64::consts::PI;
use yew::prelude::*;

/// Point on a circle around the wheel center. Angles are clockwise degrees
/// from 12 o'clock.
fn polar(radius: f64, angle_deg: f64) -> (f64, f64) {
    let rad = (angle_deg - 90.0).to_radians();
    (WHEEL_CENTER + radius * rad.cos(), WHEEL_CENTER + radius * rad.sin())
}

/// SVG path for one wedge. `None` for a segment covering the whole circle,
/// which an arc command cannot draw.
fn wedge_path(segment: &Segment) -> Option<String> {
    if segment.sweep() >= 360.0 {
        return None;
    }
    let (x0, y0) = polar(WHEEL_RADIUS, segment.start_deg);
    let (x1, y1) = polar(WHEEL_RADIUS, segment.end_deg);
    let large_arc = u8::from(segment.sweep() > 180.0);
    Some(format!(
        "M {c} {c} L {x0:.3} {y0:.3} A {r} {r} 0 {large_arc} 1 {x1:.3} {y1:.3} Z",
        c = WHEEL_CENTER,
        r = WHEEL_RADIUS,
    ))
}

fn dash_offset(progress: f64) -> f64 {
    2.0 * PI * DONUT_RADIUS * (1.0 - progress.clamp(0.0, 1.0))
}

#[derive(Properties, PartialEq)]
pub struct CountdownDonutProps {
    pub progress: f64,
    pub running: bool,
}

/// Remaining-time ring; drains clockwise as the countdown runs.
#[function_component(CountdownDonut)]
pub fn countdown_donut(props: &CountdownDonutProps) -> Html {
    let circumference = 2.0 * PI * DONUT_RADIUS;
    html! {
        <div class={classes!("donut", props.running.then_some("running"))}>
            <svg viewBox="0 0 200 200">
                <circle class="donut-track" cx="100" cy="100" r={DONUT_RADIUS.to_string()} />
                <circle class="donut-fill" cx="100" cy="100" r={DONUT_RADIUS.to_string()}
                    transform="rotate(-90 100 100)"
                    stroke-dasharray={format!("{:.3}", circumference)}
                    stroke-dashoffset={format!("{:.3}", dash_offset(props.progress))}
                />
            </svg>
            <span class="donut-label">{ format_percent(props.progress) }</span>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct WheelFaceProps {
    pub segments: Vec<Segment>,
    pub rotation_deg: f64,
    pub animate: bool,
}

#[function_component(WheelFace)]
pub fn wheel_face(props: &WheelFaceProps) -> Html {
    let style = format!(
        "transform: rotate({:.3}deg); transition: {};",
        props.rotation_deg,
        if props.animate { SPIN_TRANSITION } else { "none" }
    );
    html! {
        <div class="wheel">
            <div class="wheel-pointer" />
            <svg class="wheel-face" viewBox="0 0 200 200" style={style}>
                { props.segments.iter().map(|segment| {
                    let (lx, ly) = polar(WHEEL_LABEL_RADIUS, segment.center_deg());
                    let wedge = match wedge_path(segment) {
                        Some(d) => html! { <path d={d} fill={segment.color} /> },
                        None => html! {
                            <circle cx={WHEEL_CENTER.to_string()} cy={WHEEL_CENTER.to_string()}
                                r={WHEEL_RADIUS.to_string()} fill={segment.color} />
                        },
                    };
                    html! {
                        <g key={segment.index}>
                            { wedge }
                            <text class="wheel-label"
                                x={format!("{:.3}", lx)} y={format!("{:.3}", ly)}
                                transform={format!("rotate({:.3} {:.3} {:.3})", segment.center_deg(), lx, ly)}
                                text-anchor="middle" dominant-baseline="middle">
                                { segment.value }
                            </text>
                        </g>
                    }
                }).collect::<Html>() }
            </svg>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct ScoreCardProps {
    pub contestant: Contestant,
    pub name: String,
    pub score: i32,
    pub on_rename: Callback<String>,
    pub on_adjust: Callback<i32>,
}

#[function_component(ScoreCard)]
pub fn score_card(props: &ScoreCardProps) -> Html {
    let oninput = props.on_rename.reform(|e: InputEvent| {
        let input: web_sys::HtmlInputElement = e.target_unchecked_into();
        input.value()
    });
    let minus = props.on_adjust.reform(|_: MouseEvent| -1);
    let plus = props.on_adjust.reform(|_: MouseEvent| 1);
    html! {
        <div class={classes!("score-card", format!("contestant-{}", props.contestant.id()))}>
            <input class="contestant-name" type="text"
                placeholder={props.contestant.default_name()}
                value={props.name.clone()}
                {oninput}
            />
            <div class={classes!("score", (props.score < 0).then_some("negative"))}>
                { props.score }
            </div>
            <div class="score-buttons">
                <button onclick={minus}>{ "−" }</button>
                <button onclick={plus}>{ "+" }</button>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct ResultBannerProps {
    pub value: Option<i32>,
}

#[function_component(ResultBanner)]
pub fn result_banner(props: &ResultBannerProps) -> Html {
    match props.value {
        Some(value) => html! {
            <div class={classes!("wheel-result", (value < 0).then_some("negative"))}>
                { format_signed(value) }
            </div>
        },
        None => html! { <div class="wheel-result empty" /> },
    }
}

#[derive(Properties, PartialEq)]
pub struct HelpPanelProps {
    pub on_close: Callback<()>,
}

/// Help overlay. Clicking the backdrop closes it; clicks inside the panel
/// do not.
#[function_component(HelpPanel)]
pub fn help_panel(props: &HelpPanelProps) -> Html {
    let backdrop = props.on_close.reform(|_: MouseEvent| ());
    let close = props.on_close.reform(|_: MouseEvent| ());
    let keep_open = Callback::from(|e: MouseEvent| e.stop_propagation());
    html! {
        <div class="overlay help-overlay" onclick={backdrop}>
            <div class="panel" onclick={keep_open}>
                <h2>{ "How to play" }</h2>
                <ol>
                    <li>{ "Start the clock. It runs for a secret time between 1 second and 2 minutes." }</li>
                    <li>{ "When the siren sounds, press any key or the button to stop it." }</li>
                    <li>{ "The wheel opens. Set its range (-20 to 20) and spin." }</li>
                    <li>{ "Award the result to a contestant, or close the wheel to skip." }</li>
                </ol>
                <p>{ "Use the − and + buttons to correct a score at any time. Esc closes this panel." }</p>
                <button class="btn-secondary" onclick={close}>{ "Close" }</button>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anything_goes::WheelConfig;

    #[test]
    fn first_wedge_starts_at_twelve_oclock() {
        let segments = WheelConfig::default().segments();
        let path = wedge_path(&segments[0]).unwrap();
        assert!(path.starts_with("M 100 100 L 100.000 5.000 A 95 95 0 0 1"), "{}", path);
    }

    #[test]
    fn single_value_wheel_is_a_full_disc() {
        let config = WheelConfig::normalized(3, 3).unwrap();
        let segments = config.segments();
        assert_eq!(segments.len(), 1);
        assert_eq!(wedge_path(&segments[0]), None);
    }

    #[test]
    fn wide_wedges_use_the_large_arc() {
        let segments = WheelConfig::normalized(1, 2).unwrap().segments();
        let path = wedge_path(&segments[0]).unwrap();
        // Two segments of exactly 180 degrees each.
        assert!(path.contains(" 0 0 1 "), "{}", path);
    }

    #[test]
    fn ring_drains_with_progress() {
        let full = 2.0 * PI * DONUT_RADIUS;
        assert_eq!(dash_offset(1.0), 0.0);
        assert!((dash_offset(0.0) - full).abs() < 1e-9);
        assert!((dash_offset(0.25) - full * 0.75).abs() < 1e-9);
    }
}
