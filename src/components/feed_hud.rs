use yew::prelude::*;

use crate::model::Camera;

#[derive(Properties, PartialEq, Clone)]
pub struct FeedHudProps {
    pub camera: Option<Camera>,
    pub hud: String,
    pub glitch_pulses: u64,
}

#[function_component(FeedHud)]
pub fn feed_hud(props: &FeedHudProps) -> Html {
    let Some(cam) = &props.camera else {
        return html! {<div class="hud" style="position:absolute; inset:0; display:flex; align-items:center; justify-content:center;">{"SELECT A FEED"}</div>};
    };
    let degraded = cam.status.schedules_glitches();
    html! {<div class="hud" style="position:absolute; inset:0; pointer-events:none; padding:10px; display:flex; flex-direction:column; justify-content:space-between;">
        <div style="display:flex; justify-content:space-between;">
            <span>{ props.hud.clone() }</span>
            <span class={classes!("cam-status", cam.status.css_class())}>{ cam.status.label() }</span>
        </div>
        <div style="display:flex; justify-content:space-between; font-size:12px;">
            <span>{ format!("{} / {}", cam.section.to_uppercase(), cam.location.to_uppercase()) }</span>
            <span>{ format!("DIST {}", cam.distance) }</span>
            { if degraded { html!{ <span>{ format!("SIG ERR {:04}", props.glitch_pulses % 10_000) }</span> } } else { html!{} } }
        </div>
    </div>}
}
