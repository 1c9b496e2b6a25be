use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct PanControlProps {
    pub label: String,
    pub available: bool,
    pub on_toggle: Callback<()>,
}

#[function_component(PanControl)]
pub fn pan_control(props: &PanControlProps) -> Html {
    let toggle_cb = {
        let cb = props.on_toggle.clone();
        Callback::from(move |_| cb.emit(()))
    };
    html! {<div style="display:flex; gap:8px; align-items:center; margin-top:8px;">
        <button onclick={toggle_cb} disabled={!props.available}>{ props.label.clone() }</button>
        <span style="font-size:11px; opacity:0.6;">{"Hotkeys: 'P' pan, arrows switch feed"}</span>
    </div>}
}
