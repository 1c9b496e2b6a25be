use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct ErrorPanelProps {
    pub message: String,
    #[prop_or_default]
    pub on_dismiss: Option<Callback<()>>,
}

#[function_component(ErrorPanel)]
pub fn error_panel(props: &ErrorPanelProps) -> Html {
    let dismiss = props.on_dismiss.clone().map(|cb| Callback::from(move |_| cb.emit(())));
    html! {<div class="error-panel" style="border:1px solid #a33; background:rgba(60,10,10,0.85); color:#f88; padding:8px 10px; margin-top:8px; font-size:12px; display:flex; gap:10px; align-items:center;">
        <span>{ format!("ERROR: {}", props.message) }</span>
        { if let Some(onclick) = dismiss { html!{ <button onclick={onclick}>{"OK"}</button> } } else { html!{} } }
    </div>}
}
