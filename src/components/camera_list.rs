use std::rc::Rc;
use yew::prelude::*;

use crate::model::CameraRegistry;

#[derive(Properties, PartialEq, Clone)]
pub struct CameraListProps {
    pub registry: Rc<CameraRegistry>,
    pub highlighted: Option<String>,
    pub on_select: Callback<String>,
}

#[function_component(CameraList)]
pub fn camera_list(props: &CameraListProps) -> Html {
    let sections = props.registry.sections();
    html! {<div style="display:flex; flex-direction:column; gap:10px;">
        { for sections.iter().map(|section| html! {
            <div class="cam-section">
                <div style="font-size:11px; letter-spacing:2px; opacity:0.7; margin-bottom:4px;">{ section.label.to_uppercase() }</div>
                { for section.cameras.iter().map(|cam| {
                    let active = props.highlighted.as_deref() == Some(cam.id.as_str());
                    let onclick = {
                        let cb = props.on_select.clone();
                        let id = cam.id.clone();
                        Callback::from(move |_| cb.emit(id.clone()))
                    };
                    html! {
                        <button
                            class={classes!("cam-entry", cam.status.css_class(), active.then_some("active"))}
                            onclick={onclick}
                        >
                            <span style="font-weight:600;">{ cam.id.to_uppercase() }</span>
                            <span style="opacity:0.8;">{ cam.location.clone() }</span>
                            <span class="cam-status">{ cam.status.label() }</span>
                        </button>
                    }
                }) }
            </div>
        }) }
    </div>}
}
