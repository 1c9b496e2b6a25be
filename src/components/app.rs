use std::rc::Rc;
use yew::prelude::*;

use super::{camera_matrix::CameraMatrix, error_panel::ErrorPanel};
use crate::config::EffectsConfig;
use crate::error::ViewerError;
use crate::sheet::load_registry;
use crate::util::cerror;

#[function_component(App)]
pub fn app() -> Html {
    let config = use_memo((), |_| EffectsConfig::load());
    let loaded = use_memo((), {
        let config = config.clone();
        move |_| match load_registry(&config) {
            Ok(reg) => Ok(Rc::new(reg)),
            Err(e) => {
                let e = ViewerError::from(e);
                cerror(&e.to_string());
                Err(e.to_string())
            }
        }
    });

    let content = match &*loaded {
        Ok(registry) if !registry.is_empty() => html! {
            <CameraMatrix registry={registry.clone()} config={(*config).clone()} />
        },
        Ok(_) => html! { <ErrorPanel message={"No cameras configured".to_string()} /> },
        Err(msg) => html! { <ErrorPanel message={msg.clone()} /> },
    };
    html! { <div id="root">{ content }</div> }
}
