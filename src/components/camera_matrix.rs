use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::KeyboardEvent;
use yew::prelude::*;

use super::{
    camera_list::CameraList, dom_display::DomFeedDisplay, error_panel::ErrorPanel,
    feed_hud::FeedHud, pan_control::PanControl,
};
use crate::config::EffectsConfig;
use crate::model::{CameraRegistry, ViewerAction, ViewerState};
use crate::state::{BrowserScheduler, FeedDisplay, JsRandom, ViewerSession};
use crate::util::{cerror, clog};

#[derive(Properties, PartialEq, Clone)]
pub struct CameraMatrixProps {
    pub registry: Rc<CameraRegistry>,
    pub config: EffectsConfig,
}

fn select(session: &Rc<RefCell<Option<ViewerSession>>>, viewer: &UseReducerHandle<ViewerState>, id: &str) {
    let mut guard = session.borrow_mut();
    let Some(s) = guard.as_mut() else {
        return;
    };
    if let Err(e) = s.select_camera(id) {
        cerror(&e.to_string());
        viewer.dispatch(ViewerAction::ReportError(e.to_string()));
    }
}

fn step(session: &Rc<RefCell<Option<ViewerSession>>>, viewer: &UseReducerHandle<ViewerState>, delta: i32) {
    let next = {
        let guard = session.borrow();
        let Some(s) = guard.as_ref() else {
            return;
        };
        let current = s.active().map(|c| c.id.clone());
        s.registry().neighbor(current.as_deref(), delta).map(|c| c.id.clone())
    };
    if let Some(id) = next {
        select(session, viewer, &id);
    }
}

#[function_component(CameraMatrix)]
pub fn camera_matrix(props: &CameraMatrixProps) -> Html {
    let viewer = use_reducer(ViewerState::default);
    let viewport_ref = use_node_ref();
    let media_ref = use_node_ref();
    let canvas_ref = use_node_ref();
    let session = use_mut_ref(|| None::<ViewerSession>);

    // Session lifetime follows the loaded registry.
    {
        let viewer = viewer.clone();
        let viewport_ref = viewport_ref.clone();
        let media_ref = media_ref.clone();
        let canvas_ref = canvas_ref.clone();
        let session = session.clone();
        let config = props.config.clone();
        use_effect_with(props.registry.clone(), move |registry| {
            let display: Rc<dyn FeedDisplay> = Rc::new(DomFeedDisplay::new(
                viewport_ref,
                media_ref,
                canvas_ref,
                viewer.clone(),
            ));
            let window = web_sys::window();
            match BrowserScheduler::new() {
                Some(scheduler) => {
                    let mut s = ViewerSession::new(
                        registry.clone(),
                        config,
                        Rc::new(scheduler),
                        Rc::new(RefCell::new(JsRandom)),
                        display,
                    );
                    if let Some(first) = registry.neighbor(None, 1) {
                        if let Err(e) = s.select_camera(&first.id) {
                            cerror(&e.to_string());
                        }
                    }
                    *session.borrow_mut() = Some(s);
                }
                None => cerror("camera matrix: no window, effects disabled"),
            }
            clog(&format!("camera matrix: mounted with {} cameras", registry.len()));

            let key_cb = {
                let session = session.clone();
                let viewer = viewer.clone();
                Closure::wrap(Box::new(move |e: KeyboardEvent| match e.key().as_str() {
                    "p" | "P" => {
                        e.prevent_default();
                        let toggled = session.borrow_mut().as_mut().and_then(|s| s.toggle_pan());
                        if toggled.is_none() {
                            clog("pan: nothing to toggle");
                        }
                    }
                    "ArrowDown" | "ArrowRight" => {
                        e.prevent_default();
                        step(&session, &viewer, 1);
                    }
                    "ArrowUp" | "ArrowLeft" => {
                        e.prevent_default();
                        step(&session, &viewer, -1);
                    }
                    _ => {}
                }) as Box<dyn FnMut(_)>)
            };
            if let Some(win) = &window {
                let _ = win.add_event_listener_with_callback("keydown", key_cb.as_ref().unchecked_ref());
            }
            move || {
                if let Some(win) = &window {
                    let _ = win.remove_event_listener_with_callback(
                        "keydown",
                        key_cb.as_ref().unchecked_ref(),
                    );
                }
                if let Some(mut s) = session.borrow_mut().take() {
                    s.teardown();
                }
                drop(key_cb);
            }
        });
    }

    let on_select = {
        let session = session.clone();
        let viewer = viewer.clone();
        Callback::from(move |id: String| select(&session, &viewer, &id))
    };
    let on_toggle_pan = {
        let session = session.clone();
        Callback::from(move |_| {
            let _ = session.borrow_mut().as_mut().and_then(|s| s.toggle_pan());
        })
    };
    let on_dismiss = {
        let viewer = viewer.clone();
        Callback::from(move |_| viewer.dispatch(ViewerAction::ClearError))
    };

    let active = viewer
        .highlighted
        .as_deref()
        .and_then(|id| props.registry.get(id))
        .cloned();

    html! {<div class="matrix" style="display:flex; gap:16px; padding:12px; height:100vh; box-sizing:border-box;">
        <aside style="width:260px; overflow-y:auto; background:rgba(10,20,12,0.9); border:1px solid #1f3; border-radius:6px; padding:8px;">
            <div style="font-weight:600; margin-bottom:8px; letter-spacing:3px;">{"CAMERA MATRIX"}</div>
            <CameraList
                registry={props.registry.clone()}
                highlighted={viewer.highlighted.clone()}
                on_select={on_select}
            />
        </aside>
        <section style="flex:1; display:flex; flex-direction:column; min-width:0;">
            <div ref={viewport_ref} class="viewport" style="position:relative; flex:1; overflow:hidden; background:#000; border:1px solid #1f3;">
                <img ref={media_ref} class="feed-media" />
                <canvas ref={canvas_ref} class="feed-noise"></canvas>
                <FeedHud camera={active} hud={viewer.hud.clone()} glitch_pulses={viewer.glitch_pulses} />
            </div>
            <PanControl
                label={viewer.pan_label().to_string()}
                available={viewer.pan_available}
                on_toggle={on_toggle_pan}
            />
            { if let Some(msg) = &viewer.error { html!{ <ErrorPanel message={msg.clone()} on_dismiss={Some(on_dismiss)} /> } } else { html!{} } }
        </section>
    </div>}
}
