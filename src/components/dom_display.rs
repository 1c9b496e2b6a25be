use std::cell::RefCell;
use wasm_bindgen::{Clamped, JsCast};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement, HtmlImageElement, ImageData};
use yew::prelude::*;

use crate::model::{ViewerAction, ViewerState};
use crate::state::{FeedDisplay, NoiseFrame, PanAnimation, Presentation};
use crate::util::cwarn;

const GLITCH_CLASS: &str = "glitch";
const NO_MEDIA_CLASS: &str = "no-media";

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
    canvas
        .get_context("2d")
        .ok()
        .flatten()
        .and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
}

/// Backing-store size for a `css_w` x `css_h` box at `dpr` device pixels per
/// CSS pixel. Never smaller than 1x1.
pub fn device_surface(css_w: i32, css_h: i32, dpr: f64) -> (u32, u32) {
    let dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
    let scale = |v: i32| ((v.max(1) as f64 * dpr).round() as u32).max(1);
    (scale(css_w), scale(css_h))
}

/// Feed viewport backed by the matrix view's `<img>` and `<canvas>`.
pub struct DomFeedDisplay {
    viewport: NodeRef,
    media: NodeRef,
    canvas: NodeRef,
    // Low-res noise frames land here before being scaled onto `canvas`.
    scratch: RefCell<Option<HtmlCanvasElement>>,
    viewer: UseReducerHandle<ViewerState>,
}

impl DomFeedDisplay {
    pub fn new(
        viewport: NodeRef,
        media: NodeRef,
        canvas: NodeRef,
        viewer: UseReducerHandle<ViewerState>,
    ) -> Self {
        Self {
            viewport,
            media,
            canvas,
            scratch: RefCell::new(None),
            viewer,
        }
    }

    fn scratch_canvas(&self, width: u32, height: u32) -> Option<HtmlCanvasElement> {
        let mut slot = self.scratch.borrow_mut();
        if slot.is_none() {
            let document = web_sys::window()?.document()?;
            let el = document.create_element("canvas").ok()?;
            *slot = el.dyn_into::<HtmlCanvasElement>().ok();
        }
        let scratch = slot.as_ref()?;
        if scratch.width() != width || scratch.height() != height {
            scratch.set_width(width);
            scratch.set_height(height);
        }
        Some(scratch.clone())
    }

    /// Viewport size in device pixels.
    fn viewport_device_size(&self) -> Option<(u32, u32)> {
        let vp = self.viewport.cast::<HtmlElement>()?;
        let dpr = web_sys::window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0);
        Some(device_surface(vp.client_width(), vp.client_height(), dpr))
    }

    fn set_visible(el: &HtmlElement, visible: bool) {
        let _ = el
            .style()
            .set_property("display", if visible { "block" } else { "none" });
    }
}

impl FeedDisplay for DomFeedDisplay {
    fn discard(&self) {
        if let Some(img) = self.media.cast::<HtmlImageElement>() {
            let _ = img.remove_attribute("src");
            img.set_alt("");
            let _ = img.style().set_property("animation", "none");
            Self::set_visible(&img, false);
        }
        if let Some(canvas) = self.canvas.cast::<HtmlCanvasElement>() {
            if let Some(ctx) = context_2d(&canvas) {
                ctx.clear_rect(0.0, 0.0, canvas.width() as f64, canvas.height() as f64);
            }
            Self::set_visible(&canvas, false);
        }
        if let Some(vp) = self.viewport.cast::<HtmlElement>() {
            let _ = vp.class_list().remove_2(GLITCH_CLASS, NO_MEDIA_CLASS);
        }
    }

    fn present(&self, presentation: &Presentation) {
        match presentation {
            Presentation::Media { url, alt } => {
                let Some(img) = self.media.cast::<HtmlImageElement>() else {
                    cwarn("feed: media element missing");
                    return;
                };
                img.set_alt(alt);
                if url.is_empty() {
                    if let Some(vp) = self.viewport.cast::<HtmlElement>() {
                        let _ = vp.class_list().add_1(NO_MEDIA_CLASS);
                    }
                } else {
                    img.set_src(url);
                    Self::set_visible(&img, true);
                }
            }
            Presentation::Noise => {
                let Some(canvas) = self.canvas.cast::<HtmlCanvasElement>() else {
                    cwarn("feed: noise canvas missing");
                    return;
                };
                let (w, h) = self.viewport_device_size().unwrap_or((640, 360));
                canvas.set_width(w);
                canvas.set_height(h);
                Self::set_visible(&canvas, true);
            }
        }
    }

    fn set_pan(&self, pan: Option<PanAnimation>) {
        if let Some(img) = self.media.cast::<HtmlImageElement>() {
            let style = img.style();
            match pan {
                Some(p) => {
                    let _ = style.set_property("animation", &p.css_animation());
                    let _ = style.set_property("animation-play-state", p.play_state());
                }
                None => {
                    let _ = style.set_property("animation", "none");
                    let _ = style.set_property("object-position", "50% 50%");
                }
            }
        }
        self.viewer.dispatch(ViewerAction::SetPan {
            available: pan.is_some(),
            paused: pan.map(|p| p.paused).unwrap_or(false),
        });
    }

    fn glitch_pulse(&self) {
        if let Some(vp) = self.viewport.cast::<HtmlElement>() {
            let classes = vp.class_list();
            let _ = classes.remove_1(GLITCH_CLASS);
            // reading layout restarts the CSS animation
            let _ = vp.offset_width();
            let _ = classes.add_1(GLITCH_CLASS);
        }
        self.viewer.dispatch(ViewerAction::GlitchPulse);
    }

    fn noise_surface_size(&self) -> (u32, u32) {
        self.canvas
            .cast::<HtmlCanvasElement>()
            .map(|c| (c.width(), c.height()))
            .unwrap_or((640, 360))
    }

    fn draw_noise(&self, frame: &NoiseFrame<'_>) {
        let Some(canvas) = self.canvas.cast::<HtmlCanvasElement>() else {
            return;
        };
        if !canvas.is_connected() {
            return;
        }
        // Follow viewport resizes; the low-res buffer keeps its size and is
        // stretched onto the new surface.
        if let Some((w, h)) = self.viewport_device_size() {
            if canvas.width() != w || canvas.height() != h {
                canvas.set_width(w);
                canvas.set_height(h);
            }
        }
        let Some(scratch) = self.scratch_canvas(frame.width, frame.height) else {
            return;
        };
        let (Some(sctx), Some(ctx)) = (context_2d(&scratch), context_2d(&canvas)) else {
            return;
        };
        let Ok(data) = ImageData::new_with_u8_clamped_array_and_sh(Clamped(frame.data), frame.width, frame.height) else {
            return;
        };
        let _ = sctx.put_image_data(&data, 0.0, 0.0);
        ctx.set_image_smoothing_enabled(false);
        let _ = ctx.draw_image_with_html_canvas_element_and_dw_and_dh(
            &scratch,
            0.0,
            0.0,
            canvas.width() as f64,
            canvas.height() as f64,
        );
    }

    fn highlight(&self, camera_id: &str) {
        self.viewer.dispatch(ViewerAction::Highlight(camera_id.to_string()));
    }

    fn set_hud(&self, text: &str) {
        self.viewer.dispatch(ViewerAction::SetHud(text.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_scales_by_device_pixel_ratio() {
        assert_eq!(device_surface(640, 360, 1.0), (640, 360));
        assert_eq!(device_surface(640, 360, 2.0), (1280, 720));
        assert_eq!(device_surface(401, 301, 1.5), (602, 452));
    }

    #[test]
    fn surface_never_collapses() {
        assert_eq!(device_surface(0, -4, 2.0), (2, 2));
        assert_eq!(device_surface(320, 200, f64::NAN), (320, 200));
        assert_eq!(device_surface(320, 200, 0.0), (320, 200));
    }
}
