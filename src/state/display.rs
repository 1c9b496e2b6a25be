use super::noise::NoiseFrame;
use super::pan::PanAnimation;

/// What occupies the feed viewport.
#[derive(Clone, Debug, PartialEq)]
pub enum Presentation {
    /// Still image or stream at `url` (may be empty for a dead link).
    Media { url: String, alt: String },
    /// Procedural static drawn through [`FeedDisplay::draw_noise`].
    Noise,
}

/// Output side of the viewer session. Methods take `&self`; implementations
/// use interior mutability like the rest of the UI state.
pub trait FeedDisplay {
    /// Removes whatever the viewport currently shows.
    fn discard(&self);
    fn present(&self, presentation: &Presentation);
    /// `None` means a static crop.
    fn set_pan(&self, pan: Option<PanAnimation>);
    /// Retriggers the glitch effect on the viewport.
    fn glitch_pulse(&self);
    /// Drawing surface size in device pixels (CSS size times
    /// `devicePixelRatio`) for the noise canvas.
    fn noise_surface_size(&self) -> (u32, u32);
    /// Upscales `frame` onto the noise surface without smoothing.
    fn draw_noise(&self, frame: &NoiseFrame<'_>);
    fn highlight(&self, camera_id: &str);
    fn set_hud(&self, text: &str);
}
