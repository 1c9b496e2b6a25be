pub mod display;
pub mod glitch;
pub mod noise;
pub mod pan;
pub mod random;
pub mod scheduler;
pub mod session;

pub use display::{FeedDisplay, Presentation};
pub use noise::NoiseFrame;
pub use pan::PanAnimation;
pub use random::JsRandom;
pub use scheduler::BrowserScheduler;
pub use session::ViewerSession;
