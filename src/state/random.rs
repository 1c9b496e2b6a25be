use std::cell::RefCell;
use std::rc::Rc;

/// Uniform samples in `[0, 1)`.
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;
}

pub type SharedRandom = Rc<RefCell<dyn RandomSource>>;

/// `Math.random()` from the host page.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsRandom;

impl RandomSource for JsRandom {
    fn next_f64(&mut self) -> f64 {
        js_sys::Math::random()
    }
}

#[cfg(test)]
impl RandomSource for fastrand::Rng {
    fn next_f64(&mut self) -> f64 {
        self.f64()
    }
}

#[cfg(test)]
pub(crate) fn seeded(seed: u64) -> SharedRandom {
    Rc::new(RefCell::new(fastrand::Rng::with_seed(seed)))
}

/// Replays a fixed sequence, wrapping around.
#[cfg(test)]
pub(crate) struct Sequence {
    values: Vec<f64>,
    pos: usize,
}

#[cfg(test)]
impl Sequence {
    pub(crate) fn new(values: Vec<f64>) -> Self {
        Self { values, pos: 0 }
    }
}

#[cfg(test)]
impl RandomSource for Sequence {
    fn next_f64(&mut self) -> f64 {
        let v = self.values[self.pos % self.values.len()];
        self.pos += 1;
        v
    }
}
