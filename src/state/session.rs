// Viewer session: which camera is on screen and which effects run for it.
use std::rc::Rc;

use super::display::{FeedDisplay, Presentation};
use super::glitch::GlitchScheduler;
use super::noise::NoiseLoop;
use super::pan::PanController;
use super::random::SharedRandom;
use super::scheduler::Scheduler;
use crate::config::EffectsConfig;
use crate::error::ViewerError;
use crate::model::{Camera, CameraRegistry};
use crate::util::{clog, cwarn};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Phase<'a> {
    Idle,
    Viewing(&'a Camera),
}

/// Owns every effect of the active camera; switching cameras tears the old
/// ones down before the new ones start.
pub struct ViewerSession {
    registry: Rc<CameraRegistry>,
    config: EffectsConfig,
    scheduler: Rc<dyn Scheduler>,
    rng: SharedRandom,
    display: Rc<dyn FeedDisplay>,
    active: Option<String>,
    presentation: Option<Presentation>,
    pan: PanController,
    glitch: GlitchScheduler,
    noise: NoiseLoop,
}

impl ViewerSession {
    pub fn new(
        registry: Rc<CameraRegistry>,
        config: EffectsConfig,
        scheduler: Rc<dyn Scheduler>,
        rng: SharedRandom,
        display: Rc<dyn FeedDisplay>,
    ) -> Self {
        Self {
            registry,
            config,
            scheduler,
            rng,
            display,
            active: None,
            presentation: None,
            pan: PanController::default(),
            glitch: GlitchScheduler::default(),
            noise: NoiseLoop::default(),
        }
    }

    pub fn registry(&self) -> &CameraRegistry {
        &self.registry
    }

    pub fn phase(&self) -> Phase<'_> {
        match self.active() {
            Some(cam) => Phase::Viewing(cam),
            None => Phase::Idle,
        }
    }

    pub fn active(&self) -> Option<&Camera> {
        self.active.as_deref().and_then(|id| self.registry.get(id))
    }

    pub fn presentation(&self) -> Option<&Presentation> {
        self.presentation.as_ref()
    }

    pub fn pan(&self) -> &PanController {
        &self.pan
    }

    pub fn glitch_running(&self) -> bool {
        self.glitch.is_running()
    }

    pub fn noise_running(&self) -> bool {
        self.noise.is_running()
    }

    /// Unknown ids leave the current view untouched.
    pub fn select_camera(&mut self, id: &str) -> Result<&Camera, ViewerError> {
        let registry = Rc::clone(&self.registry);
        let Some(cam) = registry.get(id) else {
            cwarn(&format!("select: unknown camera id '{}'", id));
            return Err(ViewerError::UnknownCameraId(id.to_string()));
        };

        self.stop_effects();
        self.display.discard();

        let presentation = if cam.status.presents_noise() {
            Presentation::Noise
        } else {
            Presentation::Media {
                url: cam.media_url.clone(),
                alt: cam.location.clone(),
            }
        };
        self.display.present(&presentation);
        if presentation == Presentation::Noise {
            self.noise.start(
                &self.config,
                self.display.noise_surface_size(),
                self.scheduler.clone(),
                self.rng.clone(),
                self.display.clone(),
            );
        }
        self.presentation = Some(presentation);

        self.pan.reset();
        if cam.pan_enabled {
            self.pan.enable(cam.pan_duration);
        } else {
            self.pan.disable();
        }
        self.display.set_pan(self.pan.animation());

        if cam.status.schedules_glitches() {
            let display = self.display.clone();
            self.glitch.start(
                cam.glitch,
                self.scheduler.clone(),
                self.rng.clone(),
                Rc::new(move || display.glitch_pulse()),
            );
        }

        self.active = Some(cam.id.clone());
        self.display.highlight(&cam.id);
        self.display.set_hud(&cam.hud_line());
        clog(&format!("select: {} ({})", cam.id, cam.status.label()));
        self.active()
            .ok_or_else(|| ViewerError::UnknownCameraId(id.to_string()))
    }

    /// Flips the sweep of the active feed; `None` when it has no sweep.
    pub fn toggle_pan(&mut self) -> Option<bool> {
        self.active.as_ref()?;
        let paused = self.pan.toggle()?;
        self.display.set_pan(self.pan.animation());
        Some(paused)
    }

    /// Stops all effects and clears the viewport. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        self.stop_effects();
        if self.presentation.take().is_some() {
            self.display.discard();
        }
        self.pan.disable();
        self.active = None;
    }

    fn stop_effects(&mut self) {
        self.noise.stop();
        self.glitch.stop();
    }
}

impl Drop for ViewerSession {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CameraStatus, GlitchBounds, PAUSE_PAN_LABEL, RESUME_PAN_LABEL, test_camera};
    use crate::state::display::recording::{DisplayEvent, RecordingDisplay};
    use crate::state::random::seeded;
    use crate::state::scheduler::manual::ManualScheduler;

    struct Rig {
        sched: Rc<ManualScheduler>,
        display: Rc<RecordingDisplay>,
        session: ViewerSession,
    }

    fn rig() -> Rig {
        let mut online = test_camera("cam-01", "Hangar", CameraStatus::Online);
        online.pan_enabled = true;
        online.pan_duration = 7.0;
        let mut flicker = test_camera("cam-02", "Hangar", CameraStatus::Flicker);
        flicker.glitch = GlitchBounds::new(400.0, 1200.0);
        let mut lost = test_camera("cam-03", "Medbay", CameraStatus::LostSignal);
        lost.hud_text = "NO CARRIER".to_string();
        lost.media_url = String::new();
        let offline = test_camera("cam-04", "Medbay", CameraStatus::Offline);
        let interference = test_camera("cam-05", "Cargo", CameraStatus::Interference);
        let registry = Rc::new(CameraRegistry::new(vec![online, flicker, lost, offline, interference]));

        let sched = ManualScheduler::new();
        let display = Rc::new(RecordingDisplay::default());
        let session = ViewerSession::new(
            registry,
            EffectsConfig::default(),
            sched.clone(),
            seeded(99),
            display.clone(),
        );
        Rig { sched, display, session }
    }

    fn glitches(d: &RecordingDisplay) -> usize {
        d.count(|e| *e == DisplayEvent::Glitch)
    }

    fn noise_frames(d: &RecordingDisplay) -> usize {
        d.count(|e| matches!(e, DisplayEvent::Noise { .. }))
    }

    #[test]
    fn every_camera_gets_one_presentation() {
        let mut r = rig();
        let ids: Vec<String> = r.session.registry().cameras().iter().map(|c| c.id.clone()).collect();
        for id in ids {
            r.display.clear();
            r.session.select_camera(&id).unwrap();
            assert_eq!(r.display.count(|e| matches!(e, DisplayEvent::Present(_))), 1);
            assert!(r.sched.pending_timeouts() <= 1);
            assert!(r.sched.pending_frames() <= 1);
            assert_eq!(r.display.events().last(), Some(&DisplayEvent::Hud(
                r.session.active().map(|c| c.hud_line()).unwrap_or_default()
            )));
        }
    }

    #[test]
    fn select_returns_the_shown_camera() {
        let mut r = rig();
        let cam = r.session.select_camera("cam-05").unwrap();
        assert_eq!(cam.id, "cam-05");
        assert_eq!(cam.status, CameraStatus::Interference);
    }

    #[test]
    fn lost_signal_presents_noise() {
        let mut r = rig();
        r.session.select_camera("cam-03").unwrap();
        assert_eq!(r.session.presentation(), Some(&Presentation::Noise));
        assert!(r.session.noise_running());
        assert!(r.session.glitch_running());
        assert!(r.display.events().contains(&DisplayEvent::Hud("NO CARRIER // CAM-03".into())));
        assert!(r.display.events().contains(&DisplayEvent::Highlight("cam-03".into())));
        r.sched.frame(16.0);
        r.sched.frame(50.0);
        assert_eq!(noise_frames(&r.display), 2);
    }

    #[test]
    fn online_pan_starts_running_and_toggles() {
        let mut r = rig();
        r.session.select_camera("cam-01").unwrap();
        assert!(matches!(r.session.presentation(), Some(Presentation::Media { .. })));
        assert!(!r.session.glitch_running());
        assert!(!r.session.noise_running());
        assert!(!r.session.pan().is_paused());
        assert_eq!(r.session.pan().label(), PAUSE_PAN_LABEL);

        assert_eq!(r.session.toggle_pan(), Some(true));
        assert_eq!(r.session.pan().label(), RESUME_PAN_LABEL);
        let last = r.display.events().last().cloned();
        assert!(matches!(last, Some(DisplayEvent::Pan(Some(p))) if p.paused && p.duration_s == 7.0));

        // reselecting resets to running
        r.session.select_camera("cam-01").unwrap();
        assert!(!r.session.pan().is_paused());
    }

    #[test]
    fn pan_disabled_camera_ignores_toggle() {
        let mut r = rig();
        r.session.select_camera("cam-04").unwrap();
        assert_eq!(r.session.toggle_pan(), None);
        assert!(r.display.events().contains(&DisplayEvent::Pan(None)));
    }

    #[test]
    fn offline_starts_no_effects() {
        let mut r = rig();
        r.session.select_camera("cam-04").unwrap();
        assert!(!r.session.glitch_running());
        assert!(!r.session.noise_running());
        assert_eq!(r.sched.pending_timeouts(), 0);
        assert_eq!(r.sched.pending_frames(), 0);
        r.sched.advance(5_000.0);
        assert_eq!(glitches(&r.display), 0);
    }

    #[test]
    fn degraded_statuses_glitch() {
        let mut r = rig();
        for id in ["cam-02", "cam-05"] {
            r.display.clear();
            r.session.select_camera(id).unwrap();
            assert!(r.session.glitch_running());
            r.sched.advance(5_000.0);
            assert!(glitches(&r.display) >= 4);
        }
        for d in r.sched.requested_delays() {
            assert!((400.0..1200.0).contains(&d));
        }
    }

    #[test]
    fn switching_cancels_previous_effects() {
        let mut r = rig();
        r.session.select_camera("cam-03").unwrap();
        r.sched.frame(16.0);
        let noise_task = r.session.noise.pending().unwrap();
        let glitch_task = r.session.glitch.pending().unwrap();

        r.session.select_camera("cam-04").unwrap();
        let cancelled = r.sched.cancelled();
        assert!(cancelled.contains(&noise_task));
        assert!(cancelled.contains(&glitch_task));
        assert_eq!(r.sched.pending_frames(), 0);
        assert_eq!(r.sched.pending_timeouts(), 0);

        // discard of the old view happens before the new one is presented
        let events = r.display.events();
        let last_discard = events.iter().rposition(|e| *e == DisplayEvent::Discard).unwrap();
        let last_present = events.iter().rposition(|e| matches!(e, DisplayEvent::Present(_))).unwrap();
        assert!(last_discard < last_present);

        r.display.clear();
        r.sched.advance(10_000.0);
        for _ in 0..10 {
            r.sched.frame(50.0);
        }
        assert_eq!(glitches(&r.display), 0);
        assert_eq!(noise_frames(&r.display), 0);
    }

    #[test]
    fn switching_between_degraded_feeds_keeps_one_schedule() {
        let mut r = rig();
        r.session.select_camera("cam-02").unwrap();
        r.session.select_camera("cam-03").unwrap();
        r.session.select_camera("cam-05").unwrap();
        assert_eq!(r.sched.pending_timeouts(), 1);
        assert_eq!(r.sched.pending_frames(), 0);
    }

    #[test]
    fn unknown_id_changes_nothing() {
        let mut r = rig();
        r.session.select_camera("cam-02").unwrap();
        let before = r.display.events().len();
        let pending = r.session.glitch.pending();

        let err = r.session.select_camera("nonexistent").unwrap_err();
        assert!(matches!(err, ViewerError::UnknownCameraId(ref id) if id == "nonexistent"));
        assert_eq!(r.display.events().len(), before);
        assert_eq!(r.session.active().map(|c| c.id.as_str()), Some("cam-02"));
        assert_eq!(r.session.glitch.pending(), pending);
    }

    #[test]
    fn teardown_returns_to_idle() {
        let mut r = rig();
        assert_eq!(r.session.phase(), Phase::Idle);
        assert_eq!(r.session.toggle_pan(), None);
        r.session.select_camera("cam-03").unwrap();
        assert!(matches!(r.session.phase(), Phase::Viewing(c) if c.id == "cam-03"));
        r.session.teardown();
        r.session.teardown();
        assert_eq!(r.session.phase(), Phase::Idle);
        assert_eq!(r.sched.pending_frames(), 0);
        assert_eq!(r.sched.pending_timeouts(), 0);
        assert_eq!(r.display.count(|e| *e == DisplayEvent::Discard), 2);
    }

    #[test]
    fn dropping_session_stops_effects() {
        let r = rig();
        let (sched, mut session) = (r.sched, r.session);
        session.select_camera("cam-03").unwrap();
        drop(session);
        assert_eq!(sched.pending_frames(), 0);
        assert_eq!(sched.pending_timeouts(), 0);
    }
}
