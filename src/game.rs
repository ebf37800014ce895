use crate::config::LoopConfig;
use crate::engine::{
    FrameCallback, FrameClock, FrameHandle, FrameScheduler, InputState, Point, Rect, Size,
    Surface, TextAlign, TextStyle,
};
use crate::logging::EventLog;
use crate::system::{GameSystem, SystemFault, SystemRegistry};
use anyhow::Result;
use serde::Serialize;
use serde_json::json;
use std::cell::RefCell;
use std::mem;
use std::rc::{Rc, Weak};

/// TABLE
/// ┌───────────────────────── Frame Callback Flow ───────────────────────────┐
/// │                                                                         │
/// │   host frame ──► running? ──no──► return, chain ends for good           │
/// │                     │                                                   │
/// │                    yes                                                  │
/// │                     ▼                                                   │
/// │                  paused? ──yes──► re-arm                                │
/// │                     │                                                   │
/// │                     no                                                  │
/// │                     ▼                                                   │
/// │                  update ──► still running? ──no──► tear down systems    │
/// │                                  │                                      │
/// │                                 yes                                     │
/// │                                  ▼                                      │
/// │                               render ──► re-arm                         │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RunState {
    pub running: bool,
    pub paused: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum FrameOutcome {
    Stopped,
    Skipped,
    Executed,
}

// ELI5: web assembly is a single threaded environment, so Rc RefCell > Mutex
// - the public handle and the in-flight frame closure share the core
// - the closure only holds a Weak, dropping the manager ends the chain
// - systems and the event log never run while the core is borrowed, they
//   are free to call back into the manager
type SharedCore = Rc<RefCell<LoopCore>>;

struct LoopCore {
    // None while a frame has it checked out
    surface: Option<Box<dyn Surface>>,
    // size requested while the surface was checked out
    resize_request: Option<Size>,
    last_size: Size,
    state: RunState,
    pending: Option<FrameHandle>,
    clock: FrameClock,
    systems: SystemRegistry,
    input: InputState,
    config: Rc<LoopConfig>,
    events: Rc<dyn EventLog>,
}

enum FrameStep {
    Stop,
    Skip,
    Run(FrameWork),
}

impl LoopCore {
    /// Decides what this frame does and checks out everything user code
    /// touches
    fn begin_frame(&mut self, timestamp: f64) -> FrameStep {
        // whatever was pending is the call we're in now
        self.pending = None;

        if !self.state.running {
            return FrameStep::Stop;
        }
        if self.state.paused {
            // rebase so the first frame after resume doesn't see the pause
            self.clock.reset();
            return FrameStep::Skip;
        }
        let Some(surface) = self.surface.take() else {
            // re-entered from inside a frame, the outer frame re-arms
            return FrameStep::Stop;
        };

        let time = self.clock.tick(timestamp);
        let input = self.input.clone();
        self.input.end_frame();
        self.last_size = surface.size();

        FrameStep::Run(FrameWork {
            delta_ms: time.delta_ms,
            input,
            surface,
            systems: mem::take(&mut self.systems),
            config: self.config.clone(),
            events: self.events.clone(),
        })
    }

    /// Checks the work back in. Systems registered mid-frame are merged,
    /// a loop destroyed mid-frame hands its systems back for teardown.
    fn finish_frame(&mut self, work: FrameWork) -> (FrameOutcome, Option<SystemRegistry>) {
        let mut surface = work.surface;
        if let Some(size) = self.resize_request.take() {
            surface.set_size(size);
        }
        self.last_size = surface.size();
        self.surface = Some(surface);

        let registered = mem::replace(&mut self.systems, work.systems);
        self.systems.absorb(registered);

        if self.state.running {
            (FrameOutcome::Executed, None)
        } else {
            (FrameOutcome::Stopped, Some(mem::take(&mut self.systems)))
        }
    }
}

/// Everything a running frame needs, held outside the core
struct FrameWork {
    delta_ms: f64,
    input: InputState,
    surface: Box<dyn Surface>,
    systems: SystemRegistry,
    config: Rc<LoopConfig>,
    events: Rc<dyn EventLog>,
}

impl FrameWork {
    fn update(&mut self) {
        let faults = self.systems.update_all(self.delta_ms, &self.input);
        self.report(faults, "update");
    }

    fn render(&mut self) {
        let size = self.surface.size();
        let full = Rect::from_size(size);
        self.surface.clear(&full);
        self.surface.fill_rect(&full, &self.config.clear_color);

        if let Err(err) = self.render_banner(size) {
            self.events
                .log("draw_failed", &json!({ "error": format!("{:#}", err) }));
        }

        let faults = self.systems.render_all(self.surface.as_mut());
        self.report(faults, "render");
    }

    /// Placeholder title + hint, centred
    fn render_banner(&mut self, size: Size) -> Result<()> {
        let center = size.center();
        let title = TextStyle {
            font: self.config.title_font.clone(),
            color: self.config.title_color.clone(),
            align: TextAlign::Center,
        };
        let subtitle = TextStyle {
            font: self.config.subtitle_font.clone(),
            color: self.config.subtitle_color.clone(),
            align: TextAlign::Center,
        };
        self.surface.fill_text(&self.config.title, center, &title)?;
        let below = Point {
            x: center.x,
            y: center.y + self.config.subtitle_offset,
        };
        self.surface.fill_text(&self.config.subtitle, below, &subtitle)
    }

    fn report(&self, faults: Vec<SystemFault>, phase: &str) {
        for fault in faults {
            self.events.log(
                "system_failed",
                &json!({
                    "system": fault.system,
                    "phase": phase,
                    "error": format!("{:#}", fault.error),
                }),
            );
        }
    }
}

/// Owns a surface and drives `update -> render` once per host frame.
///
/// The loop starts at construction and stops for good at [`destroy`].
/// Every operation is total, faults inside a frame are reported to the
/// event log and the chain keeps going. Systems may call any method of
/// the manager from `update` or `render`.
///
/// [`destroy`]: LoopManager::destroy
pub struct LoopManager {
    core: SharedCore,
    scheduler: Rc<dyn FrameScheduler>,
}

impl LoopManager {
    pub fn new(
        mut surface: Box<dyn Surface>,
        scheduler: Rc<dyn FrameScheduler>,
        events: Rc<dyn EventLog>,
        config: LoopConfig,
    ) -> Self {
        if let Err(err) = surface.configure() {
            events.log(
                "surface_setup_failed",
                &json!({ "error": format!("{:#}", err) }),
            );
        }

        let core = Rc::new(RefCell::new(LoopCore {
            last_size: surface.size(),
            surface: Some(surface),
            resize_request: None,
            state: RunState {
                running: true,
                paused: false,
            },
            pending: None,
            clock: FrameClock::new(config.max_frame_delta_ms),
            systems: SystemRegistry::new(),
            input: InputState::default(),
            config: Rc::new(config),
            events,
        }));

        let manager = LoopManager { core, scheduler };
        arm(&manager.core, &manager.scheduler);
        log::debug!("loop manager started");
        manager
    }

    fn events(&self) -> Rc<dyn EventLog> {
        self.core.borrow().events.clone()
    }

    pub fn handle_pointer_down(&self, x: f64, y: f64) {
        self.handle_pointer_down_with_button(x, y, 0);
    }

    pub fn handle_pointer_down_with_button(&self, x: f64, y: f64, button: i16) {
        self.core.borrow_mut().input.pointer_down(x, y, button);
        self.events()
            .log("pointer_down", &json!({ "x": x, "y": y }));
    }

    pub fn handle_pointer_up(&self, x: f64, y: f64) {
        self.core.borrow_mut().input.pointer_up(x, y);
    }

    pub fn handle_pointer_move(&self, x: f64, y: f64) {
        self.core.borrow_mut().input.pointer_move(x, y);
    }

    pub fn handle_key_down(&self, key: &str) {
        let pauses = {
            let mut core = self.core.borrow_mut();
            core.input.key_down(key);
            core.config.is_pause_key(key)
        };
        self.events().log("key_down", &json!({ "key": key }));
        if pauses {
            self.toggle_pause();
        }
    }

    pub fn handle_key_up(&self, key: &str) {
        self.core.borrow_mut().input.key_up(key);
    }

    pub fn toggle_pause(&self) {
        let paused = {
            let mut core = self.core.borrow_mut();
            // independent of `running`, a destroyed loop still flips
            core.state.paused = !core.state.paused;
            core.state.paused
        };
        let event = if paused { "paused" } else { "resumed" };
        self.events().log(event, &json!({ "paused": paused }));
    }

    /// New pixel dimensions, the next frame redraws from scratch
    pub fn resize(&self, width: u32, height: u32) {
        let size = Size::new(width, height);
        {
            let mut core = self.core.borrow_mut();
            match core.surface.as_mut() {
                Some(surface) => surface.set_size(size),
                None => core.resize_request = Some(size),
            }
        }
        log::debug!("surface resized to {}x{}", width, height);
    }

    /// Stops the loop for good and cancels the pending frame. Safe to call
    /// more than once, and from inside a system.
    pub fn destroy(&self) {
        let (pending, retired) = {
            let mut core = self.core.borrow_mut();
            let retired = if core.state.running {
                core.state.running = false;
                Some(mem::take(&mut core.systems))
            } else {
                None
            };
            (core.pending.take(), retired)
        };

        if let Some(mut systems) = retired {
            // systems checked out by a running frame are torn down when it ends
            systems.destroy_all();
            log::debug!("loop manager destroyed");
        }

        if let Some(handle) = pending {
            if let Err(err) = self.scheduler.cancel_frame(handle) {
                self.events().log(
                    "frame_cancel_failed",
                    &json!({ "error": format!("{:#}", err) }),
                );
            }
        }
    }

    pub fn get_state(&self) -> RunState {
        self.core.borrow().state
    }

    /// Adds a system to the per-frame update/render pass. Registered from
    /// inside a frame, it joins from the next frame on.
    pub fn register_system(&self, mut system: Box<dyn GameSystem>) -> Result<()> {
        system.init()?;
        self.core.borrow_mut().systems.insert(system);
        Ok(())
    }

    /// Snapshot of the input recorded since the last executed frame
    pub fn input(&self) -> InputState {
        self.core.borrow().input.clone()
    }

    pub fn surface_size(&self) -> Size {
        let core = self.core.borrow();
        core.resize_request
            .or_else(|| core.surface.as_ref().map(|surface| surface.size()))
            .unwrap_or(core.last_size)
    }

    /// Frames that ran update + render so far
    pub fn frames_executed(&self) -> u64 {
        self.core.borrow().clock.frame_index()
    }
}

/// Requests the next frame and remembers its handle for `destroy`
fn arm(core: &SharedCore, scheduler: &Rc<dyn FrameScheduler>) {
    let weak_core: Weak<RefCell<LoopCore>> = Rc::downgrade(core);
    let weak_scheduler: Weak<dyn FrameScheduler> = Rc::downgrade(scheduler);
    let callback: FrameCallback = Box::new(move |timestamp: f64| {
        if let (Some(core), Some(scheduler)) = (weak_core.upgrade(), weak_scheduler.upgrade()) {
            on_frame(&core, &scheduler, timestamp);
        }
    });

    match scheduler.request_frame(callback) {
        Ok(handle) => core.borrow_mut().pending = Some(handle),
        Err(err) => {
            let events = core.borrow().events.clone();
            events.log(
                "frame_request_failed",
                &json!({ "error": format!("{:#}", err) }),
            );
        }
    }
}

fn on_frame(core: &SharedCore, scheduler: &Rc<dyn FrameScheduler>, timestamp: f64) {
    // every borrow here is short, user code runs between them
    let step = core.borrow_mut().begin_frame(timestamp);
    let outcome = match step {
        FrameStep::Stop => FrameOutcome::Stopped,
        FrameStep::Skip => FrameOutcome::Skipped,
        FrameStep::Run(mut work) => {
            work.update();
            if core.borrow().state.running {
                work.render();
            }
            let (outcome, retired) = core.borrow_mut().finish_frame(work);
            if let Some(mut systems) = retired {
                systems.destroy_all();
                log::debug!("loop manager destroyed mid-frame");
            }
            outcome
        }
    };
    match outcome {
        FrameOutcome::Stopped => {}
        FrameOutcome::Skipped | FrameOutcome::Executed => arm(core, scheduler),
    }
}
