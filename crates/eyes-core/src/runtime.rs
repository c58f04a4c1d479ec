//! Single-threaded driver tying the engine together.
//!
//! Events, sensor samples and battery updates mutate state directly; all
//! deferred work (frame ticks, animation steps, the long-press sequence) goes
//! through one [`Scheduler`] that the host drains with [`EyesRuntime::pump`].

use crate::battery::BatteryStatus;
use crate::config::EyesConfig;
use crate::constants::*;
use crate::dispatch::{Dispatcher, Reaction, ToyEvent};
use crate::emotion::{EmotionEngine, EmotionKind};
use crate::error::Result;
use crate::gaze::{GazeController, GazeMode};
use crate::idle::stream_rng;
use crate::raster::{render, DisplaySink, Frame, Scene, SocketGeometry};
use crate::scheduler::{Scheduler, TaskHandle};
use rand::prelude::*;

/// Deferred work items.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Task {
    FrameTick,
    AnimationStep(EmotionKind),
    SecondBlink,
    SwitchMode(GazeMode),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Stopped,
}

pub struct EyesRuntime<D: DisplaySink> {
    config: EyesConfig,
    emotion: EmotionEngine,
    gaze: GazeController,
    dispatcher: Dispatcher,
    scheduler: Scheduler<Task>,
    steps: [Option<TaskHandle>; 5],
    rng: StdRng,
    sink: D,
    frame: Frame,
    frames_submitted: u64,
    state: RunState,
}

impl<D: DisplaySink> EyesRuntime<D> {
    pub fn new(config: EyesConfig, sink: D, now_ms: u64) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            emotion: EmotionEngine::new(),
            gaze: GazeController::new(&config, now_ms),
            dispatcher: Dispatcher::new(config.long_press_ms),
            scheduler: Scheduler::new(),
            steps: [None; 5],
            rng: stream_rng(config.seed, 3),
            sink,
            frame: Frame::new(),
            frames_submitted: 0,
            state: RunState::Idle,
            config,
        })
    }

    pub fn config(&self) -> &EyesConfig {
        &self.config
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn emotion(&self) -> &EmotionEngine {
        &self.emotion
    }

    pub fn gaze(&self) -> &GazeController {
        &self.gaze
    }

    pub fn mode(&self) -> GazeMode {
        self.gaze.mode()
    }

    pub fn sink(&self) -> &D {
        &self.sink
    }

    pub fn into_sink(self) -> D {
        self.sink
    }

    pub fn pending_tasks(&self) -> usize {
        self.scheduler.len()
    }

    pub fn next_due(&self) -> Option<u64> {
        self.scheduler.next_due()
    }

    /// Last frame handed to the sink.
    pub fn last_frame(&self) -> &Frame {
        &self.frame
    }

    pub fn frames_submitted(&self) -> u64 {
        self.frames_submitted
    }

    /// Begin the fixed-rate frame tick. The first frame is due immediately.
    pub fn start(&mut self, now_ms: u64) {
        if self.state != RunState::Idle {
            return;
        }
        log::info!(
            "[runtime] start at {now_ms}ms, mode {:?}, seed {}",
            self.gaze.mode(),
            self.config.seed
        );
        self.state = RunState::Running;
        self.scheduler.schedule_at(now_ms, Task::FrameTick);
    }

    pub fn handle_event(&mut self, event: ToyEvent, now_ms: u64) {
        if self.state == RunState::Stopped {
            return;
        }
        let Some(reaction) = self.dispatcher.dispatch(event, now_ms) else {
            return;
        };
        match reaction {
            Reaction::Trigger(kind) => self.trigger(kind, now_ms),
            Reaction::LongPress => {
                self.trigger(EmotionKind::Blink, now_ms);
                self.scheduler.schedule_at(
                    now_ms + self.config.second_blink_delay_ms,
                    Task::SecondBlink,
                );
                let target = self.gaze.mode().toggled();
                self.scheduler.schedule_at(
                    now_ms + self.config.mode_switch_delay_ms,
                    Task::SwitchMode(target),
                );
            }
            Reaction::AlwaysOn => {
                self.gaze.on_always_on_tick(now_ms);
                let roll = self.rng.gen_range(0..=100);
                if roll < ALWAYS_ON_SLEEPY_ROLL {
                    self.trigger(EmotionKind::Sleepy, now_ms);
                } else if roll < ALWAYS_ON_ANGRY_ROLL {
                    self.trigger(EmotionKind::Angry, now_ms);
                }
            }
        }
    }

    /// Dispatch a raw host tag. Unknown tags are dropped.
    pub fn handle_tag(&mut self, tag: &str, now_ms: u64) -> bool {
        match ToyEvent::from_tag(tag) {
            Some(event) => {
                self.handle_event(event, now_ms);
                true
            }
            None => {
                log::debug!("[dispatch] unknown tag '{tag}', dropped");
                false
            }
        }
    }

    pub fn on_tilt(&mut self, ax: f32, ay: f32) -> bool {
        if self.state == RunState::Stopped {
            return false;
        }
        self.gaze.on_tilt(ax, ay)
    }

    /// Apply a battery broadcast. Returns whether the tier changed.
    pub fn on_battery(&mut self, status: BatteryStatus, now_ms: u64) -> bool {
        if self.state == RunState::Stopped {
            return false;
        }
        let Some(tier) = status.tier() else {
            log::debug!("[battery] dropped status {status:?}");
            return false;
        };
        let changed = self.emotion.set_battery_tier(tier, now_ms);
        if changed {
            self.sync_steps(now_ms);
        }
        changed
    }

    /// Start an emotion channel and its step chain.
    pub fn trigger(&mut self, kind: EmotionKind, now_ms: u64) {
        if self.state == RunState::Stopped {
            return;
        }
        if self.emotion.trigger(kind, now_ms) {
            self.schedule_step(kind, now_ms);
        }
    }

    /// Run every task due at or before `now_ms`. Returns how many ran.
    ///
    /// Frame ticks missed during a stall collapse into one frame rendered at
    /// `now_ms`; the next tick lands on the first slot after `now_ms`.
    pub fn pump(&mut self, now_ms: u64) -> usize {
        if self.state != RunState::Running {
            return 0;
        }
        let mut ran = 0;
        let mut frame_slot = None;
        while let Some((at, task)) = self.scheduler.pop_next(now_ms) {
            match task {
                Task::FrameTick => {
                    frame_slot.get_or_insert(at);
                }
                task => {
                    self.run(task, at);
                    ran += 1;
                }
            }
        }
        if let Some(at) = frame_slot {
            self.tick_frame(at, now_ms);
            ran += 1;
        }
        ran
    }

    /// Compose and rasterize the scene for `now_ms` without submitting it.
    pub fn render(&mut self, now_ms: u64) -> Frame {
        let emotion = self.emotion.compose();
        let socket = SocketGeometry::scaled(emotion.scale);
        let pupils = self.gaze.pupil_centers(now_ms, &socket);
        render(&Scene {
            socket,
            pupils,
            emotion,
        })
    }

    /// Cancel all pending work and release the display. Idempotent.
    pub fn shutdown(&mut self) {
        if self.state == RunState::Stopped {
            return;
        }
        let dropped = self.scheduler.cancel_all();
        self.steps = [None; 5];
        self.state = RunState::Stopped;
        if let Err(e) = self.sink.release() {
            log::warn!("[runtime] display release failed: {e}");
        }
        log::info!("[runtime] shut down, {dropped} pending tasks cancelled");
    }

    fn run(&mut self, task: Task, at: u64) {
        match task {
            // coalesced in pump
            Task::FrameTick => {}
            Task::AnimationStep(kind) => {
                self.steps[kind.index()] = None;
                if self.emotion.step(kind, at) {
                    self.schedule_step(kind, at + self.config.step_interval_ms);
                }
            }
            Task::SecondBlink => self.trigger(EmotionKind::Blink, at),
            Task::SwitchMode(mode) => self.gaze.set_mode(mode, at),
        }
    }

    fn tick_frame(&mut self, due_ms: u64, now_ms: u64) {
        self.frame = self.render(now_ms);
        match self.sink.submit(&self.frame) {
            Ok(()) => self.frames_submitted += 1,
            Err(e) => log::warn!("[runtime] frame submit failed: {e}"),
        }
        let interval = self.config.frame_interval_ms;
        let missed = now_ms.saturating_sub(due_ms) / interval;
        if missed > 0 {
            log::debug!("[runtime] skipped {missed} late frame ticks");
        }
        self.scheduler
            .schedule_at(due_ms + (missed + 1) * interval, Task::FrameTick);
    }

    fn schedule_step(&mut self, kind: EmotionKind, due_ms: u64) {
        let handle = self.scheduler.schedule_at(due_ms, Task::AnimationStep(kind));
        if let Some(old) = self.steps[kind.index()].replace(handle) {
            self.scheduler.cancel(old);
        }
    }

    /// Give every active channel without a pending step one.
    fn sync_steps(&mut self, now_ms: u64) {
        for kind in EmotionKind::ALL {
            let pending = self.steps[kind.index()]
                .map(|h| self.scheduler.is_pending(h))
                .unwrap_or(false);
            if self.emotion.is_active(kind) && !pending {
                self.schedule_step(kind, now_ms);
            }
        }
    }
}
