use crate::config::{self, Config, ConfigError};
use crate::events::AppEvent;
use crate::sys::frames::FrameClock;
use async_channel::{Receiver, Sender};
use spindle::protocol::{Reply, Request};
use spindle::{SegmentModel, SpinEngine, TickOutcome, Wheel, WheelError};

/// Sole owner of the wheel. Commands and frames are applied one at a time.
pub struct App {
    wheel: Wheel,
    waiters: Vec<Sender<Reply>>,
    pending_config: Option<Config>,
}

impl App {
    pub fn new(wheel: Wheel) -> Self {
        Self {
            wheel,
            waiters: Vec::new(),
            pending_config: None,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let engine = SpinEngine::new().with_timing(config.spin)?;
        let mut wheel = Wheel::with_engine(SegmentModel::from_labels(&config.entries), engine);
        wheel.set_palette(config.palette());
        log::info!("Loaded wheel: {}", wheel.stats());
        Ok(Self::new(wheel))
    }

    pub fn wheel(&self) -> &Wheel {
        &self.wheel
    }

    pub async fn run(mut self, rx: Receiver<AppEvent>, mut frames: FrameClock) {
        loop {
            let was_spinning = self.wheel.is_spinning();
            tokio::select! {
                event = rx.recv() => match event {
                    Ok(event) => self.update(event),
                    Err(_) => break,
                },
                timestamp = frames.next(), if was_spinning => self.on_frame(timestamp),
            }
            if !was_spinning && self.wheel.is_spinning() {
                frames.restart();
            }
        }
    }

    pub fn update(&mut self, event: AppEvent) {
        match event {
            AppEvent::Command { request, reply } => match self.handle(request) {
                Some(answer) => send_reply(&reply, answer),
                None => self.waiters.push(reply),
            },
            AppEvent::ConfigReload => match config::load_config() {
                Ok(new_config) if self.wheel.is_spinning() => {
                    log::info!("Configuration changed, applying once the wheel settles");
                    self.pending_config = Some(new_config);
                }
                Ok(new_config) => self.apply_config(new_config),
                Err(e) => log::error!("Failed to reload config: {}", e),
            },
        }
    }

    /// Answers a request, or returns `None` when the answer has to wait for
    /// the spin to settle.
    pub fn handle(&mut self, request: Request) -> Option<Reply> {
        let reply = match request {
            Request::Spin { wait } => match self.wheel.spin() {
                Ok(()) if wait => return None,
                Ok(()) => Reply::done("Spinning"),
                Err(e) => Reply::error(e),
            },
            Request::Cancel if self.wheel.cancel() => {
                self.release_waiters(Reply::error("spin was cancelled"));
                self.apply_pending_config();
                Reply::done("Cancelled")
            }
            Request::Cancel => Reply::done("Not spinning"),
            Request::Add(label) => match self.wheel.add_entry(&label) {
                Ok(index) => Reply::done(format!("Added '{}' at {}", label.trim(), index)),
                Err(e) => Reply::error(e),
            },
            Request::Remove(index) => match self.wheel.remove_entry(index) {
                Ok(label) => Reply::done(format!("Removed '{}'", label)),
                Err(e) => Reply::error(e),
            },
            Request::List => Reply::Entries {
                entries: self.wheel.entries().to_vec(),
                stats: self.wheel.stats().to_string(),
            },
            Request::Status => Reply::Status {
                phase: self.wheel.phase(),
                angle: self.wheel.base_angle(),
                winner: self.wheel.last_winner().cloned(),
            },
        };
        Some(reply)
    }

    pub fn on_frame(&mut self, timestamp_ms: f64) {
        match self.wheel.tick(timestamp_ms) {
            TickOutcome::Settled { winning_index } => self.settle(winning_index),
            TickOutcome::Spinning { base_angle } => {
                log::trace!("Frame at {:.1} ms, angle {:.4}", timestamp_ms, base_angle)
            }
            TickOutcome::Idle => {}
        }
    }

    fn settle(&mut self, winning_index: usize) {
        let reply = match self.wheel.last_winner() {
            Some(label) => Reply::Winner {
                index: winning_index,
                label: label.clone(),
            },
            None => Reply::error(WheelError::IndexOutOfRange {
                index: winning_index,
                len: self.wheel.entries().len(),
            }),
        };
        self.release_waiters(reply);
        self.apply_pending_config();
    }

    /// Applies a reload that arrived mid-spin, once the wheel is at rest.
    fn apply_pending_config(&mut self) {
        if let Some(config) = self.pending_config.take() {
            self.apply_config(config);
        }
    }

    fn release_waiters(&mut self, reply: Reply) {
        for waiter in self.waiters.drain(..) {
            send_reply(&waiter, reply.clone());
        }
    }

    fn apply_config(&mut self, config: Config) {
        if let Err(e) = self.wheel.set_timing(config.spin) {
            log::error!("Ignoring reloaded config: {}", e);
            return;
        }
        self.wheel.set_palette(config.palette());
        match self.wheel.replace_entries(&config.entries) {
            Ok(()) => log::info!("Configuration reloaded: {}", self.wheel.stats()),
            Err(e) => log::error!("Failed to apply config: {}", e),
        }
    }
}

fn send_reply(reply: &Sender<Reply>, answer: Reply) {
    if reply.try_send(answer).is_err() {
        log::debug!("Client went away before its reply was ready");
    }
}
