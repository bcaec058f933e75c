//! Background position sampler.
//!
//! Desktop switches can happen outside the engine entirely (OS shortcuts,
//! task view). Sampling the visible desktop once a second pushes those
//! into history too, so undo covers them. Redundant samples are dropped by
//! the history's identity dedup.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, trace, warn};

use crate::actor::{self, Receiver};
use crate::engine::DesktopEngine;

pub type Sender = actor::Sender<Event>;

#[derive(Debug)]
pub enum Event {
    Shutdown,
}

pub struct Sampler {
    engine: Arc<DesktopEngine>,
    interval: Duration,
    rx: Receiver<Event>,
}

impl Sampler {
    pub fn new(engine: Arc<DesktopEngine>, interval: Duration, rx: Receiver<Event>) -> Sampler {
        Sampler { engine, interval, rx }
    }

    pub async fn run(mut self) {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = ticker.tick() => match self.engine.sample() {
                    Ok(true) => trace!("recorded desktop switched outside the engine"),
                    Ok(false) => {}
                    Err(failure) => warn!("{failure}"),
                },
                event = self.rx.recv() => match event {
                    Some(Event::Shutdown) | None => break,
                },
            }
        }
        debug!("sampler stopped");
    }
}
