//! Executes parsed desktop commands against the engine and reports the
//! outcome. Successes and failures are both ordinary values here; they
//! differ only in how they are rendered.

use std::str::FromStr;
use std::sync::Arc;

use anyhow::bail;
use tracing::{debug, warn};

use crate::actor::{self, Receiver};
use crate::engine::{DesktopEngine, Destination, MoveKind};

pub type Sender = actor::Sender<Event>;

#[derive(Debug)]
pub enum Event {
    Command(Command),
    Shutdown,
}

/// A single user-level instruction, e.g. `pan left`, `drag 3`, `undo`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Move { kind: MoveKind, to: Destination },
    Undo,
    Redo,
    History,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Command, Self::Err> {
        let mut words = s.split_whitespace();
        let Some(head) = words.next() else {
            bail!("empty command");
        };
        let command = match head {
            "undo" => Command::Undo,
            "redo" => Command::Redo,
            "history" => Command::History,
            _ => {
                let Ok(kind) = MoveKind::from_str(head) else {
                    bail!("unknown command {head:?} (try pan/shove/drag, undo, redo, history)");
                };
                let Some(target) = words.next() else {
                    bail!("{head} needs a target: left, right, or a desktop number");
                };
                let to = match target {
                    "left" => Destination::Left,
                    "right" => Destination::Right,
                    _ => match target.parse::<i64>() {
                        Ok(slot) => Destination::Slot(slot),
                        Err(_) => bail!("bad target {target:?}"),
                    },
                };
                Command::Move { kind, to }
            }
        };
        if words.next().is_some() {
            bail!("trailing input after {head:?}");
        }
        Ok(command)
    }
}

pub struct Dispatch {
    engine: Arc<DesktopEngine>,
    rx: Receiver<Event>,
}

impl Dispatch {
    pub fn new(engine: Arc<DesktopEngine>, rx: Receiver<Event>) -> Dispatch {
        Dispatch { engine, rx }
    }

    pub async fn run(mut self) {
        while let Some(event) = self.rx.recv().await {
            match event {
                Event::Shutdown => break,
                Event::Command(command) => self.handle(command),
            }
        }
        debug!("dispatch stopped");
    }

    fn handle(&self, command: Command) {
        let result = match command {
            Command::Move { kind, to } => self.engine.resolve(kind, to),
            Command::Undo => self.engine.undo(),
            Command::Redo => self.engine.redo(),
            Command::History => {
                self.print_history();
                return;
            }
        };
        match result {
            Ok(report) => println!("ok: {report}"),
            Err(failure) => {
                warn!("{failure}");
                println!("error: {failure}");
            }
        }
    }

    fn print_history(&self) {
        let (entries, cursor) = self.engine.history_snapshot();
        for (i, entry) in entries.iter().enumerate() {
            let marker = if i == cursor { "*" } else { " " };
            println!("{marker} {:>3}: desktop {} (id {})", i, entry.index, entry.id);
        }
    }
}
