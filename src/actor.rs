//! Long-running tasks and the channel plumbing between them.

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

pub mod dispatch;
pub mod sampler;

pub type Sender<Event> = UnboundedSender<Event>;
pub type Receiver<Event> = UnboundedReceiver<Event>;

pub fn channel<Event>() -> (Sender<Event>, Receiver<Event>) {
    unbounded_channel()
}
