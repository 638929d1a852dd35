//! Actors and plumbing around the update engine.

mod bus;
mod scheduler;
mod shutdown;

pub use bus::{BusClosed, BusSender, CommandExecutor, ConsumerLoop, MessageBus, Renderer};
pub use scheduler::{ClockFace, Scheduler, TICK_PERIOD, WallClock};
pub use shutdown::{ShutdownListener, ShutdownSignal};
