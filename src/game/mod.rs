//! Game state and the update engine that advances it.

mod command;
mod message;
mod types;
mod update;

pub use command::Command;
pub use message::Message;
pub use types::{
    GameState, GameStatus, LOG_DATE_TIME_FORMAT, LogEntry, Modal, OptionField, Player, Screen,
};
pub use update::{MAX_NAME_CHARS, MAX_PLAYERS, UpdateEngine};
