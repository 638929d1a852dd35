//! Deferred side effects returned by the update engine.

use std::fmt;

use crate::game::message::Message;

/// A deferred computation that may yield a follow-up message.
///
/// Commands run off the message loop; whatever they return is posted back
/// to the bus.
pub struct Command(Box<dyn FnOnce() -> Option<Message> + Send + 'static>);

impl Command {
    /// Wraps a closure as a command.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() -> Option<Message> + Send + 'static,
    {
        Self(Box::new(f))
    }

    /// A command that immediately yields `message`.
    pub fn message(message: Message) -> Self {
        Self::new(move || Some(message))
    }

    /// Runs the command.
    pub fn run(self) -> Option<Message> {
        (self.0)()
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Command(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_command_yields_message() {
        let command = Command::message(Message::ShowMainScreen);
        assert_eq!(command.run(), Some(Message::ShowMainScreen));
    }

    #[test]
    fn test_closure_command_may_yield_nothing() {
        let command = Command::new(|| None);
        assert_eq!(command.run(), None);
    }
}
