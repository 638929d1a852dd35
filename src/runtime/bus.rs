//! Message bus, command executor and the consumer loop.

use derive_more::{Display, Error};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::game::{Command, GameState, Message, UpdateEngine};
use crate::options::OptionsStore;
use crate::runtime::shutdown::ShutdownListener;

/// Returned when posting to a bus whose consumer has gone away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
#[display("Message bus closed")]
pub struct BusClosed;

/// Cloneable producer handle for the bus.
#[derive(Debug, Clone)]
pub struct BusSender {
    tx: mpsc::UnboundedSender<Message>,
}

impl BusSender {
    /// Posts a message without waiting.
    pub fn post(&self, message: Message) -> Result<(), BusClosed> {
        self.tx.send(message).map_err(|_| BusClosed)
    }
}

/// Unbounded FIFO channel carrying [`Message`]s to the consumer loop.
#[derive(Debug)]
pub struct MessageBus {
    tx: mpsc::UnboundedSender<Message>,
    rx: mpsc::UnboundedReceiver<Message>,
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageBus {
    /// Creates an empty bus.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }

    /// Returns a producer handle.
    pub fn sender(&self) -> BusSender {
        BusSender {
            tx: self.tx.clone(),
        }
    }

    /// Receives the next message.
    pub async fn recv(&mut self) -> Option<Message> {
        self.rx.recv().await
    }

    /// Receives a message if one is waiting.
    pub fn try_recv(&mut self) -> Option<Message> {
        self.rx.try_recv().ok()
    }
}

/// Runs commands on tokio tasks and posts their results to the bus.
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    bus: BusSender,
}

impl CommandExecutor {
    /// Creates an executor posting to `bus`.
    pub fn new(bus: BusSender) -> Self {
        Self { bus }
    }

    /// Spawns `command`; any message it yields is posted back.
    pub fn execute(&self, command: Command) -> JoinHandle<()> {
        let bus = self.bus.clone();
        tokio::spawn(async move {
            if let Some(message) = command.run()
                && bus.post(message).is_err()
            {
                debug!("Bus closed before command result was delivered");
            }
        })
    }
}

/// Draws a state snapshot.
pub trait Renderer {
    /// Renders `state`.
    fn render(&mut self, state: &GameState) -> anyhow::Result<()>;
}

/// The single consumer of the bus.
///
/// Owns the engine, the renderer and the optional options store. Each step
/// reduces one message, renders the result, saves options when they
/// changed, and spawns the returned command.
#[derive(Debug)]
pub struct ConsumerLoop<R> {
    engine: UpdateEngine,
    renderer: R,
    store: Option<OptionsStore>,
}

impl<R: Renderer> ConsumerLoop<R> {
    /// Creates a loop that does not persist options.
    pub fn new(engine: UpdateEngine, renderer: R) -> Self {
        Self {
            engine,
            renderer,
            store: None,
        }
    }

    /// Persists changed options to `store`.
    pub fn with_store(mut self, store: OptionsStore) -> Self {
        self.store = Some(store);
        self
    }

    /// The renderer.
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Consumes the loop, returning the renderer.
    pub fn into_renderer(self) -> R {
        self.renderer
    }

    /// Processes messages until shutdown fires or the bus closes.
    ///
    /// Returns the last state.
    #[instrument(skip_all)]
    pub async fn run(
        &mut self,
        bus: MessageBus,
        state: GameState,
        mut shutdown: ShutdownListener,
    ) -> GameState {
        let MessageBus { tx, mut rx } = bus;
        let executor = CommandExecutor::new(BusSender { tx });
        let mut state = state;
        self.render(&state);
        info!("Message loop started");

        loop {
            let message = tokio::select! {
                biased;
                _ = shutdown.wait() => {
                    info!("Shutdown signalled, leaving message loop");
                    break;
                }
                received = rx.recv() => match received {
                    Some(message) => message,
                    None => {
                        info!("Bus closed, leaving message loop");
                        break;
                    }
                },
            };
            state = self.step(&state, message, &executor);
        }
        state
    }

    fn step(
        &mut self,
        state: &GameState,
        message: Message,
        executor: &CommandExecutor,
    ) -> GameState {
        let (next, command) = self.engine.update(state, Some(message));
        self.render(&next);
        if next.options() != state.options() {
            self.persist(&next);
        }
        if let Some(command) = command {
            executor.execute(command);
        }
        next
    }

    fn render(&mut self, state: &GameState) {
        if let Err(e) = self.renderer.render(state) {
            warn!(error = %e, "Failed to render state");
        }
    }

    fn persist(&self, state: &GameState) {
        if let Some(store) = &self.store
            && let Err(e) = store.save(state.options())
        {
            warn!(error = %e, "Failed to save options");
        }
    }
}
