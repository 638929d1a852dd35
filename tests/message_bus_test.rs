//! Consumer loop wiring: reduce, render, persist, run commands.

use std::sync::Arc;
use std::time::Duration;

use strictly_clock::{
    AsyncLogger, Command, CommandExecutor, ConsumerLoop, GameState, GameStatus, LogEntry, Message,
    MessageBus, Modal, Options, OptionsStore, Renderer, Screen, ShutdownSignal, TrailError,
    TrailSink, UpdateEngine,
};
use tokio::sync::mpsc;
use tokio::time::timeout;

struct NullSink;

impl TrailSink for NullSink {
    fn write(&mut self, _entry: &LogEntry) -> Result<(), TrailError> {
        Ok(())
    }
}

/// Forwards every rendered state to the test.
struct ChannelRenderer {
    tx: mpsc::UnboundedSender<GameState>,
}

impl Renderer for ChannelRenderer {
    fn render(&mut self, state: &GameState) -> anyhow::Result<()> {
        self.tx.send(state.clone())?;
        Ok(())
    }
}

fn engine() -> UpdateEngine {
    UpdateEngine::new(Arc::new(AsyncLogger::new(NullSink)))
}

async fn next_render(rx: &mut mpsc::UnboundedReceiver<GameState>) -> GameState {
    timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("render within timeout")
        .expect("renderer channel open")
}

#[tokio::test]
async fn test_bus_delivers_in_fifo_order() {
    let mut bus = MessageBus::new();
    let sender = bus.sender();
    sender.post(Message::StartGame).expect("post");
    sender.post(Message::Tick).expect("post");
    sender.post(Message::SwitchTurns).expect("post");

    assert_eq!(bus.recv().await, Some(Message::StartGame));
    assert_eq!(bus.recv().await, Some(Message::Tick));
    assert_eq!(bus.try_recv(), Some(Message::SwitchTurns));
    assert_eq!(bus.try_recv(), None);
}

#[tokio::test]
async fn test_post_after_bus_dropped_fails() {
    let bus = MessageBus::new();
    let sender = bus.sender();
    drop(bus);
    assert!(sender.post(Message::Tick).is_err());
}

#[tokio::test]
async fn test_executor_posts_command_result() {
    let mut bus = MessageBus::new();
    let executor = CommandExecutor::new(bus.sender());
    executor
        .execute(Command::message(Message::RestoreMainUi))
        .await
        .expect("command task");
    executor
        .execute(Command::new(|| None))
        .await
        .expect("command task");

    assert_eq!(bus.try_recv(), Some(Message::RestoreMainUi));
    assert_eq!(bus.try_recv(), None);
}

#[tokio::test]
async fn test_loop_renders_each_step_and_stops_on_shutdown() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let bus = MessageBus::new();
    let sender = bus.sender();
    let shutdown = ShutdownSignal::new();
    let listener = shutdown.listener();
    let state = GameState::new(Options::default());

    let mut consumer = ConsumerLoop::new(engine(), ChannelRenderer { tx });
    let task = tokio::spawn(async move { consumer.run(bus, state, listener).await });

    let initial = next_render(&mut rx).await;
    assert_eq!(*initial.status(), GameStatus::NotStarted);

    sender.post(Message::StartGame).expect("post");
    sender.post(Message::Tick).expect("post");
    let started = next_render(&mut rx).await;
    assert_eq!(*started.status(), GameStatus::InProgress);
    let ticked = next_render(&mut rx).await;
    assert_eq!(*ticked.total_game_time(), Duration::from_secs(1));

    assert!(shutdown.trigger());
    let last = timeout(Duration::from_secs(5), task)
        .await
        .expect("loop exits after shutdown")
        .expect("loop task");
    assert_eq!(last, ticked);
}

#[tokio::test]
async fn test_command_results_flow_back_through_the_bus() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let bus = MessageBus::new();
    let sender = bus.sender();
    let shutdown = ShutdownSignal::new();
    let listener = shutdown.listener();
    let state = GameState::new(Options::default());

    let mut consumer = ConsumerLoop::new(engine(), ChannelRenderer { tx });
    let task = tokio::spawn(async move { consumer.run(bus, state, listener).await });
    next_render(&mut rx).await;

    sender.post(Message::StartGame).expect("post");
    sender.post(Message::ShowEndGameConfirm).expect("post");
    next_render(&mut rx).await;
    next_render(&mut rx).await;

    // ShowEndGameConfirm -> ShowModal arrives from the command task.
    let with_modal = next_render(&mut rx).await;
    assert_eq!(*with_modal.modal(), Some(Modal::EndGameConfirm));

    sender
        .post(Message::EndGameConfirm { confirmed: true })
        .expect("post");
    let reset = next_render(&mut rx).await;
    assert!(!reset.game_started());
    let main = next_render(&mut rx).await;
    assert_eq!(*main.screen(), Screen::Main);
    let restored = next_render(&mut rx).await;
    assert_eq!(*restored.modal(), None);

    shutdown.trigger();
    task.await.expect("loop task");
}

#[tokio::test]
async fn test_changed_options_are_saved() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("options.json");
    let store = OptionsStore::new(&path).with_default_path(&path);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let bus = MessageBus::new();
    let sender = bus.sender();
    let shutdown = ShutdownSignal::new();
    let listener = shutdown.listener();
    let state = GameState::new(Options::default());

    let mut consumer =
        ConsumerLoop::new(engine(), ChannelRenderer { tx }).with_store(store.clone());
    let task = tokio::spawn(async move { consumer.run(bus, state, listener).await });
    next_render(&mut rx).await;

    sender.post(Message::Tick).expect("post");
    next_render(&mut rx).await;
    assert!(!path.exists());

    sender
        .post(Message::SetPlayerCount { count: 5 })
        .expect("post");
    next_render(&mut rx).await;
    shutdown.trigger();
    task.await.expect("loop task");

    assert!(path.exists());
    assert_eq!(*store.load().player_count(), 5);
}
