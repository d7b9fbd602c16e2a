use super::*;
use bzr_core::*;
use bzr_feedback::Feedback;
use bzr_feedback::Pixels;
use bzr_feedback::Rgb;
use bzr_feedback::Sequencer;
use bzr_feedback::SharedPixels;
use bzr_feedback::Target;
use bzr_protocol::Buzz;
use bzr_protocol::Command;
use bzr_protocol::Message;
use bzr_protocol::Protocol;
use bzr_protocol::ProtocolError;
use bzr_protocol::Selection;
use bzr_radio::Frame;
use bzr_radio::Radio;
use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;
use tokio::time::Instant;

/// Operator end of the coordinator's console.
/// Lines pushed into `commands` are parsed as enable/disable commands;
/// every honored press arrives on `buzzes` as one `{"buzzer":n}` line.
#[derive(Debug)]
pub struct Console {
    pub commands: UnboundedSender<String>,
    pub buzzes: UnboundedReceiver<String>,
}

/// Handles shared by every coordinator loop.
#[derive(Clone)]
pub(crate) struct Context {
    pub(crate) radio: Arc<dyn Radio>,
    pub(crate) directory: Arc<Mutex<Directory>>,
    pub(crate) feedback: Feedback,
    pub(crate) console: UnboundedSender<String>,
    pub(crate) epoch: Epoch,
    pub(crate) config: CoordinatorConfig,
}

impl Context {
    pub(crate) async fn send(&self, to: Address, message: &Message) {
        let payload = match Protocol::encode(message) {
            Ok(payload) => payload,
            Err(e) => return log::error!("[coordinator] {}", e),
        };
        match self.radio.send(to, &payload).await {
            Ok(()) => log::debug!("[coordinator] sent {} to {}", message, to),
            Err(e) => log::warn!("[coordinator] send {} to {} failed: {}", message, to, e),
        }
    }

    async fn handle(&self, frame: Frame) {
        let message = match Protocol::decode(&frame.payload) {
            Ok(message) => message,
            Err(ProtocolError::UnknownAction(action)) => {
                return log::debug!("[coordinator] unknown action {} from {}", action, frame.from);
            }
            Err(e) => return log::warn!("[coordinator] dropping frame from {}: {}", frame.from, e),
        };
        log::debug!("[coordinator] received {} from {}", message, frame.from);
        match message {
            Message::RequestRegistration { name } => self.register(frame.from, &name).await,
            Message::Pong => self.pong(frame.from).await,
            Message::Pressed => self.pressed(frame.from).await,
            other => log::debug!("[coordinator] ignoring {} from {}", other, frame.from),
        }
    }

    async fn register(&self, address: Address, name: &str) {
        let player = self
            .directory
            .lock()
            .await
            .register(address, name, Instant::now())
            .clone();
        self.radio.ensure_peer(address);
        self.send(address, &Message::RegistrationAck).await;
        if !player.is_enabled() {
            self.send(address, &Message::Disable).await;
        }
        let ref target = Target::Player(player.index());
        let color = player.color().rgb();
        self.feedback.paint(*target, color);
        self.feedback.blink(*target, color, 1);
        log::info!("[coordinator] {} joined", player);
    }

    async fn pong(&self, address: Address) {
        if !self.directory.lock().await.heartbeat(address, Instant::now()) {
            log::warn!("[coordinator] pong from unregistered {}", address);
        }
    }

    async fn pressed(&self, address: Address) {
        let (player, changed) = {
            let mut directory = self.directory.lock().await;
            let Some(player) = directory.lookup(address).cloned() else {
                return log::warn!("[coordinator] press from unregistered {}", address);
            };
            if !player.is_enabled() {
                return log::debug!("[coordinator] press from disabled {}", player);
            }
            if !directory.press(address, Instant::now()) {
                return log::debug!("[coordinator] duplicate press from {}", player);
            }
            let others = directory.others(player.index());
            (player, directory.disable(&others))
        };
        log::info!("[coordinator] {} pressed first", player);
        self.emit(Buzz::new(player.index()));
        for other in changed.iter() {
            self.send(other.address(), &Message::Disable).await;
        }
        self.feedback.blink(Target::Buzz, player.color().rgb(), 1);
    }

    async fn command(&self, line: &str) {
        let command = match Command::parse(line) {
            Ok(command) => command,
            Err(e) => return log::warn!("[console] ignoring {:?}: {}", line.trim(), e),
        };
        if let Some(ref selection) = command.enable {
            self.apply(selection, true).await;
        }
        if let Some(ref selection) = command.disable {
            self.apply(selection, false).await;
        }
    }

    /// Flips the selected players and tells exactly the ones that changed.
    pub(crate) async fn apply(&self, selection: &Selection, enabled: bool) -> Vec<Player> {
        let changed = match enabled {
            true => self.directory.lock().await.enable(selection),
            false => self.directory.lock().await.disable(selection),
        };
        let ref message = match enabled {
            true => Message::Enable,
            false => Message::Disable,
        };
        for player in changed.iter() {
            self.send(player.address(), message).await;
            self.feedback
                .blink(Target::Player(player.index()), player.color().rgb(), 1);
        }
        log::info!("[coordinator] {} player(s) now {}", changed.len(), message);
        changed
    }

    fn emit(&self, buzz: Buzz) {
        match buzz.to_json() {
            Ok(line) => {
                if self.console.send(line).is_err() {
                    log::warn!("[console] operator gone, dropping buzz {}", buzz.buzzer);
                }
            }
            Err(e) => log::error!("[console] {}", e),
        }
    }
}

#[cfg(test)]
impl Context {
    /// Context with a running sequencer and no console reader.
    pub(crate) fn detached(radio: Arc<dyn Radio>, strip: SharedPixels, epoch: Epoch) -> Self {
        let config = CoordinatorConfig::default();
        let (feedback, sequencer) = Sequencer::new(strip, config.layout.clone());
        tokio::spawn(sequencer.run());
        Self {
            radio,
            directory: Arc::new(Mutex::new(Directory::new())),
            feedback,
            console: unbounded_channel().0,
            epoch,
            config,
        }
    }
}

/// An extra long-running loop supervised alongside the coordinator's own.
pub type Loop = std::pin::Pin<Box<dyn Future<Output = anyhow::Result<Infallible>> + Send>>;

/// The game's central device.
pub struct Coordinator {
    context: Context,
    sequencer: Sequencer,
    commands: UnboundedReceiver<String>,
    strip: SharedPixels,
    panel: Option<Panel>,
    loops: Vec<(&'static str, Loop)>,
}

impl Coordinator {
    pub fn new(
        radio: Arc<dyn Radio>,
        strip: SharedPixels,
        config: CoordinatorConfig,
    ) -> (Self, Console) {
        let (command_tx, command_rx) = unbounded_channel();
        let (buzz_tx, buzz_rx) = unbounded_channel();
        let (feedback, sequencer) = Sequencer::new(strip.clone(), config.layout.clone());
        let sequencer = sequencer.with_phase(config.blink_phase);
        let context = Context {
            radio,
            directory: Arc::new(Mutex::new(Directory::new())),
            feedback,
            console: buzz_tx,
            epoch: Epoch::random(),
            config,
        };
        let coordinator = Self {
            context,
            sequencer,
            commands: command_rx,
            strip,
            panel: None,
            loops: Vec::new(),
        };
        let console = Console {
            commands: command_tx,
            buzzes: buzz_rx,
        };
        (coordinator, console)
    }
    pub fn with_panel(mut self, panel: Panel) -> Self {
        self.panel = Some(panel);
        self
    }
    /// Adds a loop whose exit brings the coordinator down like any other,
    /// e.g. an interrupt handler.
    pub fn with_loop<F>(mut self, name: &'static str, task: F) -> Self
    where
        F: Future<Output = anyhow::Result<Infallible>> + Send + 'static,
    {
        self.loops.push((name, Box::pin(task)));
        self
    }
    pub fn epoch(&self) -> Epoch {
        self.context.epoch
    }
    pub fn address(&self) -> Address {
        self.context.radio.address()
    }
    pub fn directory(&self) -> Arc<Mutex<Directory>> {
        self.context.directory.clone()
    }
    /// Dispatches one received radio frame.
    pub async fn handle(&self, frame: Frame) {
        self.context.handle(frame).await
    }
    /// Applies one operator console line.
    pub async fn command(&self, line: &str) {
        self.context.command(line).await
    }

    /// Runs every coordinator loop until one of them fails, then blanks the
    /// LED bar, releases the radio and returns the failure.
    pub async fn run(self) -> anyhow::Error {
        let Self {
            context,
            sequencer,
            commands,
            strip,
            panel,
            loops,
        } = self;
        log::info!(
            "[coordinator] {} starting, epoch {}",
            context.radio.address(),
            context.epoch
        );
        context.radio.ensure_peer(Address::BROADCAST);
        context.feedback.blink(Target::Buzz, Rgb::GREEN, 2);
        let mut tasks = Tasks::new();
        tasks.spawn("feedback", sequencer.run());
        tasks.spawn("receive", receive(context.clone()));
        tasks.spawn("console", console(context.clone(), commands));
        tasks.spawn("broadcast", scheduler::broadcast(context.clone()));
        tasks.spawn("ping", scheduler::ping(context.clone()));
        tasks.spawn("status", scheduler::status(context.clone()));
        if let Some(panel) = panel {
            tasks.spawn("panel", panel.run(context.clone()));
        }
        for (name, task) in loops {
            tasks.spawn(name, task);
        }
        let error = tasks.supervise().await;
        strip.lock().await.blank();
        context.radio.close();
        error
    }
}

async fn receive(context: Context) -> anyhow::Result<Infallible> {
    loop {
        let frame = context.radio.recv().await?;
        context.handle(frame).await;
    }
}

async fn console(
    context: Context,
    mut commands: UnboundedReceiver<String>,
) -> anyhow::Result<Infallible> {
    while let Some(line) = commands.recv().await {
        context.command(&line).await;
    }
    Err(anyhow::anyhow!("console closed"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bzr_feedback::Strip;
    use bzr_radio::Ether;
    use bzr_radio::RadioError;
    use bzr_radio::Station;
    use std::time::Duration;
    fn address(last: u8) -> Address {
        Address::new([0x02, 0, 0, 0, 0, last])
    }
    fn setup() -> (Ether, Coordinator, Console) {
        let ether = Ether::new();
        let radio = Arc::new(ether.join(address(0xc0)));
        let strip = Strip::new(BAR_LENGTH).shared();
        let (coordinator, console) =
            Coordinator::new(radio, strip, CoordinatorConfig::default());
        (ether, coordinator, console)
    }
    fn frame(from: Address, message: Message) -> Frame {
        Frame {
            from,
            payload: Protocol::encode(&message).unwrap(),
        }
    }
    async fn next(station: &Station) -> Option<Message> {
        match tokio::time::timeout(Duration::from_millis(10), station.recv()).await {
            Ok(Ok(frame)) => Protocol::decode(&frame.payload).ok(),
            Ok(Err(RadioError::Closed)) | Err(_) => None,
            Ok(Err(e)) => panic!("{}", e),
        }
    }
    async fn join(ether: &Ether, coordinator: &Coordinator, last: u8, name: &str) -> Station {
        let station = ether.join(address(last));
        coordinator
            .handle(frame(address(last), Message::request_registration(name)))
            .await;
        assert_eq!(next(&station).await, Some(Message::RegistrationAck));
        station
    }
    async fn interrupt() -> anyhow::Result<Infallible> {
        tokio::time::sleep(Duration::from_secs(1)).await;
        anyhow::bail!("interrupted")
    }
    #[tokio::test(start_paused = true)]
    async fn added_loop_failure_runs_cleanup() {
        let ether = Ether::new();
        let strip = Strip::new(BAR_LENGTH).shared();
        let radio = Arc::new(ether.join(address(0xc0)));
        let (coordinator, _console) =
            Coordinator::new(radio, strip.clone(), CoordinatorConfig::default());
        assert_eq!(ether.stations(), 1);
        let error = coordinator.with_loop("signal", interrupt()).run().await;
        assert!(format!("{:#}", error).contains("signal loop failed"));
        assert!(format!("{:#}", error).contains("interrupted"));
        assert!(strip.lock().await.buffer().iter().all(|&c| c == Rgb::OFF));
        assert_eq!(ether.stations(), 0);
    }
    #[tokio::test(start_paused = true)]
    async fn registration_is_acknowledged() {
        let (ether, coordinator, _console) = setup();
        join(&ether, &coordinator, 1, "Red").await;
        join(&ether, &coordinator, 2, "Blue").await;
        let directory = coordinator.directory();
        let directory = directory.lock().await;
        assert_eq!(directory.lookup(address(2)).map(Player::index), Some(1));
    }
    #[tokio::test(start_paused = true)]
    async fn press_disables_everyone_else() {
        let (ether, coordinator, mut console) = setup();
        let a = join(&ether, &coordinator, 1, "Red").await;
        let b = join(&ether, &coordinator, 2, "Blue").await;
        let c = join(&ether, &coordinator, 3, "Green").await;
        coordinator.handle(frame(address(2), Message::Pressed)).await;
        assert_eq!(console.buzzes.recv().await.as_deref(), Some(r#"{"buzzer":1}"#));
        assert_eq!(next(&a).await, Some(Message::Disable));
        assert_eq!(next(&c).await, Some(Message::Disable));
        assert_eq!(next(&b).await, None);
        let directory = coordinator.directory();
        assert!(directory.lock().await.get(1).unwrap().is_enabled());
    }
    #[tokio::test(start_paused = true)]
    async fn presses_that_do_not_count() {
        let (ether, coordinator, mut console) = setup();
        let a = join(&ether, &coordinator, 1, "Red").await;
        coordinator.handle(frame(address(9), Message::Pressed)).await;
        coordinator.command(r#"{"disable":[0]}"#).await;
        assert_eq!(next(&a).await, Some(Message::Disable));
        coordinator.handle(frame(address(1), Message::Pressed)).await;
        assert!(console.buzzes.try_recv().is_err());
    }
    #[tokio::test(start_paused = true)]
    async fn duplicate_press_counts_once() {
        let (ether, coordinator, mut console) = setup();
        join(&ether, &coordinator, 1, "Red").await;
        coordinator.handle(frame(address(1), Message::Pressed)).await;
        coordinator.handle(frame(address(1), Message::Pressed)).await;
        assert_eq!(console.buzzes.recv().await.as_deref(), Some(r#"{"buzzer":0}"#));
        assert!(console.buzzes.try_recv().is_err());
        tokio::time::advance(DEBOUNCE).await;
        coordinator.handle(frame(address(1), Message::Pressed)).await;
        assert_eq!(console.buzzes.recv().await.as_deref(), Some(r#"{"buzzer":0}"#));
    }
    #[tokio::test(start_paused = true)]
    async fn console_notifies_only_changed_players() {
        let (ether, coordinator, _console) = setup();
        let a = join(&ether, &coordinator, 1, "Red").await;
        let b = join(&ether, &coordinator, 2, "Blue").await;
        coordinator.command(r#"{"disable":[1]}"#).await;
        assert_eq!(next(&a).await, None);
        assert_eq!(next(&b).await, Some(Message::Disable));
        coordinator.command(r#"{"enable":[-1]}"#).await;
        assert_eq!(next(&a).await, None);
        assert_eq!(next(&b).await, Some(Message::Enable));
        coordinator.command("not a command").await;
        assert_eq!(next(&b).await, None);
    }
    #[tokio::test(start_paused = true)]
    async fn disabled_player_resyncs_on_reregistration() {
        let (ether, coordinator, _console) = setup();
        let a = join(&ether, &coordinator, 1, "Red").await;
        coordinator.command(r#"{"disable":[0]}"#).await;
        assert_eq!(next(&a).await, Some(Message::Disable));
        coordinator
            .handle(frame(address(1), Message::request_registration("Red")))
            .await;
        assert_eq!(next(&a).await, Some(Message::RegistrationAck));
        assert_eq!(next(&a).await, Some(Message::Disable));
    }
    #[tokio::test(start_paused = true)]
    async fn pong_refreshes_and_strangers_are_ignored() {
        let (ether, coordinator, _console) = setup();
        join(&ether, &coordinator, 1, "Red").await;
        tokio::time::advance(Duration::from_secs(9)).await;
        coordinator.handle(frame(address(1), Message::Pong)).await;
        coordinator.handle(frame(address(7), Message::Pong)).await;
        coordinator.handle(frame(address(7), Message::Enable)).await;
        coordinator
            .handle(Frame {
                from: address(7),
                payload: b"{oops".to_vec(),
            })
            .await;
        tokio::time::advance(Duration::from_secs(9)).await;
        let directory = coordinator.directory();
        let directory = directory.lock().await;
        assert_eq!(directory.len(), 1);
        assert!(directory.get(0).unwrap().is_online(Instant::now()));
    }
}
