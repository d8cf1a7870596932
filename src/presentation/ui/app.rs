//! Main application orchestrator.

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyEvent, MouseEvent};
use futures_util::StreamExt;
use ratatui::{DefaultTerminal, Frame};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, error, info, warn};

use crate::application::dto::{ResolvedCredentials, SecretRequest, SecretSource};
use crate::application::services::AlertQueue;
use crate::application::use_cases::{
    DispatchCommandUseCase, ResolveCredentialsUseCase, SaveSecretUseCase,
};
use crate::application::CancelToken;
use crate::domain::entities::{AccountAddress, DispatchResult};
use crate::domain::errors::{DispatchError, SecretError};
use crate::domain::ports::{LedgerPort, NotificationPort, SecretStoragePort};
use crate::infrastructure::config::AppConfig;
use crate::presentation::events::{self, EventResult};
use crate::presentation::ui::{
    AlertPopup, ControlAction, ControlScreen, SecretAction, SecretScreen,
};

const ANIMATION_TICK_RATE: Duration = Duration::from_millis(80);
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Adapters the application talks to.
pub struct AppServices {
    /// Opens one session per dispatch.
    pub ledger: Arc<dyn LedgerPort>,
    /// Keyring access for the account secret.
    pub secrets: Arc<dyn SecretStoragePort>,
    /// Desktop notifications for dispatch outcomes.
    pub notifier: Arc<dyn NotificationPort>,
}

#[derive(Debug)]
enum Action {
    DispatchFinished { command: String, result: DispatchResult },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AppState {
    Secret,
    Control,
    Exiting,
}

enum CurrentScreen {
    Secret(SecretScreen),
    Control(Box<ControlScreen>),
}

pub struct App {
    state: AppState,
    screen: CurrentScreen,
    config: AppConfig,
    ledger: Arc<dyn LedgerPort>,
    notifier: Arc<dyn NotificationPort>,
    resolve_use_case: ResolveCredentialsUseCase,
    save_use_case: SaveSecretUseCase,
    dispatcher: Option<DispatchCommandUseCase>,
    dispatch_task: Option<JoinHandle<()>>,
    alerts: AlertQueue,
    cancel: CancelToken,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
}

impl App {
    /// `account` overrides the address derived from the secret.
    #[must_use]
    pub fn new(config: AppConfig, services: AppServices, account: Option<AccountAddress>) -> Self {
        let resolve_use_case =
            ResolveCredentialsUseCase::new(services.secrets.clone(), account.clone());
        let save_use_case = SaveSecretUseCase::new(services.secrets, account);
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        Self {
            state: AppState::Secret,
            screen: CurrentScreen::Secret(SecretScreen::new()),
            config,
            ledger: services.ledger,
            notifier: services.notifier,
            resolve_use_case,
            save_use_case,
            dispatcher: None,
            dispatch_task: None,
            alerts: AlertQueue::new(),
            cancel: CancelToken::new(),
            action_tx,
            action_rx,
        }
    }

    /// # Errors
    /// Returns error if the terminal cannot be drawn.
    pub async fn run(
        mut self,
        terminal: &mut DefaultTerminal,
        cli_secret: Option<String>,
    ) -> color_eyre::Result<()> {
        match self.resolve_use_case.execute(cli_secret).await {
            Ok(Some(resolved)) => self.enter_control(resolved),
            Ok(None) => debug!("No stored secret, prompting"),
            Err(e) => {
                warn!(error = %e, "Stored secret is unusable");
                self.show_secret_error(&e);
            }
        }

        self.run_event_loop(terminal).await?;

        self.shutdown().await;
        info!("Application exiting normally");
        Ok(())
    }

    async fn run_event_loop(&mut self, terminal: &mut DefaultTerminal) -> color_eyre::Result<()> {
        let mut terminal_events = EventStream::new();
        let mut animation_interval = interval(ANIMATION_TICK_RATE);

        terminal.draw(|frame| self.render(frame))?;

        while self.state != AppState::Exiting {
            let terminal_event = terminal_events.next();

            tokio::select! {
                biased;

                Some(action) = self.action_rx.recv() => {
                    self.handle_action(action);
                    terminal.draw(|frame| self.render(frame))?;
                }

                _ = animation_interval.tick() => {
                    if self.tick() {
                        terminal.draw(|frame| self.render(frame))?;
                    }
                }

                Some(Ok(event)) = terminal_event => {
                    if self.handle_terminal_event(event).await == EventResult::Exit {
                        self.state = AppState::Exiting;
                    }
                    terminal.draw(|frame| self.render(frame))?;
                }
            }
        }

        Ok(())
    }

    /// Advances animations, returns whether a redraw is needed.
    fn tick(&mut self) -> bool {
        self.alerts.tick();
        match &mut self.screen {
            CurrentScreen::Control(screen) if screen.is_loading() => {
                screen.tick();
                true
            }
            _ => !self.alerts.is_empty(),
        }
    }

    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        match &mut self.screen {
            CurrentScreen::Secret(screen) => frame.render_widget(&*screen, area),
            CurrentScreen::Control(screen) => screen.render(area, frame.buffer_mut()),
        }

        if let Some(alert) = self.alerts.current() {
            frame.render_widget(AlertPopup::new(alert), area);
        }
    }

    async fn handle_terminal_event(&mut self, event: Event) -> EventResult {
        match event {
            Event::Key(key) if events::is_press(&key) => self.handle_key(key).await,
            Event::Mouse(mouse) if self.config.ui.mouse => self.handle_mouse(mouse),
            Event::Paste(text) => {
                if let CurrentScreen::Secret(screen) = &mut self.screen {
                    screen.paste(&text);
                }
                EventResult::Continue
            }
            _ => EventResult::Continue,
        }
    }

    async fn handle_key(&mut self, key: KeyEvent) -> EventResult {
        if events::is_force_quit_event(&key) {
            return EventResult::Exit;
        }

        if !self.alerts.is_empty() {
            if events::is_submit_event(&key) || events::is_quit_event(&key) {
                self.alerts.dismiss();
            }
            return EventResult::Continue;
        }

        match &mut self.screen {
            CurrentScreen::Secret(screen) => match screen.handle_key(key) {
                SecretAction::Submit => self.submit_secret().await,
                SecretAction::ForgetStored => self.forget_secret().await,
                SecretAction::Quit => return EventResult::Exit,
                SecretAction::None => {}
            },
            CurrentScreen::Control(screen) => match screen.handle_key(key) {
                ControlAction::Send(command) => self.start_dispatch(command),
                ControlAction::Quit => return EventResult::Exit,
                ControlAction::None => {}
            },
        }

        EventResult::Continue
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> EventResult {
        if !self.alerts.is_empty() {
            return EventResult::Continue;
        }

        if let CurrentScreen::Control(screen) = &mut self.screen
            && let ControlAction::Send(command) = screen.handle_mouse(mouse)
        {
            self.start_dispatch(command);
        }
        EventResult::Continue
    }

    async fn submit_secret(&mut self) {
        let CurrentScreen::Secret(screen) = &mut self.screen else {
            return;
        };
        let Some(secret) = screen.take_secret() else {
            return;
        };

        let mut request = SecretRequest::new(secret.as_str(), SecretSource::UserInput);
        if !screen.should_persist() {
            request = request.without_persistence();
        }
        screen.set_validating();

        match self.save_use_case.execute(request).await {
            Ok(resolved) => self.enter_control(resolved),
            Err(e) => self.show_secret_error(&e),
        }
    }

    async fn forget_secret(&mut self) {
        let result = self.save_use_case.delete_secret().await;
        if let CurrentScreen::Secret(screen) = &mut self.screen {
            match result {
                Ok(()) => screen.set_notice("Saved secret removed from keyring"),
                Err(e) => screen.set_error(e.to_string()),
            }
        }
    }

    fn show_secret_error(&mut self, error: &SecretError) {
        let mut screen = SecretScreen::new();
        screen.set_error(error.to_string());
        self.screen = CurrentScreen::Secret(screen);
        self.state = AppState::Secret;
    }

    fn enter_control(&mut self, resolved: ResolvedCredentials) {
        let address = resolved.credentials.address().clone();
        let route = match self.config.payment_route(address.clone()) {
            Ok(route) => route,
            Err(e) => {
                error!(error = %e, "Payment settings are invalid");
                let mut screen = SecretScreen::new();
                screen.set_error(e.to_string());
                self.screen = CurrentScreen::Secret(screen);
                return;
            }
        };

        info!(
            account = %address,
            source = %resolved.source,
            persisted = resolved.persisted,
            "Credentials ready"
        );

        self.dispatcher = Some(DispatchCommandUseCase::new(
            Arc::clone(&self.ledger),
            Arc::new(resolved.credentials),
            route,
            self.config.ledger.timeout(),
        ));
        self.screen = CurrentScreen::Control(Box::new(ControlScreen::new(
            &self.config.ui,
            address.as_str(),
            self.ledger.endpoint(),
        )));
        self.state = AppState::Control;
    }

    fn start_dispatch(&mut self, command: String) {
        let Some(dispatcher) = self.dispatcher.clone() else {
            return;
        };
        let CurrentScreen::Control(screen) = &mut self.screen else {
            return;
        };
        if dispatcher.is_busy() {
            debug!(command = %command, "Ignoring press while a command is in flight");
            return;
        }

        screen.start_loading();

        let tx = self.action_tx.clone();
        let cancel = self.cancel.clone();
        self.dispatch_task = Some(tokio::spawn(async move {
            let result = dispatcher.execute(&command, &cancel).await;
            let _ = tx.send(Action::DispatchFinished { command, result });
        }));
    }

    fn handle_action(&mut self, action: Action) {
        match action {
            Action::DispatchFinished { command, result } => {
                self.dispatch_task = None;
                self.finish_dispatch(&command, result);
            }
        }
    }

    fn finish_dispatch(&mut self, command: &str, result: DispatchResult) {
        let CurrentScreen::Control(screen) = &mut self.screen else {
            return;
        };

        match result {
            Ok(receipt) => {
                screen.finish_success(&receipt);
                let message = format!(
                    "Sent command '{}' with TX hash {}",
                    receipt.command, receipt.hash
                );
                self.notifier.send("Command sent", &message);
                self.alerts.success("Success", message);
            }
            Err(DispatchError::Cancelled) => {
                screen.finish_error();
                debug!(command, "Dispatch cancelled");
            }
            Err(e) => {
                screen.finish_error();
                let mut message = format!("Failed to send command '{command}': {e}");
                if e.is_recoverable() {
                    message.push_str(". Press the button again to retry.");
                }
                self.notifier.send("Command failed", &message);
                self.alerts.error("Error", message);
            }
        }
    }

    async fn shutdown(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.dispatch_task.take()
            && tokio::time::timeout(SHUTDOWN_GRACE, task).await.is_err()
        {
            warn!("In-flight dispatch did not stop in time");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::AccountSecret;
    use crate::domain::ports::mocks::{
        MockBehaviour, MockLedgerPort, MockNotificationPort, MockSecretStorage,
    };
    use crossterm::event::{KeyCode, KeyModifiers};

    const GENESIS_SECRET: &str = "snoPBrXtMeMyMHUVTgbuqAfg1SUTb";

    struct Harness {
        app: App,
        ledger: MockLedgerPort,
        notifier: Arc<MockNotificationPort>,
    }

    fn harness(behaviour: MockBehaviour, storage: MockSecretStorage) -> Harness {
        let ledger = MockLedgerPort::new(behaviour);
        let notifier = Arc::new(MockNotificationPort::new());
        let app = App::new(
            AppConfig::default(),
            AppServices {
                ledger: Arc::new(ledger.clone()),
                secrets: Arc::new(storage),
                notifier: notifier.clone(),
            },
            None,
        );
        Harness {
            app,
            ledger,
            notifier,
        }
    }

    async fn unlocked(behaviour: MockBehaviour) -> Harness {
        let secret = AccountSecret::parse(GENESIS_SECRET).unwrap();
        let mut h = harness(behaviour, MockSecretStorage::with_secret(secret));
        let resolved = h.app.resolve_use_case.execute(None).await.unwrap().unwrap();
        h.app.enter_control(resolved);
        h
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn is_loading(app: &App) -> bool {
        matches!(&app.screen, CurrentScreen::Control(s) if s.is_loading())
    }

    async fn press_and_wait(app: &mut App, code: KeyCode) {
        app.handle_key(key(code)).await;
        assert!(is_loading(app));
        let action = app.action_rx.recv().await.unwrap();
        app.handle_action(action);
    }

    #[tokio::test]
    async fn test_secret_entry_opens_control_screen() {
        let mut h = harness(MockBehaviour::Succeed, MockSecretStorage::new());
        assert_eq!(h.app.state, AppState::Secret);

        for c in GENESIS_SECRET.chars() {
            h.app.handle_key(key(KeyCode::Char(c))).await;
        }
        h.app.handle_key(key(KeyCode::Enter)).await;

        assert_eq!(h.app.state, AppState::Control);
        assert!(h.app.dispatcher.is_some());
    }

    #[tokio::test]
    async fn test_invalid_secret_stays_on_secret_screen() {
        let mut h = harness(MockBehaviour::Succeed, MockSecretStorage::new());

        for c in "not-a-seed".chars() {
            h.app.handle_key(key(KeyCode::Char(c))).await;
        }
        h.app.handle_key(key(KeyCode::Enter)).await;

        assert_eq!(h.app.state, AppState::Secret);
        assert!(matches!(&h.app.screen, CurrentScreen::Secret(s) if s.state() == crate::presentation::ui::SecretState::Error));
    }

    #[tokio::test]
    async fn test_successful_dispatch_shows_hash() {
        let mut h = unlocked(MockBehaviour::Succeed).await;

        press_and_wait(&mut h.app, KeyCode::Enter).await;

        assert!(!is_loading(&h.app));
        let alert = h.app.alerts.current().unwrap();
        assert_eq!(alert.level, crate::domain::AlertLevel::Success);
        assert!(alert.message.contains("Sent command 'turn_on' with TX hash"));
        assert!(alert.message.contains(&"5A".repeat(32)));
        assert_eq!(h.notifier.notifications.lock().unwrap().len(), 1);
        assert_eq!(h.ledger.open_sessions(), 0);
    }

    #[tokio::test]
    async fn test_failed_dispatch_clears_loading() {
        let mut h = unlocked(MockBehaviour::FailSign).await;

        press_and_wait(&mut h.app, KeyCode::Char('2')).await;

        assert!(!is_loading(&h.app));
        let alert = h.app.alerts.current().unwrap();
        assert_eq!(alert.level, crate::domain::AlertLevel::Error);
        assert!(alert.message.contains("turn_off"));
        assert!(!alert.message.contains("retry"));
    }

    #[tokio::test]
    async fn test_connection_failure_clears_loading() {
        let mut h = unlocked(MockBehaviour::FailConnect).await;

        press_and_wait(&mut h.app, KeyCode::Enter).await;

        assert!(!is_loading(&h.app));
        assert_eq!(h.app.alerts.len(), 1);
        assert!(h.app.alerts.current().unwrap().message.ends_with("again to retry."));
        assert_eq!(h.ledger.opened(), 0);
    }

    #[tokio::test]
    async fn test_alert_blocks_input_until_dismissed() {
        let mut h = unlocked(MockBehaviour::Succeed).await;
        press_and_wait(&mut h.app, KeyCode::Enter).await;

        assert_eq!(
            h.app.handle_key(key(KeyCode::Char('1'))).await,
            EventResult::Continue
        );
        assert!(!is_loading(&h.app));

        h.app.handle_key(key(KeyCode::Enter)).await;
        assert!(h.app.alerts.is_empty());
    }

    #[tokio::test]
    async fn test_shutdown_cancels_in_flight_dispatch() {
        let mut h = unlocked(MockBehaviour::HangSign).await;
        h.app.handle_key(key(KeyCode::Enter)).await;

        while h.ledger.submitted().is_empty() {
            tokio::task::yield_now().await;
        }
        h.app.shutdown().await;

        assert_eq!(h.ledger.open_sessions(), 0);
    }

    #[tokio::test]
    async fn test_quit_keys() {
        let mut h = unlocked(MockBehaviour::Succeed).await;
        assert_eq!(
            h.app.handle_key(key(KeyCode::Char('q'))).await,
            EventResult::Exit
        );

        let force = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(h.app.handle_key(force).await, EventResult::Exit);
    }
}
