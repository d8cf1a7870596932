use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use xrpl_iot::application::{
    CancelToken, DispatchCommandUseCase, ListenCommandsUseCase, ResolveCredentialsUseCase,
    SaveSecretUseCase,
};
use xrpl_iot::domain::AccountAddress;
use xrpl_iot::infrastructure::{
    AccountSubscriber, AppConfig, CliArgs, DesktopNotificationService, KeyringSecretStorage, Mode,
    SessionConfig, ShellDevice, StorageManager, SubscriberConfig, XrplConnector,
};
use xrpl_iot::presentation::{App, AppServices};

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = config.effective_log_path() {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry().with(filter).init();
    }

    Ok(())
}

fn load_config(args: &CliArgs) -> Result<AppConfig> {
    let storage = StorageManager::new()?;
    let mut config = storage.load_config(args.config.as_deref())?;
    config.merge_with_args(args);
    Ok(config)
}

fn secret_storage(account: Option<&AccountAddress>) -> Arc<KeyringSecretStorage> {
    Arc::new(account.map_or_else(KeyringSecretStorage::new, KeyringSecretStorage::for_account))
}

async fn run_ui(config: AppConfig, account: Option<AccountAddress>, cli_secret: Option<String>) -> Result<()> {
    let services = AppServices {
        ledger: Arc::new(XrplConnector::new(SessionConfig::from(&config.ledger))),
        secrets: secret_storage(account.as_ref()),
        notifier: Arc::new(DesktopNotificationService::new(
            config.enable_desktop_notifications,
        )),
    };
    let mouse = config.ui.mouse;
    let app = App::new(config, services, account);

    let mut terminal = ratatui::init();
    if mouse && let Err(e) = crossterm::execute!(std::io::stdout(), EnableMouseCapture) {
        warn!(error = %e, "Mouse capture unavailable");
    }

    let result = app.run(&mut terminal, cli_secret).await;

    if mouse {
        let _ = crossterm::execute!(std::io::stdout(), DisableMouseCapture);
    }
    ratatui::restore();

    result
}

async fn run_send(
    config: &AppConfig,
    account: Option<AccountAddress>,
    cli_secret: Option<String>,
    command: &str,
) -> Result<()> {
    let resolver = ResolveCredentialsUseCase::new(secret_storage(account.as_ref()), account);
    let resolved = resolver
        .execute(cli_secret)
        .await?
        .ok_or_else(|| eyre!("no account secret; pass --secret or set XRPL_IOT_SECRET"))?;

    let route = config.payment_route(resolved.credentials.address().clone())?;
    let dispatcher = DispatchCommandUseCase::new(
        Arc::new(XrplConnector::new(SessionConfig::from(&config.ledger))),
        Arc::new(resolved.credentials),
        route,
        config.ledger.timeout(),
    );

    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Ctrl-C handler unavailable");
            std::future::pending::<()>().await;
        }
    };
    let receipt = dispatcher.execute_until(command, interrupt).await?;

    println!("Sent command '{}' with TX hash {}", receipt.command, receipt.hash);
    if let Some(ledger_index) = receipt.ledger_index {
        println!("Validated in ledger {ledger_index} ({})", receipt.engine_result);
    } else {
        println!("Submitted ({})", receipt.engine_result);
    }
    Ok(())
}

async fn run_listen(
    config: &AppConfig,
    account: Option<AccountAddress>,
    cli_secret: Option<String>,
) -> Result<()> {
    let account = match account {
        Some(account) => account,
        None => ResolveCredentialsUseCase::new(secret_storage(None), None)
            .execute(cli_secret)
            .await?
            .map(|resolved| resolved.credentials.address().clone())
            .ok_or_else(|| eyre!("no account to follow; pass --account or a secret"))?,
    };

    let device = ShellDevice::new(&config.device);
    if device.commands().next().is_none() {
        warn!("No device commands configured, every command will be ignored");
    }

    let listener = ListenCommandsUseCase::new(account, Arc::new(device)).with_notifier(Arc::new(
        DesktopNotificationService::new(config.enable_desktop_notifications),
    ));
    let mut stream = AccountSubscriber::new(SubscriberConfig::new(config.ledger.endpoint.clone()));

    let cancel = CancelToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupt received");
                cancel.cancel();
            }
        })
    };

    let summary = listener.run(&mut stream, &cancel).await;
    interrupt.abort();
    let summary = summary?;

    println!(
        "Listener stopped: {} executed, {} failed, {} ignored",
        summary.executed, summary.failed, summary.ignored
    );
    Ok(())
}

async fn forget_secret(account: Option<AccountAddress>) -> Result<()> {
    SaveSecretUseCase::new(secret_storage(account.as_ref()), account)
        .delete_secret()
        .await?;
    println!("Stored secret removed");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = CliArgs::parse();
    let config = load_config(&args)?;
    init_logging(&config)?;

    info!(version = xrpl_iot::VERSION, mode = ?args.mode(), "Starting {}", xrpl_iot::NAME);

    let account = config.account_address()?;
    let cli_secret = args.secret.clone();

    match args.mode() {
        Mode::Ui => run_ui(config, account, cli_secret).await,
        Mode::Send { command } => run_send(&config, account, cli_secret, &command).await,
        Mode::Listen => run_listen(&config, account, cli_secret).await,
        Mode::ForgetSecret => forget_secret(account).await,
    }
}
