//! Plume CLI - Main entry point

mod console;
mod shell;

use clap::{Parser, Subcommand};
use plume_core::{CallOutcome, HostDescriptor, Notification, NotificationCode, PluginManager};
use plume_foundation::HostConfig;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use console::{ConsoleEngine, ConsoleUi};

/// Plume - native editor plugin host
#[derive(Parser, Debug)]
#[command(name = "plume")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Load configuration from this file instead of the global/project stores
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Plugins root directory (default: <install>/plugins)
    #[arg(long)]
    plugins_dir: Option<PathBuf>,

    /// Start without loading any plugin
    #[arg(long)]
    no_plugin: bool,

    /// Never prompt; load failures are only logged
    #[arg(long)]
    non_interactive: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List loaded plugins, the plugin menu and shortcuts
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run one plugin command by plugin name and command index
    Run {
        /// Plugin file name or stem (case-insensitive)
        plugin: String,
        /// Index in the plugin's function table
        index: usize,
    },
    /// Broadcast a notification (name or numeric code)
    Notify {
        event: String,
    },
    /// Interactive plugin shell (default)
    Shell,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = load_config(&args)?;
    let menu_title = config.menu_title.clone();
    let enable_plugin_admin = config.enable_plugin_admin;

    let ui = ConsoleUi::new();
    let host = HostDescriptor {
        host_window: std::process::id() as usize,
        ..Default::default()
    };
    let mut manager = PluginManager::new(config, host, Box::new(ui.clone()))
        .with_lexer_engine(Box::new(ConsoleEngine));

    manager.load_all(None);
    manager.setup_menu(&menu_title, enable_plugin_admin);

    match args.command.unwrap_or(Command::Shell) {
        Command::List { json } => {
            if json {
                console::print_json(&manager)?;
            } else {
                console::print_listing(&manager, &ui);
            }
            shutdown(&mut manager);
        }
        Command::Run { plugin, index } => {
            let outcome = manager.run_command_by_name(&plugin, index);
            report(&plugin, index, outcome);
            shutdown(&mut manager);
        }
        Command::Notify { event } => {
            let code: NotificationCode = event.parse().map_err(anyhow::Error::msg)?;
            let host_window = manager.host().host_window;
            manager.broadcast(&Notification::host(NotificationCode::Ready, host_window));
            let delivered = manager.broadcast(&Notification::host(code, host_window));
            println!("{} delivered to {} plugin(s)", code, delivered);
            shutdown(&mut manager);
        }
        Command::Shell => {
            let host_window = manager.host().host_window;
            manager.broadcast(&Notification::host(NotificationCode::Ready, host_window));
            shell::run(&mut manager, &ui).await?;
        }
    }

    Ok(())
}

/// 설정 로드 (--config 가 있으면 해당 파일만 사용) 후 명령줄 옵션 적용
fn load_config(args: &Args) -> anyhow::Result<HostConfig> {
    let mut config = match &args.config {
        Some(path) => HostConfig::load_from(path)?,
        None => HostConfig::load().unwrap_or_else(|e| {
            eprintln!("Warning: Failed to load config: {}", e);
            HostConfig::default()
        }),
    };

    if let Some(dir) = &args.plugins_dir {
        config.plugins_dir = Some(dir.clone());
    }
    if args.no_plugin {
        config.no_plugin = true;
    }
    if args.non_interactive {
        config.interactive = false;
    }
    Ok(config)
}

/// Shutdown broadcast (이미 닫혔으면 무시)
pub(crate) fn shutdown(manager: &mut PluginManager) {
    if manager.is_notification_closed() {
        return;
    }
    let host_window = manager.host().host_window;
    let delivered = manager.broadcast(&Notification::host(NotificationCode::Shutdown, host_window));
    tracing::info!("Shutdown delivered to {} plugin(s)", delivered);
}

pub(crate) fn report(plugin: &str, index: usize, outcome: CallOutcome) {
    match outcome {
        CallOutcome::Completed => println!("✓ {}[{}] completed", plugin, index),
        CallOutcome::Skipped => println!("- {}[{}] not found or not callable", plugin, index),
        CallOutcome::Faulted(kind) => println!("✗ {}[{}] faulted ({})", plugin, index, kind),
    }
}
