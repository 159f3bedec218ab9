//! `botctl` command line: the presentation layer around [`LifecycleController`].

use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use botctl_core::{AppViewModel, ControlAction};
use botctl_engine::ReqwestControlClient;
use botctl_logging::{ctl_info, ctl_warn};
use chrono::Local;
use clap::{ArgAction, Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::config::{ControlConfig, DEFAULT_CONFIG_FILENAME};
use crate::logging::LogDestination;
use crate::render::render;
use crate::{DispatchError, LifecycleController};

/// Exit code when a command is refused because its affordance is disabled.
const EXIT_NOT_AVAILABLE: u8 = 2;

#[derive(Debug, Parser)]
#[command(name = "botctl", version, about = "Observe and start/stop a remotely running chat bot")]
pub struct Cli {
    /// Base address of the control endpoint, e.g. http://10.0.0.5:8080
    #[arg(long, env = "BOTCTL_ENDPOINT")]
    pub endpoint: Option<String>,

    /// RON config file; defaults to ./botctl.ron when present
    #[arg(long, env = "BOTCTL_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub connect_timeout_ms: Option<u64>,

    #[arg(long)]
    pub request_timeout_ms: Option<u64>,

    /// Also write logs to ./botctl.log
    #[arg(long)]
    pub log_file: bool,

    /// Write logs only to ./botctl.log, nothing to the terminal
    #[arg(long, conflicts_with = "log_file")]
    pub log_file_only: bool,

    /// Repeat for more log output
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum CliCommand {
    /// Print the current bot status
    Status,
    /// Start the bot
    Start {
        /// Send even when the bot already reports active
        #[arg(long)]
        force: bool,
    },
    /// Stop the bot
    Stop {
        /// Send even when the bot already reports inactive
        #[arg(long)]
        force: bool,
    },
    /// Interactive control panel reading commands from stdin
    Console,
    /// Print the effective configuration as RON
    ShowConfig,
}

impl Cli {
    pub fn log_destination(&self) -> LogDestination {
        match (self.log_file, self.log_file_only) {
            (_, true) => LogDestination::File,
            (true, false) => LogDestination::Both,
            (false, false) => LogDestination::Terminal,
        }
    }

    /// File config overlaid with environment and flags.
    pub fn resolve_config(&self) -> anyhow::Result<ControlConfig> {
        let file = match &self.config {
            Some(path) => ControlConfig::load(path)?,
            None => ControlConfig::load_if_present(&PathBuf::from(DEFAULT_CONFIG_FILENAME))?,
        };
        Ok(file.merged_with(ControlConfig {
            endpoint: self.endpoint.clone(),
            connect_timeout_ms: self.connect_timeout_ms,
            request_timeout_ms: self.request_timeout_ms,
            max_body_bytes: None,
        }))
    }
}

/// One line typed into the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    Action(ControlAction),
    Refresh,
    Dismiss,
    Help,
    Quit,
}

impl FromStr for ConsoleCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let word = s.trim().to_ascii_lowercase();
        match word.as_str() {
            "refresh" | "status" | "r" => Ok(ConsoleCommand::Refresh),
            "dismiss" | "ok" => Ok(ConsoleCommand::Dismiss),
            "help" | "?" => Ok(ConsoleCommand::Help),
            "quit" | "exit" | "q" => Ok(ConsoleCommand::Quit),
            other => other
                .parse::<ControlAction>()
                .map(ConsoleCommand::Action)
                .map_err(|_| format!("unknown command '{}'; type 'help'", s.trim())),
        }
    }
}

const CONSOLE_HELP: &str = "commands: start | stop | refresh | dismiss | help | quit";

pub async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = cli.resolve_config()?;
    let command = cli.command.unwrap_or(CliCommand::Console);

    if command == CliCommand::ShowConfig {
        println!("{}", config.to_ron()?);
        return Ok(ExitCode::SUCCESS);
    }

    let settings = config.client_settings()?;
    let client = ReqwestControlClient::new(settings).context("building HTTP client")?;
    ctl_info!("Control endpoint {}", client.endpoint().status_url());
    let controller = LifecycleController::new(Arc::new(client));

    match command {
        CliCommand::Status => {
            mount(&controller).await;
            print_panel(&controller.view());
            Ok(ExitCode::SUCCESS)
        }
        CliCommand::Start { force } => one_shot(&controller, ControlAction::Start, force).await,
        CliCommand::Stop { force } => one_shot(&controller, ControlAction::Stop, force).await,
        CliCommand::Console => console(&controller).await,
        CliCommand::ShowConfig => Ok(ExitCode::SUCCESS),
    }
}

async fn mount(controller: &LifecycleController) {
    // Nothing else is running yet, so the controller cannot be busy.
    if let Err(busy) = controller.refresh_status().await {
        ctl_warn!("Initial status query skipped: {}", busy);
    }
}

async fn one_shot(
    controller: &LifecycleController,
    action: ControlAction,
    force: bool,
) -> anyhow::Result<ExitCode> {
    mount(controller).await;
    let view = controller.view();
    if !force && !is_enabled(&view, action) {
        print_panel(&view);
        eprintln!("{action} is not available while the bot is {}", view.status_label);
        return Ok(ExitCode::from(EXIT_NOT_AVAILABLE));
    }

    let result = controller.dispatch_action(action).await;
    print_panel(&controller.view());
    match result {
        Ok(_) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            eprintln!("Error: {err}");
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn console(controller: &LifecycleController) -> anyhow::Result<ExitCode> {
    let mut views = controller.subscribe();
    let watcher = tokio::spawn(async move {
        while views.changed().await.is_ok() {
            let view = views.borrow_and_update().clone();
            print_panel(&view);
        }
    });

    println!("{CONSOLE_HELP}");
    print_panel(&controller.view());
    mount(controller).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<ConsoleCommand>() {
            Ok(ConsoleCommand::Quit) => break,
            Ok(ConsoleCommand::Help) => println!("{CONSOLE_HELP}"),
            Ok(ConsoleCommand::Dismiss) => controller.dismiss_notice(),
            Ok(ConsoleCommand::Refresh) => {
                if let Err(busy) = controller.refresh_status().await {
                    println!("{busy}");
                }
            }
            Ok(ConsoleCommand::Action(action)) => {
                if !is_enabled(&controller.view(), action) {
                    println!("{action} is not available right now");
                    continue;
                }
                if let Err(err) = controller.dispatch_action(action).await {
                    report_dispatch_failure(&err);
                }
            }
            Err(message) => println!("{message}"),
        }
    }

    watcher.abort();
    Ok(ExitCode::SUCCESS)
}

fn is_enabled(view: &AppViewModel, action: ControlAction) -> bool {
    match action {
        ControlAction::Start => view.start_enabled,
        ControlAction::Stop => view.stop_enabled,
    }
}

fn report_dispatch_failure(err: &DispatchError) {
    eprintln!();
    eprintln!("*** Error: {err} ***");
    eprintln!();
}

fn print_panel(view: &AppViewModel) {
    for line in render(view, Local::now().time()) {
        println!("{line}");
    }
}
