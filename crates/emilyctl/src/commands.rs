//! Command implementations

use crate::cli::Commands;
use crate::errors::{ExitError, EXIT_CONFIG_ERROR, EXIT_HOME_NOT_CONFIGURED, EXIT_INPUT_ERROR};
use crate::logging::TurnLog;
use anyhow::{Context, Result};
use emily_common::config::{config_dir, config_path};
use emily_common::{
    extract, process_response, render_runs, synthesize_commands, AppRegistry, Collaborators,
    DetachedLauncher, DryRun, EmilyConfig, HomeAutomation, HomeCatalogSource, HomeCommands,
    HttpHomeAssistant, Launcher, SetupContext, SystemUrlOpener, UiSignal, UiSignals, UrlOpener,
};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Loaded configuration plus everything derived from it
pub struct Runtime {
    pub config: EmilyConfig,
    pub config_path: PathBuf,
    pub registry: AppRegistry,
}

impl Runtime {
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config_path = explicit.map(Path::to_path_buf).unwrap_or_else(config_path);
        let config = EmilyConfig::load_from(&config_path)
            .map_err(|e| ExitError::new(EXIT_CONFIG_ERROR, e.to_string()))?;

        let base = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(config_dir);
        let registry = config
            .load_registry(&base)
            .map_err(|e| ExitError::new(EXIT_CONFIG_ERROR, e.to_string()))?;

        Ok(Self {
            config,
            config_path,
            registry,
        })
    }

    fn home_client(&self) -> Option<HttpHomeAssistant> {
        HttpHomeAssistant::from_settings(&self.config.home_assistant)
    }
}

/// Prints UI signals to stderr; the CLI has no window to drive.
struct ConsoleUi;

impl UiSignals for ConsoleUi {
    fn emit(&self, signal: UiSignal) {
        eprintln!("[ui] {}", signal.as_str());
    }
}

pub fn run(command: Commands, config: Option<&Path>) -> Result<()> {
    if let Commands::Config { init } = command {
        return show_config(config, init);
    }

    let runtime = Runtime::load(config)?;
    match command {
        Commands::Process {
            file,
            dry_run,
            json,
            no_summary,
        } => process(&runtime, file.as_deref(), dry_run, json, no_summary),
        Commands::Extract { file } => extract_blocks(file.as_deref()),
        Commands::HaCommands => ha_commands(&runtime),
        Commands::Context => context(&runtime),
        Commands::Config { .. } => Ok(()),
    }
}

/// Read the reply from `file`, or stdin when `None`
pub fn read_input(file: Option<&Path>) -> Result<String> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))
            .map_err(|e| ExitError::new(EXIT_INPUT_ERROR, format!("{:#}", e)))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| ExitError::new(EXIT_INPUT_ERROR, format!("reading stdin: {}", e)))?;
            buf
        }
    };
    Ok(text)
}

fn process(
    runtime: &Runtime,
    file: Option<&Path>,
    dry_run: bool,
    json: bool,
    no_summary: bool,
) -> Result<()> {
    let text = read_input(file)?;
    let start = Instant::now();

    let home_client = if dry_run { None } else { runtime.home_client() };
    let (launcher, urls): (&dyn Launcher, &dyn UrlOpener) = if dry_run {
        (&DryRun, &DryRun)
    } else {
        (&DetachedLauncher, &SystemUrlOpener)
    };
    let ui: &dyn UiSignals = if dry_run { &DryRun } else { &ConsoleUi };

    let collaborators = Collaborators {
        apps: &runtime.registry,
        launcher,
        urls,
        home: home_client.as_ref().map(|c| c as &dyn HomeAutomation),
        ui,
    };
    let response = process_response(&text, &collaborators);

    let log = TurnLog {
        ts: TurnLog::now(),
        req_id: TurnLog::generate_req_id(),
        command: "process".to_string(),
        dry_run,
        executed: response.executed.len(),
        directives: response.executed.iter().map(|b| b.describe()).collect(),
        diagnostics: response.diagnostics.len(),
        duration_ms: start.elapsed().as_millis() as u64,
    };
    log.write()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print!("{}", response.cleaned);
        if !no_summary {
            print!("{}", render_runs(&response.executed, &runtime.registry));
        }
        println!();
    }
    Ok(())
}

fn extract_blocks(file: Option<&Path>) -> Result<()> {
    let text = read_input(file)?;
    let blocks = extract(&text);
    println!("{}", serde_json::to_string_pretty(&blocks)?);
    Ok(())
}

fn ha_commands(runtime: &Runtime) -> Result<()> {
    let Some(client) = runtime.home_client() else {
        return Err(ExitError::new(
            EXIT_HOME_NOT_CONFIGURED,
            "Home Assistant is disabled or has no token; set [home_assistant] in the config",
        )
        .into());
    };
    println!("{}", synthesize_commands(&client));
    Ok(())
}

fn context(runtime: &Runtime) -> Result<()> {
    let client = runtime.home_client();
    let context = SetupContext {
        user_name: &runtime.config.assistant.user_name,
        apps: &runtime.registry,
        home: HomeCommands::from_settings(
            &runtime.config.home_assistant,
            client.as_ref().map(|c| c as &dyn HomeCatalogSource),
        ),
    };
    println!("{}", context.render());
    Ok(())
}

fn show_config(explicit: Option<&Path>, init: bool) -> Result<()> {
    let path = explicit.map(Path::to_path_buf).unwrap_or_else(config_path);

    if init && !path.exists() {
        EmilyConfig::default()
            .save_to(&path)
            .with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "Wrote default config");
    }

    let config = EmilyConfig::load_from(&path)
        .map_err(|e| ExitError::new(EXIT_CONFIG_ERROR, e.to_string()))?;
    let mut shown = config.clone();
    if !shown.home_assistant.token.is_empty() {
        shown.home_assistant.token = "<redacted>".to_string();
    }

    println!("# {}", path.display());
    print!("{}", toml::to_string_pretty(&shown)?);
    Ok(())
}
