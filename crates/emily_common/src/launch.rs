//! Local side-effect capabilities: process launch, URL opening, UI signals
//!
//! All of these are fire-and-forget. Launched programs are never waited on or
//! supervised; failures are logged and reported as `false`.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::Mutex;
use std::thread;
use tracing::{debug, info, warn};

/// Starts a program in the background.
pub trait Launcher {
    /// `true` once the process is spawned and still running; says nothing about completion.
    fn launch_detached(&self, path: &str, args: &[String]) -> bool;
}

/// Hands a URL to the OS default handler.
pub trait UrlOpener {
    fn open_url(&self, url: &str);
}

/// Requests the hosting UI acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiSignal {
    /// Ask the user to confirm wiping chat history
    ConfirmClearHistory,
    /// Close the application
    Exit,
    SpeechOn,
    SpeechOff,
}

impl UiSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            UiSignal::ConfirmClearHistory => "confirm_clear_history",
            UiSignal::Exit => "exit",
            UiSignal::SpeechOn => "speech_on",
            UiSignal::SpeechOff => "speech_off",
        }
    }
}

pub trait UiSignals {
    fn emit(&self, signal: UiSignal);
}

/// Real launcher: detached, no console window, stdio closed.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedLauncher;

#[cfg(windows)]
fn hide_console(command: &mut Command) {
    use std::os::windows::process::CommandExt;
    const DETACHED_PROCESS: u32 = 0x0000_0008;
    const CREATE_NO_WINDOW: u32 = 0x0800_0000;
    command.creation_flags(DETACHED_PROCESS | CREATE_NO_WINDOW);
}

/// New process group, so terminal signals aimed at the host don't reach the app.
#[cfg(unix)]
fn hide_console(command: &mut Command) {
    use std::os::unix::process::CommandExt;
    command.process_group(0);
}

#[cfg(not(any(windows, unix)))]
fn hide_console(_command: &mut Command) {}

/// Wait on the child from a background thread so an exited app never lingers as a zombie.
fn reap(mut child: Child) {
    let pid = child.id();
    let spawned = thread::Builder::new()
        .name(format!("reap-{}", pid))
        .spawn(move || match child.wait() {
            Ok(status) => debug!(pid, %status, "Launched app exited"),
            Err(e) => warn!(pid, error = %e, "Failed to wait on launched app"),
        });
    if let Err(e) = spawned {
        warn!(pid, error = %e, "Could not start reaper thread");
    }
}

impl Launcher for DetachedLauncher {
    fn launch_detached(&self, path: &str, args: &[String]) -> bool {
        if let Err(e) = Path::new(path).canonicalize() {
            warn!(path, error = %e, "Launch target not found");
            return false;
        }
        // Symlinks stay unresolved; multi-call binaries dispatch on argv[0].
        let exe = std::path::absolute(path).unwrap_or_else(|_| PathBuf::from(path));

        let mut command = Command::new(&exe);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        hide_console(&mut command);

        match command.spawn() {
            Ok(mut child) => {
                let exited = child.try_wait();
                let running = matches!(exited, Ok(None));
                debug!(path = %exe.display(), pid = child.id(), running, "Spawned app");
                if !matches!(exited, Ok(Some(_))) {
                    reap(child);
                }
                running
            }
            Err(e) => {
                warn!(path = %exe.display(), error = %e, "Failed to spawn app");
                false
            }
        }
    }
}

/// Opens URLs through the `open` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemUrlOpener;

impl UrlOpener for SystemUrlOpener {
    fn open_url(&self, url: &str) {
        match open::that(url) {
            Ok(()) => debug!(url, "Opened URL"),
            Err(e) => warn!(url, error = %e, "Could not open URL"),
        }
    }
}

/// Logs what would run without touching the system.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRun;

impl Launcher for DryRun {
    fn launch_detached(&self, path: &str, args: &[String]) -> bool {
        info!(path, ?args, "[dry-run] would launch");
        true
    }
}

impl UrlOpener for DryRun {
    fn open_url(&self, url: &str) {
        info!(url, "[dry-run] would open URL");
    }
}

impl UiSignals for DryRun {
    fn emit(&self, signal: UiSignal) {
        info!(signal = signal.as_str(), "[dry-run] would signal UI");
    }
}

/// Ignores every UI signal (headless callers).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoUi;

impl UiSignals for NoUi {
    fn emit(&self, signal: UiSignal) {
        debug!(signal = signal.as_str(), "UI signal dropped (no UI attached)");
    }
}

/// Collects signals in emission order.
#[derive(Debug, Default)]
pub struct RecordingUi {
    signals: Mutex<Vec<UiSignal>>,
}

impl RecordingUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signals(&self) -> Vec<UiSignal> {
        self.signals
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }
}

impl UiSignals for RecordingUi {
    fn emit(&self, signal: UiSignal) {
        if let Ok(mut signals) = self.signals.lock() {
            signals.push(signal);
        }
    }
}
