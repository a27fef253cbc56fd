//! rline: a small REPL around the line editor.
use anyhow::Result;
use clap::Parser;
use core_actions::{LineEditor, ReadlineError};
use core_config::load_from;
use core_input::KeyStream;
use core_render::LineRenderer;
use core_state::{Completer, MemoryHistory};
use core_terminal::{RawModeBackend, StdioDevice, TerminalCapabilities};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;

mod editor;

use editor::SystemEditor;

const PROMPT: &str = "rline> ";
const LOG_FILE: &str = "rline.log";
const COMMANDS: &[&str] = &["exit", "help", "quit"];

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "rline", version, about = "Interactive line editor demo")]
struct Args {
    /// Configuration file path (overrides discovery of `rline.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Start in vi mode regardless of the configured editing style.
    #[arg(long)]
    pub vi: bool,
}

/// Completes the REPL's built-in commands in first position.
struct CommandCompleter;

impl Completer for CommandCompleter {
    fn candidates(&mut self, line: &str, _cursor: usize, prefix: &str) -> Vec<String> {
        if line.trim_start() != prefix {
            return Vec::new();
        }
        COMMANDS
            .iter()
            .filter(|c| c.starts_with(prefix))
            .map(|c| c.to_string())
            .collect()
    }
}

fn configure_logging() -> Option<WorkerGuard> {
    let log_dir = Path::new(".");
    let log_path = log_dir.join(LOG_FILE);
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .with_ansi(false)
        .try_init()
    {
        Ok(_) => Some(guard),
        // Global subscriber already installed; dropping the guard stops the writer.
        Err(_) => None,
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

/// Write REPL output; raw mode needs explicit carriage returns.
fn say(text: &str) -> Result<()> {
    let mut out = std::io::stdout().lock();
    for line in text.lines() {
        write!(out, "{line}\r\n")?;
    }
    out.flush()?;
    Ok(())
}

fn repl(editor: &mut LineEditor) -> Result<()> {
    loop {
        match editor.read_line() {
            Ok(line) => match line.trim() {
                "" => {}
                "exit" | "quit" => break,
                "help" => say("type a line to echo it back; `exit` or Ctrl-D leaves")?,
                other => say(&format!("=> {other}"))?,
            },
            Err(ReadlineError::Interrupted { line }) => {
                info!(target: "runtime", len = line.len(), "interrupted");
                say("^C")?;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                error!(target: "runtime", error = %e, "read_line_failed");
                return Err(e.into());
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let _log_guard = configure_logging();
    install_panic_hook();
    info!(target: "runtime", "startup");

    let args = Args::parse();
    let mut config = load_from(args.config.clone())?.with_style_override(args.vi);
    let caps = TerminalCapabilities::detect();
    info!(
        target: "runtime.startup",
        interactive = caps.interactive,
        columns = caps.columns,
        config_override = args.config.is_some(),
        vi = args.vi,
        "bootstrap_complete"
    );

    if !caps.interactive {
        config.file.input.cursor_query = false;
    }

    let mut backend = RawModeBackend::new();
    let _guard = if caps.interactive {
        Some(backend.enter_guard()?)
    } else {
        None
    };

    let stream = Arc::new(KeyStream::new(StdioDevice));
    let renderer = LineRenderer::new(std::io::stdout(), PROMPT).with_columns(caps.columns);
    let mut editor = LineEditor::new(
        stream,
        &config,
        Box::new(renderer),
        Box::new(MemoryHistory::new()),
    )
    .with_completer(Box::new(CommandCompleter))
    .with_editor(Box::new(SystemEditor::from_env(caps.interactive)));

    let result = repl(&mut editor);
    info!(target: "runtime", "shutdown");
    result
}
