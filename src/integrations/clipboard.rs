use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::io::Write;
use std::process::Stdio;
use std::sync::{Mutex, PoisonError};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::{
    config::Config,
    error::{AppError, Result},
};

/// Primary, asynchronous clipboard.
#[async_trait::async_trait]
pub trait Clipboard: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<()>;
}

/// Synchronous copy path used when the primary clipboard fails.
pub trait FallbackClipboard: Send + Sync {
    fn copy_text(&self, text: &str) -> Result<()>;
}

/// Pipes text into an external program such as `wl-copy` or `xclip -selection clipboard`.
#[derive(Debug, Clone)]
pub struct CommandClipboard {
    program: String,
    args: Vec<String>,
}

impl CommandClipboard {
    pub fn from_command_line(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }
}

#[async_trait::async_trait]
impl Clipboard for CommandClipboard {
    async fn write_text(&self, text: &str) -> Result<()> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| AppError::Clipboard(format!("cannot start {}: {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .await
                .map_err(|e| AppError::Clipboard(format!("write to {} failed: {}", self.program, e)))?;
        }

        let status = child
            .wait()
            .await
            .map_err(|e| AppError::Clipboard(e.to_string()))?;
        if !status.success() {
            return Err(AppError::Clipboard(format!(
                "{} exited with {}",
                self.program, status
            )));
        }
        Ok(())
    }
}

/// Stand-in when no clipboard command is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedClipboard;

#[async_trait::async_trait]
impl Clipboard for UnsupportedClipboard {
    async fn write_text(&self, _text: &str) -> Result<()> {
        Err(AppError::Clipboard("clipboard API unavailable".to_string()))
    }
}

pub fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text))
}

/// Asks the terminal to set its clipboard via an OSC 52 escape sequence.
pub struct Osc52Clipboard {
    out: Mutex<Box<dyn Write + Send>>,
}

impl Osc52Clipboard {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }
}

impl FallbackClipboard for Osc52Clipboard {
    fn copy_text(&self, text: &str) -> Result<()> {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        out.write_all(osc52_sequence(text).as_bytes())
            .and_then(|_| out.flush())
            .map_err(|e| AppError::Clipboard(format!("terminal copy failed: {}", e)))
    }
}

pub fn clipboard_from_config(config: &Config) -> Box<dyn Clipboard> {
    match config
        .clipboard_command
        .as_deref()
        .and_then(CommandClipboard::from_command_line)
    {
        Some(clipboard) => Box::new(clipboard),
        None => Box::new(UnsupportedClipboard),
    }
}
