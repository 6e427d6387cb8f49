//! Palette remapping through an external shell command.
//!
//! The command reads the palette in text form on stdin and writes the
//! replacement palette, in the same form, to stdout. Both streams are
//! redirected to temporary files that are removed however the run ends, so
//! nothing blocks on the child before its deadline starts.
//!
//! Only failing to set up those temporary files is fatal. A command that can't
//! be started, exits unsuccessfully, times out, or writes nothing usable is
//! logged and leaves the palette untouched.

use std::io::Write;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tempfile::{Builder, NamedTempFile};

use crate::error::TransformError;
use crate::palette::{Color, Palette};

/// How often a child with a deadline is polled.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// An external palette filter command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalFilter {
    /// Shell command line.
    pub command: String,
    /// Kill the command after this many milliseconds. `None` waits forever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl ExternalFilter {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            timeout_ms: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(timeout.as_millis().min(u128::from(u64::MAX)) as u64);
        self
    }

    /// Run the command over `palette` and copy its output back positionally.
    ///
    /// # Errors
    ///
    /// Returns `TransformError::TempFile` if the temporary input or output
    /// file can't be created. Every other failure is logged and the palette
    /// is left as is.
    pub fn apply(&self, palette: &mut Palette) -> Result<(), TransformError> {
        self.apply_in(palette, &std::env::temp_dir())
    }

    /// [`apply`](Self::apply) with both temporary files created in `dir`.
    fn apply_in(&self, palette: &mut Palette, dir: &Path) -> Result<(), TransformError> {
        // Both files are removed on drop, on every path out of this function.
        let mut input = temp_file(dir)?;
        input
            .write_all(palette.to_text().as_bytes())
            .map_err(TransformError::TempFile)?;
        let stdin = input.reopen().map_err(TransformError::TempFile)?;

        let output = temp_file(dir)?;
        let stdout = output.reopen().map_err(TransformError::TempFile)?;

        let mut child = match shell(&self.command)
            .stdin(Stdio::from(stdin))
            .stdout(Stdio::from(stdout))
            .spawn()
        {
            Ok(child) => child,
            Err(err) => {
                tracing::error!(command = %self.command, "can't run color transformation command: {err}");
                return Ok(());
            }
        };

        match self.wait(&mut child) {
            Ok(Some(status)) if status.success() => {}
            Ok(Some(status)) => {
                tracing::error!(command = %self.command, "color transformation command failed ({status})");
                return Ok(());
            }
            Ok(None) => {
                tracing::error!(
                    command = %self.command,
                    timeout_ms = self.timeout_ms,
                    "color transformation command timed out"
                );
                return Ok(());
            }
            Err(err) => {
                tracing::error!(command = %self.command, "color transformation error: {err}");
                return Ok(());
            }
        }

        let text = match std::fs::read_to_string(output.path()) {
            Ok(text) => text,
            Err(err) => {
                tracing::error!(command = %self.command, "can't read color transformation results: {err}");
                return Ok(());
            }
        };
        if text.trim().is_empty() {
            tracing::error!(command = %self.command, "color transformation command generated no output");
            return Ok(());
        }

        match Palette::parse_text(&text) {
            Ok(result) => copy_results(palette, &result),
            Err(err) => {
                tracing::error!(command = %self.command, "malformed color transformation results: {err}");
            }
        }
        Ok(())
    }

    /// Wait for the child, killing it once the deadline passes.
    ///
    /// Returns `Ok(None)` on timeout.
    fn wait(&self, child: &mut Child) -> std::io::Result<Option<ExitStatus>> {
        let Some(timeout_ms) = self.timeout_ms else {
            return child.wait().map(Some);
        };

        let deadline = Instant::now() + Duration::from_millis(timeout_ms);
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(Some(status));
            }
            if Instant::now() >= deadline {
                // It may have exited between the poll and now.
                let _ = child.kill();
                child.wait()?;
                return Ok(None);
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }
}

fn temp_file(dir: &Path) -> Result<NamedTempFile, TransformError> {
    Builder::new()
        .prefix("animxform-palette")
        .tempfile_in(dir)
        .map_err(TransformError::TempFile)
}

/// Copy `result` over `palette` index by index, keeping the palette's size.
fn copy_results(palette: &mut Palette, result: &Palette) {
    let expected = palette.len();
    if result.len() < expected {
        tracing::warn!(
            expected,
            got = result.len(),
            "too few colors in color transformation results"
        );
    } else if result.len() > expected {
        tracing::warn!(
            expected,
            got = result.len(),
            "too many colors in color transformation results"
        );
    }

    for (slot, color) in palette.colors_mut().iter_mut().zip(result.iter()) {
        *slot = Color {
            pixel: slot.pixel,
            ..*color
        };
    }
}

#[cfg(not(windows))]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}
