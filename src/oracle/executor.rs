//! Execution-based oracle using the system Python interpreter
//!
//! Every check spawns a fresh interpreter that reads the unit from stdin and
//! runs `exec(source, {})`. Nothing survives between checks: not the
//! namespace, not imported modules, not the process.

use std::io::Write;
use std::process::{Child, Command, Output, Stdio};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::{Error, Result};

use super::{ExecutabilityCheck, Verdict};

/// Exit status the driver uses when the unit evaluated cleanly
const CLEAN_EXIT: i32 = 10;

/// Exit status the driver uses when the unit raised
const BUGGY_EXIT: i32 = 11;

/// Longest exception summary kept in a verdict
const MAX_ERROR_BYTES: usize = 512;

/// How often a timed evaluation polls for exit
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Driver run with `-c` to evaluate a unit. Any `BaseException` counts as a
/// failure, including `SystemExit`. Always leaves through `os._exit`.
const EXEC_DRIVER: &str = r#"import os, sys
_source = sys.stdin.buffer.read()
try:
    exec(compile(_source, '<unit>', 'exec'), {})
except BaseException as _exc:
    try:
        _detail = '%s: %s' % (type(_exc).__name__, _exc)
    except BaseException:
        _detail = type(_exc).__name__
    try:
        sys.__stderr__.write(_detail + '\n')
        sys.__stderr__.flush()
    finally:
        os._exit(11)
os._exit(10)
"#;

/// Driver run with `-c` to parse a whole file without running it.
/// Same exit protocol as [`EXEC_DRIVER`].
const PARSE_DRIVER: &str = r#"import ast, os, sys
try:
    ast.parse(sys.stdin.buffer.read())
except BaseException as _exc:
    try:
        _detail = '%s: %s' % (type(_exc).__name__, _exc)
    except BaseException:
        _detail = type(_exc).__name__
    try:
        sys.__stderr__.write(_detail + '\n')
        sys.__stderr__.flush()
    finally:
        os._exit(11)
os._exit(10)
"#;

/// Configuration for [`PythonOracle`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleConfig {
    /// Interpreter to spawn (default: `python3`)
    pub interpreter: String,
    /// Kill the interpreter after this many milliseconds.
    /// `None` waits forever.
    pub timeout_ms: Option<u64>,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            interpreter: "python3".to_string(),
            timeout_ms: None,
        }
    }
}

/// Oracle that evaluates units in a fresh Python process
#[derive(Debug, Clone, Default)]
pub struct PythonOracle {
    config: OracleConfig,
}

impl PythonOracle {
    /// Create an oracle using `python3` and no timeout
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an oracle from explicit configuration
    #[must_use]
    pub fn with_config(config: OracleConfig) -> Self {
        Self { config }
    }

    /// Use a different interpreter
    #[must_use]
    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.config.interpreter = interpreter.into();
        self
    }

    /// Kill evaluations that run longer than `timeout_ms`
    #[must_use]
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.config.timeout_ms = Some(timeout_ms);
        self
    }

    /// Current configuration
    #[must_use]
    pub fn config(&self) -> &OracleConfig {
        &self.config
    }

    /// Check if the interpreter can be spawned
    #[must_use]
    pub fn is_available(&self) -> bool {
        Command::new(&self.config.interpreter)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|status| status.success())
    }

    fn spawn(&self, driver: &str) -> Result<Child> {
        Command::new(&self.config.interpreter)
            .arg("-I") // isolated: no user site, no PYTHON* env vars, no cwd on sys.path
            .arg("-c")
            .arg(driver)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                Error::Oracle(format!(
                    "failed to spawn {}: {e}",
                    self.config.interpreter
                ))
            })
    }

    /// Feed `code` to a fresh interpreter running `driver`
    ///
    /// Returns `Ok(None)` when the configured timeout elapsed.
    fn run_driver(&self, driver: &str, code: &str) -> Result<Option<Output>> {
        let mut child = self.spawn(driver)?;

        if let Some(mut stdin) = child.stdin.take() {
            // A unit that closes stdin early still gets a verdict from its exit status.
            let _ = stdin.write_all(code.as_bytes());
        }

        match self.config.timeout_ms {
            None => child
                .wait_with_output()
                .map(Some)
                .map_err(|e| Error::Oracle(format!("wait error: {e}"))),
            Some(limit_ms) => wait_with_timeout(child, Duration::from_millis(limit_ms)),
        }
    }

    fn timeout_ms(&self) -> u64 {
        self.config.timeout_ms.unwrap_or_default()
    }
}

impl ExecutabilityCheck for PythonOracle {
    fn check(&self, code: &str) -> Result<Verdict> {
        let start = Instant::now();
        let Some(output) = self.run_driver(EXEC_DRIVER, code)? else {
            return Ok(Verdict::Indeterminate {
                reason: format!("evaluation timed out after {}ms", self.timeout_ms()),
            });
        };

        let verdict = verdict_from_output(&output);
        debug!(
            elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            clean = verdict.is_clean(),
            "oracle evaluation finished"
        );
        Ok(verdict)
    }

    /// Parse with the interpreter's own `ast.parse`
    ///
    /// This rejects text tree-sitter tolerates, such as Python 2 `print`
    /// statements and inconsistent tab/space indentation.
    fn syntax_error(&self, source: &str) -> Result<Option<String>> {
        let Some(output) = self.run_driver(PARSE_DRIVER, source)? else {
            return Err(Error::Oracle(format!(
                "parse check timed out after {}ms",
                self.timeout_ms()
            )));
        };
        match verdict_from_output(&output) {
            Verdict::Clean => Ok(None),
            Verdict::Buggy { error } => Ok(Some(error)),
            Verdict::Indeterminate { reason } => {
                Err(Error::Oracle(format!("parse check failed: {reason}")))
            }
        }
    }

    fn name(&self) -> &'static str {
        "python"
    }
}

fn verdict_from_output(output: &Output) -> Verdict {
    match output.status.code() {
        Some(CLEAN_EXIT) => Verdict::Clean,
        Some(BUGGY_EXIT) => Verdict::Buggy {
            error: last_line(&output.stderr),
        },
        Some(code) => Verdict::Indeterminate {
            reason: format!("interpreter exited with status {code}"),
        },
        None => Verdict::Indeterminate {
            reason: "interpreter terminated by signal".to_string(),
        },
    }
}

/// Last non-empty stderr line, capped at [`MAX_ERROR_BYTES`]
fn last_line(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let line = text
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .unwrap_or("")
        .trim();
    if line.len() <= MAX_ERROR_BYTES {
        return line.to_string();
    }
    let mut cut = MAX_ERROR_BYTES;
    while !line.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &line[..cut])
}

/// Wait for a process, killing it once `timeout` elapses
///
/// Returns `Ok(None)` on timeout.
fn wait_with_timeout(mut child: Child, timeout: Duration) -> Result<Option<Output>> {
    use std::io::Read;
    use std::thread;

    let stderr_handle = child.stderr.take();
    let stderr_thread = thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut stderr) = stderr_handle {
            let _ = stderr.read_to_end(&mut buf);
        }
        buf
    });

    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                let stderr = stderr_thread.join().unwrap_or_default();
                return Ok(Some(Output {
                    status,
                    stdout: Vec::new(),
                    stderr,
                }));
            }
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait(); // reap
                // Grandchildren may still hold stderr open; the reader is left detached.
                drop(stderr_thread);
                return Ok(None);
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(Error::Oracle(format!("wait error: {e}")));
            }
        }
    }
}
