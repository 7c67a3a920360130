use std::io::{BufRead, BufReader, Write};
use std::process::{Child, Command, Stdio};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::browser::driver::{FormDriver, Locator};
use crate::cli::config::DriverConfig;
use crate::error::DriverError;

/// Request sent to the browser server over stdin (one JSON line).
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BrowserRequest {
    Navigate {
        cmd: &'static str,
        url: String,
        timeout_ms: u64,
    },
    Action {
        cmd: &'static str,
        action: &'static str,
        #[serde(skip_serializing_if = "Option::is_none")]
        selector: Option<Locator>,
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        duration_ms: Option<u64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        timeout_ms: Option<u64>,
    },
    Query {
        cmd: &'static str,
        selector: Locator,
        timeout_ms: u64,
    },
    Evaluate {
        cmd: &'static str,
        script: String,
    },
    Bare {
        cmd: &'static str,
    },
}

impl BrowserRequest {
    pub fn navigate(url: &str, timeout_ms: u64) -> Self {
        BrowserRequest::Navigate {
            cmd: "navigate",
            url: url.to_string(),
            timeout_ms,
        }
    }

    fn element_action(
        action: &'static str,
        selector: &Locator,
        value: Option<&str>,
        timeout_ms: u64,
    ) -> Self {
        BrowserRequest::Action {
            cmd: "action",
            action,
            selector: Some(selector.clone()),
            value: value.map(str::to_string),
            duration_ms: None,
            timeout_ms: Some(timeout_ms),
        }
    }

    pub fn fill(selector: &Locator, value: &str, timeout_ms: u64) -> Self {
        Self::element_action("fill", selector, Some(value), timeout_ms)
    }

    pub fn clear(selector: &Locator, timeout_ms: u64) -> Self {
        Self::element_action("clear", selector, None, timeout_ms)
    }

    pub fn click(selector: &Locator, timeout_ms: u64) -> Self {
        Self::element_action("click", selector, None, timeout_ms)
    }

    pub fn select(selector: &Locator, label: &str, timeout_ms: u64) -> Self {
        Self::element_action("select", selector, Some(label), timeout_ms)
    }

    pub fn check(selector: &Locator, timeout_ms: u64) -> Self {
        Self::element_action("check", selector, None, timeout_ms)
    }

    pub fn wait(duration_ms: u64) -> Self {
        BrowserRequest::Action {
            cmd: "action",
            action: "wait",
            selector: None,
            value: None,
            duration_ms: Some(duration_ms),
            timeout_ms: None,
        }
    }

    pub fn query_visible(selector: &Locator, timeout_ms: u64) -> Self {
        BrowserRequest::Query {
            cmd: "query_visible",
            selector: selector.clone(),
            timeout_ms,
        }
    }

    pub fn query_enabled(selector: &Locator, timeout_ms: u64) -> Self {
        BrowserRequest::Query {
            cmd: "query_enabled",
            selector: selector.clone(),
            timeout_ms,
        }
    }

    pub fn evaluate(script: &str) -> Self {
        BrowserRequest::Evaluate {
            cmd: "evaluate",
            script: script.to_string(),
        }
    }

    pub fn current_url() -> Self {
        BrowserRequest::Bare { cmd: "current_url" }
    }

    pub fn quit() -> Self {
        BrowserRequest::Bare { cmd: "quit" }
    }
}

/// Response received from the browser server over stdout (one JSON line).
#[derive(Debug, Deserialize)]
pub struct BrowserResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub ready: Option<bool>,
    #[serde(default)]
    pub visible: Option<bool>,
    #[serde(default)]
    pub enabled: Option<bool>,
    /// Set when the server gave up waiting on the element / page
    #[serde(default)]
    pub timed_out: bool,
    /// Set when the locator matched no element
    #[serde(default)]
    pub not_found: bool,
}

impl BrowserResponse {
    /// Turn an `ok: false` response into the matching `DriverError`.
    pub fn into_error(self, command: &str, locator: Option<&Locator>, timeout_ms: u64) -> DriverError {
        if self.timed_out {
            return DriverError::Timeout {
                command: command.to_string(),
                ms: timeout_ms,
            };
        }
        if self.not_found {
            if let Some(loc) = locator {
                return DriverError::ElementNotFound {
                    locator: loc.to_string(),
                };
            }
        }
        DriverError::SessionProtocol {
            command: command.to_string(),
            error: self.error.unwrap_or_else(|| "Unknown error".into()),
        }
    }
}

/// A persistent browser session backed by a Node.js browser server.
///
/// Launches a long-lived process that keeps one Chromium page open.
/// Commands are sent as NDJSON over stdin, responses read from stdout.
pub struct BrowserSession {
    child: Child,
    stdin: std::process::ChildStdin,
    reader: BufReader<std::process::ChildStdout>,
    action_timeout_ms: u64,
    closed: bool,
}

impl BrowserSession {
    /// Spawn the browser server and wait for its ready line.
    pub fn launch(config: &DriverConfig) -> Result<Self, DriverError> {
        let mut command = Command::new(&config.command);
        command.arg(&config.script);
        if config.headless {
            command.arg("--headless");
        }

        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| DriverError::SubprocessSpawn {
                script: config.script.clone(),
                source: e,
            })?;

        let stdin = child.stdin.take().ok_or_else(|| {
            DriverError::SessionIO("Failed to capture stdin of browser server".into())
        })?;

        let stdout = child.stdout.take().ok_or_else(|| {
            DriverError::SessionIO("Failed to capture stdout of browser server".into())
        })?;

        let mut reader = BufReader::new(stdout);

        let mut line = String::new();
        reader
            .read_line(&mut line)
            .map_err(|e| DriverError::SessionIO(format!("Failed to read ready signal: {}", e)))?;

        let response: BrowserResponse =
            serde_json::from_str(line.trim()).map_err(|e| DriverError::JsonParse {
                context: "browser server ready signal".into(),
                source: e,
            })?;

        if !response.ok || response.ready != Some(true) {
            return Err(DriverError::SessionProtocol {
                command: "launch".into(),
                error: "Did not receive ready signal from browser server".into(),
            });
        }

        debug!(script = %config.script, "browser session ready");

        Ok(BrowserSession {
            child,
            stdin,
            reader,
            action_timeout_ms: config.action_timeout_ms,
            closed: false,
        })
    }

    /// Send a request and read the response line.
    fn send(&mut self, request: &BrowserRequest) -> Result<BrowserResponse, DriverError> {
        let json = serde_json::to_string(request).map_err(|e| DriverError::JsonSerialize {
            context: "BrowserRequest".into(),
            source: e,
        })?;

        writeln!(self.stdin, "{}", json).map_err(|e| {
            DriverError::SessionIO(format!("Failed to write to browser server stdin: {}", e))
        })?;

        self.stdin.flush().map_err(|e| {
            DriverError::SessionIO(format!("Failed to flush browser server stdin: {}", e))
        })?;

        let mut line = String::new();
        self.reader.read_line(&mut line).map_err(|e| {
            DriverError::SessionIO(format!("Failed to read from browser server stdout: {}", e))
        })?;

        if line.trim().is_empty() {
            return Err(DriverError::SessionIO(
                "Empty response from browser server (process may have died)".into(),
            ));
        }

        serde_json::from_str(line.trim()).map_err(|e| DriverError::JsonParse {
            context: "browser server response".into(),
            source: e,
        })
    }

    /// Send a request and verify it succeeded.
    fn send_ok(
        &mut self,
        request: &BrowserRequest,
        command: &str,
        locator: Option<&Locator>,
        timeout_ms: u64,
    ) -> Result<BrowserResponse, DriverError> {
        let response = self.send(request)?;
        if !response.ok {
            return Err(response.into_error(command, locator, timeout_ms));
        }
        Ok(response)
    }

    fn element_action(
        &mut self,
        request: BrowserRequest,
        command: &str,
        locator: &Locator,
    ) -> Result<(), DriverError> {
        let timeout = self.action_timeout_ms;
        self.send_ok(&request, command, Some(locator), timeout)?;
        Ok(())
    }
}

impl FormDriver for BrowserSession {
    fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<(), DriverError> {
        let request = BrowserRequest::navigate(url, timeout_ms);
        self.send_ok(&request, "navigate", None, timeout_ms)?;
        Ok(())
    }

    fn fill(&mut self, locator: &Locator, value: &str) -> Result<(), DriverError> {
        let request = BrowserRequest::fill(locator, value, self.action_timeout_ms);
        self.element_action(request, "fill", locator)
    }

    fn clear(&mut self, locator: &Locator) -> Result<(), DriverError> {
        let request = BrowserRequest::clear(locator, self.action_timeout_ms);
        self.element_action(request, "clear", locator)
    }

    fn click(&mut self, locator: &Locator) -> Result<(), DriverError> {
        let request = BrowserRequest::click(locator, self.action_timeout_ms);
        self.element_action(request, "click", locator)
    }

    fn select(&mut self, locator: &Locator, label: &str) -> Result<(), DriverError> {
        let request = BrowserRequest::select(locator, label, self.action_timeout_ms);
        self.element_action(request, "select", locator)
    }

    fn check(&mut self, locator: &Locator) -> Result<(), DriverError> {
        let request = BrowserRequest::check(locator, self.action_timeout_ms);
        self.element_action(request, "check", locator)
    }

    fn current_url(&mut self) -> Result<String, DriverError> {
        let request = BrowserRequest::current_url();
        let response = self.send_ok(&request, "current_url", None, 0)?;
        response.url.ok_or_else(|| DriverError::SessionProtocol {
            command: "current_url".into(),
            error: "No URL in current_url response".into(),
        })
    }

    fn is_visible(&mut self, locator: &Locator) -> Result<bool, DriverError> {
        let timeout = self.action_timeout_ms;
        let request = BrowserRequest::query_visible(locator, timeout);
        let response = self.send_ok(&request, "query_visible", Some(locator), timeout)?;
        Ok(response.visible.unwrap_or(false))
    }

    fn is_enabled(&mut self, locator: &Locator) -> Result<bool, DriverError> {
        let timeout = self.action_timeout_ms;
        let request = BrowserRequest::query_enabled(locator, timeout);
        let response = self.send_ok(&request, "query_enabled", Some(locator), timeout)?;
        response.enabled.ok_or_else(|| DriverError::SessionProtocol {
            command: "query_enabled".into(),
            error: "No enabled flag in response".into(),
        })
    }

    fn evaluate(&mut self, script: &str) -> Result<Value, DriverError> {
        let request = BrowserRequest::evaluate(script);
        let timeout = self.action_timeout_ms;
        let response = self.send_ok(&request, "evaluate", None, timeout)?;
        response.data.ok_or_else(|| DriverError::SessionProtocol {
            command: "evaluate".into(),
            error: "No data in evaluate response".into(),
        })
    }

    fn wait(&mut self, ms: u64) -> Result<(), DriverError> {
        let request = BrowserRequest::wait(ms);
        self.send_ok(&request, "wait", None, ms)?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), DriverError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        // The process may already be gone
        if let Err(e) = self.send(&BrowserRequest::quit()) {
            warn!(error = %e, "browser server did not acknowledge quit");
        }
        let _ = self.child.wait();
        Ok(())
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
