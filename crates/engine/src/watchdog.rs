// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Watchdog: reconcile declared session state with the real world.
//!
//! Tier 0 is mechanical: poll tmux liveness and activity age, decide one
//! of {ok, escalate, terminate, investigate} per session, write the
//! reconciled state back, and nudge stalled agents. Tier 1 optionally
//! mails fleet summaries to the coordinator. Tier 2 (the LLM monitor
//! agent) is driven from the CLI through the spawn pipeline.

use crate::error::EngineError;
use overstory_adapters::SessionAdapter;
use overstory_core::{AgentSession, AgentState, Clock, MessageType, Priority};
use overstory_store::{MailStore, NewMessage, SessionStore};
use std::collections::HashMap;
use std::path::Path;

/// Decision for one session in one pass. Priority when thresholds
/// straddle: terminate > escalate > investigate > ok.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchAction {
    Ok,
    Escalate,
    Terminate,
    Investigate,
}

impl WatchAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            WatchAction::Ok => "ok",
            WatchAction::Escalate => "escalate",
            WatchAction::Terminate => "terminate",
            WatchAction::Investigate => "investigate",
        }
    }
}

/// Outcome of checking one session, for the foreground renderer.
#[derive(Debug, Clone)]
pub struct HealthCheck {
    pub agent_name: String,
    /// State after reconciliation.
    pub state: AgentState,
    pub tmux_alive: bool,
    pub pid_alive: Option<bool>,
    pub action: WatchAction,
    pub note: Option<String>,
}

/// Thresholds for one watchdog instance.
#[derive(Debug, Clone)]
pub struct WatchdogConfig {
    pub poll_interval_ms: u64,
    pub stale_threshold_ms: u64,
    pub zombie_threshold_ms: u64,
    pub nudge_interval_ms: u64,
    /// Tier 1: mail fleet summaries to the coordinator each pass.
    pub coordinator_summaries: bool,
}

/// Pure decision function. `elapsed` is measured from `last_activity`.
pub fn decide(
    config: &WatchdogConfig,
    session: &AgentSession,
    tmux_alive: bool,
    now_ms: i64,
) -> WatchAction {
    let elapsed = now_ms.saturating_sub(session.last_activity).max(0) as u64;
    if !tmux_alive {
        if elapsed > config.zombie_threshold_ms {
            WatchAction::Terminate
        } else {
            WatchAction::Investigate
        }
    } else if elapsed > config.stale_threshold_ms {
        WatchAction::Escalate
    } else {
        WatchAction::Ok
    }
}

/// Tier 0/1 watchdog loop state.
pub struct Watchdog<S, C> {
    config: WatchdogConfig,
    session_adapter: S,
    clock: C,
    /// Last nudge per agent, to rate-limit to one per `nudge_interval_ms`.
    /// Lives only as long as this process; a restart just re-nudges early.
    last_nudge: HashMap<String, i64>,
}

impl<S: SessionAdapter, C: Clock> Watchdog<S, C> {
    pub fn new(config: WatchdogConfig, session_adapter: S, clock: C) -> Self {
        Self {
            config,
            session_adapter,
            clock,
            last_nudge: HashMap::new(),
        }
    }

    /// One reconciliation pass over every non-terminal session.
    pub async fn run_once(
        &mut self,
        sessions: &SessionStore,
        mail: &MailStore,
    ) -> Result<Vec<HealthCheck>, EngineError> {
        let now_ms = self.clock.now_ms();
        let mut checks = Vec::new();

        for session in sessions.get_active()? {
            let tmux_alive = self
                .session_adapter
                .is_alive(&session.tmux_session)
                .await
                .unwrap_or(false);
            let pid_alive = session.pid.and_then(pid_alive);
            let action = decide(&self.config, &session, tmux_alive, now_ms);

            let check = match action {
                WatchAction::Terminate => {
                    sessions.update_state(&session.name, AgentState::Zombie)?;
                    // best-effort: the session is already gone, but a stray
                    // pane under the same name must not linger
                    let _ = self.session_adapter.kill(&session.tmux_session).await;
                    HealthCheck {
                        agent_name: session.name.clone(),
                        state: AgentState::Zombie,
                        tmux_alive,
                        pid_alive,
                        action,
                        note: Some(format!(
                            "multiplexer dead past zombie threshold; was {}",
                            session.state
                        )),
                    }
                }
                WatchAction::Escalate => {
                    let level = session.escalation_level + 1;
                    let stalled_since = session.stalled_since.or(Some(now_ms));
                    if session.state != AgentState::Stalled {
                        sessions.update_state(&session.name, AgentState::Stalled)?;
                    }
                    sessions.update_escalation(&session.name, level, stalled_since)?;
                    let nudged = self.maybe_nudge(mail, &session, level, now_ms).await;
                    HealthCheck {
                        agent_name: session.name.clone(),
                        state: AgentState::Stalled,
                        tmux_alive,
                        pid_alive,
                        action,
                        note: nudged.then(|| format!("nudged at level {level}")),
                    }
                }
                WatchAction::Investigate => HealthCheck {
                    agent_name: session.name.clone(),
                    state: session.state,
                    tmux_alive,
                    pid_alive,
                    action,
                    note: Some("multiplexer dead but within zombie threshold".into()),
                },
                WatchAction::Ok => {
                    let mut state = session.state;
                    if session.state == AgentState::Stalled {
                        sessions.update_state(&session.name, AgentState::Working)?;
                        state = AgentState::Working;
                    }
                    if session.escalation_level != 0 || session.stalled_since.is_some() {
                        sessions.update_escalation(&session.name, 0, None)?;
                        self.last_nudge.remove(&session.name);
                    }
                    HealthCheck {
                        agent_name: session.name.clone(),
                        state,
                        tmux_alive,
                        pid_alive,
                        action,
                        note: None,
                    }
                }
            };
            checks.push(check);
        }

        if self.config.coordinator_summaries {
            self.send_summary(mail, &checks, now_ms)?;
        }
        Ok(checks)
    }

    /// Nudge if the rate limit allows. Returns whether a nudge went out.
    async fn maybe_nudge(
        &mut self,
        mail: &MailStore,
        session: &AgentSession,
        level: u32,
        now_ms: i64,
    ) -> bool {
        if level < 1 {
            return false;
        }
        if let Some(last) = self.last_nudge.get(&session.name) {
            if now_ms.saturating_sub(*last) < self.config.nudge_interval_ms as i64 {
                return false;
            }
        }

        let text = nudge_text(&session.name, &session.task_id, level);
        match self
            .session_adapter
            .send_literal(&session.tmux_session, &text)
            .await
        {
            Ok(()) => {
                let _ = self.session_adapter.send_enter(&session.tmux_session).await;
            }
            Err(e) => {
                tracing::warn!(agent = %session.name, error = %e, "nudge delivery failed (non-fatal)");
            }
        }

        if let Err(e) = mail.send(
            NewMessage {
                from: "system".into(),
                to: session.name.clone(),
                subject: format!("nudge (level {level})"),
                body: text,
                message_type: Some(MessageType::Status),
                priority: Some(Priority::High),
                ..NewMessage::default()
            },
            now_ms,
        ) {
            tracing::warn!(agent = %session.name, error = %e, "nudge mail failed (non-fatal)");
        }

        self.last_nudge.insert(session.name.clone(), now_ms);
        true
    }

    /// Tier 1: one fleet-health mail to the coordinator per pass.
    fn send_summary(
        &self,
        mail: &MailStore,
        checks: &[HealthCheck],
        now_ms: i64,
    ) -> Result<(), EngineError> {
        if checks.is_empty() {
            return Ok(());
        }
        let mut lines = Vec::new();
        for check in checks {
            lines.push(format!(
                "{}: {} ({}, tmux {})",
                check.agent_name,
                check.state,
                check.action.as_str(),
                if check.tmux_alive { "alive" } else { "dead" }
            ));
        }
        mail.send(
            NewMessage {
                from: "system".into(),
                to: "coordinator".into(),
                subject: "fleet health".into(),
                body: lines.join("\n"),
                message_type: Some(MessageType::Status),
                priority: Some(Priority::Low),
                ..NewMessage::default()
            },
            now_ms,
        )?;
        Ok(())
    }
}

fn nudge_text(agent: &str, task_id: &str, level: u32) -> String {
    format!(
        "[OVERSTORY nudge {level}] {agent}: no activity observed. \
         If you are stuck, mail your parent. Otherwise resume task {task} \
         and emit progress.",
        task = if task_id.is_empty() { "(none)" } else { task_id },
    )
}

/// Liveness of a pid; `None` when the platform gives no cheap answer.
pub fn pid_alive(pid: u32) -> Option<bool> {
    if cfg!(target_os = "linux") {
        Some(Path::new(&format!("/proc/{pid}")).exists())
    } else {
        None
    }
}

/// Write the daemon PID file; refuses when another live watchdog owns it.
pub fn write_pid_file(path: &Path, pid: u32) -> Result<(), EngineError> {
    if let Some(existing) = read_pid_file(path) {
        if pid_alive(existing).unwrap_or(false) {
            return Err(EngineError::Validation(format!(
                "watchdog already running with pid {existing} (pid file {})",
                path.display()
            )));
        }
        tracing::warn!(pid = existing, "removing stale watchdog pid file");
    }
    std::fs::write(path, format!("{pid}\n"))
        .map_err(|e| EngineError::Generic(format!("failed to write {}: {e}", path.display())))
}

pub fn read_pid_file(path: &Path) -> Option<u32> {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|text| text.trim().parse().ok())
}

pub fn remove_pid_file(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove pid file");
        }
    }
}

#[cfg(test)]
#[path = "watchdog_tests.rs"]
mod tests;
