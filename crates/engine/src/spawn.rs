// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The spawn pipeline: from a task id to a running, addressable agent.
//!
//! Deterministic order: validate → resolve run → acquire the logical
//! session slot → stagger → tracker check → worktree → overlay → hook
//! guards → claim → identity → tmux → record session → ready poll →
//! beacon. Failures after the worktree exists roll it back, up to (but not
//! including) session recording; after that the operator owns cleanup.

use crate::beacon;
use crate::error::EngineError;
use crate::hooks;
use crate::identity;
use crate::overlay::{self, OverlayContext};
use crate::runs::resolve_current_run;
use crate::stagger::calculate_stagger_delay;
use crate::worktrees::WorktreeManager;
use overstory_adapters::{
    run_with_timeout, GitAdapter, MulchAdapter, SessionAdapter, TrackerAdapter,
};
use overstory_core::{
    iso_utc, AgentSession, AgentState, Capability, Clock, Config, Manifest, OverstoryPaths, RunId,
};
use overstory_store::{EventStore, SessionStore};
use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command;

/// Bounded TUI-ready poll.
const TUI_READY_ATTEMPTS: u32 = 30;
const TUI_READY_INTERVAL: Duration = Duration::from_secs(1);
/// Extra settle time after the marker shows up.
const TUI_READY_BUFFER: Duration = Duration::from_secs(2);

/// Caller's spawn parameters.
#[derive(Debug, Clone)]
pub struct SpawnRequest {
    pub task_id: String,
    pub capability: Capability,
    pub name: String,
    pub parent: Option<String>,
    pub depth: u32,
    pub file_scope: Vec<String>,
    pub spec_path: Option<PathBuf>,
    /// Skip the tracker issue-state validation.
    pub skip_tracker_check: bool,
    /// Emergency bypass for the parentless-must-be-lead rule.
    pub bypass_hierarchy: bool,
    /// Waive the builder-needs-a-scout convention for this spawn.
    pub skip_scout: bool,
    pub quality_gates: Vec<String>,
    /// Permit spawning as uid 0 (containers); the supervised LLM binary
    /// normally refuses elevated privilege and exits silently.
    pub allow_root: bool,
}

impl SpawnRequest {
    pub fn new(task_id: impl Into<String>, capability: Capability, name: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            capability,
            name: name.into(),
            parent: None,
            depth: 0,
            file_scope: Vec::new(),
            spec_path: None,
            skip_tracker_check: false,
            bypass_hierarchy: false,
            skip_scout: false,
            quality_gates: Vec::new(),
            allow_root: false,
        }
    }
}

/// Everything the pipeline touches, injected so tests run against fakes.
pub struct SpawnDeps<'a, S, G, T, M, C> {
    pub config: &'a Config,
    pub manifest: &'a Manifest,
    pub paths: &'a OverstoryPaths,
    pub sessions: &'a SessionStore,
    pub events: &'a EventStore,
    pub session_adapter: &'a S,
    pub git: &'a G,
    pub tracker: &'a T,
    pub mulch: &'a M,
    pub clock: &'a C,
}

/// What the operator gets back.
#[derive(Debug, Clone)]
pub struct SpawnOutcome {
    pub agent: String,
    pub capability: Capability,
    pub task_id: String,
    pub branch: String,
    pub worktree_path: PathBuf,
    pub tmux_session: String,
    pub run_id: RunId,
    pub pid: Option<u32>,
    pub tui_ready: bool,
    /// Non-blocking structural warnings for stderr.
    pub warnings: Vec<String>,
}

/// Run the full pipeline.
pub async fn spawn<S, G, T, M, C>(
    request: &SpawnRequest,
    deps: &SpawnDeps<'_, S, G, T, M, C>,
) -> Result<SpawnOutcome, EngineError>
where
    S: SessionAdapter,
    G: GitAdapter,
    T: TrackerAdapter,
    M: MulchAdapter,
    C: Clock,
{
    let mut warnings = Vec::new();
    validate_request(request, deps).await?;

    let capability_spec = deps
        .manifest
        .get(request.capability)
        .ok_or_else(|| {
            EngineError::Validation(format!(
                "capability {} is not in the agent manifest",
                request.capability
            ))
        })?
        .clone();

    let now_ms = deps.clock.now_ms();
    let run_id = resolve_current_run(deps.paths, deps.sessions, now_ms)?;

    // logical session slot: concurrency, per-run limit, name uniqueness
    // (validated above), bead-lock
    let active = deps.sessions.get_active()?;
    if active.len() as u32 >= deps.config.max_concurrent {
        return Err(EngineError::Validation(format!(
            "max concurrent sessions reached ({})",
            deps.config.max_concurrent
        )));
    }
    if deps.config.max_sessions_per_run > 0 {
        let in_run = deps.sessions.get_by_run(&run_id)?.len() as u32;
        if in_run >= deps.config.max_sessions_per_run {
            return Err(EngineError::Validation(format!(
                "run {run_id} already has {in_run} sessions (limit {})",
                deps.config.max_sessions_per_run
            )));
        }
    }
    check_bead_lock(request, &active)?;

    if request.capability == Capability::Builder && !request.skip_scout {
        if let Some(parent) = &request.parent {
            let has_scout = deps
                .sessions
                .get_all()?
                .iter()
                .any(|s| s.capability == Capability::Scout && s.parent_agent.as_deref() == Some(parent));
            if !has_scout {
                warnings.push(format!(
                    "parent {parent} has never spawned a scout; builders work better on scouted ground"
                ));
            }
        }
    }

    // stagger: space session starts apart
    let stagger_ms = calculate_stagger_delay(deps.config.stagger_delay_ms, &active, now_ms);
    if stagger_ms > 0 {
        tracing::debug!(agent = %request.name, stagger_ms, "staggering spawn");
        tokio::time::sleep(Duration::from_millis(stagger_ms)).await;
    }

    if !request.skip_tracker_check && request.capability.requires_task() {
        let issue = deps.tracker.get_issue(&request.task_id).await?;
        match issue {
            None => {
                return Err(EngineError::Tracker(
                    overstory_adapters::TrackerError::CommandFailed(format!(
                        "task {} not found in tracker",
                        request.task_id
                    )),
                ));
            }
            Some(issue) if !issue.is_open() => {
                return Err(EngineError::Tracker(
                    overstory_adapters::TrackerError::CommandFailed(format!(
                        "task {} has status {}, expected open or in_progress",
                        request.task_id, issue.status
                    )),
                ));
            }
            Some(_) => {}
        }
    }

    // worktree + branch; coordinator/monitor stay pinned to the project root
    let manager = WorktreeManager::new(
        deps.git.clone(),
        deps.paths.clone(),
        deps.config.canonical_branch.clone(),
    );
    let (worktree_path, branch) = if request.capability.requires_task() {
        manager
            .create(&request.name, &request.task_id)
            .await
            .map_err(|e| EngineError::for_agent(&request.name, e))?
    } else {
        (deps.paths.project_root().to_path_buf(), String::new())
    };
    let created_worktree = request.capability.requires_task();

    // everything from here to session recording rolls the worktree back
    let result = prepare_and_launch(
        request,
        deps,
        &capability_spec,
        &worktree_path,
        &branch,
        &mut warnings,
    )
    .await;
    let (tmux_session, pid) = match result {
        Ok(v) => v,
        Err(e) => {
            if created_worktree {
                manager.rollback(&worktree_path, &branch).await;
            }
            return Err(e);
        }
    };

    // record the session before anything can emit a hook event against it
    let now_ms = deps.clock.now_ms();
    let session = AgentSession {
        id: uuid::Uuid::new_v4().to_string(),
        name: request.name.clone(),
        capability: request.capability,
        state: AgentState::Booting,
        task_id: request.task_id.clone(),
        branch: branch.clone(),
        worktree_path: worktree_path.clone(),
        tmux_session: tmux_session.clone(),
        pid,
        run_id: Some(run_id.clone()),
        parent_agent: request.parent.clone(),
        depth: request.depth,
        last_activity: now_ms,
        escalation_level: 0,
        stalled_since: None,
        created_at: now_ms,
    };
    if let Err(e) = deps.sessions.upsert(&session) {
        // the live tmux session is left for the operator to inspect
        if created_worktree {
            manager.rollback(&worktree_path, &branch).await;
        }
        return Err(EngineError::for_agent(&request.name, e));
    }
    deps.sessions.increment_agent_count(&run_id)?;

    if let Err(e) = deps.events.append(
        &overstory_core::NewEvent {
            run_id: Some(run_id.to_string()),
            agent_name: request.name.clone(),
            event_type: Some(overstory_core::EventType::Spawn),
            data: Some(format!("capability={} task={}", request.capability, request.task_id)),
            ..overstory_core::NewEvent::default()
        },
        now_ms,
    ) {
        tracing::warn!(agent = %request.name, error = %e, "spawn event insert failed (non-fatal)");
    }

    // wait for the TUI, then hand over the beacon
    let tui_ready = beacon::wait_for_tui_ready(
        deps.session_adapter,
        &tmux_session,
        &deps.config.tui_ready_marker,
        TUI_READY_ATTEMPTS,
        TUI_READY_INTERVAL,
    )
    .await;
    if tui_ready {
        tokio::time::sleep(TUI_READY_BUFFER).await;
    } else {
        warnings.push(format!(
            "TUI ready marker {:?} not observed; sending beacon anyway",
            deps.config.tui_ready_marker
        ));
    }

    let text = beacon::beacon_text(
        &request.name,
        request.capability,
        &iso_utc(deps.clock.now_ms()),
        &request.task_id,
        request.depth,
        request.parent.as_deref(),
    );
    if let Err(e) = beacon::send_beacon(deps.session_adapter, &tmux_session, &text).await {
        // the agent is up; losing the beacon is not fatal, the overlay
        // carries the same protocol
        tracing::warn!(agent = %request.name, error = %e, "beacon delivery failed (non-fatal)");
        warnings.push(format!("beacon delivery failed: {e}"));
    }

    Ok(SpawnOutcome {
        agent: request.name.clone(),
        capability: request.capability,
        task_id: request.task_id.clone(),
        branch,
        worktree_path,
        tmux_session,
        run_id,
        pid,
        tui_ready,
        warnings,
    })
}

/// Steps between worktree creation and session recording; any error here
/// triggers worktree rollback in the caller.
async fn prepare_and_launch<S, G, T, M, C>(
    request: &SpawnRequest,
    deps: &SpawnDeps<'_, S, G, T, M, C>,
    capability_spec: &overstory_core::CapabilitySpec,
    worktree_path: &std::path::Path,
    branch: &str,
    warnings: &mut Vec<String>,
) -> Result<(String, Option<u32>), EngineError>
where
    S: SessionAdapter,
    G: GitAdapter,
    T: TrackerAdapter,
    M: MulchAdapter,
    C: Clock,
{
    let agent = &request.name;

    // overlay document
    let domain_tags = overlay::infer_domains(&request.file_scope);
    let knowledge = deps.mulch.extract(&domain_tags).await;
    let ctx = OverlayContext {
        agent_name: agent.clone(),
        capability: request.capability,
        task_id: request.task_id.clone(),
        spec_path: request.spec_path.clone(),
        branch: branch.to_string(),
        worktree_path: worktree_path.to_path_buf(),
        file_scope: request.file_scope.clone(),
        domain_tags,
        parent: request.parent.clone(),
        depth: request.depth,
        can_spawn: capability_spec.can_spawn,
        definition: capability_spec.definition.clone(),
        knowledge,
        skip_scout: request.skip_scout,
        quality_gates: request.quality_gates.clone(),
        tracker_cmd: deps.config.tracker_cmd.clone(),
    };
    overlay::deploy(&ctx)?;

    // hook guards into the same sandbox dir
    let guards = hooks::build_guards(
        agent,
        request.capability,
        &deps.config.tracker_cmd,
        &deps.config.mulch_cmd,
    );
    hooks::deploy(&worktree_path.join(".claude"), &guards)
        .map_err(|e| EngineError::for_agent(agent, e))?;

    // tracker claim is best-effort; duplicate claims are ignored
    if request.capability.requires_task() {
        if let Err(e) = deps.tracker.claim(&request.task_id, agent).await {
            tracing::warn!(agent = %agent, error = %e, "tracker claim failed (non-fatal)");
            warnings.push(format!("tracker claim failed: {e}"));
        }
    }

    identity::ensure(
        deps.paths,
        agent,
        request.capability,
        &iso_utc(deps.clock.now_ms()),
    )?;

    deps.session_adapter
        .preflight()
        .await
        .map_err(|e| EngineError::for_agent(agent, e))?;

    let project = deps.config.project_name(deps.paths.project_root());
    let tmux_session = format!("overstory-{project}-{agent}");

    let mut env = vec![
        ("OVERSTORY_AGENT_NAME".to_string(), agent.clone()),
        (
            "OVERSTORY_WORKTREE_PATH".to_string(),
            worktree_path.to_string_lossy().into_owned(),
        ),
    ];
    for (key, value) in &capability_spec.env {
        env.push((key.clone(), value.clone()));
    }

    let model = capability_spec
        .model
        .as_deref()
        .or_else(|| deps.config.model_for(request.capability));
    let mut cmd = deps.config.agent_cmd.clone();
    if let Some(model) = model {
        cmd.push_str(&format!(" --model {model}"));
    }
    cmd.push_str(&format!(
        " --append-system-prompt '{}'",
        hooks::escape_single_quotes(&capability_spec.definition)
    ));

    deps.session_adapter
        .spawn(&tmux_session, worktree_path, &cmd, &env)
        .await
        .map_err(|e| EngineError::for_agent(agent, e))?;

    let pid = deps
        .session_adapter
        .pane_pid(&tmux_session)
        .await
        .unwrap_or(None);

    Ok((tmux_session, pid))
}

/// Preconditions that touch no state. Each failure is a distinct error.
async fn validate_request<S, G, T, M, C>(
    request: &SpawnRequest,
    deps: &SpawnDeps<'_, S, G, T, M, C>,
) -> Result<(), EngineError>
where
    S: SessionAdapter,
    G: GitAdapter,
    T: TrackerAdapter,
    M: MulchAdapter,
    C: Clock,
{
    if request.name.trim().is_empty() {
        return Err(EngineError::Validation("agent name must not be empty".into()));
    }
    if request.task_id.trim().is_empty() && request.capability.requires_task() {
        return Err(EngineError::Validation(format!(
            "a {} agent needs a task id",
            request.capability
        )));
    }

    if !request.allow_root && running_as_root().await {
        return Err(EngineError::Validation(
            "refusing to spawn as superuser: the supervised LLM binary rejects \
             elevated privilege and exits silently"
                .into(),
        ));
    }

    if request.depth > deps.config.max_depth {
        return Err(EngineError::Validation(format!(
            "depth {} exceeds maxDepth {}",
            request.depth, deps.config.max_depth
        )));
    }

    if request.parent.is_none()
        && request.capability != Capability::Lead
        && !request.bypass_hierarchy
    {
        return Err(EngineError::Hierarchy(format!(
            "a parentless agent must be a lead, not a {}",
            request.capability
        )));
    }

    if let Some(existing) = deps.sessions.get_by_name(&request.name)? {
        if !existing.state.is_terminal() {
            return Err(EngineError::Validation(format!(
                "agent name {} is held by a {} session",
                request.name, existing.state
            )));
        }
    }

    if let Some(spec) = &request.spec_path {
        let canonical = spec.canonicalize().map_err(|e| {
            EngineError::Validation(format!("spec file {} not readable: {e}", spec.display()))
        })?;
        if !canonical.is_file() {
            return Err(EngineError::Validation(format!(
                "spec path {} is not a file",
                canonical.display()
            )));
        }
    }

    Ok(())
}

/// Bead-lock: task ownership is single-writer across non-terminal states.
/// Two family exemptions: the holder may be the new agent's parent (a
/// parent hands its task off to a child), and the new agent may declare
/// the holder's own parent (that parent re-slings the task under itself).
fn check_bead_lock(request: &SpawnRequest, active: &[AgentSession]) -> Result<(), EngineError> {
    if request.task_id.is_empty() {
        return Ok(());
    }
    for session in active {
        if session.task_id == request.task_id && session.name != request.name {
            let holder_is_parent = request.parent.as_deref() == Some(session.name.as_str());
            let shares_holders_parent = request.parent.is_some()
                && request.parent.as_deref() == session.parent_agent.as_deref();
            if !holder_is_parent && !shares_holders_parent {
                return Err(EngineError::for_agent(
                    &request.name,
                    format!(
                        "task {} is already held by active agent {}",
                        request.task_id, session.name
                    ),
                ));
            }
        }
    }
    Ok(())
}

/// Whether the current process runs with uid 0.
async fn running_as_root() -> bool {
    let mut cmd = Command::new("id");
    cmd.arg("-u");
    match run_with_timeout(cmd, Duration::from_secs(5), "id -u").await {
        Ok(output) if output.status.success() => {
            String::from_utf8_lossy(&output.stdout).trim() == "0"
        }
        _ => false,
    }
}

#[cfg(test)]
#[path = "spawn_tests.rs"]
mod tests;
