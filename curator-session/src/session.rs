//! The edit session — orchestration state machine over one entity.
//!
//! Lifecycle: construct with a mode, `load()` exactly once, configure through
//! the mode-gated setters, then `submit()` runs the two-phase commit (save,
//! then regenerate) and `wait_for_completion()` follows the resulting job.
//! Phase 1 always finishes, or fails, before phase 2 starts: if a reprocess
//! was triggered, any manual edits were already durably committed.
//!
//! All methods take `&self`. Mutable state lives behind one mutex, and an
//! atomic in-flight flag makes a re-entrant `submit()` fail fast instead of
//! queuing.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use curator_client::{
    ClientError, CommitRequest, RegenAccepted, RegenOptions, RegenRequest, RemoteClient,
};
use curator_core::{
    Cid, Correction, EditScope, Entity, EntityId, JobState, JobStatus, RegenKind, Tip,
};
use curator_diff::{extract_corrections, has_significant_changes, summarize, ComponentDiff};
use curator_prompt::{
    combine_instructions, CascadeCtx, DirectInstructionCtx, EditReviewCtx, PromptComposer,
};

use crate::error::SessionError;
use crate::mode::EditMode;

// ---------------------------------------------------------------------------
// Results and options
// ---------------------------------------------------------------------------

/// What one `submit()` accomplished. Both fields absent is the valid no-op
/// outcome (nothing significant to save, empty scope).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmitResult {
    pub saved: Option<SaveOutcome>,
    pub reprocess: Option<RegenAccepted>,
}

/// Phase-1 outcome: the entity's new coordinates and the components written.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome {
    pub new_tip: Tip,
    pub new_version: u64,
    pub components: BTreeMap<String, Cid>,
}

/// Polling parameters for [`EditSession::wait_for_completion`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitOptions {
    /// Sleep between successful polls.
    pub interval: Duration,
    /// Client-side give-up bound. Elapsing it does not cancel the remote
    /// job, which may keep running.
    pub timeout: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        WaitOptions {
            interval: Duration::from_secs(2),
            timeout: Duration::from_secs(300),
        }
    }
}

/// Terminal phase of a wait: the job finished, failed, or the client gave
/// up. A timeout is reported here, not as an `Err`.
#[derive(Debug, Clone, PartialEq)]
pub enum WaitOutcome {
    /// The job reached `DONE`; `None` when no regeneration was ever
    /// triggered and there was nothing to wait for.
    Complete(Option<JobStatus>),
    Error {
        message: String,
        last_status: Option<JobStatus>,
    },
}

impl WaitOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, WaitOutcome::Complete(_))
    }
}

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

struct Loaded {
    entity: Entity,
    /// Component contents as last fetched or committed.
    baseline: BTreeMap<String, String>,
    /// Pending content edits, keyed by component name.
    edited: BTreeMap<String, String>,
    /// Per-kind instructions.
    prompts: BTreeMap<RegenKind, String>,
    general_prompt: Option<String>,
    corrections: Vec<Correction>,
    scope: EditScope,
    /// Retained from the last regeneration trigger.
    status_url: Option<String>,
}

impl Loaded {
    fn new(entity: Entity, baseline: BTreeMap<String, String>) -> Self {
        Loaded {
            entity,
            baseline,
            edited: BTreeMap::new(),
            prompts: BTreeMap::new(),
            general_prompt: None,
            corrections: Vec::new(),
            scope: EditScope::default(),
            status_url: None,
        }
    }

    fn current_content(&self, component: &str) -> Option<&str> {
        self.edited
            .get(component)
            .or_else(|| self.baseline.get(component))
            .map(String::as_str)
    }

    fn baseline_of(&self, component: &str) -> &str {
        self.baseline.get(component).map(String::as_str).unwrap_or("")
    }

    /// Diffs of every component with a significant pending edit.
    fn pending_diffs(&self) -> Vec<ComponentDiff> {
        self.edited
            .iter()
            .filter(|(name, text)| has_significant_changes(self.baseline_of(name), text))
            .map(|(name, text)| summarize(name, self.baseline_of(name), text))
            .collect()
    }

    /// Caller-supplied corrections plus the ones derived from pending edits.
    fn all_corrections(&self) -> Vec<Correction> {
        let mut corrections = self.corrections.clone();
        for (name, text) in &self.edited {
            let baseline = self.baseline_of(name);
            if has_significant_changes(baseline, text) {
                corrections.extend(extract_corrections(baseline, text, Some(name)));
            }
        }
        corrections
    }

    fn instruction_for(&self, kind: RegenKind) -> String {
        combine_instructions(
            self.general_prompt.as_deref(),
            self.prompts.get(&kind).map(String::as_str),
            kind,
        )
    }

    /// True when a non-blank general or per-kind instruction was supplied
    /// for `kind`.
    fn has_instruction_for(&self, kind: RegenKind) -> bool {
        let blank = |s: &String| s.trim().is_empty();
        self.general_prompt.as_ref().is_some_and(|s| !blank(s))
            || self.prompts.get(&kind).is_some_and(|s| !blank(s))
    }

    /// Ancestor ids known locally, for the cascade appendix. The session
    /// never walks the tree; one level is all it can name.
    fn parent_path(&self) -> Vec<String> {
        self.entity
            .parent_id
            .iter()
            .map(|id| id.to_string())
            .collect()
    }
}

#[derive(Default)]
struct SessionState {
    loaded: Option<Loaded>,
}

// ---------------------------------------------------------------------------
// EditSession
// ---------------------------------------------------------------------------

pub struct EditSession {
    client: RemoteClient,
    composer: PromptComposer,
    mode: EditMode,
    state: Mutex<SessionState>,
    submitting: AtomicBool,
}

impl EditSession {
    pub fn new(client: RemoteClient, composer: PromptComposer, mode: EditMode) -> Self {
        EditSession {
            client,
            composer,
            mode,
            state: Mutex::new(SessionState::default()),
            submitting: AtomicBool::new(false),
        }
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        // A poisoned lock means a panic mid-operation; the state is still
        // structurally valid, so keep going rather than propagate the panic.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    // -- loading ------------------------------------------------------------

    /// Fetch the entity and eagerly prefetch the regeneratable components.
    ///
    /// The prefetches run in parallel and are best effort: a component that
    /// is absent or fails to fetch is skipped, and [`Self::load_component`]
    /// can fetch it later with errors surfaced.
    pub fn load(&self, id: &EntityId) -> Result<(), SessionError> {
        let mut state = self.state();
        if state.loaded.is_some() {
            return Err(SessionError::AlreadyLoaded);
        }

        let entity = self.client.fetch_entity(id)?;

        let mut baseline = BTreeMap::new();
        std::thread::scope(|scope| {
            let handles: Vec<_> = RegenKind::all()
                .iter()
                .filter_map(|kind| {
                    let name = kind.component_name();
                    entity
                        .components
                        .get(name)
                        .map(|cid| (name, scope.spawn(move || self.client.fetch_content(cid))))
                })
                .collect();
            for (name, handle) in handles {
                match handle.join() {
                    Ok(Ok(content)) => {
                        baseline.insert(name.to_string(), content);
                    }
                    Ok(Err(err)) => {
                        tracing::debug!("prefetch of component {name} skipped: {err}");
                    }
                    Err(_) => {
                        tracing::debug!("prefetch of component {name} panicked; skipped");
                    }
                }
            }
        });

        tracing::info!(
            "loaded entity {} at version {} ({} component(s) prefetched)",
            entity.id,
            entity.version,
            baseline.len()
        );
        state.loaded = Some(Loaded::new(entity, baseline));
        Ok(())
    }

    /// Fetch one component's content on demand, caching it as baseline.
    /// Unlike the prefetch in [`Self::load`], failures surface here.
    pub fn load_component(&self, component: &str) -> Result<String, SessionError> {
        let mut state = self.state();
        let loaded = state.loaded.as_mut().ok_or(SessionError::NotLoaded)?;
        if let Some(content) = loaded.baseline.get(component) {
            return Ok(content.clone());
        }
        let cid = loaded
            .entity
            .components
            .get(component)
            .ok_or_else(|| ClientError::NotFound {
                resource: format!("component {component} on entity {}", loaded.entity.id),
            })?
            .clone();
        let content = self.client.fetch_content(&cid)?;
        loaded
            .baseline
            .insert(component.to_string(), content.clone());
        Ok(content)
    }

    /// Snapshot of the loaded entity (with any tip/version advance from a
    /// successful submit already applied).
    pub fn entity(&self) -> Result<Entity, SessionError> {
        let state = self.state();
        let loaded = state.loaded.as_ref().ok_or(SessionError::NotLoaded)?;
        Ok(loaded.entity.clone())
    }

    /// Current text of a component: the pending edit if one exists, else the
    /// loaded baseline.
    pub fn content(&self, component: &str) -> Result<Option<String>, SessionError> {
        let state = self.state();
        let loaded = state.loaded.as_ref().ok_or(SessionError::NotLoaded)?;
        Ok(loaded.current_content(component).map(str::to_string))
    }

    // -- configuration setters ----------------------------------------------

    pub fn set_content(&self, component: &str, text: impl Into<String>) -> Result<(), SessionError> {
        if !self.mode.allows_content_edits() {
            return Err(SessionError::ContentEditsNotAllowed { mode: self.mode });
        }
        let mut state = self.state();
        let loaded = state.loaded.as_mut().ok_or(SessionError::NotLoaded)?;
        loaded.edited.insert(component.to_string(), text.into());
        Ok(())
    }

    pub fn clear_content(&self, component: &str) -> Result<(), SessionError> {
        if !self.mode.allows_content_edits() {
            return Err(SessionError::ContentEditsNotAllowed { mode: self.mode });
        }
        let mut state = self.state();
        let loaded = state.loaded.as_mut().ok_or(SessionError::NotLoaded)?;
        loaded.edited.remove(component);
        Ok(())
    }

    pub fn set_prompt(&self, kind: RegenKind, text: impl Into<String>) -> Result<(), SessionError> {
        if !self.mode.allows_prompts() {
            return Err(SessionError::PromptsNotAllowed { mode: self.mode });
        }
        let mut state = self.state();
        let loaded = state.loaded.as_mut().ok_or(SessionError::NotLoaded)?;
        loaded.prompts.insert(kind, text.into());
        Ok(())
    }

    pub fn clear_prompt(&self, kind: RegenKind) -> Result<(), SessionError> {
        if !self.mode.allows_prompts() {
            return Err(SessionError::PromptsNotAllowed { mode: self.mode });
        }
        let mut state = self.state();
        let loaded = state.loaded.as_mut().ok_or(SessionError::NotLoaded)?;
        loaded.prompts.remove(&kind);
        Ok(())
    }

    pub fn set_general_prompt(&self, text: impl Into<String>) -> Result<(), SessionError> {
        if !self.mode.allows_prompts() {
            return Err(SessionError::PromptsNotAllowed { mode: self.mode });
        }
        let mut state = self.state();
        let loaded = state.loaded.as_mut().ok_or(SessionError::NotLoaded)?;
        loaded.general_prompt = Some(text.into());
        Ok(())
    }

    pub fn clear_general_prompt(&self) -> Result<(), SessionError> {
        if !self.mode.allows_prompts() {
            return Err(SessionError::PromptsNotAllowed { mode: self.mode });
        }
        let mut state = self.state();
        let loaded = state.loaded.as_mut().ok_or(SessionError::NotLoaded)?;
        loaded.general_prompt = None;
        Ok(())
    }

    pub fn add_correction(&self, correction: Correction) -> Result<(), SessionError> {
        let mut state = self.state();
        let loaded = state.loaded.as_mut().ok_or(SessionError::NotLoaded)?;
        loaded.corrections.push(correction);
        Ok(())
    }

    pub fn clear_corrections(&self) -> Result<(), SessionError> {
        let mut state = self.state();
        let loaded = state.loaded.as_mut().ok_or(SessionError::NotLoaded)?;
        loaded.corrections.clear();
        Ok(())
    }

    pub fn set_scope(&self, scope: EditScope) -> Result<(), SessionError> {
        let mut state = self.state();
        let loaded = state.loaded.as_mut().ok_or(SessionError::NotLoaded)?;
        loaded.scope = scope;
        Ok(())
    }

    // -- read-side projections ----------------------------------------------

    /// Summaries of every pending edit, significant or not. Pure; never
    /// touches the network.
    pub fn change_summary(&self) -> Result<Vec<ComponentDiff>, SessionError> {
        let state = self.state();
        let loaded = state.loaded.as_ref().ok_or(SessionError::NotLoaded)?;
        Ok(loaded
            .edited
            .iter()
            .map(|(name, text)| summarize(name, loaded.baseline_of(name), text))
            .collect())
    }

    /// The prompt `submit()` would send for `kind`, annotated with the
    /// cascade appendix when the scope cascades. `None` when this mode sends
    /// no prompt for the kind. Pure; never touches the network.
    pub fn preview_prompt(&self, kind: RegenKind) -> Result<Option<String>, SessionError> {
        let state = self.state();
        let loaded = state.loaded.as_ref().ok_or(SessionError::NotLoaded)?;
        let cascade = CascadeCtx::from_scope(&loaded.scope, loaded.parent_path());
        self.compose_prompt(loaded, kind, cascade)
    }

    /// Render the prompt for one kind. `submit()` passes no cascade context
    /// (the service receives the cascade flag itself); previews pass it so a
    /// reviewer sees that ancestors will change too.
    fn compose_prompt(
        &self,
        loaded: &Loaded,
        kind: RegenKind,
        cascade: Option<CascadeCtx>,
    ) -> Result<Option<String>, SessionError> {
        match self.mode {
            EditMode::ManualOnly => Ok(None),
            EditMode::AiPrompt => {
                if !loaded.has_instruction_for(kind) {
                    return Ok(None);
                }
                let content = loaded
                    .current_content(kind.component_name())
                    .unwrap_or_default()
                    .to_string();
                let ctx = DirectInstructionCtx::new(
                    &loaded.entity,
                    kind,
                    loaded.instruction_for(kind),
                    &content,
                    None,
                    cascade,
                );
                Ok(Some(self.composer.direct_instruction(&ctx)?))
            }
            EditMode::ManualWithReview => {
                let diffs = loaded.pending_diffs();
                let ctx = EditReviewCtx::new(
                    &loaded.entity,
                    &diffs,
                    loaded.all_corrections(),
                    loaded.instruction_for(kind),
                    None,
                    cascade,
                );
                Ok(Some(self.composer.edit_review(&ctx)?))
            }
        }
    }

    // -- submit -------------------------------------------------------------

    /// The two-phase commit.
    ///
    /// Phase 1 uploads every significantly-edited component and issues one
    /// compare-and-swap write against the currently-known tip; a conflict
    /// aborts the whole submit with session state untouched. Phase 2 runs
    /// only when the scope names at least one kind, and only after phase 1
    /// fully succeeded. Nothing to do in either phase is a valid no-op.
    pub fn submit(&self, note: Option<&str>) -> Result<SubmitResult, SessionError> {
        if self.submitting.swap(true, Ordering::SeqCst) {
            return Err(SessionError::SubmitInFlight);
        }
        let result = self.submit_inner(note);
        self.submitting.store(false, Ordering::SeqCst);
        result
    }

    fn submit_inner(&self, note: Option<&str>) -> Result<SubmitResult, SessionError> {
        let mut state = self.state();
        let loaded = state.loaded.as_mut().ok_or(SessionError::NotLoaded)?;
        let mut result = SubmitResult::default();

        // Prompts describe the edits being saved, so they are rendered from
        // the pre-commit state before the baselines advance.
        let mut custom_prompts = BTreeMap::new();
        if !loaded.scope.is_empty() {
            for kind in loaded.scope.targets.clone() {
                if let Some(prompt) = self.compose_prompt(loaded, kind, None)? {
                    custom_prompts.insert(kind, prompt);
                }
            }
        }

        // Phase 1: save.
        let significant: Vec<(String, String)> = loaded
            .edited
            .iter()
            .filter(|(name, text)| has_significant_changes(loaded.baseline_of(name), text))
            .map(|(name, text)| (name.clone(), text.clone()))
            .collect();

        if !significant.is_empty() {
            let mut uploads = BTreeMap::new();
            for (name, text) in &significant {
                let cid = self.client.upload_content(text, &format!("{name}.txt"))?;
                uploads.insert(name.clone(), cid);
            }

            let mut request = CommitRequest::new(loaded.entity.tip.clone());
            request.components = uploads.clone();
            request.note = note.map(str::to_string);
            let outcome = self.client.commit_update(&loaded.entity.id, &request)?;

            tracing::info!(
                "committed {} component(s) on {}: version {} -> {}",
                uploads.len(),
                loaded.entity.id,
                loaded.entity.version,
                outcome.version
            );
            loaded.entity.tip = outcome.tip.clone();
            loaded.entity.version = outcome.version;
            for (name, cid) in &uploads {
                loaded.entity.components.insert(name.clone(), cid.clone());
            }
            for (name, text) in significant {
                loaded.baseline.insert(name.clone(), text);
                loaded.edited.remove(&name);
            }
            result.saved = Some(SaveOutcome {
                new_tip: outcome.tip,
                new_version: outcome.version,
                components: uploads,
            });
        }

        // Phase 2: regenerate.
        if !loaded.scope.is_empty() {
            let request = RegenRequest {
                id: loaded.entity.id.clone(),
                phases: loaded.scope.targets.iter().copied().collect(),
                cascade: loaded.scope.cascade,
                options: RegenOptions {
                    stop_at: loaded.scope.stop_at.clone(),
                    custom_prompts,
                    custom_note: note.map(str::to_string),
                },
            };
            let accepted = self.client.trigger_regeneration(&request)?;
            tracing::info!(
                "regeneration batch {} queued ({} entity(ies))",
                accepted.batch_id,
                accepted.queued_count
            );
            loaded.status_url = Some(accepted.status_url.clone());
            result.reprocess = Some(accepted);
        }

        Ok(result)
    }

    // -- waiting ------------------------------------------------------------

    /// Bounded polling loop over the retained status URL. Every observed
    /// status invokes `on_status` before the loop decides whether to
    /// continue. Returns immediately with `Complete(None)` when no
    /// regeneration was triggered. A timeout is a client-side give-up,
    /// reported as [`WaitOutcome::Error`], not an `Err`.
    pub fn wait_for_completion(
        &self,
        options: &WaitOptions,
        mut on_status: impl FnMut(&JobStatus),
    ) -> Result<WaitOutcome, SessionError> {
        let status_url = {
            let state = self.state();
            let loaded = state.loaded.as_ref().ok_or(SessionError::NotLoaded)?;
            match &loaded.status_url {
                Some(url) => url.clone(),
                None => return Ok(WaitOutcome::Complete(None)),
            }
        };

        let started = Instant::now();
        let mut first = true;
        loop {
            let status = self.client.poll_status(&status_url, first)?;
            first = false;
            on_status(&status);

            match status.state {
                JobState::Done => return Ok(WaitOutcome::Complete(Some(status))),
                JobState::Error => {
                    let message = status
                        .error
                        .clone()
                        .unwrap_or_else(|| "regeneration job failed".to_string());
                    return Ok(WaitOutcome::Error {
                        message,
                        last_status: Some(status),
                    });
                }
                _ => {}
            }

            if started.elapsed() >= options.timeout {
                return Ok(WaitOutcome::Error {
                    message: format!(
                        "timed out after {}s waiting for batch {}",
                        options.timeout.as_secs(),
                        status.batch_id
                    ),
                    last_status: Some(status),
                });
            }
            std::thread::sleep(options.interval);
        }
    }
}
