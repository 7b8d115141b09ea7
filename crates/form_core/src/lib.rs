use std::{sync::Arc, time::Duration};

use shared::{
    domain::{Member, MemberRole, RegistrationMode},
    protocol::{MemberEntry, RegistrationEnvelope, RegistrationPayload},
};
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{error, info, warn};

pub mod backend;
pub mod contact;
pub mod countdown;
pub mod error;

pub use backend::{HttpSiteApi, SiteApi};
pub use error::{ContactError, SubmitError, ValidationError, GENERIC_SUBMIT_ERROR};

pub const MAX_TEAM_MEMBERS: usize = 4;
/// The leader and the first teammate rows are fixed; only later rows carry
/// a remove action.
pub const PROTECTED_MEMBER_SLOTS: usize = 2;

const SUBMIT_PACING_DELAY: Duration = Duration::from_secs(3);
const SUCCESS_POPUP_TTL: Duration = Duration::from_secs(3);
const REDIRECT_DELAY: Duration = Duration::from_secs(2);

/// Delays around a submission attempt. The pacing delay is cosmetic (the
/// site shows a "processing" overlay for its duration); popup and redirect
/// delays drive the post-success timers.
#[derive(Debug, Clone, Copy)]
pub struct SubmitTimings {
    pub pacing_delay: Duration,
    pub popup_ttl: Duration,
    pub redirect_delay: Duration,
}

impl Default for SubmitTimings {
    fn default() -> Self {
        Self {
            pacing_delay: SUBMIT_PACING_DELAY,
            popup_ttl: SUCCESS_POPUP_TTL,
            redirect_delay: REDIRECT_DELAY,
        }
    }
}

/// Everything the registration form holds between edits. Index 0 of
/// `members` is the leader (team mode) or the sole registrant (individual
/// mode).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationDraft {
    pub mode: RegistrationMode,
    pub team_name: String,
    pub leader_phone: String,
    pub members: Vec<Member>,
    pub idea_description: String,
    pub request_add_member: bool,
    pub competence: String,
}

impl Default for RegistrationDraft {
    /// Fresh mount state: team mode with the leader and one teammate row.
    fn default() -> Self {
        Self {
            mode: RegistrationMode::Team,
            team_name: String::new(),
            leader_phone: String::new(),
            members: vec![Member::blank(), Member::blank()],
            idea_description: String::new(),
            request_add_member: false,
            competence: String::new(),
        }
    }
}

impl RegistrationDraft {
    /// State after a mode toggle: a single blank member and every
    /// mode-specific field cleared.
    pub fn reset_for_mode(mode: RegistrationMode) -> Self {
        Self {
            mode,
            team_name: String::new(),
            leader_phone: String::new(),
            members: vec![Member::blank()],
            idea_description: String::new(),
            request_add_member: false,
            competence: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftField {
    TeamName(String),
    LeaderPhone(String),
    IdeaDescription(String),
    Competence(String),
    RequestAddMember(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberField {
    Name,
    Email,
    Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionPhase {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionSnapshot {
    pub phase: SubmissionPhase,
    pub error_message: Option<String>,
    /// Gates the "processing" overlay. Independent of `phase`: it clears
    /// whenever the primary request settles, success or failure.
    pub in_flight: bool,
}

#[derive(Debug, Clone)]
pub enum FormEvent {
    SubmissionStateChanged(SubmissionSnapshot),
    SuccessPopupShown,
    SuccessPopupDismissed,
    /// The post-success redirect. Emitted, never performed.
    NavigateHome,
}

/// Checks the current draft against the mode's submission rules and
/// returns the message for the first failing rule. Role matching is
/// case-insensitive.
pub fn validate(draft: &RegistrationDraft) -> Result<(), ValidationError> {
    match draft.mode {
        RegistrationMode::Team => {
            let has_it = draft.members.iter().any(|m| m.has_role(MemberRole::It));
            let has_medical = draft
                .members
                .iter()
                .any(|m| m.has_role(MemberRole::Medical));
            if has_it && has_medical {
                Ok(())
            } else {
                Err(ValidationError::TeamRoleCoverage)
            }
        }
        RegistrationMode::Individual => {
            let Some(lead) = draft.members.first() else {
                return Err(ValidationError::IndividualRequiredFields);
            };
            if lead.name.is_empty()
                || lead.email.is_empty()
                || lead.role.is_empty()
                || draft.competence.is_empty()
            {
                Err(ValidationError::IndividualRequiredFields)
            } else {
                Ok(())
            }
        }
    }
}

/// Builds the outbound registration body. Team mode sends the full member
/// list and the team-only fields; individual mode sends a single-element
/// list with the competence statement merged into the member.
pub fn build_envelope(draft: &RegistrationDraft) -> RegistrationEnvelope {
    let is_team = draft.mode == RegistrationMode::Team;
    let members = if is_team {
        draft
            .members
            .iter()
            .map(|member| MemberEntry {
                name: member.name.clone(),
                email: member.email.clone(),
                role: member.role.clone(),
                competence: None,
            })
            .collect()
    } else {
        let lead = draft.members.first().cloned().unwrap_or_default();
        vec![MemberEntry {
            name: lead.name,
            email: lead.email,
            role: lead.role,
            competence: Some(draft.competence.clone()),
        }]
    };

    RegistrationEnvelope {
        registration: RegistrationPayload {
            is_team,
            team_name: if is_team {
                draft.team_name.clone()
            } else {
                String::new()
            },
            leader_phone: if is_team {
                draft.leader_phone.clone()
            } else {
                String::new()
            },
            idea_description: draft.idea_description.clone(),
            competence: draft.competence.clone(),
            request_add_member: draft.request_add_member,
            members,
        },
    }
}

struct FormState {
    draft: RegistrationDraft,
    phase: SubmissionPhase,
    error_message: Option<String>,
    in_flight: bool,
    popup_visible: bool,
    /// Bumped on every submission attempt and on every reset. Deferred
    /// updates (timers, the settling request) compare against it before
    /// touching state.
    attempt: u64,
    success_timers: Vec<JoinHandle<()>>,
}

impl FormState {
    fn snapshot(&self) -> SubmissionSnapshot {
        SubmissionSnapshot {
            phase: self.phase,
            error_message: self.error_message.clone(),
            in_flight: self.in_flight,
        }
    }

    /// Succeeded/Failed fall back to Idle on the next edit.
    fn clear_outcome(&mut self) {
        if matches!(
            self.phase,
            SubmissionPhase::Succeeded | SubmissionPhase::Failed
        ) {
            self.phase = SubmissionPhase::Idle;
            self.error_message = None;
        }
    }

    fn abort_success_timers(&mut self) {
        for timer in self.success_timers.drain(..) {
            timer.abort();
        }
    }

    fn draft_locked(&self) -> bool {
        if self.in_flight {
            warn!("draft: edit ignored while a submission is in flight");
        }
        self.in_flight
    }
}

/// Owns the registration draft and the submission state machine. All
/// mutation goes through the action methods; the UI observes through
/// [`RegistrationClient::subscribe_events`] and the snapshot accessors.
pub struct RegistrationClient {
    api: Arc<dyn SiteApi>,
    timings: SubmitTimings,
    inner: Mutex<FormState>,
    events: broadcast::Sender<FormEvent>,
}

impl RegistrationClient {
    pub fn new(api: Arc<dyn SiteApi>) -> Arc<Self> {
        Self::new_with_timings(api, SubmitTimings::default())
    }

    pub fn new_with_timings(api: Arc<dyn SiteApi>, timings: SubmitTimings) -> Arc<Self> {
        let (events, _) = broadcast::channel(64);
        Arc::new(Self {
            api,
            timings,
            inner: Mutex::new(FormState {
                draft: RegistrationDraft::default(),
                phase: SubmissionPhase::Idle,
                error_message: None,
                in_flight: false,
                popup_visible: false,
                attempt: 0,
                success_timers: Vec::new(),
            }),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<FormEvent> {
        self.events.subscribe()
    }

    pub async fn draft(&self) -> RegistrationDraft {
        self.inner.lock().await.draft.clone()
    }

    pub async fn submission(&self) -> SubmissionSnapshot {
        self.inner.lock().await.snapshot()
    }

    pub async fn popup_visible(&self) -> bool {
        self.inner.lock().await.popup_visible
    }

    /// Switches between team and individual registration. Resets the draft
    /// to a single blank member, clears mode-specific fields and any
    /// previous outcome, and cancels pending success timers.
    pub async fn set_mode(&self, mode: RegistrationMode) {
        let mut state = self.inner.lock().await;
        if state.draft_locked() {
            return;
        }
        state.abort_success_timers();
        state.attempt += 1;
        state.draft = RegistrationDraft::reset_for_mode(mode);
        state.phase = SubmissionPhase::Idle;
        state.error_message = None;
        state.popup_visible = false;
        self.emit_submission_state(&state);
    }

    /// Appends a blank teammate row. Silent no-op at the four-member cap
    /// and in individual mode.
    pub async fn add_member(&self) {
        let mut state = self.inner.lock().await;
        if state.draft_locked() {
            return;
        }
        if state.draft.mode != RegistrationMode::Team
            || state.draft.members.len() >= MAX_TEAM_MEMBERS
        {
            return;
        }
        state.clear_outcome();
        state.draft.members.push(Member::blank());
    }

    /// Removes the teammate row at `index`. The leader and the first
    /// teammate (indices 0 and 1) are not removable; calls for protected
    /// or out-of-range indices leave the draft unchanged.
    pub async fn remove_member(&self, index: usize) {
        let mut state = self.inner.lock().await;
        if state.draft_locked() {
            return;
        }
        if index < PROTECTED_MEMBER_SLOTS || index >= state.draft.members.len() {
            return;
        }
        state.clear_outcome();
        state.draft.members.remove(index);
    }

    pub async fn update_member(&self, index: usize, field: MemberField, value: impl Into<String>) {
        let value = value.into();
        let mut state = self.inner.lock().await;
        if state.draft_locked() {
            return;
        }
        let Some(member) = state.draft.members.get_mut(index) else {
            return;
        };
        match field {
            MemberField::Name => member.name = value,
            MemberField::Email => member.email = value,
            MemberField::Role => member.role = value,
        }
        state.clear_outcome();
    }

    pub async fn update_field(&self, field: DraftField) {
        let mut state = self.inner.lock().await;
        if state.draft_locked() {
            return;
        }
        match field {
            DraftField::TeamName(value) => state.draft.team_name = value,
            DraftField::LeaderPhone(value) => state.draft.leader_phone = value,
            DraftField::IdeaDescription(value) => state.draft.idea_description = value,
            DraftField::Competence(value) => state.draft.competence = value,
            DraftField::RequestAddMember(value) => state.draft.request_add_member = value,
        }
        state.clear_outcome();
    }

    /// Runs one submission attempt: validate, pace, post, then either the
    /// success choreography (popup, detached notification, redirect timer)
    /// or a failure message. A second call while a request is in flight is
    /// ignored, since the draft may have drifted from the in-flight
    /// payload.
    pub async fn submit(self: &Arc<Self>) -> Result<(), SubmitError> {
        let (envelope, attempt) = {
            let mut state = self.inner.lock().await;
            if state.in_flight {
                warn!("submit: a submission is already in flight; ignoring");
                return Ok(());
            }
            if let Err(err) = validate(&state.draft) {
                state.phase = SubmissionPhase::Failed;
                state.error_message = Some(err.to_string());
                self.emit_submission_state(&state);
                return Err(err.into());
            }
            state.abort_success_timers();
            state.attempt += 1;
            state.phase = SubmissionPhase::Submitting;
            state.error_message = None;
            state.in_flight = true;
            state.popup_visible = false;
            self.emit_submission_state(&state);
            (build_envelope(&state.draft), state.attempt)
        };

        if !self.timings.pacing_delay.is_zero() {
            tokio::time::sleep(self.timings.pacing_delay).await;
        }

        let outcome = self.api.submit_registration(&envelope).await;

        let mut state = self.inner.lock().await;
        state.in_flight = false;
        if state.attempt != attempt {
            info!(attempt, "submit: outcome discarded after reset");
            self.emit_submission_state(&state);
            return Ok(());
        }

        match outcome {
            Ok(response) if response.message.is_some() => {
                state.phase = SubmissionPhase::Succeeded;
                state.popup_visible = true;
                self.emit_submission_state(&state);
                let _ = self.events.send(FormEvent::SuccessPopupShown);
                info!(
                    team = envelope.registration.is_team,
                    members = envelope.registration.members.len(),
                    "submit: registration accepted"
                );
                self.spawn_notification(envelope);
                self.schedule_success_timers(&mut state, attempt);
                Ok(())
            }
            Ok(response) => {
                let message = response
                    .errors
                    .unwrap_or_else(|| GENERIC_SUBMIT_ERROR.to_string());
                state.phase = SubmissionPhase::Failed;
                state.error_message = Some(message.clone());
                self.emit_submission_state(&state);
                Err(SubmitError::Rejected(message))
            }
            Err(err) => {
                error!("submit: registration request failed: {err:#}");
                let err = SubmitError::Transport(err);
                state.phase = SubmissionPhase::Failed;
                state.error_message = Some(err.to_string());
                self.emit_submission_state(&state);
                Err(err)
            }
        }
    }

    /// Closes the success popup ahead of its auto-dismiss timer.
    pub async fn dismiss_popup(&self) {
        let mut state = self.inner.lock().await;
        if state.popup_visible {
            state.popup_visible = false;
            let _ = self.events.send(FormEvent::SuccessPopupDismissed);
        }
    }

    /// Tears the controller down: pending success timers are aborted and
    /// an in-flight outcome, if any, is discarded when it settles.
    pub async fn close(&self) {
        let mut state = self.inner.lock().await;
        state.abort_success_timers();
        state.attempt += 1;
        state.phase = SubmissionPhase::Idle;
        state.error_message = None;
        state.popup_visible = false;
    }

    fn emit_submission_state(&self, state: &FormState) {
        let _ = self
            .events
            .send(FormEvent::SubmissionStateChanged(state.snapshot()));
    }

    /// Fire-and-forget email trigger. Outcome is logged and never reaches
    /// the submission state.
    fn spawn_notification(&self, envelope: RegistrationEnvelope) {
        let api = Arc::clone(&self.api);
        tokio::spawn(async move {
            match api.notify_registration(&envelope).await {
                Ok(response) if response.message.is_some() => {
                    info!("notify: confirmation emails sent");
                }
                Ok(response) => {
                    error!(
                        reason = response.error.as_deref().unwrap_or("unknown"),
                        "notify: email delivery failed"
                    );
                }
                Err(err) => error!("notify: email request failed: {err:#}"),
            }
        });
    }

    fn schedule_success_timers(self: &Arc<Self>, state: &mut FormState, attempt: u64) {
        let popup_ttl = self.timings.popup_ttl;
        let client = Arc::clone(self);
        let dismiss = tokio::spawn(async move {
            tokio::time::sleep(popup_ttl).await;
            let mut state = client.inner.lock().await;
            if state.attempt != attempt || !state.popup_visible {
                return;
            }
            state.popup_visible = false;
            let _ = client.events.send(FormEvent::SuccessPopupDismissed);
        });

        let redirect_delay = self.timings.redirect_delay;
        let client = Arc::clone(self);
        let redirect = tokio::spawn(async move {
            tokio::time::sleep(redirect_delay).await;
            let state = client.inner.lock().await;
            if state.attempt != attempt || state.phase != SubmissionPhase::Succeeded {
                return;
            }
            drop(state);
            let _ = client.events.send(FormEvent::NavigateHome);
        });

        state.success_timers.push(dismiss);
        state.success_timers.push(redirect);
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
