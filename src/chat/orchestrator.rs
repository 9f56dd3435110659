//! Chat orchestration.
//!
//! # Responsibilities
//! - Accept user submissions, one at a time
//! - Route each query to the real endpoint (with retries) or the simulator
//! - Report each top-level endpoint outcome to the health registry
//! - Fall back to the simulator when the endpoint fails
//! - Switch into simulation mode when the endpoint becomes unavailable
//! - Pace the UI: thinking → typing → answer shown → follow-ups shown
//!
//! # Design Decisions
//! - UI state is published through a `watch` channel; notices through `broadcast`
//! - All delayed transitions go through one `DisposalSet`
//! - `submit` never returns an error; failures become view state plus a notice

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::{broadcast, watch};

use crate::chat::backend::{ChatBackend, ChatRequest};
use crate::chat::pacing::DisposalSet;
use crate::chat::types::{
    AnswerSource, ChatError, ChatPhase, ChatView, Message, Notice, NoticeVariant, RejectReason,
    Role, SubmitOutcome,
};
use crate::config::{AssistantConfig, ChatConfig};
use crate::health::{HealthRegistry, HealthStatus, ServiceHealth, Subscription};
use crate::observability::metrics;
use crate::resilience::{retry_with_backoff, with_timeout, RetryPolicy};
use crate::simulator::ResponseSimulator;

const NOTICE_CAPACITY: usize = 32;

/// Static settings of one orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatSettings {
    pub chat: ChatConfig,
    /// Health registry id of the real endpoint.
    pub service_id: String,
    pub retry: RetryPolicy,
    pub request_timeout: Option<Duration>,
}

impl ChatSettings {
    pub fn from_config(config: &AssistantConfig) -> Self {
        Self {
            chat: config.chat.clone(),
            service_id: config.endpoint.service_id.clone(),
            retry: RetryPolicy::from(&config.retry),
            request_timeout: config.endpoint.request_timeout(),
        }
    }

    fn thinking_delay(&self) -> Duration {
        Duration::from_millis(self.chat.thinking_delay_ms)
    }

    fn typing_delay(&self, answer: &str) -> Duration {
        let chars = answer.chars().count() as u64;
        let ms = self
            .chat
            .typing_base_ms
            .saturating_add(self.chat.typing_ms_per_char.saturating_mul(chars))
            .min(self.chat.typing_max_ms);
        Duration::from_millis(ms)
    }

    fn follow_up_delay(&self) -> Duration {
        Duration::from_millis(self.chat.follow_up_delay_ms)
    }
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self::from_config(&AssistantConfig::default())
    }
}

struct Inner {
    settings: ChatSettings,
    backend: Arc<dyn ChatBackend>,
    simulator: Arc<ResponseSimulator>,
    registry: HealthRegistry,
    view: watch::Sender<ChatView>,
    notices: broadcast::Sender<Notice>,
    in_flight: AtomicBool,
    next_message_id: AtomicU64,
    pacing: DisposalSet,
}

/// Message shown when a submission is dropped before it finishes.
const CANCELLED: &str = "request cancelled";

/// Held for the lifetime of one submission.
///
/// Always clears the in-flight flag. If the submission future is dropped
/// before `finish`, the view goes back to idle with an error so the retry
/// affordance stays available.
struct InFlight<'a> {
    inner: &'a Inner,
    finished: bool,
}

impl InFlight<'_> {
    fn finish(mut self) {
        self.finished = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.inner.in_flight.store(false, Ordering::Release);
        if self.finished || self.inner.pacing.is_disposed() {
            return;
        }
        tracing::warn!(service = %self.inner.settings.service_id, "Chat submission cancelled");
        self.inner.view.send_modify(|v| {
            v.phase = ChatPhase::Idle;
            v.error = Some(CANCELLED.to_string());
        });
    }
}

/// Mediates between submitted text and the assistant transcript.
pub struct ChatOrchestrator {
    inner: Arc<Inner>,
    _health: Subscription,
}

impl ChatOrchestrator {
    pub fn new(
        settings: ChatSettings,
        backend: Arc<dyn ChatBackend>,
        simulator: Arc<ResponseSimulator>,
        registry: HealthRegistry,
    ) -> Self {
        let (view, _) = watch::channel(ChatView {
            simulation_mode: settings.chat.start_in_simulation,
            ..ChatView::default()
        });
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);

        let inner = Arc::new(Inner {
            settings,
            backend,
            simulator,
            registry: registry.clone(),
            view,
            notices,
            in_flight: AtomicBool::new(false),
            next_message_id: AtomicU64::new(1),
            pacing: DisposalSet::new(),
        });

        let weak: Weak<Inner> = Arc::downgrade(&inner);
        let health = registry.subscribe(move |service, health| {
            if let Some(inner) = weak.upgrade() {
                inner.on_health_change(service, health);
            }
        });

        tracing::debug!(
            service = %inner.settings.service_id,
            simulation = inner.settings.chat.start_in_simulation,
            "Chat orchestrator ready"
        );

        Self {
            inner,
            _health: health,
        }
    }

    /// Current UI state.
    pub fn view(&self) -> ChatView {
        self.inner.view.borrow().clone()
    }

    /// Receiver that observes every UI state change.
    pub fn watch(&self) -> watch::Receiver<ChatView> {
        self.inner.view.subscribe()
    }

    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.inner.notices.subscribe()
    }

    pub fn simulation_mode(&self) -> bool {
        self.inner.view.borrow().simulation_mode
    }

    pub fn service_id(&self) -> &str {
        &self.inner.settings.service_id
    }

    pub fn registry(&self) -> &HealthRegistry {
        &self.inner.registry
    }

    pub fn set_input(&self, text: &str) {
        self.inner.view.send_modify(|v| v.input = text.to_string());
    }

    /// Submit whatever is currently in the input box.
    pub async fn submit_input(&self) -> SubmitOutcome {
        let input = self.inner.view.borrow().input.clone();
        self.submit(&input).await
    }

    /// Resubmit the most recent user query.
    pub async fn retry_last(&self) -> SubmitOutcome {
        let last = self.inner.view.borrow().last_query.clone();
        match last {
            Some(query) => self.submit(&query).await,
            None => SubmitOutcome::Rejected(RejectReason::NothingToRetry),
        }
    }

    /// Flip simulation mode by hand. Returns the new mode.
    pub fn toggle_simulation(&self) -> bool {
        let mut enabled = false;
        self.inner.view.send_modify(|v| {
            v.simulation_mode = !v.simulation_mode;
            enabled = v.simulation_mode;
        });

        tracing::info!(simulation = enabled, "Simulation mode toggled");
        let notice = if enabled {
            Notice::new(
                NoticeVariant::Success,
                "Simulation mode enabled",
                "Answers are generated locally from inventory data.",
            )
        } else {
            Notice::new(
                NoticeVariant::Success,
                "Live AI mode enabled",
                "Questions are sent to the AI service again.",
            )
        };
        self.inner.notify(notice);
        enabled
    }

    /// Ask a question and wait until its answer is shown (or it fails).
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        let outcome = self.inner.submit(text).await;
        metrics::record_submission(outcome.label());
        outcome
    }

    /// Cancel every pending paced transition. Later submissions are refused.
    pub fn dispose(&self) {
        if !self.inner.pacing.is_disposed() {
            tracing::debug!(service = %self.inner.settings.service_id, "Disposing chat orchestrator");
        }
        self.inner.pacing.dispose();
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.pacing.is_disposed()
    }
}

impl Drop for ChatOrchestrator {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl Inner {
    async fn submit(self: &Arc<Self>, text: &str) -> SubmitOutcome {
        let query = text.trim();
        if query.is_empty() {
            return SubmitOutcome::Rejected(RejectReason::EmptyInput);
        }
        if self.pacing.is_disposed() {
            return SubmitOutcome::Disposed;
        }
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("Submission rejected, another one is in flight");
            return SubmitOutcome::Rejected(RejectReason::InFlight);
        }
        let guard = InFlight {
            inner: self,
            finished: false,
        };
        let outcome = self.run(query).await;
        guard.finish();
        outcome
    }

    async fn run(self: &Arc<Self>, query: &str) -> SubmitOutcome {
        self.pacing.cancel_pending();
        let user = Message::new(self.next_id(), Role::User, query);
        self.view.send_modify(|v| {
            v.transcript.push(user);
            v.input.clear();
            v.phase = ChatPhase::Thinking;
            v.error = None;
            v.retry_count = 0;
            v.last_query = Some(query.to_string());
            v.hide_follow_ups();
        });

        let thinking = self.settings.thinking_delay();
        let produced = self
            .pacing
            .guard(async {
                let (answer, _) =
                    tokio::join!(self.produce_answer(query), tokio::time::sleep(thinking));
                answer
            })
            .await;

        let answer = match produced {
            Ok(answer) => answer,
            Err(_) => return SubmitOutcome::Disposed,
        };

        match answer {
            Ok((text, source)) => {
                self.view.send_modify(|v| v.phase = ChatPhase::Typing);
                if self
                    .pacing
                    .delay(self.settings.typing_delay(&text))
                    .await
                    .is_err()
                {
                    return SubmitOutcome::Disposed;
                }

                let reply = Message::new(self.next_id(), Role::Assistant, text);
                self.view.send_modify(|v| {
                    v.transcript.push(reply);
                    v.phase = ChatPhase::Idle;
                });
                self.schedule_follow_ups();
                SubmitOutcome::Answered(source)
            }
            Err(error) => {
                tracing::warn!(error = %error, "Could not answer chat query");
                let message = error.to_string();
                self.view.send_modify(|v| {
                    v.phase = ChatPhase::Idle;
                    v.error = Some(message.clone());
                });
                self.notify(Notice::new(
                    NoticeVariant::Destructive,
                    "Could not get an answer",
                    format!("{}. Use retry to ask again.", message),
                ));
                SubmitOutcome::Failed(error)
            }
        }
    }

    async fn produce_answer(&self, query: &str) -> Result<(String, AnswerSource), ChatError> {
        let simulation = self.view.borrow().simulation_mode;
        if simulation {
            let text = self.simulator.generate_response(query).await?;
            return Ok((text, AnswerSource::Simulator));
        }

        let service = self.settings.service_id.as_str();
        let request = ChatRequest::from_transcript(&self.view.borrow().transcript);
        let backend = &self.backend;
        let request_ref = &request;
        let timeout = self.settings.request_timeout;

        let result = retry_with_backoff(
            &self.settings.retry,
            |attempt, delay, error: &ChatError| {
                tracing::warn!(
                    service = %service,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "Retrying AI service call"
                );
                metrics::record_retry(service);
                self.view.send_modify(|v| v.retry_count = attempt);
            },
            move || with_timeout(timeout, backend.complete(request_ref)),
        )
        .await;

        match result {
            Ok(text) => {
                self.registry.report_success(service);
                Ok((text, AnswerSource::Endpoint))
            }
            Err(error) => {
                let health = self.registry.report_failure(service);
                if !self.settings.chat.fallback_enabled {
                    return Err(error);
                }

                tracing::warn!(
                    service = %service,
                    error = %error,
                    status = %health.status,
                    "AI service failed, answering from simulator"
                );
                metrics::record_fallback(service);
                let text = self.simulator.generate_response(query).await?;
                Ok((text, AnswerSource::Fallback))
            }
        }
    }

    fn on_health_change(&self, service: &str, health: &ServiceHealth) {
        if service != self.settings.service_id
            || health.status != HealthStatus::Unavailable
            || !self.settings.chat.fallback_enabled
            || self.pacing.is_disposed()
        {
            return;
        }

        let switched = self.view.send_if_modified(|v| {
            if v.simulation_mode {
                false
            } else {
                v.simulation_mode = true;
                true
            }
        });
        if switched {
            tracing::warn!(
                service = %service,
                consecutive_failures = health.consecutive_failures,
                "AI service unavailable, switching to simulation mode"
            );
            self.notify(Notice::new(
                NoticeVariant::Destructive,
                "AI service unavailable",
                "Switched to simulation mode. Toggle it off once the service is back.",
            ));
        }
    }

    fn schedule_follow_ups(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        self.pacing.schedule(self.settings.follow_up_delay(), move || {
            if let Some(inner) = weak.upgrade() {
                inner.view.send_modify(|v| v.show_follow_ups());
            }
        });
    }

    fn notify(&self, notice: Notice) {
        // No receivers is fine: nobody is showing toasts.
        let _ = self.notices.send(notice);
    }

    fn next_id(&self) -> u64 {
        self.next_message_id.fetch_add(1, Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typing_delay_scales_and_caps() {
        let mut settings = ChatSettings::default();
        settings.chat.typing_base_ms = 100;
        settings.chat.typing_ms_per_char = 10;
        settings.chat.typing_max_ms = 500;

        assert_eq!(settings.typing_delay(""), Duration::from_millis(100));
        assert_eq!(settings.typing_delay("abcde"), Duration::from_millis(150));
        assert_eq!(settings.typing_delay(&"x".repeat(1000)), Duration::from_millis(500));
    }

    #[test]
    fn test_settings_from_config() {
        let mut config = AssistantConfig::default();
        config.endpoint.service_id = "inventory-ai".into();
        config.endpoint.request_timeout_ms = 0;
        config.retry.max_retries = 1;

        let settings = ChatSettings::from_config(&config);
        assert_eq!(settings.service_id, "inventory-ai");
        assert_eq!(settings.request_timeout, None);
        assert_eq!(settings.retry.max_retries, 1);
    }
}
