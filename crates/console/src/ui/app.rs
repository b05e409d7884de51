use crate::config::Config;
use protocol::{ClassifyRequest, ResultEnvelope, ServerEvent};
use std::time::{Duration, Instant, SystemTime};

#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum ViewMode {
    #[default]
    Normal,
    RawFullscreen,
}

#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum Focus {
    #[default]
    SystemPrompt,
    UserPrompt,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Submitting,
}

#[derive(Default)]
pub(crate) struct PromptEditor {
    text: String,
}

impl PromptEditor {
    fn seeded(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.text
    }

    pub(crate) fn push_char(&mut self, ch: char) {
        self.text.push(ch);
    }

    pub(crate) fn push_newline(&mut self) {
        self.text.push('\n');
    }

    pub(crate) fn backspace(&mut self) {
        self.text.pop();
    }

    pub(crate) fn clear(&mut self) {
        self.text.clear();
    }
}

pub(crate) struct ClassificationOutcome {
    pub(crate) envelope: ResultEnvelope,
    pub(crate) received_at: SystemTime,
    /// Time the request spent in flight; absent for unsolicited results.
    pub(crate) round_trip: Option<Duration>,
}

pub(crate) struct StatusLine {
    pub(crate) text: String,
    pub(crate) warn: bool,
}

pub(crate) struct AppState {
    pub(crate) endpoint: String,
    pub(crate) connected: bool,
    pub(crate) system_prompt: PromptEditor,
    pub(crate) user_prompt: PromptEditor,
    pub(crate) focus: Focus,
    phase: Phase,
    submitted_at: Option<Instant>,
    request_timeout: Duration,
    pub(crate) last_result: Option<ClassificationOutcome>,
    pub(crate) status: Option<StatusLine>,
    pub(crate) view_mode: ViewMode,
    pub(crate) result_scroll: usize,
    pub(crate) result_max_scroll: usize,
    pub(crate) result_total_lines: usize,
    pub(crate) result_view_height: u16,
    pub(crate) pending_g: bool,
    pub(crate) confirm_quit: bool,
}

impl AppState {
    pub(crate) fn new(config: &Config) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            connected: false,
            system_prompt: PromptEditor::seeded(config.system_prompt()),
            user_prompt: PromptEditor::seeded(config.user_prompt()),
            focus: Focus::default(),
            phase: Phase::Idle,
            submitted_at: None,
            request_timeout: config.request_timeout(),
            last_result: None,
            status: None,
            view_mode: ViewMode::default(),
            result_scroll: 0,
            result_max_scroll: 0,
            result_total_lines: 0,
            result_view_height: 0,
            pending_g: false,
            confirm_quit: false,
        }
    }

    pub(crate) fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    pub(crate) fn is_loading(&self) -> bool {
        self.phase == Phase::Submitting
    }

    /// Submit action. Inert while a request is already in flight; refused
    /// with a warning while the connection is down. On success the prior
    /// result is cleared and the built request is returned for emission.
    pub(crate) fn begin_submit(&mut self, connected: bool) -> Option<ClassifyRequest> {
        if self.is_loading() {
            return None;
        }
        if !connected {
            self.set_status_warn("classifier not connected; request dropped");
            return None;
        }
        self.last_result = None;
        self.status = None;
        self.phase = Phase::Submitting;
        self.submitted_at = Some(Instant::now());
        Some(ClassifyRequest {
            system_prompt: self.system_prompt.as_str().to_string(),
            user_prompt: self.user_prompt.as_str().to_string(),
        })
    }

    /// Emission failed after the guard passed; roll the transition back.
    pub(crate) fn abort_submit(&mut self, reason: impl Into<String>) {
        self.phase = Phase::Idle;
        self.submitted_at = None;
        self.set_status_warn(reason);
    }

    /// Abandons the in-flight request. A late result is still accepted and
    /// replaces the result slot wholesale.
    pub(crate) fn cancel_submit(&mut self) -> bool {
        if !self.is_loading() {
            return false;
        }
        self.phase = Phase::Idle;
        self.submitted_at = None;
        self.set_status_notice("request cancelled");
        true
    }

    pub(crate) fn poll_timeout(&mut self, now: Instant) {
        let Some(submitted_at) = self.submitted_at else {
            return;
        };
        if now.duration_since(submitted_at) >= self.request_timeout {
            self.phase = Phase::Idle;
            self.submitted_at = None;
            self.set_status_warn(format!(
                "classifier did not respond within {}; request abandoned",
                humantime::format_duration(self.request_timeout)
            ));
        }
    }

    /// Inbound event from the classifier. Always clears the loading state,
    /// whatever the payload shape.
    pub(crate) fn handle_event(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::ClassificationResult(result) => {
                let round_trip = self.submitted_at.take().map(|since| since.elapsed());
                self.phase = Phase::Idle;
                self.status = None;
                self.last_result = Some(ClassificationOutcome {
                    envelope: result.result,
                    received_at: SystemTime::now(),
                    round_trip,
                });
                self.result_scroll = 0;
                self.pending_g = false;
            }
        }
    }

    pub(crate) fn set_status_notice(&mut self, text: impl Into<String>) {
        self.status = Some(StatusLine {
            text: text.into(),
            warn: false,
        });
    }

    pub(crate) fn set_status_warn(&mut self, text: impl Into<String>) {
        self.status = Some(StatusLine {
            text: text.into(),
            warn: true,
        });
    }

    pub(crate) fn focus_next(&mut self) {
        self.focus = match self.focus {
            Focus::SystemPrompt => Focus::UserPrompt,
            Focus::UserPrompt => Focus::SystemPrompt,
        };
    }

    pub(crate) fn focused_editor_mut(&mut self) -> &mut PromptEditor {
        match self.focus {
            Focus::SystemPrompt => &mut self.system_prompt,
            Focus::UserPrompt => &mut self.user_prompt,
        }
    }

    pub(crate) fn enter_raw_fullscreen(&mut self) {
        self.view_mode = ViewMode::RawFullscreen;
        self.result_scroll = 0;
        self.pending_g = false;
        self.confirm_quit = false;
    }

    pub(crate) fn exit_raw_fullscreen(&mut self) {
        self.view_mode = ViewMode::Normal;
        self.pending_g = false;
    }

    pub(crate) fn set_result_metrics(&mut self, total_lines: usize, view_height: u16) {
        let total_lines = total_lines.max(1);
        self.result_total_lines = total_lines;
        self.result_view_height = view_height;
        self.result_max_scroll = total_lines.saturating_sub(view_height as usize);
        if self.result_scroll > self.result_max_scroll {
            self.result_scroll = self.result_max_scroll;
        }
    }

    pub(crate) fn scroll_down(&mut self, lines: usize) {
        self.result_scroll = (self.result_scroll + lines).min(self.result_max_scroll);
        self.pending_g = false;
    }

    pub(crate) fn scroll_up(&mut self, lines: usize) {
        self.result_scroll = self.result_scroll.saturating_sub(lines);
        self.pending_g = false;
    }

    pub(crate) fn scroll_to_top(&mut self) {
        self.result_scroll = 0;
        self.pending_g = false;
    }

    pub(crate) fn scroll_to_bottom(&mut self) {
        self.result_scroll = self.result_max_scroll;
        self.pending_g = false;
    }

    pub(crate) fn page_size(&self) -> usize {
        let height = self.result_view_height.max(1) as usize;
        height.saturating_sub(1).max(1)
    }

    pub(crate) fn half_page_size(&self) -> usize {
        let height = self.result_view_height.max(1) as usize;
        (height / 2).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::ClassificationResult;

    fn test_app() -> AppState {
        let config: Config =
            toml::from_str(r#"endpoint = "127.0.0.1:9470""#).expect("config");
        AppState::new(&config)
    }

    fn result_event(label: &str) -> ServerEvent {
        ServerEvent::ClassificationResult(ClassificationResult {
            result: ResultEnvelope {
                label: label.to_string(),
                extra: Default::default(),
            },
        })
    }

    #[test]
    fn submit_while_disconnected_never_loads() {
        let mut app = test_app();
        assert!(app.begin_submit(false).is_none());
        assert!(!app.is_loading());
        assert!(app.status.as_ref().is_some_and(|status| status.warn));
    }

    #[test]
    fn submit_builds_request_from_editors() {
        let mut app = test_app();
        let request = app.begin_submit(true).expect("request");
        assert_eq!(request.system_prompt, "You are a helpful assistant.");
        assert_eq!(request.user_prompt, "How do I make a cake?");
        assert!(app.is_loading());
        assert!(app.last_result.is_none());
    }

    #[test]
    fn resubmit_while_loading_is_inert() {
        let mut app = test_app();
        assert!(app.begin_submit(true).is_some());
        assert!(app.begin_submit(true).is_none());
        assert!(app.is_loading());
    }

    #[test]
    fn new_submit_clears_previous_result() {
        let mut app = test_app();
        app.handle_event(result_event("Low-Risk"));
        assert!(app.last_result.is_some());
        assert!(app.begin_submit(true).is_some());
        assert!(app.last_result.is_none());
    }

    #[test]
    fn inbound_result_always_clears_loading() {
        let mut app = test_app();
        assert!(app.begin_submit(true).is_some());
        app.handle_event(result_event(""));
        assert!(!app.is_loading());
        let outcome = app.last_result.as_ref().expect("result");
        assert_eq!(outcome.envelope.label, "");
        assert!(outcome.round_trip.is_some());
    }

    #[test]
    fn unsolicited_result_is_accepted_without_round_trip() {
        let mut app = test_app();
        app.handle_event(result_event("Moderate (2-4)"));
        assert!(!app.is_loading());
        let outcome = app.last_result.as_ref().expect("result");
        assert!(outcome.round_trip.is_none());
    }

    #[test]
    fn timeout_returns_to_idle_with_warning() {
        let mut app = test_app();
        assert!(app.begin_submit(true).is_some());
        let deadline = Instant::now() + app.request_timeout + Duration::from_millis(1);
        app.poll_timeout(deadline);
        assert!(!app.is_loading());
        assert!(app.status.as_ref().is_some_and(|status| status.warn));
    }

    #[test]
    fn poll_before_deadline_keeps_submitting() {
        let mut app = test_app();
        assert!(app.begin_submit(true).is_some());
        app.poll_timeout(Instant::now());
        assert!(app.is_loading());
    }

    #[test]
    fn cancel_returns_to_idle_and_late_result_lands() {
        let mut app = test_app();
        assert!(app.begin_submit(true).is_some());
        assert!(app.cancel_submit());
        assert!(!app.is_loading());
        app.handle_event(result_event("High-Critical (5-10)"));
        let outcome = app.last_result.as_ref().expect("result");
        assert_eq!(outcome.envelope.label, "High-Critical (5-10)");
    }

    #[test]
    fn cancel_without_request_is_a_no_op() {
        let mut app = test_app();
        assert!(!app.cancel_submit());
        assert!(app.status.is_none());
    }

    #[test]
    fn abort_rolls_the_transition_back() {
        let mut app = test_app();
        assert!(app.begin_submit(true).is_some());
        app.abort_submit("send failed");
        assert!(!app.is_loading());
        assert!(app.status.as_ref().is_some_and(|status| status.warn));
    }
}
