use ratatui::layout::Rect;
use tracing::{debug, info, warn};
use crate::api::{ActionOutcome, Suggestion};
use crate::effect::Effect;

pub const SUGGESTION_LOADING: &str = "Loading today's suggestion...";
pub const SUGGESTION_FAILED: &str = "Could not load today's suggestion.";
pub const SUCCESS_BANNER: &str = "Success: ";
pub const ERROR_BANNER: &str = "Error: ";
pub const REQUEST_FAILED: &str = "Request failed. Check your connection and try again.";
pub const EMPTY_PLAN_ALERT: &str = "Please enter your schedule plan before submitting.";

/// The two buttons that talk to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ClockOut,
    UpdateSchedule,
}

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Action::ClockOut => "Clock out",
            Action::UpdateSchedule => "Submit plan",
        }
    }

    pub fn pending_label(&self) -> &'static str {
        match self {
            Action::ClockOut => "Clocking out",
            Action::UpdateSchedule => "Submitting",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    ClockOut,
    PlanInput,
    Submit,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::ClockOut => Focus::PlanInput,
            Focus::PlanInput => Focus::Submit,
            Focus::Submit => Focus::ClockOut,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Focus::ClockOut => Focus::Submit,
            Focus::PlanInput => Focus::ClockOut,
            Focus::Submit => Focus::PlanInput,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    /// 2xx from an action endpoint
    Success,
    /// Non-2xx with a server message
    Error,
    /// Transport or decode failure
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultText {
    pub kind: ResultKind,
    pub text: String,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub focus: Focus,
    pub base_url: String,

    // Plan input
    pub plan_input: String,
    pub plan_cursor: usize, // cursor position in plan_input, in chars

    // Panels
    pub suggestion: String,
    pending_suggestions: u32,
    suggestion_seq: u64,     // last fetch issued
    suggestion_shown: u64,   // fetch whose response is on screen
    suggestion_ready: bool,
    pub result: Option<ResultText>,
    pub result_scroll: u16,
    pub result_lines: u16,  // wrapped line count (updated during render)
    pub result_height: u16, // visible rows (updated during render)
    pub alert: Option<String>, // blocking validation prompt

    // Per-button in-flight flags
    clock_out_pending: bool,
    update_pending: bool,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Widget areas for mouse hit-testing (updated during render)
    pub clock_out_area: Option<Rect>,
    pub plan_area: Option<Rect>,
    pub submit_area: Option<Rect>,
    pub result_area: Option<Rect>,
}

impl App {
    pub fn new(base_url: &str) -> Self {
        Self {
            should_quit: false,
            focus: Focus::ClockOut,
            base_url: base_url.to_string(),

            plan_input: String::new(),
            plan_cursor: 0,

            suggestion: String::new(),
            pending_suggestions: 0,
            suggestion_seq: 0,
            suggestion_shown: 0,
            suggestion_ready: false,
            result: None,
            result_scroll: 0,
            result_lines: 0,
            result_height: 0,
            alert: None,

            clock_out_pending: false,
            update_pending: false,

            animation_frame: 0,

            clock_out_area: None,
            plan_area: None,
            submit_area: None,
            result_area: None,
        }
    }

    /// True while the button's request is in flight (the button is disabled).
    pub fn is_pending(&self, action: Action) -> bool {
        match action {
            Action::ClockOut => self.clock_out_pending,
            Action::UpdateSchedule => self.update_pending,
        }
    }

    pub fn suggestion_loading(&self) -> bool {
        self.pending_suggestions > 0
    }

    /// Text for the suggestion panel.
    pub fn suggestion_text(&self) -> &str {
        if self.suggestion.is_empty() && self.suggestion_loading() {
            SUGGESTION_LOADING
        } else {
            &self.suggestion
        }
    }

    /// True when the panel holds a suggestion the backend actually gave us.
    pub fn suggestion_available(&self) -> bool {
        self.suggestion_ready
    }

    pub fn request_suggestion(&mut self) -> Effect {
        self.pending_suggestions += 1;
        self.suggestion_seq += 1;
        Effect::FetchSuggestion(self.suggestion_seq)
    }

    /// Press a button. Returns the request to issue, or `None` when the
    /// button is disabled or the plan failed validation.
    pub fn activate(&mut self, action: Action) -> Option<Effect> {
        if self.is_pending(action) {
            debug!(?action, "button disabled, ignoring");
            return None;
        }

        match action {
            Action::ClockOut => {
                self.clock_out_pending = true;
                info!("clocking out");
                Some(Effect::ClockOut)
            }
            Action::UpdateSchedule => {
                let plan = self.plan_input.trim();
                if plan.is_empty() {
                    self.alert = Some(EMPTY_PLAN_ALERT.to_string());
                    return None;
                }
                let plan = plan.to_string();
                self.update_pending = true;
                info!(chars = plan.chars().count(), "submitting schedule plan");
                Some(Effect::UpdateSchedule(plan))
            }
        }
    }

    /// Show the response to fetch `seq`. A response older than the one
    /// already on screen is dropped.
    pub fn apply_suggestion(&mut self, seq: u64, result: anyhow::Result<Suggestion>) {
        self.pending_suggestions = self.pending_suggestions.saturating_sub(1);
        if seq < self.suggestion_shown {
            debug!(seq, shown = self.suggestion_shown, "dropping stale suggestion");
            return;
        }
        self.suggestion_shown = seq;
        self.suggestion_ready = matches!(result, Ok(Suggestion::Ready(_)));
        self.suggestion = match result {
            Ok(Suggestion::Ready(message)) => message,
            Ok(Suggestion::Unavailable(message)) if message.trim().is_empty() => SUGGESTION_FAILED.to_string(),
            Ok(Suggestion::Unavailable(message)) => format!("{} {}", SUGGESTION_FAILED, message),
            Err(e) => {
                warn!("suggestion request failed: {:#}", e);
                SUGGESTION_FAILED.to_string()
            }
        };
    }

    /// Render an action's response and re-enable its button. A successful
    /// action asks for a fresh suggestion.
    pub fn settle(&mut self, action: Action, result: anyhow::Result<ActionOutcome>) -> Option<Effect> {
        match action {
            Action::ClockOut => self.clock_out_pending = false,
            Action::UpdateSchedule => self.update_pending = false,
        }
        self.result_scroll = 0;

        match result {
            Ok(ActionOutcome { success: true, message }) => {
                info!(?action, "action succeeded");
                self.result = Some(ResultText {
                    kind: ResultKind::Success,
                    text: format!("{}{}", SUCCESS_BANNER, message),
                });
                Some(self.request_suggestion())
            }
            Ok(ActionOutcome { success: false, message }) => {
                warn!(?action, %message, "action rejected by backend");
                self.result = Some(ResultText {
                    kind: ResultKind::Error,
                    text: format!("{}{}", ERROR_BANNER, message),
                });
                None
            }
            Err(e) => {
                warn!(?action, "action request failed: {:#}", e);
                self.result = Some(ResultText {
                    kind: ResultKind::Failure,
                    text: REQUEST_FAILED.to_string(),
                });
                None
            }
        }
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.clock_out_pending || self.update_pending || self.suggestion_loading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn ellipsis(&self) -> &'static str {
        match self.animation_frame {
            0 => ".",
            1 => "..",
            _ => "...",
        }
    }

    // Result panel scrolling
    pub fn scroll_result_down(&mut self) {
        if self.result_scroll < self.result_lines.saturating_sub(self.result_height) {
            self.result_scroll = self.result_scroll.saturating_add(1);
        }
    }

    pub fn scroll_result_up(&mut self) {
        self.result_scroll = self.result_scroll.saturating_sub(1);
    }

    pub fn scroll_result_page_down(&mut self) {
        let page = self.result_height.max(1);
        let max_scroll = self.result_lines.saturating_sub(self.result_height);
        self.result_scroll = (self.result_scroll + page).min(max_scroll);
    }

    pub fn scroll_result_page_up(&mut self) {
        let page = self.result_height.max(1);
        self.result_scroll = self.result_scroll.saturating_sub(page);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    fn ok(success: bool, message: &str) -> anyhow::Result<ActionOutcome> {
        Ok(ActionOutcome { success, message: message.to_string() })
    }

    #[test]
    fn test_empty_plan_raises_alert_without_request() {
        let mut app = App::new("http://localhost:3000");
        app.plan_input = "   \n\t ".to_string();

        assert_eq!(app.activate(Action::UpdateSchedule), None);
        assert_eq!(app.alert.as_deref(), Some(EMPTY_PLAN_ALERT));
        assert!(!app.is_pending(Action::UpdateSchedule));
    }

    #[test]
    fn test_plan_is_trimmed() {
        let mut app = App::new("http://localhost:3000");
        app.plan_input = "  off next Wednesday \n".to_string();

        assert_eq!(
            app.activate(Action::UpdateSchedule),
            Some(Effect::UpdateSchedule("off next Wednesday".to_string()))
        );
        assert!(app.is_pending(Action::UpdateSchedule));
        // The input is left as typed
        assert_eq!(app.plan_input, "  off next Wednesday \n");
    }

    #[test]
    fn test_pending_button_ignores_presses() {
        let mut app = App::new("http://localhost:3000");
        assert_eq!(app.activate(Action::ClockOut), Some(Effect::ClockOut));
        assert_eq!(app.activate(Action::ClockOut), None);
        assert!(app.is_pending(Action::ClockOut));
    }

    #[test]
    fn test_buttons_are_independent() {
        let mut app = App::new("http://localhost:3000");
        app.plan_input = "work Saturday".to_string();

        assert!(app.activate(Action::ClockOut).is_some());
        assert!(app.activate(Action::UpdateSchedule).is_some());
        assert!(app.is_pending(Action::ClockOut));
        assert!(app.is_pending(Action::UpdateSchedule));

        app.settle(Action::ClockOut, ok(true, "done"));
        assert!(!app.is_pending(Action::ClockOut));
        assert!(app.is_pending(Action::UpdateSchedule));
    }

    #[test]
    fn test_success_refetches_suggestion_once() {
        let mut app = App::new("http://localhost:3000");
        app.activate(Action::ClockOut);

        let follow_up = app.settle(Action::ClockOut, ok(true, "Clocked out at 19:02"));
        assert_eq!(follow_up, Some(Effect::FetchSuggestion(1)));
        assert!(app.suggestion_loading());
        assert!(!app.is_pending(Action::ClockOut));
        assert_eq!(
            app.result,
            Some(ResultText {
                kind: ResultKind::Success,
                text: "Success: Clocked out at 19:02".to_string(),
            })
        );
    }

    #[test]
    fn test_error_status_renders_error_banner() {
        let mut app = App::new("http://localhost:3000");
        app.plan_input = "tomorrow off".to_string();
        app.activate(Action::UpdateSchedule);

        let follow_up = app.settle(Action::UpdateSchedule, ok(false, "server error"));
        assert_eq!(follow_up, None);
        assert!(!app.is_pending(Action::UpdateSchedule));
        let result = app.result.unwrap();
        assert_eq!(result.kind, ResultKind::Error);
        assert_eq!(result.text, "Error: server error");
    }

    #[test]
    fn test_transport_failure_renders_generic_text() {
        let mut app = App::new("http://localhost:3000");
        app.activate(Action::ClockOut);

        let follow_up = app.settle(Action::ClockOut, Err(anyhow!("connection refused")));
        assert_eq!(follow_up, None);
        assert!(!app.is_pending(Action::ClockOut));
        let result = app.result.unwrap();
        assert_eq!(result.kind, ResultKind::Failure);
        assert_eq!(result.text, REQUEST_FAILED);
    }

    fn fetch(app: &mut App) -> u64 {
        match app.request_suggestion() {
            Effect::FetchSuggestion(seq) => seq,
            other => panic!("unexpected effect: {:?}", other),
        }
    }

    #[test]
    fn test_suggestion_rendering() {
        let mut app = App::new("http://localhost:3000");
        let seq = fetch(&mut app);
        assert_eq!(app.suggestion_text(), SUGGESTION_LOADING);

        app.apply_suggestion(seq, Ok(Suggestion::Ready("Go home on time".to_string())));
        assert!(!app.suggestion_loading());
        assert!(app.suggestion_available());
        assert_eq!(app.suggestion_text(), "Go home on time");

        let seq = fetch(&mut app);
        // Old text stays up while refreshing
        assert_eq!(app.suggestion_text(), "Go home on time");

        app.apply_suggestion(seq, Ok(Suggestion::Unavailable("sheet missing".to_string())));
        assert!(!app.suggestion_available());
        assert_eq!(app.suggestion_text(), format!("{} sheet missing", SUGGESTION_FAILED));

        let seq = fetch(&mut app);
        app.apply_suggestion(seq, Ok(Suggestion::Unavailable(String::new())));
        assert_eq!(app.suggestion_text(), SUGGESTION_FAILED);

        let seq = fetch(&mut app);
        app.apply_suggestion(seq, Err(anyhow!("dns failure")));
        assert!(!app.suggestion_available());
        assert_eq!(app.suggestion_text(), SUGGESTION_FAILED);
    }

    #[test]
    fn test_older_suggestion_does_not_overwrite_newer() {
        let mut app = App::new("http://localhost:3000");
        let manual = fetch(&mut app);
        let after_action = fetch(&mut app);

        app.apply_suggestion(after_action, Ok(Suggestion::Ready("Leave at 18:00".to_string())));
        assert!(app.suggestion_loading());

        app.apply_suggestion(manual, Ok(Suggestion::Ready("Stay late".to_string())));
        assert_eq!(app.suggestion_text(), "Leave at 18:00");
        assert!(app.suggestion_available());
        assert!(!app.suggestion_loading());
    }

    #[test]
    fn test_result_scroll_is_bounded_and_reset() {
        let mut app = App::new("http://localhost:3000");
        app.result_lines = 12;
        app.result_height = 5;

        app.scroll_result_page_down();
        assert_eq!(app.result_scroll, 5);
        app.scroll_result_page_down();
        assert_eq!(app.result_scroll, 7);
        app.scroll_result_down();
        assert_eq!(app.result_scroll, 7);
        app.scroll_result_up();
        app.scroll_result_page_up();
        assert_eq!(app.result_scroll, 1);

        app.activate(Action::ClockOut);
        app.settle(Action::ClockOut, ok(false, "late"));
        assert_eq!(app.result_scroll, 0);
    }

    #[test]
    fn test_focus_cycles() {
        assert_eq!(Focus::ClockOut.next(), Focus::PlanInput);
        assert_eq!(Focus::Submit.next(), Focus::ClockOut);
        assert_eq!(Focus::ClockOut.prev(), Focus::Submit);
    }
}
