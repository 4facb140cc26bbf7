//! Network requests the UI state asks for, and how they get run.
//!
//! `App` never talks to the backend itself. Its transitions return an
//! [`Effect`]; the runner spawns it and the completion comes back through the
//! event channel as an [`AppEvent`].

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::api::BackendClient;
use crate::app::{Action, App};
use crate::handler::handle_event;
use crate::tui::AppEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Tagged so late responses can be told apart from newer ones.
    FetchSuggestion(u64),
    ClockOut,
    /// Carries the already-trimmed plan text.
    UpdateSchedule(String),
}

/// Run an effect to completion and wrap the result as the event it produces.
pub async fn perform(effect: Effect, client: &BackendClient) -> AppEvent {
    debug!(?effect, "performing effect");
    match effect {
        Effect::FetchSuggestion(seq) => {
            AppEvent::SuggestionLoaded(seq, client.get_suggestion().await)
        }
        Effect::ClockOut => AppEvent::ActionSettled(Action::ClockOut, client.clock_out().await),
        Effect::UpdateSchedule(plan) => {
            AppEvent::ActionSettled(Action::UpdateSchedule, client.update_schedule(&plan).await)
        }
    }
}

/// Spawn an effect in the background; the result is sent on `tx`.
pub fn spawn(effect: Effect, client: &BackendClient, tx: &UnboundedSender<AppEvent>) {
    let client = client.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let event = perform(effect, &client).await;
        if tx.send(event).is_err() {
            warn!("event loop gone, dropping request result");
        }
    });
}

/// Run an effect and every follow-up it triggers, in order, without a
/// terminal. Used by the one-shot subcommands.
pub async fn drive(app: &mut App, effect: Effect, client: &BackendClient) {
    let mut next = Some(effect);
    while let Some(effect) = next {
        let event = perform(effect, client).await;
        next = handle_event(app, event);
    }
}
