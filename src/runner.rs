//! Interactive loop: owns the terminal and the `App`, feeds events through
//! the handler, and spawns the effects it returns.

use anyhow::Result;
use tracing::{debug, info};

use crate::api::BackendClient;
use crate::app::App;
use crate::effect;
use crate::handler::handle_event;
use crate::tui::{self, EventHandler};
use crate::ui;

pub async fn run(client: BackendClient) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let result = event_loop(&mut terminal, client).await;

    tui::restore()?;
    result
}

async fn event_loop(terminal: &mut tui::Tui, client: BackendClient) -> Result<()> {
    let mut app = App::new(client.base_url());
    let mut events = EventHandler::new();
    let tx = events.sender();

    info!(base_url = client.base_url(), "starting TUI");
    let initial = app.request_suggestion();
    effect::spawn(initial, &client, &tx);

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        let Some(event) = events.next().await else {
            debug!("event channel closed");
            break;
        };

        if let Some(effect) = handle_event(&mut app, event) {
            effect::spawn(effect, &client, &tx);
        }
    }

    info!("quitting");
    Ok(())
}
