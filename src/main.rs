use std::process::ExitCode;

use anyhow::{Result, bail};
use clap::Parser;
use colored::*;
use tracing::debug;

use clockout::api::BackendClient;
use clockout::app::{Action, App, ResultKind};
use clockout::cli::{Cli, Commands};
use clockout::config::Config;
use clockout::effect::drive;
use clockout::logging::{parse_level, setup_logging};
use clockout::runner;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("{}: {:#}, using defaults", "Warning".yellow(), e);
        Config::new()
    });

    let log_path = setup_logging(cli.log_level.as_deref(), config.log_level.as_deref())?;
    debug!(log_path = %log_path.display(), command = ?cli.command, "dispatching");

    let base_url = config.resolve_base_url(cli.base_url.as_deref());
    let client = BackendClient::new(&base_url);

    match cli.command {
        None => {
            runner::run(client).await?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Suggest) => print_suggestion(&client).await,
        Some(Commands::ClockOut) => run_action(&client, Action::ClockOut, None).await,
        Some(Commands::Plan { text }) => {
            run_action(&client, Action::UpdateSchedule, Some(text.join(" "))).await
        }
        Some(Commands::Config { set_base_url, set_log_level }) => {
            configure(config, set_base_url, set_log_level)
        }
    }
}

async fn print_suggestion(client: &BackendClient) -> Result<ExitCode> {
    let mut app = App::new(client.base_url());
    let effect = app.request_suggestion();
    drive(&mut app, effect, client).await;

    println!("{}", "Today's suggestion".bold().blue());
    if app.suggestion_available() {
        println!("{}", app.suggestion_text());
        Ok(ExitCode::SUCCESS)
    } else {
        println!("{}", app.suggestion_text().red());
        Ok(ExitCode::FAILURE)
    }
}

async fn run_action(client: &BackendClient, action: Action, plan: Option<String>) -> Result<ExitCode> {
    let mut app = App::new(client.base_url());
    if let Some(plan) = plan {
        app.plan_cursor = plan.chars().count();
        app.plan_input = plan;
    }

    let Some(effect) = app.activate(action) else {
        println!("{}", app.alert.unwrap_or_default().yellow());
        return Ok(ExitCode::FAILURE);
    };

    println!("{}...", action.pending_label().dimmed());
    drive(&mut app, effect, client).await;

    let Some(result) = app.result.as_ref() else {
        return Ok(ExitCode::FAILURE);
    };

    match result.kind {
        ResultKind::Success => {
            println!("{}", result.text.green());
            println!("\n{}", "Today's suggestion".bold().blue());
            println!("{}", app.suggestion_text());
            Ok(ExitCode::SUCCESS)
        }
        ResultKind::Error => {
            println!("{}", result.text.red());
            Ok(ExitCode::FAILURE)
        }
        ResultKind::Failure => {
            println!("{}", result.text.red());
            println!("Is the backend running at {}?", client.base_url().bold());
            Ok(ExitCode::FAILURE)
        }
    }
}

fn configure(mut config: Config, base_url: Option<String>, log_level: Option<String>) -> Result<ExitCode> {
    let path = Config::config_path()?;

    if base_url.is_none() && log_level.is_none() {
        println!("{} {}", "Config file:".bold(), path.display());
        println!("{}", serde_json::to_string_pretty(&config)?);
        println!(
            "{} {}",
            "Effective base URL:".bold(),
            config.resolve_base_url(None).green()
        );
        return Ok(ExitCode::SUCCESS);
    }

    if let Some(level) = log_level {
        if parse_level(&level).is_none() {
            bail!("unknown log level '{}' (expected TRACE, DEBUG, INFO, WARN, ERROR)", level);
        }
        config.log_level = Some(level);
    }
    if let Some(url) = base_url {
        config.base_url = Some(url.trim().trim_end_matches('/').to_string());
    }

    config.save()?;
    println!("{} {}", "Saved".green(), path.display());
    Ok(ExitCode::SUCCESS)
}
