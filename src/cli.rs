use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "clockout")]
#[command(about = "Clock out, plan schedule changes, and read today's suggestion")]
#[command(version)]
pub struct Cli {
    /// Backend base URL (overrides CLOCKOUT_BASE_URL and the config file)
    #[arg(short, long, global = true)]
    pub base_url: Option<String>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    /// Runs the interactive TUI when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print today's suggestion
    Suggest,
    /// Record that you are leaving now
    ClockOut,
    /// Send a free-text schedule change, e.g. "off tomorrow"
    Plan {
        /// Plan text; multiple words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Show or update the saved configuration
    Config {
        /// Save this backend base URL
        #[arg(long = "set-base-url", value_name = "URL")]
        set_base_url: Option<String>,
        /// Save this log level
        #[arg(long = "set-log-level", value_name = "LEVEL")]
        set_log_level: Option<String>,
    },
}
