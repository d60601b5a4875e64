// ABOUTME: Command-line interface definitions using clap
// ABOUTME: Defines subcommands plus connection, output and conversion flags

use crate::canvas::ContentKind;
use chrono::FixedOffset;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "canvas-things")]
#[command(about = "Turn Canvas courses into a Things 3 import URL", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Canvas API token (overrides CANVAS_AUTH_TOKEN)
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Canvas user id (overrides CANVAS_USER_ID)
    #[arg(long, global = true)]
    pub user_id: Option<u64>,

    /// GraphQL endpoint (overrides CANVAS_ENDPOINT)
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// File that receives the URL
    #[arg(long, global = true, default_value = "./url.txt")]
    pub output: PathBuf,

    /// Print the URL instead of writing a file
    #[arg(long, global = true)]
    pub stdout: bool,

    /// Content type to leave out, e.g. Quiz (repeatable)
    #[arg(long = "skip", global = true, value_name = "KIND")]
    pub skip: Vec<ContentKind>,

    /// Offset for rendered dates (+HH:MM or -HH:MM)
    #[arg(
        long,
        global = true,
        default_value = "+00:00",
        allow_hyphen_values = true,
        value_parser = parse_utc_offset
    )]
    pub utc_offset: FixedOffset,

    /// Ask Things to show the imported items
    #[arg(long, global = true)]
    pub reveal: bool,
}

fn parse_utc_offset(s: &str) -> Result<FixedOffset, String> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0).ok_or_else(|| "Offset out of range".into());
    }

    let (sign, rest) = if let Some(rest) = s.strip_prefix('+') {
        (1, rest)
    } else if let Some(rest) = s.strip_prefix('-') {
        (-1, rest)
    } else {
        return Err("Expected format: +HH:MM or -HH:MM".into());
    };

    let (hours, minutes) = rest
        .split_once(':')
        .ok_or("Expected format: +HH:MM or -HH:MM")?;
    if hours.len() != 2 || minutes.len() != 2 {
        return Err("Expected format: +HH:MM or -HH:MM".into());
    }

    let hours: i32 = hours.parse().map_err(|_| "Invalid hours")?;
    let minutes: i32 = minutes.parse().map_err(|_| "Invalid minutes")?;
    if hours > 23 || minutes > 59 {
        return Err("Offset out of range".into());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
        .ok_or_else(|| "Offset out of range".into())
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Fetch enrollments and write the Things URL (default)
    Sync,

    /// List enrollments with course ids and names
    Courses,

    /// Convert a saved GraphQL response instead of querying Canvas
    Convert {
        /// JSON file holding the response or its `data` value
        file: PathBuf,
    },
}

impl Cli {
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Sync)
    }
}
