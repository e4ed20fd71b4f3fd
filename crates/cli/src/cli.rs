use clap::{Parser, Subcommand};
use serde_json::Value;

/// Browse and edit the course catalog
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Base URL of the course API, overriding the config file
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List every course
    List,

    /// List the courses in one category, in display order
    Category { name: String },

    /// Change fields of a course and save it
    Save {
        id: String,

        /// A field to change. Values are parsed as JSON if possible, otherwise used as strings.
        #[arg(short = 's', long = "set", value_name = "KEY=VALUE", value_parser = parse_change, required = true)]
        changes: Vec<(String, Value)>,
    },

    /// Write the current configuration to the config file
    Init,
}

pub fn parse_change(s: &str) -> Result<(String, Value), String> {
    let (k, v) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {}", s))?;
    if k.is_empty() {
        return Err(format!("missing key in {}", s));
    }

    let v = serde_json::from_str(v).unwrap_or_else(|_| Value::String(v.to_string()));
    Ok((k.to_string(), v))
}
