//! Command-line interface.

pub mod commands;
pub mod output;
pub mod types;

pub use types::{Cli, Commands};

use console::style;

/// Print `err` (and its causes) and exit with status 1.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    let causes: Vec<String> = err.chain().skip(1).map(ToString::to_string).collect();

    if json_mode {
        let body = serde_json::json!({
            "error": err.to_string(),
            "causes": causes,
        });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("{} {}", style("Error:").red().bold(), err);
        for cause in &causes {
            eprintln!("  {cause}");
        }
    }

    std::process::exit(1);
}
