//! Contexts command - list configured contexts

use console::style;
use stevedore_core::Context;

use crate::config::StevedoreConfig;
use crate::error::Result;

pub fn run(config: &StevedoreConfig, context_name: Option<&str>) -> Result<()> {
    if config.contexts.is_empty() {
        println!("No contexts configured");
        return Ok(());
    }

    let selected = config.selected(context_name);
    for context in &config.contexts {
        let marker = if Some(context.name.as_str()) == selected {
            style("*").green().to_string()
        } else {
            " ".to_string()
        };
        println!("{} {}", marker, format_context(context));
    }

    Ok(())
}

/// `name (kubernetes context) key=value, ...`
pub fn format_context(context: &Context) -> String {
    let labels: Vec<String> = context
        .labels
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect();

    let mut line = context.name.clone();
    if !context.kubernetes_context.is_empty() {
        line.push_str(&format!(" ({})", context.kubernetes_context));
    }
    if !labels.is_empty() {
        line.push_str(&format!(" {}", labels.join(", ")));
    }
    line
}
