//! `hookline validate` - check a hook configuration file

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use hookline_core::{HookConfig, validate_path};

#[derive(Args)]
pub struct ValidateArgs {
    /// Hook configuration file (JSON)
    #[arg(long)]
    pub hooks: PathBuf,
}

pub fn run(args: ValidateArgs) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let path = validate_path(&args.hooks, &cwd)?;
    let config = HookConfig::load(&path)
        .with_context(|| format!("Invalid hook configuration {}", path.display()))?;

    if config.is_empty() {
        println!("{}: no hooks configured", path.display());
        return Ok(());
    }

    println!("{}", render_table(&config));
    println!(
        "{}: {} hook(s) valid",
        path.display(),
        config.command_count()
    );
    Ok(())
}

fn render_table(config: &HookConfig) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Event").fg(Color::Cyan),
        Cell::new("Matcher").fg(Color::Cyan),
        Cell::new("Command").fg(Color::Cyan),
        Cell::new("Timeout").fg(Color::Cyan),
    ]);

    for (event, matchers) in config.iter() {
        for matcher in matchers {
            for command in matcher.commands() {
                table.add_row(vec![
                    Cell::new(event.as_str()),
                    Cell::new(matcher.pattern().unwrap_or("*")),
                    Cell::new(command.command()),
                    Cell::new(format!("{}s", command.timeout().as_secs_f64())),
                ]);
            }
        }
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_lists_every_command() {
        let config = HookConfig::from_json_str(
            r#"{
                "PreToolUse": [{"matcher": "Edit|Write", "hooks": [
                    {"type": "command", "command": "./lint.sh", "timeout": 30}
                ]}],
                "Stop": [{"hooks": [{"type": "command", "command": "./notify.sh"}]}]
            }"#,
        )
        .unwrap();

        let rendered = render_table(&config).to_string();

        assert!(rendered.contains("PreToolUse"));
        assert!(rendered.contains("Edit|Write"));
        assert!(rendered.contains("./lint.sh"));
        assert!(rendered.contains("30s"));
        assert!(rendered.contains("./notify.sh"));
        assert!(rendered.contains("60s"));
    }
}
