//! `hookline dispatch` - run the hooks for one event

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use hookline_core::{EventPayload, HookConfig, HookDispatcher, validate_path};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::config::ConfigLoader;

/// Exit status used when the hooks blocked the action
pub const BLOCKED_EXIT_CODE: u8 = 2;

#[derive(Args)]
pub struct DispatchArgs {
    /// Hook configuration file (JSON)
    #[arg(long)]
    pub hooks: PathBuf,

    /// Event payload file (reads stdin if omitted)
    #[arg(long)]
    pub payload: Option<PathBuf>,

    /// Tool name to match against (defaults to the payload's tool_name)
    #[arg(long)]
    pub tool: Option<String>,

    /// Log every hook's output
    #[arg(long)]
    pub debug: bool,

    /// Pretty-print the result
    #[arg(long)]
    pub pretty: bool,
}

pub async fn run(args: DispatchArgs) -> Result<ExitCode> {
    let cwd = std::env::current_dir()?;

    let hooks_path = validate_path(&args.hooks, &cwd)?;
    let hooks = HookConfig::load(&hooks_path)
        .with_context(|| format!("Failed to load hooks from {}", hooks_path.display()))?;
    let payload = read_payload(args.payload.as_deref(), &cwd)?;

    let settings = ConfigLoader::load()?;
    let mut dispatcher_config = settings.dispatcher.to_dispatcher_config();
    dispatcher_config.debug |= args.debug;
    let dispatcher = HookDispatcher::new(dispatcher_config);

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, terminating hooks");
            interrupt.cancel();
        }
    });

    let match_key = args.tool.as_deref().or(payload.tool_name());
    let result = dispatcher
        .dispatch_with_cancel(payload.hook_type(), &payload, &hooks, match_key, &cancel)
        .await;

    let json = if args.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{}", json);

    if result.should_block {
        if let Some(reason) = &result.block_reason {
            eprintln!("{}", reason);
        }
        return Ok(ExitCode::from(BLOCKED_EXIT_CODE));
    }
    Ok(ExitCode::SUCCESS)
}

fn read_payload(path: Option<&Path>, cwd: &Path) -> Result<EventPayload> {
    let contents = match path {
        Some(path) => {
            let path = validate_path(path, cwd)?;
            std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read payload {}", path.display()))?
        }
        None => {
            let mut contents = String::new();
            std::io::stdin()
                .read_to_string(&mut contents)
                .context("Failed to read payload from stdin")?;
            contents
        }
    };

    serde_json::from_str(&contents).context("Invalid event payload")
}
