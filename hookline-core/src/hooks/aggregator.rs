//! Folding per-hook results into one decision
//!
//! Results are processed in configuration order. A later result overwrites
//! the `block_reason` or `stop_reason` set by an earlier one, so the last
//! blocking hook decides the reason the caller sees.

use super::result::{DispatchResult, HookResult};

/// Exit code that blocks the pending action when stderr is non-empty
pub const BLOCKING_EXIT_CODE: i32 = 2;

/// Fold `results` into a [`DispatchResult`]
pub fn aggregate(results: Vec<HookResult>) -> DispatchResult {
    let mut aggregated = DispatchResult::empty();

    for result in &results {
        if result.exit_code == BLOCKING_EXIT_CODE && !result.stderr.is_empty() {
            aggregated.should_block = true;
            aggregated.block_reason = Some(result.stderr.clone());
        }

        if let Some(decision) = &result.structured_output {
            if decision.is_block() {
                aggregated.should_block = true;
                aggregated.block_reason = decision.reason.clone();
            }

            if decision.stops() {
                aggregated.should_continue = false;
                aggregated.stop_reason = decision.stop_reason.clone();
            }

            if let Some(context) = &decision.context
                && result.exit_code == 0
            {
                aggregated.context_to_add.push(context.clone());
            }
        }

        let suppressed = result
            .structured_output
            .as_ref()
            .is_some_and(|d| d.suppresses_output());

        if result.exit_code == 0 && !result.stdout.is_empty() && !suppressed {
            aggregated.context_to_add.push(result.stdout.clone());
        }
    }

    aggregated.results = results;
    aggregated
}
