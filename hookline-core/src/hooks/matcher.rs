//! Tool-name matching for hook matchers

use regex::Regex;
use tracing::debug;

use super::config::HookMatcher;

/// Compile a matcher pattern, or `None` if it is not a valid regex
pub(crate) fn compile_pattern(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(e) => {
            debug!(pattern, error = %e, "Matcher pattern is not a regex, matching literally");
            None
        }
    }
}

/// Whether `matcher` applies to an event with the given tool name
///
/// - no pattern: always applies
/// - pattern but no tool name: never applies
/// - otherwise the pattern is searched for anywhere in the tool name, or
///   compared for equality if it did not compile
pub fn selects(matcher: &HookMatcher, tool_name: Option<&str>) -> bool {
    let Some(pattern) = matcher.pattern() else {
        return true;
    };
    let Some(tool_name) = tool_name else {
        return false;
    };

    match matcher.compiled() {
        Some(regex) => regex.is_match(tool_name),
        None => pattern == tool_name,
    }
}
