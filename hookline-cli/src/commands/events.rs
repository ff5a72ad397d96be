//! `hookline events` - list the lifecycle events hooks can attach to

use hookline_core::HookType;

pub fn run() {
    for event in HookType::ALL {
        if event.has_tool() {
            println!("{} (matches tool names)", event);
        } else {
            println!("{}", event);
        }
    }
}
