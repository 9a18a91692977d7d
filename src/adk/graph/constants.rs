// SPDX-License-Identifier: MIT

/// The virtual entry node
pub const START: &str = "__start__";

/// The virtual exit node
pub const END: &str = "__end__";

/// Node executions allowed per invocation unless overridden
pub const DEFAULT_RECURSION_LIMIT: usize = 25;

/// Check if a node name is reserved
pub fn is_reserved_name(name: &str) -> bool {
    name == START || name == END
}
