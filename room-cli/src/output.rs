//! Plain-text rendering of store contents.

use serde_json::Value;
use std::collections::BTreeMap;

/// Print `key = value` lines, indented under a heading.
pub fn print_entries(heading: &str, entries: &BTreeMap<String, Value>) {
    println!("{}:", heading);
    if entries.is_empty() {
        println!("  (no entries)");
        return;
    }
    for (key, value) in entries {
        println!("  {} = {}", key, value);
    }
}
