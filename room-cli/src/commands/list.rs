//! List registered mutators.

use room_core::MutatorRegistry;

/// Run the list command.
pub fn run() {
    let registry = MutatorRegistry::standard();
    println!("=== room-cli mutators ({}) ===", registry.len());
    for name in registry.names() {
        println!("  {}", name);
    }
}
