use std::collections::HashSet;
use std::sync::Mutex;
use lazy_static::lazy_static;
use log::{error, info};

lazy_static! {
    /// Unique invariant descriptions that have been asserted true during this run.
    static ref CHECKED_INVARIANTS: Mutex<HashSet<String>> = Mutex::new(HashSet::new());
}

/// Asserts that a critical patching invariant holds.
///
/// A false condition panics in debug/test builds and logs a critical error in
/// release builds; an installer helper that silently produces a broken project
/// file is worse than one that stops. A true condition is recorded so contract
/// tests can verify the check actually ran.
///
/// # Arguments
/// * `condition` - The boolean result of the check.
/// * `description` - A human-readable description (e.g., "patched text pins every target platform version").
/// * `component` - Optional component tag (e.g., "Patcher", "Discovery").
pub fn assert_invariant(condition: bool, description: &str, component: Option<&str>) {
    if !condition {
        let msg = format!(
            "CRITICAL INVARIANT VIOLATION [{}]: {}",
            component.unwrap_or("General"),
            description
        );
        error!("{}", msg);

        if cfg!(debug_assertions) || cfg!(test) {
            panic!("{}", msg);
        }
    } else if let Ok(mut set) = CHECKED_INVARIANTS.lock() {
        set.insert(description.to_string());
    }
}

/// Verifies that specific invariants were actually asserted during execution.
///
/// Used by tests to prove the patch logic enforces the rules it claims to,
/// rather than merely producing the right output on one input.
///
/// # Arguments
/// * `context` - Name of the test context.
/// * `required_invariants` - Description strings that MUST have been asserted.
#[allow(dead_code)]
pub fn contract_test(context: &str, required_invariants: &[&str]) {
    let checked = CHECKED_INVARIANTS.lock().unwrap();
    let missing: Vec<&str> = required_invariants
        .iter()
        .filter(|req| !checked.contains(**req))
        .copied()
        .collect();

    if !missing.is_empty() {
        panic!(
            "Contract Test Failed for '{}'. The following invariants were NOT checked:\n{:#?}",
            context, missing
        );
    } else {
        info!("Contract Test Passed: {}", context);
    }
}

/// Clears the invariant log. Call this before running a new isolated test.
#[allow(dead_code)]
pub fn clear_invariant_log() {
    if let Ok(mut set) = CHECKED_INVARIANTS.lock() {
        set.clear();
    }
}
