//! Conformance test suite for `BindingStore` implementations.
//!
//! A backend-agnostic suite that any store can run to check the contract
//! the resolver relies on:
//!
//! - **Create**: primary key assignment, field preservation, exactly-one-target rejection
//! - **Update**: replacement, target kind switches, immutable parent, unknown ids
//! - **List**: parent scoping, every target kind included, `order` ascending
//!
//! # Usage
//!
//! ```ignore
//! use binding_store::conformance::run_conformance_suite;
//!
//! #[tokio::test]
//! async fn remote_conformance() {
//!     let report = run_conformance_suite(|| async { connect_test_store().await }).await;
//!     assert!(report.failed == 0, "{report}");
//! }
//! ```

mod create;
mod list;
mod update;

use std::fmt;
use std::future::Future;

use binding_model::BindingPayload;

use crate::BindingStore;

/// Result of a single conformance test.
#[derive(Debug, Clone)]
pub struct TestResult {
    /// Test category (e.g. "create", "update", "list").
    pub category: String,
    pub name: String,
    pub passed: bool,
    /// Error message if the test failed.
    pub message: Option<String>,
}

impl TestResult {
    fn from_result(category: &str, name: &str, result: Result<(), String>) -> Self {
        let (passed, message) = match result {
            Ok(()) => (true, None),
            Err(msg) => (false, Some(msg)),
        };
        Self {
            category: category.to_string(),
            name: name.to_string(),
            passed,
            message,
        }
    }
}

/// Aggregated report from a full conformance suite run.
#[derive(Debug, Clone)]
pub struct ConformanceReport {
    pub results: Vec<TestResult>,
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Conformance: {}/{} passed ({} failed)",
            self.passed, self.total, self.failed
        )?;
        for r in self.results.iter().filter(|r| !r.passed) {
            writeln!(
                f,
                "  FAIL [{}/{}]: {}",
                r.category,
                r.name,
                r.message.as_deref().unwrap_or("(no message)")
            )?;
        }
        Ok(())
    }
}

/// Run the full conformance suite against a store.
///
/// `factory` is called once per test and must return a fresh, empty store.
pub async fn run_conformance_suite<S, F, Fut>(factory: F) -> ConformanceReport
where
    S: BindingStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.extend(create::run_create_tests(&factory).await);
    results.extend(update::run_update_tests(&factory).await);
    results.extend(list::run_list_tests(&factory).await);

    let passed = results.iter().filter(|r| r.passed).count();
    let total = results.len();

    ConformanceReport {
        results,
        passed,
        failed: total - passed,
        total,
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn policy_binding(parent: &str, policy: &str, order: i64) -> BindingPayload {
    let mut payload = BindingPayload::new(parent);
    payload.policy = Some(policy.to_string());
    payload.order = order;
    payload
}

fn group_binding(parent: &str, group: &str, order: i64) -> BindingPayload {
    let mut payload = BindingPayload::new(parent);
    payload.group = Some(group.to_string());
    payload.order = order;
    payload
}

fn user_binding(parent: &str, user: &str, order: i64) -> BindingPayload {
    let mut payload = BindingPayload::new(parent);
    payload.user = Some(user.to_string());
    payload.order = order;
    payload
}

/// Create `payload` and return its assigned primary key.
async fn create<S>(store: &S, payload: BindingPayload) -> Result<String, String>
where
    S: BindingStore,
{
    let created = store
        .create_binding(payload)
        .await
        .map_err(|e| format!("create: {e}"))?;
    created
        .pk
        .ok_or_else(|| "created binding has no pk".to_string())
}
