//! Treelint - repository hygiene linter.
//!
//! Treelint runs an ordered battery of independent checks over a
//! version-controlled working tree and aggregates violations into one
//! formatted report, exiting non-zero on any violation. It polices
//! structural conventions: license headers, trailing whitespace,
//! deprecation-notice grammar, binary-file exclusion via content hashing,
//! internal import-graph acyclicity, and generated-code consistency.
//!
//! # Architecture
//!
//! The tool is deliberately shallow: line/regex scanning, never an AST.
//! It enforces formatting conventions, not semantics.
//!
//! - `config`: immutable rule tables injected into every check
//! - `vcs`: the git collaborator (tracked-file listing)
//! - `enumerate`: directory walk intersected with the tracked set
//! - `fingerprint`: content hashing and the legacy binary allow-list
//! - `checks`: the per-rule scanning passes and the battery runner
//! - `graph`: the internal dependency graph and cycle detection
//! - `process`: external analyzer/codegen invocations
//! - `report`: output formatting (text, JSON)

pub mod checks;
pub mod cli;
pub mod config;
pub mod enumerate;
pub mod fingerprint;
pub mod graph;
pub mod process;
pub mod report;
pub mod vcs;

pub use checks::{CheckResult, Runner, Violation};
pub use config::{Aggregation, Config};
pub use enumerate::{Enumerator, TrackedFile};
pub use fingerprint::{AllowList, Fingerprint};
pub use graph::DependencyGraph;
