//! Redacted structured logging and audit trails for request-handling code.
//!
//! This crate separates:
//! - **Traversal**: walking arbitrary, possibly cyclic object graphs without
//!   unbounded recursion ([`traverse_and_mutate`], [`redact_properties`]).
//! - **Classification**: deciding from key names and value shapes whether a
//!   `(key, value)` pair is sensitive ([`Classifier`]).
//! - **Emission**: the leveled [`Logger`] that redacts every record before
//!   any [`Sink`] sees it, and the [`AuditLogger`] that builds HTTP and
//!   transaction audit records on top of it.
//!
//! Key rules:
//! - Caller data is never mutated. The logger redacts a working copy it owns
//!   for the duration of one call.
//! - Logging never fails and never panics from the caller's point of view.
//!   Values that cannot be serialized become placeholders, cycles become
//!   `"[Circular]"` and over-deep containers are emptied.
//! - Redaction is heuristic. False negatives are possible; callers who know a
//!   field is sensitive should strip it with [`redact_properties`] or extend
//!   the [`Classifier`] vocabulary.
//!
//! What it does not do:
//! - ship log transports or aggregation; records leave through [`Sink`]s
//! - verify tokens or parse keys; actor tokens arrive already decoded
//!
//! `slog` integration lives behind the `slog` feature.

// <https://doc.rust-lang.org/rustc/lints/listing/allowed-by-default.html>
#![warn(
    anonymous_parameters,
    bare_trait_objects,
    elided_lifetimes_in_paths,
    missing_copy_implementations,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces
)]
// <https://rust-lang.github.io/rust-clippy/stable>
#![warn(
    clippy::all,
    clippy::cargo,
    clippy::dbg_macro,
    clippy::float_cmp_const,
    clippy::get_unwrap,
    clippy::mem_forget,
    clippy::nursery,
    clippy::pedantic,
    clippy::todo,
    clippy::unwrap_used,
    clippy::uninlined_format_args
)]
// Allow some clippy lints
#![allow(
    clippy::default_trait_access,
    clippy::doc_markdown,
    clippy::if_not_else,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::use_self,
    clippy::cargo_common_metadata,
    clippy::missing_errors_doc,
    clippy::enum_glob_use,
    clippy::struct_excessive_bools,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::future_not_send,
    clippy::option_if_let_else,
    clippy::return_self_not_must_use
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::non_ascii_literal, clippy::unwrap_used))]

// Module declarations
mod audit;
mod classification;
mod error;
mod graph;
mod logger;
mod redaction;
#[cfg(feature = "slog")]
pub mod slog;

// Re-exports
pub use audit::{
    mask_actor_token, ActorToken, AdditionalInfo, AuditLogger, AuditRecord, RequestContext,
    ResponseContext, TransactionCategory, TransactionMetadata, TransactionOptions,
    TransactionStatus, MISSING_TRX_ID, OPAQUE_FAILURE_MESSAGE,
};
pub use classification::{
    contains_national_id, is_identifier_batch_key, is_sensitive_key, is_sensitive_value,
    looks_like_national_id, mask_national_id, Classifier, ClassifierBuilder, Verdict,
    NATIONAL_ID_MASKED_PREFIX,
};
pub use error::{ConfigError, ErrorDetail, FailureCause};
pub use graph::{Map, Node, Opaque, PropertyId, Value, UNSERIALIZABLE_PLACEHOLDER};
pub use logger::{
    render_console, ConsoleSink, Level, LogRecord, Logger, LoggerConfig, LoggingMode,
    MemorySink, OverrideDefault, Sink, DEFAULT_SECTION_SEPARATOR, UNSTRINGIFIABLE_PLACEHOLDER,
};
pub use redaction::{
    deep_clone, redact_properties, traverse_and_mutate, SpanConfig, TextRedactionPolicy,
    BATCH_PLACEHOLDER, CIRCULAR_PLACEHOLDER, DEFAULT_MAX_DEPTH, REDACTED_PLACEHOLDER,
};
