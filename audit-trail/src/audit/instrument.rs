//! Wrapping an operation so its outcome is audited.
//!
//! ```
//! use audit_trail::{
//!     AuditLogger, Logger, LoggingMode, MemorySink, RequestContext, TransactionMetadata,
//!     TransactionOptions,
//! };
//!
//! let sink = MemorySink::new();
//! let mut logger = Logger::silent(LoggingMode::Production);
//! logger.add_sink(sink.clone());
//! let audit = AuditLogger::new(&logger);
//!
//! let total: Result<u32, std::io::Error> = audit.transaction(
//!     &RequestContext::stamped(),
//!     &TransactionMetadata::new("sumInvoices", "BILLING"),
//!     &TransactionOptions::default(),
//!     |_req| Ok(42),
//! );
//!
//! assert_eq!(total.unwrap(), 42);
//! assert_eq!(sink.last().unwrap().message, "Transaction: sumInvoices success");
//! ```

use std::{error::Error as StdError, future::Future, time::Instant};

use serde::Serialize;

use super::{
    assembler::{transaction_record, AuditLogger},
    record::TransactionStatus,
    request::{RequestContext, TransactionMetadata},
};
use crate::{
    error::FailureCause,
    graph::{PropertyId, Value},
    redaction::redact_properties,
};

/// What a wrapped transaction logs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionOptions {
    /// Put the operation's result under `additionalInfo.result`.
    pub log_results: bool,
    /// Log successes. Failures are always logged.
    pub log_success: bool,
    /// Stripped from the result before it is logged.
    pub redacted_properties: Vec<PropertyId>,
}

impl Default for TransactionOptions {
    fn default() -> Self {
        Self {
            log_results: false,
            log_success: true,
            redacted_properties: Vec::new(),
        }
    }
}

impl TransactionOptions {
    #[must_use]
    pub fn log_results(mut self, log_results: bool) -> Self {
        self.log_results = log_results;
        self
    }

    #[must_use]
    pub fn log_success(mut self, log_success: bool) -> Self {
        self.log_success = log_success;
        self
    }

    #[must_use]
    pub fn redact(mut self, property: impl Into<PropertyId>) -> Self {
        self.redacted_properties.push(property.into());
        self
    }
}

impl AuditLogger<'_> {
    /// Runs `operation` and logs its outcome as a transaction.
    ///
    /// The outcome is returned unchanged.
    pub fn transaction<T, E, F>(
        &self,
        req: &RequestContext,
        meta: &TransactionMetadata,
        options: &TransactionOptions,
        operation: F,
    ) -> Result<T, E>
    where
        F: FnOnce(&RequestContext) -> Result<T, E>,
        T: Serialize,
        E: StdError,
    {
        let started_at = Instant::now();
        let outcome = operation(req);
        self.record_outcome(&outcome, req, meta, options, started_at);
        outcome
    }

    /// Awaits `operation` and logs its outcome as a transaction.
    pub async fn transaction_async<T, E, Fut>(
        &self,
        req: &RequestContext,
        meta: &TransactionMetadata,
        options: &TransactionOptions,
        operation: Fut,
    ) -> Result<T, E>
    where
        Fut: Future<Output = Result<T, E>>,
        T: Serialize,
        E: StdError,
    {
        let started_at = Instant::now();
        let outcome = operation.await;
        self.record_outcome(&outcome, req, meta, options, started_at);
        outcome
    }

    fn record_outcome<T, E>(
        &self,
        outcome: &Result<T, E>,
        req: &RequestContext,
        meta: &TransactionMetadata,
        options: &TransactionOptions,
        started_at: Instant,
    ) where
        T: Serialize,
        E: StdError,
    {
        match outcome {
            Ok(value) if options.log_success => {
                let mut record =
                    transaction_record(req, meta, started_at, TransactionStatus::Success);
                if options.log_results {
                    let result = Value::from_serialize(value);
                    record.additional_info.result =
                        Some(redact_properties(&options.redacted_properties, &result).to_json());
                }
                let message = format!("Transaction: {} success", meta.trx_name);
                self.emit_success(&message, &record);
            }
            Ok(_) => {}
            Err(error) => {
                self.log_transaction_failure(
                    FailureCause::from_error(error),
                    req,
                    meta,
                    started_at,
                );
            }
        }
    }
}
