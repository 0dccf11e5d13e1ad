use std::time::Instant;

use super::{
    record::{
        mask_actor_token, AdditionalInfo, AuditRecord, TransactionCategory, TransactionStatus,
        MISSING_TRX_ID,
    },
    request::{millis_since, RequestContext, ResponseContext, TransactionMetadata},
};
use crate::{
    error::{ErrorDetail, FailureCause},
    graph::Value,
    logger::Logger,
};

/// Message used when a transaction fails with neither an error nor text.
pub const OPAQUE_FAILURE_MESSAGE: &str = "error";

/// Builds audit records and hands them to a [`Logger`].
///
/// Successes are logged at `info`, failures at `warn`.
#[derive(Clone, Copy, Debug)]
pub struct AuditLogger<'a> {
    logger: &'a Logger,
}

impl<'a> AuditLogger<'a> {
    pub fn new(logger: &'a Logger) -> Self {
        Self { logger }
    }

    pub fn logger(&self) -> &'a Logger {
        self.logger
    }

    pub fn log_http_success(
        &self,
        message: &str,
        req: &RequestContext,
        res: &ResponseContext,
        meta: &TransactionMetadata,
    ) -> &Self {
        let record = http_record(req, res, meta, TransactionStatus::Success);
        self.logger.info(message, Some(&Value::from_serialize(&record)));
        self
    }

    /// Logs a failed request, using the error's name as the message.
    pub fn log_http_failure(
        &self,
        error: &ErrorDetail,
        req: &RequestContext,
        res: &ResponseContext,
        meta: &TransactionMetadata,
    ) -> &Self {
        let record = http_record(req, res, meta, TransactionStatus::Failure);
        self.logger
            .warn(&error.name, Some(error), Some(&Value::from_serialize(&record)));
        self
    }

    pub fn log_transaction_success(
        &self,
        message: &str,
        req: &RequestContext,
        meta: &TransactionMetadata,
        started_at: Instant,
    ) -> &Self {
        let record = transaction_record(req, meta, started_at, TransactionStatus::Success);
        self.emit_success(message, &record)
    }

    pub(crate) fn emit_success(&self, message: &str, record: &AuditRecord) -> &Self {
        self.logger.info(message, Some(&Value::from_serialize(record)));
        self
    }

    /// Logs a failed transaction.
    ///
    /// - An error logs its message and attaches the error detail.
    /// - Text is logged as the message with no error detail.
    /// - Any other value is logged as-is under `additionalInfo.error`.
    pub fn log_transaction_failure(
        &self,
        cause: impl Into<FailureCause>,
        req: &RequestContext,
        meta: &TransactionMetadata,
        started_at: Instant,
    ) -> &Self {
        let record = transaction_record(req, meta, started_at, TransactionStatus::Failure);
        let data = Value::from_serialize(&record);
        match cause.into() {
            FailureCause::Structured(detail) => {
                self.logger.warn(&detail.message, Some(&detail), Some(&data));
            }
            FailureCause::Text(text) => {
                self.logger.warn(&text, None, Some(&data));
            }
            FailureCause::Opaque(raw) => {
                if let Some(info) = data.get("additionalInfo") {
                    info.insert("error", raw);
                }
                self.logger.warn(OPAQUE_FAILURE_MESSAGE, None, Some(&data));
            }
        }
        self
    }
}

fn http_record(
    req: &RequestContext,
    res: &ResponseContext,
    meta: &TransactionMetadata,
    status: TransactionStatus,
) -> AuditRecord {
    AuditRecord {
        trx_category: TransactionCategory::Http,
        time_taken_in_millis: req.elapsed_millis(),
        additional_info: AdditionalInfo {
            url: req.url.clone(),
            method: req.method.clone(),
            src_ip: req.source_ip().map(str::to_owned),
            status_code: Some(res.status_code),
            result: None,
        },
        ..base_record(req, meta, status)
    }
}

pub(crate) fn transaction_record(
    req: &RequestContext,
    meta: &TransactionMetadata,
    started_at: Instant,
    status: TransactionStatus,
) -> AuditRecord {
    AuditRecord {
        time_taken_in_millis: Some(millis_since(started_at)),
        additional_info: AdditionalInfo {
            url: req.url.clone(),
            method: req.method.clone(),
            ..AdditionalInfo::default()
        },
        ..base_record(req, meta, status)
    }
}

fn base_record(
    req: &RequestContext,
    meta: &TransactionMetadata,
    status: TransactionStatus,
) -> AuditRecord {
    AuditRecord {
        trx_category: meta.trx_category,
        trx_id: req
            .correlation_id
            .clone()
            .unwrap_or_else(|| MISSING_TRX_ID.to_owned()),
        trx_name: meta.trx_name.clone(),
        trx_module: meta.trx_module.clone(),
        filename: meta.filename.clone(),
        trx_status: status,
        time_taken_in_millis: None,
        user_token: req.user.as_ref().map(mask_actor_token),
        additional_info: AdditionalInfo::default(),
    }
}
