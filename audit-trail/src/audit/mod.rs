//! Audit trail records for HTTP requests and business transactions.
//!
//! [`AuditLogger`] turns request context and an outcome into an
//! [`AuditRecord`] and logs it through a [`crate::Logger`], so audit records
//! get the same redaction as every other record. On top of that, national
//! identifiers inside the actor token are masked before the record is built.

mod assembler;
mod instrument;
mod record;
mod request;

pub use assembler::{AuditLogger, OPAQUE_FAILURE_MESSAGE};
pub use instrument::TransactionOptions;
pub use record::{
    mask_actor_token, ActorToken, AdditionalInfo, AuditRecord, TransactionCategory,
    TransactionStatus, MISSING_TRX_ID,
};
pub use request::{RequestContext, ResponseContext, TransactionMetadata};
