//! Deep object redaction.
//!
//! - **`policy`**: how a single string is redacted (`TextRedactionPolicy`)
//! - **`properties`**: copy-on-write stripping of named properties
//! - **`traverse`**: in-place rewriting of every value, guarded against cycles
//!   and runaway depth
//!
//! Deciding *which* values are sensitive lives in `crate::classification`.

mod policy;
mod properties;
mod traverse;

pub use policy::{SpanConfig, TextRedactionPolicy, BATCH_PLACEHOLDER, REDACTED_PLACEHOLDER};
pub(crate) use properties::working_copy;
pub use properties::{deep_clone, redact_properties};
pub use traverse::{traverse_and_mutate, CIRCULAR_PLACEHOLDER, DEFAULT_MAX_DEPTH};
