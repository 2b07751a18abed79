//! Job descriptors and their validation.
//!
//! A [`JobDescriptor`] is what a caller submits. [`validate`] turns it into a
//! [`ValidatedJob`], the only form the engine accepts.

mod error;
mod types;
mod validate;

pub use error::{FilesystemError, ValidationError};
pub use types::{JobDescriptor, JobMode, SpeedFactor, ValidatedJob};
pub use validate::validate;
