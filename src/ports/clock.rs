//! Clock port.
//!
//! Every time comparison in the lifecycle rules reads the current instant
//! from here, so tests can pin it.

use crate::domain::foundation::Timestamp;

pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}
