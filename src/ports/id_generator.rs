//! Identifier generation port.

use crate::domain::foundation::SessionId;

pub trait IdGenerator: Send + Sync {
    fn session_id(&self) -> SessionId;
}
