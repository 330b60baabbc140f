//! SessionStatus enum for tracking the lifecycle of conference sessions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{StateMachine, ValidationError};

/// Lifecycle status of a conference session.
///
/// ```text
/// Pending ──► Accepted ──► Cancelled
///    │
///    └──────► Rejected
/// ```
///
/// The numeric codes are the values persisted in the `status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
    Cancelled,
}

impl SessionStatus {
    /// Persisted numeric code.
    pub fn code(&self) -> i16 {
        match self {
            SessionStatus::Pending => 1,
            SessionStatus::Accepted => 2,
            SessionStatus::Rejected => 3,
            SessionStatus::Cancelled => 4,
        }
    }

    /// Inverse of [`SessionStatus::code`].
    pub fn from_code(code: i16) -> Result<Self, ValidationError> {
        match code {
            1 => Ok(SessionStatus::Pending),
            2 => Ok(SessionStatus::Accepted),
            3 => Ok(SessionStatus::Rejected),
            4 => Ok(SessionStatus::Cancelled),
            other => Err(ValidationError::out_of_range("status", 1, 4, other as i64)),
        }
    }

    /// Only pending proposals can be edited or withdrawn by their proposer.
    pub fn is_editable(&self) -> bool {
        matches!(self, SessionStatus::Pending)
    }

    /// Sessions open to the public listing.
    pub fn is_public(&self) -> bool {
        matches!(self, SessionStatus::Accepted)
    }
}

impl StateMachine for SessionStatus {
    fn valid_transitions(&self) -> &'static [Self] {
        match self {
            SessionStatus::Pending => &[SessionStatus::Accepted, SessionStatus::Rejected],
            SessionStatus::Accepted => &[SessionStatus::Cancelled],
            SessionStatus::Rejected | SessionStatus::Cancelled => &[],
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionStatus::Pending => "pending",
            SessionStatus::Accepted => "accepted",
            SessionStatus::Rejected => "rejected",
            SessionStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for SessionStatus {
    type Err = ValidationError;

    /// Accepts either the name (`accepted`) or the numeric code (`2`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" | "1" => Ok(SessionStatus::Pending),
            "accepted" | "2" => Ok(SessionStatus::Accepted),
            "rejected" | "3" => Ok(SessionStatus::Rejected),
            "cancelled" | "canceled" | "4" => Ok(SessionStatus::Cancelled),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown status '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_pending() {
        assert_eq!(SessionStatus::default(), SessionStatus::Pending);
    }

    #[test]
    fn pending_can_be_accepted_or_rejected() {
        assert!(SessionStatus::Pending.can_transition_to(&SessionStatus::Accepted));
        assert!(SessionStatus::Pending.can_transition_to(&SessionStatus::Rejected));
        assert!(!SessionStatus::Pending.can_transition_to(&SessionStatus::Cancelled));
    }

    #[test]
    fn accepted_can_only_be_cancelled() {
        assert_eq!(
            SessionStatus::Accepted.valid_transitions(),
            &[SessionStatus::Cancelled]
        );
    }

    #[test]
    fn nothing_returns_to_pending() {
        for status in [
            SessionStatus::Accepted,
            SessionStatus::Rejected,
            SessionStatus::Cancelled,
        ] {
            assert!(!status.can_transition_to(&SessionStatus::Pending));
        }
    }

    #[test]
    fn rejected_and_cancelled_are_terminal() {
        assert!(SessionStatus::Rejected.is_terminal());
        assert!(SessionStatus::Cancelled.is_terminal());
        assert!(!SessionStatus::Accepted.is_terminal());
    }

    #[test]
    fn codes_round_trip() {
        for status in [
            SessionStatus::Pending,
            SessionStatus::Accepted,
            SessionStatus::Rejected,
            SessionStatus::Cancelled,
        ] {
            assert_eq!(SessionStatus::from_code(status.code()).unwrap(), status);
        }
        assert!(SessionStatus::from_code(0).is_err());
    }

    #[test]
    fn parses_names_and_codes() {
        assert_eq!("accepted".parse::<SessionStatus>().unwrap(), SessionStatus::Accepted);
        assert_eq!("1".parse::<SessionStatus>().unwrap(), SessionStatus::Pending);
        assert!("archived".parse::<SessionStatus>().is_err());
    }

    #[test]
    fn serializes_to_snake_case_json() {
        assert_eq!(
            serde_json::to_string(&SessionStatus::Accepted).unwrap(),
            "\"accepted\""
        );
    }
}
