use std::fmt;

use crate::error::CoreError;

/// On-ledger anchoring lifecycle of a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorStatus {
    /// Digest computed, anchor transaction not yet confirmed.
    Pending,
    /// Digest durably recorded on the ledger.
    Anchored,
    /// Anchoring failed; safe to retry.
    Failed,
    /// Administratively revoked. Terminal state.
    Revoked,
}

impl AnchorStatus {
    /// Whether this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Revoked)
    }

    /// Lowercase wire string, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Anchored => "anchored",
            Self::Failed => "failed",
            Self::Revoked => "revoked",
        }
    }
}

impl fmt::Display for AnchorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Events that drive anchor status transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorEvent {
    /// An anchor attempt confirmed a transaction on the ledger.
    AnchorSucceeded,
    /// All anchor attempts failed (fatal error or retry budget exhausted).
    AnchorExhausted,
    /// Administrative revocation of an anchored credential.
    Revoke,
}

/// Manages anchor status transitions.
///
/// Valid transitions:
/// - Pending → Anchored (AnchorSucceeded)
/// - Pending → Failed (AnchorExhausted)
/// - Failed → Anchored (AnchorSucceeded, via manual retry)
/// - Failed → Failed (AnchorExhausted, retry failed again)
/// - Anchored → Revoked (Revoke)
pub struct AnchorStateMachine;

impl AnchorStateMachine {
    /// Attempt a status transition based on an event.
    /// Returns the new status on success, or an error for invalid transitions.
    pub fn transition(current: AnchorStatus, event: AnchorEvent) -> Result<AnchorStatus, CoreError> {
        let new_status = match (current, event) {
            (AnchorStatus::Pending, AnchorEvent::AnchorSucceeded) => AnchorStatus::Anchored,
            (AnchorStatus::Pending, AnchorEvent::AnchorExhausted) => AnchorStatus::Failed,
            (AnchorStatus::Failed, AnchorEvent::AnchorSucceeded) => AnchorStatus::Anchored,
            (AnchorStatus::Failed, AnchorEvent::AnchorExhausted) => AnchorStatus::Failed,
            (AnchorStatus::Anchored, AnchorEvent::Revoke) => AnchorStatus::Revoked,
            _ => {
                return Err(CoreError::InvalidStatusTransition {
                    from: current,
                    event,
                });
            }
        };

        tracing::debug!(
            from = %current,
            to = %new_status,
            event = ?event,
            "anchor status transition"
        );

        Ok(new_status)
    }

    /// Check if a transition is valid without performing it.
    pub fn can_transition(current: AnchorStatus, event: AnchorEvent) -> bool {
        Self::transition(current, event).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_success_from_pending() {
        let status =
            AnchorStateMachine::transition(AnchorStatus::Pending, AnchorEvent::AnchorSucceeded)
                .unwrap();
        assert_eq!(status, AnchorStatus::Anchored);
    }

    #[test]
    fn test_anchor_exhausted_from_pending() {
        let status =
            AnchorStateMachine::transition(AnchorStatus::Pending, AnchorEvent::AnchorExhausted)
                .unwrap();
        assert_eq!(status, AnchorStatus::Failed);
    }

    #[test]
    fn test_manual_retry_success_from_failed() {
        let status =
            AnchorStateMachine::transition(AnchorStatus::Failed, AnchorEvent::AnchorSucceeded)
                .unwrap();
        assert_eq!(status, AnchorStatus::Anchored);
    }

    #[test]
    fn test_manual_retry_exhausted_stays_failed() {
        let status =
            AnchorStateMachine::transition(AnchorStatus::Failed, AnchorEvent::AnchorExhausted)
                .unwrap();
        assert_eq!(status, AnchorStatus::Failed);
    }

    #[test]
    fn test_revoke_from_anchored() {
        let status = AnchorStateMachine::transition(AnchorStatus::Anchored, AnchorEvent::Revoke)
            .unwrap();
        assert_eq!(status, AnchorStatus::Revoked);
        assert!(status.is_terminal());
    }

    #[test]
    fn test_revoke_from_pending_is_invalid() {
        let result = AnchorStateMachine::transition(AnchorStatus::Pending, AnchorEvent::Revoke);
        assert!(result.is_err());
    }

    #[test]
    fn test_revoke_from_failed_is_invalid() {
        let result = AnchorStateMachine::transition(AnchorStatus::Failed, AnchorEvent::Revoke);
        assert!(result.is_err());
    }

    #[test]
    fn test_revoked_has_no_outgoing_transitions() {
        for event in [
            AnchorEvent::AnchorSucceeded,
            AnchorEvent::AnchorExhausted,
            AnchorEvent::Revoke,
        ] {
            assert!(AnchorStateMachine::transition(AnchorStatus::Revoked, event).is_err());
        }
    }

    #[test]
    fn test_anchored_cannot_be_reanchored() {
        let result =
            AnchorStateMachine::transition(AnchorStatus::Anchored, AnchorEvent::AnchorSucceeded);
        assert!(result.is_err());
        let result =
            AnchorStateMachine::transition(AnchorStatus::Anchored, AnchorEvent::AnchorExhausted);
        assert!(result.is_err());
    }

    #[test]
    fn test_can_transition() {
        assert!(AnchorStateMachine::can_transition(
            AnchorStatus::Pending,
            AnchorEvent::AnchorSucceeded
        ));
        assert!(!AnchorStateMachine::can_transition(
            AnchorStatus::Revoked,
            AnchorEvent::AnchorSucceeded
        ));
    }

    #[test]
    fn test_terminal_states() {
        assert!(AnchorStatus::Revoked.is_terminal());
        assert!(!AnchorStatus::Pending.is_terminal());
        assert!(!AnchorStatus::Anchored.is_terminal());
        assert!(!AnchorStatus::Failed.is_terminal());
    }

    #[test]
    fn test_display_matches_wire_strings() {
        assert_eq!(format!("{}", AnchorStatus::Pending), "pending");
        assert_eq!(format!("{}", AnchorStatus::Anchored), "anchored");
        assert_eq!(format!("{}", AnchorStatus::Failed), "failed");
        assert_eq!(format!("{}", AnchorStatus::Revoked), "revoked");
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&AnchorStatus::Anchored).unwrap(),
            "\"anchored\""
        );
        let back: AnchorStatus = serde_json::from_str("\"revoked\"").unwrap();
        assert_eq!(back, AnchorStatus::Revoked);
    }

    #[test]
    fn test_full_lifecycle() {
        // Pending → Failed → Anchored → Revoked
        let s = AnchorStatus::Pending;
        let s = AnchorStateMachine::transition(s, AnchorEvent::AnchorExhausted).unwrap();
        let s = AnchorStateMachine::transition(s, AnchorEvent::AnchorSucceeded).unwrap();
        assert_eq!(s, AnchorStatus::Anchored);
        let s = AnchorStateMachine::transition(s, AnchorEvent::Revoke).unwrap();
        assert_eq!(s, AnchorStatus::Revoked);
        assert!(s.is_terminal());
    }
}
