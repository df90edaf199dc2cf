//! Confirmation classifier and control-state derivation.
//!
//! Both functions are pure and total: no engine access, no failure
//! paths. The supervisor computes the control state fresh on every
//! turn; it is never stored.

/// Interpretation of a user reply to a confirmation prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// The user approved the pending call.
    Approve,
    /// The user declined the pending call.
    Reject,
    /// The reply could not be read as either.
    Ambiguous,
}

/// Classifies a free-text reply as approve/reject/ambiguous.
///
/// Case-insensitive prefix match: `accept`/`yes` approve, `reject`/`no`
/// decline. Missing or empty input is ambiguous.
pub fn classify(input: Option<&str>) -> Confirmation {
    let Some(text) = input else {
        return Confirmation::Ambiguous;
    };
    let lowered = text.to_lowercase();
    if lowered.starts_with("accept") || lowered.starts_with("yes") {
        Confirmation::Approve
    } else if lowered.starts_with("reject") || lowered.starts_with("no") {
        Confirmation::Reject
    } else {
        Confirmation::Ambiguous
    }
}

/// Control state of one supervised turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlState {
    /// No pending call; process the turn as new input.
    Normal,
    /// Pending call exists and the user approved it.
    Resume,
    /// Pending call exists and the user declined it.
    Reject,
    /// Pending call exists and the reply was unclassifiable.
    InvalidConfirmation,
}

/// Derives the control state from the pause marker and the user reply.
///
/// `Resume`, `Reject`, and `InvalidConfirmation` are only reachable
/// while a call is pending; `Normal` is the only state otherwise.
pub fn control_state(pending: bool, input: Option<&str>) -> ControlState {
    if !pending {
        return ControlState::Normal;
    }
    match classify(input) {
        Confirmation::Approve => ControlState::Resume,
        Confirmation::Reject => ControlState::Reject,
        Confirmation::Ambiguous => ControlState::InvalidConfirmation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approve_prefixes_match_case_insensitively() {
        for input in ["yes", "YES", "Yes", "yes123", "accept", "Accept it", "ACCEPTED"] {
            assert_eq!(classify(Some(input)), Confirmation::Approve, "input: {input}");
        }
    }

    #[test]
    fn reject_prefixes_match_case_insensitively() {
        for input in ["no", "NO", "No thanks", "no, ask about London instead", "reject", "REJECT this"] {
            assert_eq!(classify(Some(input)), Confirmation::Reject, "input: {input}");
        }
    }

    #[test]
    fn everything_else_is_ambiguous() {
        // " yes" included: prefix match only, no trimming.
        for input in ["maybe", "ok", "sure", "y", " yes", "是的", "продолжай"] {
            assert_eq!(classify(Some(input)), Confirmation::Ambiguous, "input: {input:?}");
        }
    }

    #[test]
    fn null_and_empty_input_are_ambiguous() {
        assert_eq!(classify(None), Confirmation::Ambiguous);
        assert_eq!(classify(Some("")), Confirmation::Ambiguous);
    }

    #[test]
    fn classifier_is_total_over_odd_inputs() {
        for input in ["\0", "\u{1F600}", "ＹＥＳ", "ño", "\n yes"] {
            let _ = classify(Some(input));
        }
        // Unicode lowercasing keeps the prefix rule byte-exact: fullwidth
        // or accented variants do not approve.
        assert_eq!(classify(Some("ＹＥＳ")), Confirmation::Ambiguous);
    }

    #[test]
    fn control_state_without_pending_is_always_normal() {
        for input in [Some("yes"), Some("no"), Some("maybe"), None] {
            assert_eq!(control_state(false, input), ControlState::Normal);
        }
    }

    #[test]
    fn control_state_with_pending_follows_classification() {
        assert_eq!(control_state(true, Some("yes")), ControlState::Resume);
        assert_eq!(control_state(true, Some("accept")), ControlState::Resume);
        assert_eq!(control_state(true, Some("no way")), ControlState::Reject);
        assert_eq!(control_state(true, Some("reject")), ControlState::Reject);
        assert_eq!(
            control_state(true, Some("maybe")),
            ControlState::InvalidConfirmation
        );
        assert_eq!(control_state(true, None), ControlState::InvalidConfirmation);
    }
}
