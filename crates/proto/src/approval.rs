//! Tool approval policy shared by the supervisor and its callers.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default bound on consecutive implicit resumes before the drain aborts.
pub const DEFAULT_MAX_AUTO_APPROVALS: usize = 8;

/// Static policy deciding which tools bypass human confirmation.
///
/// The auto-approve set is checked by exact tool name. Membership of a
/// name that is not registered in the tool catalog is a configuration
/// error; use [`validated`](Self::validated) when building the policy
/// from user-supplied names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalPolicy {
    /// Tool names exempt from confirmation.
    auto_approve: HashSet<String>,
    /// Maximum chain of implicit resumes in one turn.
    max_auto_approvals: usize,
}

impl ApprovalPolicy {
    /// Creates a policy with the given auto-approve names, unvalidated.
    pub fn new(auto_approve: impl IntoIterator<Item = String>) -> Self {
        Self {
            auto_approve: auto_approve.into_iter().collect(),
            max_auto_approvals: DEFAULT_MAX_AUTO_APPROVALS,
        }
    }

    /// Creates a policy that requires confirmation for every tool.
    pub fn confirm_all() -> Self {
        Self::new([])
    }

    /// Creates a policy from auto-approve names, checking each against
    /// the registered tool catalog.
    pub fn validated<'a>(
        auto_approve: impl IntoIterator<Item = String>,
        registered: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, ConfigError> {
        let known: HashSet<&str> = registered.into_iter().collect();
        let mut names = HashSet::new();
        for name in auto_approve {
            if !known.contains(name.as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: "auto_approve".to_string(),
                    reason: format!("unknown tool: {name}"),
                });
            }
            names.insert(name);
        }
        Ok(Self {
            auto_approve: names,
            max_auto_approvals: DEFAULT_MAX_AUTO_APPROVALS,
        })
    }

    /// Overrides the auto-approval chain bound.
    pub fn with_max_auto_approvals(mut self, max: usize) -> Self {
        self.max_auto_approvals = max;
        self
    }

    /// Whether the named tool bypasses confirmation.
    pub fn is_auto_approved(&self, tool_name: &str) -> bool {
        self.auto_approve.contains(tool_name)
    }

    /// Maximum chain of implicit resumes in one turn.
    pub fn max_auto_approvals(&self) -> usize {
        self.max_auto_approvals
    }

    /// Names in the auto-approve set, sorted.
    pub fn auto_approved_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.auto_approve.iter().map(|s| s.as_str()).collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_is_checked_by_exact_name() {
        let policy = ApprovalPolicy::new(["get_family_names".to_string()]);
        assert!(policy.is_auto_approved("get_family_names"));
        assert!(!policy.is_auto_approved("get_family_names2"));
        assert!(!policy.is_auto_approved("GET_FAMILY_NAMES"));
    }

    #[test]
    fn confirm_all_approves_nothing() {
        let policy = ApprovalPolicy::confirm_all();
        assert!(!policy.is_auto_approved("get_weather"));
        assert!(policy.auto_approved_names().is_empty());
        assert_eq!(policy.max_auto_approvals(), DEFAULT_MAX_AUTO_APPROVALS);
    }

    #[test]
    fn validated_rejects_unregistered_tool() {
        let err = ApprovalPolicy::validated(
            ["get_weather".to_string(), "launch_rocket".to_string()],
            ["get_weather", "get_family_names"],
        )
        .expect_err("unknown tool should fail");
        match err {
            ConfigError::InvalidValue { field, reason } => {
                assert_eq!(field, "auto_approve");
                assert!(reason.contains("launch_rocket"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn validated_accepts_registered_subset() {
        let policy = ApprovalPolicy::validated(
            ["get_family_names".to_string()],
            ["get_weather", "get_family_names"],
        )
        .expect("valid subset");
        assert!(policy.is_auto_approved("get_family_names"));
        assert!(!policy.is_auto_approved("get_weather"));
    }

    #[test]
    fn max_auto_approvals_is_overridable() {
        let policy = ApprovalPolicy::confirm_all().with_max_auto_approvals(3);
        assert_eq!(policy.max_auto_approvals(), 3);
    }
}
