//! Mock family roster lookup tools.
//!
//! Both tools are read-only lookups against a fixed roster and are
//! auto-approved: they resume without asking the user.

use async_trait::async_trait;
use proto::ToolResult;
use serde::Deserialize;

use crate::Tool;

const ROSTER: &[(&str, &str, u8)] = &[
    ("father", "Wang Jianguo", 52),
    ("mother", "Li Meihua", 48),
    ("elder brother", "Wang Xiaoming", 28),
    ("younger sister", "Wang Xiaohong", 22),
    ("grandfather", "Wang Laoye", 75),
    ("grandmother", "Zhang Laotai", 72),
];

fn member_json(relationship: &str, name: &str, age: u8) -> serde_json::Value {
    serde_json::json!({
        "relationship": relationship,
        "name": name,
        "age": age.to_string(),
    })
}

/// Tool that lists every family member on the roster.
pub struct FamilyNamesTool;

#[async_trait]
impl Tool for FamilyNamesTool {
    fn name(&self) -> &str {
        "get_family_names"
    }

    fn description(&self) -> &str {
        "List all family members with their relationship, name, and age."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {}
        })
    }

    fn requires_confirmation(&self) -> bool {
        false
    }

    async fn execute(&self, call_id: &str, _args: serde_json::Value) -> ToolResult {
        let members: Vec<serde_json::Value> = ROSTER
            .iter()
            .map(|(rel, name, age)| member_json(rel, name, *age))
            .collect();
        ToolResult::success(
            call_id,
            self.name(),
            serde_json::Value::Array(members).to_string(),
        )
    }
}

#[derive(Debug, Deserialize)]
struct FamilyMemberArgs {
    relationship: String,
}

/// Tool that looks up one family member by relationship.
pub struct FamilyMemberTool;

#[async_trait]
impl Tool for FamilyMemberTool {
    fn name(&self) -> &str {
        "get_family_member_by_relationship"
    }

    fn description(&self) -> &str {
        "Look up a single family member by relationship \
         (e.g. father, mother, elder brother, younger sister)."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "relationship": {
                    "type": "string",
                    "description": "Relationship of the family member to look up"
                }
            },
            "required": ["relationship"]
        })
    }

    fn requires_confirmation(&self) -> bool {
        false
    }

    async fn execute(&self, call_id: &str, args: serde_json::Value) -> ToolResult {
        let member_args: FamilyMemberArgs = match serde_json::from_value(args) {
            Ok(a) => a,
            Err(e) => {
                return ToolResult::error(call_id, self.name(), format!("Invalid arguments: {e}"));
            }
        };

        let found = ROSTER
            .iter()
            .find(|(rel, _, _)| *rel == member_args.relationship);

        // An unknown relationship is a normal lookup miss, reported in
        // the payload rather than as a failed call.
        let payload = match found {
            Some((rel, name, age)) => member_json(rel, name, *age),
            None => serde_json::json!({
                "error": format!(
                    "No family member with relationship '{}'",
                    member_args.relationship
                )
            }),
        };

        ToolResult::success(call_id, self.name(), payload.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lists_whole_roster() {
        let tool = FamilyNamesTool;
        let result = tool.execute("c1", serde_json::json!({})).await;
        assert!(!result.is_error);

        let members: Vec<serde_json::Value> =
            serde_json::from_str(&result.output).expect("json array");
        assert_eq!(members.len(), ROSTER.len());
        assert_eq!(members[0]["relationship"], "father");
        assert_eq!(members[0]["name"], "Wang Jianguo");
    }

    #[tokio::test]
    async fn finds_member_by_relationship() {
        let tool = FamilyMemberTool;
        let result = tool
            .execute("c2", serde_json::json!({"relationship":"mother"}))
            .await;
        assert!(!result.is_error);

        let member: serde_json::Value = serde_json::from_str(&result.output).expect("json");
        assert_eq!(member["name"], "Li Meihua");
        assert_eq!(member["age"], "48");
    }

    #[tokio::test]
    async fn unknown_relationship_reports_miss_in_payload() {
        let tool = FamilyMemberTool;
        let result = tool
            .execute("c3", serde_json::json!({"relationship":"cousin"}))
            .await;
        assert!(!result.is_error);

        let payload: serde_json::Value = serde_json::from_str(&result.output).expect("json");
        assert!(
            payload["error"]
                .as_str()
                .expect("error message")
                .contains("cousin")
        );
    }

    #[test]
    fn family_tools_are_auto_approved() {
        assert!(!FamilyNamesTool.requires_confirmation());
        assert!(!FamilyMemberTool.requires_confirmation());
    }
}
