use async_trait::async_trait;

use ivy_core::tools::{Tool, ToolError, ToolResult};

/// Deliberately trivial lookup tool: any deterministic string-to-string
/// function fits the same contract.
pub struct GetUserAgeTool;

#[async_trait]
impl Tool for GetUserAgeTool {
    fn name(&self) -> &str {
        "get_user_age"
    }

    fn description(&self) -> &str {
        "Use this tool to find the user's age."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": "The user's name"
                }
            },
            "required": ["name"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolResult, ToolError> {
        let name = args["name"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("missing 'name'".to_string()))?;

        if name.to_lowercase().contains("bob") {
            Ok(ToolResult::ok("42 years old"))
        } else {
            Ok(ToolResult::ok("41 years old"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn age_of(name: &str) -> String {
        GetUserAgeTool
            .execute(serde_json::json!({ "name": name }))
            .await
            .unwrap()
            .output
    }

    #[tokio::test]
    async fn bob_is_42() {
        assert_eq!(age_of("bob").await, "42 years old");
        assert_eq!(age_of("BOBBY").await, "42 years old");
        assert_eq!(age_of("Mr. Bob Smith").await, "42 years old");
    }

    #[tokio::test]
    async fn everyone_else_is_41() {
        assert_eq!(age_of("alice").await, "41 years old");
        assert_eq!(age_of("").await, "41 years old");
    }

    #[tokio::test]
    async fn missing_name_is_invalid() {
        let result = GetUserAgeTool.execute(serde_json::json!({})).await;
        assert!(matches!(result, Err(ToolError::InvalidArguments(_))));
    }

    #[test]
    fn schema_advertises_name_parameter() {
        let schema = GetUserAgeTool.to_schema();
        assert_eq!(schema.function.name, "get_user_age");
        assert_eq!(
            schema.function.parameters["required"],
            serde_json::json!(["name"])
        );
    }
}
