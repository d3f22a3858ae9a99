//! Agent-facing tool surface
//!
//! Every tool takes plain string arguments and returns a JSON string,
//! the calling convention LLM agent frameworks expect. Nothing here
//! panics or raises; failures come back inside the JSON payload.

use crate::profile::ProfileStore;
use crate::rag::RagPipeline;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Declarative description of one tool, for agent registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// The tools exposed to admission agents
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "update_user_data".to_string(),
            description: "Update one field of a student's profile by dot-notation path \
                          (e.g. personal_info.full_name). Creates the profile on first \
                          contact and reports completeness after the write."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "phone_number": { "type": "string", "description": "Student's phone number (primary identifier)" },
                    "field_path": { "type": "string", "description": "Dot notation path to the field" },
                    "value": { "description": "Value to set" },
                    "agent_id": { "type": "string", "description": "Calling agent identifier, recorded in metadata" }
                },
                "required": ["phone_number", "field_path", "value", "agent_id"]
            }),
        },
        ToolDefinition {
            name: "get_user_data".to_string(),
            description: "Retrieve a student's profile with its completeness accounting. \
                          Use before deciding what to ask next."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "phone_number": { "type": "string", "description": "Student's phone number (primary identifier)" }
                },
                "required": ["phone_number"]
            }),
        },
        ToolDefinition {
            name: "get_required_data_schema".to_string(),
            description: "Get the full schema of fields a complete application must fill in."
                .to_string(),
            input_schema: json!({ "type": "object", "properties": {} }),
        },
        ToolDefinition {
            name: "search_course_documents".to_string(),
            description: "Semantic search over the course knowledge base. An optional \
                          program filter narrows results to one program."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Natural language search query" },
                    "program_filter": { "type": "string", "description": "Optional program name to focus on" },
                    "limit": { "type": "integer", "description": "Maximum number of documents to return" }
                },
                "required": ["query"]
            }),
        },
        ToolDefinition {
            name: "search_eligibility_requirements".to_string(),
            description: "Find eligibility requirements and admission policies for a \
                          program given the student's academic background."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "student_background": { "type": "string", "description": "Student's qualifications and grades" },
                    "program_name": { "type": "string", "description": "Program the student is interested in" }
                },
                "required": ["student_background", "program_name"]
            }),
        },
    ]
}

/// Bundles the retrieval pipeline and profile store behind the string-in,
/// JSON-string-out surface agents call.
pub struct AgentToolkit {
    rag: RagPipeline,
    profiles: ProfileStore,
}

impl AgentToolkit {
    pub fn new(rag: RagPipeline, profiles: ProfileStore) -> Self {
        Self { rag, profiles }
    }

    /// Update one profile field; returns the update result as JSON
    pub fn update_user_data(
        &self,
        phone_number: &str,
        field_path: &str,
        value: Value,
        agent_id: &str,
    ) -> String {
        let result = self.profiles.update(phone_number, field_path, value, agent_id);
        to_json_string(&result)
    }

    /// Read a profile and its completeness; returns JSON
    pub fn get_user_data(&self, phone_number: &str) -> String {
        let result = self.profiles.read(phone_number);
        to_json_string(&result)
    }

    /// The required profile schema as JSON
    pub fn get_required_data_schema(&self) -> String {
        to_json_string(&crate::profile::required_schema())
    }

    /// Semantic search over course documents; returns JSON
    pub async fn search_course_documents(
        &self,
        query: &str,
        program_filter: &str,
        limit: Option<usize>,
    ) -> String {
        let response = self.rag.search_documents(query, program_filter, limit).await;
        to_json_string(&response)
    }

    /// Eligibility-focused search; returns JSON
    pub async fn search_eligibility_requirements(
        &self,
        student_background: &str,
        program_name: &str,
    ) -> String {
        let response = self
            .rag
            .search_eligibility(student_background, program_name)
            .await;
        to_json_string(&response)
    }
}

/// Serialize for the agent boundary. Serialization of these response types
/// cannot realistically fail, but the fallback keeps the contract absolute.
fn to_json_string<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        json!({
            "status": "error",
            "message": format!("Internal serialization error: {}", e)
        })
        .to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_definitions_cover_the_agent_surface() {
        let defs = tool_definitions();
        let names: Vec<&str> = defs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "update_user_data",
                "get_user_data",
                "get_required_data_schema",
                "search_course_documents",
                "search_eligibility_requirements",
            ]
        );

        for def in &defs {
            assert!(def.input_schema.get("type").is_some(), "{}", def.name);
        }
    }

    #[test]
    fn test_required_fields_listed_in_schemas() {
        let defs = tool_definitions();
        let update = defs.iter().find(|d| d.name == "update_user_data").unwrap();
        let required = update.input_schema["required"].as_array().unwrap();
        assert_eq!(required.len(), 4);
    }
}
