//! Tool layer between the model and the database.
//!
//! Two tools are exposed: `schema` returns the fixed DDL text, and `db`
//! executes a model-generated query. The admission gate runs as a
//! precondition inside the `db` handler; a rejection is returned into the
//! tool-result channel so the model can revise the statement, never as an
//! error.

use crate::database::{Database, QueryOutput, SCHEMA_DDL};
use crate::error::{AssistantError, Result};
use crate::guardrails::QueryGuardrails;
use crate::llm::{ToolCall, ToolDefinition, ToolFunction};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

pub const SCHEMA_TOOL: &str = "schema";
pub const DB_TOOL: &str = "db";

/// Descriptors for the tools the model may call.
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            kind: "function".to_string(),
            function: ToolFunction {
                name: SCHEMA_TOOL.to_string(),
                description: "Call this tool to get the database schema information".to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {},
                }),
            },
        },
        ToolDefinition {
            kind: "function".to_string(),
            function: ToolFunction {
                name: DB_TOOL.to_string(),
                description: "Call this tool to query the database.".to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "The SQL query to be executed on the database.",
                        },
                    },
                    "required": ["query"],
                }),
            },
        },
    ]
}

#[derive(Debug, Deserialize)]
struct DbToolInput {
    query: String,
}

pub struct ToolDispatcher {
    database: Database,
    guardrails: QueryGuardrails,
}

impl ToolDispatcher {
    pub fn new(database: Database) -> Self {
        Self::with_guardrails(database, QueryGuardrails::new())
    }

    pub fn with_guardrails(database: Database, guardrails: QueryGuardrails) -> Self {
        Self {
            database,
            guardrails,
        }
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Route a tool call to its handler and return the JSON tool result.
    pub fn execute(&self, call: &ToolCall) -> Result<serde_json::Value> {
        match call.function.name.as_str() {
            SCHEMA_TOOL => Ok(json!(SCHEMA_DDL)),
            DB_TOOL => self.execute_db(&call.function.arguments),
            other => Err(AssistantError::Tool(format!("Unknown tool: {}", other))),
        }
    }

    fn execute_db(&self, arguments: &str) -> Result<serde_json::Value> {
        let input: DbToolInput = serde_json::from_str(arguments)
            .map_err(|e| AssistantError::Tool(format!("Invalid db tool arguments: {}", e)))?;

        info!("Model proposed query: {}", input.query);

        let verdict = self.guardrails.check(&input.query);
        if !verdict.is_valid {
            warn!("Query rejected by admission gate: {}", input.query);
            return Ok(json!({
                "result": verdict.error_message,
                "fixSuggestion": verdict.fix_suggestion,
            }));
        }

        let output = self.database.run(&input.query)?;
        Ok(db_success(output))
    }
}

fn db_success(output: QueryOutput) -> serde_json::Value {
    json!({
        "result": "Query executed successfully.",
        "rowCount": output.row_count,
        "columns": output.columns,
        "rows": output.rows,
    })
}
