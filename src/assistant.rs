//! Conversational assistant over the retail database.
//!
//! Holds the message history and runs a bounded loop of model steps: each
//! step either produces tool calls (executed through the dispatcher, results
//! appended as tool messages) or the final narrated answer.

use crate::error::{AssistantError, Result};
use crate::llm::{ChatMessage, LlmClient};
use crate::tools::{tool_definitions, ToolDispatcher};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

/// Upper bound on model steps within one turn.
const MAX_STEPS: u8 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantResponse {
    pub turn_id: String,
    pub answer: String,
    /// Tool activity recorded during the turn, in order.
    pub reasoning_steps: Vec<String>,
}

pub struct Assistant {
    llm: LlmClient,
    dispatcher: ToolDispatcher,
    history: Vec<ChatMessage>,
}

impl Assistant {
    pub fn new(llm: LlmClient, dispatcher: ToolDispatcher) -> Self {
        Self {
            llm,
            dispatcher,
            history: Vec::new(),
        }
    }

    /// Run one chat turn: ask the question, execute any tool calls the model
    /// makes, and return the final answer.
    pub async fn ask(&mut self, question: &str) -> Result<AssistantResponse> {
        let turn_id = Uuid::new_v4().to_string();
        let mut reasoning_steps = Vec::new();

        self.history.push(ChatMessage::user(question));

        let system_prompt = build_system_prompt();
        let tools = tool_definitions();

        for step in 1..=MAX_STEPS {
            info!("Model step {} of {}", step, MAX_STEPS);

            let reply = self.llm.chat(&system_prompt, &self.history, &tools).await?;

            if reply.tool_calls.is_empty() {
                let answer = reply.content.unwrap_or_default();
                self.history.push(ChatMessage::assistant(answer.clone()));
                return Ok(AssistantResponse {
                    turn_id,
                    answer,
                    reasoning_steps,
                });
            }

            self.history
                .push(ChatMessage::assistant_tool_calls(reply.tool_calls.clone()));

            for call in &reply.tool_calls {
                reasoning_steps.push(format!("Called tool '{}'", call.function.name));

                // Execution failures go back to the model so it can explain
                // the error and correct the query; everything else aborts
                // the turn.
                let result = match self.dispatcher.execute(call) {
                    Ok(value) => value,
                    Err(AssistantError::Database(e)) => {
                        reasoning_steps.push(format!("Query failed: {}", e));
                        json!({ "result": format!("Query failed: {}", e) })
                    }
                    Err(e) => return Err(e),
                };

                self.history
                    .push(ChatMessage::tool(call.id.clone(), result.to_string()));
            }
        }

        Err(AssistantError::Llm(format!(
            "Max steps ({}) exceeded without a final answer",
            MAX_STEPS
        )))
    }
}

fn build_system_prompt() -> String {
    format!(
        "You are an expert SQL assistant that helps users to query their database using natural language.

CONTEXT:
- The current date and time is {}.
- The database type is SQLite.
- The database tables are products and sales

ACCESS CAPABILITIES:
You have access to following tools:
1. schema tool call this tool to get the database schema which will help you to write sql query.
2. db tool call this tool to query the database.

Rules:
1. Generate ONLY SELECT queries (no INSERT, UPDATE, DELETE, DROP)
2. Always use the schema provided by the schema tool
3. Return valid SQLite syntax
4. Always respond in a helpful, conversational tone while being technically accurate.

SAFETY GUIDELINES:
- Never execute queries that could return sensitive data without user confirmation
- Always validate that table and column names exist in the schema
- If unsure about a query, ask for clarification before executing
- If a query fails, explain the error and suggest corrections

RESPONSE STYLE:
- Be conversational and helpful
- Explain what you're doing and why
- Provide context about the data you're retrieving
- If results are large, summarize key insights
- Always confirm the query before executing it",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    )
}
