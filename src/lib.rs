pub mod assistant;
pub mod database;
pub mod error;
pub mod guardrails;
pub mod llm;
pub mod tools;
