use datachat::assistant::Assistant;
use datachat::database::Database;
use datachat::llm::{FunctionCall, LlmClient, ToolCall};
use datachat::tools::{ToolDispatcher, DB_TOOL};
use serde_json::json;

fn seeded_database() -> Database {
    let db = Database::in_memory().unwrap();
    db.init_schema().unwrap();
    db.seed_demo_data().unwrap();
    db
}

fn db_tool_call(query: &str) -> ToolCall {
    ToolCall {
        id: "call_1".to_string(),
        kind: "function".to_string(),
        function: FunctionCall {
            name: DB_TOOL.to_string(),
            arguments: json!({ "query": query }).to_string(),
        },
    }
}

#[test]
fn seeded_database_answers_selects() {
    let db = seeded_database();

    let output = db
        .run("SELECT region, sum(total_amount) AS revenue FROM sales GROUP BY region ORDER BY region")
        .unwrap();
    assert_eq!(output.row_count, 4);
    assert_eq!(output.rows[0]["region"], json!("Asia"));

    let join = db
        .run(
            "SELECT p.name, s.quantity FROM sales s \
             JOIN products p ON p.id = s.product_id \
             WHERE s.customer_name = 'John Smith'",
        )
        .unwrap();
    assert_eq!(join.row_count, 1);
    assert_eq!(join.rows[0]["name"], json!("Laptop Pro 15"));
    assert_eq!(join.rows[0]["quantity"], json!(2));
}

#[test]
fn mutating_statement_is_refused_and_nothing_changes() {
    let dispatcher = ToolDispatcher::new(seeded_database());

    let result = dispatcher
        .execute(&db_tool_call("   DELETE FROM products   "))
        .unwrap();
    assert_eq!(
        result["result"],
        json!("The user input contains info that might trigger database change")
    );
    assert_eq!(
        result["fixSuggestion"],
        json!("Please fix your input to avoid any database changes.")
    );

    let count = dispatcher
        .database()
        .run("SELECT count(*) AS n FROM products")
        .unwrap();
    assert_eq!(count.rows[0]["n"], json!(10));
}

#[test]
fn admitted_query_flows_through_to_the_database() {
    let dispatcher = ToolDispatcher::new(seeded_database());

    let result = dispatcher
        .execute(&db_tool_call(
            "select name, price from products where category = 'Electronics' order by price",
        ))
        .unwrap();
    assert_eq!(result["result"], json!("Query executed successfully."));
    assert_eq!(result["rowCount"], json!(4));
    assert_eq!(result["rows"][0]["name"], json!("Wireless Mouse"));
}

#[test]
fn malformed_sql_is_a_database_error_not_a_verdict() {
    let dispatcher = ToolDispatcher::new(seeded_database());
    // Passes the gate (no forbidden keyword) but fails to prepare.
    assert!(dispatcher.execute(&db_tool_call("SELEC nope")).is_err());
}

#[tokio::test]
async fn assistant_completes_a_turn_offline() {
    let llm = LlmClient::new("dummy-api-key".to_string());
    let mut assistant = Assistant::new(llm, ToolDispatcher::new(seeded_database()));

    let response = assistant.ask("What are the top selling products?").await.unwrap();
    assert!(!response.answer.is_empty());
    assert!(!response.turn_id.is_empty());
}
