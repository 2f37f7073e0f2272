use anyhow::Result;
use clap::Parser;
use datachat::assistant::Assistant;
use datachat::database::Database;
use datachat::llm::LlmClient;
use datachat::tools::ToolDispatcher;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "datachat")]
#[command(about = "Ask the products and sales database questions in natural language")]
struct Args {
    /// The question in natural language
    question: String,

    /// Path to the SQLite database file (in-memory when omitted)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Seed the demo products and sales data
    #[arg(long)]
    seed: bool,

    /// OpenAI API key (or set OPENAI_API_KEY env var)
    #[arg(long)]
    api_key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let database = match &args.db {
        Some(path) => Database::open(path)?,
        None => Database::in_memory()?,
    };
    database.init_schema()?;

    // An in-memory database starts empty, so it is always seeded.
    if args.seed || args.db.is_none() {
        database.seed_demo_data()?;
    }

    let api_key = args
        .api_key
        .or_else(|| std::env::var("OPENAI_API_KEY").ok())
        .unwrap_or_else(|| "dummy-api-key".to_string());
    let llm = LlmClient::new(api_key);

    let mut assistant = Assistant::new(llm, ToolDispatcher::new(database));

    info!("Question: {}", args.question);
    let response = assistant.ask(&args.question).await?;

    println!("{}", response.answer);

    Ok(())
}
