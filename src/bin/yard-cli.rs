//! Management CLI for a running switchyard gateway.
//!
//! Talks to the admin rules shipped in the default bootstrap config; the
//! shared secret travels in the request body because admin protection is a
//! match condition, not a transport-level check.

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "yard-cli")]
#[command(about = "Management CLI for the switchyard gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Shared admin secret (dispatch.admin_auth_code).
    #[arg(short, long, default_value = "CHANGE_ME_IN_PRODUCTION")]
    auth_code: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway status
    Status,
    /// List stored handlers
    ListHandlers,
    /// Fetch one stored handler with its source
    LoadHandler { name: String },
    /// Upload a handler from a script file
    AddHandler {
        name: String,
        file: std::path::PathBuf,
    },
    /// Delete a stored handler
    DeleteHandler { name: String },
    /// Upload a rule from a JSON file
    AddRule { file: std::path::PathBuf },
    /// Delete a rule from the remote collection
    DeleteRule { handler: String },
    /// Show rules from the remote collection
    LoadRules {
        #[arg(default_value = "all")]
        handler: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let (path, mut body) = match &cli.command {
        Commands::Status => ("status", json!({})),
        Commands::ListHandlers => ("list-handlers", json!({})),
        Commands::LoadHandler { name } => ("load-handler", json!({ "name": name })),
        Commands::AddHandler { name, file } => {
            let code = std::fs::read_to_string(file)?;
            ("add-handler", json!({ "name": name, "code": code }))
        }
        Commands::DeleteHandler { name } => ("delete-handler", json!({ "name": name })),
        Commands::AddRule { file } => {
            let rule: Value = serde_json::from_str(&std::fs::read_to_string(file)?)?;
            ("add-rule", rule)
        }
        Commands::DeleteRule { handler } => ("delete-rule", json!({ "handler": handler })),
        Commands::LoadRules { handler } => ("load-rules", json!({ "handler": handler })),
    };

    if let Some(map) = body.as_object_mut() {
        map.insert("auth_code".to_string(), json!(cli.auth_code));
    }

    let res = client
        .post(format!("{}/{}", cli.url.trim_end_matches('/'), path))
        .json(&body)
        .send()
        .await?;

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
