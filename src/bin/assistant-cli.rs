use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "assistant-cli")]
#[command(about = "Management CLI for the Inventory Assistant", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8081")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version, endpoint health and chat mode
    Status,
    /// List health of every tracked service
    Services,
    /// Reset a service back to operational
    Reset {
        /// Service id, e.g. "ai-chat"
        id: String,
    },
    /// Ask the assistant a question
    Ask {
        /// Question text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Resubmit the last question
    Retry,
    /// Toggle simulation mode
    Toggle,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Status => client.get(format!("{}/status", base)).send().await?,
        Commands::Services => client.get(format!("{}/health/services", base)).send().await?,
        Commands::Reset { id } => {
            client
                .post(format!("{}/health/services/{}/reset", base, id))
                .send()
                .await?
        }
        Commands::Ask { text } => {
            client
                .post(format!("{}/chat", base))
                .json(&json!({ "message": text.join(" ") }))
                .send()
                .await?
        }
        Commands::Retry => client.post(format!("{}/chat/retry", base)).send().await?,
        Commands::Toggle => client.post(format!("{}/chat/simulation", base)).send().await?,
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Assistant API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
