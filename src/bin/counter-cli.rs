use clap::{Parser, Subcommand};
use reqwest::StatusCode;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "counter-cli")]
#[command(about = "Command line client for the hit counter service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Path prefix in front of /get and /hit.
    #[arg(short, long, default_value = "/api")]
    prefix: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the counts for a key
    Get {
        #[arg(short, long, default_value = "default")]
        key: String,
    },
    /// Record a hit and show the new counts
    Hit {
        #[arg(short, long, default_value = "default")]
        key: String,

        /// Count the visitor as unique at most once per day
        #[arg(long)]
        unique: bool,

        /// Pretend to be this client IP
        #[arg(long)]
        ip: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = format!("{}{}", cli.url.trim_end_matches('/'), cli.prefix.trim_end_matches('/'));

    let res = match cli.command {
        Commands::Get { key } => {
            client.get(format!("{}/get", base))
                .query(&[("key", key)])
                .send()
                .await?
        }
        Commands::Hit { key, unique, ip } => {
            let mut query = vec![("key", key)];
            if unique {
                query.push(("unique", "1".to_string()));
            }
            let mut req = client.get(format!("{}/hit", base)).query(&query);
            if let Some(ip) = ip {
                req = req.header("x-real-ip", ip);
            }
            req.send().await?
        }
    };
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(status_error(status, &body).into());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

fn status_error(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        format!("counter service returned status {}", status)
    } else {
        format!("counter service returned status {}: {}", status, body)
    }
}
