use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

use api_double::spec::load_specification;
use api_double::{MockEngine, MockOutcome};

#[derive(Parser)]
#[command(name = "api-double-cli")]
#[command(about = "Inspect OpenAPI documents and query a running API double", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the operations a document declares
    Routes {
        #[arg(short, long)]
        spec: PathBuf,
    },
    /// Synthesize a response body offline
    Sample {
        #[arg(short, long)]
        spec: PathBuf,

        method: String,

        path: String,

        /// Fixed seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Send a request to a running server
    Call {
        #[arg(short, long, default_value = "http://localhost:8080")]
        url: String,

        #[arg(short, long, default_value = "123")]
        token: String,

        method: String,

        path: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Routes { spec } => {
            let (_, specification) = load_specification(&spec)?;
            for entry in &specification.paths {
                for method in entry.operations.keys() {
                    println!("{:<7} {}", method.as_str(), entry.template);
                }
            }
        }
        Commands::Sample {
            spec,
            method,
            path,
            seed,
        } => {
            let (_, specification) = load_specification(&spec)?;
            let engine = MockEngine::new(specification.into());
            let rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            match engine.respond_with_rng(&method, &path, rng) {
                MockOutcome::Synthesized {
                    template,
                    content_type,
                    body,
                } => {
                    eprintln!("{template} ({content_type})");
                    println!("{}", serde_json::to_string_pretty(&body)?);
                }
                outcome => {
                    eprintln!("No synthesized response: {}", outcome.label());
                    std::process::exit(1);
                }
            }
        }
        Commands::Call {
            url,
            token,
            method,
            path,
        } => {
            let mut headers = HeaderMap::new();
            headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}"))?);

            let method = reqwest::Method::from_bytes(method.to_ascii_uppercase().as_bytes())?;
            let res = reqwest::Client::new()
                .request(method, format!("{}{}", url.trim_end_matches('/'), path))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let text = res.text().await?;
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{text}"),
    }
    Ok(())
}
