use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;
use url::Url;

#[derive(Parser)]
#[command(name = "upstream-cli")]
#[command(about = "Management CLI for dynamic upstream groups", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8081")]
    url: Url,

    /// Location of the dynamic upstream endpoint
    #[arg(short, long, default_value = "/dynamic")]
    path: String,

    /// Bearer token, when the server requires one
    #[arg(short, long)]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the peers of an upstream
    List {
        upstream: String,
        #[arg(short, long)]
        verbose: bool,
    },
    /// Append a server to an upstream
    Add { upstream: String, server: String },
    /// Remove the first server with this name
    Remove { upstream: String, server: String },
    /// Change policy fields of a server
    Update {
        upstream: String,
        server: String,
        #[arg(long)]
        weight: Option<i64>,
        #[arg(long)]
        max_fails: Option<i64>,
        #[arg(long)]
        fail_timeout: Option<i64>,
        #[arg(long, conflicts_with = "up")]
        down: bool,
        #[arg(long)]
        up: bool,
    },
    /// Show every upstream with its peer count and zone usage
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(key) = &cli.key {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {key}"))?,
        );
    }

    let (path, query) = match cli.command {
        Commands::Status => {
            let res = client
                .get(cli.url.join("/status")?)
                .headers(headers)
                .send()
                .await?;
            return print_json(res).await;
        }
        Commands::List { upstream, verbose } => {
            let mut query = vec![("upstream", upstream)];
            if verbose {
                query.push(("verbose", String::new()));
            }
            (cli.path, query)
        }
        Commands::Add { upstream, server } => (
            cli.path,
            vec![("upstream", upstream), ("add", String::new()), ("server", server)],
        ),
        Commands::Remove { upstream, server } => (
            cli.path,
            vec![("upstream", upstream), ("remove", String::new()), ("server", server)],
        ),
        Commands::Update {
            upstream,
            server,
            weight,
            max_fails,
            fail_timeout,
            down,
            up,
        } => {
            let mut query = vec![("upstream", upstream), ("server", server)];
            query.extend(weight.map(|v| ("weight", v.to_string())));
            query.extend(max_fails.map(|v| ("max_fails", v.to_string())));
            query.extend(fail_timeout.map(|v| ("fail_timeout", v.to_string())));
            if down {
                query.push(("down", String::new()));
            }
            if up {
                query.push(("up", String::new()));
            }
            (cli.path, query)
        }
    };

    let res = client
        .get(cli.url.join(&path)?)
        .query(&query)
        .headers(headers)
        .send()
        .await?;
    print_text(res).await
}

async fn print_text(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let body = res.text().await?;
    if status.is_success() {
        print!("{body}");
        Ok(())
    } else {
        eprint!("Error ({status}): {body}");
        std::process::exit(1);
    }
}

async fn print_json(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: server returned status {status}");
        std::process::exit(1);
    }
    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
