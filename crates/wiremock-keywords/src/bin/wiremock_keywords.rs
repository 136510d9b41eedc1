//! Run WireMock keywords from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Stub every GET under /api with a 404
//! wiremock-keywords "Create Default Mock Mapping" --args '{"method": "GET", "url": "/api/.*", "status": 404}'
//!
//! # Print the body of the last POST to /api/users
//! wiremock-keywords get_previous_request_body --args '["/api/users", "POST"]'
//!
//! # Talk to a different server
//! WIREMOCK_URL=http://mocks:9090 wiremock-keywords reset_mock_mappings
//! ```

use anyhow::Context;
use clap::Parser;
use serde_json::Value;
use tracing_subscriber::EnvFilter;
use wiremock_keywords::{ClientConfig, Keyword, KeywordLibrary, MockAdminClient};

#[derive(Parser, Debug)]
#[command(name = "wiremock-keywords")]
#[command(author, version, about = "Run WireMock admin keywords")]
struct Args {
    /// Keyword to run, e.g. "Reset Mock Mappings" or reset_mock_mappings
    #[arg(required_unless_present = "list")]
    keyword: Option<String>,

    /// Keyword arguments as a JSON object or positional JSON array
    #[arg(short, long, default_value = "{}")]
    args: String,

    /// WireMock base URL
    #[arg(
        short,
        long,
        default_value = "http://localhost:8080",
        env = "WIREMOCK_URL"
    )]
    base_url: String,

    /// Request timeout in milliseconds
    #[arg(short, long, default_value = "5000")]
    timeout_ms: u64,

    /// List available keywords and their arguments
    #[arg(short, long)]
    list: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if args.list {
        for keyword in Keyword::ALL {
            println!("{:<32} {}", keyword.name(), keyword.parameters().join(", "));
        }
        return Ok(());
    }

    let Some(name) = args.keyword else {
        anyhow::bail!("no keyword given");
    };
    let keyword: Keyword = name.parse()?;
    let keyword_args: Value =
        serde_json::from_str(&args.args).context("--args must be valid JSON")?;

    let config = ClientConfig {
        base_url: args.base_url,
        timeout: std::time::Duration::from_millis(args.timeout_ms),
    };
    let mut library = KeywordLibrary::with_client(MockAdminClient::with_config(&config)?);

    let result = library
        .run(keyword, keyword_args)
        .with_context(|| format!("keyword '{}' failed", keyword))?;

    if !result.is_null() {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    Ok(())
}
