use analyze_shard_key::command::reply;
use analyze_shard_key::{FixtureFile, ServerConfig, fixture_advisor, server};
use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use serde_json::{Map, Value, json};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "analyze-shard-key")]
#[command(about = "Evaluate candidate shard keys before sharding a collection")]
struct Cli {
    /// Server configuration (JSON)
    #[arg(long, global = true, default_value = "server.json")]
    config: PathBuf,

    /// Collections and recorded metrics served by the analyzers (JSON)
    #[arg(long, global = true, default_value = "fixture.json")]
    fixture: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve administrative commands over HTTP
    Serve {
        /// Overrides `bindAddr` from the configuration
        #[arg(long)]
        bind: Option<String>,
    },
    /// Run analyzeShardKey once and print the reply
    Analyze {
        #[arg(long)]
        user: String,
        #[arg(long)]
        password: String,
        /// Target namespace, `<db>.<collection>`
        namespace: String,
        /// Key fields in order; suffix a field with `:hashed` for a hashed field
        #[arg(long, value_delimiter = ',', required = true)]
        key: Vec<String>,
        #[arg(long)]
        max_time_ms: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = ServerConfig::from_json_file(&cli.config)
        .with_context(|| format!("load configuration from {}", cli.config.display()))?;
    let fixture = FixtureFile::from_json_file(&cli.fixture)
        .with_context(|| format!("load fixture from {}", cli.fixture.display()))?;

    match cli.command {
        Command::Serve { bind } => {
            let addr = bind.unwrap_or_else(|| config.bind_addr.clone());
            let advisor = Arc::new(fixture_advisor(config, fixture).await?);
            server::serve(advisor, &addr)
                .await
                .with_context(|| format!("serve commands on {addr}"))?;
            Ok(())
        }
        Command::Analyze {
            user,
            password,
            namespace,
            key,
            max_time_ms,
        } => {
            let advisor = fixture_advisor(config, fixture).await?;

            let mut document = Map::new();
            document.insert("analyzeShardKey".to_string(), json!(namespace));
            document.insert("key".to_string(), key_document(&key)?);
            if let Some(ms) = max_time_ms {
                document.insert("maxTimeMS".to_string(), json!(ms));
            }

            let reply = advisor
                .run_command(&user, &password, "admin", &Value::Object(document))
                .await;
            println!("{}", serde_json::to_string_pretty(&reply)?);

            if reply::is_ok(&reply) {
                Ok(())
            } else {
                Err(anyhow!("analyzeShardKey failed"))
            }
        }
    }
}

/// `["region", "customerId:hashed"]` -> `{"region": 1, "customerId": "hashed"}`
fn key_document(fields: &[String]) -> Result<Value> {
    let mut key = Map::new();
    for field in fields {
        let (path, kind) = match field.split_once(':') {
            Some((path, "hashed")) => (path, json!("hashed")),
            Some((_, other)) => return Err(anyhow!("unsupported key field kind '{other}' in '{field}'")),
            None => (field.as_str(), json!(1)),
        };
        key.insert(path.to_string(), kind);
    }
    Ok(Value::Object(key))
}
