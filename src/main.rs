//! Finbridge CLI: generate SDK method stubs from the upstream OpenAPI
//! document, or serve the generated tools over MCP stdio.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use finbridge_client::{ApiClient, Credentials};
use finbridge_codegen::Generator;
use finbridge_core::{FunctionConfig, Settings};
use finbridge_mcp::{serve_stdio, FinbridgeServer};
use finbridge_openapi::OpenApiParser;
use finbridge_tool::RegistryBuilder;

#[derive(Parser)]
#[command(
    name = "finbridge",
    about = "MCP bridge and SDK stub generator for the Finbridge unified financial API",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate the SDK stub source file from an OpenAPI document
    Generate {
        /// Path or URL of the OpenAPI document
        #[arg(default_value = "openapi.json")]
        spec: String,
        /// Output file for the generated stubs
        #[arg(long, default_value = "toolkit.rs")]
        out: PathBuf,
    },
    /// Run the MCP server over stdio
    Serve {
        /// Path or URL of the OpenAPI document; defaults to
        /// <url_base>/openapi.json
        #[arg(long)]
        spec: Option<String>,
    },
}

async fn load_parser(spec: &str) -> anyhow::Result<OpenApiParser> {
    let parser = if spec.starts_with("http://") || spec.starts_with("https://") {
        OpenApiParser::from_url(spec).await?
    } else {
        OpenApiParser::from_file(spec)?
    };
    Ok(parser)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    finbridge_telemetry::init_telemetry();
    let cli = Cli::parse();

    match cli.command {
        Command::Generate { spec, out } => {
            let parser = load_parser(&spec)
                .await
                .with_context(|| format!("loading OpenAPI document from '{spec}'"))?;
            let index = parser.parse()?;

            // Generation only needs the optional allow-list, not credentials
            dotenvy::dotenv().ok();
            let config = match std::env::var("FINBRIDGE_FUNCTION_CONFIG")
                .ok()
                .filter(|v| !v.is_empty())
            {
                Some(raw) => Some(FunctionConfig::from_json(&raw)?),
                None => None,
            };

            let mut generator = Generator::new(&index);
            if let Some(config) = config.as_ref() {
                generator = generator.with_config(config);
            }
            let methods = generator
                .write_to(&out)
                .context("writing generated stubs")?;
            info!(methods, out = %out.display(), "Generation complete");
        }
        Command::Serve { spec } => {
            let settings = Settings::from_env()?;
            let spec_source = spec.unwrap_or_else(|| {
                format!("{}/openapi.json", settings.url_base.trim_end_matches('/'))
            });
            let parser = load_parser(&spec_source)
                .await
                .with_context(|| format!("loading OpenAPI document from '{spec_source}'"))?;
            let index = parser.parse()?;

            let client = Arc::new(ApiClient::new(
                &settings.url_base,
                Credentials {
                    client_id: settings.client_id.clone(),
                    client_secret: settings.client_secret.clone(),
                    account_id: settings.account_id.clone(),
                },
            )?);

            let allowed_domains = match settings.consumer_id.as_deref() {
                Some(consumer_id) => Some(client.connection_domains(Some(consumer_id)).await?),
                None => None,
            };

            let registry = RegistryBuilder::new(client)
                .operations(index)
                .function_config(settings.function_config())
                .allowed_domains(allowed_domains)
                .consumer_id(settings.consumer_id.clone())
                .build()?;

            info!(tools = registry.len(), "Serving MCP over stdio");
            serve_stdio(FinbridgeServer::new(Arc::new(registry))).await?;
        }
    }

    Ok(())
}
