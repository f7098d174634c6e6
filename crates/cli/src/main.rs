//! `rusty-automation-tool` CLI entry-point.
//!
//! Available sub-commands:
//! - `serve`    — start the API server.
//! - `migrate`  — run pending database migrations.
//! - `validate` — validate a workflow JSON file.

mod config;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser)]
#[command(
    name = "rusty-automation-tool",
    about = "Conversational workflow builder control plane",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the REST API server.
    Serve {
        #[arg(long, default_value = "0.0.0.0:8080")]
        bind: String,
    },
    /// Run pending database migrations.
    Migrate {
        #[arg(long, env = "DATABASE_URL")]
        database_url: String,
    },
    /// Validate a workflow definition JSON file against the DAG rules.
    Validate {
        /// Path to the workflow JSON file (`{nodes, edges}`).
        path: std::path::PathBuf,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { bind } => {
            info!("Starting API server on {bind}");
            let settings = config::Settings::from_env();

            let pool = db::pool::create_pool(&settings.database_url, 10)
                .await
                .expect("failed to connect to database");

            let action_service_client = catalog::ActionServiceClient::new(
                settings.external_action_service_url.clone(),
                settings.action_service_auth_user.clone(),
                settings.action_service_auth_password.clone(),
            );
            let catalog = Arc::new(action_service_client.build_catalog(&settings.action_service_url).await);
            info!(actions = catalog.len(), "loaded action catalog");

            let invoker: Arc<dyn activity::ActivityInvoker> = Arc::new(activity::HttpActivityInvoker::new());
            let runtime: Arc<dyn runtime::DurableRuntime> = Arc::new(runtime::InProcessRuntime::new());
            let llm: Arc<dyn agent::LlmClient> = Arc::new(agent::HttpLlmClient::new(
                settings.llm_endpoint.clone(),
                settings.llm_api_key.clone(),
                settings.llm_deployment.clone(),
            ));

            let state = api::AppState {
                pool,
                runtime,
                invoker,
                catalog,
                llm,
                action_auth: engine::ActionAuth {
                    user: Some(settings.action_service_auth_user.clone()),
                    password: Some(settings.action_service_auth_password.clone()),
                },
                token_validator: api::default_token_validator(
                    settings.secret_key.clone(),
                    settings.access_token_expire_hours,
                ),
            };

            api::serve(&bind, state).await.expect("server exited with an error");
        }
        Command::Migrate { database_url } => {
            info!("Running migrations against {database_url}");
            let pool = db::pool::create_pool(&database_url, 2)
                .await
                .expect("failed to connect to database");
            db::pool::run_migrations(&pool).await.expect("migration failed");
            info!("Migrations applied successfully");
        }
        Command::Validate { path } => {
            let content = std::fs::read_to_string(&path)
                .unwrap_or_else(|e| panic!("cannot read file {}: {e}", path.display()));

            let config: engine::WorkflowConfig =
                serde_json::from_str(&content).unwrap_or_else(|e| panic!("invalid JSON: {e}"));

            let catalog = catalog::ActionCatalog::default();
            let (valid, errors) = engine::dag::validate_graph(&config, &catalog);

            if valid {
                let order = engine::dag::topological_order(&config);
                println!("workflow is valid. execution order: {order:?}");
            } else {
                eprintln!("validation failed:");
                for error in &errors {
                    eprintln!("  - {error}");
                }
                std::process::exit(1);
            }
        }
    }
}
