use anyhow::Context;
use clap::{Parser, Subcommand};

use shelf_app::modules::{books, views};
use shelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

/// Book catalogue services.
#[derive(Debug, Parser)]
#[command(name = "shelf", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the books JSON API backed by the key-value store
    Api {
        /// Port to listen on, overriding `api.port`
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run the HTML frontend that talks to the books API
    Web {
        /// Port to listen on, overriding `web.port`
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load shelf settings")?;
    shelf_telemetry::init(&settings.telemetry)?;

    tracing::info!(env = ?settings.environment, "shelf bootstrap starting");

    match cli.command {
        Command::Api { port } => run_api(&settings, port).await,
        Command::Web { port } => run_web(&settings, port).await,
    }
}

async fn run_api(settings: &Settings, port: Option<u16>) -> anyhow::Result<()> {
    let mut server = settings.api.server();
    if let Some(port) = port {
        server.port = port;
    }

    let backend =
        shelf_store::connect(&settings.store).with_context(|| "failed to set up key-value store")?;

    let mut registry = ModuleRegistry::new();
    registry.register(books::create_module(books::BookStore::new(backend)));

    serve(&registry, settings, &server, "shelf-api").await
}

async fn run_web(settings: &Settings, port: Option<u16>) -> anyhow::Result<()> {
    let mut server = settings.web.server();
    if let Some(port) = port {
        server.port = port;
    }

    let client = views::BooksClient::new(&settings.web.api_url)
        .with_context(|| format!("invalid books API URL '{}'", settings.web.api_url))?;

    let mut registry = ModuleRegistry::new();
    registry.register(views::create_module(client));

    serve(&registry, settings, &server, "shelf-web").await
}

async fn serve(
    registry: &ModuleRegistry,
    settings: &Settings,
    server: &shelf_kernel::settings::ServerSettings,
    service: &str,
) -> anyhow::Result<()> {
    let ctx = InitCtx { settings };

    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    let served = shelf_http::start_server(registry, server, service).await;

    registry.stop_all().await?;
    tracing::info!(service, "shelf shutdown complete");
    served
}
