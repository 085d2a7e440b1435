#[cfg(not(target_arch = "wasm32"))]
use clap::Parser;
#[cfg(not(target_arch = "wasm32"))]
use ul_handoff::methods::{
    FallbackDefaults, HttpMethodsLookup, MethodsSource, resolve_methods,
};
#[cfg(not(target_arch = "wasm32"))]
use ul_handoff::model::arg::{Args, Command};
#[cfg(not(target_arch = "wasm32"))]
use ul_handoff::model::config::Config;
#[cfg(not(target_arch = "wasm32"))]
use ul_handoff::server::{self, MethodRules, ServerState};

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config_path = args
        .config
        .unwrap_or_else(|| Config::default_config_path().to_string());
    let config = Config::load(&config_path).unwrap_or_else(|e| {
        tracing::error!("Failed to load config: {}", e);
        std::process::exit(1);
    });

    let result = match args.command {
        Command::Serve { methods_file } => serve(&config, methods_file).await,
        Command::Lookup { identifier } => lookup(&config, &identifier).await,
    };

    if let Err(e) = result {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
async fn serve(config: &Config, methods_file: Option<String>) -> anyhow::Result<()> {
    let rules = match methods_file.or_else(|| config.methods_file.clone()) {
        Some(path) => MethodRules::load(&path)?,
        None => {
            tracing::warn!("No methods file configured, serving default method lists");
            MethodRules::default()
        }
    };
    tracing::info!("Loaded {} method rule(s)", rules.rules.len());

    let api_key = config.effective_lookup_api_key().map(str::to_string);
    if api_key.is_none() {
        tracing::warn!("lookupApiKey not set, /methods accepts unauthenticated requests");
    }
    let app = server::create_router(ServerState::new(rules).with_api_key(api_key));

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting methods-lookup endpoint: {}", addr);
    tracing::info!("Available APIs:");
    tracing::info!("  POST /methods");
    tracing::info!("  GET  /health");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
async fn lookup(config: &Config, identifier: &str) -> anyhow::Result<()> {
    let client = HttpMethodsLookup::from_config(config)?;
    let resolved = resolve_methods(
        &client,
        identifier,
        config.lookup_failure_policy,
        &FallbackDefaults::from_config(config),
    )
    .await?;

    if resolved.source == MethodsSource::Fallback {
        if let Some(warning) = &resolved.warning {
            eprintln!("{}", warning);
        }
    }
    for method in &resolved.methods {
        println!("{}", method.label());
    }
    if let Some(username) = &resolved.password_login_username {
        println!("password login username: {}", username);
    }
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {}
