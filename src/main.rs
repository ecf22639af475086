use anyhow::{Context, Result};
use installer::cli::output::*;
use installer::cli::Cli;
use installer::core::InstallPlan;
use installer::execution::{InstallEngine, InstallRequest, SubprocessRunner, TracingLogger};
use installer::options::{InquirePrompter, NoPrompter, Prompter};
use installer::persistence::ConfigStore;
use installer::requirements::{DeskRequirements, HostRequirements, RequirementChecker};
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let default_filter = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    let config = cli.installer_config()?;
    let plan_options = cli.plan_options(&config);
    let plan = InstallPlan::standard(&plan_options);

    let store = open_store(&config).await?;
    let runner = SubprocessRunner::new(config.console.clone(), config.app_root.clone(), config.env.clone());
    let checker = RequirementChecker::new()
        .with_source(HostRequirements::new(config.app_root.clone(), config.console.clone()))
        .with_source(DeskRequirements::new(config.app_root.clone()));
    let prompter: Arc<dyn Prompter> = if cli.interactive() {
        Arc::new(InquirePrompter)
    } else {
        Arc::new(NoPrompter)
    };

    let mut engine = InstallEngine::new(runner, store, checker, Arc::new(TracingLogger), prompter);

    // Set up event handler for console output
    let quiet = cli.json;
    engine.add_event_handler(move |event| {
        if quiet {
            return;
        }
        if let Some(line) = format_install_event(event) {
            println!("{}", line);
        }
    });

    let request = InstallRequest {
        inputs: cli.input_options(),
        interactive: cli.interactive(),
        default_timeout: config.default_timeout(),
        process_isolation: plan_options.process_isolation,
        plan,
    };

    let outcome = engine.execute(&request).await;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome.state)?);
    } else {
        println!("{} {}", INFO, format_run_summary(&outcome.state));
    }

    if let Some(error) = &outcome.error {
        eprintln!("{}{}", CROSS, style(error).red());
    }

    std::process::exit(outcome.exit_code());
}

#[cfg(feature = "sqlite")]
async fn open_store(config: &installer::core::config::InstallerConfig) -> Result<Arc<dyn ConfigStore>> {
    let path = config.config_db_path();
    let store = installer::persistence::SqliteConfigStore::new(&path)
        .await
        .with_context(|| format!("Failed to open configuration store {}", path.display()))?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "sqlite"))]
async fn open_store(_config: &installer::core::config::InstallerConfig) -> Result<Arc<dyn ConfigStore>> {
    tracing::warn!("Built without sqlite support; settings will not be persisted");
    Ok(Arc::new(installer::persistence::InMemoryConfigStore::new()))
}
