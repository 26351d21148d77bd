use anyhow::Context;
use tokio::io::{AsyncWriteExt, BufReader};

use toolrelay::agent_core::{Session, SessionSettings};
use toolrelay::config;
use toolrelay::inference::InferenceClient;
use toolrelay::mcp_client::McpClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing FIRST, before any tracing::info!() calls
    let log_path = toolrelay::init_tracing(&toolrelay::data_dir())
        .context("failed to initialize logging")?;

    let cwd = std::env::current_dir().context("failed to read current directory")?;
    let app_config = config::load_or_default(&cwd).context("failed to load configuration")?;

    tracing::info!(
        servers = ?app_config.servers,
        model = %app_config.model.model_name,
        "configuration loaded"
    );

    let client = McpClient::new(
        app_config.server_descriptors(),
        app_config.bearer_token.clone(),
        app_config.transport_settings(),
    )
    .context("failed to build tool-server client")?;

    let settings = SessionSettings::from(&app_config.model);
    let model =
        InferenceClient::new(app_config.model).context("failed to build model client")?;

    let mut stdout = tokio::io::stdout();

    let session = match Session::start(client, model, settings).await {
        Ok(session) => session,
        Err(e) if e.is_fatal() => {
            tracing::warn!(error = %e, "cannot start session, exiting");
            stdout.write_all(b"No tools discovered. Exiting.\n").await?;
            stdout.flush().await?;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    stdout.write_all(session.banner().as_bytes()).await?;
    stdout
        .write_all(format!("Logs: {}\n", log_path.display()).as_bytes())
        .await?;
    stdout.flush().await?;

    let stdin = BufReader::new(tokio::io::stdin());
    session.run(stdin, stdout).await?;

    Ok(())
}
