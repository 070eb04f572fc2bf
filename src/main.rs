use anyhow::{Context, Result};
use bridge_desktop::{ReqwestHttpClient, TokioFileSystem};
use bridge_traits::http::{HttpClient, RetryPolicy};
use bridge_traits::storage::FileSystemAccess;
use clap::Parser;
use core_auth::{Authenticator, ServiceAccountAuthenticator, ServiceAccountKey};
use core_runtime::config::UploadConfig;
use core_runtime::logging::{init_logging, redact_if_sensitive, strip_path};
use core_upload::{
    LocalFileResolver, SharingMode, SharingPolicy, UploadContext, UploadError, UploadOptions,
    UploadOrchestrator, UploadSummary,
};
use provider_google_drive::GoogleDriveConnector;
use secrecy::ExposeSecret;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error, info};

mod cli;
mod output;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // --- Parse CLI + environment ---
    let args = cli::Args::parse();

    // --- Logging setup (stderr) ---
    if let Err(e) = init_logging(args.logging_config()) {
        eprintln!("warning: {}", e);
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

async fn run(args: cli::Args) -> Result<()> {
    let config = args.into_config().map_err(UploadError::from)?;

    let retry_policy =
        RetryPolicy::fixed(config.network.max_attempts, config.network.retry_delay);
    let http_client: Arc<dyn HttpClient> = Arc::new(
        ReqwestHttpClient::with_timeout(config.network.request_timeout)
            .context("Failed to build HTTP client")?
            .with_retry_policy(retry_policy),
    );
    let fs: Arc<dyn FileSystemAccess> = Arc::new(TokioFileSystem::new());

    let summary = upload(&config, http_client, fs).await?;

    // --- Outputs ---
    println!("{}", output::render_summary(&summary)?);

    if let Some(path) = &config.output_file {
        output::append_outputs(path, &summary)
            .with_context(|| format!("Failed to write outputs to {}", path.display()))?;
        debug!(
            file = %strip_path(&path.to_string_lossy()),
            "Wrote pipeline outputs"
        );
    }

    Ok(())
}

/// Authenticate and reconcile the selected files with the target folder
///
/// Sharing, credentials and the file selection are all checked before the
/// client sends its first request.
async fn upload(
    config: &UploadConfig,
    http_client: Arc<dyn HttpClient>,
    fs: Arc<dyn FileSystemAccess>,
) -> Result<UploadSummary> {
    // --- Inputs ---
    let sharing = SharingPolicy::from_settings(&config.sharing)?;
    log_sharing(&sharing);

    let key = ServiceAccountKey::from_base64(config.credentials.expose_secret())
        .map_err(UploadError::from)?;

    let paths = LocalFileResolver::new(fs.clone()).resolve(&config.file_selector)?;
    info!("Selected {} file(s) for upload", paths.len());

    // --- Authentication ---
    let authenticator = ServiceAccountAuthenticator::new(key, http_client.clone());
    info!(
        service_account = %redact_if_sensitive("client_email", authenticator.client_email()),
        "Authenticating"
    );
    let token = authenticator
        .authenticate()
        .await
        .map_err(UploadError::from)?;
    let token_expires_at = token.expires_at();
    debug!("Access token valid until {}", token_expires_at);

    // --- Upload ---
    let provider = Arc::new(GoogleDriveConnector::new(http_client, Arc::new(token)));
    let context = UploadContext::new(
        provider,
        fs,
        UploadOptions {
            folder_id: config.folder_id.clone(),
            overwrite: config.overwrite,
            sharing,
            chunk_size: config.network.upload_chunk_size,
        },
    )
    .with_token_expiry(token_expires_at);

    let orchestrator = UploadOrchestrator::new(context);
    orchestrator.preflight().await?;
    Ok(orchestrator.run(&paths).await?)
}

fn log_sharing(policy: &SharingPolicy) {
    match &policy.mode {
        SharingMode::None => debug!("Sharing disabled"),
        SharingMode::AnyoneWithLink => info!(
            discoverable = policy.allow_discovery,
            "Files will be shared with anyone holding the link"
        ),
        SharingMode::Domain(domain) => {
            info!(role = %policy.role, domain = %domain, "Files will be shared with a domain")
        }
        SharingMode::SpecificPrincipal(email) => info!(
            role = %policy.role,
            email = %redact_if_sensitive("email", email),
            "Files will be shared with one account"
        ),
        SharingMode::Unrecognized(raw) => {
            info!("Sharing mode '{}' is not recognized; files stay unshared", raw)
        }
    }
}
