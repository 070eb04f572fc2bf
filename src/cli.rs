use bridge_traits::time::LogLevel;
use clap::{ArgAction, Parser};
use core_runtime::config::{parse_bool, NetworkSettings, SharingSettings, UploadConfig};
use core_runtime::logging::{LogFormat, LoggingConfig};
use std::path::PathBuf;
use std::time::Duration;

/// Command-line + environment configuration.
///
/// Every flag can also be supplied through the environment variable named
/// next to it, which is how pipeline steps usually pass inputs.
#[derive(Parser)]
#[command(
    author,
    version,
    about = "Upload files to a Google Drive folder, skipping unchanged content"
)]
pub struct Args {
    /// Glob pattern or newline-separated list of files to upload
    #[arg(long, env = "DRIVE_UPLOAD_FILES")]
    pub files: String,

    /// Id of the target Drive folder
    #[arg(long, env = "DRIVE_UPLOAD_FOLDER_ID")]
    pub folder_id: String,

    /// Base64-encoded service account JSON key
    #[arg(long, env = "DRIVE_UPLOAD_CREDENTIALS", hide_env_values = true)]
    pub credentials: String,

    /// Replace or update files that already exist in the folder
    #[arg(
        long,
        env = "DRIVE_UPLOAD_OVERWRITE",
        default_value = "true",
        value_parser = parse_flag,
        action = ArgAction::Set
    )]
    pub overwrite: bool,

    /// Sharing mode: none, anyone, domain or specific
    #[arg(long, env = "DRIVE_UPLOAD_SHARE_MODE", default_value = "none")]
    pub share_mode: String,

    /// Role granted when sharing: reader, commenter or writer
    #[arg(long, env = "DRIVE_UPLOAD_SHARE_ROLE", default_value = "reader")]
    pub share_role: String,

    /// Email address for `specific` sharing
    #[arg(long, env = "DRIVE_UPLOAD_SHARE_EMAIL")]
    pub share_email: Option<String>,

    /// Domain for `domain` sharing
    #[arg(long, env = "DRIVE_UPLOAD_SHARE_DOMAIN")]
    pub share_domain: Option<String>,

    /// Let link-shared files show up in search results
    #[arg(
        long,
        env = "DRIVE_UPLOAD_ALLOW_DISCOVERY",
        default_value = "false",
        value_parser = parse_flag,
        action = ArgAction::Set
    )]
    pub allow_discovery: bool,

    /// File receiving `key=value` outputs for later pipeline steps
    #[arg(long, env = "GITHUB_OUTPUT")]
    pub output_file: Option<PathBuf>,

    /// Attempts per API call, including the first one
    #[arg(long, env = "DRIVE_UPLOAD_MAX_ATTEMPTS", default_value_t = 4)]
    pub max_attempts: u32,

    /// Seconds to wait between attempts
    #[arg(long, env = "DRIVE_UPLOAD_RETRY_DELAY_SECS", default_value_t = 2)]
    pub retry_delay_secs: u64,

    /// Maximum duration of a single API call, in seconds
    #[arg(long, env = "DRIVE_UPLOAD_TIMEOUT_SECS", default_value_t = 300)]
    pub timeout_secs: u64,

    /// Size of each upload request in MiB
    #[arg(long, env = "DRIVE_UPLOAD_CHUNK_SIZE_MIB", default_value_t = 8)]
    pub chunk_size_mib: usize,

    /// Log format: compact, pretty or json
    #[arg(long, env = "DRIVE_UPLOAD_LOG_FORMAT", default_value = "compact")]
    pub log_format: String,

    /// Minimum log level: trace, debug, info, warn or error
    #[arg(long, env = "DRIVE_UPLOAD_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

fn parse_flag(value: &str) -> Result<bool, String> {
    parse_bool(value).map_err(|e| e.to_string())
}

impl Args {
    /// Logging settings; unknown values fall back to the defaults
    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig::default()
            .with_format(LogFormat::parse(&self.log_format).unwrap_or_default())
            .with_level(LogLevel::parse(&self.log_level).unwrap_or(LogLevel::Info))
    }

    /// Build the validated run configuration
    pub fn into_config(self) -> core_runtime::Result<UploadConfig> {
        UploadConfig::builder()
            .file_selector(self.files)
            .folder_id(self.folder_id)
            .credentials(self.credentials)
            .overwrite(self.overwrite)
            .sharing(SharingSettings {
                mode: self.share_mode,
                role: self.share_role,
                email: self.share_email,
                domain: self.share_domain,
                allow_discovery: self.allow_discovery,
            })
            .network(NetworkSettings {
                max_attempts: self.max_attempts,
                retry_delay: Duration::from_secs(self.retry_delay_secs),
                request_timeout: Duration::from_secs(self.timeout_secs),
                upload_chunk_size: self.chunk_size_mib.saturating_mul(1024 * 1024),
            })
            .output_file(self.output_file)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec![
            "drive-upload",
            "--files",
            "dist/*.zip",
            "--folder-id",
            "folder123",
            "--credentials",
            "c2VjcmV0",
        ];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert!(args.overwrite);
        assert!(!args.allow_discovery);
        assert_eq!(args.max_attempts, 4);

        let config = args.into_config().unwrap();
        assert_eq!(config.sharing.mode, "none");
        assert_eq!(config.network.request_timeout, Duration::from_secs(300));
        assert_eq!(config.network.upload_chunk_size, 8 * 1024 * 1024);
        assert_eq!(config.credentials.expose_secret(), "c2VjcmV0");
    }

    #[test]
    fn test_boolean_spellings() {
        let args = parse(&["--overwrite", "no", "--allow-discovery", "YES"]);
        assert!(!args.overwrite);
        assert!(args.allow_discovery);

        assert!(Args::try_parse_from([
            "drive-upload",
            "--files",
            "a",
            "--folder-id",
            "f",
            "--credentials",
            "c",
            "--overwrite",
            "maybe",
        ])
        .is_err());
    }

    #[test]
    fn test_sharing_and_network_flags() {
        let config = parse(&[
            "--share-mode",
            "specific",
            "--share-email",
            "dev@example.com",
            "--max-attempts",
            "2",
            "--retry-delay-secs",
            "0",
            "--chunk-size-mib",
            "16",
        ])
        .into_config()
        .unwrap();

        assert_eq!(config.sharing.email.as_deref(), Some("dev@example.com"));
        assert_eq!(config.network.max_attempts, 2);
        assert_eq!(config.network.retry_delay, Duration::ZERO);
        assert_eq!(config.network.upload_chunk_size, 16 * 1024 * 1024);
    }

    #[test]
    fn test_logging_config_fallbacks() {
        let args = parse(&["--log-format", "json", "--log-level", "nonsense"]);
        let logging = args.logging_config();

        assert_eq!(logging.format, LogFormat::Json);
        assert_eq!(logging.level, LogLevel::Info);
    }
}
