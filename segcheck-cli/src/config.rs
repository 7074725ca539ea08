use std::path::PathBuf;

use segcheck_engine::CheckerConfig;
use url::Url;

use crate::cli::CliArgs;
use crate::error::AppError;
use crate::output::report::ReportFormat;
use crate::utils::parse_time;

/// Configuration for the entire program
#[derive(Debug, Clone)]
pub struct ProgramConfig {
    /// Master playlist to check
    pub master_url: String,

    /// Engine configuration
    pub checker: CheckerConfig,

    /// Stop after discovery and list the cases
    pub collect_only: bool,

    /// Report format
    pub format: ReportFormat,

    /// Report file, stdout when unset
    pub output: Option<PathBuf>,
}

impl ProgramConfig {
    pub fn from_args(args: &CliArgs) -> Result<Self, AppError> {
        let master_url = args.master_url.trim().to_string();
        let parsed = Url::parse(&master_url)
            .map_err(|e| AppError::InvalidInput(format!("Invalid master URL '{master_url}': {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AppError::InvalidInput(format!(
                "Unsupported URL scheme '{}': only http and https are fetched",
                parsed.scheme()
            )));
        }

        if args.concurrency == 0 {
            return Err(AppError::InvalidInput(
                "Concurrency must be at least 1".to_string(),
            ));
        }

        let format = args.report_format().map_err(AppError::InvalidInput)?;

        let checker = CheckerConfig::builder()
            .with_timeout(parse_time(&args.timeout)?)
            .with_connect_timeout(parse_time(&args.connect_timeout)?)
            .with_follow_redirects(!args.no_redirects)
            .with_url_resolution(args.resolution)
            .with_concurrency(args.concurrency)
            .with_fail_fast(args.fail_fast)
            .build();

        Ok(Self {
            master_url,
            checker,
            collect_only: args.collect_only,
            format,
            output: args.output.clone(),
        })
    }
}
