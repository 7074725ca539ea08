use clap::Parser;
use segcheck_engine::UrlResolution;
use std::path::PathBuf;

use crate::output::report::ReportFormat;

/// Define CLI arguments
#[derive(Parser, Debug)]
#[command(
    author = "hua0512 <https://github.com/hua0512>",
    version,
    about = "HLS segment conformance checker",
    long_about = "Fetches an HLS master playlist, resolves its variant playlists and checks\n\
                  that every MPEG-TS segment declares at least one video and one audio stream.\n\
                  \n\
                  Each segment is an independent test case. Exit status: 0 when every case\n\
                  passed, 1 when a case failed, 2 when the segments could not be collected,\n\
                  3 on internal errors and 4 on invalid arguments."
)]
pub struct CliArgs {
    /// URL of the master playlist
    #[arg(
        env = "SEGCHECK_MASTER_URL",
        value_name = "MASTER_URL",
        help = "URL of the HLS master playlist to check"
    )]
    pub master_url: String,

    /// Overall timeout per request
    #[arg(
        long,
        default_value = "0",
        help = "Overall timeout for each HTTP request with optional unit (ms, s, m, h). Use 0 to disable."
    )]
    pub timeout: String,

    /// Connection timeout
    #[arg(
        long,
        default_value = "0",
        help = "Connection timeout with optional unit (ms, s, m, h). Use 0 to disable."
    )]
    pub connect_timeout: String,

    /// Do not follow HTTP redirects
    #[arg(long, help = "Treat redirect responses as failures instead of following them")]
    pub no_redirects: bool,

    /// URI resolution mode
    #[arg(
        long,
        value_enum,
        default_value_t = UrlResolution::Naive,
        help = "How playlist URIs are joined with their parent URL"
    )]
    pub resolution: UrlResolution,

    /// Number of segments checked at once
    #[arg(
        short = 'j',
        long,
        default_value = "1",
        help = "Number of segments downloaded and checked concurrently. Reports keep playlist order."
    )]
    pub concurrency: usize,

    /// Stop after the first failure
    #[arg(
        short = 'x',
        long,
        help = "Skip the remaining segments after the first one that does not pass"
    )]
    pub fail_fast: bool,

    /// Only list the segments
    #[arg(long, help = "List the collected segment URLs without downloading them")]
    pub collect_only: bool,

    /// Report format
    #[arg(
        short,
        long,
        default_value = "text",
        value_parser = ["text", "json"],
        help = "Report format (text, json)"
    )]
    pub format: String,

    /// Report file
    #[arg(short, long, help = "Write the report to this file instead of stdout")]
    pub output: Option<PathBuf>,

    /// Show progress bar
    #[arg(
        short = 'P',
        long = "progress",
        default_value = "false",
        help = "Show a progress bar while segments are checked"
    )]
    pub show_progress: bool,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable detailed debug logging")]
    pub verbose: bool,

    /// Log file
    #[arg(long, help = "Also write logs to this file")]
    pub log_file: Option<PathBuf>,
}

impl CliArgs {
    pub fn report_format(&self) -> Result<ReportFormat, String> {
        self.format.parse()
    }
}
