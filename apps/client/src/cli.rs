use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "resume-client",
    version,
    about = "Upload a resume to the analyzer and view its quality report"
)]
pub struct Cli {
    #[arg(help = "Resume to analyze (PDF, DOC, DOCX, or TXT)")]
    pub file: Option<PathBuf>,
    #[arg(long, help = "Analyzer base URL (overrides ANALYZER_ENDPOINT)")]
    pub endpoint: Option<String>,
    #[arg(long, help = "Print the report as machine-readable JSON")]
    pub json: bool,
}
