//! Command-line argument parsing.

use clap::Parser;
use std::path::{Path, PathBuf};

/// Parse tempeh templates into component trees, asset buckets and imports
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "tempeh")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Template files or directories to parse (`-` reads one template from stdin)
    pub paths: Vec<PathBuf>,

    /// Workspace directory
    #[arg(short, long)]
    pub workspace: Option<PathBuf>,

    /// Path to tempeh.json
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "human")]
    pub output: OutputFormat,

    /// Write one JSON file per template into this directory
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Ignore patterns (glob)
    #[arg(long)]
    pub ignore: Vec<String>,

    /// Re-parse templates when they change
    #[arg(long)]
    pub watch: bool,

    /// Show timing information
    #[arg(long)]
    pub timings: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Output format for parse results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One summary line per file
    #[default]
    Human,
    /// One JSON object per line
    Json,
    /// Pretty-printed template data
    Pretty,
}

impl Args {
    /// Check if a template should be read from stdin.
    pub fn reads_stdin(&self) -> bool {
        self.paths.iter().any(|p| p == Path::new("-"))
    }

    /// Paths to search, without the stdin marker.
    pub fn search_paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.paths.iter().filter(|p| p.as_path() != Path::new("-"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_args() {
        let args = Args::parse_from([
            "tempeh",
            "pages",
            "-",
            "--output",
            "json",
            "--ignore",
            "**/drafts/**",
            "-v",
        ]);
        assert!(args.reads_stdin());
        assert!(args.verbose);
        assert_eq!(args.output, OutputFormat::Json);
        assert_eq!(args.ignore, vec!["**/drafts/**".to_string()]);
        assert_eq!(
            args.search_paths().collect::<Vec<_>>(),
            vec![&PathBuf::from("pages")]
        );
    }

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["tempeh"]);
        assert!(!args.reads_stdin());
        assert_eq!(args.output, OutputFormat::Human);
        assert!(args.out_dir.is_none());
    }
}
