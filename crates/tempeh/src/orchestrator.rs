//! Orchestrator for finding, parsing and reporting templates.

use crate::cli::Args;
use crate::config::Config;
use crate::error::{FileError, TemplateError};
use crate::output::{render_json, OutputFormatter};
use camino::Utf8PathBuf;
use miette::{IntoDiagnostic, Result, WrapErr};
use rayon::prelude::*;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempeh_parser::{parse_template_with_options, ParseOptions, TemplateData};
use tracing::{debug, info};

/// Display name for a template read from stdin.
const STDIN_NAME: &str = "<stdin>";

/// Result of a run.
#[derive(Debug, Default)]
pub struct RunResult {
    /// Number of templates parsed.
    pub file_count: usize,
    /// Number of templates that failed.
    pub error_count: usize,
    /// Time taken.
    pub duration_ms: u64,
}

/// Outcome of parsing one template.
#[derive(Debug)]
pub struct FileOutcome {
    /// Name used in output and in `sourceFilePath`.
    pub name: String,
    pub result: Result<TemplateData, FileError>,
}

/// Orchestrator for running tempeh.
pub struct Orchestrator {
    config: Config,
    args: Args,
    formatter: OutputFormatter,
}

impl Orchestrator {
    /// Create a new orchestrator.
    pub fn new(workspace: PathBuf, args: Args) -> Result<Self> {
        let config = Config::load(&workspace, &args)?;
        let formatter = OutputFormatter::new(args.output);

        debug!(
            workspace = %config.workspace.display(),
            config = ?config.config_path,
            extensions = ?config.extensions,
            ignore = ?config.ignore_patterns,
            "loaded configuration"
        );

        Ok(Self {
            config,
            args,
            formatter,
        })
    }

    /// Parse every requested template once.
    pub fn run_once(&self) -> Result<RunResult> {
        let start = Instant::now();

        let files = self.find_templates()?;
        info!(count = files.len(), "found template files");

        let mut outcomes = self.parse_files(&files);
        if self.args.reads_stdin() {
            outcomes.push(self.parse_stdin()?);
        }

        let result = self.report(outcomes, start)?;
        if self.args.timings {
            eprintln!("\nTiming: {}ms", result.duration_ms);
        }
        self.formatter.print_summary(&result);

        Ok(result)
    }

    /// Run in watch mode.
    pub fn run_watch_mode(&self) -> Result<()> {
        use notify::{Config as NotifyConfig, RecommendedWatcher, RecursiveMode, Watcher};
        use std::sync::mpsc::{channel, RecvTimeoutError};
        use std::time::Duration;

        eprintln!("Starting watch mode...\n");

        let _ = self.run_once();

        let (tx, rx) = channel();
        let mut watcher = RecommendedWatcher::new(
            move |res| {
                if let Ok(event) = res {
                    let _ = tx.send(event);
                }
            },
            NotifyConfig::default().with_poll_interval(Duration::from_millis(500)),
        )
        .into_diagnostic()?;

        for root in self.roots() {
            watcher
                .watch(&root, RecursiveMode::Recursive)
                .into_diagnostic()
                .wrap_err_with(|| format!("Failed to watch {}", root.display()))?;
        }

        loop {
            match rx.recv_timeout(Duration::from_millis(100)) {
                Ok(event) => {
                    let mut changed: Vec<PathBuf> = event
                        .paths
                        .into_iter()
                        .filter(|p| p.is_file() && self.config.should_process(p))
                        .collect();
                    // Editors often write a file more than once per save.
                    while let Ok(more) = rx.recv_timeout(Duration::from_millis(50)) {
                        changed.extend(
                            more.paths
                                .into_iter()
                                .filter(|p| p.is_file() && self.config.should_process(p)),
                        );
                    }
                    changed.sort();
                    changed.dedup();

                    if !changed.is_empty() {
                        eprintln!("File change detected. Re-parsing {} file(s)...\n", changed.len());
                        let start = Instant::now();
                        let outcomes = self.parse_files(&changed);
                        let _ = self.report(outcomes, start);
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        Ok(())
    }

    /// Directories and files named on the command line, or the workspace.
    fn roots(&self) -> Vec<PathBuf> {
        let roots: Vec<PathBuf> = self
            .args
            .search_paths()
            .map(|p| self.config.workspace.join(p))
            .collect();
        if roots.is_empty() && !self.args.reads_stdin() {
            vec![self.config.workspace.clone()]
        } else {
            roots
        }
    }

    /// Find all template files under the roots. Files named explicitly are
    /// always included.
    pub fn find_templates(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for root in self.roots() {
            if root.is_file() {
                files.push(root);
                continue;
            }
            if !root.is_dir() {
                return Err(miette::miette!("No such file or directory: {}", root.display()));
            }

            for entry in walkdir::WalkDir::new(&root)
                .follow_links(true)
                .into_iter()
                .filter_entry(|e| !self.config.is_ignored(e.path()))
                .filter_map(|e| e.ok())
            {
                let path = entry.path();
                if entry.file_type().is_file() && self.config.should_process(path) {
                    files.push(path.to_path_buf());
                }
            }
        }

        files.sort();
        files.dedup();
        Ok(files)
    }

    /// Parse files in parallel, keeping input order.
    pub fn parse_files(&self, files: &[PathBuf]) -> Vec<FileOutcome> {
        files.par_iter().map(|file| self.parse_file(file)).collect()
    }

    fn parse_file(&self, path: &Path) -> FileOutcome {
        let name = self.display_name(path);
        let result = match std::fs::read_to_string(path) {
            Ok(source) => parse_source(&name, source),
            Err(source) => Err(FileError::Read {
                path: path.display().to_string(),
                source,
            }),
        };
        FileOutcome { name, result }
    }

    fn parse_stdin(&self) -> Result<FileOutcome> {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .into_diagnostic()
            .wrap_err("Failed to read stdin")?;

        let result = parse_source(STDIN_NAME, source).map(|mut data| {
            data.source_file_path = None;
            data
        });
        Ok(FileOutcome {
            name: STDIN_NAME.to_string(),
            result,
        })
    }

    /// Path relative to the workspace, lossily converted to UTF-8.
    fn display_name(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.config.workspace).unwrap_or(path);
        match Utf8PathBuf::from_path_buf(relative.to_path_buf()) {
            Ok(p) => p.into_string(),
            Err(p) => p.to_string_lossy().into_owned(),
        }
    }

    /// Print or write every outcome and count failures.
    fn report(&self, outcomes: Vec<FileOutcome>, start: Instant) -> Result<RunResult> {
        let mut result = RunResult {
            file_count: outcomes.len(),
            ..RunResult::default()
        };

        for outcome in outcomes {
            match outcome.result {
                Ok(data) => match &self.args.out_dir {
                    Some(out_dir) => {
                        let target = self.write_output(out_dir, &outcome.name, &data)?;
                        self.formatter
                            .print_written(&outcome.name, &target.display().to_string());
                    }
                    None => self.formatter.print_parsed(&outcome.name, &data)?,
                },
                Err(error) => {
                    result.error_count += 1;
                    self.formatter.print_error(&outcome.name, error);
                }
            }
        }

        result.duration_ms = start.elapsed().as_millis() as u64;
        Ok(result)
    }

    /// Write `<name>.json` under `out_dir`, mirroring the workspace layout.
    fn write_output(&self, out_dir: &Path, name: &str, data: &TemplateData) -> Result<PathBuf> {
        let file_name = if name == STDIN_NAME { "stdin" } else { name };
        let target = out_dir.join(format!("{}.json", file_name.trim_start_matches('/')));

        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)
                .into_diagnostic()
                .wrap_err_with(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(&target, render_json(data)?)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to write {}", target.display()))?;

        debug!(target = %target.display(), "wrote template data");
        Ok(target)
    }
}

/// Parse one template, attaching the source to any error.
fn parse_source(name: &str, source: String) -> Result<TemplateData, FileError> {
    let options = ParseOptions::default().with_source_file_path(name);
    match parse_template_with_options(&source, options) {
        Ok(data) => Ok(data),
        Err(err) => Err(TemplateError::new(name, source, err).into()),
    }
}
