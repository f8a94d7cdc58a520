//! Invocation of the external `pdf2htmlEX` converter.
//!
//! The flag contract is a single data structure: [`ConversionOptions`]
//! renders an ordered list of `(flag, value)` pairs for a given
//! [`OutputMode`]. The two modes differ only in which pairs are emitted;
//! everything else about the invocation is shared.
//!
//! The converter's contract with the rest of the pipeline is "the requested
//! files now exist on disk, or an error was returned". Discovering those
//! files is the assembler's job.
//!
//! Standard output and standard error are captured into memory in full.
//! There is no cap; a converter that prints without bound grows the buffer
//! without bound.

use crate::config::{GatewayConfig, OutputMode, Verbosity};
use crate::error::{ConversionFailure, GatewayError};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Page file name template handed to `--page-filename`. `%d` is the 1-based page number.
///
/// Must agree with [`crate::pipeline::assemble::page_file_name`].
pub const PAGE_FILENAME_TEMPLATE: &str = "page-%d.html";

/// Fixed converter flags.
///
/// Defaults reproduce the production flag set; they are not exposed per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOptions {
    /// Single mode: embed CSS into the output (`--embed-css`).
    pub embed_css: bool,
    /// Single mode: embed fonts (`--embed-font`).
    pub embed_font: bool,
    /// Single mode: embed images (`--embed-image`).
    pub embed_image: bool,
    /// Single mode: embed JavaScript (`--embed-javascript`).
    pub embed_javascript: bool,
    /// Single mode: embed the outline (`--embed-outline`).
    pub embed_outline: bool,
    /// Paginated mode: combined `--embed` selector. `cfijo` embeds everything.
    pub embed_selector: String,
    /// `--css-filename`; empty keeps CSS inline.
    pub css_filename: String,
    /// `--outline-filename`; empty keeps the outline inline.
    pub outline_filename: String,
    /// `--optimize-text`
    pub optimize_text: bool,
    /// `--correct-text-visibility`: 0 off, 1 fully covered, 2 partially covered.
    pub correct_text_visibility: u8,
    /// `--covered-text-dpi`, used when `correct_text_visibility` is 2.
    pub covered_text_dpi: u32,
    /// `--process-nontext`
    pub process_nontext: bool,
    /// `--process-outline`
    pub process_outline: bool,
    /// `--printing`
    pub printing: bool,
    /// `--quiet`
    pub quiet: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            embed_css: true,
            embed_font: true,
            embed_image: true,
            embed_javascript: true,
            embed_outline: true,
            embed_selector: "cfijo".to_string(),
            css_filename: String::new(),
            outline_filename: String::new(),
            optimize_text: true,
            correct_text_visibility: 2,
            covered_text_dpi: 300,
            process_nontext: true,
            process_outline: true,
            printing: true,
            quiet: true,
        }
    }
}

fn flag(v: bool) -> String {
    let s = if v { "1" } else { "0" };
    s.to_string()
}

impl ConversionOptions {
    /// Ordered `(flag, value)` pairs for `mode`, writing into `dest_dir`.
    pub fn command_template(&self, mode: OutputMode, dest_dir: &Path) -> Vec<(&'static str, OsString)> {
        let mut t: Vec<(&'static str, OsString)> =
            vec![("--dest-dir", dest_dir.as_os_str().to_os_string())];

        match mode {
            OutputMode::Single => {
                t.push(("--embed-css", flag(self.embed_css).into()));
                t.push(("--embed-font", flag(self.embed_font).into()));
                t.push(("--embed-image", flag(self.embed_image).into()));
                t.push(("--embed-javascript", flag(self.embed_javascript).into()));
                t.push(("--embed-outline", flag(self.embed_outline).into()));
            }
            OutputMode::Paginated => {
                t.push(("--embed", self.embed_selector.clone().into()));
                t.push(("--split-pages", flag(true).into()));
                t.push(("--page-filename", PAGE_FILENAME_TEMPLATE.into()));
            }
        }

        t.push(("--css-filename", self.css_filename.clone().into()));
        t.push(("--outline-filename", self.outline_filename.clone().into()));
        t.push(("--optimize-text", flag(self.optimize_text).into()));
        t.push((
            "--correct-text-visibility",
            self.correct_text_visibility.to_string().into(),
        ));
        t.push(("--covered-text-dpi", self.covered_text_dpi.to_string().into()));
        t.push(("--process-nontext", flag(self.process_nontext).into()));
        t.push(("--process-outline", flag(self.process_outline).into()));
        t.push(("--printing", flag(self.printing).into()));
        t.push(("--quiet", flag(self.quiet).into()));
        t
    }

    /// Full argument vector: the template followed by `<input> <output-file-name>`.
    ///
    /// The output is given as a bare file name; `--dest-dir` places it.
    pub fn args(&self, mode: OutputMode, input: &Path, output: &Path) -> Vec<OsString> {
        let dest_dir = output.parent().unwrap_or_else(|| Path::new("."));
        let mut args: Vec<OsString> = self
            .command_template(mode, dest_dir)
            .into_iter()
            .flat_map(|(f, v)| [OsString::from(f), v])
            .collect();
        args.push(input.as_os_str().to_os_string());
        args.push(
            output
                .file_name()
                .map(|n| n.to_os_string())
                .unwrap_or_else(|| output.as_os_str().to_os_string()),
        );
        args
    }
}

/// Launches the converter with a fixed option set.
#[derive(Debug, Clone)]
pub struct Converter {
    program: PathBuf,
    options: ConversionOptions,
    timeout: Option<Duration>,
    verbosity: Verbosity,
}

impl Converter {
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            program: config.converter_program.clone(),
            options: config.conversion.clone(),
            timeout: config.converter_timeout_secs.map(Duration::from_secs),
            verbosity: config.verbosity,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Run the converter on `input`, asking it to write `output` in `mode`.
    ///
    /// Returns once the process has exited successfully. A spawn failure,
    /// non-zero exit, or timeout becomes [`GatewayError::Conversion`].
    ///
    /// Without a configured timeout the child outlives this future: dropping
    /// it leaves the process running to completion.
    pub async fn convert(&self, input: &Path, output: &Path, mode: OutputMode) -> Result<(), GatewayError> {
        let args = self.options.args(mode, input, output);
        debug!(program = %self.program.display(), ?args, "launching converter");

        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(self.timeout.is_some());

        let started = Instant::now();
        let child = cmd.spawn().map_err(|source| {
            GatewayError::Conversion(ConversionFailure::Launch {
                program: self.program.display().to_string(),
                source,
            })
        })?;

        let waited = child.wait_with_output();
        let result = match self.timeout {
            // Dropping the future on timeout drops the child, which kill_on_drop terminates.
            Some(limit) => match tokio::time::timeout(limit, waited).await {
                Ok(r) => r,
                Err(_) => {
                    warn!(secs = limit.as_secs(), "converter timed out; killed");
                    return Err(GatewayError::Conversion(ConversionFailure::TimedOut {
                        secs: limit.as_secs(),
                    }));
                }
            },
            None => waited.await,
        };
        let out = result.map_err(|source| GatewayError::Conversion(ConversionFailure::Wait { source }))?;

        let stdout = String::from_utf8_lossy(&out.stdout);
        let stderr = String::from_utf8_lossy(&out.stderr);
        let elapsed_ms = started.elapsed().as_millis() as u64;

        if !out.status.success() {
            warn!(
                status = %out.status,
                elapsed_ms,
                stdout = %stdout.trim(),
                stderr = %stderr.trim(),
                "converter failed"
            );
            return Err(GatewayError::Conversion(ConversionFailure::Exit {
                status: out.status.to_string(),
                stderr: stderr.trim().to_string(),
            }));
        }

        if self.verbosity.process_output() {
            info!(elapsed_ms, stdout = %stdout.trim(), stderr = %stderr.trim(), "converter succeeded");
        } else {
            debug!(elapsed_ms, "converter succeeded");
        }
        Ok(())
    }
}
