//! Spawning dbt and aggregating its output

use crate::attributes::resolve_attributes;
use crate::command::{build_command_line_arguments, CommandOptions, CommandSpec};
use crate::context::BuildContext;
use crate::error::{BuildError, BuildResult};
use crate::profile::create_temporary_profile;
use regex::Regex;
use std::process::Stdio;
use std::sync::OnceLock;
use tb_core::{Block, Variables};
use tokio::io::{AsyncBufReadExt, BufReader};

static ERROR_COUNT_RE: OnceLock<Regex> = OnceLock::new();

fn error_count_regex() -> &'static Regex {
    ERROR_COUNT_RE.get_or_init(|| Regex::new(r"ERROR=([0-9]+)").expect("valid regex"))
}

/// Destination for each line dbt prints
pub trait OutputSink: Send {
    fn write_line(&mut self, line: &str);
}

/// Forwards lines to the `log` facade, prefixed with `key=value` tags
#[derive(Debug, Clone, Default)]
pub struct LogSink {
    tags: Vec<(String, String)>,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push((key.into(), value.into()));
        self
    }
}

impl OutputSink for LogSink {
    fn write_line(&mut self, line: &str) {
        if self.tags.is_empty() {
            log::info!("{}", line);
            return;
        }
        let tags: Vec<String> = self.tags.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        log::info!("[{}] {}", tags.join(" "), line);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn write_line(&mut self, line: &str) {
        println!("{}", line);
    }
}

/// Keeps every line in memory
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    pub lines: Vec<String>,
}

impl OutputSink for CollectingSink {
    fn write_line(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}

/// Exit status and aggregated output of one dbt process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutcome {
    /// `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    /// Sum of every `ERROR=<n>` reported
    pub errors: u64,
    pub lines: Vec<String>,
}

impl CommandOutcome {
    pub fn success(&self) -> bool {
        self.errors == 0 && self.exit_code == Some(0)
    }
}

/// Sum of all `ERROR=<n>` counts in a line
pub fn count_errors(line: &str) -> u64 {
    error_count_regex()
        .captures_iter(line)
        .filter_map(|caps| caps[1].parse::<u64>().ok())
        .fold(0, u64::saturating_add)
}

/// Spawn `<executable> <verb> <args...>` in its own process group and drain
/// stdout and stderr line by line into `sink`.
pub async fn run_command(
    ctx: &BuildContext,
    spec: &CommandSpec,
    sink: &mut dyn OutputSink,
) -> BuildResult<CommandOutcome> {
    let argv = spec.argv();
    let display = format!("{} {}", ctx.executable, argv.join(" "));
    let process_error = |source: std::io::Error| BuildError::Process {
        command: display.clone(),
        source,
    };

    let mut command = tokio::process::Command::new(&ctx.executable);
    command
        .args(&argv)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    command.process_group(0);

    log::info!("Running {}", display);
    let mut child = command.spawn().map_err(process_error)?;

    let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
        return Err(process_error(std::io::Error::other(
            "output streams were not captured",
        )));
    };
    let mut stdout = BufReader::new(stdout).lines();
    let mut stderr = BufReader::new(stderr).lines();

    let mut outcome = CommandOutcome::default();
    let (mut stdout_open, mut stderr_open) = (true, true);

    while stdout_open || stderr_open {
        let line = tokio::select! {
            line = stdout.next_line(), if stdout_open => {
                let line = line.map_err(process_error)?;
                stdout_open = line.is_some();
                line
            }
            line = stderr.next_line(), if stderr_open => {
                let line = line.map_err(process_error)?;
                stderr_open = line.is_some();
                line
            }
        };

        if let Some(line) = line {
            outcome.errors = outcome.errors.saturating_add(count_errors(&line));
            sink.write_line(&line);
            outcome.lines.push(line);
        }
    }

    let status = child.wait().await.map_err(process_error)?;
    outcome.exit_code = status.code();
    log::debug!(
        "{} exited with {:?} ({} error(s))",
        display,
        outcome.exit_code,
        outcome.errors
    );
    Ok(outcome)
}

/// Build the command for `block`, materialize its temporary profile and run
/// it. The temporary profile is removed once the process exits.
pub async fn execute_block_command(
    ctx: &BuildContext,
    block: &Block,
    variables: &Variables,
    options: &CommandOptions,
    sink: &mut dyn OutputSink,
) -> BuildResult<CommandOutcome> {
    let spec = build_command_line_arguments(ctx, block, variables, options)?;
    let (_, profile_dir) = create_temporary_profile(
        &spec.project_full_path,
        &spec.profiles_dir,
        &ctx.effective_variables(variables),
    )?;

    let outcome = run_command(ctx, &spec, sink).await;
    drop(profile_dir);
    outcome
}

/// Run the tests of `block`.
///
/// Snapshot models have no tests and return `None`. Any reported `ERROR=<n>`
/// fails with [`BuildError::TestFailure`]; a non-zero exit without an error
/// count is only logged.
pub async fn run_dbt_tests(
    ctx: &BuildContext,
    block: &Block,
    variables: &Variables,
    sink: &mut dyn OutputSink,
) -> BuildResult<Option<CommandOutcome>> {
    if block.configuration.file_path().is_some() && resolve_attributes(ctx, block)?.snapshot {
        log::debug!("Skipping tests for snapshot '{}'", block.uuid);
        return Ok(None);
    }

    let options = CommandOptions {
        run_tests: true,
        ..Default::default()
    };
    let outcome = execute_block_command(ctx, block, variables, &options, sink).await?;

    if outcome.errors >= 1 {
        return Err(BuildError::TestFailure {
            errors: outcome.errors,
        });
    }
    if outcome.exit_code != Some(0) {
        log::warn!(
            "dbt test for '{}' exited with {:?} but reported no errors",
            block.uuid,
            outcome.exit_code
        );
    }

    Ok(Some(outcome))
}

#[cfg(test)]
#[path = "run_test.rs"]
mod tests;
