use std::path::Path;

use crate::error::RunnerError;
use crate::runner::{CommandLine, CommandRunner};

/// Size of `dir` on disk in whole megabytes, as reported by `du -m -s`.
pub fn disk_usage_mb<R: CommandRunner>(runner: &R, dir: &Path) -> Result<u64, RunnerError> {
    let command = CommandLine::new("du").arg("-m").arg("-s").arg(dir);
    let stdout = runner.capture(&command)?;
    parse_du_output(&stdout)
        .ok_or_else(|| RunnerError::for_command(&command, &format!("unexpected output {:?}", stdout.trim())))
}

fn parse_du_output(stdout: &str) -> Option<u64> {
    stdout.split_whitespace().next()?.parse().ok()
}
