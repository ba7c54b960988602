use std::ffi::{OsStr, OsString};
use std::fmt::Display;
use std::process::{Command, ExitStatus, Stdio};

use log::debug;

use crate::error::RunnerError;

/// A program plus its arguments, built before anything is executed.
#[derive(Clone, Debug, PartialEq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<OsString>,
}

impl CommandLine {
    pub fn new(program: &str) -> Self {
        CommandLine {
            program: String::from(program),
            args: vec![],
        }
    }

    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }
}

impl Display for CommandLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// The process boundary. Everything the benchmark executes goes through here.
pub trait CommandRunner {
    /// Runs the command to completion with inherited stdio.
    fn run(&self, command: &CommandLine) -> Result<(), RunnerError>;

    /// Runs the command to completion and returns its stdout.
    fn capture(&self, command: &CommandLine) -> Result<String, RunnerError>;

    fn is_installed(&self, program: &str, version_flag: &str) -> bool {
        self.capture(&CommandLine::new(program).arg(version_flag)).is_ok()
    }
}

pub struct ProcessRunner {
}

impl ProcessRunner {
    pub fn new() -> Self {
        ProcessRunner {  }
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, command: &CommandLine) -> Result<(), RunnerError> {
        debug!("spawning {}", command);
        let status = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .status()
            .map_err(|err| RunnerError::for_command(command, &format!("could not be started ({err})")))?;
        check_status(command, status)
    }

    fn capture(&self, command: &CommandLine) -> Result<String, RunnerError> {
        debug!("capturing {}", command);
        let output = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .map_err(|err| RunnerError::for_command(command, &format!("could not be started ({err})")))?;
        check_status(command, output.status)?;
        String::from_utf8(output.stdout)
            .map_err(|_| RunnerError::for_command(command, "wrote non utf-8 output"))
    }
}

fn check_status(command: &CommandLine, status: ExitStatus) -> Result<(), RunnerError> {
    match status.success() {
        true => Ok(()),
        false => match status.code() {
            Some(code) => Err(RunnerError::for_command(command, &format!("exited with {:}", code))),
            None => Err(RunnerError::for_command(command, "did not exit successfully")),
        },
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let cmd = CommandLine::new("cfelics").arg("-i").arg("tiff_files/a.tiff");
        assert_eq!(cmd.to_string(), "cfelics -i tiff_files/a.tiff");
        assert_eq!(cmd.args, vec![OsString::from("-i"), OsString::from("tiff_files/a.tiff")]);
    }

    #[test]
    fn test_missing_program() {
        let runner = ProcessRunner::new();
        let cmd = CommandLine::new("codec-bench-no-such-program");
        assert!(runner.run(&cmd).is_err());
        assert!(!runner.is_installed("codec-bench-no-such-program", "-version"));
    }

    #[test]
    fn test_fake_runner_creates_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("a.png");
        let runner = fake::FakeRunner::new();
        runner.run(&CommandLine::new("convert").arg("-quality").arg(&out)).unwrap();
        assert!(out.exists());
        assert!(!std::path::Path::new("-quality").exists());
        assert_eq!(runner.programs(), vec![String::from("convert")]);
    }
}
