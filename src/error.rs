use std::error::Error;
use std::fmt::Display;
use std::path::{Path, PathBuf};

use crate::runner::CommandLine;

#[derive(Debug)]
pub struct SetupError {
    path: PathBuf,
    msg: String,
}

impl SetupError {
    pub fn for_path(path: &Path, msg: &str) -> Self {
        SetupError {
            path: PathBuf::from(path),
            msg: String::from(msg),
        }
    }
}

impl Error for SetupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}

impl Display for SetupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error preparing {:?}: {}", &self.path, &self.msg)
    }
}

#[derive(Debug)]
pub struct RunnerError {
    command: String,
    msg: String,
}

impl RunnerError {
    pub fn for_command(command: &CommandLine, msg: &str) -> Self {
        RunnerError {
            command: command.to_string(),
            msg: String::from(msg),
        }
    }
}

impl Error for RunnerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}

impl Display for RunnerError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Error running `{}`: {}", &self.command, &self.msg)
    }
}
