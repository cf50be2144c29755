//! Process module.
//!
//! This module contains helpers around `std::process`, used to run
//! password commands and to pipe messages into sendmail-like
//! commands.

use log::debug;
use std::{
    env,
    io::{self, prelude::*},
    process::{Command, Stdio},
    result, string,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot spawn process for command {1:?}")]
    SpawnProcessError(#[source] io::Error, String),
    #[error("cannot get standard input")]
    GetStdinError,
    #[error("cannot write data to standard input")]
    WriteStdinError(#[source] io::Error),
    #[error("cannot wait for command {1:?}")]
    WaitProcessError(#[source] io::Error, String),
    #[error("command {0:?} exited with status {1}: {2}")]
    ExitStatusError(String, i32, String),
    #[error("cannot parse command output")]
    ParseCmdOutputError(#[source] string::FromUtf8Error),
}

pub type Result<T> = result::Result<T, Error>;

/// Runs the given command, feeding it with the given input, and
/// returns its standard output. A non-zero exit status is an error.
pub fn run(cmd: &str, input: &[u8]) -> Result<Vec<u8>> {
    debug!("running command: {}", cmd);

    let windows = cfg!(target_os = "windows")
        && env::var("MSYSTEM")
            .map(|env| !env.starts_with("MINGW"))
            .unwrap_or_default();

    let mut child = if windows {
        Command::new("cmd")
            .args(["/C", cmd])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
    } else {
        Command::new("sh")
            .arg("-c")
            .arg(cmd)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
    }
    .map_err(|err| Error::SpawnProcessError(err, cmd.to_owned()))?;

    // stdin is dropped right after the write so the command sees EOF
    let write_res = child
        .stdin
        .take()
        .ok_or(Error::GetStdinError)
        .and_then(|mut stdin| stdin.write_all(input).map_err(Error::WriteStdinError));

    // the child is waited for even when the write failed
    let output = child
        .wait_with_output()
        .map_err(|err| Error::WaitProcessError(err, cmd.to_owned()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
        return Err(Error::ExitStatusError(
            cmd.to_owned(),
            output.status.code().unwrap_or(-1),
            stderr,
        ));
    }

    write_res?;
    Ok(output.stdout)
}

/// Runs the given command without input and returns the first line
/// of its output, typically a password.
pub fn run_first_line(cmd: &str) -> Result<Option<String>> {
    let output = run(cmd, &[])?;
    let output = String::from_utf8(output).map_err(Error::ParseCmdOutputError)?;
    Ok(output
        .lines()
        .next()
        .map(ToOwned::to_owned)
        .filter(|line| !line.is_empty()))
}
