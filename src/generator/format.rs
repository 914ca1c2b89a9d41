use std::io::Write;
use std::process::{Command, Stdio};

use crate::error::Error;

/// Runs the generated source through `gofmt` when one is on `PATH`.
///
/// A missing formatter passes the text through untouched. A rejection
/// surfaces as [`Error::Format`] so the caller can keep the unformatted
/// output on disk and still fail the run.
pub fn format_source(source: &str) -> Result<String, Error> {
    let mut child = match Command::new("gofmt")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(_) => return Ok(source.to_owned()),
    };
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(source.as_bytes())?;
    }
    let output = child.wait_with_output()?;
    if !output.status.success() {
        return Err(Error::Format(
            String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        ));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
