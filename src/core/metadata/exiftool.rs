//! Metadata source backed by a long-running `exiftool` process.
//!
//! The process is started with `-stay_open True -@ -` and fed one query
//! per file on stdin. Each query ends with `-execute`, and exiftool
//! answers with JSON followed by a `{ready}` line.

use super::{MetadataLookup, MetadataSource, MetadataSourceFactory, CREATION_FIELDS};
use serde_json::{Map, Value};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

const READY_MARKER: &str = "{ready}";

/// One exiftool child process, owned by a single worker
pub struct ExiftoolSource {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl ExiftoolSource {
    /// Start a stay-open exiftool process
    pub fn spawn(program: &Path) -> io::Result<Self> {
        let mut child = Command::new(program)
            .args(["-stay_open", "True", "-@", "-"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::other("exiftool stdin unavailable"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("exiftool stdout unavailable"))?;

        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
        })
    }

    fn query(&mut self, path_line: &str) -> io::Result<String> {
        writeln!(self.stdin, "-json")?;
        for field in CREATION_FIELDS {
            writeln!(self.stdin, "-{}", field)?;
        }
        writeln!(self.stdin, "{}", path_line)?;
        writeln!(self.stdin, "-execute")?;
        self.stdin.flush()?;

        let mut output = String::new();
        let mut line = String::new();
        loop {
            line.clear();
            if self.stdout.read_line(&mut line)? == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "exiftool exited unexpectedly",
                ));
            }
            if line.trim_end() == READY_MARKER {
                return Ok(output);
            }
            output.push_str(&line);
        }
    }
}

impl MetadataSource for ExiftoolSource {
    fn lookup(&mut self, path: &Path) -> MetadataLookup {
        let Some(path_line) = argument_line(path) else {
            return MetadataLookup::failed(
                "path cannot be passed to exiftool: not UTF-8 or contains a line break",
            );
        };
        match self.query(&path_line) {
            Ok(output) => parse_json_output(&output),
            Err(e) => MetadataLookup::failed(e.to_string()),
        }
    }
}

impl Drop for ExiftoolSource {
    fn drop(&mut self) {
        let _ = writeln!(self.stdin, "-stay_open\nFalse");
        let _ = self.stdin.flush();
        let _ = self.child.wait();
    }
}

/// The argument file takes one argument per line, so a path must be a
/// single line of valid UTF-8 to be sent as-is
fn argument_line(path: &Path) -> Option<String> {
    let line = path.to_str()?;
    if line.contains(['\n', '\r']) {
        return None;
    }
    Some(line.to_string())
}

/// Parse exiftool `-json` output for a single file
fn parse_json_output(output: &str) -> MetadataLookup {
    if output.trim().is_empty() {
        return MetadataLookup::failed("exiftool returned no metadata");
    }

    let objects: Vec<Map<String, Value>> = match serde_json::from_str(output) {
        Ok(objects) => objects,
        Err(e) => return MetadataLookup::failed(format!("unreadable exiftool output: {}", e)),
    };

    let Some(object) = objects.into_iter().next() else {
        return MetadataLookup::failed("exiftool returned no metadata");
    };

    if let Some(Value::String(message)) = object.get("Error") {
        return MetadataLookup::failed(message.clone());
    }

    let fields = CREATION_FIELDS
        .iter()
        .filter_map(|name| match object.get(*name) {
            Some(Value::String(value)) => Some((name.to_string(), value.clone())),
            _ => None,
        })
        .collect();

    MetadataLookup {
        fields,
        error: None,
    }
}

/// Starts one exiftool process per worker
#[derive(Debug, Clone)]
pub struct ExiftoolSourceFactory {
    program: PathBuf,
}

impl ExiftoolSourceFactory {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for ExiftoolSourceFactory {
    fn default() -> Self {
        Self::new("exiftool")
    }
}

impl MetadataSourceFactory for ExiftoolSourceFactory {
    fn create(&self) -> Result<Box<dyn MetadataSource>, String> {
        ExiftoolSource::spawn(&self.program)
            .map(|source| Box::new(source) as Box<dyn MetadataSource>)
            .map_err(|e| format!("failed to start {}: {}", self.program.display(), e))
    }
}
