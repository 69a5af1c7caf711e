//! Code emission
//!
//! The driver hands every top-level construct of the model to an
//! [`Emitter`], one call per construct name. Turning a construct into source
//! files is the job of an external generator program; [`CommandEmitter`]
//! invokes one. [`JsonEmitter`] writes the constructs as JSON lines instead,
//! which is what the CLI's dry run uses.

use crate::context::ObjectContext;
use crate::error::{Error, Result};
use crate::names::validate_qname;
use serde::Serialize;
use std::ffi::OsString;
use std::io::Write;
use std::process::Command;
use tracing::debug;

/// Receives one top-level construct at a time
pub trait Emitter {
    /// Emit the construct declared as `name`
    fn emit(&mut self, name: &str, construct: &ObjectContext) -> Result<()>;
}

impl<F> Emitter for F
where
    F: FnMut(&str, &ObjectContext) -> Result<()>,
{
    fn emit(&mut self, name: &str, construct: &ObjectContext) -> Result<()> {
        self(name, construct)
    }
}

/// Runs an external generator once per construct
///
/// The construct name is passed as the last argument. A non-zero exit status
/// is reported as [`Error::Emit`].
#[derive(Debug, Clone)]
pub struct CommandEmitter {
    program: OsString,
    args: Vec<OsString>,
}

impl CommandEmitter {
    /// Create an emitter running `program`
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Add a fixed argument placed before the construct name
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add several fixed arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl Emitter for CommandEmitter {
    fn emit(&mut self, name: &str, _construct: &ObjectContext) -> Result<()> {
        // names reach a child process; keep them to XML names
        validate_qname(name)?;

        debug!(program = ?self.program, name, "running generator");
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(name)
            .status()
            .map_err(|e| {
                Error::Emit(format!(
                    "failed to run {}: {}",
                    self.program.to_string_lossy(),
                    e
                ))
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(Error::Emit(format!(
                "{} exited with {} for '{}'",
                self.program.to_string_lossy(),
                status,
                name
            )))
        }
    }
}

#[derive(Serialize)]
struct EmittedConstruct<'a> {
    name: &'a str,
    model: &'a ObjectContext,
}

/// Writes one JSON object per construct, one per line
#[derive(Debug)]
pub struct JsonEmitter<W: Write> {
    writer: W,
}

impl<W: Write> JsonEmitter<W> {
    /// Create an emitter writing to `writer`
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Get the writer back
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Emitter for JsonEmitter<W> {
    fn emit(&mut self, name: &str, construct: &ObjectContext) -> Result<()> {
        serde_json::to_writer(
            &mut self.writer,
            &EmittedConstruct {
                name,
                model: construct,
            },
        )?;
        writeln!(self.writer)?;
        Ok(())
    }
}
