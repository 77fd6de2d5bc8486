use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use memvfs::{NodeKind, Vfs, VfsError};
use tracing::{debug, info};

use crate::command::{Command, ParseError, USAGE};

/// Whether the shell should keep reading input.
#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Runs commands against a `Vfs` and reports each outcome as a line of text.
pub struct Shell<W: Write> {
    vfs: Vfs,
    out: W,
}

impl<W: Write> Shell<W> {
    pub fn new(vfs: Vfs, out: W) -> Self {
        Self { vfs, out }
    }

    pub fn prompt(&self) -> String {
        format!("{} > ", self.vfs.pwd())
    }

    fn show_prompt(&mut self) -> io::Result<()> {
        let prompt = self.prompt();
        write!(self.out, "{}", prompt)?;
        self.out.flush()
    }

    /// Parses and runs one line of input.
    pub fn execute(&mut self, line: &[u8]) -> io::Result<Flow> {
        let command = match Command::parse(line) {
            Ok(command) => command,
            Err(ParseError::Empty) => return Ok(Flow::Continue),
            Err(err) => {
                debug!(
                    "Rejected input {:?}: {:?}",
                    String::from_utf8_lossy(line),
                    err
                );
                writeln!(self.out, "{}", err)?;
                return Ok(Flow::Continue);
            }
        };
        debug!("Running {:?}.", command);

        match command {
            Command::Mkdir(name) => match self.vfs.mkdir(name) {
                Ok(()) => writeln!(self.out, "Directory '{}' created successfully.", name)?,
                Err(err) => self.report(&err, Target::Directory)?,
            },
            Command::Create(name) => match self.vfs.create_file(name) {
                Ok(()) => writeln!(self.out, "File '{}' created successfully.", name)?,
                Err(err) => self.report(&err, Target::File)?,
            },
            Command::Write { name, data } => match self.vfs.write(name, data) {
                Ok(()) => writeln!(
                    self.out,
                    "Data written successfully (size={} bytes).",
                    data.len()
                )?,
                Err(err) => self.report(&err, Target::File)?,
            },
            Command::Read(name) => self.read(name)?,
            Command::Delete(name) => match self.vfs.delete(name) {
                Ok(()) => writeln!(self.out, "File deleted successfully.")?,
                Err(err) => self.report(&err, Target::File)?,
            },
            Command::Rmdir(name) => match self.vfs.rmdir(name) {
                Ok(()) => writeln!(self.out, "Directory removed successfully.")?,
                Err(err) => self.report(&err, Target::Directory)?,
            },
            Command::Ls => self.ls()?,
            Command::Cd(name) => match self.vfs.cd(name) {
                Ok(()) => writeln!(self.out, "Moved to {}", self.vfs.pwd())?,
                Err(err) => self.report(&err, Target::Directory)?,
            },
            Command::Pwd => writeln!(self.out, "{}", self.vfs.pwd())?,
            Command::Df => {
                let usage = self.vfs.df();
                writeln!(self.out, "Total Blocks: {}", usage.total)?;
                writeln!(self.out, "Used Blocks: {}", usage.used)?;
                writeln!(self.out, "Free Blocks: {}", usage.free)?;
                writeln!(self.out, "Disk Usage: {:.2}%", usage.percent_used)?;
            }
            Command::Help => {
                for usage in USAGE {
                    writeln!(self.out, "  {}", usage)?;
                }
            }
            Command::Exit => return Ok(Flow::Exit),
        }
        Ok(Flow::Continue)
    }

    /// Tears the file system down and hands back the writer.
    pub fn finish(mut self) -> io::Result<W> {
        let report = self.vfs.teardown();
        info!(
            "Teardown released {} nodes and {} blocks.",
            report.nodes, report.blocks
        );
        writeln!(self.out, "Memory released. Exiting program...")?;
        Ok(self.out)
    }

    fn read(&mut self, name: &str) -> io::Result<()> {
        let result = self
            .vfs
            .block_count(name)
            .and_then(|blocks| Ok((blocks, self.vfs.read(name)?)));
        match result {
            Ok((0, _)) => writeln!(self.out, "File is empty."),
            Ok((_, content)) => {
                self.out.write_all(&content)?;
                writeln!(self.out)
            }
            Err(err) => self.report(&err, Target::File),
        }
    }

    fn ls(&mut self) -> io::Result<()> {
        let entries = self.vfs.ls();
        if entries.is_empty() {
            return writeln!(self.out, "(empty)");
        }
        for entry in entries {
            let suffix = match entry.kind {
                NodeKind::Directory => "/",
                NodeKind::File => "",
            };
            writeln!(self.out, "{}{}", entry.name, suffix)?;
        }
        Ok(())
    }

    fn report(&mut self, err: &VfsError, target: Target) -> io::Result<()> {
        debug!("Command failed: {}", err);
        let message = match (err, target) {
            (VfsError::NotFound(_), Target::File) => "File not found.".to_string(),
            (VfsError::NotFound(_), Target::Directory) => "Directory not found.".to_string(),
            (VfsError::NotEmpty(_), _) => "Directory not empty.".to_string(),
            (VfsError::DiskFull, _) => "Disk full. Cannot allocate new block.".to_string(),
            (VfsError::DuplicateName(name), _) => format!("'{}' already exists.", name),
            (err, _) => format!("Error: {}.", err),
        };
        writeln!(self.out, "{}", message)
    }
}

/// What kind of entry the failing command was aimed at.
#[derive(Debug, Clone, Copy)]
enum Target {
    File,
    Directory,
}

/// Feeds every line of `input` to the shell until it is exhausted or `exit` is
/// read, then tears the file system down. Prompts are only written when
/// `interactive` is set.
pub fn run<R: BufRead, W: Write>(
    mut shell: Shell<W>,
    mut input: R,
    interactive: bool,
) -> io::Result<W> {
    if interactive {
        shell.show_prompt()?;
    }
    let mut line = Vec::new();
    loop {
        line.clear();
        if input.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        if shell.execute(&line)? == Flow::Exit {
            break;
        }
        if interactive {
            shell.show_prompt()?;
        }
    }
    shell.finish()
}

/// Runs the commands stored in a file.
pub fn run_script<P: AsRef<Path>, W: Write>(shell: Shell<W>, path: P) -> io::Result<W> {
    let script = File::open(path)?;
    run(shell, BufReader::new(script), false)
}
