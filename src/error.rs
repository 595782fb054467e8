//! Errors and diagnostic printing.
//!
//! Every fallible operation in this crate returns an [`Error`]. Failures that
//! should not stop a run (an unreadable asset file during import, say) are
//! collected into an [`Errors`] instead, which knows how to print itself as
//! a list of user-facing diagnostics.
//!
//! [`Error`]: enum.Error.html
//! [`Errors`]: struct.Errors.html

use std::fmt;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use crate::layout::AssetKind;

/// A convenience alias for results carrying an [`Error`].
///
/// [`Error`]: enum.Error.html
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while reading or patching a cartridge image.
#[derive(Debug, thiserror::Error)]
pub enum Error {
  /// A read ran past the end of the image.
  #[error(
    "image is truncated: needed {needed} bytes at 0x{offset:06x}, but the \
     image is only {len} bytes long"
  )]
  TruncatedRom {
    /// Where the read started.
    offset: usize,
    /// How many bytes were requested.
    needed: usize,
    /// The length of the image.
    len: usize,
  },
  /// A team record could not be walked, usually because a length prefix
  /// points outside of the image.
  #[error("malformed team record at 0x{pointer:06x}{}: {reason}", team_suffix(.team))]
  MalformedRecord {
    /// The team index, once it is known.
    team: Option<usize>,
    /// The team pointer the record was decoded from.
    pointer: usize,
    /// What was wrong with it.
    reason: String,
  },
  /// Asset text was not a valid hex string.
  #[error("invalid hex: {reason}")]
  InvalidHex {
    /// What was wrong with it.
    reason: String,
  },
  /// A write would run past the end of the image.
  #[error(
    "writing {len} bytes at 0x{offset:06x} would run past the end of the \
     {rom_len}-byte image"
  )]
  OutOfBounds {
    /// Where the write started.
    offset: usize,
    /// How many bytes were to be written.
    len: usize,
    /// The length of the image.
    rom_len: usize,
  },
  /// An asset file decoded to the wrong number of bytes. Only raised when
  /// strict size checking is enabled.
  #[error("{kind} asset is {actual} bytes, expected {expected}")]
  AssetSizeMismatch {
    /// The asset kind the file was meant for.
    kind: AssetKind,
    /// The size the asset kind calls for.
    expected: usize,
    /// The size that was decoded.
    actual: usize,
  },
  /// A filesystem operation failed.
  #[error("could not access {}: {source}", .path.display())]
  Io {
    /// The file or directory involved.
    path: PathBuf,
    /// The underlying error.
    source: io::Error,
  },
  /// The configuration is unusable.
  #[error("invalid configuration: {0}")]
  Config(String),
}

fn team_suffix(team: &Option<usize>) -> String {
  match team {
    Some(team) => format!(" (team {})", team),
    None => String::new(),
  }
}

impl Error {
  /// Wraps an `io::Error` with the path it happened on.
  pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
    Self::Io {
      path: path.as_ref().to_path_buf(),
      source,
    }
  }

  /// Attaches a team index to a `MalformedRecord`; other errors pass through
  /// unchanged.
  pub fn for_team(self, index: usize) -> Self {
    match self {
      Self::MalformedRecord {
        team: None,
        pointer,
        reason,
      } => Self::MalformedRecord {
        team: Some(index),
        pointer,
        reason,
      },
      e => e,
    }
  }

  /// Returns a `Cause` describing where this error came from.
  pub fn cause(&self) -> Cause<'_> {
    match self {
      Self::TruncatedRom { offset, .. } | Self::OutOfBounds { offset, .. } => {
        Cause::Offset(*offset)
      }
      Self::MalformedRecord {
        team: Some(team), ..
      } => Cause::Team(*team),
      Self::MalformedRecord { pointer, .. } => Cause::Offset(*pointer),
      Self::Io { path, .. } => Cause::File(path),
      Self::InvalidHex { .. }
      | Self::AssetSizeMismatch { .. }
      | Self::Config(_) => Cause::Unknown,
    }
  }
}

/// The place where an error occured, to varying degrees of specificity.
#[derive(Copy, Clone, Debug)]
pub enum Cause<'a> {
  /// A team, by position in the pointer table.
  Team(usize),
  /// An absolute offset into the image.
  Offset(usize),
  /// A file on disk.
  File(&'a Path),
  /// Nothing more specific is known.
  Unknown,
}

impl fmt::Display for Cause<'_> {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      Self::Team(team) => write!(f, "team {}", team),
      Self::Offset(offset) => write!(f, "offset 0x{:06x}", offset),
      Self::File(path) => write!(f, "{}", path.display()),
      Self::Unknown => f.write_str("<unknown>"),
    }
  }
}

/// An action that the tool performs, which an error may be associated with.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Action {
  /// Reading the image and its team table.
  Loading,
  /// Writing asset files out of the image.
  Extracting,
  /// Patching asset files into the image.
  Importing,
  /// Writing the patched image to disk.
  Saving,
}

impl Action {
  fn describe(self) -> &'static str {
    match self {
      Self::Loading => "loading",
      Self::Extracting => "extracting",
      Self::Importing => "importing",
      Self::Saving => "saving",
    }
  }
}

/// How bad an entry in an [`Errors`] is.
///
/// [`Errors`]: struct.Errors.html
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Severity {
  /// The run could not finish.
  Error,
  /// Something was skipped, but the run carried on.
  Warning,
}

/// A single collected diagnostic.
#[derive(Debug)]
pub struct Entry<E> {
  /// What went wrong.
  pub error: E,
  /// What was being done when it went wrong.
  pub action: Action,
  /// Where it went wrong, if the error itself does not know.
  pub file: Option<PathBuf>,
}

/// A collection of errors that may built up over the course of an action.
#[derive(Debug)]
pub struct Errors<E> {
  severity: Severity,
  entries: Vec<Entry<E>>,
}

impl<E> Errors<E> {
  /// Creates an empty `Errors` whose entries are fatal.
  pub fn new() -> Self {
    Self {
      severity: Severity::Error,
      entries: Vec::new(),
    }
  }

  /// Creates an empty `Errors` whose entries are warnings.
  pub fn warnings() -> Self {
    Self {
      severity: Severity::Warning,
      entries: Vec::new(),
    }
  }

  /// Returns true if this `Errors` hasn't had any errors added yet.
  pub fn is_ok(&self) -> bool {
    self.entries.is_empty()
  }

  /// Returns the number of collected entries.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// Adds a new error to this `Errors`.
  pub fn push(&mut self, action: Action, error: E) {
    self.entries.push(Entry {
      error,
      action,
      file: None,
    });
  }

  /// Adds a new error that happened while handling `file`.
  pub fn push_file(&mut self, action: Action, file: &Path, error: E) {
    self.entries.push(Entry {
      error,
      action,
      file: Some(file.to_path_buf()),
    });
  }

  /// Returns an iterator over the collected entries.
  pub fn iter(&self) -> impl Iterator<Item = &Entry<E>> {
    self.entries.iter()
  }
}

impl<E> Default for Errors<E> {
  fn default() -> Self {
    Self::new()
  }
}

impl Errors<Error> {
  /// Dumps this collection of errors as user-displayable text into `sink`.
  ///
  /// Returns `Ok(true)` if anything was written.
  pub fn dump_to(&self, mut sink: impl io::Write) -> io::Result<bool> {
    if self.entries.is_empty() {
      return Ok(false);
    }

    let label = match self.severity {
      Severity::Error => "error",
      Severity::Warning => "warning",
    };

    for (i, entry) in self.entries.iter().enumerate() {
      writeln!(sink, "{}: {}", label, entry.error)?;
      let cause = match (&entry.file, entry.error.cause()) {
        (Some(file), Cause::Unknown) => Cause::File(file),
        (_, cause) => cause,
      };
      match cause {
        Cause::Unknown => writeln!(sink, "  while {}", entry.action.describe())?,
        cause => {
          writeln!(sink, "  while {} {}", entry.action.describe(), cause)?
        }
      }

      if i != self.entries.len() - 1 {
        writeln!(sink)?;
      }
    }

    Ok(true)
  }

  /// Calls `dump_to()` on `stderr`, exiting the process with the given
  /// `code` if any errors are present.
  pub fn dump_and_die(self, code: i32) {
    // Writing to stderr is fairly unlikely to fail, so ignoring a failure
    // here is fine.
    if let Ok(true) = self.dump_to(io::stderr()) {
      eprintln!();
      eprintln!("error: there were {} errors", self.entries.len());
      std::process::exit(code)
    }
  }
}
