//! Run configuration.
//!
//! Settings can come from a json5 file, which the command line then
//! overrides. For example:
//! ```json5
//! {
//!   team_count: 26,
//!   variant: 32,
//!   import_root: "import",
//!   strict_sizes: true,
//! }
//! ```

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::error::Error;
use crate::error::Result;
use crate::pointer;
use crate::rom::RomVariant;

/// Settings shared by every command.
#[derive(Clone, PartialEq, Eq, Debug, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
  /// Number of active teams in the image.
  pub team_count: usize,
  /// Which layout the image uses.
  pub variant: RomVariant,
  /// Where import looks for team folders.
  pub import_root: PathBuf,
  /// Where extraction creates its per-image folder.
  pub output_root: PathBuf,
  /// Whether import should skip wrongly sized asset files.
  pub strict_sizes: bool,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      team_count: 24,
      variant: RomVariant::Teams30,
      import_root: PathBuf::from("import"),
      output_root: PathBuf::from("."),
      strict_sizes: false,
    }
  }
}

impl Config {
  /// Parses a config from json5 text.
  pub fn from_json5(text: &str) -> Result<Self> {
    json5::from_str(text).map_err(|e| Error::Config(e.to_string()))
  }

  /// Reads a config file.
  pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    Self::from_json5(&text).map_err(|e| match e {
      Error::Config(msg) => {
        Error::Config(format!("{}: {}", path.display(), msg))
      }
      e => e,
    })
  }

  /// Checks that the settings make sense together.
  pub fn validate(&self) -> Result<()> {
    if self.team_count == 0 || self.team_count > pointer::MAX_TEAMS {
      return Err(Error::Config(format!(
        "team count must be between 1 and {}, got {}",
        pointer::MAX_TEAMS,
        self.team_count
      )));
    }
    if self.team_count > self.variant.slots() {
      tracing::warn!(
        "{} teams requested, but a {} image only has room for {}",
        self.team_count,
        self.variant,
        self.variant.slots()
      );
    }
    Ok(())
  }
}
