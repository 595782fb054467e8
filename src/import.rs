//! Import: patching per-team asset files back into an image.
//!
//! Import mirrors extraction. Each team's folder is looked up by
//! abbreviation under the import root, and every asset file found there is
//! written over the matching range of the image. Teams without a folder, and
//! asset files missing from a folder, leave the image alone.
//!
//! Problems with individual files (bad hex, an unreadable file, a size
//! mismatch under strict checking) skip that file and are reported as
//! warnings. Problems with the image itself abort the import.

use std::fmt;
use std::path::Path;

use crate::asset;
use crate::error::Action;
use crate::error::Error;
use crate::error::Errors;
use crate::error::Result;
use crate::extract::folder_name;
use crate::layout::AssetKind;
use crate::rom::RomImage;
use crate::rom::RomVariant;
use crate::session;
use crate::session::TeamSlot;

/// Knobs for an import run.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct Options {
  /// Skip asset files whose decoded size differs from their asset kind's
  /// size, instead of writing them anyway.
  pub strict_sizes: bool,
}

/// Whether a team's image data changed.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Status {
  /// At least one asset file was written.
  Updated,
  /// Nothing was written for this team.
  Unchanged,
}

/// One team's import result.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Outcome {
  /// The team's position in the pointer table.
  pub index: usize,
  /// The team's abbreviation.
  pub abbreviation: String,
  /// Whether anything was written.
  pub status: Status,
  /// The asset kinds that were written, in import order.
  pub written: Vec<AssetKind>,
}

/// The result of a whole import run.
#[derive(Debug)]
pub struct Report {
  /// Every team, in team order.
  pub teams: Vec<Outcome>,
  /// Asset files that were skipped, and why.
  pub warnings: Errors<Error>,
}

impl Default for Report {
  fn default() -> Self {
    Self {
      teams: Vec::new(),
      warnings: Errors::warnings(),
    }
  }
}

impl Report {
  /// Returns the number of teams that were updated.
  pub fn updated(&self) -> usize {
    self
      .teams
      .iter()
      .filter(|t| t.status == Status::Updated)
      .count()
  }
}

impl fmt::Display for Report {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    for team in &self.teams {
      match team.status {
        Status::Updated => writeln!(f, "{} was updated.", team.abbreviation)?,
        Status::Unchanged => {
          writeln!(f, "{} data was not changed.", team.abbreviation)?
        }
      }
    }
    Ok(())
  }
}

/// Imports asset files for the first `team_count` teams from `import_root`
/// into `rom`.
///
/// Every team record is decoded before anything is written, so a decode
/// failure leaves `rom` untouched. A write that falls outside the image also
/// aborts, but by then earlier writes have already landed; callers should
/// import into a copy.
pub fn import(
  rom: &mut RomImage,
  variant: RomVariant,
  team_count: usize,
  import_root: &Path,
  options: Options,
) -> Result<Report> {
  let slots = session::slots(rom, variant, team_count)?;
  import_slots(rom, &slots, import_root, options)
}

pub(crate) fn import_slots(
  rom: &mut RomImage,
  slots: &[TeamSlot],
  import_root: &Path,
  options: Options,
) -> Result<Report> {
  let records = slots
    .iter()
    .map(|slot| slot.decode(&*rom))
    .collect::<Result<Vec<_>>>()?;

  let mut report = Report::default();
  for (slot, record) in slots.iter().zip(records) {
    let dir = import_root.join(folder_name(&record, slot.index));
    let mut written = Vec::new();

    if dir.is_dir() {
      for &kind in AssetKind::ALL.iter() {
        let path = asset::path_in(&dir, kind);
        let hex = match asset::read_file(&dir, kind) {
          Ok(Some(hex)) => hex,
          Ok(None) => continue,
          Err(e) => {
            tracing::warn!("skipping {}: {}", path.display(), e);
            report.warnings.push_file(Action::Importing, &path, e);
            continue;
          }
        };

        if options.strict_sizes {
          if let Err(e) = asset::check_size(kind, &hex) {
            tracing::warn!("skipping {}: {}", path.display(), e);
            report.warnings.push_file(Action::Importing, &path, e);
            continue;
          }
        }

        let offset = slot.offset_of(kind);
        match asset::write_hex(rom, offset, &hex) {
          Ok(len) => {
            if len != kind.size() {
              tracing::warn!(
                "{} is {} bytes, but a {} is {} bytes",
                path.display(),
                len,
                kind,
                kind.size()
              );
            }
            tracing::debug!("wrote {} bytes at 0x{:06x}", len, offset);
            written.push(kind);
          }
          Err(e @ Error::InvalidHex { .. }) => {
            tracing::warn!("skipping {}: {}", path.display(), e);
            report.warnings.push_file(Action::Importing, &path, e);
          }
          Err(e) => return Err(e),
        }
      }
    }

    let status = if written.is_empty() {
      Status::Unchanged
    } else {
      Status::Updated
    };
    tracing::info!(
      "team {} ({}): {:?}, {} files written",
      slot.index,
      record.abbreviation,
      status,
      written.len()
    );
    report.teams.push(Outcome {
      index: slot.index,
      abbreviation: record.abbreviation,
      status,
      written,
    });
  }

  Ok(report)
}
