//! A loaded cartridge image and its team table.
//!
//! A `Session` is built once per loaded image. It owns the working copy of
//! the image, which is the only thing import ever writes to; the file the
//! image was loaded from is never touched, and the working copy only reaches
//! disk through [`Session::save`].
//!
//! [`Session::save`]: struct.Session.html#method.save

use std::ffi::OsStr;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use crate::error::Error;
use crate::error::Result;
use crate::extract;
use crate::import;
use crate::layout::AssetKind;
use crate::layout::AssetOffsets;
use crate::pointer;
use crate::pointer::TeamPointer;
use crate::rom::RomImage;
use crate::rom::RomVariant;
use crate::team;
use crate::team::TeamRecord;

/// Everything needed to find one team's assets.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct TeamSlot {
  /// The team's position in the pointer table.
  pub index: usize,
  /// The team's data block.
  pub pointer: TeamPointer,
  /// The team's table-resident assets.
  pub offsets: AssetOffsets,
}

impl TeamSlot {
  /// Returns the absolute offset of `kind` for this team.
  pub fn offset_of(&self, kind: AssetKind) -> usize {
    match kind {
      AssetKind::HomePalette => {
        self.pointer.offset() + team::HOME_PALETTE_OFFSET
      }
      AssetKind::AwayPalette => {
        self.pointer.offset() + team::AWAY_PALETTE_OFFSET
      }
      AssetKind::RinkLogo => self.offsets.rink_logo,
      AssetKind::TeamLogo => self.offsets.team_logo,
      AssetKind::TeamLogoPalette => self.offsets.team_logo_palette,
      AssetKind::Banner => self.offsets.banner,
      AssetKind::HomeVisitorPalette => self.offsets.home_visitor_palette,
    }
  }

  /// Decodes this team's data block.
  pub fn decode(&self, rom: &RomImage) -> Result<TeamRecord> {
    TeamRecord::decode(rom, self.pointer).map_err(|e| e.for_team(self.index))
  }
}

/// Reads the pointer table and computes offsets for the first `team_count`
/// teams.
pub fn slots(
  rom: &RomImage,
  variant: RomVariant,
  team_count: usize,
) -> Result<Vec<TeamSlot>> {
  if team_count == 0 || team_count > pointer::MAX_TEAMS {
    return Err(Error::Config(format!(
      "team count must be between 1 and {}, got {}",
      pointer::MAX_TEAMS,
      team_count
    )));
  }

  let pointers = pointer::read(rom, team_count)?;
  Ok(
    pointers
      .into_iter()
      .enumerate()
      .map(|(index, pointer)| TeamSlot {
        index,
        pointer,
        offsets: AssetOffsets::compute(variant, index),
      })
      .collect(),
  )
}

/// A loaded image together with the layout it is being read with.
#[derive(Debug)]
pub struct Session {
  rom: RomImage,
  variant: RomVariant,
  slots: Vec<TeamSlot>,
  source: Option<PathBuf>,
}

impl Session {
  /// Creates a session over an in-memory image.
  pub fn new(rom: RomImage, variant: RomVariant, team_count: usize) -> Result<Self> {
    let slots = slots(&rom, variant, team_count)?;
    Ok(Self {
      rom,
      variant,
      slots,
      source: None,
    })
  }

  /// Loads the image at `path` and creates a session over a copy of it.
  pub fn load(
    path: impl AsRef<Path>,
    variant: RomVariant,
    team_count: usize,
  ) -> Result<Self> {
    let path = path.as_ref();
    let rom = RomImage::from_file(path)?;
    tracing::info!(
      "loaded {} ({} bytes) as a {} image with {} teams",
      path.display(),
      rom.len(),
      variant,
      team_count
    );
    let mut session = Self::new(rom, variant, team_count)?;
    session.source = Some(path.to_path_buf());
    Ok(session)
  }

  /// Returns the working copy of the image.
  pub fn rom(&self) -> &RomImage {
    &self.rom
  }

  /// Returns the layout variant in use.
  pub fn variant(&self) -> RomVariant {
    self.variant
  }

  /// Returns the number of teams being processed.
  pub fn team_count(&self) -> usize {
    self.slots.len()
  }

  /// Returns the team slots, in team order.
  pub fn teams(&self) -> &[TeamSlot] {
    &self.slots
  }

  /// Returns the folder name extraction uses for this image: the stem of the
  /// file it was loaded from.
  pub fn base_name(&self) -> &OsStr {
    self
      .source
      .as_deref()
      .and_then(Path::file_stem)
      .unwrap_or_else(|| OsStr::new("rom"))
  }

  /// Extracts every team's assets into `out_root`.
  pub fn extract(&self, out_root: &Path) -> Result<extract::Report> {
    extract::extract_slots(&self.rom, &self.slots, out_root)
  }

  /// Imports asset files from `import_root` into the working copy.
  pub fn import(
    &mut self,
    import_root: &Path,
    options: import::Options,
  ) -> Result<import::Report> {
    import::import_slots(&mut self.rom, &self.slots, import_root, options)
  }

  /// Writes the working copy to `dest`, returning the path written.
  ///
  /// A `.bin` extension is added if `dest` has none. The image is written to
  /// a temporary file next to the destination and moved into place, so a
  /// failed save leaves any existing file alone. Saving over the file the
  /// image was loaded from is refused.
  pub fn save(&self, dest: impl AsRef<Path>) -> Result<PathBuf> {
    let mut dest = dest.as_ref().to_path_buf();
    if dest.extension().is_none() {
      dest.set_extension("bin");
    }

    if let Some(source) = &self.source {
      if same_file(source, &dest) {
        return Err(Error::Config(format!(
          "refusing to overwrite the source image {}",
          source.display()
        )));
      }
    }

    let dir = match dest.parent() {
      Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
      _ => PathBuf::from("."),
    };
    let mut tmp =
      tempfile::NamedTempFile::new_in(&dir).map_err(|e| Error::io(&dir, e))?;
    tmp
      .write_all(self.rom.as_bytes())
      .map_err(|e| Error::io(tmp.path(), e))?;
    tmp.persist(&dest).map_err(|e| Error::io(&dest, e.error))?;

    tracing::info!("saved {} bytes to {}", self.rom.len(), dest.display());
    Ok(dest)
  }
}

fn same_file(a: &Path, b: &Path) -> bool {
  match (a.canonicalize(), b.canonicalize()) {
    (Ok(a), Ok(b)) => a == b,
    _ => a == b,
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::testing::RomBuilder;
  use crate::testing::TeamSpec;

  fn two_teams() -> RomImage {
    let mut builder = RomBuilder::new();
    builder
      .team(TeamSpec::new("Boston", "BOS", "Bruins"))
      .team(TeamSpec::new("Buffalo", "BUF", "Sabres"));
    builder.build().0
  }

  #[test]
  fn slots_follow_table_order() {
    let rom = two_teams();
    let session = Session::new(rom, RomVariant::Teams30, 2).unwrap();
    let teams = session.teams();
    assert_eq!(teams.len(), 2);
    assert_eq!(teams[1].index, 1);
    assert_eq!(teams[1].offsets, AssetOffsets::compute(RomVariant::Teams30, 1));
    assert_eq!(
      teams[1].offset_of(AssetKind::AwayPalette),
      teams[1].pointer.offset() + 44
    );
    assert_eq!(teams[0].decode(session.rom()).unwrap().abbreviation, "BOS");
  }

  #[test]
  fn team_count_is_checked() {
    assert!(matches!(
      Session::new(two_teams(), RomVariant::Teams30, 0),
      Err(Error::Config(_))
    ));
    assert!(matches!(
      Session::new(two_teams(), RomVariant::Teams32, 33),
      Err(Error::Config(_))
    ));
  }

  #[test]
  fn decode_errors_name_the_team() {
    let mut bytes = two_teams().into_bytes();
    // Point team 1 at the very end of the image.
    let at = pointer::TABLE_START + pointer::ENTRY_LEN;
    let end = (bytes.len() - 2) as u32;
    bytes[at..at + 4].copy_from_slice(&end.to_be_bytes());
    let session =
      Session::new(RomImage::from_bytes(bytes), RomVariant::Teams30, 2).unwrap();

    assert!(matches!(
      session.teams()[1].decode(session.rom()),
      Err(Error::MalformedRecord { team: Some(1), .. })
    ));
  }

  #[test]
  fn save_adds_extension_and_keeps_source() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("league.bin");
    std::fs::write(&source, two_teams().as_bytes()).unwrap();

    let session = Session::load(&source, RomVariant::Teams30, 2).unwrap();
    assert_eq!(session.base_name(), "league");

    let saved = session.save(dir.path().join("patched")).unwrap();
    assert_eq!(saved, dir.path().join("patched.bin"));
    assert_eq!(std::fs::read(&saved).unwrap(), session.rom().as_bytes());

    assert!(matches!(session.save(&source), Err(Error::Config(_))));
  }
}
