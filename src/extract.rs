//! Extraction: copying every team's assets out of an image into per-team
//! folders of hex text files.

use std::fmt;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use crate::asset;
use crate::error::Error;
use crate::error::Result;
use crate::layout::AssetKind;
use crate::rom::RomImage;
use crate::rom::RomVariant;
use crate::session;
use crate::session::TeamSlot;
use crate::team::TeamRecord;

/// One team's extraction result.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Extracted {
  /// The team's position in the pointer table.
  pub index: usize,
  /// The team's abbreviation.
  pub abbreviation: String,
  /// The folder its assets were written to.
  pub dir: PathBuf,
}

/// The result of a whole extraction run.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Report {
  /// Every team that was extracted, in team order.
  pub teams: Vec<Extracted>,
}

impl fmt::Display for Report {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    for team in &self.teams {
      writeln!(f, "{} extracted to {}", team.abbreviation, team.dir.display())?;
    }
    write!(f, "Images and palettes for {} teams extracted.", self.teams.len())
  }
}

/// Returns the folder name a team's assets live under: its abbreviation, or
/// `teamNN` if the abbreviation is empty.
pub fn folder_name(record: &TeamRecord, index: usize) -> String {
  if record.abbreviation.is_empty() {
    tracing::warn!("team {} has no abbreviation, using its index", index);
    format!("team{:02}", index)
  } else {
    record.abbreviation.clone()
  }
}

/// Extracts the first `team_count` teams of `rom` into `out_root`.
///
/// Each team gets a folder named after its abbreviation, holding one file per
/// asset kind. Existing folders are reused and existing files overwritten.
/// The first failure stops the run.
pub fn extract(
  rom: &RomImage,
  variant: RomVariant,
  team_count: usize,
  out_root: &Path,
) -> Result<Report> {
  let slots = session::slots(rom, variant, team_count)?;
  extract_slots(rom, &slots, out_root)
}

pub(crate) fn extract_slots(
  rom: &RomImage,
  slots: &[TeamSlot],
  out_root: &Path,
) -> Result<Report> {
  fs::create_dir_all(out_root).map_err(|e| Error::io(out_root, e))?;

  let mut report = Report::default();
  for slot in slots {
    let record = slot.decode(rom)?;
    let dir = out_root.join(folder_name(&record, slot.index));
    fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;

    for &kind in AssetKind::ALL.iter() {
      let hex = match kind {
        AssetKind::HomePalette => asset::encode_hex(&record.home_palette),
        AssetKind::AwayPalette => asset::encode_hex(&record.away_palette),
        kind => asset::read_hex(rom, slot.offset_of(kind), kind.size())?,
      };
      asset::write_file(&dir, kind, &hex)?;
    }

    tracing::info!(
      "extracted team {} ({}) to {}",
      slot.index,
      record.abbreviation,
      dir.display()
    );
    report.teams.push(Extracted {
      index: slot.index,
      abbreviation: record.abbreviation,
      dir,
    });
  }

  Ok(report)
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::testing::fill_byte;
  use crate::testing::RomBuilder;
  use crate::testing::TeamSpec;

  #[test]
  fn writes_seven_files_per_team() {
    let mut builder = RomBuilder::new();
    builder
      .variant(RomVariant::Teams32)
      .team(TeamSpec::new("Boston", "BOS", "Bruins"))
      .team(TeamSpec::new("Hartford", "HFD", "Whalers"));
    let (rom, _) = builder.build();
    let out = tempfile::tempdir().unwrap();

    let report = extract(&rom, RomVariant::Teams32, 2, out.path()).unwrap();
    assert_eq!(report.teams.len(), 2);
    assert_eq!(report.teams[1].abbreviation, "HFD");
    assert_eq!(report.teams[1].dir, out.path().join("HFD"));

    for (i, team) in ["BOS", "HFD"].iter().enumerate() {
      let dir = out.path().join(team);
      for &kind in AssetKind::ALL.iter() {
        let text = fs::read_to_string(dir.join(kind.file_name())).unwrap();
        assert_eq!(text.len(), kind.size() * 2, "{} {}", team, kind);
        let expected = match kind {
          AssetKind::HomePalette => 0xa0 + i as u8,
          AssetKind::AwayPalette => 0xb0 + i as u8,
          kind => fill_byte(kind, i),
        };
        assert_eq!(text, asset::encode_hex(&vec![expected; kind.size()]));
      }
    }
  }

  #[test]
  fn reuses_existing_folders() {
    let mut builder = RomBuilder::new();
    builder.team(TeamSpec::new("Boston", "BOS", "Bruins"));
    let (rom, _) = builder.build();
    let out = tempfile::tempdir().unwrap();
    fs::create_dir_all(out.path().join("BOS")).unwrap();
    fs::write(out.path().join("BOS").join("Banner.txt"), "stale").unwrap();

    extract(&rom, RomVariant::Teams30, 1, out.path()).unwrap();
    let banner = fs::read_to_string(out.path().join("BOS/Banner.txt")).unwrap();
    assert_eq!(banner.len(), AssetKind::Banner.size() * 2);
  }

  #[test]
  fn decode_failure_aborts() {
    let mut builder = RomBuilder::new();
    builder
      .team(TeamSpec::new("Boston", "BOS", "Bruins"))
      .team(TeamSpec::new("Boston", "BOS", "Bruins"));
    let mut bytes = builder.build().0.into_bytes();
    // Team 1's block now starts two bytes before the end of the image.
    let entry = crate::pointer::TABLE_START + crate::pointer::ENTRY_LEN;
    let end = (bytes.len() - 2) as u32;
    bytes[entry..entry + 4].copy_from_slice(&end.to_be_bytes());
    let rom = RomImage::from_bytes(bytes);

    let out = tempfile::tempdir().unwrap();
    let err = extract(&rom, RomVariant::Teams30, 2, out.path()).unwrap_err();
    assert!(matches!(err, Error::MalformedRecord { team: Some(1), .. }));
    // Team 0 was written before the failure.
    assert!(out.path().join("BOS").join("Banner.txt").is_file());
  }

  #[test]
  fn missing_abbreviation_falls_back_to_index() {
    let mut builder = RomBuilder::new();
    builder.team(TeamSpec::new("Nowhere", "\u{1}", "Nobodies"));
    let (rom, _) = builder.build();
    let out = tempfile::tempdir().unwrap();

    let report = extract(&rom, RomVariant::Teams30, 1, out.path()).unwrap();
    assert_eq!(report.teams[0].dir, out.path().join("team00"));
  }
}
