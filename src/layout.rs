//! Where each team's graphics live in the image.
//!
//! Five of the seven per-team assets sit in tables of fixed-size entries,
//! one entry per team, in team order. The remaining two (the home and away
//! jersey palettes) are embedded in the team's own data block and are found
//! through its team pointer instead; see [`crate::team`].
//!
//! Each table entry is slightly larger than the asset itself: the image
//! tables carry a short header in front of the next entry, which is left
//! alone.

use std::fmt;

use crate::rom::RomVariant;
use crate::team;

/// A kind of per-team asset.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum AssetKind {
  /// The home jersey palette, which is also used for the rink logo.
  HomePalette,
  /// The away jersey palette.
  AwayPalette,
  /// The center-ice logo.
  RinkLogo,
  /// The team logo.
  TeamLogo,
  /// The palette for the team logo.
  TeamLogoPalette,
  /// The team banner.
  Banner,
  /// The home/visitor palette.
  HomeVisitorPalette,
}

impl AssetKind {
  /// Every asset kind, in the order they are extracted and imported.
  pub const ALL: [AssetKind; 7] = [
    Self::HomePalette,
    Self::AwayPalette,
    Self::RinkLogo,
    Self::TeamLogo,
    Self::TeamLogoPalette,
    Self::Banner,
    Self::HomeVisitorPalette,
  ];

  /// Returns the name of the file this asset is stored in.
  pub fn file_name(self) -> &'static str {
    match self {
      Self::HomePalette => "Rink_Logo_Jer_Palette_H.txt",
      Self::AwayPalette => "Jer_Palette_A.txt",
      Self::RinkLogo => "Rink_Logo.txt",
      Self::TeamLogo => "Team_Logo.txt",
      Self::TeamLogoPalette => "Team_Logo_Palette.txt",
      Self::Banner => "Banner.txt",
      Self::HomeVisitorPalette => "Home_Visitor_Palette.txt",
    }
  }

  /// Returns the number of bytes this asset occupies.
  pub fn size(self) -> usize {
    match self {
      Self::HomePalette | Self::AwayPalette => team::PALETTE_LEN,
      Self::RinkLogo => 0x300,
      Self::TeamLogo => 0x4cc,
      Self::TeamLogoPalette => 0x20,
      Self::Banner => 0x2c0,
      Self::HomeVisitorPalette => 0x40,
    }
  }

  /// Returns true if this asset lives inside the team's data block rather
  /// than in a layout table.
  pub fn is_inline(self) -> bool {
    matches!(self, Self::HomePalette | Self::AwayPalette)
  }
}

impl fmt::Display for AssetKind {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    let name = match self {
      Self::HomePalette => "home palette",
      Self::AwayPalette => "away palette",
      Self::RinkLogo => "rink logo",
      Self::TeamLogo => "team logo",
      Self::TeamLogoPalette => "team logo palette",
      Self::Banner => "banner",
      Self::HomeVisitorPalette => "home/visitor palette",
    };
    f.write_str(name)
  }
}

/// The position of one asset table: where its first entry starts and how far
/// apart consecutive entries are.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Placement {
  /// Offset of the entry for team 0.
  pub base: usize,
  /// Distance between entries.
  pub stride: usize,
}

impl Placement {
  const fn new(base: usize, stride: usize) -> Self {
    Self { base, stride }
  }

  /// Returns the offset of the entry for `team_index`.
  pub fn at(self, team_index: usize) -> usize {
    self.base + self.stride * team_index
  }
}

/// The asset tables for one cartridge layout.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct LayoutTable {
  /// The rink logo table.
  pub rink_logo: Placement,
  /// The team logo table.
  pub team_logo: Placement,
  /// The team logo palette table.
  pub team_logo_palette: Placement,
  /// The banner table.
  pub banner: Placement,
  /// The home/visitor palette table.
  pub home_visitor_palette: Placement,
}

impl LayoutTable {
  /// The 30-team layout.
  pub const TEAMS_30: LayoutTable = LayoutTable {
    rink_logo: Placement::new(0x1d6f02, 0x30a),
    team_logo: Placement::new(0x1c85b8, 0x4d6),
    team_logo_palette: Placement::new(0x1c81ee, 0x20),
    banner: Placement::new(0x1d16cc, 0x2c0),
    home_visitor_palette: Placement::new(0x1c6982, 0x40),
  };

  /// The 32-team layout.
  pub const TEAMS_32: LayoutTable = LayoutTable {
    rink_logo: Placement::new(0x1e317e, 0x30a),
    team_logo: Placement::new(0x1d38b0, 0x4d6),
    team_logo_palette: Placement::new(0x1d34a6, 0x20),
    banner: Placement::new(0x1dd370, 0x2c0),
    home_visitor_palette: Placement::new(0x1d1b0a, 0x40),
  };

  /// Returns the table for `variant`.
  pub fn for_variant(variant: RomVariant) -> &'static LayoutTable {
    match variant {
      RomVariant::Teams30 => &Self::TEAMS_30,
      RomVariant::Teams32 => &Self::TEAMS_32,
    }
  }
}

/// The absolute offsets of one team's table-resident assets.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct AssetOffsets {
  /// Offset of the rink logo.
  pub rink_logo: usize,
  /// Offset of the team logo.
  pub team_logo: usize,
  /// Offset of the team logo palette.
  pub team_logo_palette: usize,
  /// Offset of the banner.
  pub banner: usize,
  /// Offset of the home/visitor palette.
  pub home_visitor_palette: usize,
}

impl AssetOffsets {
  /// Computes the offsets for the team at `team_index` under `variant`.
  pub fn compute(variant: RomVariant, team_index: usize) -> Self {
    let table = LayoutTable::for_variant(variant);
    let offsets = Self {
      rink_logo: table.rink_logo.at(team_index),
      team_logo: table.team_logo.at(team_index),
      team_logo_palette: table.team_logo_palette.at(team_index),
      banner: table.banner.at(team_index),
      home_visitor_palette: table.home_visitor_palette.at(team_index),
    };
    tracing::debug!(
      "team {} offsets: rink logo 0x{:06x}, team logo 0x{:06x}, \
       logo palette 0x{:06x}, banner 0x{:06x}, home/visitor palette 0x{:06x}",
      team_index,
      offsets.rink_logo,
      offsets.team_logo,
      offsets.team_logo_palette,
      offsets.banner,
      offsets.home_visitor_palette,
    );
    offsets
  }

  /// Returns the offset for `kind`, or `None` for the inline palettes.
  pub fn get(&self, kind: AssetKind) -> Option<usize> {
    match kind {
      AssetKind::HomePalette | AssetKind::AwayPalette => None,
      AssetKind::RinkLogo => Some(self.rink_logo),
      AssetKind::TeamLogo => Some(self.team_logo),
      AssetKind::TeamLogoPalette => Some(self.team_logo_palette),
      AssetKind::Banner => Some(self.banner),
      AssetKind::HomeVisitorPalette => Some(self.home_visitor_palette),
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;

  macro_rules! assert_first_entry {
    ($variant:ident, $kind:ident => $expected:literal) => {
      assert_eq!(
        AssetOffsets::compute(RomVariant::$variant, 0).get(AssetKind::$kind),
        Some($expected)
      );
    };
  }

  fn placement(table: &LayoutTable, kind: AssetKind) -> Placement {
    match kind {
      AssetKind::RinkLogo => table.rink_logo,
      AssetKind::TeamLogo => table.team_logo,
      AssetKind::TeamLogoPalette => table.team_logo_palette,
      AssetKind::Banner => table.banner,
      AssetKind::HomeVisitorPalette => table.home_visitor_palette,
      kind => panic!("{} has no table", kind),
    }
  }

  #[test]
  fn first_entries_match_tables() {
    assert_first_entry!(Teams30, RinkLogo => 0x1d6f02);
    assert_first_entry!(Teams30, TeamLogo => 0x1c85b8);
    assert_first_entry!(Teams30, TeamLogoPalette => 0x1c81ee);
    assert_first_entry!(Teams30, Banner => 0x1d16cc);
    assert_first_entry!(Teams30, HomeVisitorPalette => 0x1c6982);

    assert_first_entry!(Teams32, RinkLogo => 0x1e317e);
    assert_first_entry!(Teams32, TeamLogo => 0x1d38b0);
    assert_first_entry!(Teams32, TeamLogoPalette => 0x1d34a6);
    assert_first_entry!(Teams32, Banner => 0x1dd370);
    assert_first_entry!(Teams32, HomeVisitorPalette => 0x1d1b0a);
  }

  #[test]
  fn offsets_increase_by_stride() {
    for &variant in &[RomVariant::Teams30, RomVariant::Teams32] {
      let table = LayoutTable::for_variant(variant);
      for team in 1..32 {
        let prev = AssetOffsets::compute(variant, team - 1);
        let this = AssetOffsets::compute(variant, team);
        for &kind in AssetKind::ALL.iter().filter(|k| !k.is_inline()) {
          let stride = placement(table, kind).stride;
          assert!(this.get(kind) > prev.get(kind));
          assert_eq!(this.get(kind).unwrap() - prev.get(kind).unwrap(), stride);
        }
      }
    }
  }

  #[test]
  fn entries_fit_their_strides() {
    let table = LayoutTable::TEAMS_30;
    for &kind in AssetKind::ALL.iter().filter(|k| !k.is_inline()) {
      assert!(kind.size() <= placement(&table, kind).stride);
    }
  }

  #[test]
  fn last_32_team_entries_stay_below_2mib() {
    let last = AssetOffsets::compute(RomVariant::Teams32, 31);
    for &kind in AssetKind::ALL.iter().filter(|k| !k.is_inline()) {
      assert!(last.get(kind).unwrap() + kind.size() <= 0x20_0000);
    }
  }

  #[test]
  fn inline_kinds_have_no_table() {
    let offsets = AssetOffsets::compute(RomVariant::Teams30, 4);
    assert_eq!(offsets.get(AssetKind::HomePalette), None);
  }
}
