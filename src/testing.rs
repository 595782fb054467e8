//! Synthetic cartridge images for tests.

use crate::layout::AssetKind;
use crate::layout::AssetOffsets;
use crate::pointer;
use crate::pointer::TeamPointer;
use crate::rom::RomImage;
use crate::rom::RomVariant;
use crate::team;

/// Size of a built image; large enough for a 32-team layout.
pub const IMAGE_LEN: usize = 0x20_0000;

/// Where the first team block is placed.
pub const FIRST_TEAM: usize = 0x1_0000;

/// Distance between team blocks.
pub const TEAM_STRIDE: usize = 0x400;

/// Offset of the player data within built team blocks.
pub const PLAYER_DATA: usize = 0x60;

/// One team to put in a built image.
#[derive(Clone, Debug)]
pub struct TeamSpec {
  city: String,
  abbreviation: String,
  nickname: String,
  arena: Option<String>,
  players: Vec<(String, u8)>,
  goalies: [u8; 2],
  skaters: u8,
}

impl TeamSpec {
  pub fn new(city: &str, abbreviation: &str, nickname: &str) -> Self {
    Self {
      city: city.into(),
      abbreviation: abbreviation.into(),
      nickname: nickname.into(),
      arena: None,
      players: Vec::new(),
      goalies: [0; 2],
      skaters: 0,
    }
  }

  pub fn arena(mut self, arena: &str) -> Self {
    self.arena = Some(arena.into());
    self
  }

  /// Sets the roster. `goalies` and `skaters` are written verbatim to the
  /// position count bytes.
  pub fn players(
    mut self,
    players: &[(&str, u8)],
    goalies: [u8; 2],
    skaters: u8,
  ) -> Self {
    self.players = players.iter().map(|&(n, j)| (n.into(), j)).collect();
    self.goalies = goalies;
    self.skaters = skaters;
    self
  }
}

/// The byte a built image fills `kind` with for team `team`.
pub fn fill_byte(kind: AssetKind, team: usize) -> u8 {
  let kind = AssetKind::ALL.iter().position(|&k| k == kind).unwrap() as u8;
  0x10 * (kind + 1) + team as u8
}

/// Builds synthetic images with a populated pointer table, team blocks and
/// asset tables.
pub struct RomBuilder {
  variant: RomVariant,
  teams: Vec<TeamSpec>,
}

impl RomBuilder {
  pub fn new() -> Self {
    Self {
      variant: RomVariant::Teams30,
      teams: Vec::new(),
    }
  }

  pub fn variant(&mut self, variant: RomVariant) -> &mut Self {
    self.variant = variant;
    self
  }

  pub fn team(&mut self, team: TeamSpec) -> &mut Self {
    self.teams.push(team);
    self
  }

  pub fn build(&self) -> (RomImage, Vec<TeamPointer>) {
    let mut bytes = vec![0xff; IMAGE_LEN];
    let mut pointers = Vec::new();

    for (i, spec) in self.teams.iter().enumerate() {
      let base = FIRST_TEAM + i * TEAM_STRIDE;
      let entry = pointer::TABLE_START + i * pointer::ENTRY_LEN;
      bytes[entry..entry + 4].copy_from_slice(&(base as u32).to_be_bytes());
      pointers.push(TeamPointer(base as u32));

      let mut players = Vec::new();
      for (name, jersey) in &spec.players {
        players.extend(team::encode_field(name).unwrap());
        players.push(*jersey);
        players.extend_from_slice(&[0x55; 7]);
      }
      let name_offset = PLAYER_DATA + players.len() + 2;

      let mut block = vec![0; name_offset];
      block[0..2].copy_from_slice(&(PLAYER_DATA as u16).to_be_bytes());
      block[4..6].copy_from_slice(&(name_offset as u16).to_be_bytes());
      for b in &mut block[team::HOME_PALETTE_OFFSET..][..team::PALETTE_LEN] {
        *b = 0xa0 + i as u8;
      }
      for b in &mut block[team::AWAY_PALETTE_OFFSET..][..team::PALETTE_LEN] {
        *b = 0xb0 + i as u8;
      }
      block[79] = spec.skaters;
      block[80..82].copy_from_slice(&spec.goalies);
      block[PLAYER_DATA..PLAYER_DATA + players.len()].copy_from_slice(&players);

      for name in &[&spec.city, &spec.abbreviation, &spec.nickname] {
        block.extend(team::encode_field(name).unwrap());
      }
      if let Some(arena) = &spec.arena {
        block.extend(team::encode_field(arena).unwrap());
      }
      assert!(block.len() <= TEAM_STRIDE);
      bytes[base..base + block.len()].copy_from_slice(&block);

      let offsets = AssetOffsets::compute(self.variant, i);
      for &kind in AssetKind::ALL.iter().filter(|k| !k.is_inline()) {
        let at = offsets.get(kind).unwrap();
        for b in &mut bytes[at..at + kind.size()] {
          *b = fill_byte(kind, i);
        }
      }
    }

    (RomImage::from_bytes(bytes), pointers)
  }
}
