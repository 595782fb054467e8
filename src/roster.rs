//! Team rosters.
//!
//! Rosters are not needed to move graphics around, but they sit in the same
//! team blocks and are handy when checking that a team table was read
//! correctly.
//!
//! The player data is a run of entries of the form
//! ```text
//!   u16       length of the name, plus two
//!   [u8]      name
//!   u8        jersey number, as BCD
//!   [u8; 7]   packed attributes
//! ```
//! Players are stored goalies first, then forwards, then defensemen. The
//! counts come from the team block header: the byte at +79 holds the number
//! of forwards in its high nibble and defensemen in its low nibble, and the
//! two bytes at +80 hold one non-zero nibble per goalie, terminated by a zero
//! nibble.

use std::fmt;

use crate::error::Error;
use crate::error::Result;
use crate::pointer::TeamPointer;
use crate::rom::RomImage;
use crate::team;
use crate::team::TeamRecord;

const SKATER_COUNTS: usize = 79;
const GOALIE_LIST: usize = 80;
const ATTRIBUTES_LEN: usize = 7;

/// A player's position.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Position {
  /// A goaltender.
  Goalie,
  /// A forward.
  Forward,
  /// A defenseman.
  Defense,
}

impl fmt::Display for Position {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    let c = match self {
      Self::Goalie => "G",
      Self::Forward => "F",
      Self::Defense => "D",
    };
    f.write_str(c)
  }
}

/// One roster entry.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Player {
  /// The player's name, cleaned to letters and spaces.
  pub name: String,
  /// The jersey number, BCD-encoded.
  pub jersey: u8,
  /// The player's position.
  pub position: Position,
}

impl Player {
  /// Returns the jersey number as printed on the jersey.
  pub fn jersey_number(&self) -> String {
    format!("{:x}", self.jersey)
  }
}

/// How many players of each position a team carries.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct Counts {
  /// Number of goalies.
  pub goalies: usize,
  /// Number of forwards.
  pub forwards: usize,
  /// Number of defensemen.
  pub defense: usize,
}

impl Counts {
  /// Reads the position counts for the team block at `pointer`.
  pub fn read(rom: &RomImage, pointer: TeamPointer) -> Result<Self> {
    let skaters = rom.bytes(pointer.offset() + SKATER_COUNTS, 1)?[0];
    let goalies = rom.read_u16(pointer.offset() + GOALIE_LIST)?;
    Ok(Self {
      goalies: goalie_count(goalies),
      forwards: (skaters >> 4) as usize,
      defense: (skaters & 0xf) as usize,
    })
  }

  /// Returns the position of the `n`th player, counting from zero.
  pub fn position_of(&self, n: usize) -> Position {
    if n < self.goalies {
      Position::Goalie
    } else if n < self.goalies + self.forwards {
      Position::Forward
    } else {
      Position::Defense
    }
  }
}

/// Counts the non-zero nibbles before the first zero nibble, high first.
fn goalie_count(list: u16) -> usize {
  (0..4)
    .map(|i| (list >> (12 - 4 * i)) & 0xf)
    .take_while(|&nibble| nibble != 0)
    .count()
}

/// Decodes the roster of the team at `pointer`, whose block decoded to
/// `record`.
pub fn decode(
  rom: &RomImage,
  pointer: TeamPointer,
  record: &TeamRecord,
) -> Result<Vec<Player>> {
  let counts = Counts::read(rom, pointer)?;
  let start = pointer.offset() + record.player_data_offset;
  let end = start + record.player_data_size;

  let malformed = |at: usize, what: &str| Error::MalformedRecord {
    team: None,
    pointer: pointer.offset(),
    reason: format!("player entry at 0x{:06x} {}", at, what),
  };

  let mut players = Vec::new();
  let mut cursor = start;
  while cursor < end {
    let len = rom
      .read_u16(cursor)
      .map_err(|_| malformed(cursor, "is past the end"))? as usize;
    if len < 2 {
      return Err(malformed(cursor, "has a length prefix shorter than itself"));
    }
    let name = rom
      .bytes(cursor + 2, len - 2)
      .map_err(|_| malformed(cursor, "runs past the end"))?;
    let jersey = rom
      .bytes(cursor + len, 1)
      .map_err(|_| malformed(cursor, "has no jersey number"))?[0];

    let name = String::from_utf8_lossy(name);
    let player = Player {
      name: team::letters_and_spaces(&name).trim().to_string(),
      jersey,
      position: counts.position_of(players.len()),
    };
    tracing::debug!(
      "{} #{} {}",
      player.name,
      player.jersey_number(),
      player.position
    );
    players.push(player);
    cursor += len + 1 + ATTRIBUTES_LEN;
  }

  Ok(players)
}
