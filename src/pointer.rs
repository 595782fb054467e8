//! The team pointer table.

use std::fmt;

use crate::error::Error;
use crate::error::Result;
use crate::rom::RomImage;

/// Offset of the first entry of the team pointer table.
pub const TABLE_START: usize = 0x30e;

/// Size of one table entry.
pub const ENTRY_LEN: usize = 4;

/// The most teams any known layout holds.
pub const MAX_TEAMS: usize = 32;

/// The absolute offset of one team's data block.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct TeamPointer(pub u32);

impl TeamPointer {
  /// Returns this pointer as an image offset.
  pub fn offset(self) -> usize {
    self.0 as usize
  }
}

impl fmt::Display for TeamPointer {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "0x{:06x}", self.0)
  }
}

/// Reads the first `team_count` entries of the pointer table.
///
/// Entries come back in table order, which is also team order. Nothing
/// checks that the table actually holds `team_count` teams; asking for more
/// than it holds will yield garbage pointers.
pub fn read(rom: &RomImage, team_count: usize) -> Result<Vec<TeamPointer>> {
  // A count this large can never fit, so report it as a truncated table.
  let table_len = team_count.checked_mul(ENTRY_LEN).ok_or_else(|| {
    Error::TruncatedRom {
      offset: TABLE_START,
      needed: usize::MAX,
      len: rom.len(),
    }
  })?;
  rom.bytes(TABLE_START, table_len)?;

  let pointers = (0..team_count)
    .map(|i| rom.read_u32(TABLE_START + i * ENTRY_LEN).map(TeamPointer))
    .collect::<Result<Vec<_>>>()?;
  for (i, ptr) in pointers.iter().enumerate() {
    tracing::debug!("team {} pointer: {}", i, ptr);
  }
  Ok(pointers)
}
