//! Team data blocks.
//!
//! Each team pointer leads to a block that looks like this:
//! ```text
//!   +0   u16  offset of the player data, relative to the block
//!   +4   u16  offset of the name block, relative to the block
//!   +12  [u8; 32]  home jersey palette (also used by the rink logo)
//!   +44  [u8; 32]  away jersey palette
//!   ...  player data, followed by two bytes of padding
//!   ...  name block
//! ```
//! The name block is a run of length-prefixed ASCII strings: city,
//! abbreviation, nickname and arena. Each prefix is a big-endian `u16` that
//! counts itself, so a prefix of 2 is an empty string. The strings can only
//! be found by walking the prefixes in order.
//!
//! Many cartridges in circulation have been hand-edited, and the names
//! frequently carry stray bytes left behind by earlier edits. Decoded names
//! are cleaned down to Latin letters (and spaces, where those are allowed).

use std::borrow::Cow;
use std::convert::TryFrom;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::Error;
use crate::error::Result;
use crate::pointer::TeamPointer;
use crate::rom::RomImage;

/// Offset of the home palette within a team block.
pub const HOME_PALETTE_OFFSET: usize = 12;

/// Offset of the away palette within a team block.
pub const AWAY_PALETTE_OFFSET: usize = 44;

/// Size of each jersey palette.
pub const PALETTE_LEN: usize = 32;

/// Offset of the name block offset within a team block.
const NAME_BLOCK_FIELD: usize = 4;

/// Size of a length prefix.
const PREFIX_LEN: usize = 2;

/// Unused bytes at the end of the player data.
const PLAYER_DATA_PADDING: usize = 2;

lazy_static! {
  static ref NOT_LETTER: Regex = Regex::new("[^A-Za-z]").unwrap();
  static ref NOT_LETTER_OR_SPACE: Regex = Regex::new("[^A-Za-z ]").unwrap();
}

/// Strips everything but ASCII letters from `s`.
pub fn letters(s: &str) -> Cow<'_, str> {
  NOT_LETTER.replace_all(s, "")
}

/// Strips everything but ASCII letters and spaces from `s`.
pub fn letters_and_spaces(s: &str) -> Cow<'_, str> {
  NOT_LETTER_OR_SPACE.replace_all(s, "")
}

/// The decoded contents of a team data block.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TeamRecord {
  /// The team's city, e.g. `"Boston"`.
  pub city: String,
  /// The team's abbreviation, e.g. `"BOS"`. Asset folders are named after
  /// this.
  pub abbreviation: String,
  /// The team's nickname, e.g. `"Bruins"`.
  pub nickname: String,
  /// The team's arena. Empty if it could not be read.
  pub arena: String,
  /// The home jersey palette.
  pub home_palette: [u8; PALETTE_LEN],
  /// The away jersey palette.
  pub away_palette: [u8; PALETTE_LEN],
  /// Start of the player data, relative to the team pointer.
  pub player_data_offset: usize,
  /// Length of the player data, not counting its padding.
  pub player_data_size: usize,
}

impl TeamRecord {
  /// Decodes the team block at `pointer`.
  pub fn decode(rom: &RomImage, pointer: TeamPointer) -> Result<Self> {
    let base = pointer.offset();
    let malformed = |reason: String| Error::MalformedRecord {
      team: None,
      pointer: base,
      reason,
    };
    let header = |offset: usize| {
      rom
        .read_u16(base + offset)
        .map(usize::from)
        .map_err(|e| malformed(format!("unreadable header: {}", e)))
    };

    let player_data_offset = header(0)?;
    let name_offset = header(NAME_BLOCK_FIELD)?;
    let home_palette = palette(rom, base + HOME_PALETTE_OFFSET)
      .map_err(|e| malformed(format!("unreadable home palette: {}", e)))?;
    let away_palette = palette(rom, base + AWAY_PALETTE_OFFSET)
      .map_err(|e| malformed(format!("unreadable away palette: {}", e)))?;

    let player_data_size = name_offset
      .saturating_sub(player_data_offset)
      .saturating_sub(PLAYER_DATA_PADDING);

    let mut names = NameReader {
      rom,
      cursor: base + name_offset,
    };
    let city = names.next_field().map_err(|r| malformed(format!("city {}", r)))?;
    let abbreviation = names
      .next_field()
      .map_err(|r| malformed(format!("abbreviation {}", r)))?;
    let nickname = names
      .next_field()
      .map_err(|r| malformed(format!("nickname {}", r)))?;
    let arena = names.next_field().unwrap_or_else(|r| {
      tracing::debug!("no arena name for team at 0x{:06x}: {}", base, r);
      String::new()
    });

    let record = Self {
      city: clean_name(&city),
      abbreviation: letters(&abbreviation).into_owned(),
      nickname: clean_name(&nickname),
      arena: clean_name(&arena),
      home_palette,
      away_palette,
      player_data_offset,
      player_data_size,
    };
    tracing::debug!(
      "decoded {} {} ({}) at 0x{:06x}",
      record.city,
      record.nickname,
      record.abbreviation,
      base,
    );
    Ok(record)
  }
}

/// Cleans a name that may contain spaces, dropping padding at either end.
fn clean_name(s: &str) -> String {
  letters_and_spaces(s).trim().to_string()
}

fn palette(rom: &RomImage, offset: usize) -> Result<[u8; PALETTE_LEN]> {
  let mut palette = [0; PALETTE_LEN];
  palette.copy_from_slice(rom.bytes(offset, PALETTE_LEN)?);
  Ok(palette)
}

/// Walks a run of length-prefixed strings.
struct NameReader<'rom> {
  rom: &'rom RomImage,
  cursor: usize,
}

impl NameReader<'_> {
  /// Reads the next field, returning the raw (uncleaned) text. On failure,
  /// returns a description of the problem.
  fn next_field(&mut self) -> std::result::Result<String, String> {
    let at = self.cursor;
    let len = self
      .rom
      .read_u16(at)
      .map_err(|_| format!("length prefix at 0x{:06x} is past the end", at))?
      as usize;
    if len < PREFIX_LEN {
      return Err(format!(
        "length prefix at 0x{:06x} is {}, shorter than itself",
        at, len
      ));
    }

    let text = self.rom.bytes(at + PREFIX_LEN, len - PREFIX_LEN).map_err(|_| {
      format!("{}-byte field at 0x{:06x} runs past the end", len, at)
    })?;
    self.cursor = at + len;
    Ok(String::from_utf8_lossy(text).into_owned())
  }
}

/// Encodes `text` as a length-prefixed name field.
///
/// Returns `None` if the text is too long to fit a prefix.
pub fn encode_field(text: &str) -> Option<Vec<u8>> {
  let len = u16::try_from(text.len() + PREFIX_LEN).ok()?;
  let mut field = Vec::with_capacity(len as usize);
  field.extend_from_slice(&len.to_be_bytes());
  field.extend_from_slice(text.as_bytes());
  Some(field)
}
