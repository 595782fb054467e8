//! Types for holding and addressing a cartridge image.
//!
//! The image is addressed purely by absolute byte offset: there is no
//! mapping layer between the offsets stored in the team tables and the
//! positions in the file. All multi-byte integers in the image are
//! big-endian.

use std::convert::TryFrom;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::error::Error;
use crate::error::Result;

/// One of the two known cartridge layouts.
///
/// The layouts differ only in where the per-team graphics start; see
/// [`LayoutTable`].
///
/// [`LayoutTable`]: ../layout/struct.LayoutTable.html
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Deserialize, Serialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum RomVariant {
  /// The 30-team layout.
  Teams30,
  /// The 32-team layout.
  Teams32,
}

impl RomVariant {
  /// Returns the number of team slots this layout was built for.
  pub fn slots(self) -> usize {
    match self {
      Self::Teams30 => 30,
      Self::Teams32 => 32,
    }
  }
}

impl Default for RomVariant {
  fn default() -> Self {
    Self::Teams30
  }
}

impl TryFrom<u8> for RomVariant {
  type Error = String;

  fn try_from(n: u8) -> std::result::Result<Self, String> {
    match n {
      30 => Ok(Self::Teams30),
      32 => Ok(Self::Teams32),
      n => Err(format!("unknown ROM variant {}, expected 30 or 32", n)),
    }
  }
}

impl From<RomVariant> for u8 {
  fn from(v: RomVariant) -> u8 {
    v.slots() as u8
  }
}

impl FromStr for RomVariant {
  type Err = String;

  fn from_str(s: &str) -> std::result::Result<Self, String> {
    let digits = s.trim().trim_start_matches("teams");
    match digits.parse::<u8>() {
      Ok(n) => Self::try_from(n),
      Err(_) => Err(format!("unknown ROM variant {:?}, expected 30 or 32", s)),
    }
  }
}

impl fmt::Display for RomVariant {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}-team", self.slots())
  }
}

/// An in-memory cartridge image.
///
/// A `RomImage` never changes length: writes that would extend it are
/// rejected with [`Error::OutOfBounds`].
///
/// [`Error::OutOfBounds`]: ../error/enum.Error.html#variant.OutOfBounds
#[derive(Clone, PartialEq, Eq)]
pub struct RomImage {
  bytes: Vec<u8>,
}

impl RomImage {
  /// Wraps raw image bytes.
  pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
    Self {
      bytes: bytes.into(),
    }
  }

  /// Reads a whole image from disk.
  pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
    tracing::debug!("read {} bytes from {}", bytes.len(), path.display());
    Ok(Self { bytes })
  }

  /// Returns the number of bytes in this image.
  pub fn len(&self) -> usize {
    self.bytes.len()
  }

  /// Returns true if the image is empty.
  pub fn is_empty(&self) -> bool {
    self.bytes.is_empty()
  }

  /// Returns the raw image bytes.
  pub fn as_bytes(&self) -> &[u8] {
    &self.bytes
  }

  /// Consumes this `RomImage`, returning the raw image bytes.
  pub fn into_bytes(self) -> Vec<u8> {
    self.bytes
  }

  /// Returns `len` bytes starting at `offset`.
  pub fn bytes(&self, offset: usize, len: usize) -> Result<&[u8]> {
    match offset.checked_add(len) {
      Some(end) if end <= self.bytes.len() => Ok(&self.bytes[offset..end]),
      _ => Err(Error::TruncatedRom {
        offset,
        needed: len,
        len: self.bytes.len(),
      }),
    }
  }

  /// Returns `len` bytes starting at `offset`, for writing.
  pub fn bytes_mut(&mut self, offset: usize, len: usize) -> Result<&mut [u8]> {
    let rom_len = self.bytes.len();
    match offset.checked_add(len) {
      Some(end) if end <= rom_len => Ok(&mut self.bytes[offset..end]),
      _ => Err(Error::OutOfBounds {
        offset,
        len,
        rom_len,
      }),
    }
  }

  /// Copies `data` into the image at `offset`.
  pub fn write(&mut self, offset: usize, data: &[u8]) -> Result<()> {
    self.bytes_mut(offset, data.len())?.copy_from_slice(data);
    Ok(())
  }

  /// Reads a big-endian `u16` at `offset`.
  pub fn read_u16(&self, offset: usize) -> Result<u16> {
    let b = self.bytes(offset, 2)?;
    Ok(u16::from_be_bytes([b[0], b[1]]))
  }

  /// Reads a big-endian `u32` at `offset`.
  pub fn read_u32(&self, offset: usize) -> Result<u32> {
    let b = self.bytes(offset, 4)?;
    Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
  }

  /// Dumps `len` bytes starting at `start` to the given `Write`, 16 bytes to
  /// a line with an ASCII column. The range is clamped to the image.
  pub fn dump(
    &self,
    start: usize,
    len: usize,
    mut w: impl io::Write,
  ) -> io::Result<()> {
    let start = start.min(self.bytes.len());
    let end = start.saturating_add(len).min(self.bytes.len());

    let mut ascii_str = String::new();
    for (n, chunk) in self.bytes[start..end].chunks(16).enumerate() {
      write!(w, "{:06x}:", start + n * 16)?;

      ascii_str.clear();
      for &byte in chunk {
        write!(w, " {:02x}", byte)?;

        if 0x20 <= byte && byte <= 0x7e {
          ascii_str.push(byte as char);
        } else {
          ascii_str.push('.');
        }
      }
      for _ in chunk.len()..16 {
        write!(w, "   ")?;
      }
      writeln!(w, "  |{}|", ascii_str)?;
    }
    Ok(())
  }
}

impl fmt::Debug for RomImage {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.debug_struct("RomImage")
      .field("len", &self.bytes.len())
      .finish()
  }
}
