//! Asset byte ranges and their on-disk hex text form.
//!
//! An asset file holds the exact bytes of one asset as lowercase hex, with
//! no separators. Files are read back leniently: surrounding whitespace is
//! ignored and uppercase digits are accepted.

use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use crate::error::Error;
use crate::error::Result;
use crate::layout::AssetKind;
use crate::rom::RomImage;

/// Encodes `bytes` as lowercase hex.
pub fn encode_hex(bytes: &[u8]) -> String {
  hex::encode(bytes)
}

/// Decodes a hex string into bytes.
pub fn decode_hex(text: &str) -> Result<Vec<u8>> {
  hex::decode(text.trim()).map_err(|e| Error::InvalidHex {
    reason: e.to_string(),
  })
}

/// Reads `length` bytes at `offset` as lowercase hex.
pub fn read_hex(rom: &RomImage, offset: usize, length: usize) -> Result<String> {
  Ok(encode_hex(rom.bytes(offset, length)?))
}

/// Decodes `hex` and writes it into the image at `offset`, returning the
/// number of bytes written.
///
/// The length of the data is not checked against any asset size; see
/// [`check_size`].
///
/// [`check_size`]: fn.check_size.html
pub fn write_hex(rom: &mut RomImage, offset: usize, hex: &str) -> Result<usize> {
  let bytes = decode_hex(hex)?;
  rom.write(offset, &bytes)?;
  Ok(bytes.len())
}

/// Checks that `hex` decodes to exactly as many bytes as `kind` occupies.
pub fn check_size(kind: AssetKind, hex: &str) -> Result<()> {
  let actual = decode_hex(hex)?.len();
  if actual != kind.size() {
    return Err(Error::AssetSizeMismatch {
      kind,
      expected: kind.size(),
      actual,
    });
  }
  Ok(())
}

/// Returns the path of `kind`'s file inside a team folder.
pub fn path_in(team_dir: &Path, kind: AssetKind) -> PathBuf {
  team_dir.join(kind.file_name())
}

/// Writes `hex` as `kind`'s file inside `team_dir`.
pub fn write_file(team_dir: &Path, kind: AssetKind, hex: &str) -> Result<()> {
  let path = path_in(team_dir, kind);
  fs::write(&path, hex).map_err(|e| Error::io(&path, e))
}

/// Reads `kind`'s file from `team_dir`, or `None` if there is no such file.
pub fn read_file(team_dir: &Path, kind: AssetKind) -> Result<Option<String>> {
  let path = path_in(team_dir, kind);
  match fs::read_to_string(&path) {
    Ok(text) => Ok(Some(text)),
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
    Err(e) => Err(Error::io(&path, e)),
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn encodes_lowercase() {
    assert_eq!(encode_hex(&[0x00, 0xab, 0x7f]), "00ab7f");
    assert_eq!(encode_hex(&[]), "");
  }

  #[test]
  fn decodes_leniently() {
    assert_eq!(decode_hex("00AbfF\n").unwrap(), vec![0x00, 0xab, 0xff]);
    assert_eq!(decode_hex("").unwrap(), Vec::<u8>::new());
  }

  #[test]
  fn rejects_bad_hex() {
    assert!(matches!(decode_hex("abc"), Err(Error::InvalidHex { .. })));
    assert!(matches!(decode_hex("zz00"), Err(Error::InvalidHex { .. })));
    assert!(matches!(decode_hex("00 11"), Err(Error::InvalidHex { .. })));
    assert!(matches!(decode_hex("é0"), Err(Error::InvalidHex { .. })));
    assert!(matches!(decode_hex("é"), Err(Error::InvalidHex { .. })));

    match decode_hex("00zz") {
      Err(Error::InvalidHex { reason }) => assert!(reason.contains('z')),
      r => panic!("unexpected result: {:?}", r),
    }
  }

  #[test]
  fn write_hex_mutates_only_its_range() {
    let mut rom = RomImage::from_bytes(vec![0; 8]);
    assert_eq!(write_hex(&mut rom, 2, "aabb").unwrap(), 2);
    assert_eq!(rom.as_bytes(), &[0, 0, 0xaa, 0xbb, 0, 0, 0, 0]);
    assert_eq!(read_hex(&rom, 1, 3).unwrap(), "00aabb");
  }

  #[test]
  fn write_hex_bounds() {
    let mut rom = RomImage::from_bytes(vec![0; 4]);
    assert!(matches!(
      write_hex(&mut rom, 3, "0102"),
      Err(Error::OutOfBounds {
        offset: 3,
        len: 2,
        rom_len: 4
      })
    ));
    assert!(matches!(
      write_hex(&mut rom, 0, "0"),
      Err(Error::InvalidHex { .. })
    ));
    assert_eq!(rom.as_bytes(), &[0; 4]);
    assert!(matches!(read_hex(&rom, 2, 4), Err(Error::TruncatedRom { .. })));
  }

  #[test]
  fn size_checking() {
    let hex = "00".repeat(0x20);
    assert!(check_size(AssetKind::TeamLogoPalette, &hex).is_ok());
    assert!(matches!(
      check_size(AssetKind::HomeVisitorPalette, &hex),
      Err(Error::AssetSizeMismatch {
        expected: 0x40,
        actual: 0x20,
        ..
      })
    ));
  }

  #[test]
  fn files() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(read_file(dir.path(), AssetKind::Banner).unwrap(), None);
    write_file(dir.path(), AssetKind::Banner, "c0ffee").unwrap();
    assert_eq!(
      read_file(dir.path(), AssetKind::Banner).unwrap().as_deref(),
      Some("c0ffee")
    );
    assert!(dir.path().join("Banner.txt").is_file());
  }
}
