//! teamart, an image asset extractor and importer for 16-bit hockey
//! cartridge images.
//!
//! A cartridge keeps, for every team, a handful of fixed-size graphics
//! (logos, a banner, palettes). This crate finds them through the team
//! pointer table and the known layout tables, dumps them to per-team
//! folders of hex text files, and patches edited files back into a copy of
//! the image.

#![deny(missing_docs)]
#![deny(unused)]
#![deny(warnings)]
#![deny(unsafe_code)]

pub mod asset;
pub mod config;
pub mod error;
pub mod extract;
pub mod import;
pub mod layout;
pub mod pointer;
pub mod rom;
pub mod roster;
pub mod session;
pub mod team;

#[cfg(test)]
#[allow(missing_docs)]
mod testing;
