//! teamart, an image asset extractor and importer for 16-bit hockey
//! cartridge images.

#![deny(unsafe_code)]

use std::io;
use std::path::Path;
use std::path::PathBuf;

use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

use teamart::config::Config;
use teamart::error::Action;
use teamart::error::Errors;
use teamart::error::Result;
use teamart::import;
use teamart::pointer;
use teamart::roster;
use teamart::rom::RomVariant;
use teamart::session::Session;

#[derive(StructOpt)]
#[structopt(
  name = "teamart",
  about = "Extracts and imports team logos, banners and palettes."
)]
struct Opts {
  /// Print offsets and decoded names as they are computed.
  #[structopt(short, long)]
  verbose: bool,
  /// A json5 file with default settings.
  #[structopt(short, long)]
  config: Option<PathBuf>,
  #[structopt(subcommand)]
  command: Command,
}

#[derive(StructOpt)]
struct LayoutOpts {
  /// Number of active teams in the image (1 to 32).
  #[structopt(short, long)]
  teams: Option<usize>,
  /// Image layout: 30 or 32.
  #[structopt(long)]
  variant: Option<RomVariant>,
}

#[derive(StructOpt)]
enum Command {
  /// Writes every team's assets to <out>/<rom name>/<team abbreviation>/.
  Extract {
    /// The cartridge image.
    rom: PathBuf,
    #[structopt(flatten)]
    layout: LayoutOpts,
    /// Where to create the per-image folder.
    #[structopt(short, long)]
    out: Option<PathBuf>,
  },
  /// Patches asset files from <import root>/<team abbreviation>/ into a copy
  /// of the image and saves it.
  Import {
    /// The cartridge image. It is never modified.
    rom: PathBuf,
    #[structopt(flatten)]
    layout: LayoutOpts,
    /// Where to look for team folders.
    #[structopt(short, long)]
    import_root: Option<PathBuf>,
    /// Where to save the patched image.
    #[structopt(short, long)]
    save: PathBuf,
    /// Skip asset files whose size does not match their asset kind.
    #[structopt(long)]
    strict_sizes: bool,
  },
  /// Prints each team's record and asset offsets.
  Inspect {
    /// The cartridge image.
    rom: PathBuf,
    #[structopt(flatten)]
    layout: LayoutOpts,
    /// Also decode rosters.
    #[structopt(long)]
    roster: bool,
    /// Also hexdump the head of each team block.
    #[structopt(long)]
    dump: bool,
  },
}

impl LayoutOpts {
  fn apply(&self, config: &mut Config) {
    if let Some(teams) = self.teams {
      config.team_count = teams;
    }
    if let Some(variant) = self.variant {
      config.variant = variant;
    }
  }
}

fn main() {
  let opts = Opts::from_args();

  let default_level = if opts.verbose { "debug" } else { "info" };
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level)),
    )
    .with_writer(io::stderr)
    .init();

  if let Err((action, e)) = run(opts) {
    let mut errors = Errors::new();
    errors.push(action, e);
    errors.dump_and_die(1);
  }
}

type Failure = (Action, teamart::error::Error);

fn run(opts: Opts) -> std::result::Result<(), Failure> {
  let mut config = match &opts.config {
    Some(path) => Config::from_file(path).map_err(|e| (Action::Loading, e))?,
    None => Config::default(),
  };

  match opts.command {
    Command::Extract { rom, layout, out } => {
      layout.apply(&mut config);
      if let Some(out) = out {
        config.output_root = out;
      }
      let session = load(&rom, &config).map_err(|e| (Action::Loading, e))?;
      let out_root = config.output_root.join(session.base_name());
      let report = session
        .extract(&out_root)
        .map_err(|e| (Action::Extracting, e))?;
      println!("{}", report);
    }
    Command::Import {
      rom,
      layout,
      import_root,
      save,
      strict_sizes,
    } => {
      layout.apply(&mut config);
      if let Some(root) = import_root {
        config.import_root = root;
      }
      config.strict_sizes |= strict_sizes;

      let mut session = load(&rom, &config).map_err(|e| (Action::Loading, e))?;
      let options = import::Options {
        strict_sizes: config.strict_sizes,
      };
      let report = session
        .import(&config.import_root, options)
        .map_err(|e| (Action::Importing, e))?;
      print!("{}", report);
      if !report.warnings.is_ok() {
        let _ = report.warnings.dump_to(io::stderr());
        tracing::warn!("{} asset files were skipped", report.warnings.len());
      }

      let saved = session.save(&save).map_err(|e| (Action::Saving, e))?;
      println!("ROM successfully saved to {}.", saved.display());
    }
    Command::Inspect {
      rom,
      layout,
      roster,
      dump,
    } => {
      layout.apply(&mut config);
      let session = load(&rom, &config).map_err(|e| (Action::Loading, e))?;
      inspect(&session, roster, dump).map_err(|e| (Action::Loading, e))?;
    }
  }

  Ok(())
}

fn load(rom: &Path, config: &Config) -> Result<Session> {
  config.validate()?;
  Session::load(rom, config.variant, config.team_count)
}

fn inspect(session: &Session, with_roster: bool, dump: bool) -> Result<()> {
  println!(
    "{} teams, {} layout, pointer table at 0x{:06x}",
    session.team_count(),
    session.variant(),
    pointer::TABLE_START
  );

  for slot in session.teams() {
    let record = slot.decode(session.rom())?;
    println!();
    println!(
      "{:2}: {} {} ({}) at {}",
      slot.index, record.city, record.nickname, record.abbreviation, slot.pointer
    );
    if !record.arena.is_empty() {
      println!("    arena: {}", record.arena);
    }
    println!(
      "    players: 0x{:04x} bytes at +0x{:04x}",
      record.player_data_size, record.player_data_offset
    );
    let offsets = &slot.offsets;
    println!("    rink logo:            0x{:06x}", offsets.rink_logo);
    println!("    team logo:            0x{:06x}", offsets.team_logo);
    println!("    team logo palette:    0x{:06x}", offsets.team_logo_palette);
    println!("    banner:               0x{:06x}", offsets.banner);
    println!("    home/visitor palette: 0x{:06x}", offsets.home_visitor_palette);

    if with_roster {
      for player in roster::decode(session.rom(), slot.pointer, &record)? {
        println!(
          "    {} #{:>2} {}",
          player.position,
          player.jersey_number(),
          player.name
        );
      }
    }

    if dump {
      // Header and both palettes.
      let _ = session.rom().dump(slot.pointer.offset(), 0x50, io::stdout());
    }
  }

  Ok(())
}
