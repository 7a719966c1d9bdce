use anyhow::Context;
use clap::{Args, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;

use crate::cli::progress::simple_spinner;
use crate::rules::{AttachmentKind, VehicleType};
use crate::save::{DEFAULT_TILE_LIMIT, LoadOptions, SaveGame};
use crate::slots::expand_path;
use crate::xml::DEFAULT_CHUNK_SIZE;

pub mod edit;
pub mod inspect;

/// Save file to operate on
#[derive(Args, Debug, Clone)]
pub struct SaveArgs {
    /// Path to save.xml (`~` is expanded)
    pub save: String,

    /// Bytes handed to the XML reader per fill
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,
}

impl SaveArgs {
    #[must_use]
    pub fn path(&self) -> PathBuf {
        expand_path(&self.save)
    }

    /// Load the save with a spinner.
    pub fn load(&self) -> anyhow::Result<SaveGame> {
        let path = self.path();
        let spinner = simple_spinner(&format!("Reading {}", path.display()));
        let options = LoadOptions {
            chunk_size: self.chunk_size,
        };
        let result = SaveGame::load(&path, &options)
            .with_context(|| format!("failed to load {}", path.display()));
        spinner.finish_and_clear();
        result
    }
}

/// Where and how an edited save is written
#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Write to this file instead of back to the input
    #[arg(short, long)]
    pub output: Option<String>,

    /// Islands past this count are dropped on export
    #[arg(long, default_value_t = DEFAULT_TILE_LIMIT)]
    pub tile_limit: usize,
}

/// Attachment argument: a kind name, a definition index, or `none`
#[derive(Debug, Clone, Copy)]
pub struct AttachmentArg(pub Option<AttachmentKind>);

impl FromStr for AttachmentArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("none") || s == "0" {
            return Ok(AttachmentArg(None));
        }
        let kind = match s.parse::<i64>() {
            Ok(index) => AttachmentKind::from_index(index),
            Err(_) => AttachmentKind::from_name(s),
        };
        kind.map(|kind| AttachmentArg(Some(kind)))
            .map_err(|e| e.to_string())
    }
}

/// Vehicle type argument: a type name or a definition index
#[derive(Debug, Clone, Copy)]
pub struct VehicleTypeArg(pub VehicleType);

impl FromStr for VehicleTypeArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let vehicle = match s.parse::<i64>() {
            Ok(index) => VehicleType::from_index(index),
            Err(_) => VehicleType::from_name(s),
        };
        vehicle.map(VehicleTypeArg).map_err(|e| e.to_string())
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summarize a save
    Info {
        #[command(flatten)]
        save: SaveArgs,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List islands
    Tiles {
        #[command(flatten)]
        save: SaveArgs,

        #[arg(long)]
        json: bool,
    },

    /// List vehicles
    Vehicles {
        #[command(flatten)]
        save: SaveArgs,

        /// Only vehicles of this type
        #[arg(long = "type")]
        vehicle_type: Option<VehicleTypeArg>,

        #[arg(long)]
        json: bool,
    },

    /// List teams
    Teams {
        #[command(flatten)]
        save: SaveArgs,

        #[arg(long)]
        json: bool,
    },

    /// List island spawn templates
    Spawns {
        #[command(flatten)]
        save: SaveArgs,

        #[arg(long)]
        json: bool,
    },

    /// List the game's save slots
    Slots {
        /// Game data directory (defaults to the platform location)
        #[arg(long)]
        dir: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Show the attachment slots of a vehicle type
    Rules {
        /// Vehicle type name or definition index
        vehicle_type: VehicleTypeArg,

        #[arg(long)]
        json: bool,
    },

    /// Add an island
    AddTile {
        #[command(flatten)]
        save: SaveArgs,

        #[command(flatten)]
        output: OutputArgs,

        /// East coordinate
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        x: f64,

        /// North coordinate
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        z: f64,

        /// Island radius
        #[arg(long)]
        radius: Option<f64>,
    },

    /// Move an island and its spawns
    MoveTile {
        #[command(flatten)]
        save: SaveArgs,

        #[command(flatten)]
        output: OutputArgs,

        /// Tile id
        id: i64,

        #[arg(allow_hyphen_values = true)]
        x: f64,

        #[arg(allow_hyphen_values = true)]
        z: f64,
    },

    /// Remove an island and renumber the rest
    RemoveTile {
        #[command(flatten)]
        save: SaveArgs,

        #[command(flatten)]
        output: OutputArgs,

        /// Tile id
        id: i64,
    },

    /// Add a vehicle
    AddVehicle {
        #[command(flatten)]
        save: SaveArgs,

        #[command(flatten)]
        output: OutputArgs,

        /// Vehicle type name or definition index
        vehicle_type: VehicleTypeArg,

        /// Owning team
        #[arg(long)]
        team: Option<i64>,

        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        x: f64,

        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        z: f64,
    },

    /// Move a vehicle with its bodies and attachments
    MoveVehicle {
        #[command(flatten)]
        save: SaveArgs,

        #[command(flatten)]
        output: OutputArgs,

        /// Vehicle id
        id: i64,

        #[arg(allow_hyphen_values = true)]
        x: f64,

        /// Altitude
        #[arg(allow_hyphen_values = true)]
        y: f64,

        #[arg(allow_hyphen_values = true)]
        z: f64,
    },

    /// Remove a vehicle and its state
    RemoveVehicle {
        #[command(flatten)]
        save: SaveArgs,

        #[command(flatten)]
        output: OutputArgs,

        /// Vehicle id
        id: i64,
    },

    /// Fit or clear an attachment slot
    SetAttachment {
        #[command(flatten)]
        save: SaveArgs,

        #[command(flatten)]
        output: OutputArgs,

        /// Vehicle id
        id: i64,

        /// Slot name (e.g. turret, wing0) or position
        slot: String,

        /// Attachment kind name or index, or `none`
        attachment: AttachmentArg,
    },

    /// Hand a vehicle to a team
    SetTeam {
        #[command(flatten)]
        save: SaveArgs,

        #[command(flatten)]
        output: OutputArgs,

        /// Vehicle id
        id: i64,

        /// Team id
        team: i64,
    },

    /// Load and re-export a save unchanged
    Roundtrip {
        #[command(flatten)]
        save: SaveArgs,

        #[command(flatten)]
        output: OutputArgs,
    },
}

impl Commands {
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            Commands::Info { save, json } => inspect::info(save, *json),
            Commands::Tiles { save, json } => inspect::tiles(save, *json),
            Commands::Vehicles {
                save,
                vehicle_type,
                json,
            } => inspect::vehicles(save, vehicle_type.map(|arg| arg.0), *json),
            Commands::Teams { save, json } => inspect::teams(save, *json),
            Commands::Spawns { save, json } => inspect::spawns(save, *json),
            Commands::Slots { dir, json } => inspect::slots(dir.as_deref(), *json),
            Commands::Rules { vehicle_type, json } => inspect::rules(vehicle_type.0, *json),
            Commands::AddTile {
                save,
                output,
                x,
                z,
                radius,
            } => edit::add_tile(save, output, *x, *z, *radius),
            Commands::MoveTile {
                save,
                output,
                id,
                x,
                z,
            } => edit::move_tile(save, output, *id, *x, *z),
            Commands::RemoveTile { save, output, id } => edit::remove_tile(save, output, *id),
            Commands::AddVehicle {
                save,
                output,
                vehicle_type,
                team,
                x,
                z,
            } => edit::add_vehicle(save, output, vehicle_type.0, *team, *x, *z),
            Commands::MoveVehicle {
                save,
                output,
                id,
                x,
                y,
                z,
            } => edit::move_vehicle(save, output, *id, glam::DVec3::new(*x, *y, *z)),
            Commands::RemoveVehicle { save, output, id } => {
                edit::remove_vehicle(save, output, *id)
            }
            Commands::SetAttachment {
                save,
                output,
                id,
                slot,
                attachment,
            } => edit::set_attachment(save, output, *id, slot, attachment.0),
            Commands::SetTeam {
                save,
                output,
                id,
                team,
            } => edit::set_team(save, output, *id, *team),
            Commands::Roundtrip { save, output } => edit::roundtrip(save, output),
        }
    }
}
