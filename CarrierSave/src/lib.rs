//! # CarrierSave
//!
//! A pure-Rust library for reading, editing and writing Carrier Command 2
//! save files.
//!
//! A save is several XML documents concatenated into one file. CarrierSave
//! splits them apart with a streaming reader, keeps each one as an editable
//! tree, and exposes typed views over the game objects inside: islands
//! (tiles), teams, vehicles with their attachments, and the per-vehicle
//! runtime state that lives in a separate root.
//!
//! ## Quick Start
//!
//! ### Inspecting a Save
//!
//! ```no_run
//! use carriersave::prelude::*;
//!
//! let save = SaveGame::load("save.xml", &LoadOptions::default())?;
//! for tile in save.tiles() {
//!     println!("tile {} owned by team {}", tile.id(&save.scene), tile.team_control(&save.scene));
//! }
//! # Ok::<(), carriersave::Error>(())
//! ```
//!
//! ### Editing
//!
//! Edits go through [`SaveGame`](save::SaveGame) so that the vehicle and
//! state roots stay paired and ids stay dense:
//!
//! ```no_run
//! use carriersave::prelude::*;
//! use glam::DVec3;
//!
//! let mut save = SaveGame::load("save.xml", &LoadOptions::default())?;
//! let bear = save.new_vehicle(VehicleType::Bear)?;
//! let id = bear.id(&save.vehicles);
//! save.move_vehicle(id, DVec3::new(1200.0, 20.0, -300.0))?;
//! save.set_attachment(id, 1, Some(AttachmentKind::Gun120mm))?;
//! save.save("save.xml", &ExportOptions::default())?;
//! # Ok::<(), carriersave::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `carriersave` command-line binary

pub mod error;
pub mod overlay;
pub mod rules;
pub mod save;
pub mod slots;
pub mod xml;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, Result};

    // Save model
    pub use crate::save::{
        Attachment, ExportOptions, LoadOptions, RootKind, SaveGame, SaveSummary, StateLayout,
        Team, Tile, Vehicle, VehicleSpawn, VehicleState,
    };

    // Game rules
    pub use crate::rules::{
        AttachmentKind, IslandKind, VehicleType, attachment_capacity, slot_layout,
        validate_attachment,
    };

    // Typed overlay
    pub use crate::overlay::{Field, Overlay, Positioned};

    // Raw trees
    pub use crate::xml::{MultiRootParser, XmlTree};

    // Save slots
    pub use crate::slots::{SaveSlot, game_data_dir, read_save_slots};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
