//! The save game entity graph
//!
//! A save file is five independent XML documents glued back to back. Each is
//! parsed into its own [`XmlTree`] and kept on [`SaveGame`] in canonical order:
//!
//! | root             | entities                                   |
//! |------------------|--------------------------------------------|
//! | `meta`           | untouched                                  |
//! | `scene`          | tiles (`tiles/tiles/t`), teams (`teams/teams/t`) and the vehicle id counter |
//! | `vehicles`       | live vehicles (`vehicles/v`)               |
//! | `vehicle_states` | per-vehicle state (`vehicle_states/v`)     |
//! | `missiles`       | untouched, often absent                    |
//!
//! Entities are [`Overlay`](crate::overlay::Overlay) views and must be used
//! with the tree of the root they live in (`save.scene` for a [`Tile`],
//! `save.vehicles` for a [`Vehicle`] and so on). Operations that keep several
//! roots consistent live on [`SaveGame`] itself.

mod graph;
mod io;
pub mod spawn;
pub mod state;
pub mod summary;
pub mod team;
pub mod tile;
pub mod vehicle;

pub use spawn::{SpawnAttachment, SpawnData, SpawnList, SpawnVehicleData, VehicleSpawn};
pub use state::{
    AttachmentData, AttachmentState, AttachmentStates, Inventory, VehicleData, VehicleState,
    Waypoint, Waypoints,
};
pub use summary::{
    AttachmentSummary, SaveSummary, SpawnSummary, TeamSummary, TileSummary, VehicleSummary,
};
pub use team::Team;
pub use tile::{Facility, Tile};
pub use vehicle::{Attachment, Attachments, Vehicle};

use crate::error::{Error, Result};
use crate::overlay::{Field, Overlay};
use crate::xml::{DEFAULT_CHUNK_SIZE, NodeId, XmlTree};

/// One of the concatenated documents of a save file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootKind {
    Meta,
    Scene,
    Vehicles,
    VehicleStates,
    Missiles,
}

impl RootKind {
    /// Every root in the order it is stored.
    pub const ALL: [RootKind; 5] = [
        RootKind::Meta,
        RootKind::Scene,
        RootKind::Vehicles,
        RootKind::VehicleStates,
        RootKind::Missiles,
    ];

    /// Root element tag.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            RootKind::Meta => "meta",
            RootKind::Scene => "scene",
            RootKind::Vehicles => "vehicles",
            RootKind::VehicleStates => "vehicle_states",
            RootKind::Missiles => "missiles",
        }
    }
}

/// Options for loading a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Bytes handed to the XML reader per fill.
    pub chunk_size: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Options for exporting a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    /// Tiles past this count are removed before writing; the game refuses
    /// saves with more islands.
    pub tile_limit: usize,
}

/// Island limit of the game.
pub const DEFAULT_TILE_LIMIT: usize = 63;

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            tile_limit: DEFAULT_TILE_LIMIT,
        }
    }
}

/// Where a save keeps its vehicle state list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StateLayout {
    /// `vehicle_states/vehicle_states`, a root of its own.
    #[default]
    Separate,
    /// `vehicles/vehicle_states`, the child at `position` of the vehicles root.
    /// While loaded the list is held in [`SaveGame::vehicle_states`] and it is
    /// put back in place on export.
    Nested { position: usize },
}

const ID_COUNTER: Field<i64> = Field::new("id_counter", 0);

/// A loaded save game.
#[derive(Debug, Clone, Default)]
pub struct SaveGame {
    pub meta: XmlTree,
    pub scene: XmlTree,
    pub vehicles: XmlTree,
    pub vehicle_states: XmlTree,
    pub missiles: XmlTree,
    /// Layout the vehicle states were loaded from.
    pub state_layout: StateLayout,
}

impl SaveGame {
    /// Save with every root empty.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn root(&self, kind: RootKind) -> &XmlTree {
        match kind {
            RootKind::Meta => &self.meta,
            RootKind::Scene => &self.scene,
            RootKind::Vehicles => &self.vehicles,
            RootKind::VehicleStates => &self.vehicle_states,
            RootKind::Missiles => &self.missiles,
        }
    }

    pub fn root_mut(&mut self, kind: RootKind) -> &mut XmlTree {
        match kind {
            RootKind::Meta => &mut self.meta,
            RootKind::Scene => &mut self.scene,
            RootKind::Vehicles => &mut self.vehicles,
            RootKind::VehicleStates => &mut self.vehicle_states,
            RootKind::Missiles => &mut self.missiles,
        }
    }

    // ==================== Containers ====================

    /// `scene/tiles`, holder of the tile id counter.
    fn tiles_parent(&mut self) -> NodeId {
        let root = self.scene.ensure_root(RootKind::Scene.tag());
        self.scene.ensure_path(root, &["tiles"])
    }

    fn tiles_container(&mut self) -> NodeId {
        let root = self.scene.ensure_root(RootKind::Scene.tag());
        self.scene.ensure_path(root, &["tiles", "tiles"])
    }

    /// `scene/vehicles`, holder of the vehicle id counter.
    fn scene_vehicles(&mut self) -> NodeId {
        let root = self.scene.ensure_root(RootKind::Scene.tag());
        self.scene.ensure_path(root, &["vehicles"])
    }

    fn vehicles_container(&mut self) -> NodeId {
        let root = self.vehicles.ensure_root(RootKind::Vehicles.tag());
        self.vehicles.ensure_path(root, &["vehicles"])
    }

    fn vehicle_states_container(&mut self) -> NodeId {
        let root = self.vehicle_states.ensure_root(RootKind::VehicleStates.tag());
        self.vehicle_states.ensure_path(root, &["vehicle_states"])
    }

    /// Stored tile counter, 0 when absent.
    #[must_use]
    pub fn tile_id_counter(&self) -> i64 {
        find(&self.scene, &["tiles"]).map_or(0, |node| ID_COUNTER.get(&self.scene, node))
    }

    /// Stored vehicle counter, 0 when absent.
    #[must_use]
    pub fn vehicle_id_counter(&self) -> i64 {
        find(&self.scene, &["vehicles"]).map_or(0, |node| ID_COUNTER.get(&self.scene, node))
    }

    fn set_tile_id_counter(&mut self, value: i64) {
        let parent = self.tiles_parent();
        ID_COUNTER.set(&mut self.scene, parent, value);
    }

    fn set_vehicle_id_counter(&mut self, value: i64) {
        let parent = self.scene_vehicles();
        ID_COUNTER.set(&mut self.scene, parent, value);
    }

    // ==================== Lookups ====================

    /// Tiles in document order. Use with `self.scene`.
    #[must_use]
    pub fn tiles(&self) -> Vec<Tile> {
        list(&self.scene, &["tiles", "tiles"])
    }

    /// # Errors
    /// Returns [`Error::TileNotFound`] if no tile has `id`.
    pub fn tile(&self, id: i64) -> Result<Tile> {
        self.tiles()
            .into_iter()
            .find(|tile| tile.id(&self.scene) == id)
            .ok_or(Error::TileNotFound(id))
    }

    /// Teams in document order. Use with `self.scene`.
    #[must_use]
    pub fn teams(&self) -> Vec<Team> {
        list(&self.scene, &["teams", "teams"])
    }

    /// # Errors
    /// Returns [`Error::TeamNotFound`] if no team has `id`.
    pub fn team(&self, id: i64) -> Result<Team> {
        self.teams()
            .into_iter()
            .find(|team| team.id(&self.scene) == id)
            .ok_or(Error::TeamNotFound(id))
    }

    /// Live vehicles in document order. Use with `self.vehicles`.
    #[must_use]
    pub fn vehicles(&self) -> Vec<Vehicle> {
        list(&self.vehicles, &["vehicles"])
    }

    /// # Errors
    /// Returns [`Error::VehicleNotFound`] if no vehicle has `id`.
    pub fn vehicle(&self, id: i64) -> Result<Vehicle> {
        self.vehicles()
            .into_iter()
            .find(|vehicle| vehicle.id(&self.vehicles) == id)
            .ok_or(Error::VehicleNotFound(id))
    }

    /// Vehicle states in document order. Use with `self.vehicle_states`.
    #[must_use]
    pub fn vehicle_states(&self) -> Vec<VehicleState> {
        list(&self.vehicle_states, &["vehicle_states"])
    }

    /// State paired with vehicle `id`.
    ///
    /// # Errors
    /// Returns [`Error::VehicleStateNotFound`] if there is none.
    pub fn vehicle_state(&self, id: i64) -> Result<VehicleState> {
        self.vehicle_states()
            .into_iter()
            .find(|state| state.id(&self.vehicle_states) == id)
            .ok_or(Error::VehicleStateNotFound(id))
    }
}

fn find(tree: &XmlTree, path: &[&str]) -> Option<NodeId> {
    tree.root().and_then(|root| tree.find_path(root, path))
}

fn list<O: Overlay>(tree: &XmlTree, path: &[&str]) -> Vec<O> {
    find(tree, path).map_or_else(Vec::new, |parent| {
        tree.children_by_tag(parent, O::TAG).map(O::wrap).collect()
    })
}
