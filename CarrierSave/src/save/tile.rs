//! Tiles (islands)

use glam::DVec3;
use rand::Rng;

use super::spawn::{SpawnData, SpawnList};
use crate::error::Result;
use crate::overlay::geometry::read_point;
use crate::overlay::{Bounds, Field, Overlay, Point, Positioned, WorldPosition};
use crate::rules::IslandKind;
use crate::xml::{NodeId, XmlTree};
use crate::{fields, overlay};

/// Largest value of an unsigned 32-bit game counter; marks "never" in timers.
pub const MAX_INTEGER: i64 = 4_294_967_295;

pub const MIN_TILE_SEED: i64 = 10_000;
pub const MAX_TILE_SEED: i64 = 200_000;

pub const BIOME_GREEN_PINES: i64 = 0;
pub const BIOME_SNOW_PINES: i64 = 1;
pub const BIOME_SANDY_PINES: i64 = 3;
pub const BIOME_DARK_MESAS: i64 = 7;

/// Altitude of the sea floor; new islands start there.
pub const POS_Y_SEABOTTOM: f64 = -1.0;

/// Radius given to new islands.
pub const DEFAULT_ISLAND_RADIUS: f64 = 2500.0;
/// Radius changes at or below this are ignored.
pub const MIN_ISLAND_RADIUS: f64 = 2000.0;
pub const MAX_ISLAND_RADIUS: f64 = 7000.0;

// ==================== Facility ====================

const CATEGORY: Field<i64> = Field::new("category", 1);
const FITTING: Field<i64> = Field::new("fitting", 60);
const PRODUCTION_TIMER: Field<i64> = Field::new("production_timer", MAX_INTEGER);
const PRODUCTION_TIMER_DEFENSE: Field<i64> = Field::new("production_timer_defense", MAX_INTEGER);

fn facility_defaults(facility: Facility, tree: &mut XmlTree) {
    facility.set_category(tree, rand::thread_rng().gen_range(1..=7));
    facility.set_fitting(tree, 60);
}

overlay!(
    /// Production facility of an island.
    Facility = "facility", defaults: facility_defaults
);

impl Facility {
    fields! {
        /// Facility category, see [`IslandKind`].
        category / set_category: i64 = CATEGORY;
        fitting / set_fitting: i64 = FITTING;
        production_timer / set_production_timer: i64 = PRODUCTION_TIMER;
        production_timer_defense / set_production_timer_defense: i64 = PRODUCTION_TIMER_DEFENSE;
    }
}

// ==================== Tile ====================

const ID: Field<i64> = Field::new("id", 0);
const INDEX: Field<i64> = Field::new("index", 1);
const SEED: Field<i64> = Field::new("seed", 12_000);
const BIOME_TYPE: Field<i64> = Field::new("biome_type", 0);
const TEAM_CAPTURE: Field<i64> = Field::new("team_capture", MAX_INTEGER);
const TEAM_CAPTURE_PROGRESS: Field<f64> = Field::new("team_capture_progress", 0.0);
const DIFFICULTY_FACTOR: Field<f64> = Field::new("difficulty_factor", 0.0);
const TEAM_CONTROL: Field<i64> = Field::new("team_control", 0).with_side_effect(sync_spawn_team);

/// Automatic respawns follow island ownership.
fn sync_spawn_team(tree: &mut XmlTree, node: NodeId) {
    let tile = Tile::wrap(node);
    let team = tile.team_control(tree);
    tile.spawn_data(tree).set_team_id(tree, team);
}

fn tile_defaults(tile: Tile, tree: &mut XmlTree) {
    let mut rng = rand::thread_rng();
    tile.set_seed(tree, rng.gen_range(MIN_TILE_SEED..=MAX_TILE_SEED));
    tile.set_biome_type(tree, rng.gen_range(1..=7));
    tile.set_team_capture_progress(tree, 0.0);
    tile.set_team_control(tree, 0);
    tile.set_difficulty_factor(tree, 0.0);
    tile.bounds(tree);
    tile.facility(tree);
    tile.world_position(tree);
    tile.spawn_data(tree);
}

overlay!(
    /// An island. Every tile has one bounds, facility, world position and
    /// spawn data block, created on first access.
    Tile = "t", defaults: tile_defaults
);

impl Tile {
    fields! {
        /// 1-based id, dense across the save.
        id / set_id: i64 = ID;
        /// 0-based index, always `id - 1`.
        index / set_index: i64 = INDEX;
        seed / set_seed: i64 = SEED;
        biome_type / set_biome_type: i64 = BIOME_TYPE;
        team_capture / set_team_capture: i64 = TEAM_CAPTURE;
        team_capture_progress / set_team_capture_progress: f64 = TEAM_CAPTURE_PROGRESS;
        difficulty_factor / set_difficulty_factor: f64 = DIFFICULTY_FACTOR;
        /// Controlling team. Writing it also retargets the island's spawns.
        team_control / set_team_control: i64 = TEAM_CONTROL;
    }

    pub fn bounds(&self, tree: &mut XmlTree) -> Bounds {
        self.child(tree)
    }

    pub fn facility(&self, tree: &mut XmlTree) -> Facility {
        self.child(tree)
    }

    pub fn world_position(&self, tree: &mut XmlTree) -> WorldPosition {
        self.child(tree)
    }

    pub fn spawn_data(&self, tree: &mut XmlTree) -> SpawnData {
        self.child(tree)
    }

    pub fn spawn_list(&self, tree: &mut XmlTree) -> SpawnList {
        self.spawn_data(tree).vehicles(tree)
    }

    /// Island radius, read from the upper bound's `x`.
    #[must_use]
    pub fn island_radius(&self, tree: &XmlTree) -> f64 {
        self.find_child::<Bounds>(tree)
            .map_or(0.0, |bounds| bounds.extent(tree).1.x)
    }

    /// Resize the island symmetrically around its centre.
    ///
    /// Radii at or below [`MIN_ISLAND_RADIUS`] are ignored and values above
    /// [`MAX_ISLAND_RADIUS`] are clamped. Returns the radius applied, if any.
    pub fn set_island_radius(&self, tree: &mut XmlTree, radius: f64) -> Option<f64> {
        let radius = radius.trunc();
        if radius <= MIN_ISLAND_RADIUS {
            return None;
        }
        let radius = radius.min(MAX_ISLAND_RADIUS);
        let bounds = self.bounds(tree);
        let min = bounds.min(tree);
        let max = bounds.max(tree);
        let (lower, upper) = bounds.extent(tree);
        min.set(tree, DVec3::new(-radius, lower.y, -radius));
        max.set(tree, DVec3::new(radius, upper.y, radius));
        Some(radius)
    }

    /// Facility category decoded as an island kind.
    ///
    /// # Errors
    /// Returns an error if the category is not a known kind.
    pub fn island_kind(&self, tree: &XmlTree) -> Result<IslandKind> {
        let category = self
            .find_child::<Facility>(tree)
            .map_or(CATEGORY.default_value(), |facility| facility.category(tree));
        IslandKind::from_index(category)
    }

    pub fn set_island_kind(&self, tree: &mut XmlTree, kind: IslandKind) {
        self.facility(tree).set_category(tree, kind.index());
    }
}

impl Positioned for Tile {
    fn location(&self, tree: &XmlTree) -> DVec3 {
        read_point::<WorldPosition>(*self, tree)
    }

    /// Moves the island and every spawn template anchored to it.
    fn move_to(&self, tree: &mut XmlTree, target: DVec3) {
        let delta = target - self.location(tree);
        self.world_position(tree).set(tree, target);
        let spawns = self.spawn_data(tree).items(tree);
        for spawn in spawns {
            spawn.translate(tree, delta);
        }
    }
}
