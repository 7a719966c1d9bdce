//! Vehicle spawn templates
//!
//! A tile's `spawn_data/vehicles/v` entries describe units the island will
//! create automatically. They are templates, not live vehicles, and use their
//! own id space (`respawn_id`).

use glam::DVec3;

use crate::overlay::geometry::read_point;
use crate::overlay::{Field, Overlay, Point, Positioned, WorldPosition};
use crate::rules::{AttachmentKind, spawn_attachment_type};
use crate::xml::{NodeId, XmlTree};
use crate::{fields, overlay};

const TEAM_ID: Field<i64> = Field::new("team_id", 0);
const IS_SET: Field<bool> = Field::new("is_set", false);

fn spawn_data_defaults(data: SpawnData, tree: &mut XmlTree) {
    data.set_is_set(tree, true);
}

overlay!(
    /// Automatic respawn configuration of a tile.
    SpawnData = "spawn_data", defaults: spawn_data_defaults
);

impl SpawnData {
    fields! {
        /// Team the island spawns units for.
        team_id / set_team_id: i64 = TEAM_ID;
        is_set / set_is_set: bool = IS_SET;
    }

    pub fn vehicles(&self, tree: &mut XmlTree) -> SpawnList {
        self.child(tree)
    }

    /// Spawn templates, empty when the list is absent.
    #[must_use]
    pub fn items(&self, tree: &XmlTree) -> Vec<VehicleSpawn> {
        self.find_child::<SpawnList>(tree)
            .map(|list| list.items(tree))
            .unwrap_or_default()
    }
}

overlay!(
    /// List of spawn templates.
    SpawnList = "vehicles"
);

impl SpawnList {
    #[must_use]
    pub fn items(&self, tree: &XmlTree) -> Vec<VehicleSpawn> {
        self.children_of(tree)
    }

    /// Remove every template with `respawn_id`. Returns whether any was removed.
    pub fn remove(&self, tree: &mut XmlTree, respawn_id: i64) -> bool {
        let mut removed = false;
        for spawn in self.items(tree) {
            if spawn.respawn_id(tree) == respawn_id {
                tree.detach(spawn.node());
                removed = true;
            }
        }
        removed
    }

    pub fn append(&self, tree: &mut XmlTree, spawn: VehicleSpawn) {
        tree.append_child(self.node(), spawn.node());
    }
}

const SPAWN_TYPE: Field<i64> = Field::new("spawn_type", 0);

overlay!(
    /// One spawn template.
    VehicleSpawn = "v"
);

impl VehicleSpawn {
    fields! {
        spawn_type / set_spawn_type: i64 = SPAWN_TYPE;
    }

    pub fn data(&self, tree: &mut XmlTree) -> SpawnVehicleData {
        self.child(tree)
    }

    /// Respawn id, 0 when the template has no data yet.
    #[must_use]
    pub fn respawn_id(&self, tree: &XmlTree) -> i64 {
        self.find_child::<SpawnVehicleData>(tree)
            .map_or(0, |data| data.respawn_id(tree))
    }

    #[must_use]
    pub fn definition_index(&self, tree: &XmlTree) -> i64 {
        self.find_child::<SpawnVehicleData>(tree)
            .map_or(0, |data| data.definition_index(tree))
    }
}

impl Positioned for VehicleSpawn {
    fn location(&self, tree: &XmlTree) -> DVec3 {
        self.find_child::<SpawnVehicleData>(tree)
            .map_or(DVec3::ZERO, |data| read_point::<WorldPosition>(data, tree))
    }

    fn move_to(&self, tree: &mut XmlTree, target: DVec3) {
        let data = self.data(tree);
        data.world_position(tree).set(tree, target);
    }
}

const RESPAWN_ID: Field<i64> = Field::new("respawn_id", 0);
const DEFINITION_INDEX: Field<i64> = Field::new("definition_index", 0);
const HITPOINTS: Field<i64> = Field::new("hitpoints", 0);
const ORIENTATION: Field<f64> = Field::new("orientation", 0.0);

overlay!(
    /// Unit description inside a spawn template.
    SpawnVehicleData = "data"
);

impl SpawnVehicleData {
    fields! {
        respawn_id / set_respawn_id: i64 = RESPAWN_ID;
        /// Vehicle type index of the unit to spawn.
        definition_index / set_definition_index: i64 = DEFINITION_INDEX;
        hitpoints / set_hitpoints: i64 = HITPOINTS;
        /// Heading in radians.
        orientation / set_orientation: f64 = ORIENTATION;
    }

    pub fn world_position(&self, tree: &mut XmlTree) -> WorldPosition {
        self.child(tree)
    }

    pub fn attachments(&self, tree: &mut XmlTree) -> SpawnAttachments {
        self.child(tree)
    }
}

overlay!(
    /// Equipment of a spawn template.
    SpawnAttachments = "attachments"
);

impl SpawnAttachments {
    #[must_use]
    pub fn items(&self, tree: &XmlTree) -> Vec<SpawnAttachment> {
        self.children_of(tree)
    }

    /// Append an attachment of `kind` carrying `ammo`.
    pub fn add(&self, tree: &mut XmlTree, kind: AttachmentKind, ammo: i64) -> SpawnAttachment {
        let attachment = SpawnAttachment::create(tree);
        attachment.set_definition_index(tree, kind.index());
        attachment.set_ammo(tree, ammo);
        tree.append_child(self.node(), attachment.node());
        attachment
    }
}

const AMMO: Field<i64> = Field::new("ammo", 0);
const ATTACHMENT_TYPE: Field<i64> = Field::new("attachment_type", 0);
const ATTACHMENT_DEFINITION: Field<i64> =
    Field::new("definition_index", 0).with_side_effect(sync_attachment_type);

/// Keep `attachment_type` consistent with `definition_index`.
fn sync_attachment_type(tree: &mut XmlTree, node: NodeId) {
    let index = ATTACHMENT_DEFINITION.get(tree, node);
    match AttachmentKind::from_index(index) {
        Ok(kind) => ATTACHMENT_TYPE.set(tree, node, spawn_attachment_type(kind)),
        Err(err) => tracing::warn!("spawn attachment keeps its type: {err}"),
    }
}

overlay!(
    /// One attachment of a spawn template.
    SpawnAttachment = "a"
);

impl SpawnAttachment {
    fields! {
        ammo / set_ammo: i64 = AMMO;
        /// Category derived from the definition index.
        attachment_type / set_attachment_type: i64 = ATTACHMENT_TYPE;
        definition_index / set_definition_index: i64 = ATTACHMENT_DEFINITION;
    }
}
