//! Vehicle and attachment state records
//!
//! A state record (`vehicle_states/v` or its `attachments/a`) keeps its rich
//! data as an escaped XML document inside the `state` attribute. Access is
//! closure scoped: [`VehicleState::with_data`] parses the blob, hands the
//! closure a typed overlay over the parsed tree, and writes the re-serialized
//! blob back before returning. Nothing is cached between calls, so two views of
//! the same record always agree.

use glam::DVec3;

use crate::error::Result;
use crate::overlay::{Field, Overlay, Positioned, TextField};
use crate::rules::{Capacity, CapacityField, VehicleDefaults};
use crate::xml::{NodeId, XmlTree, parse_document, serialize_embedded};
use crate::{fields, overlay};

const STATE: TextField = TextField::new("state", "");

// ==================== Blob Access ====================

/// Parse a blob into a tree rooted at a `D`, or synthesize a default one.
fn load_blob<D: Overlay>(raw: &str) -> (XmlTree, D) {
    if !raw.trim().is_empty() {
        match parse_document(raw) {
            Ok(tree) => {
                if let Some(root) = tree.root().filter(|root| tree.tag(*root) == D::TAG) {
                    return (tree, D::wrap(root));
                }
                tracing::warn!("embedded state has no <{}> root, resetting it", D::TAG);
            }
            Err(err) => tracing::warn!("embedded state is not valid XML ({err}), resetting it"),
        }
    }
    let mut tree = XmlTree::new();
    let data = D::create(&mut tree);
    tree.set_root(data.node());
    (tree, data)
}

fn read_blob<D: Overlay, R>(tree: &XmlTree, node: NodeId, f: impl FnOnce(&XmlTree, D) -> R) -> R {
    let (blob, data) = load_blob::<D>(STATE.get(tree, node));
    f(&blob, data)
}

fn write_blob<D: Overlay, R>(
    tree: &mut XmlTree,
    node: NodeId,
    f: impl FnOnce(&mut XmlTree, D) -> R,
) -> Result<R> {
    let (mut blob, data) = load_blob::<D>(STATE.get(tree, node));
    let out = f(&mut blob, data);
    let text = serialize_embedded(&blob)?;
    STATE.set(tree, node, &text);
    Ok(out)
}

// ==================== Vehicle State ====================

const ID: Field<i64> = Field::new("id", 0);

/// Store a freshly synthesized `D` blob on `node`.
fn init_blob<D: Overlay>(tree: &mut XmlTree, node: NodeId) {
    match serialize_embedded(&load_blob::<D>("").0) {
        Ok(text) => STATE.set(tree, node, &text),
        Err(err) => tracing::warn!("could not build a default <{}> state ({err})", D::TAG),
    }
}

fn vehicle_state_defaults(state: VehicleState, tree: &mut XmlTree) {
    init_blob::<VehicleData>(tree, state.node());
    state.attachments(tree);
}

overlay!(
    /// A vehicle's mutable state, paired with the vehicle by id.
    VehicleState = "v", defaults: vehicle_state_defaults
);

impl VehicleState {
    fields! {
        /// Id of the vehicle this state belongs to.
        id / set_id: i64 = ID;
    }

    /// Raw embedded blob.
    #[must_use]
    pub fn raw_state<'t>(&self, tree: &'t XmlTree) -> &'t str {
        STATE.get(tree, self.node())
    }

    pub fn attachments(&self, tree: &mut XmlTree) -> AttachmentStates {
        self.child(tree)
    }

    #[must_use]
    pub fn attachment(&self, tree: &XmlTree, slot: u32) -> Option<AttachmentState> {
        self.find_child::<AttachmentStates>(tree)
            .and_then(|states| states.get(tree, slot))
    }

    /// Read the embedded data.
    pub fn read_data<R>(&self, tree: &XmlTree, f: impl FnOnce(&XmlTree, VehicleData) -> R) -> R {
        read_blob(tree, self.node(), f)
    }

    /// Edit the embedded data and store it back.
    ///
    /// # Errors
    /// Returns an error if the blob cannot be re-serialized.
    pub fn with_data<R>(
        &self,
        tree: &mut XmlTree,
        f: impl FnOnce(&mut XmlTree, VehicleData) -> R,
    ) -> Result<R> {
        write_blob(tree, self.node(), f)
    }
}

const HITPOINTS: Field<i64> = Field::new("hitpoints", 0);
const IS_DESTROYED: Field<bool> = Field::new("is_destroyed", false);
const INTERNAL_FUEL: Field<f64> = Field::new("internal_fuel_remaining", 0.0);
const ATTACHED_TO: Field<i64> = Field::new("attached_to_vehicle_id", 0);

fn vehicle_data_defaults(data: VehicleData, tree: &mut XmlTree) {
    data.apply_defaults(tree, VehicleDefaults::default());
    data.set_is_destroyed(tree, false);
}

overlay!(
    /// Root of a vehicle state blob.
    VehicleData = "data", defaults: vehicle_data_defaults
);

impl VehicleData {
    fields! {
        hitpoints / set_hitpoints: i64 = HITPOINTS;
        is_destroyed / set_is_destroyed: bool = IS_DESTROYED;
        internal_fuel_remaining / set_internal_fuel_remaining: f64 = INTERNAL_FUEL;
        /// Vehicle this one is docked to or carried by.
        attached_to_vehicle_id / set_attached_to_vehicle_id: i64 = ATTACHED_TO;
    }

    pub fn apply_defaults(&self, tree: &mut XmlTree, defaults: VehicleDefaults) {
        self.set_hitpoints(tree, defaults.hitpoints);
        self.set_internal_fuel_remaining(tree, defaults.internal_fuel);
    }

    #[must_use]
    pub fn waypoints(&self, tree: &XmlTree) -> Vec<Waypoint> {
        self.find_child::<Waypoints>(tree)
            .map(|list| list.children_of(tree))
            .unwrap_or_default()
    }

    /// Append a waypoint at a world location.
    pub fn add_waypoint(&self, tree: &mut XmlTree, location: DVec3) -> Waypoint {
        let list: Waypoints = self.child(tree);
        let next_id = list
            .children_of::<Waypoint>(tree)
            .iter()
            .map(|waypoint| waypoint.id(tree))
            .max()
            .map_or(1, |id| id + 1);
        let waypoint = Waypoint::create(tree);
        waypoint.set_id(tree, next_id);
        waypoint.move_to(tree, location);
        tree.append_child(list.node(), waypoint.node());
        waypoint
    }

    pub fn clear_waypoints(&self, tree: &mut XmlTree) {
        for waypoint in self.waypoints(tree) {
            tree.detach(waypoint.node());
        }
    }

    pub fn inventory(&self, tree: &mut XmlTree) -> Inventory {
        self.child(tree)
    }

    /// Item quantities in inventory order, empty when there is no inventory.
    #[must_use]
    pub fn quantities(&self, tree: &XmlTree) -> Vec<i64> {
        self.find_child::<Inventory>(tree)
            .map(|inventory| inventory.quantities(tree))
            .unwrap_or_default()
    }
}

// ==================== Waypoints ====================

overlay!(
    /// Ordered waypoint list of a vehicle.
    Waypoints = "waypoints"
);

const WAYPOINT_ID: Field<i64> = Field::new("id", 0);
const WAYPOINT_TYPE: Field<i64> = Field::new("type", 0);
const ALTITUDE: Field<f64> = Field::new("altitude", 0.0);
const TARGET_TILE: Field<i64> = Field::new("target_tile_id", 0);
const TARGET_VEHICLE: Field<i64> = Field::new("target_vehicle_id", 0);
const WAIT_GROUP: Field<i64> = Field::new("wait_group", 0);

const MAP_X: Field<f64> = Field::new("x", 0.0);
const MAP_Y: Field<f64> = Field::new("y", 0.0);

fn waypoint_defaults(waypoint: Waypoint, tree: &mut XmlTree) {
    waypoint.set_order(tree, 0);
    waypoint.set_altitude(tree, 0.0);
    waypoint.position(tree);
}

overlay!(
    /// A movement order.
    ///
    /// The map position is stored as a 2D `position` child whose `y` is the
    /// world `z` axis; the world `y` axis is `altitude`.
    Waypoint = "w", defaults: waypoint_defaults
);

overlay!(
    /// 2D map position of a waypoint.
    WaypointPosition = "position"
);

impl Waypoint {
    fields! {
        id / set_id: i64 = WAYPOINT_ID;
        /// Order kind.
        order / set_order: i64 = WAYPOINT_TYPE;
        altitude / set_altitude: f64 = ALTITUDE;
        wait_group / set_wait_group: i64 = WAIT_GROUP;
    }

    pub fn position(&self, tree: &mut XmlTree) -> WaypointPosition {
        self.child(tree)
    }

    /// Tile the order targets, if any.
    #[must_use]
    pub fn target_tile(&self, tree: &XmlTree) -> Option<i64> {
        TARGET_TILE.get_opt(tree, self.node()).filter(|id| *id > 0)
    }

    pub fn set_target_tile(&self, tree: &mut XmlTree, tile: Option<i64>) {
        set_optional(tree, self.node(), TARGET_TILE, tile);
    }

    /// Vehicle the order targets, if any.
    #[must_use]
    pub fn target_vehicle(&self, tree: &XmlTree) -> Option<i64> {
        TARGET_VEHICLE.get_opt(tree, self.node()).filter(|id| *id > 0)
    }

    pub fn set_target_vehicle(&self, tree: &mut XmlTree, vehicle: Option<i64>) {
        set_optional(tree, self.node(), TARGET_VEHICLE, vehicle);
    }
}

fn set_optional(tree: &mut XmlTree, node: NodeId, field: Field<i64>, value: Option<i64>) {
    match value {
        Some(value) => field.set(tree, node, value),
        None => {
            tree.remove_attribute(node, field.name());
        }
    }
}

impl Positioned for Waypoint {
    fn location(&self, tree: &XmlTree) -> DVec3 {
        let (x, z) = self
            .find_child::<WaypointPosition>(tree)
            .map_or((0.0, 0.0), |position| {
                (
                    MAP_X.get(tree, position.node()),
                    MAP_Y.get(tree, position.node()),
                )
            });
        DVec3::new(x, self.altitude(tree), z)
    }

    fn move_to(&self, tree: &mut XmlTree, target: DVec3) {
        let position = self.position(tree);
        MAP_X.set(tree, position.node(), target.x);
        MAP_Y.set(tree, position.node(), target.z);
        self.set_altitude(tree, target.y);
    }
}

// ==================== Inventory ====================

const TOTAL_WEIGHT: Field<i64> = Field::new("total_weight", 0);
const QUANTITY: Field<i64> = Field::new("value", 0);

overlay!(
    /// Cargo carried by a vehicle.
    Inventory = "inventory"
);

overlay!(
    /// Quantities indexed by item type.
    ItemQuantities = "item_quantities"
);

overlay!(
    /// One item quantity.
    Quantity = "q"
);

impl Inventory {
    fields! {
        total_weight / set_total_weight: i64 = TOTAL_WEIGHT;
    }

    #[must_use]
    pub fn quantities(&self, tree: &XmlTree) -> Vec<i64> {
        self.find_child::<ItemQuantities>(tree)
            .map(|list| {
                list.children_of::<Quantity>(tree)
                    .iter()
                    .map(|q| QUANTITY.get(tree, q.node()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Set the quantity of item `index`, padding the list with zeros.
    pub fn set_quantity(&self, tree: &mut XmlTree, index: usize, value: i64) {
        let list: ItemQuantities = self.child(tree);
        let mut items = list.children_of::<Quantity>(tree);
        while items.len() <= index {
            let q = Quantity::create(tree);
            QUANTITY.set(tree, q.node(), 0);
            tree.append_child(list.node(), q.node());
            items.push(q);
        }
        QUANTITY.set(tree, items[index].node(), value);
    }
}

// ==================== Attachment State ====================

overlay!(
    /// Per-slot attachment state list of a vehicle.
    AttachmentStates = "attachments"
);

impl AttachmentStates {
    #[must_use]
    pub fn items(&self, tree: &XmlTree) -> Vec<AttachmentState> {
        self.children_of(tree)
    }

    #[must_use]
    pub fn get(&self, tree: &XmlTree, slot: u32) -> Option<AttachmentState> {
        self.items(tree)
            .into_iter()
            .find(|state| state.occupies(tree, slot))
    }

    /// Remove every state record at `slot`.
    pub fn remove(&self, tree: &mut XmlTree, slot: u32) {
        for state in self.items(tree) {
            if state.occupies(tree, slot) {
                tree.detach(state.node());
            }
        }
    }

    /// Insert `state`, replacing any record at the same slot.
    pub fn replace(&self, tree: &mut XmlTree, state: AttachmentState) {
        if let Ok(slot) = u32::try_from(state.attachment_index(tree)) {
            self.remove(tree, slot);
        }
        tree.append_child(self.node(), state.node());
    }
}

const ATTACHMENT_INDEX: Field<i64> = Field::new("attachment_index", -1);

fn attachment_state_defaults(state: AttachmentState, tree: &mut XmlTree) {
    init_blob::<AttachmentData>(tree, state.node());
}

overlay!(
    /// Consumable state of the attachment in one slot.
    AttachmentState = "a", defaults: attachment_state_defaults
);

impl AttachmentState {
    fields! {
        /// Slot position, matching the vehicle attachment's `attachment_index`.
        attachment_index / set_attachment_index: i64 = ATTACHMENT_INDEX;
    }

    /// Whether this record belongs to `slot`.
    #[must_use]
    pub fn occupies(&self, tree: &XmlTree, slot: u32) -> bool {
        self.attachment_index(tree) == i64::from(slot)
    }

    pub fn read_data<R>(&self, tree: &XmlTree, f: impl FnOnce(&XmlTree, AttachmentData) -> R) -> R {
        read_blob(tree, self.node(), f)
    }

    /// Edit the embedded data and store it back.
    ///
    /// # Errors
    /// Returns an error if the blob cannot be re-serialized.
    pub fn with_data<R>(
        &self,
        tree: &mut XmlTree,
        f: impl FnOnce(&mut XmlTree, AttachmentData) -> R,
    ) -> Result<R> {
        write_blob(tree, self.node(), f)
    }
}

const AMMO: Field<i64> = Field::new("ammo", 0);
const FUEL_CAPACITY: Field<f64> = Field::new("fuel_capacity", 0.0);
const FUEL_REMAINING: Field<f64> = Field::new("fuel_remaining", 0.0);

overlay!(
    /// Root of an attachment state blob.
    AttachmentData = "data"
);

impl AttachmentData {
    fields! {
        ammo / set_ammo: i64 = AMMO;
        fuel_capacity / set_fuel_capacity: f64 = FUEL_CAPACITY;
        fuel_remaining / set_fuel_remaining: f64 = FUEL_REMAINING;
    }

    /// Fill every field of the capacity schema with its default count.
    pub fn apply_capacity(&self, tree: &mut XmlTree, capacity: Capacity) {
        for field in capacity.fields {
            match field {
                CapacityField::Ammo => self.set_ammo(tree, capacity.count.round() as i64),
                CapacityField::FuelCapacity => self.set_fuel_capacity(tree, capacity.count),
                CapacityField::FuelRemaining => self.set_fuel_remaining(tree, capacity.count),
            }
        }
    }
}
