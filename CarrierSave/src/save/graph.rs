//! Operations that keep entities consistent across roots

use glam::DVec3;

use super::tile::{BIOME_SANDY_PINES, DEFAULT_ISLAND_RADIUS, POS_Y_SEABOTTOM};
use super::{
    Attachment, AttachmentState, SaveGame, Tile, Vehicle, VehicleSpawn, VehicleState,
};
use crate::error::{Error, Result};
use crate::overlay::{Overlay, Positioned};
use crate::rules::{
    AttachmentKind, VehicleType, attachment_capacity, default_state, slot_layout,
    validate_attachment,
};

/// Altitude new vehicles are placed at. Units drop into place, lower ones
/// can end up inside terrain.
pub const NEW_VEHICLE_ALTITUDE: f64 = 20.0;

/// Slot reserved for the driver seat.
pub const DRIVER_SLOT: u32 = 0;

impl SaveGame {
    // ==================== Tiles ====================

    /// Id the next tile will get: one past the largest existing id.
    #[must_use]
    pub fn next_tile_id(&self) -> i64 {
        self.tiles()
            .iter()
            .map(|tile| tile.id(&self.scene))
            .max()
            .unwrap_or(0)
            + 1
    }

    /// Create an island at the sea floor under the map origin.
    pub fn new_tile(&mut self) -> Tile {
        let id = self.next_tile_id();
        let container = self.tiles_container();

        let tile = Tile::create(&mut self.scene);
        tile.set_biome_type(&mut self.scene, BIOME_SANDY_PINES);
        tile.set_id(&mut self.scene, id);
        tile.set_index(&mut self.scene, id - 1);
        tile.set_island_radius(&mut self.scene, DEFAULT_ISLAND_RADIUS);
        self.scene.append_child(container, tile.node());
        self.set_tile_id_counter(id);
        tile.move_to(&mut self.scene, DVec3::new(0.0, POS_Y_SEABOTTOM, 0.0));

        tracing::info!("Created tile {id}");
        tile
    }

    /// Remove a tile and renumber the rest to `1..=N`.
    ///
    /// # Errors
    /// Returns [`Error::TileNotFound`] if no tile has `id`.
    pub fn remove_tile(&mut self, id: i64) -> Result<()> {
        let tile = self.tile(id)?;
        self.scene.detach(tile.node());
        self.renumber_tiles();
        tracing::info!("Removed tile {id}");
        Ok(())
    }

    /// Rewrite tile ids and indices in document order and store the count.
    pub(crate) fn renumber_tiles(&mut self) {
        let tiles = self.tiles();
        for (position, tile) in (0_i64..).zip(&tiles) {
            tile.set_id(&mut self.scene, position + 1);
            tile.set_index(&mut self.scene, position);
        }
        self.set_tile_id_counter(tiles.len() as i64);
    }

    /// Move a tile and its spawns to `target`.
    ///
    /// # Errors
    /// Returns [`Error::TileNotFound`] if no tile has `id`.
    pub fn move_tile(&mut self, id: i64, target: DVec3) -> Result<()> {
        let tile = self.tile(id)?;
        tile.move_to(&mut self.scene, target);
        Ok(())
    }

    /// Move a tile and its spawns by `delta`.
    ///
    /// # Errors
    /// Returns [`Error::TileNotFound`] if no tile has `id`.
    pub fn translate_tile(&mut self, id: i64, delta: DVec3) -> Result<()> {
        let tile = self.tile(id)?;
        tile.translate(&mut self.scene, delta);
        Ok(())
    }

    /// Hand a tile to `team`; its automatic respawns follow.
    ///
    /// # Errors
    /// Returns an error if the tile or team does not exist.
    pub fn set_tile_team_control(&mut self, id: i64, team: i64) -> Result<()> {
        let tile = self.tile(id)?;
        self.team(team)?;
        tile.set_team_control(&mut self.scene, team);
        Ok(())
    }

    /// Whether the tile's controlling team is played by a human. A missing team
    /// counts as not human.
    ///
    /// # Errors
    /// Returns [`Error::TileNotFound`] if no tile has `id`.
    pub fn tile_human_controlled(&self, id: i64) -> Result<bool> {
        let tile = self.tile(id)?;
        let team = tile.team_control(&self.scene);
        Ok(self
            .team(team)
            .is_ok_and(|team| team.human_controlled(&self.scene)))
    }

    // ==================== Vehicles ====================

    /// Id the next vehicle will get: one past the largest existing id or the
    /// stored counter, whichever is higher.
    #[must_use]
    pub fn next_vehicle_id(&self) -> i64 {
        let highest = self
            .vehicles()
            .iter()
            .map(|vehicle| vehicle.id(&self.vehicles))
            .max()
            .unwrap_or(0);
        highest.max(self.vehicle_id_counter()) + 1
    }

    /// Create a vehicle and its paired state at the map origin.
    ///
    /// # Errors
    /// Returns an error if the state blob cannot be written.
    pub fn new_vehicle(&mut self, vehicle_type: VehicleType) -> Result<Vehicle> {
        let id = self.next_vehicle_id();

        let state = VehicleState::create(&mut self.vehicle_states);
        state.set_id(&mut self.vehicle_states, id);
        state.with_data(&mut self.vehicle_states, |tree, data| {
            data.apply_defaults(tree, default_state(vehicle_type));
        })?;

        let vehicle = Vehicle::create(&mut self.vehicles);
        vehicle.set_id(&mut self.vehicles, id);
        vehicle.set_definition_index(&mut self.vehicles, vehicle_type.index());
        vehicle.transform(&mut self.vehicles);
        vehicle.move_to(
            &mut self.vehicles,
            DVec3::new(0.0, NEW_VEHICLE_ALTITUDE, 0.0),
        );

        let vehicles = self.vehicles_container();
        self.vehicles.append_child(vehicles, vehicle.node());
        let states = self.vehicle_states_container();
        self.vehicle_states.append_child(states, state.node());
        self.set_vehicle_id_counter(id);

        tracing::info!("Created {vehicle_type} {id}");
        Ok(vehicle)
    }

    /// Remove a vehicle, its state and any spawn template with the same id.
    ///
    /// Jetties are never removed; the carrier cannot launch without one. Returns
    /// whether the vehicle was removed. Removing a team's last carrier marks the
    /// team destroyed.
    ///
    /// # Errors
    /// Returns an error if the vehicle does not exist, or if it is a carrier
    /// whose team does not exist.
    pub fn remove_vehicle(&mut self, id: i64) -> Result<bool> {
        let vehicle = self.vehicle(id)?;
        let definition = vehicle.definition_index(&self.vehicles);
        let team_id = vehicle.team_id(&self.vehicles);

        if definition == VehicleType::Jetty.index() {
            tracing::warn!("Vehicle {id} is a jetty and cannot be removed");
            return Ok(false);
        }

        if definition == VehicleType::Carrier.index() {
            let team_carriers = self
                .vehicles()
                .iter()
                .filter(|other| {
                    other.team_id(&self.vehicles) == team_id
                        && other.definition_index(&self.vehicles) == definition
                })
                .count();
            if team_carriers == 1 {
                let team = self.team(team_id)?;
                team.set_destroyed(&mut self.scene, true);
                tracing::info!("Team {team_id} lost its last carrier");
            }
        }

        if let Ok(state) = self.vehicle_state(id) {
            self.vehicle_states.detach(state.node());
        }
        self.vehicles.detach(vehicle.node());

        if self.spawn(id).is_ok() {
            self.remove_spawn(id)?;
        }
        tracing::info!("Removed vehicle {id}");
        Ok(true)
    }

    /// Move a vehicle, its bodies and its attachments to `target`.
    ///
    /// # Errors
    /// Returns [`Error::VehicleNotFound`] if no vehicle has `id`.
    pub fn move_vehicle(&mut self, id: i64, target: DVec3) -> Result<()> {
        let vehicle = self.vehicle(id)?;
        vehicle.move_to(&mut self.vehicles, target);
        Ok(())
    }

    /// Move a vehicle, its bodies and its attachments by `delta`.
    ///
    /// # Errors
    /// Returns [`Error::VehicleNotFound`] if no vehicle has `id`.
    pub fn translate_vehicle(&mut self, id: i64, delta: DVec3) -> Result<()> {
        let vehicle = self.vehicle(id)?;
        vehicle.translate(&mut self.vehicles, delta);
        Ok(())
    }

    /// Attachment kind fitted at `slot`, `None` when the slot is empty.
    ///
    /// # Errors
    /// Returns an error if the vehicle does not exist or the fitted index is
    /// not a known kind.
    pub fn attachment(&self, id: i64, slot: u32) -> Result<Option<AttachmentKind>> {
        let vehicle = self.vehicle(id)?;
        match vehicle.attachment(&self.vehicles, slot) {
            Some(attachment) => attachment.kind(&self.vehicles),
            None => Ok(None),
        }
    }

    /// State record of the attachment at `slot`, if any. Use with
    /// `self.vehicle_states`.
    ///
    /// # Errors
    /// Returns an error if the vehicle has no state.
    pub fn attachment_state(&self, id: i64, slot: u32) -> Result<Option<AttachmentState>> {
        let state = self.vehicle_state(id)?;
        Ok(state.attachment(&self.vehicle_states, slot))
    }

    /// Fit `kind` to `slot`, or clear the slot with `None`.
    ///
    /// Vehicle types with a known slot layout only accept kinds legal for the
    /// slot. The matching state record is written with the kind's capacity.
    ///
    /// # Errors
    /// Returns an error if the vehicle or its state does not exist, the type is
    /// unknown, or the assignment is not legal.
    pub fn set_attachment(&mut self, id: i64, slot: u32, kind: Option<AttachmentKind>) -> Result<()> {
        let vehicle = self.vehicle(id)?;
        let vehicle_type = vehicle.vehicle_type(&self.vehicles)?;
        if let Some(kind) = kind {
            if !slot_layout(vehicle_type).is_empty() {
                validate_attachment(vehicle_type, slot, kind)?;
            }
        }
        self.install_attachment(vehicle, vehicle_type, slot, kind)
    }

    fn install_attachment(
        &mut self,
        vehicle: Vehicle,
        vehicle_type: VehicleType,
        slot: u32,
        kind: Option<AttachmentKind>,
    ) -> Result<()> {
        let id = vehicle.id(&self.vehicles);
        let state = self.vehicle_state(id)?;

        let Some(kind) = kind else {
            vehicle.attachments(&mut self.vehicles).remove(&mut self.vehicles, slot);
            state
                .attachments(&mut self.vehicle_states)
                .remove(&mut self.vehicle_states, slot);
            tracing::debug!("Cleared slot {slot} of vehicle {id}");
            return Ok(());
        };

        let record = match attachment_capacity(vehicle_type, kind) {
            Some(capacity) => {
                let record = AttachmentState::create(&mut self.vehicle_states);
                record.set_attachment_index(&mut self.vehicle_states, i64::from(slot));
                record.with_data(&mut self.vehicle_states, |tree, data| {
                    data.apply_capacity(tree, capacity);
                })?;
                Some(record)
            }
            None => None,
        };

        let attachment = Attachment::build(&mut self.vehicles, kind, slot);
        vehicle
            .attachments(&mut self.vehicles)
            .replace(&mut self.vehicles, attachment);

        let records = state.attachments(&mut self.vehicle_states);
        match record {
            Some(record) => records.replace(&mut self.vehicle_states, record),
            None => records.remove(&mut self.vehicle_states, slot),
        }
        tracing::debug!("Fitted {kind} to slot {slot} of vehicle {id}");
        Ok(())
    }

    /// Hand a vehicle to `team`.
    ///
    /// Remote-driveable units joining a human team get a driver seat in slot 0
    /// if that slot is empty.
    ///
    /// # Errors
    /// Returns an error if the vehicle or team does not exist.
    pub fn set_vehicle_team(&mut self, id: i64, team: i64) -> Result<()> {
        let vehicle = self.vehicle(id)?;
        let human = self.team(team)?.human_controlled(&self.scene);
        vehicle.set_team_id(&mut self.vehicles, team);

        if !human || vehicle.attachment(&self.vehicles, DRIVER_SLOT).is_some() {
            return Ok(());
        }
        match vehicle.vehicle_type(&self.vehicles) {
            Ok(vehicle_type) if vehicle_type.is_remote_driveable() => {
                tracing::debug!("Adding a driver seat to vehicle {id}");
                self.install_attachment(
                    vehicle,
                    vehicle_type,
                    DRIVER_SLOT,
                    Some(AttachmentKind::DriverSeat),
                )
            }
            _ => Ok(()),
        }
    }

    /// Live vehicles of one type.
    #[must_use]
    pub fn find_vehicles_by_type(&self, vehicle_type: VehicleType) -> Vec<Vehicle> {
        self.vehicles()
            .into_iter()
            .filter(|vehicle| vehicle.definition_index(&self.vehicles) == vehicle_type.index())
            .collect()
    }

    /// Create a copy of a vehicle at its location plus `offset`, with the same
    /// team and attachments.
    ///
    /// # Errors
    /// Returns an error if the source does not exist or carries an unknown
    /// type or attachment.
    pub fn duplicate_vehicle(&mut self, id: i64, offset: DVec3) -> Result<Vehicle> {
        let source = self.vehicle(id)?;
        let vehicle_type = source.vehicle_type(&self.vehicles)?;
        let location = source.location(&self.vehicles);
        let team = source.team_id(&self.vehicles);

        let mut fitted = Vec::new();
        for attachment in source.attachment_items(&self.vehicles) {
            let Ok(slot) = u32::try_from(attachment.attachment_index(&self.vehicles)) else {
                continue;
            };
            if let Some(kind) = attachment.kind(&self.vehicles)? {
                fitted.push((slot, kind));
            }
        }

        let copy = self.new_vehicle(vehicle_type)?;
        copy.set_team_id(&mut self.vehicles, team);
        copy.move_to(&mut self.vehicles, location + offset);
        for (slot, kind) in fitted {
            self.install_attachment(copy, vehicle_type, slot, Some(kind))?;
        }
        Ok(copy)
    }

    // ==================== Spawns ====================

    /// Every spawn template across all tiles. Use with `self.scene`.
    #[must_use]
    pub fn spawns(&self) -> Vec<VehicleSpawn> {
        self.tiles()
            .into_iter()
            .flat_map(|tile| self.tile_spawns(tile))
            .collect()
    }

    fn tile_spawns(&self, tile: Tile) -> Vec<VehicleSpawn> {
        tile.find_child::<super::SpawnData>(&self.scene)
            .map(|data| data.items(&self.scene))
            .unwrap_or_default()
    }

    /// # Errors
    /// Returns [`Error::SpawnNotFound`] if no template has `respawn_id`.
    pub fn spawn(&self, respawn_id: i64) -> Result<VehicleSpawn> {
        self.spawn_tile(respawn_id).map(|(_, spawn)| spawn)
    }

    /// Template with `respawn_id` and the tile it belongs to.
    ///
    /// # Errors
    /// Returns [`Error::SpawnNotFound`] if no template has `respawn_id`.
    pub fn spawn_tile(&self, respawn_id: i64) -> Result<(Tile, VehicleSpawn)> {
        self.tiles()
            .into_iter()
            .find_map(|tile| {
                self.tile_spawns(tile)
                    .into_iter()
                    .find(|spawn| spawn.respawn_id(&self.scene) == respawn_id)
                    .map(|spawn| (tile, spawn))
            })
            .ok_or(Error::SpawnNotFound(respawn_id))
    }

    /// One past the largest respawn id on any tile.
    #[must_use]
    pub fn next_respawn_id(&self) -> i64 {
        self.spawns()
            .iter()
            .map(|spawn| spawn.respawn_id(&self.scene))
            .max()
            .unwrap_or(0)
            + 1
    }

    /// Add a spawn template to a tile.
    ///
    /// # Errors
    /// Returns [`Error::TileNotFound`] if no tile has `tile_id`.
    pub fn new_spawn(
        &mut self,
        tile_id: i64,
        vehicle_type: VehicleType,
        position: DVec3,
    ) -> Result<VehicleSpawn> {
        let tile = self.tile(tile_id)?;
        let respawn_id = self.next_respawn_id();

        let spawn = VehicleSpawn::create(&mut self.scene);
        let data = spawn.data(&mut self.scene);
        data.set_respawn_id(&mut self.scene, respawn_id);
        data.set_definition_index(&mut self.scene, vehicle_type.index());
        data.set_hitpoints(&mut self.scene, default_state(vehicle_type).hitpoints);
        data.attachments(&mut self.scene);
        spawn.move_to(&mut self.scene, position);
        tile.spawn_list(&mut self.scene).append(&mut self.scene, spawn);

        tracing::info!("Added {vehicle_type} spawn {respawn_id} to tile {tile_id}");
        Ok(spawn)
    }

    /// Remove a spawn template.
    ///
    /// # Errors
    /// Returns [`Error::SpawnNotFound`] if no template has `respawn_id`.
    pub fn remove_spawn(&mut self, respawn_id: i64) -> Result<()> {
        let (tile, _) = self.spawn_tile(respawn_id)?;
        tile.spawn_list(&mut self.scene)
            .remove(&mut self.scene, respawn_id);
        tracing::info!("Removed spawn {respawn_id}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::save::LoadOptions;

    const SAVE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<meta/>
<scene>
<teams><teams>
<t id="0" is_ai_controlled="false"/>
<t id="1" is_ai_controlled="true"/>
</teams></teams>
<tiles id_counter="2"><tiles>
<t id="1" index="0"><world_position x="0" y="0" z="0"/></t>
<t id="2" index="1"><world_position x="1000" y="0" z="0"/></t>
</tiles></tiles>
<vehicles id_counter="3"/>
</scene>
<vehicles><vehicles>
<v id="1" definition_index="0" team_id="1"><transform 30="0" 31="0" 32="0"/></v>
<v id="2" definition_index="59" team_id="1"><transform 30="5" 31="0" 32="5"/></v>
</vehicles></vehicles>
<vehicle_states><vehicle_states>
<v id="1"/>
<v id="2"/>
</vehicle_states></vehicle_states>"#;

    fn load() -> SaveGame {
        SaveGame::parse(SAVE, &LoadOptions::default()).unwrap()
    }

    fn tile_ids(save: &SaveGame) -> Vec<(i64, i64)> {
        save.tiles()
            .iter()
            .map(|tile| (tile.id(&save.scene), tile.index(&save.scene)))
            .collect()
    }

    #[test]
    fn test_new_tile_ids() {
        let mut save = load();
        let tile = save.new_tile();
        assert_eq!(tile.id(&save.scene), 3);
        assert_eq!(tile.index(&save.scene), 2);
        assert_eq!(save.tile_id_counter(), 3);
        assert_eq!(tile.biome_type(&save.scene), BIOME_SANDY_PINES);
        assert_eq!(tile.island_radius(&save.scene), DEFAULT_ISLAND_RADIUS);
        assert_eq!(tile.location(&save.scene), DVec3::new(0.0, POS_Y_SEABOTTOM, 0.0));
    }

    #[test]
    fn test_remove_tile_renumbers() {
        let mut save = load();
        save.new_tile();
        save.remove_tile(1).unwrap();
        assert_eq!(tile_ids(&save), vec![(1, 0), (2, 1)]);
        assert_eq!(save.tile_id_counter(), 2);
        assert!(matches!(save.remove_tile(9), Err(Error::TileNotFound(9))));
    }

    #[test]
    fn test_new_vehicle_uses_counter() {
        let mut save = load();
        let vehicle = save.new_vehicle(VehicleType::Seal).unwrap();
        assert_eq!(vehicle.id(&save.vehicles), 4);
        assert_eq!(save.vehicle_id_counter(), 4);
        assert_eq!(
            vehicle.location(&save.vehicles),
            DVec3::new(0.0, NEW_VEHICLE_ALTITUDE, 0.0)
        );
        let state = save.vehicle_state(4).unwrap();
        let hitpoints = state.read_data(&save.vehicle_states, |tree, data| data.hitpoints(tree));
        assert_eq!(hitpoints, default_state(VehicleType::Seal).hitpoints);
    }

    #[test]
    fn test_jetty_is_protected() {
        let mut save = load();
        assert!(!save.remove_vehicle(2).unwrap());
        assert!(save.vehicle(2).is_ok());
        assert!(save.vehicle_state(2).is_ok());
    }

    #[test]
    fn test_removing_last_carrier_destroys_team() {
        let mut save = load();
        assert!(save.remove_vehicle(1).unwrap());
        assert!(save.vehicle(1).is_err());
        assert!(save.vehicle_state(1).is_err());
        assert!(save.team(1).unwrap().is_destroyed(&save.scene));
    }

    #[test]
    fn test_set_attachment_validates_layout() {
        let mut save = load();
        let seal = save.new_vehicle(VehicleType::Seal).unwrap().id(&save.vehicles);
        let err = save
            .set_attachment(seal, 1, Some(AttachmentKind::Gun120mm))
            .unwrap_err();
        assert!(matches!(err, Error::IllegalAttachment { slot: 1, .. }));
        let err = save
            .set_attachment(seal, 9, Some(AttachmentKind::Gun30mm))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidSlot { .. }));

        save.set_attachment(seal, 1, Some(AttachmentKind::Gun30mm))
            .unwrap();
        assert_eq!(
            save.attachment(seal, 1).unwrap(),
            Some(AttachmentKind::Gun30mm)
        );
        assert!(save.attachment_state(seal, 1).unwrap().is_some());

        save.set_attachment(seal, 1, None).unwrap();
        assert_eq!(save.attachment(seal, 1).unwrap(), None);
        assert!(save.attachment_state(seal, 1).unwrap().is_none());
    }

    #[test]
    fn test_human_team_gets_driver_seat() {
        let mut save = load();
        let walrus = save.new_vehicle(VehicleType::Walrus).unwrap().id(&save.vehicles);
        save.set_vehicle_team(walrus, 1).unwrap();
        assert_eq!(save.attachment(walrus, DRIVER_SLOT).unwrap(), None);

        save.set_vehicle_team(walrus, 0).unwrap();
        assert_eq!(
            save.attachment(walrus, DRIVER_SLOT).unwrap(),
            Some(AttachmentKind::DriverSeat)
        );
        assert!(save.set_vehicle_team(walrus, 7).unwrap_err().is_not_found());
    }

    #[test]
    fn test_duplicate_vehicle() {
        let mut save = load();
        let bear = save.new_vehicle(VehicleType::Bear).unwrap().id(&save.vehicles);
        save.set_attachment(bear, 2, Some(AttachmentKind::Gun120mm))
            .unwrap();
        save.set_vehicle_team(bear, 1).unwrap();

        let copy = save
            .duplicate_vehicle(bear, DVec3::new(50.0, 0.0, 0.0))
            .unwrap();
        let copy_id = copy.id(&save.vehicles);
        assert_ne!(copy_id, bear);
        assert_eq!(copy.team_id(&save.vehicles), 1);
        assert_eq!(
            copy.location(&save.vehicles),
            DVec3::new(50.0, NEW_VEHICLE_ALTITUDE, 0.0)
        );
        assert_eq!(
            save.attachment(copy_id, 2).unwrap(),
            Some(AttachmentKind::Gun120mm)
        );
        assert_eq!(save.find_vehicles_by_type(VehicleType::Bear).len(), 2);
    }

    #[test]
    fn test_spawn_lifecycle() {
        let mut save = load();
        let spawn = save
            .new_spawn(2, VehicleType::Walrus, DVec3::new(1100.0, 0.0, 50.0))
            .unwrap();
        let respawn_id = spawn.respawn_id(&save.scene);
        assert_eq!(respawn_id, 1);
        assert_eq!(save.next_respawn_id(), 2);

        let (tile, _) = save.spawn_tile(respawn_id).unwrap();
        assert_eq!(tile.id(&save.scene), 2);

        save.translate_tile(2, DVec3::new(0.0, 0.0, 10.0)).unwrap();
        let spawn = save.spawn(respawn_id).unwrap();
        assert_eq!(spawn.location(&save.scene), DVec3::new(1100.0, 0.0, 60.0));

        save.remove_spawn(respawn_id).unwrap();
        assert!(matches!(
            save.spawn(respawn_id),
            Err(Error::SpawnNotFound(1))
        ));
    }

    #[test]
    fn test_tile_team_control() {
        let mut save = load();
        save.set_tile_team_control(1, 0).unwrap();
        assert!(save.tile_human_controlled(1).unwrap());
        save.set_tile_team_control(1, 1).unwrap();
        assert!(!save.tile_human_controlled(1).unwrap());
        let tile = save.tile(1).unwrap();
        assert_eq!(tile.spawn_data(&mut save.scene).team_id(&save.scene), 1);
    }
}
