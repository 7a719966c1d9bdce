//! Serializable snapshots of a save for listings and `--json` output

use glam::DVec3;
use serde::Serialize;

use super::SaveGame;
use crate::overlay::{Overlay, Positioned};
use crate::rules::{AttachmentKind, IslandKind, VehicleType};

/// Whole-save overview.
#[derive(Debug, Clone, Serialize)]
pub struct SaveSummary {
    pub tiles: Vec<TileSummary>,
    pub teams: Vec<TeamSummary>,
    pub vehicles: Vec<VehicleSummary>,
    pub spawns: Vec<SpawnSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TileSummary {
    pub id: i64,
    pub index: i64,
    pub team_control: i64,
    pub island_kind: Option<IslandKind>,
    pub island_radius: f64,
    pub position: [f64; 3],
    pub spawns: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamSummary {
    pub id: i64,
    pub human_controlled: bool,
    pub is_neutral: bool,
    pub is_destroyed: bool,
    pub currency: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct VehicleSummary {
    pub id: i64,
    pub definition_index: i64,
    /// `None` for definition indices outside the known table.
    pub vehicle_type: Option<VehicleType>,
    pub team_id: i64,
    pub position: [f64; 3],
    pub attachments: Vec<AttachmentSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttachmentSummary {
    /// -1 when the save holds no valid slot index.
    pub slot: i64,
    pub definition_index: i64,
    pub kind: Option<AttachmentKind>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpawnSummary {
    pub respawn_id: i64,
    pub tile_id: i64,
    pub definition_index: i64,
    pub vehicle_type: Option<VehicleType>,
    pub position: [f64; 3],
}

fn coords(point: DVec3) -> [f64; 3] {
    point.to_array()
}

impl SaveGame {
    #[must_use]
    pub fn tile_summaries(&self) -> Vec<TileSummary> {
        let tree = &self.scene;
        self.tiles()
            .into_iter()
            .map(|tile| TileSummary {
                id: tile.id(tree),
                index: tile.index(tree),
                team_control: tile.team_control(tree),
                island_kind: tile.island_kind(tree).ok(),
                island_radius: tile.island_radius(tree),
                position: coords(tile.location(tree)),
                spawns: tile
                    .find_child::<super::SpawnData>(tree)
                    .map_or(0, |data| data.items(tree).len()),
            })
            .collect()
    }

    #[must_use]
    pub fn team_summaries(&self) -> Vec<TeamSummary> {
        let tree = &self.scene;
        self.teams()
            .into_iter()
            .map(|team| TeamSummary {
                id: team.id(tree),
                human_controlled: team.human_controlled(tree),
                is_neutral: team.is_neutral(tree),
                is_destroyed: team.is_destroyed(tree),
                currency: team.currency(tree),
            })
            .collect()
    }

    #[must_use]
    pub fn vehicle_summaries(&self) -> Vec<VehicleSummary> {
        let tree = &self.vehicles;
        self.vehicles()
            .into_iter()
            .map(|vehicle| VehicleSummary {
                id: vehicle.id(tree),
                definition_index: vehicle.definition_index(tree),
                vehicle_type: vehicle.vehicle_type(tree).ok(),
                team_id: vehicle.team_id(tree),
                position: coords(vehicle.location(tree)),
                attachments: vehicle
                    .attachment_items(tree)
                    .into_iter()
                    .map(|attachment| AttachmentSummary {
                        slot: attachment.attachment_index(tree),
                        definition_index: attachment.definition_index(tree),
                        kind: attachment.kind(tree).ok().flatten(),
                    })
                    .collect(),
            })
            .collect()
    }

    #[must_use]
    pub fn spawn_summaries(&self) -> Vec<SpawnSummary> {
        let tree = &self.scene;
        let mut summaries = Vec::new();
        for tile in self.tiles() {
            let Some(data) = tile.find_child::<super::SpawnData>(tree) else {
                continue;
            };
            for spawn in data.items(tree) {
                let definition_index = spawn.definition_index(tree);
                summaries.push(SpawnSummary {
                    respawn_id: spawn.respawn_id(tree),
                    tile_id: tile.id(tree),
                    definition_index,
                    vehicle_type: VehicleType::from_index(definition_index).ok(),
                    position: coords(spawn.location(tree)),
                });
            }
        }
        summaries
    }

    #[must_use]
    pub fn summary(&self) -> SaveSummary {
        SaveSummary {
            tiles: self.tile_summaries(),
            teams: self.team_summaries(),
            vehicles: self.vehicle_summaries(),
            spawns: self.spawn_summaries(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::save::LoadOptions;

    const SAVE: &str = r#"<meta/><scene>
        <teams><teams><t id="1" currency="2000"/></teams></teams>
        <tiles><tiles><t id="1" index="0" team_control="1"><facility category="6"/></t></tiles></tiles>
        </scene>
        <vehicles><vehicles><v id="5" definition_index="2" team_id="1">
        <attachments><a attachment_index="1" definition_index="20"/></attachments>
        </v></vehicles></vehicles>"#;

    #[test]
    fn test_summary_json() {
        let save = SaveGame::parse(SAVE, &LoadOptions::default()).unwrap();
        let summary = save.summary();
        assert_eq!(summary.tiles[0].island_kind, Some(IslandKind::AirUnits));
        assert_eq!(summary.vehicles[0].vehicle_type, Some(VehicleType::Seal));
        assert_eq!(
            summary.vehicles[0].attachments[0].kind,
            Some(AttachmentKind::Gun30mm)
        );

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["teams"][0]["currency"], 2000);
        assert_eq!(json["vehicles"][0]["vehicle_type"], "Seal");
        assert_eq!(json["tiles"][0]["island_kind"], "AirUnits");
    }
}
