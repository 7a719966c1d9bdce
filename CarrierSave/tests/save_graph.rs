use carriersave::prelude::*;
use carriersave::rules::FALLBACK_FUEL_CAPACITY;
use carriersave::xml::DEFAULT_CHUNK_SIZE;
use glam::DVec3;
use pretty_assertions::assert_eq;
use tempfile::tempdir;

const SAVE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<meta version="2" game_mode="campaign"/>
<scene>
<teams><teams>
<t id="0" is_ai_controlled="false" currency="2000"/>
<t id="1" is_ai_controlled="true"/>
<t id="2" is_ai_controlled="true"/>
</teams></teams>
<tiles id_counter="3"><tiles>
<t id="1" index="0" team_control="1">
<world_position x="0" y="0" z="0"/>
<spawn_data team_id="1" is_set="true"><vehicles>
<v spawn_type="0"><data respawn_id="5" definition_index="4"><world_position x="10" y="0" z="10"/></data></v>
</vehicles></spawn_data>
</t>
<t id="2" index="1" team_control="0"><world_position x="4000" y="0" z="0"/></t>
<t id="3" index="2" team_control="2"><world_position x="8000" y="0" z="0"/></t>
</tiles></tiles>
<vehicles id_counter="6"/>
</scene>
<vehicles><vehicles>
<v id="1" definition_index="0" team_id="1"><transform 30="0" 31="0" 32="0"/></v>
<v id="2" definition_index="0" team_id="2"><transform 30="100" 31="0" 32="0"/></v>
<v id="3" definition_index="0" team_id="2"><transform 30="200" 31="0" 32="0"/></v>
<v id="4" definition_index="59" team_id="1"><transform 30="5" 31="0" 32="5"/></v>
<v id="5" definition_index="4" team_id="0">
<transform 30="50" 31="0" 32="60"/>
<bodies><b><transform 30="51" 31="1" 32="61"/></b></bodies>
<attachments><a attachment_index="1" definition_index="20"><bodies><b><transform 30="50" 31="2" 32="60"/></b></bodies></a></attachments>
</v>
</vehicles></vehicles>
<vehicle_states><vehicle_states>
<v id="1"/>
<v id="2"/>
<v id="3"/>
<v id="4"/>
<v id="5"/>
</vehicle_states></vehicle_states>"#;

fn load() -> SaveGame {
    SaveGame::parse(SAVE, &LoadOptions::default()).unwrap()
}

fn vehicle_ids(save: &SaveGame) -> Vec<i64> {
    save.vehicles()
        .iter()
        .map(|vehicle| vehicle.id(&save.vehicles))
        .collect()
}

fn state_ids(save: &SaveGame) -> Vec<i64> {
    save.vehicle_states()
        .iter()
        .map(|state| state.id(&save.vehicle_states))
        .collect()
}

fn tile_ids(save: &SaveGame) -> Vec<i64> {
    save.tiles().iter().map(|tile| tile.id(&save.scene)).collect()
}

#[test]
fn test_export_is_stable() {
    let mut save = load();
    let first = save.export(&ExportOptions::default()).unwrap();

    let mut reloaded = SaveGame::parse(&first, &LoadOptions::default()).unwrap();
    let second = reloaded.export(&ExportOptions::default()).unwrap();
    assert_eq!(first, second);
    assert!(first.contains(r#"<meta version="2" game_mode="campaign"></meta>"#));
    assert!(first.ends_with("<missiles></missiles>"));
}

#[test]
fn test_chunk_size_does_not_change_result() {
    let mut expected = load();
    let expected = expected.export(&ExportOptions::default()).unwrap();
    for chunk_size in [1, 3, 17, 256, DEFAULT_CHUNK_SIZE] {
        let mut save = SaveGame::parse(SAVE, &LoadOptions { chunk_size }).unwrap();
        let text = save.export(&ExportOptions::default()).unwrap();
        assert_eq!(text, expected, "chunk size {chunk_size}");
    }
}

#[test]
fn test_crlf_input_matches_lf_input() {
    let crlf = SAVE.replace('\n', "\r\n");
    let mut from_crlf = SaveGame::parse(&crlf, &LoadOptions::default()).unwrap();
    let mut from_lf = load();
    assert_eq!(
        from_crlf.export(&ExportOptions::default()).unwrap(),
        from_lf.export(&ExportOptions::default()).unwrap()
    );
}

#[test]
fn test_load_and_save_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("save.xml");
    std::fs::write(&path, SAVE).unwrap();

    let mut save = SaveGame::load(&path, &LoadOptions::default()).unwrap();
    save.new_tile();
    let out = dir.path().join("edited.xml");
    save.save(&out, &ExportOptions::default()).unwrap();

    let edited = SaveGame::load(&out, &LoadOptions::default()).unwrap();
    assert_eq!(tile_ids(&edited), vec![1, 2, 3, 4]);
    assert_eq!(edited.tile_id_counter(), 4);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let result = SaveGame::load(dir.path().join("absent.xml"), &LoadOptions::default());
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn test_tile_ids_stay_dense() {
    let mut save = load();
    save.new_tile();
    save.new_tile();
    assert_eq!(tile_ids(&save), vec![1, 2, 3, 4, 5]);

    save.remove_tile(2).unwrap();
    save.remove_tile(4).unwrap();
    assert_eq!(tile_ids(&save), vec![1, 2, 3]);
    let indices: Vec<i64> = save.tiles().iter().map(|tile| tile.index(&save.scene)).collect();
    assert_eq!(indices, vec![0, 1, 2]);
    assert_eq!(save.tile_id_counter(), 3);
    assert_eq!(save.next_tile_id(), 4);
}

#[test]
fn test_tile_limit_trims_on_export() {
    let mut save = load();
    let text = save.export(&ExportOptions { tile_limit: 2 }).unwrap();
    assert_eq!(tile_ids(&save), vec![1, 2]);
    assert_eq!(save.tile_id_counter(), 2);

    let reloaded = SaveGame::parse(&text, &LoadOptions::default()).unwrap();
    assert_eq!(reloaded.tiles().len(), 2);
}

#[test]
fn test_vehicle_and_state_stay_paired() {
    let mut save = load();
    let seal = save.new_vehicle(VehicleType::Seal).unwrap();
    let seal_id = seal.id(&save.vehicles);
    assert_eq!(seal_id, 7);
    assert_eq!(vehicle_ids(&save), state_ids(&save));

    save.remove_vehicle(3).unwrap();
    save.remove_vehicle(seal_id).unwrap();
    assert_eq!(vehicle_ids(&save), vec![1, 2, 4, 5]);
    assert_eq!(vehicle_ids(&save), state_ids(&save));
    assert_eq!(save.next_vehicle_id(), 8);
}

#[test]
fn test_new_vehicle_state_defaults() {
    let mut save = load();
    let bear = save.new_vehicle(VehicleType::Bear).unwrap().id(&save.vehicles);
    let state = save.vehicle_state(bear).unwrap();
    let (hitpoints, fuel) = state.read_data(&save.vehicle_states, |tree, data| {
        (data.hitpoints(tree), data.internal_fuel_remaining(tree))
    });
    let defaults = carriersave::rules::default_state(VehicleType::Bear);
    assert_eq!(hitpoints, defaults.hitpoints);
    assert_eq!(fuel, defaults.internal_fuel);
}

#[test]
fn test_jetty_cannot_be_removed() {
    let mut save = load();
    assert!(!save.remove_vehicle(4).unwrap());
    assert!(save.vehicle(4).is_ok());
    assert!(save.vehicle_state(4).is_ok());
}

#[test]
fn test_remove_missing_vehicle() {
    let mut save = load();
    assert!(matches!(
        save.remove_vehicle(99),
        Err(Error::VehicleNotFound(99))
    ));
}

#[test]
fn test_team_destroyed_with_last_carrier_only() {
    let mut save = load();

    save.remove_vehicle(2).unwrap();
    assert!(!save.team(2).unwrap().is_destroyed(&save.scene));

    save.remove_vehicle(3).unwrap();
    assert!(save.team(2).unwrap().is_destroyed(&save.scene));
    assert!(!save.team(1).unwrap().is_destroyed(&save.scene));
}

#[test]
fn test_removing_vehicle_removes_matching_spawn() {
    let mut save = load();
    let spawn = save
        .new_spawn(2, VehicleType::Seal, DVec3::new(4000.0, 0.0, 0.0))
        .unwrap();
    let respawn = spawn.respawn_id(&save.scene);
    assert_eq!(respawn, 6);

    // a live vehicle sharing the template id takes the template with it
    let vehicle = save.new_vehicle(VehicleType::Walrus).unwrap();
    vehicle.set_id(&mut save.vehicles, respawn);
    save.vehicle_states()
        .last()
        .unwrap()
        .set_id(&mut save.vehicle_states, respawn);
    save.remove_vehicle(respawn).unwrap();
    assert!(matches!(save.spawn(respawn), Err(Error::SpawnNotFound(6))));
    assert!(save.spawn(5).is_ok());
}

#[test]
fn test_move_vehicle_carries_bodies_and_attachments() {
    let mut save = load();
    save.move_vehicle(5, DVec3::new(150.0, 0.0, 160.0)).unwrap();

    let walrus = save.vehicle(5).unwrap();
    assert_eq!(walrus.location(&save.vehicles), DVec3::new(150.0, 0.0, 160.0));
    let body = walrus.bodies(&mut save.vehicles).items(&save.vehicles)[0];
    assert_eq!(
        body.translation(&save.vehicles),
        DVec3::new(151.0, 1.0, 161.0)
    );
    let gun = walrus.attachment(&save.vehicles, 1).unwrap();
    let gun_body = gun.bodies(&mut save.vehicles).items(&save.vehicles)[0];
    assert_eq!(
        gun_body.translation(&save.vehicles),
        DVec3::new(150.0, 2.0, 160.0)
    );
}

#[test]
fn test_move_tile_carries_spawns() {
    let mut save = load();
    save.move_tile(1, DVec3::new(500.0, 0.0, -500.0)).unwrap();
    let tile = save.tile(1).unwrap();
    assert_eq!(tile.location(&save.scene), DVec3::new(500.0, 0.0, -500.0));
    let spawn = save.spawn(5).unwrap();
    assert_eq!(spawn.location(&save.scene), DVec3::new(510.0, 0.0, -490.0));

    let (owner, _) = save.spawn_tile(5).unwrap();
    assert_eq!(owner.id(&save.scene), 1);
}

#[test]
fn test_tile_control_follows_to_spawns() {
    let mut save = load();
    save.set_tile_team_control(1, 0).unwrap();
    let tile = save.tile(1).unwrap();
    assert_eq!(tile.spawn_data(&mut save.scene).team_id(&save.scene), 0);
    assert!(save.tile_human_controlled(1).unwrap());
    assert!(!save.tile_human_controlled(3).unwrap());
    assert!(save.set_tile_team_control(1, 42).unwrap_err().is_not_found());
}

#[test]
fn test_attachment_capacity_written_to_state() {
    let mut save = load();
    let bear = save.new_vehicle(VehicleType::Bear).unwrap().id(&save.vehicles);
    save.set_attachment(bear, 2, Some(AttachmentKind::Gun120mm))
        .unwrap();

    let record = save.attachment_state(bear, 2).unwrap().unwrap();
    let ammo = record.read_data(&save.vehicle_states, |tree, data| data.ammo(tree));
    assert_eq!(ammo, 20);
    assert_eq!(
        save.attachment(bear, 2).unwrap(),
        Some(AttachmentKind::Gun120mm)
    );
}

#[test]
fn test_turret_without_entry_gets_fallback_ammo() {
    let capacity = attachment_capacity(VehicleType::Swordfish, AttachmentKind::Gun30mm).unwrap();
    assert_eq!(capacity.count, carriersave::rules::FALLBACK_TURRET_AMMO);
}

#[test]
fn test_fuel_tank_fills_both_fuel_fields() {
    let mut save = load();
    let razorbill = save
        .new_vehicle(VehicleType::Razorbill)
        .unwrap()
        .id(&save.vehicles);
    save.set_attachment(razorbill, 1, Some(AttachmentKind::FuelTank))
        .unwrap();

    let record = save.attachment_state(razorbill, 1).unwrap().unwrap();
    let (capacity, remaining) = record.read_data(&save.vehicle_states, |tree, data| {
        (data.fuel_capacity(tree), data.fuel_remaining(tree))
    });
    assert_eq!(capacity, FALLBACK_FUEL_CAPACITY);
    assert_eq!(remaining, FALLBACK_FUEL_CAPACITY);
}

#[test]
fn test_illegal_attachment_leaves_vehicle_untouched() {
    let mut save = load();
    let before = save.export(&ExportOptions::default()).unwrap();
    let err = save
        .set_attachment(5, 1, Some(AttachmentKind::Gun120mm))
        .unwrap_err();
    assert!(matches!(err, Error::IllegalAttachment { slot: 1, .. }));
    assert_eq!(save.export(&ExportOptions::default()).unwrap(), before);
}

#[test]
fn test_human_team_adds_driver_seat() {
    let mut save = load();
    let seal = save.new_vehicle(VehicleType::Seal).unwrap().id(&save.vehicles);
    save.set_vehicle_team(seal, 0).unwrap();
    assert_eq!(
        save.attachment(seal, 0).unwrap(),
        Some(AttachmentKind::DriverSeat)
    );
}

#[test]
fn test_duplicate_keeps_attachments() {
    let mut save = load();
    let copy = save.duplicate_vehicle(5, DVec3::new(0.0, 0.0, 30.0)).unwrap();
    let copy_id = copy.id(&save.vehicles);

    assert_eq!(copy.team_id(&save.vehicles), 0);
    assert_eq!(copy.location(&save.vehicles), DVec3::new(50.0, 0.0, 90.0));
    assert_eq!(
        save.attachment(copy_id, 1).unwrap(),
        Some(AttachmentKind::Gun30mm)
    );
    assert!(save.attachment_state(copy_id, 1).unwrap().is_some());
    assert_eq!(vehicle_ids(&save), state_ids(&save));
}

#[test]
fn test_summary_counts() {
    let save = load();
    let summary = save.summary();
    assert_eq!(summary.tiles.len(), 3);
    assert_eq!(summary.teams.len(), 3);
    assert_eq!(summary.vehicles.len(), 5);
    assert_eq!(summary.spawns.len(), 1);
    assert_eq!(save.find_vehicles_by_type(VehicleType::Carrier).len(), 3);
}

const NESTED_STATES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<meta version="2"/>
<scene>
<tiles id_counter="1"><tiles><t id="1" index="0"/></tiles></tiles>
<vehicles id_counter="2"/>
</scene>
<vehicles><vehicles>
<v id="1" definition_index="2" team_id="1"><transform 30="0" 31="0" 32="0"/></v>
</vehicles><vehicle_states>
<v id="1"/>
</vehicle_states></vehicles>
<missiles></missiles>"#;

#[test]
fn test_nested_vehicle_states_load() {
    let save = SaveGame::parse(NESTED_STATES, &LoadOptions::default()).unwrap();
    assert_eq!(save.state_layout, StateLayout::Nested { position: 1 });
    assert_eq!(vehicle_ids(&save), vec![1]);
    assert_eq!(state_ids(&save), vec![1]);
    assert!(save.vehicle_state(1).is_ok());
    assert!(save.missiles.root().is_some());
}

#[test]
fn test_nested_vehicle_states_edit_and_export() {
    let mut save = SaveGame::parse(NESTED_STATES, &LoadOptions::default()).unwrap();
    let walrus = save.new_vehicle(VehicleType::Walrus).unwrap().id(&save.vehicles);
    assert_eq!(vehicle_ids(&save), state_ids(&save));

    let text = save.export(&ExportOptions::default()).unwrap();
    assert!(text.contains(r#"</vehicles><vehicle_states><v id="1""#));
    assert!(text.contains(&format!(r#"<v id="{walrus}""#)));
    assert!(text.contains("\n<vehicle_states></vehicle_states>\n"));
    assert!(text.ends_with("<missiles></missiles>"));

    let mut reloaded = SaveGame::parse(&text, &LoadOptions::default()).unwrap();
    assert_eq!(reloaded.state_layout, StateLayout::Nested { position: 1 });
    assert_eq!(vehicle_ids(&reloaded), vec![1, walrus]);
    assert_eq!(state_ids(&reloaded), vec![1, walrus]);
    assert_eq!(reloaded.export(&ExportOptions::default()).unwrap(), text);
}

#[test]
fn test_separate_layout_is_default() {
    assert_eq!(load().state_layout, StateLayout::Separate);
}

#[test]
fn test_malformed_later_root_names_that_root() {
    let text = r#"<?xml version="1.0" encoding="UTF-8"?><meta/><scene></scene><vehicles><vehicles><v id="1"></w></vehicles></vehicles>"#;
    match SaveGame::parse(text, &LoadOptions::default()) {
        Err(Error::MalformedDocument { root, .. }) => assert_eq!(root, "vehicles"),
        other => panic!("expected a malformed <vehicles> root, got {other:?}"),
    }
}
