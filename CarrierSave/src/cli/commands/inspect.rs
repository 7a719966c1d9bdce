//! Read-only CLI commands: listings, slots and rule tables

use serde::Serialize;

use super::SaveArgs;
use crate::cli::progress::print_heading;
use crate::rules::{SlotDef, VehicleType, slot_layout};
use crate::slots::{expand_path, game_data_dir, read_save_slots};

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn format_position(position: [f64; 3]) -> String {
    format!(
        "({:.0}, {:.0}, {:.0})",
        position[0], position[1], position[2]
    )
}

fn type_name<T: std::fmt::Display>(value: Option<T>, index: i64) -> String {
    value.map_or_else(|| format!("#{index}"), |value| value.to_string())
}

pub fn info(args: &SaveArgs, json: bool) -> anyhow::Result<()> {
    let save = args.load()?;
    let summary = save.summary();
    if json {
        return print_json(&summary);
    }

    print_heading(&args.path().display().to_string());
    println!("Tiles:    {}", summary.tiles.len());
    println!("Teams:    {}", summary.teams.len());
    println!("Vehicles: {}", summary.vehicles.len());
    println!("Spawns:   {}", summary.spawns.len());
    for team in &summary.teams {
        let owned = summary
            .vehicles
            .iter()
            .filter(|vehicle| vehicle.team_id == team.id)
            .count();
        let controlled = summary
            .tiles
            .iter()
            .filter(|tile| tile.team_control == team.id)
            .count();
        println!(
            "  team {:>2}: {owned} vehicles, {controlled} islands{}",
            team.id,
            if team.is_destroyed { " (destroyed)" } else { "" }
        );
    }
    Ok(())
}

pub fn tiles(args: &SaveArgs, json: bool) -> anyhow::Result<()> {
    let save = args.load()?;
    let tiles = save.tile_summaries();
    if json {
        return print_json(&tiles);
    }

    println!("{} tiles", tiles.len());
    for tile in &tiles {
        let kind = tile
            .island_kind
            .map_or_else(|| "?".to_string(), |kind| kind.to_string());
        println!(
            "{:>4}  team {:>2}  {:<14} r={:<5.0} {}",
            tile.id,
            tile.team_control,
            kind,
            tile.island_radius,
            format_position(tile.position)
        );
    }
    Ok(())
}

pub fn vehicles(
    args: &SaveArgs,
    vehicle_type: Option<VehicleType>,
    json: bool,
) -> anyhow::Result<()> {
    let save = args.load()?;
    let vehicles: Vec<_> = save
        .vehicle_summaries()
        .into_iter()
        .filter(|vehicle| vehicle_type.is_none_or(|wanted| vehicle.vehicle_type == Some(wanted)))
        .collect();
    if json {
        return print_json(&vehicles);
    }

    println!("{} vehicles", vehicles.len());
    for vehicle in &vehicles {
        println!(
            "{:>5}  team {:>2}  {:<10} {}",
            vehicle.id,
            vehicle.team_id,
            type_name(vehicle.vehicle_type, vehicle.definition_index),
            format_position(vehicle.position)
        );
        for attachment in &vehicle.attachments {
            println!(
                "         [{}] {}",
                attachment.slot,
                type_name(attachment.kind, attachment.definition_index)
            );
        }
    }
    Ok(())
}

pub fn teams(args: &SaveArgs, json: bool) -> anyhow::Result<()> {
    let save = args.load()?;
    let teams = save.team_summaries();
    if json {
        return print_json(&teams);
    }

    for team in &teams {
        let control = if team.human_controlled {
            "human"
        } else if team.is_neutral {
            "neutral"
        } else {
            "ai"
        };
        println!(
            "{:>3}  {:<8} currency {:>7}{}",
            team.id,
            control,
            team.currency,
            if team.is_destroyed { "  destroyed" } else { "" }
        );
    }
    Ok(())
}

pub fn spawns(args: &SaveArgs, json: bool) -> anyhow::Result<()> {
    let save = args.load()?;
    let spawns = save.spawn_summaries();
    if json {
        return print_json(&spawns);
    }

    println!("{} spawns", spawns.len());
    for spawn in &spawns {
        println!(
            "{:>5}  tile {:>3}  {:<10} {}",
            spawn.respawn_id,
            spawn.tile_id,
            type_name(spawn.vehicle_type, spawn.definition_index),
            format_position(spawn.position)
        );
    }
    Ok(())
}

pub fn slots(dir: Option<&str>, json: bool) -> anyhow::Result<()> {
    let dir = match dir {
        Some(dir) => expand_path(dir),
        None => game_data_dir()?,
    };
    let slots = read_save_slots(&dir)?;
    if json {
        return print_json(&slots);
    }

    for slot in &slots {
        println!(
            "{:<24} {}",
            slot.display_name,
            slot.save_path(&dir).display()
        );
    }
    Ok(())
}

#[derive(Serialize)]
struct RulesOutput {
    vehicle: VehicleType,
    slots: &'static [SlotDef],
}

pub fn rules(vehicle_type: VehicleType, json: bool) -> anyhow::Result<()> {
    let slots = slot_layout(vehicle_type);
    if json {
        return print_json(&RulesOutput {
            vehicle: vehicle_type,
            slots,
        });
    }

    print_heading(&format!("{vehicle_type} (definition {})", vehicle_type.index()));
    if slots.is_empty() {
        println!("No editable attachment slots");
    }
    for slot in slots {
        let choices: Vec<&str> = slot.choices.iter().map(|kind| kind.name()).collect();
        println!("{:>2} {:<8} {}", slot.position, slot.name, choices.join(", "));
    }
    Ok(())
}
