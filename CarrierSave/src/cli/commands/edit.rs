//! CLI commands that modify a save

use std::time::Instant;

use glam::DVec3;

use super::{OutputArgs, SaveArgs};
use crate::cli::progress::{DISK, GEAR, LOOKING_GLASS, print_done, print_step};
use crate::overlay::Positioned;
use crate::rules::{AttachmentKind, VehicleType, slot_by_name};
use crate::save::{ExportOptions, SaveGame};
use crate::slots::expand_path;

/// Load, apply `change`, and write the result. `change` returns a line
/// describing what it did.
fn edit(
    save_args: &SaveArgs,
    output: &OutputArgs,
    change: impl FnOnce(&mut SaveGame) -> anyhow::Result<String>,
) -> anyhow::Result<()> {
    let start = Instant::now();

    print_step(1, 3, LOOKING_GLASS, "Reading save...");
    let mut save = save_args.load()?;

    print_step(2, 3, GEAR, "Editing...");
    let message = change(&mut save)?;
    println!("  {message}");

    let target = output
        .output
        .as_deref()
        .map_or_else(|| save_args.path(), expand_path);
    print_step(3, 3, DISK, &format!("Writing {}...", target.display()));
    save.save(
        &target,
        &ExportOptions {
            tile_limit: output.tile_limit,
        },
    )?;

    print_done(start.elapsed());
    Ok(())
}

pub fn add_tile(
    args: &SaveArgs,
    output: &OutputArgs,
    x: f64,
    z: f64,
    radius: Option<f64>,
) -> anyhow::Result<()> {
    edit(args, output, |save| {
        let tile = save.new_tile();
        let id = tile.id(&save.scene);
        save.translate_tile(id, DVec3::new(x, 0.0, z))?;
        let mut message = format!("Added tile {id}");
        if let Some(radius) = radius {
            match tile.set_island_radius(&mut save.scene, radius) {
                Some(applied) => message.push_str(&format!(" with radius {applied}")),
                None => message.push_str(" (radius too small, kept default)"),
            }
        }
        Ok(message)
    })
}

pub fn move_tile(
    args: &SaveArgs,
    output: &OutputArgs,
    id: i64,
    x: f64,
    z: f64,
) -> anyhow::Result<()> {
    edit(args, output, |save| {
        let tile = save.tile(id)?;
        let altitude = tile.location(&save.scene).y;
        save.move_tile(id, DVec3::new(x, altitude, z))?;
        Ok(format!("Moved tile {id} to ({x}, {z})"))
    })
}

pub fn remove_tile(args: &SaveArgs, output: &OutputArgs, id: i64) -> anyhow::Result<()> {
    edit(args, output, |save| {
        save.remove_tile(id)?;
        Ok(format!("Removed tile {id}, {} remain", save.tiles().len()))
    })
}

pub fn add_vehicle(
    args: &SaveArgs,
    output: &OutputArgs,
    vehicle_type: VehicleType,
    team: Option<i64>,
    x: f64,
    z: f64,
) -> anyhow::Result<()> {
    edit(args, output, |save| {
        let vehicle = save.new_vehicle(vehicle_type)?;
        let id = vehicle.id(&save.vehicles);
        save.translate_vehicle(id, DVec3::new(x, 0.0, z))?;
        if let Some(team) = team {
            save.set_vehicle_team(id, team)?;
        }
        Ok(format!("Added {vehicle_type} {id}"))
    })
}

pub fn move_vehicle(
    args: &SaveArgs,
    output: &OutputArgs,
    id: i64,
    target: DVec3,
) -> anyhow::Result<()> {
    edit(args, output, |save| {
        save.move_vehicle(id, target)?;
        Ok(format!("Moved vehicle {id} to {target}"))
    })
}

pub fn remove_vehicle(args: &SaveArgs, output: &OutputArgs, id: i64) -> anyhow::Result<()> {
    edit(args, output, |save| {
        if save.remove_vehicle(id)? {
            Ok(format!("Removed vehicle {id}"))
        } else {
            Ok(format!("Vehicle {id} is protected and was kept"))
        }
    })
}

pub fn set_attachment(
    args: &SaveArgs,
    output: &OutputArgs,
    id: i64,
    slot: &str,
    attachment: Option<AttachmentKind>,
) -> anyhow::Result<()> {
    edit(args, output, |save| {
        let vehicle_type = save.vehicle(id)?.vehicle_type(&save.vehicles)?;
        let position = match slot.parse::<u32>() {
            Ok(position) => position,
            Err(_) => slot_by_name(vehicle_type, slot)?.position,
        };
        save.set_attachment(id, position, attachment)?;
        Ok(match attachment {
            Some(kind) => format!("Fitted {kind} to slot {position} of vehicle {id}"),
            None => format!("Cleared slot {position} of vehicle {id}"),
        })
    })
}

pub fn set_team(args: &SaveArgs, output: &OutputArgs, id: i64, team: i64) -> anyhow::Result<()> {
    edit(args, output, |save| {
        save.set_vehicle_team(id, team)?;
        Ok(format!("Vehicle {id} now belongs to team {team}"))
    })
}

pub fn roundtrip(args: &SaveArgs, output: &OutputArgs) -> anyhow::Result<()> {
    edit(args, output, |save| {
        Ok(format!(
            "{} tiles, {} vehicles",
            save.tiles().len(),
            save.vehicles().len()
        ))
    })
}
