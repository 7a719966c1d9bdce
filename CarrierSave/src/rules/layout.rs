//! Per-vehicle slot layouts
//!
//! Every vehicle type has an ordered list of named slots. Slot 0 is always the
//! driver seat. Each slot lists the attachment kinds the game accepts there;
//! the lists are what choice menus offer and what installation validates
//! against. Vehicle types without a layout (carrier, jetty, turret, ...) have
//! no editable slots.

use serde::Serialize;

use super::attachment::AttachmentKind as K;
use super::vehicle::VehicleType;
use crate::error::{Error, Result};

/// One attachment position on a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotDef {
    /// Name used by editors, e.g. `turret` or `wing0`.
    pub name: &'static str,
    /// `attachment_index` of the slot.
    pub position: u32,
    /// Legal attachment kinds.
    pub choices: &'static [K],
}

const fn slot(name: &'static str, position: u32, choices: &'static [K]) -> SlotDef {
    SlotDef {
        name,
        position,
        choices,
    }
}

// ==================== Choice Groups ====================

const DRIVER: &[K] = &[K::DriverSeat];

const SMALL_GROUND_TURRETS: &[K] = &[
    K::Ciws,
    K::Gun30mm,
    K::Gun40mm,
    K::Radar,
    K::ObsCam,
    K::MissileIRLauncher,
];

/// Small and large ground turrets; the bear takes either.
const GROUND_TURRETS: &[K] = &[
    K::Ciws,
    K::Gun30mm,
    K::Gun40mm,
    K::Radar,
    K::ObsCam,
    K::MissileIRLauncher,
    K::Gun100mm,
    K::Gun100mmHeavy,
    K::Gun120mm,
    K::MissileAALauncher,
];

const SMALL_GROUND_AUX: &[K] = &[
    K::SmallCam,
    K::SmokeBomb,
    K::SonicPulse,
    K::SmokeTrail,
    K::Flares,
];

const SMALL_AIR_AUX: &[K] = &[K::SmokeBomb, K::SonicPulse, K::SmokeTrail, K::Flares];

const SHIP_ATTACHMENTS: &[K] = &[
    K::ShipCam,
    K::ShipCiws,
    K::ShipTorpedo,
    K::ShipGun160mm,
    K::MissileAALauncher,
    K::ShipCruiseMissile,
    K::ShipFlare,
    K::Flares,
    K::Awacs,
    K::MissileIRLauncher,
    K::SmokeTrail,
    K::RocketPod,
    K::Gun100mm,
    K::Gun100mmHeavy,
    K::Gun40mm,
    K::Gun30mm,
    K::MissileLaser,
];

const HARDPOINT_ATTACHMENTS: &[K] = &[
    K::Gun20mm,
    K::MissileIR,
    K::MissileAA,
    K::MissileTV,
    K::MissileLaser,
    K::Torpedo,
    K::TorpedoCountermeasure,
    K::Noisemaker,
    K::Bomb0,
    K::Bomb1,
    K::Bomb2,
    K::FuelTank,
];

const GROUND_RESUPPLY: &[K] = &[
    K::Refuel,
    K::RearmIR,
    K::Rearm20mm,
    K::Rearm30mm,
    K::Rearm40mm,
    K::Rearm100mm,
    K::Rearm120mm,
    K::BattleDroids,
];

// ==================== Layouts ====================

const BARGE: &[SlotDef] = &[slot("driver", 0, DRIVER)];

const LIGHT_GROUND: &[SlotDef] = &[
    slot("driver", 0, DRIVER),
    slot("turret", 1, SMALL_GROUND_TURRETS),
    slot("aux0", 2, SMALL_GROUND_AUX),
    slot("aux1", 3, SMALL_GROUND_AUX),
];

const BEAR: &[SlotDef] = &[
    slot("driver", 0, DRIVER),
    slot("aux1", 1, SMALL_GROUND_AUX),
    slot("turret", 2, GROUND_TURRETS),
    slot("aux0", 3, SMALL_GROUND_AUX),
];

const MULE: &[SlotDef] = &[
    slot("driver", 0, DRIVER),
    slot("bay0", 1, GROUND_RESUPPLY),
    slot("bay1", 2, GROUND_RESUPPLY),
    slot("bay2", 3, GROUND_RESUPPLY),
    slot("bay3", 4, GROUND_RESUPPLY),
    slot("bay4", 5, GROUND_RESUPPLY),
    slot("bay5", 6, GROUND_RESUPPLY),
];

const NEEDLEFISH: &[SlotDef] = &[
    slot("driver", 0, DRIVER),
    slot("deck0", 1, SHIP_ATTACHMENTS),
    slot("deck1", 2, SHIP_ATTACHMENTS),
];

const SWORDFISH: &[SlotDef] = &[
    slot("driver", 0, DRIVER),
    slot("deck0", 1, SHIP_ATTACHMENTS),
    slot("deck1", 2, SHIP_ATTACHMENTS),
    slot("deck2", 3, SHIP_ATTACHMENTS),
    slot("deck3", 4, SHIP_ATTACHMENTS),
];

const RAZORBILL: &[SlotDef] = &[
    slot("driver", 0, DRIVER),
    slot("wing0", 1, HARDPOINT_ATTACHMENTS),
    slot("wing1", 2, HARDPOINT_ATTACHMENTS),
    slot("aux0", 3, SMALL_AIR_AUX),
    slot("aux1", 4, SMALL_AIR_AUX),
];

// wing order along the airframe is 0, 3, 1, 2
const WINGED: &[SlotDef] = &[
    slot("driver", 0, DRIVER),
    slot("turret", 1, &[K::AirObsCam]),
    slot("wing0", 2, HARDPOINT_ATTACHMENTS),
    slot("wing3", 3, HARDPOINT_ATTACHMENTS),
    slot("wing1", 4, HARDPOINT_ATTACHMENTS),
    slot("wing2", 5, HARDPOINT_ATTACHMENTS),
];

const MANTA: &[SlotDef] = &[
    slot("driver", 0, DRIVER),
    slot("turret", 1, &[K::AirObsCam]),
    slot("wing0", 2, HARDPOINT_ATTACHMENTS),
    slot("wing3", 3, HARDPOINT_ATTACHMENTS),
    slot("wing1", 4, HARDPOINT_ATTACHMENTS),
    slot("wing2", 5, HARDPOINT_ATTACHMENTS),
    slot("payload", 6, &[K::Awacs]),
    slot("aux0", 7, SMALL_AIR_AUX),
    slot("aux1", 8, SMALL_AIR_AUX),
];

/// Ordered slots of a vehicle type. Empty for types with no editable equipment.
#[must_use]
pub fn slot_layout(vehicle: VehicleType) -> &'static [SlotDef] {
    match vehicle {
        VehicleType::Barge => BARGE,
        VehicleType::Seal | VehicleType::Walrus => LIGHT_GROUND,
        VehicleType::Bear => BEAR,
        VehicleType::Mule => MULE,
        VehicleType::Needlefish => NEEDLEFISH,
        VehicleType::Swordfish => SWORDFISH,
        VehicleType::Razorbill => RAZORBILL,
        VehicleType::Albatross | VehicleType::Petrel => WINGED,
        VehicleType::Manta => MANTA,
        VehicleType::Carrier
        | VehicleType::Turret
        | VehicleType::Jetty
        | VehicleType::Lifeboat
        | VehicleType::Droid => &[],
    }
}

/// Legal choices at a slot position, or `None` if the vehicle has no such slot.
#[must_use]
pub fn slot_choices(vehicle: VehicleType, position: u32) -> Option<&'static [K]> {
    slot_layout(vehicle)
        .iter()
        .find(|slot| slot.position == position)
        .map(|slot| slot.choices)
}

/// Resolve a slot by editor name (`turret`, `wing1`, ...) or by numeric position.
///
/// # Errors
/// Returns [`Error::InvalidSlot`] if the vehicle has no such slot.
pub fn slot_by_name(vehicle: VehicleType, name: &str) -> Result<SlotDef> {
    let layout = slot_layout(vehicle);
    let by_position = name
        .parse::<u32>()
        .ok()
        .and_then(|position| layout.iter().find(|slot| slot.position == position));
    by_position
        .or_else(|| layout.iter().find(|slot| slot.name.eq_ignore_ascii_case(name)))
        .copied()
        .ok_or_else(|| Error::InvalidSlot {
            vehicle: vehicle.name().to_string(),
            slot: name.to_string(),
        })
}

/// Check that `kind` may be fitted at `position` on `vehicle`.
///
/// # Errors
/// Returns [`Error::InvalidSlot`] for a missing slot and
/// [`Error::IllegalAttachment`] for a kind the slot does not accept.
pub fn validate_attachment(vehicle: VehicleType, position: u32, kind: K) -> Result<()> {
    let choices = slot_choices(vehicle, position).ok_or_else(|| Error::InvalidSlot {
        vehicle: vehicle.name().to_string(),
        slot: position.to_string(),
    })?;
    if choices.contains(&kind) {
        Ok(())
    } else {
        Err(Error::IllegalAttachment {
            vehicle: vehicle.name().to_string(),
            slot: position,
            kind: kind.name().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_layout_starts_with_driver() {
        for vehicle in VehicleType::ALL {
            let layout = slot_layout(*vehicle);
            if let Some(first) = layout.first() {
                assert_eq!(first.position, 0);
                assert_eq!(first.choices, DRIVER);
            }
            for (i, slot) in layout.iter().enumerate() {
                assert_eq!(slot.position as usize, i, "{vehicle} slot {}", slot.name);
            }
        }
    }

    #[test]
    fn test_named_slots() {
        let wing3 = slot_by_name(VehicleType::Albatross, "wing3").unwrap();
        assert_eq!(wing3.position, 3);
        let payload = slot_by_name(VehicleType::Manta, "PAYLOAD").unwrap();
        assert_eq!(payload.choices, &[K::Awacs]);
        assert_eq!(slot_by_name(VehicleType::Bear, "2").unwrap().name, "turret");
        assert!(matches!(
            slot_by_name(VehicleType::Seal, "wing0"),
            Err(Error::InvalidSlot { .. })
        ));
    }

    #[test]
    fn test_bear_takes_heavy_turrets() {
        assert!(validate_attachment(VehicleType::Bear, 2, K::Gun120mm).is_ok());
        assert!(matches!(
            validate_attachment(VehicleType::Seal, 1, K::Gun120mm),
            Err(Error::IllegalAttachment { slot: 1, .. })
        ));
    }

    #[test]
    fn test_no_layout() {
        assert!(slot_layout(VehicleType::Carrier).is_empty());
        assert_eq!(slot_choices(VehicleType::Carrier, 0), None);
    }
}
