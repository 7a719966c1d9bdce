//! Capacity defaults for installed attachments and new vehicles

use serde::Serialize;

use super::attachment::{AttachmentClass, AttachmentKind as K};
use super::vehicle::VehicleType as V;

/// A consumable field of an attachment state blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CapacityField {
    Ammo,
    FuelCapacity,
    FuelRemaining,
}

impl CapacityField {
    /// Attribute name inside the state blob.
    #[must_use]
    pub const fn attribute(self) -> &'static str {
        match self {
            CapacityField::Ammo => "ammo",
            CapacityField::FuelCapacity => "fuel_capacity",
            CapacityField::FuelRemaining => "fuel_remaining",
        }
    }
}

/// Which state fields an attachment starts with, and their value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Capacity {
    pub fields: &'static [CapacityField],
    pub count: f64,
}

const AMMO: &[CapacityField] = &[CapacityField::Ammo];
const FUEL: &[CapacityField] = &[CapacityField::FuelCapacity, CapacityField::FuelRemaining];

const fn ammo(count: f64) -> Capacity {
    Capacity {
        fields: AMMO,
        count,
    }
}

/// Ammunition for a turret-class attachment with no specific entry.
pub const FALLBACK_TURRET_AMMO: f64 = 100.0;

/// Fuel for a fuel-tank-class attachment with no specific entry.
pub const FALLBACK_FUEL_CAPACITY: f64 = 200.0;

/// Curated (vehicle, attachment) entries.
const CAPACITIES: &[(V, K, Capacity)] = &[
    // light ground
    (V::Seal, K::Gun30mm, ammo(250.0)),
    (V::Seal, K::Gun40mm, ammo(120.0)),
    (V::Seal, K::MissileIRLauncher, ammo(4.0)),
    (V::Seal, K::Ciws, ammo(1000.0)),
    (V::Walrus, K::Gun30mm, ammo(250.0)),
    (V::Walrus, K::Gun40mm, ammo(120.0)),
    (V::Walrus, K::MissileIRLauncher, ammo(4.0)),
    (V::Walrus, K::Ciws, ammo(1000.0)),
    // heavy ground
    (V::Bear, K::Gun30mm, ammo(250.0)),
    (V::Bear, K::Gun40mm, ammo(120.0)),
    (V::Bear, K::Gun100mm, ammo(30.0)),
    (V::Bear, K::Gun100mmHeavy, ammo(20.0)),
    (V::Bear, K::Gun120mm, ammo(20.0)),
    (V::Bear, K::MissileAALauncher, ammo(4.0)),
    (V::Bear, K::MissileIRLauncher, ammo(4.0)),
    // ships
    (V::Needlefish, K::ShipGun160mm, ammo(40.0)),
    (V::Needlefish, K::ShipCiws, ammo(1000.0)),
    (V::Needlefish, K::ShipTorpedo, ammo(2.0)),
    (V::Needlefish, K::ShipCruiseMissile, ammo(2.0)),
    (V::Needlefish, K::Gun40mm, ammo(120.0)),
    (V::Swordfish, K::ShipGun160mm, ammo(40.0)),
    (V::Swordfish, K::ShipCiws, ammo(1000.0)),
    (V::Swordfish, K::ShipTorpedo, ammo(4.0)),
    (V::Swordfish, K::ShipCruiseMissile, ammo(4.0)),
    (V::Swordfish, K::Gun40mm, ammo(120.0)),
    // aircraft hardpoints
    (V::Razorbill, K::Gun20mm, ammo(500.0)),
    (V::Razorbill, K::RocketPod, ammo(12.0)),
    (V::Razorbill, K::MissileIR, ammo(1.0)),
    (V::Razorbill, K::MissileAA, ammo(1.0)),
    (V::Razorbill, K::MissileLaser, ammo(1.0)),
    (V::Razorbill, K::Flares, ammo(6.0)),
    (V::Albatross, K::Gun20mm, ammo(500.0)),
    (V::Albatross, K::MissileIR, ammo(1.0)),
    (V::Albatross, K::MissileAA, ammo(1.0)),
    (V::Albatross, K::MissileTV, ammo(1.0)),
    (V::Albatross, K::MissileLaser, ammo(1.0)),
    (V::Albatross, K::Bomb0, ammo(1.0)),
    (V::Albatross, K::Bomb1, ammo(1.0)),
    (V::Albatross, K::Bomb2, ammo(1.0)),
    (V::Albatross, K::Torpedo, ammo(1.0)),
    (V::Petrel, K::Gun20mm, ammo(500.0)),
    (V::Petrel, K::MissileIR, ammo(1.0)),
    (V::Petrel, K::MissileAA, ammo(1.0)),
    (V::Petrel, K::MissileTV, ammo(1.0)),
    (V::Petrel, K::MissileLaser, ammo(1.0)),
    (V::Petrel, K::Bomb0, ammo(1.0)),
    (V::Petrel, K::Bomb1, ammo(1.0)),
    (V::Petrel, K::Bomb2, ammo(1.0)),
    (V::Petrel, K::Torpedo, ammo(1.0)),
    (V::Manta, K::Gun20mm, ammo(500.0)),
    (V::Manta, K::MissileIR, ammo(1.0)),
    (V::Manta, K::MissileAA, ammo(1.0)),
    (V::Manta, K::MissileTV, ammo(1.0)),
    (V::Manta, K::MissileLaser, ammo(1.0)),
    (V::Manta, K::Bomb0, ammo(1.0)),
    (V::Manta, K::Bomb1, ammo(1.0)),
    (V::Manta, K::Bomb2, ammo(1.0)),
    (V::Manta, K::Torpedo, ammo(1.0)),
    (V::Manta, K::Flares, ammo(6.0)),
];

/// Capacity schema for `kind` installed on `vehicle`.
///
/// Curated entries win. Otherwise any turret-class kind gets
/// [`FALLBACK_TURRET_AMMO`] and a fuel tank gets [`FALLBACK_FUEL_CAPACITY`] for
/// both capacity and remaining fuel. Other kinds carry no consumables.
#[must_use]
pub fn attachment_capacity(vehicle: V, kind: K) -> Option<Capacity> {
    let curated = CAPACITIES
        .iter()
        .find(|(v, k, _)| *v == vehicle && *k == kind)
        .map(|(_, _, capacity)| *capacity);
    curated.or_else(|| match kind.class() {
        class if class.is_turret() => Some(ammo(FALLBACK_TURRET_AMMO)),
        AttachmentClass::FuelTank => Some(Capacity {
            fields: FUEL,
            count: FALLBACK_FUEL_CAPACITY,
        }),
        _ => None,
    })
}

/// Initial state of a newly created vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VehicleDefaults {
    pub hitpoints: i64,
    pub internal_fuel: f64,
}

impl Default for VehicleDefaults {
    fn default() -> Self {
        Self {
            hitpoints: 80,
            internal_fuel: 400.0,
        }
    }
}

const fn state(hitpoints: i64, internal_fuel: f64) -> VehicleDefaults {
    VehicleDefaults {
        hitpoints,
        internal_fuel,
    }
}

/// Initial hitpoints and fuel for a vehicle type.
#[must_use]
pub fn default_state(vehicle: V) -> VehicleDefaults {
    match vehicle {
        V::Carrier => state(6000, 100_000.0),
        V::Seal => state(100, 400.0),
        V::Walrus => state(200, 400.0),
        V::Bear => state(400, 600.0),
        V::Albatross => state(60, 200.0),
        V::Manta => state(150, 1000.0),
        V::Razorbill => state(80, 400.0),
        V::Petrel => state(150, 800.0),
        V::Barge => state(300, 1000.0),
        V::Turret => state(200, 0.0),
        V::Needlefish => state(300, 1500.0),
        V::Swordfish => state(600, 2500.0),
        V::Mule => state(200, 600.0),
        V::Droid => state(40, 0.0),
        V::Lifeboat | V::Jetty => VehicleDefaults::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curated_entry_wins() {
        let capacity = attachment_capacity(V::Bear, K::Gun120mm).unwrap();
        assert_eq!(capacity.fields, AMMO);
        assert_eq!(capacity.count, 20.0);
    }

    #[test]
    fn test_turret_fallback() {
        // swordfish has no curated 30mm entry
        let capacity = attachment_capacity(V::Swordfish, K::Gun30mm).unwrap();
        assert_eq!(capacity.fields, AMMO);
        assert_eq!(capacity.count, FALLBACK_TURRET_AMMO);
    }

    #[test]
    fn test_fuel_tank_fallback() {
        let capacity = attachment_capacity(V::Albatross, K::FuelTank).unwrap();
        assert_eq!(
            capacity.fields,
            &[CapacityField::FuelCapacity, CapacityField::FuelRemaining]
        );
        assert_eq!(capacity.count, FALLBACK_FUEL_CAPACITY);
    }

    #[test]
    fn test_no_consumables() {
        assert_eq!(attachment_capacity(V::Seal, K::DriverSeat), None);
        assert_eq!(attachment_capacity(V::Manta, K::Awacs), None);
    }

    #[test]
    fn test_default_state() {
        assert_eq!(default_state(V::Seal).hitpoints, 100);
        assert_eq!(default_state(V::Jetty), VehicleDefaults::default());
    }
}
