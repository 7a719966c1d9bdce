//! Vehicle types

use super::definition_enum;

definition_enum! {
    /// Vehicle chassis, decoded from a vehicle's `definition_index`.
    VehicleType, UnknownVehicleType {
        Carrier = 0,
        Seal = 2,
        Walrus = 4,
        Bear = 6,
        Albatross = 8,
        Manta = 10,
        Razorbill = 12,
        Petrel = 14,
        Barge = 16,
        Turret = 18,
        /// Harbour structure the carrier launches from. Never removable.
        Jetty = 59,
        Lifeboat = 61,
        Needlefish = 79,
        Swordfish = 80,
        Droid = 91,
        Mule = 93,
    }
}

/// Unit types a human team can drive remotely from the carrier.
pub const REMOTE_DRIVEABLE: &[VehicleType] = &[
    VehicleType::Seal,
    VehicleType::Walrus,
    VehicleType::Bear,
    VehicleType::Mule,
    VehicleType::Needlefish,
    VehicleType::Swordfish,
    VehicleType::Droid,
];

impl VehicleType {
    #[must_use]
    pub fn is_carrier(self) -> bool {
        self == VehicleType::Carrier
    }

    /// Whether removing a unit of this type would break the game.
    #[must_use]
    pub fn is_protected(self) -> bool {
        self == VehicleType::Jetty
    }

    #[must_use]
    pub fn is_remote_driveable(self) -> bool {
        REMOTE_DRIVEABLE.contains(&self)
    }

    #[must_use]
    pub fn is_aircraft(self) -> bool {
        matches!(
            self,
            VehicleType::Albatross
                | VehicleType::Manta
                | VehicleType::Razorbill
                | VehicleType::Petrel
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_index_round_trip() {
        for vehicle in VehicleType::ALL {
            assert_eq!(VehicleType::from_index(vehicle.index()).unwrap(), *vehicle);
        }
    }

    #[test]
    fn test_unknown_index_is_an_error() {
        assert!(matches!(
            VehicleType::from_index(3),
            Err(Error::UnknownVehicleType(3))
        ));
    }

    #[test]
    fn test_from_name_ignores_case() {
        assert_eq!("needlefish".parse::<VehicleType>().unwrap(), VehicleType::Needlefish);
        assert!(matches!(
            VehicleType::from_name("hovercraft"),
            Err(Error::UnknownName(_))
        ));
    }

    #[test]
    fn test_classification() {
        assert!(VehicleType::Jetty.is_protected());
        assert!(VehicleType::Bear.is_remote_driveable());
        assert!(!VehicleType::Manta.is_remote_driveable());
        assert!(VehicleType::Manta.is_aircraft());
    }
}
