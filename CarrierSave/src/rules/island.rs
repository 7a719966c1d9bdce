//! Island facility categories

use super::definition_enum;

definition_enum! {
    /// What an island's facility produces, stored as `facility/@category`.
    IslandKind, UnknownIslandKind {
        Warehouse = 0,
        SmallMunitions = 1,
        LargeMunitions = 2,
        Turrets = 3,
        Utility = 4,
        SurfaceUnits = 5,
        AirUnits = 6,
        Fuel = 7,
        Barges = 8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(IslandKind::from_index(6).unwrap(), IslandKind::AirUnits);
        assert_eq!(IslandKind::from_name("surface_units").unwrap(), IslandKind::SurfaceUnits);
        assert!(IslandKind::from_index(9).is_err());
    }
}
