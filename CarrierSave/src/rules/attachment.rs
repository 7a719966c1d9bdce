//! Attachment kinds

use super::definition_enum;
use serde::Serialize;

definition_enum! {
    /// Equipment fitted to a vehicle slot, decoded from an attachment's `definition_index`.
    ///
    /// Index 0 means an empty slot and is not a member.
    AttachmentKind, UnknownAttachmentKind {
        Gun30mm = 20,
        Gun40mm = 21,
        Gun100mmHeavy = 22,
        Gun120mm = 23,
        Gun100mm = 24,
        ShipGun160mm = 25,
        Gun20mm = 26,
        RocketPod = 27,
        Bomb0 = 29,
        Bomb1 = 30,
        Bomb2 = 31,
        MissileIR = 32,
        MissileLaser = 33,
        MissileAA = 34,
        Torpedo = 35,
        DriverSeat = 36,
        AirObsCam = 37,
        ObsCam = 38,
        Awacs = 39,
        FuelTank = 40,
        Flares = 41,
        Radar = 42,
        SonicPulse = 43,
        SmokeBomb = 44,
        SmokeTrail = 45,
        MissileIRLauncher = 46,
        MissileAALauncher = 47,
        Ciws = 48,
        ShipCam = 49,
        MissileTV = 50,
        Noisemaker = 51,
        TorpedoCountermeasure = 52,
        SmallCam = 53,
        ShipCiws = 54,
        ShipTorpedo = 55,
        ShipCruiseMissile = 56,
        ShipFlare = 57,
        Refuel = 62,
        RearmIR = 63,
        Rearm20mm = 64,
        Rearm30mm = 65,
        Rearm40mm = 66,
        Rearm100mm = 67,
        Rearm120mm = 68,
        BattleDroids = 69,
    }
}

/// Broad equipment category.
///
/// Spawn templates store this as `attachment_type`, and capacity fallbacks are
/// chosen by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AttachmentClass {
    Seat,
    Turret,
    HeavyTurret,
    ShipWeapon,
    Hardpoint,
    FuelTank,
    Sensor,
    Utility,
    Resupply,
}

impl AttachmentClass {
    /// Value written to a spawn attachment's `attachment_type`.
    #[must_use]
    pub const fn index(self) -> i64 {
        match self {
            AttachmentClass::Seat => 0,
            AttachmentClass::Turret => 1,
            AttachmentClass::HeavyTurret => 2,
            AttachmentClass::ShipWeapon => 3,
            AttachmentClass::Hardpoint => 4,
            AttachmentClass::FuelTank => 5,
            AttachmentClass::Sensor => 6,
            AttachmentClass::Utility => 7,
            AttachmentClass::Resupply => 8,
        }
    }

    /// Classes that fire ammunition from a turret mount.
    #[must_use]
    pub const fn is_turret(self) -> bool {
        matches!(
            self,
            AttachmentClass::Turret | AttachmentClass::HeavyTurret | AttachmentClass::ShipWeapon
        )
    }
}

impl AttachmentKind {
    #[must_use]
    pub const fn class(self) -> AttachmentClass {
        use AttachmentKind as K;
        match self {
            K::DriverSeat => AttachmentClass::Seat,
            K::Gun30mm | K::Gun40mm | K::Ciws | K::MissileIRLauncher => AttachmentClass::Turret,
            K::Gun100mm | K::Gun100mmHeavy | K::Gun120mm | K::MissileAALauncher => {
                AttachmentClass::HeavyTurret
            }
            K::ShipGun160mm
            | K::ShipCiws
            | K::ShipTorpedo
            | K::ShipCruiseMissile
            | K::ShipFlare => AttachmentClass::ShipWeapon,
            K::Gun20mm
            | K::RocketPod
            | K::Bomb0
            | K::Bomb1
            | K::Bomb2
            | K::MissileIR
            | K::MissileLaser
            | K::MissileAA
            | K::MissileTV
            | K::Torpedo
            | K::Noisemaker
            | K::TorpedoCountermeasure => AttachmentClass::Hardpoint,
            K::FuelTank => AttachmentClass::FuelTank,
            K::AirObsCam | K::ObsCam | K::Awacs | K::Radar | K::ShipCam | K::SmallCam => {
                AttachmentClass::Sensor
            }
            K::Flares | K::SonicPulse | K::SmokeBomb | K::SmokeTrail => AttachmentClass::Utility,
            K::Refuel
            | K::RearmIR
            | K::Rearm20mm
            | K::Rearm30mm
            | K::Rearm40mm
            | K::Rearm100mm
            | K::Rearm120mm
            | K::BattleDroids => AttachmentClass::Resupply,
        }
    }

    /// Decode a slot's `definition_index`, where 0 means empty.
    ///
    /// # Errors
    /// Returns an error if the index is non-zero and unknown.
    pub fn from_slot_index(index: i64) -> crate::error::Result<Option<Self>> {
        if index <= 0 {
            Ok(None)
        } else {
            Self::from_index(index).map(Some)
        }
    }
}

/// `attachment_type` category for a spawn template attachment.
#[must_use]
pub fn spawn_attachment_type(kind: AttachmentKind) -> i64 {
    kind.class().index()
}
