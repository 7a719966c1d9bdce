//! Attachment rules and capacity tables
//!
//! Static game data consulted whenever the entity graph installs equipment:
//!
//! - [`VehicleType`] and [`AttachmentKind`] decode `definition_index` values.
//!   Unknown indices are lookup failures, never coerced.
//! - [`layout`] maps each vehicle type to its ordered, named slots and the
//!   attachment kinds legal in each.
//! - [`capacity`] maps (vehicle type, attachment kind) to the consumable fields
//!   an installed attachment starts with, and each vehicle type to its initial
//!   state.

pub mod attachment;
pub mod capacity;
pub mod island;
pub mod layout;
pub mod vehicle;

pub use attachment::{AttachmentClass, AttachmentKind, spawn_attachment_type};
pub use capacity::{
    Capacity, CapacityField, FALLBACK_FUEL_CAPACITY, FALLBACK_TURRET_AMMO, VehicleDefaults,
    attachment_capacity, default_state,
};
pub use island::IslandKind;
pub use layout::{SlotDef, slot_by_name, slot_choices, slot_layout, validate_attachment};
pub use vehicle::{REMOTE_DRIVEABLE, VehicleType};

/// Declare a game enumeration keyed by a numeric definition index.
///
/// Generates `ALL`, `index`, `from_index`, `name`, `from_name`, `Display` and
/// `FromStr`. Name matching ignores ASCII case and underscores.
macro_rules! definition_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $unknown:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $value:literal, )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )*
        }

        impl $name {
            /// Every member in declaration order.
            pub const ALL: &'static [$name] = &[ $( $name::$variant, )* ];

            /// Definition index stored in the save.
            #[must_use]
            pub const fn index(self) -> i64 {
                match self {
                    $( $name::$variant => $value, )*
                }
            }

            /// Decode a definition index.
            ///
            /// # Errors
            /// Returns an error if the index is not a known member.
            pub fn from_index(index: i64) -> $crate::error::Result<Self> {
                match index {
                    $( $value => Ok($name::$variant), )*
                    other => Err($crate::error::Error::$unknown(other)),
                }
            }

            /// Display name.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $( $name::$variant => stringify!($variant), )*
                }
            }

            /// Look a member up by name.
            ///
            /// # Errors
            /// Returns [`Error::UnknownName`](crate::error::Error::UnknownName) if nothing matches.
            pub fn from_name(name: &str) -> $crate::error::Result<Self> {
                let wanted = $crate::rules::normalize_name(name);
                Self::ALL
                    .iter()
                    .copied()
                    .find(|member| $crate::rules::normalize_name(member.name()) == wanted)
                    .ok_or_else(|| $crate::error::Error::UnknownName(name.to_string()))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.name())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::error::Error;

            fn from_str(s: &str) -> $crate::error::Result<Self> {
                Self::from_name(s)
            }
        }
    };
}

pub(crate) use definition_enum;

pub(crate) fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_' && *c != '-' && !c.is_whitespace())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
