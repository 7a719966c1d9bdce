//! Error types for `CarrierSave`

use thiserror::Error;

/// The error type for `CarrierSave` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ==================== Document Errors ====================
    /// A root document could not be parsed. The save is considered corrupt.
    #[error("malformed document in <{root}>: {message}")]
    MalformedDocument {
        /// The logical root being parsed when the failure happened.
        root: String,
        /// Description of what is invalid.
        message: String,
    },

    /// A root document started with a different element than expected.
    #[error("unexpected root element: expected <{expected}>, found <{found}>")]
    UnexpectedRoot {
        /// The root tag required at this position of the canonical order.
        expected: String,
        /// The tag actually found.
        found: String,
    },

    /// XML parsing or writing error.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// UTF-8 conversion error.
    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    // ==================== Lookup Errors ====================
    /// No tile with this id exists.
    #[error("no tile with id {0}")]
    TileNotFound(i64),

    /// No vehicle with this id exists.
    #[error("no vehicle with id {0}")]
    VehicleNotFound(i64),

    /// A vehicle exists but its paired state record does not.
    #[error("no vehicle state with id {0}")]
    VehicleStateNotFound(i64),

    /// No team with this id exists.
    #[error("no team with id {0}")]
    TeamNotFound(i64),

    /// No spawn template with this respawn id exists.
    #[error("no spawn with respawn id {0}")]
    SpawnNotFound(i64),

    // ==================== Rule Errors ====================
    /// The definition index does not name a known vehicle type.
    #[error("unknown vehicle type definition index: {0}")]
    UnknownVehicleType(i64),

    /// The definition index does not name a known attachment kind.
    #[error("unknown attachment definition index: {0}")]
    UnknownAttachmentKind(i64),

    /// The facility category does not name a known island kind.
    #[error("unknown island kind: {0}")]
    UnknownIslandKind(i64),

    /// The name does not match any attachment kind or vehicle type.
    #[error("unknown name: {0}")]
    UnknownName(String),

    /// The vehicle type has no attachment slot at this position or with this name.
    #[error("{vehicle} has no attachment slot {slot}")]
    InvalidSlot {
        /// Vehicle type name.
        vehicle: String,
        /// Requested slot position or name.
        slot: String,
    },

    /// The attachment kind may not be fitted to this slot.
    #[error("{kind} cannot be fitted to slot {slot} of {vehicle}")]
    IllegalAttachment {
        /// Vehicle type name.
        vehicle: String,
        /// Slot position.
        slot: u32,
        /// Attachment kind name.
        kind: String,
    },

    // ==================== Serialization / Paths ====================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Could not determine the game's data directory.
    #[error("could not determine the Carrier Command 2 data directory")]
    SaveDirNotFound,
}

impl Error {
    /// Whether this error is a "no such entity" lookup failure.
    ///
    /// Collaborators use this to report a missing entity rather than a corrupt file.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::TileNotFound(_)
                | Error::VehicleNotFound(_)
                | Error::VehicleStateNotFound(_)
                | Error::TeamNotFound(_)
                | Error::SpawnNotFound(_)
        )
    }
}

/// A specialized Result type for `CarrierSave` operations.
pub type Result<T> = std::result::Result<T, Error>;
