//! Save slot discovery
//!
//! The game lists its save slots in `persistent_data.xml` inside its data
//! directory; each slot's save lives at `saved_games/<save_name>/save.xml`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{Error, Result};
use crate::overlay::TextField;
use crate::xml::parse_document;

/// Name of the game's data directory.
pub const GAME_DIR_NAME: &str = "Carrier Command 2";
/// Slot listing inside the data directory.
pub const PERSISTENT_FILE: &str = "persistent_data.xml";

const SAVE_NAME: TextField = TextField::new("save_name", "");
const DISPLAY_NAME: TextField = TextField::new("display_name", "");

/// One entry of the slot listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveSlot {
    /// Directory name under `saved_games`.
    pub save_name: String,
    /// Name shown in the game's menu.
    pub display_name: String,
}

impl SaveSlot {
    /// Path of this slot's save file under `game_dir`.
    #[must_use]
    pub fn save_path(&self, game_dir: &Path) -> PathBuf {
        game_dir
            .join("saved_games")
            .join(&self.save_name)
            .join("save.xml")
    }
}

/// The game's data directory for the current user.
///
/// # Errors
/// Returns [`Error::SaveDirNotFound`] if the platform has no config directory.
pub fn game_data_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(GAME_DIR_NAME))
        .ok_or(Error::SaveDirNotFound)
}

/// Expand `~` and environment variables in a user-supplied path.
#[must_use]
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::full(path).map_or_else(|_| path.to_string(), |p| p.into_owned()))
}

/// Parse a slot listing. Entries without a `save_name` are skipped.
///
/// # Errors
/// Returns an error if the listing is not valid XML.
pub fn parse_save_slots(content: &str) -> Result<Vec<SaveSlot>> {
    let tree = parse_document(content)?;
    let Some(root) = tree.root() else {
        return Ok(Vec::new());
    };
    Ok(tree
        .children(root)
        .iter()
        .filter_map(|&node| {
            let save_name = SAVE_NAME.get(&tree, node);
            (!save_name.is_empty()).then(|| SaveSlot {
                save_name: save_name.to_string(),
                display_name: DISPLAY_NAME.get(&tree, node).to_string(),
            })
        })
        .collect())
}

/// Read the slot listing of the game data directory `game_dir`.
///
/// # Errors
/// Returns an error if the listing cannot be read or parsed.
pub fn read_save_slots(game_dir: &Path) -> Result<Vec<SaveSlot>> {
    let path = game_dir.join(PERSISTENT_FILE);
    tracing::debug!("reading save slots from {}", path.display());
    let content = fs::read_to_string(&path)?;
    parse_save_slots(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<data>
    <slot save_name="slot_0" display_name="Campaign"/>
    <slot display_name="Empty"/>
    <slot save_name="slot_2" display_name="Scratch"/>
</data>"#;

    #[test]
    fn test_parse_slots() {
        let slots = parse_save_slots(LISTING).unwrap();
        assert_eq!(
            slots,
            vec![
                SaveSlot {
                    save_name: "slot_0".into(),
                    display_name: "Campaign".into()
                },
                SaveSlot {
                    save_name: "slot_2".into(),
                    display_name: "Scratch".into()
                },
            ]
        );
    }

    #[test]
    fn test_save_path() {
        let slot = SaveSlot {
            save_name: "slot_0".into(),
            display_name: String::new(),
        };
        assert_eq!(
            slot.save_path(Path::new("/games/cc2")),
            PathBuf::from("/games/cc2/saved_games/slot_0/save.xml")
        );
    }

    #[test]
    fn test_read_slots_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(PERSISTENT_FILE), LISTING).unwrap();
        assert_eq!(read_save_slots(dir.path()).unwrap().len(), 2);
        assert!(read_save_slots(&dir.path().join("missing")).is_err());
    }
}
