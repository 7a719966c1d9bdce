//! Reading and writing whole save files

use std::fs;
use std::path::Path;

use super::{ExportOptions, LoadOptions, RootKind, SaveGame, StateLayout, find};
use crate::error::Result;
use crate::overlay::Overlay;
use crate::xml::{
    EmptyElements, MultiRootParser, NodeId, XML_PROLOG, XmlTree, normalize_line_endings,
    serialize_root,
};

impl SaveGame {
    /// Parse a save from its text.
    ///
    /// Roots are read in canonical order; a root missing from the end of the
    /// input is kept as an empty tree and written back as an empty element.
    /// Vehicle states nested in the vehicles root are accepted in place of the
    /// `vehicle_states` root, see [`StateLayout`].
    ///
    /// # Errors
    /// Returns an error if any root is malformed or out of order.
    pub fn parse(content: &str, options: &LoadOptions) -> Result<Self> {
        let normalized = normalize_line_endings(content);
        let mut parser =
            MultiRootParser::new(normalized.as_bytes()).with_chunk_size(options.chunk_size);

        let mut save = SaveGame::new();
        for kind in RootKind::ALL {
            if kind == RootKind::VehicleStates
                && save.nested_states().is_some()
                && parser.peek_root_tag().is_some_and(|tag| tag != kind.tag())
            {
                tracing::debug!("vehicle states are nested in <vehicles>");
                continue;
            }
            let tree = match parser.next_root(kind.tag())? {
                Some(tree) => tree,
                None => {
                    tracing::debug!("save has no <{}> root", kind.tag());
                    XmlTree::new()
                }
            };
            *save.root_mut(kind) = tree;
        }
        save.extract_nested_states();

        tracing::info!(
            "Loaded save: {} tiles, {} vehicles, {} teams",
            save.tiles().len(),
            save.vehicles().len(),
            save.teams().len()
        );
        Ok(save)
    }

    /// Load a save file from disk.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("reading {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::parse(&content, options)
    }

    /// Render the save as text.
    ///
    /// Tiles past `tile_limit` are removed first, renumbering the rest.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn export(&mut self, options: &ExportOptions) -> Result<String> {
        self.trim_tiles(options.tile_limit);

        let mut output = String::from(XML_PROLOG);
        for kind in RootKind::ALL {
            let text = match (kind, self.state_layout) {
                (RootKind::Vehicles, StateLayout::Nested { position }) => serialize_root(
                    &self.vehicles_with_states(position),
                    kind.tag(),
                    EmptyElements::SelfClosing,
                )?,
                (RootKind::VehicleStates, StateLayout::Nested { .. }) => {
                    serialize_root(&XmlTree::new(), kind.tag(), EmptyElements::SelfClosing)?
                }
                _ => serialize_root(self.root(kind), kind.tag(), EmptyElements::SelfClosing)?,
            };
            output.push('\n');
            output.push_str(&text);
        }
        tracing::info!("Exported save ({} bytes)", output.len());
        Ok(output)
    }

    /// Export and write to `path`.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    pub fn save<P: AsRef<Path>>(&mut self, path: P, options: &ExportOptions) -> Result<()> {
        let text = self.export(options)?;
        fs::write(path.as_ref(), text)?;
        tracing::info!("Wrote {}", path.as_ref().display());
        Ok(())
    }

    /// `vehicles/vehicle_states` of the vehicles root, if present.
    fn nested_states(&self) -> Option<NodeId> {
        find(&self.vehicles, &[RootKind::VehicleStates.tag()])
    }

    /// Move a state list nested in the vehicles root into the states root,
    /// unless the states root already has one.
    fn extract_nested_states(&mut self) {
        if find(&self.vehicle_states, &[RootKind::VehicleStates.tag()]).is_some() {
            return;
        }
        let (Some(vehicles_root), Some(nested)) = (self.vehicles.root(), self.nested_states())
        else {
            return;
        };
        let position = self
            .vehicles
            .children(vehicles_root)
            .iter()
            .position(|child| *child == nested)
            .unwrap_or_default();

        let states_root = self
            .vehicle_states
            .ensure_root(RootKind::VehicleStates.tag());
        let copy = self.vehicle_states.import(&self.vehicles, nested);
        self.vehicle_states.append_child(states_root, copy);
        self.vehicles.detach(nested);
        self.state_layout = StateLayout::Nested { position };
        tracing::debug!("moved nested vehicle states out of <vehicles> (child {position})");
    }

    /// Copy of the vehicles root with the state list put back at `position`.
    fn vehicles_with_states(&self, position: usize) -> XmlTree {
        let mut tree = self.vehicles.clone();
        let root = tree.ensure_root(RootKind::Vehicles.tag());
        if let Some(states) = find(&self.vehicle_states, &[RootKind::VehicleStates.tag()]) {
            let copy = tree.import(&self.vehicle_states, states);
            tree.insert_child(root, position, copy);
        }
        tree
    }

    fn trim_tiles(&mut self, limit: usize) {
        let tiles = self.tiles();
        if tiles.len() <= limit {
            return;
        }
        tracing::warn!(
            "save has {} tiles, removing {} above the limit of {limit}",
            tiles.len(),
            tiles.len() - limit
        );
        for tile in tiles.into_iter().skip(limit) {
            self.scene.detach(tile.node());
        }
        self.renumber_tiles();
    }
}
