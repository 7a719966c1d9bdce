//! Shared geometry overlays: points, bounds, transforms and rigid bodies

use glam::{DMat3, DVec3};

use super::{Field, Overlay};
use crate::overlay;
use crate::xml::XmlTree;

const X: Field<f64> = Field::new("x", 0.0);
const Y: Field<f64> = Field::new("y", 0.0);
const Z: Field<f64> = Field::new("z", 0.0);

/// An element holding `x`, `y` and `z` attributes.
pub trait Point: Overlay {
    /// Read the point.
    fn get(&self, tree: &XmlTree) -> DVec3 {
        DVec3::new(
            X.get(tree, self.node()),
            Y.get(tree, self.node()),
            Z.get(tree, self.node()),
        )
    }

    /// Write the point.
    fn set(&self, tree: &mut XmlTree, value: DVec3) {
        X.set(tree, self.node(), value.x);
        Y.set(tree, self.node(), value.y);
        Z.set(tree, self.node(), value.z);
    }

    /// Offset the point.
    fn offset(&self, tree: &mut XmlTree, delta: DVec3) {
        let current = self.get(tree);
        self.set(tree, current + delta);
    }
}

fn point_defaults<P: Point>(point: P, tree: &mut XmlTree) {
    point.set(tree, DVec3::ZERO);
}

overlay!(
    /// Lower corner of a bounding box.
    Min = "min", defaults: point_defaults
);
overlay!(
    /// Upper corner of a bounding box.
    Max = "max", defaults: point_defaults
);
overlay!(
    /// Absolute world position of a tile or spawn.
    WorldPosition = "world_position", defaults: point_defaults
);

impl Point for Min {}
impl Point for Max {}
impl Point for WorldPosition {}

/// Read a point child, treating a missing child as the origin.
pub fn read_point<P: Point>(parent: impl Overlay, tree: &XmlTree) -> DVec3 {
    parent
        .find_child::<P>(tree)
        .map_or(DVec3::ZERO, |point| point.get(tree))
}

overlay!(
    /// Axis-aligned bounding box relative to a tile's world position.
    Bounds = "bounds"
);

impl Bounds {
    /// Lower corner, created if missing.
    pub fn min(&self, tree: &mut XmlTree) -> Min {
        self.child(tree)
    }

    /// Upper corner, created if missing.
    pub fn max(&self, tree: &mut XmlTree) -> Max {
        self.child(tree)
    }

    /// Both corners, reading missing ones as the origin.
    #[must_use]
    pub fn extent(&self, tree: &XmlTree) -> (DVec3, DVec3) {
        (read_point::<Min>(*self, tree), read_point::<Max>(*self, tree))
    }

    /// Replace both corners.
    pub fn set_extent(&self, tree: &mut XmlTree, min: DVec3, max: DVec3) {
        self.min(tree).set(tree, min);
        self.max(tree).set(tree, max);
    }
}

/// Attribute names of the 4x3 affine matrix, row major.
///
/// Rows 0 to 2 hold the orientation basis and row 3 holds the translation.
const MATRIX: [[&str; 3]; 4] = [
    ["00", "01", "02"],
    ["10", "11", "12"],
    ["20", "21", "22"],
    ["30", "31", "32"],
];

fn transform_defaults(transform: Transform, tree: &mut XmlTree) {
    transform.set_orientation(tree, DMat3::IDENTITY);
    transform.set_translation(tree, DVec3::ZERO);
}

overlay!(
    /// Position and orientation of a vehicle or body.
    Transform = "transform", defaults: transform_defaults
);

impl Transform {
    fn cell(&self, tree: &XmlTree, row: usize, col: usize, identity: f64) -> f64 {
        Field::new(MATRIX[row][col], identity).get(tree, self.node())
    }

    fn set_cell(&self, tree: &mut XmlTree, row: usize, col: usize, value: f64) {
        Field::new(MATRIX[row][col], 0.0).set(tree, self.node(), value);
    }

    /// Translation row.
    #[must_use]
    pub fn translation(&self, tree: &XmlTree) -> DVec3 {
        DVec3::new(
            self.cell(tree, 3, 0, 0.0),
            self.cell(tree, 3, 1, 0.0),
            self.cell(tree, 3, 2, 0.0),
        )
    }

    pub fn set_translation(&self, tree: &mut XmlTree, value: DVec3) {
        for (col, component) in value.to_array().into_iter().enumerate() {
            self.set_cell(tree, 3, col, component);
        }
    }

    /// Offset the translation.
    pub fn offset(&self, tree: &mut XmlTree, delta: DVec3) {
        let current = self.translation(tree);
        self.set_translation(tree, current + delta);
    }

    /// Orientation basis. Missing cells read as the identity.
    ///
    /// Stored rows become matrix columns, so the result transforms column
    /// vectors the way the game transforms row vectors.
    #[must_use]
    pub fn orientation(&self, tree: &XmlTree) -> DMat3 {
        let mut rows = [[0.0; 3]; 3];
        for (row, cells) in rows.iter_mut().enumerate() {
            for (col, cell) in cells.iter_mut().enumerate() {
                let identity = if row == col { 1.0 } else { 0.0 };
                *cell = self.cell(tree, row, col, identity);
            }
        }
        DMat3::from_cols_array_2d(&rows)
    }

    pub fn set_orientation(&self, tree: &mut XmlTree, value: DMat3) {
        let rows = value.to_cols_array_2d();
        for (row, cells) in rows.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                self.set_cell(tree, row, col, *cell);
            }
        }
    }
}

/// Read the transform child of an element, treating a missing one as the origin.
pub fn read_translation(parent: impl Overlay, tree: &XmlTree) -> DVec3 {
    parent
        .find_child::<Transform>(tree)
        .map_or(DVec3::ZERO, |transform| transform.translation(tree))
}

overlay!(
    /// One rigid body of a vehicle or attachment.
    Body = "b"
);

impl Body {
    pub fn transform(&self, tree: &mut XmlTree) -> Transform {
        self.child(tree)
    }

    #[must_use]
    pub fn translation(&self, tree: &XmlTree) -> DVec3 {
        read_translation(*self, tree)
    }
}

overlay!(
    /// List of rigid bodies.
    Bodies = "bodies"
);

impl Bodies {
    #[must_use]
    pub fn items(&self, tree: &XmlTree) -> Vec<Body> {
        self.children_of(tree)
    }

    /// Offset every body by the same delta.
    pub fn offset_all(&self, tree: &mut XmlTree, delta: DVec3) {
        for body in self.items(tree) {
            body.transform(tree).offset(tree, delta);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_defaults_and_offset() {
        let mut tree = XmlTree::new();
        let position = WorldPosition::create(&mut tree);
        assert_eq!(tree.attribute(position.node(), "y"), Some("0"));
        position.offset(&mut tree, DVec3::new(1.5, -1.0, 2.0));
        assert_eq!(position.get(&tree), DVec3::new(1.5, -1.0, 2.0));
    }

    #[test]
    fn test_bounds_extent() {
        let mut tree = XmlTree::with_root("t");
        let bounds: Bounds = Bounds::create(&mut tree);
        assert_eq!(bounds.extent(&tree), (DVec3::ZERO, DVec3::ZERO));
        bounds.set_extent(
            &mut tree,
            DVec3::new(-2500.0, 0.0, -2500.0),
            DVec3::new(2500.0, 0.0, 2500.0),
        );
        assert_eq!(bounds.extent(&tree).1.x, 2500.0);
    }

    #[test]
    fn test_transform_identity_by_default() {
        let mut tree = XmlTree::new();
        let transform = Transform::create(&mut tree);
        assert_eq!(tree.attribute(transform.node(), "11"), Some("1"));
        assert_eq!(transform.orientation(&tree), DMat3::IDENTITY);
        assert_eq!(transform.translation(&tree), DVec3::ZERO);
    }

    #[test]
    fn test_transform_reads_sparse_cells() {
        let mut tree = XmlTree::with_root("transform");
        let transform = Transform::wrap(tree.root().unwrap());
        tree.set_attribute(transform.node(), "30", "100");
        tree.set_attribute(transform.node(), "32", "-40.5");
        assert_eq!(
            transform.translation(&tree),
            DVec3::new(100.0, 0.0, -40.5)
        );
        assert_eq!(transform.orientation(&tree), DMat3::IDENTITY);
    }

    #[test]
    fn test_orientation_round_trip() {
        let mut tree = XmlTree::new();
        let transform = Transform::create(&mut tree);
        let turned = DMat3::from_rotation_y(0.5);
        transform.set_orientation(&mut tree, turned);
        assert!(transform.orientation(&tree).abs_diff_eq(turned, 1e-12));
    }

    #[test]
    fn test_bodies_offset_all() {
        let mut tree = XmlTree::with_root("v");
        let root = tree.root().unwrap();
        let bodies = Bodies::create(&mut tree);
        tree.append_child(root, bodies.node());
        for _ in 0..2 {
            let body = Body::create(&mut tree);
            tree.append_child(bodies.node(), body.node());
        }
        bodies.offset_all(&mut tree, DVec3::new(10.0, 0.0, 5.0));
        for body in bodies.items(&tree) {
            assert_eq!(body.translation(&tree), DVec3::new(10.0, 0.0, 5.0));
        }
    }
}
