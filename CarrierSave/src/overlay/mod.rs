//! Element overlays
//!
//! An overlay is a typed, `Copy` view over one element of an [`XmlTree`]. It
//! holds only the element handle; every accessor borrows the tree for the
//! duration of the call, so overlays are cheap to construct and never cache
//! document state.
//!
//! Overlays are built in one of two ways:
//!
//! - [`Overlay::wrap`] views an existing element.
//! - [`Overlay::create`] allocates a new element with the overlay's tag and
//!   runs [`Overlay::defaults`] to populate it.
//!
//! Required nested structures are obtained through [`Overlay::child`], which
//! returns the first existing child with the right tag or creates and appends
//! one with defaults. Read-only access uses [`Overlay::find_child`] instead and
//! treats a missing child as holding default values.

pub mod field;
pub mod geometry;

pub use field::{Field, FieldValue, SideEffect, TextField};
pub use geometry::{Bodies, Body, Bounds, Max, Min, Point, Transform, WorldPosition};

use crate::xml::{NodeId, XmlTree};
use glam::DVec3;

/// A typed view over an element with a fixed tag.
pub trait Overlay: Copy + Sized {
    /// Tag of the backing element.
    const TAG: &'static str;

    /// View an existing element.
    fn wrap(node: NodeId) -> Self;

    /// Backing element handle.
    fn node(&self) -> NodeId;

    /// Populate a freshly synthesized element.
    fn defaults(&self, _tree: &mut XmlTree) {}

    /// Synthesize a new detached element and populate its defaults.
    fn create(tree: &mut XmlTree) -> Self {
        let overlay = Self::wrap(tree.create_element(Self::TAG));
        overlay.defaults(tree);
        overlay
    }

    /// First child of type `C`, created with defaults if missing.
    fn child<C: Overlay>(&self, tree: &mut XmlTree) -> C {
        get_default_child_by_tag(tree, self.node())
    }

    /// First child of type `C`, if present.
    fn find_child<C: Overlay>(&self, tree: &XmlTree) -> Option<C> {
        tree.find_child(self.node(), C::TAG).map(C::wrap)
    }

    /// All children of type `C` in document order.
    fn children_of<C: Overlay>(&self, tree: &XmlTree) -> Vec<C> {
        tree.children_by_tag(self.node(), C::TAG)
            .map(C::wrap)
            .collect()
    }

    /// Whether the backing element is still reachable from the root.
    fn is_attached(&self, tree: &XmlTree) -> bool {
        tree.is_attached(self.node())
    }
}

/// Return the first child of `parent` tagged `C::TAG`, or create, populate and
/// append one.
pub fn get_default_child_by_tag<C: Overlay>(tree: &mut XmlTree, parent: NodeId) -> C {
    if let Some(existing) = tree.find_child(parent, C::TAG) {
        return C::wrap(existing);
    }
    let added = C::create(tree);
    tree.append_child(parent, added.node());
    added
}

/// An entity with a world location that can be moved.
///
/// World coordinates follow the save's convention: `x` is east, `y` is
/// altitude and `z` is north.
pub trait Positioned {
    /// Current world location.
    fn location(&self, tree: &XmlTree) -> DVec3;

    /// Move to an absolute location, carrying dependent geometry along.
    fn move_to(&self, tree: &mut XmlTree, target: DVec3);

    /// Move by a relative offset.
    fn translate(&self, tree: &mut XmlTree, delta: DVec3) {
        let here = self.location(tree);
        self.move_to(tree, here + delta);
    }
}

/// Declare a `Copy` overlay type over elements tagged `$tag`.
///
/// An optional `defaults: path` names a `fn(Self, &mut XmlTree)` run when a new
/// element is synthesized.
#[macro_export]
macro_rules! overlay {
    ($(#[$meta:meta])* $name:ident = $tag:literal $(, defaults: $defaults:path)?) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name($crate::xml::NodeId);

        impl $crate::overlay::Overlay for $name {
            const TAG: &'static str = $tag;

            fn wrap(node: $crate::xml::NodeId) -> Self {
                Self(node)
            }

            fn node(&self) -> $crate::xml::NodeId {
                self.0
            }

            $(
                fn defaults(&self, tree: &mut $crate::xml::XmlTree) {
                    $defaults(*self, tree);
                }
            )?
        }
    };
}
