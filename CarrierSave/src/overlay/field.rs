//! Typed attribute fields
//!
//! A [`Field`] names one attribute on a backing element and reads or writes it
//! as a typed value. Absent attributes read as the field default. Present but
//! unparseable values also read as the default, with a warning, so a single bad
//! value never prevents a save from loading.

use crate::xml::{NodeId, XmlTree};

/// Callback fired after a successful write through a [`Field`].
pub type SideEffect = fn(&mut XmlTree, NodeId);

/// A value that can live in an attribute.
pub trait FieldValue: Copy + std::fmt::Debug {
    /// Parse the raw attribute text.
    fn parse(raw: &str) -> Option<Self>;

    /// Render the value back to attribute text.
    fn render(self) -> String;
}

impl FieldValue for i64 {
    fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        raw.parse::<i64>().ok().or_else(|| {
            // some writers emit whole numbers as "12.0"
            raw.parse::<f64>()
                .ok()
                .filter(|value| value.fract() == 0.0)
                .map(|value| value as i64)
        })
    }

    fn render(self) -> String {
        self.to_string()
    }
}

impl FieldValue for u32 {
    fn parse(raw: &str) -> Option<Self> {
        i64::parse(raw).and_then(|value| u32::try_from(value).ok())
    }

    fn render(self) -> String {
        self.to_string()
    }
}

impl FieldValue for f64 {
    fn parse(raw: &str) -> Option<Self> {
        raw.trim().parse::<f64>().ok().filter(|value| value.is_finite())
    }

    fn render(self) -> String {
        self.to_string()
    }
}

impl FieldValue for bool {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        }
    }

    fn render(self) -> String {
        String::from(if self { "true" } else { "false" })
    }
}

/// A typed binding to one attribute.
#[derive(Debug, Clone, Copy)]
pub struct Field<T> {
    name: &'static str,
    default: T,
    on_change: Option<SideEffect>,
}

impl<T: FieldValue> Field<T> {
    /// A field reading `name`, falling back to `default`.
    #[must_use]
    pub const fn new(name: &'static str, default: T) -> Self {
        Self {
            name,
            default,
            on_change: None,
        }
    }

    /// Run `effect` after every write through this field.
    #[must_use]
    pub const fn with_side_effect(mut self, effect: SideEffect) -> Self {
        self.on_change = Some(effect);
        self
    }

    /// Attribute name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Default value.
    #[must_use]
    pub const fn default_value(&self) -> T {
        self.default
    }

    /// Read the value, or the default when absent or malformed.
    #[must_use]
    pub fn get(&self, tree: &XmlTree, node: NodeId) -> T {
        self.get_opt(tree, node).unwrap_or(self.default)
    }

    /// Read the value only if the attribute is present and well formed.
    #[must_use]
    pub fn get_opt(&self, tree: &XmlTree, node: NodeId) -> Option<T> {
        let raw = tree.attribute(node, self.name)?;
        let parsed = T::parse(raw);
        if parsed.is_none() {
            tracing::warn!(
                "<{}> attribute {}={:?} is not a valid value, using {:?}",
                tree.tag(node),
                self.name,
                raw,
                self.default
            );
        }
        parsed
    }

    /// Whether the attribute is present at all.
    #[must_use]
    pub fn is_present(&self, tree: &XmlTree, node: NodeId) -> bool {
        tree.attribute(node, self.name).is_some()
    }

    /// Write the value and fire the side effect, if any.
    pub fn set(&self, tree: &mut XmlTree, node: NodeId, value: T) {
        tree.set_attribute(node, self.name, value.render());
        if let Some(effect) = self.on_change {
            effect(tree, node);
        }
    }
}

/// A string attribute binding.
#[derive(Debug, Clone, Copy)]
pub struct TextField {
    name: &'static str,
    default: &'static str,
}

impl TextField {
    /// A field reading `name`, falling back to `default`.
    #[must_use]
    pub const fn new(name: &'static str, default: &'static str) -> Self {
        Self { name, default }
    }

    /// Attribute name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Read the value, or the default when absent.
    #[must_use]
    pub fn get<'t>(&self, tree: &'t XmlTree, node: NodeId) -> &'t str {
        tree.attribute(node, self.name).unwrap_or(self.default)
    }

    /// Write the value.
    pub fn set(&self, tree: &mut XmlTree, node: NodeId, value: &str) {
        tree.set_attribute(node, self.name, value);
    }
}

/// Generate getter/setter pairs on an overlay type from `Field` constants.
///
/// ```ignore
/// fields! {
///     /// Tile id.
///     id / set_id: i64 = Self::ID;
/// }
/// ```
#[macro_export]
macro_rules! fields {
    ($( $(#[$meta:meta])* $get:ident / $set:ident : $ty:ty = $field:expr ; )*) => {
        $(
            $(#[$meta])*
            #[must_use]
            pub fn $get(&self, tree: &$crate::xml::XmlTree) -> $ty {
                $field.get(tree, $crate::overlay::Overlay::node(self))
            }

            #[doc = concat!("Set the value read by [`Self::", stringify!($get), "`].")]
            pub fn $set(&self, tree: &mut $crate::xml::XmlTree, value: $ty) {
                $field.set(tree, $crate::overlay::Overlay::node(self), value);
            }
        )*
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    const COUNT: Field<i64> = Field::new("count", 7);
    const RATIO: Field<f64> = Field::new("ratio", 0.5);
    const FLAG: Field<bool> = Field::new("flag", false);
    const MIRROR: Field<i64> = Field::new("mirror", 0);

    fn mirror(tree: &mut XmlTree, node: NodeId) {
        let value = COUNT.get(tree, node);
        MIRROR.set(tree, node, value * 2);
    }

    #[test]
    fn test_absent_reads_default() {
        let tree = XmlTree::with_root("t");
        let root = tree.root().unwrap();
        assert_eq!(COUNT.get(&tree, root), 7);
        assert!((RATIO.get(&tree, root) - 0.5).abs() < f64::EPSILON);
        assert!(!FLAG.get(&tree, root));
        assert!(!COUNT.is_present(&tree, root));
    }

    #[test]
    fn test_write_then_read() {
        let mut tree = XmlTree::with_root("t");
        let root = tree.root().unwrap();
        COUNT.set(&mut tree, root, -3);
        RATIO.set(&mut tree, root, 20.0);
        FLAG.set(&mut tree, root, true);
        assert_eq!(tree.attribute(root, "count"), Some("-3"));
        assert_eq!(tree.attribute(root, "ratio"), Some("20"));
        assert_eq!(tree.attribute(root, "flag"), Some("true"));
        assert_eq!(COUNT.get(&tree, root), -3);
        assert!(FLAG.get(&tree, root));
    }

    #[test]
    fn test_malformed_falls_back() {
        let mut tree = XmlTree::with_root("t");
        let root = tree.root().unwrap();
        tree.set_attribute(root, "count", "lots");
        tree.set_attribute(root, "flag", "True");
        assert_eq!(COUNT.get(&tree, root), 7);
        assert_eq!(COUNT.get_opt(&tree, root), None);
        assert!(FLAG.get(&tree, root));
    }

    #[test]
    fn test_whole_float_reads_as_integer() {
        let mut tree = XmlTree::with_root("t");
        let root = tree.root().unwrap();
        tree.set_attribute(root, "count", "12.0");
        assert_eq!(COUNT.get(&tree, root), 12);
    }

    #[test]
    fn test_side_effect_runs_after_write() {
        const WATCHED: Field<i64> = Field::new("count", 0).with_side_effect(mirror);
        let mut tree = XmlTree::with_root("t");
        let root = tree.root().unwrap();
        WATCHED.set(&mut tree, root, 4);
        assert_eq!(MIRROR.get(&tree, root), 8);
    }

    #[test]
    fn test_text_field() {
        const NAME: TextField = TextField::new("state", "");
        let mut tree = XmlTree::with_root("v");
        let root = tree.root().unwrap();
        assert_eq!(NAME.get(&tree, root), "");
        NAME.set(&mut tree, root, "<data/>");
        assert_eq!(NAME.get(&tree, root), "<data/>");
    }
}
