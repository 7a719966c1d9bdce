//! Live vehicles and their fitted attachments

use glam::DVec3;

use crate::error::Result;
use crate::overlay::geometry::read_translation;
use crate::overlay::{Bodies, Field, Overlay, Positioned, Transform};
use crate::rules::{AttachmentKind, VehicleType};
use crate::xml::XmlTree;
use crate::{fields, overlay};

const ID: Field<i64> = Field::new("id", 0);
const DEFINITION_INDEX: Field<i64> = Field::new("definition_index", 0);
const TEAM_ID: Field<i64> = Field::new("team_id", 0);

overlay!(
    /// A live vehicle (`vehicles/vehicles/v`).
    Vehicle = "v"
);

impl Vehicle {
    fields! {
        /// Id shared with the paired vehicle state.
        id / set_id: i64 = ID;
        /// Vehicle type, see [`VehicleType`].
        definition_index / set_definition_index: i64 = DEFINITION_INDEX;
        team_id / set_team_id: i64 = TEAM_ID;
    }

    /// Decode the vehicle type.
    ///
    /// # Errors
    /// Returns [`Error::UnknownVehicleType`](crate::error::Error::UnknownVehicleType)
    /// if the definition index is not a known type.
    pub fn vehicle_type(&self, tree: &XmlTree) -> Result<VehicleType> {
        VehicleType::from_index(self.definition_index(tree))
    }

    pub fn transform(&self, tree: &mut XmlTree) -> Transform {
        self.child(tree)
    }

    pub fn bodies(&self, tree: &mut XmlTree) -> Bodies {
        self.child(tree)
    }

    pub fn attachments(&self, tree: &mut XmlTree) -> Attachments {
        self.child(tree)
    }

    /// Fitted attachments, empty when the list is absent.
    #[must_use]
    pub fn attachment_items(&self, tree: &XmlTree) -> Vec<Attachment> {
        self.find_child::<Attachments>(tree)
            .map(|list| list.items(tree))
            .unwrap_or_default()
    }

    /// Attachment fitted at `slot`, if any.
    #[must_use]
    pub fn attachment(&self, tree: &XmlTree, slot: u32) -> Option<Attachment> {
        self.find_child::<Attachments>(tree)
            .and_then(|list| list.get(tree, slot))
    }
}

impl Positioned for Vehicle {
    fn location(&self, tree: &XmlTree) -> DVec3 {
        read_translation(*self, tree)
    }

    /// Moves the vehicle, its bodies and every body of its attachments by the
    /// same delta.
    fn move_to(&self, tree: &mut XmlTree, target: DVec3) {
        let delta = target - self.location(tree);
        self.transform(tree).offset(tree, delta);
        for attachment in self.attachment_items(tree) {
            attachment.bodies(tree).offset_all(tree, delta);
        }
        self.bodies(tree).offset_all(tree, delta);
    }
}

overlay!(
    /// Fitted attachment list of a vehicle.
    Attachments = "attachments"
);

impl Attachments {
    #[must_use]
    pub fn items(&self, tree: &XmlTree) -> Vec<Attachment> {
        self.children_of(tree)
    }

    #[must_use]
    pub fn get(&self, tree: &XmlTree, slot: u32) -> Option<Attachment> {
        self.items(tree)
            .into_iter()
            .find(|attachment| attachment.occupies(tree, slot))
    }

    /// Remove every attachment at `slot`.
    pub fn remove(&self, tree: &mut XmlTree, slot: u32) {
        for attachment in self.items(tree) {
            if attachment.occupies(tree, slot) {
                tree.detach(attachment.node());
            }
        }
    }

    /// Insert `attachment`, replacing whatever occupied its slot.
    pub fn replace(&self, tree: &mut XmlTree, attachment: Attachment) {
        if let Ok(slot) = u32::try_from(attachment.attachment_index(tree)) {
            self.remove(tree, slot);
        }
        tree.append_child(self.node(), attachment.node());
    }
}

const ATTACHMENT_INDEX: Field<i64> = Field::new("attachment_index", -1);
const ATTACHMENT_DEFINITION: Field<i64> = Field::new("definition_index", 0);

overlay!(
    /// One fitted attachment.
    Attachment = "a"
);

impl Attachment {
    fields! {
        /// Slot position on the vehicle, -1 when missing or malformed.
        attachment_index / set_attachment_index: i64 = ATTACHMENT_INDEX;
        definition_index / set_definition_index: i64 = ATTACHMENT_DEFINITION;
    }

    /// New detached attachment of `kind` at `slot`.
    pub fn build(tree: &mut XmlTree, kind: AttachmentKind, slot: u32) -> Self {
        let attachment = Self::create(tree);
        attachment.set_attachment_index(tree, i64::from(slot));
        attachment.set_definition_index(tree, kind.index());
        attachment
    }

    /// Whether this attachment is fitted at `slot`.
    #[must_use]
    pub fn occupies(&self, tree: &XmlTree, slot: u32) -> bool {
        self.attachment_index(tree) == i64::from(slot)
    }

    /// Decode the attachment kind. Index 0 marks an empty slot.
    ///
    /// # Errors
    /// Returns an error if the definition index is not a known kind.
    pub fn kind(&self, tree: &XmlTree) -> Result<Option<AttachmentKind>> {
        AttachmentKind::from_slot_index(self.definition_index(tree))
    }

    pub fn bodies(&self, tree: &mut XmlTree) -> Bodies {
        self.child(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_document;

    const WALRUS: &str = r#"<v id="7" definition_index="4" team_id="1">
        <transform 30="10" 31="0" 32="20"/>
        <bodies><b><transform 30="11" 31="1" 32="21"/></b></bodies>
        <attachments>
            <a attachment_index="1" definition_index="20">
                <bodies><b><transform 30="10" 31="2" 32="20"/></b></bodies>
            </a>
        </attachments>
    </v>"#;

    fn walrus() -> (XmlTree, Vehicle) {
        let tree = parse_document(WALRUS).unwrap();
        let vehicle = Vehicle::wrap(tree.root().unwrap());
        (tree, vehicle)
    }

    #[test]
    fn test_vehicle_fields() {
        let (tree, vehicle) = walrus();
        assert_eq!(vehicle.id(&tree), 7);
        assert_eq!(vehicle.vehicle_type(&tree).unwrap(), VehicleType::Walrus);
        assert_eq!(vehicle.location(&tree), DVec3::new(10.0, 0.0, 20.0));
        let gun = vehicle.attachment(&tree, 1).unwrap();
        assert_eq!(gun.kind(&tree).unwrap(), Some(AttachmentKind::Gun30mm));
        assert!(vehicle.attachment(&tree, 2).is_none());
    }

    #[test]
    fn test_move_cascades_to_bodies() {
        let (mut tree, vehicle) = walrus();
        vehicle.move_to(&mut tree, DVec3::new(110.0, 0.0, 120.0));

        assert_eq!(vehicle.location(&tree), DVec3::new(110.0, 0.0, 120.0));
        let body = vehicle.bodies(&mut tree).items(&tree)[0];
        assert_eq!(body.translation(&tree), DVec3::new(111.0, 1.0, 121.0));
        let gun = vehicle.attachment(&tree, 1).unwrap();
        let gun_body = gun.bodies(&mut tree).items(&tree)[0];
        assert_eq!(gun_body.translation(&tree), DVec3::new(110.0, 2.0, 120.0));
    }

    #[test]
    fn test_replace_attachment() {
        let (mut tree, vehicle) = walrus();
        let list = vehicle.attachments(&mut tree);
        let missile = Attachment::build(&mut tree, AttachmentKind::MissileIRLauncher, 1);
        list.replace(&mut tree, missile);
        assert_eq!(list.items(&tree).len(), 1);
        assert_eq!(
            vehicle.attachment(&tree, 1).unwrap().kind(&tree).unwrap(),
            Some(AttachmentKind::MissileIRLauncher)
        );

        list.remove(&mut tree, 1);
        assert!(vehicle.attachment_items(&tree).is_empty());
    }

    #[test]
    fn test_bad_slot_index_never_matches_driver_slot() {
        let mut tree = parse_document(
            r#"<v definition_index="2"><attachments>
                <a attachment_index="-3" definition_index="20"/>
                <a attachment_index="x" definition_index="20"/>
                <a definition_index="20"/>
            </attachments></v>"#,
        )
        .unwrap();
        let vehicle = Vehicle::wrap(tree.root().unwrap());
        assert!(vehicle.attachment(&tree, 0).is_none());

        let list = vehicle.attachments(&mut tree);
        let seat = Attachment::build(&mut tree, AttachmentKind::DriverSeat, 0);
        list.replace(&mut tree, seat);
        assert_eq!(list.items(&tree).len(), 4);
        assert!(vehicle.attachment(&tree, 0).unwrap().occupies(&tree, 0));

        list.remove(&mut tree, 0);
        let indices: Vec<i64> = list
            .items(&tree)
            .iter()
            .map(|attachment| attachment.attachment_index(&tree))
            .collect();
        assert_eq!(indices, vec![-3, -1, -1]);
    }

    #[test]
    fn test_unknown_type() {
        let mut tree = XmlTree::with_root("v");
        let vehicle = Vehicle::wrap(tree.root().unwrap());
        vehicle.set_definition_index(&mut tree, 3);
        assert!(vehicle.vehicle_type(&tree).is_err());
        let transform = vehicle.transform(&mut tree);
        assert_eq!(transform.translation(&tree), DVec3::ZERO);
        assert!(vehicle.bodies(&mut tree).items(&tree).is_empty());
    }
}
