//! Teams

use crate::overlay::Field;
use crate::{fields, overlay};

const ID: Field<i64> = Field::new("id", 0);
const PATTERN_INDEX: Field<i64> = Field::new("pattern_index", 5);
const IS_AI_CONTROLLED: Field<bool> = Field::new("is_ai_controlled", false);
const IS_NEUTRAL: Field<bool> = Field::new("is_neutral", false);
const IS_DESTROYED: Field<bool> = Field::new("is_destroyed", false);
const CURRENCY: Field<i64> = Field::new("currency", 1500);
const START_TILE_ID: Field<i64> = Field::new("start_tile_id", 0);

overlay!(
    /// A team (`scene/teams/teams/t`).
    Team = "t"
);

impl Team {
    fields! {
        id / set_id: i64 = ID;
        /// Livery pattern.
        pattern_index / set_pattern_index: i64 = PATTERN_INDEX;
        is_ai_controlled / set_ai_controlled: bool = IS_AI_CONTROLLED;
        is_neutral / set_neutral: bool = IS_NEUTRAL;
        /// Set when the team's carrier is removed.
        is_destroyed / set_destroyed: bool = IS_DESTROYED;
        currency / set_currency: i64 = CURRENCY;
        start_tile_id / set_start_tile_id: i64 = START_TILE_ID;
    }

    /// Whether a player controls this team.
    #[must_use]
    pub fn human_controlled(&self, tree: &crate::xml::XmlTree) -> bool {
        !self.is_ai_controlled(tree) && !self.is_neutral(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::Overlay;
    use crate::xml::parse_document;

    #[test]
    fn test_team_flags() {
        let mut tree =
            parse_document(r#"<t id="2" is_ai_controlled="true" currency="9000"/>"#).unwrap();
        let team = Team::wrap(tree.root().unwrap());
        assert_eq!(team.id(&tree), 2);
        assert_eq!(team.currency(&tree), 9000);
        assert_eq!(team.pattern_index(&tree), 5);
        assert!(!team.human_controlled(&tree));

        team.set_ai_controlled(&mut tree, false);
        assert!(team.human_controlled(&tree));
        team.set_neutral(&mut tree, true);
        assert!(!team.human_controlled(&tree));
    }
}
