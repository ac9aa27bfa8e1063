//! Entity trait: identity + continuity across edits.

/// Entity marker + minimal interface.
///
/// Implemented by the records inside a product configuration that keep their
/// identity while their attributes are edited (variant options, variant rows,
/// persisted images, bundle items).
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// Find the position of an entity by identifier.
pub fn position_of<E: Entity>(items: &[E], id: &E::Id) -> Option<usize> {
    items.iter().position(|item| item.id() == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Row {
        id: u32,
    }

    impl Entity for Row {
        type Id = u32;

        fn id(&self) -> &Self::Id {
            &self.id
        }
    }

    #[test]
    fn position_of_finds_by_identity() {
        let rows = vec![Row { id: 7 }, Row { id: 3 }];
        assert_eq!(position_of(&rows, &3), Some(1));
        assert_eq!(position_of(&rows, &9), None);
    }
}
