//! Multi-material split policy for level-set discretization.
//!
//! Users declare, per domain reference, whether the level set may cut it and
//! which references the two sides receive. [`MaterialRegistry`] answers the
//! driver's per-element and per-edge questions from that declaration.

pub mod registry;

pub use registry::{MaterialRegistry, MaterialSlot};

/// Default label of the interior (negative) side of a split.
pub const MINUS_REFERENCE: i32 = 2;
/// Default label of the exterior (positive) side of a split.
pub const PLUS_REFERENCE: i32 = 3;

/// Side of the level set a child reference lies on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Polarity {
    Minus,
    Plus,
}

impl Polarity {
    /// Default reference used for this side when a domain is not declared.
    pub const fn reference(self) -> i32 {
        match self {
            Polarity::Minus => MINUS_REFERENCE,
            Polarity::Plus => PLUS_REFERENCE,
        }
    }

    pub const fn opposite(self) -> Polarity {
        match self {
            Polarity::Minus => Polarity::Plus,
            Polarity::Plus => Polarity::Minus,
        }
    }
}

/// User-declared splitting rule for one domain reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DomainMaterial {
    /// Domain reference the rule applies to.
    #[serde(rename = "ref")]
    pub reference: i32,
    /// Whether the level set may split this domain.
    #[serde(rename = "dospl")]
    pub split: bool,
    /// Reference of the interior side (`rin`).
    #[serde(rename = "rin", default)]
    pub interior: i32,
    /// Reference of the exterior side (`rex`).
    #[serde(rename = "rex", default)]
    pub exterior: i32,
}

impl DomainMaterial {
    /// Domain that must not be split.
    pub const fn keep(reference: i32) -> Self {
        Self {
            reference,
            split: false,
            interior: 0,
            exterior: 0,
        }
    }

    /// Domain split into `interior` / `exterior`.
    pub const fn split(reference: i32, interior: i32, exterior: i32) -> Self {
        Self {
            reference,
            split: true,
            interior,
            exterior,
        }
    }

    /// References this rule occupies in the lookup table.
    pub fn references(&self) -> impl Iterator<Item = i32> {
        let children = self.split.then_some([self.interior, self.exterior]);
        std::iter::once(self.reference).chain(children.into_iter().flatten())
    }
}

/// Answer of [`MaterialRegistry::is_splittable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitRule {
    /// The domain keeps its reference.
    Keep,
    /// The domain is cut; each side takes the given reference.
    Split { interior: i32, exterior: i32 },
}

impl SplitRule {
    pub fn will_split(self) -> bool {
        matches!(self, SplitRule::Split { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn references_skip_children_when_kept() {
        let keep: Vec<i32> = DomainMaterial::keep(4).references().collect();
        assert_eq!(keep, vec![4]);
        let split: Vec<i32> = DomainMaterial::split(4, 5, 6).references().collect();
        assert_eq!(split, vec![4, 5, 6]);
    }

    #[test]
    fn polarity_references() {
        assert_eq!(Polarity::Minus.reference(), MINUS_REFERENCE);
        assert_eq!(Polarity::Plus.opposite(), Polarity::Minus);
    }

    #[test]
    fn material_from_json() {
        let m: DomainMaterial =
            serde_json::from_str(r#"{"ref": 20, "dospl": true, "rin": 21, "rex": 22}"#).unwrap();
        assert_eq!(m, DomainMaterial::split(20, 21, 22));
        let k: DomainMaterial = serde_json::from_str(r#"{"ref": 10, "dospl": false}"#).unwrap();
        assert_eq!(k, DomainMaterial::keep(10));
    }
}
