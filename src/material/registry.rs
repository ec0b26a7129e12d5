//! Inverse material lookup for level-set domain splitting.
//!
//! A level-set discretization cuts every domain reference that the user
//! declared as splittable into an interior (MINUS) and an exterior (PLUS)
//! child reference. [`MaterialRegistry`] maps each reference of the span
//! covered by the declared materials to a [`MaterialSlot`], so the reverse
//! questions (is this a child? of whom? on which side?) are O(1).
//!
//! # Collisions
//! Slots are written material by material, in declaration order. A child
//! sharing its own parent's reference overwrites the parent slot. A
//! reference claimed by two different materials (as child of both, or as
//! one's child and the other's own reference) is not rejected: the later
//! material wins, a warning is logged, and
//! [`DebugInvariants::validate_invariants`] reports the clash.

use std::fmt;

use crate::debug_invariants::{DebugInvariants, ensure};
use crate::material::{DomainMaterial, MINUS_REFERENCE, PLUS_REFERENCE, Polarity, SplitRule};
use crate::mesh_error::MeshMetricError;

/// Lookup sizes above this are logged when the registry is built.
pub const WIDE_SPAN: usize = 1 << 20;

/// What the registry knows about one domain reference.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MaterialSlot {
    /// Reference inside the span but not declared by any material.
    #[default]
    Unused,
    /// Reference of a declared material, with its split flag.
    Parent { split: bool },
    /// Child label produced by splitting `parent`.
    Child { parent: i32, polarity: Polarity },
}

impl MaterialSlot {
    /// Legacy single-integer tag: 0 unused or non-splitting parent, 1
    /// splitting parent, 2 MINUS child, 3 PLUS child.
    pub fn legacy_tag(self) -> i32 {
        match self {
            MaterialSlot::Unused | MaterialSlot::Parent { split: false } => 0,
            MaterialSlot::Parent { split: true } => 1,
            MaterialSlot::Child { polarity, .. } => polarity.reference(),
        }
    }

    pub fn polarity(self) -> Option<Polarity> {
        match self {
            MaterialSlot::Child { polarity, .. } => Some(polarity),
            _ => None,
        }
    }
}

/// Compact reference → [`MaterialSlot`] table, built once from the declared
/// materials and immutable afterwards.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MaterialRegistry {
    materials: Vec<DomainMaterial>,
    offset: i32,
    lookup: Vec<MaterialSlot>,
    /// `(reference, first owner, overriding owner)` for each reference
    /// claimed by two materials while building.
    collisions: Vec<(i32, i32, i32)>,
}

impl MaterialRegistry {
    /// Builds the registry from the first `declared` entries of `materials`.
    ///
    /// `declared == 0` means multi-material mode is off and yields an empty
    /// registry. Fails with `IncompleteConfig` when fewer than `declared`
    /// materials were provided.
    ///
    /// The table holds one slot per reference between the smallest and the
    /// largest declared reference, so memory grows with that span rather than
    /// with the number of materials. Spans above [`WIDE_SPAN`] are logged.
    pub fn build(materials: &[DomainMaterial], declared: usize) -> Result<Self, MeshMetricError> {
        if declared == 0 {
            return Ok(Self::default());
        }
        if materials.len() < declared {
            log::error!(
                "only {} materials out of {declared} have been set",
                materials.len()
            );
            return Err(MeshMetricError::IncompleteConfig {
                set: materials.len(),
                declared,
            });
        }
        let materials = materials[..declared].to_vec();

        let (refmin, refmax) = materials
            .iter()
            .flat_map(DomainMaterial::references)
            .fold((i32::MAX, i32::MIN), |(lo, hi), r| (lo.min(r), hi.max(r)));
        let size = (i64::from(refmax) - i64::from(refmin) + 1) as usize;
        if size > WIDE_SPAN {
            log::warn!(
                "material references span [{refmin}, {refmax}]: allocating {size} lookup slots"
            );
        }

        let mut registry = Self {
            materials,
            offset: refmin,
            lookup: vec![MaterialSlot::Unused; size],
            collisions: Vec::new(),
        };
        for k in 0..registry.materials.len() {
            let material = registry.materials[k];
            registry.record(&material);
        }
        log::debug!(
            "material lookup: {} materials, offset {}, size {}",
            registry.materials.len(),
            registry.offset,
            registry.lookup.len()
        );
        registry.debug_assert_span();
        Ok(registry)
    }

    fn debug_assert_span(&self) {
        crate::debug_invariants!(self.check_span(), "material registry span");
    }

    fn key(&self, reference: i32) -> Option<usize> {
        let key = i64::from(reference) - i64::from(self.offset);
        usize::try_from(key).ok().filter(|&k| k < self.lookup.len())
    }

    fn record(&mut self, material: &DomainMaterial) {
        self.write(material.reference, material.reference, MaterialSlot::Parent {
            split: material.split,
        });
        if material.split {
            for (child, polarity) in [
                (material.interior, Polarity::Minus),
                (material.exterior, Polarity::Plus),
            ] {
                self.write(child, material.reference, MaterialSlot::Child {
                    parent: material.reference,
                    polarity,
                });
            }
        }
    }

    /// Writes `slot` for `reference` on behalf of material `owner`, flagging
    /// any slot previously claimed by another material.
    fn write(&mut self, reference: i32, owner: i32, slot: MaterialSlot) {
        let Some(key) = self.key(reference) else {
            return;
        };
        let previous = match self.lookup[key] {
            MaterialSlot::Unused => None,
            MaterialSlot::Parent { .. } => Some(reference),
            MaterialSlot::Child { parent, .. } => Some(parent),
        };
        if let Some(previous) = previous.filter(|&p| p != owner) {
            log::warn!(
                "reference {reference} claimed by materials {previous} and {owner}; keeping {owner}"
            );
            self.collisions.push((reference, previous, owner));
        }
        self.lookup[key] = slot;
    }

    /// True when at least one material was declared.
    pub fn is_configured(&self) -> bool {
        !self.materials.is_empty()
    }

    pub fn materials(&self) -> &[DomainMaterial] {
        &self.materials
    }

    /// Smallest reference covered by the table.
    pub fn offset(&self) -> i32 {
        self.offset
    }

    /// Number of references covered by the table.
    pub fn size(&self) -> usize {
        self.lookup.len()
    }

    /// Slot of `reference`; references outside the span read as `Unused`.
    pub fn slot(&self, reference: i32) -> MaterialSlot {
        self.key(reference)
            .map(|k| self.lookup[k])
            .unwrap_or_default()
    }

    /// Split policy of an element with domain reference `reference`.
    ///
    /// Scans the declared materials. An undeclared reference splits into the
    /// default [`MINUS_REFERENCE`]/[`PLUS_REFERENCE`] labels.
    pub fn is_splittable(&self, reference: i32) -> SplitRule {
        match self.materials.iter().find(|m| m.reference == reference) {
            Some(m) if !m.split => SplitRule::Keep,
            Some(m) => SplitRule::Split {
                interior: m.interior,
                exterior: m.exterior,
            },
            None => SplitRule::Split {
                interior: MINUS_REFERENCE,
                exterior: PLUS_REFERENCE,
            },
        }
    }

    /// True when the slot of `reference` carries a non-zero legacy tag:
    /// MINUS/PLUS children and parents that split. Always false when no
    /// materials are configured.
    pub fn is_not_splittable(&self, reference: i32) -> bool {
        self.is_configured() && self.slot(reference).legacy_tag() != 0
    }

    /// True iff `a` and `b` are the complementary MINUS/PLUS pair, in
    /// either order.
    pub fn is_level_set_edge(&self, a: i32, b: i32) -> bool {
        matches!(
            (self.slot(a).polarity(), self.slot(b).polarity()),
            (Some(Polarity::Minus), Some(Polarity::Plus))
                | (Some(Polarity::Plus), Some(Polarity::Minus))
        )
    }

    /// Parent of a child label, `reference` itself otherwise; 0 when no
    /// materials are configured.
    pub fn original_reference(&self, reference: i32) -> i32 {
        if !self.is_configured() {
            return 0;
        }
        match self.slot(reference) {
            MaterialSlot::Child { parent, .. } => parent,
            _ => reference,
        }
    }

    /// Cross-material clashes recorded while building, as
    /// `(reference, first owner, overriding owner)`.
    pub fn collisions(&self) -> &[(i32, i32, i32)] {
        &self.collisions
    }

    fn check_span(&self) -> Result<(), MeshMetricError> {
        if !self.is_configured() {
            return ensure(self.lookup.is_empty(), || {
                "unconfigured registry has a lookup table".into()
            });
        }
        ensure(!self.lookup.is_empty(), || "empty lookup table".into())?;
        for r in self.materials.iter().flat_map(DomainMaterial::references) {
            ensure(self.key(r).is_some(), || {
                format!(
                    "reference {r} outside span [{}, {})",
                    self.offset,
                    i64::from(self.offset) + self.lookup.len() as i64
                )
            })?;
        }
        Ok(())
    }
}

impl DebugInvariants for MaterialRegistry {
    fn validate_invariants(&self) -> Result<(), MeshMetricError> {
        self.check_span()?;
        match self.collisions.first() {
            Some((child, first, second)) => Err(MeshMetricError::InvariantViolation(format!(
                "child reference {child} claimed by materials {first} and {second}"
            ))),
            None => Ok(()),
        }
    }
}

/// One line per reference: `ref (key): parent tag`.
impl fmt::Display for MaterialRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, slot) in self.lookup.iter().enumerate() {
            let reference = i64::from(self.offset) + key as i64;
            let parent = match slot {
                MaterialSlot::Child { parent, .. } => i64::from(*parent),
                _ => -1,
            };
            writeln!(f, "{reference} ({key}): {parent} {}", slot.legacy_tag())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_materials() -> Vec<DomainMaterial> {
        vec![
            DomainMaterial::keep(10),
            DomainMaterial::split(20, 21, 22),
        ]
    }

    #[test]
    fn span_covers_parents_and_children() {
        let reg = MaterialRegistry::build(&two_materials(), 2).unwrap();
        assert_eq!(reg.offset(), 10);
        assert_eq!(reg.size(), 13);
        assert_eq!(reg.slot(10), MaterialSlot::Parent { split: false });
        assert_eq!(reg.slot(20), MaterialSlot::Parent { split: true });
        assert_eq!(
            reg.slot(21),
            MaterialSlot::Child {
                parent: 20,
                polarity: Polarity::Minus
            }
        );
        assert_eq!(reg.slot(15), MaterialSlot::Unused);
        reg.validate_invariants().unwrap();
    }

    #[test]
    fn children_of_non_splitting_material_are_ignored() {
        let mut keep = DomainMaterial::keep(5);
        keep.interior = 100;
        keep.exterior = -100;
        let reg = MaterialRegistry::build(&[keep], 1).unwrap();
        assert_eq!(reg.size(), 1);
        assert_eq!(reg.offset(), 5);
    }

    #[test]
    fn incomplete_config() {
        assert_eq!(
            MaterialRegistry::build(&two_materials(), 3),
            Err(MeshMetricError::IncompleteConfig {
                set: 2,
                declared: 3
            })
        );
    }

    #[test]
    fn extra_materials_beyond_declared_are_ignored() {
        let reg = MaterialRegistry::build(&two_materials(), 1).unwrap();
        assert_eq!(reg.materials().len(), 1);
        assert_eq!(reg.size(), 1);
        assert_eq!(reg.original_reference(21), 21);
    }

    #[test]
    fn child_sharing_parent_reference_overwrites_parent() {
        let reg = MaterialRegistry::build(&[DomainMaterial::split(3, 3, 4)], 1).unwrap();
        assert_eq!(
            reg.slot(3),
            MaterialSlot::Child {
                parent: 3,
                polarity: Polarity::Minus
            }
        );
        assert!(reg.collisions().is_empty());
        assert!(reg.is_level_set_edge(3, 4));
    }

    #[test]
    fn cross_material_collision_is_last_writer_wins_and_flagged() {
        let mats = [
            DomainMaterial::split(1, 10, 11),
            DomainMaterial::split(2, 11, 12),
        ];
        let reg = MaterialRegistry::build(&mats, 2).unwrap();
        assert_eq!(reg.original_reference(11), 2);
        assert_eq!(reg.slot(11).polarity(), Some(Polarity::Minus));
        assert_eq!(reg.collisions(), &[(11, 1, 2)]);
        assert!(matches!(
            reg.validate_invariants(),
            Err(MeshMetricError::InvariantViolation(_))
        ));
    }

    #[test]
    fn parent_overwriting_foreign_child_is_flagged() {
        let mats = [DomainMaterial::split(1, 5, 6), DomainMaterial::keep(5)];
        let reg = MaterialRegistry::build(&mats, 2).unwrap();
        assert_eq!(reg.slot(5), MaterialSlot::Parent { split: false });
        assert!(!reg.is_level_set_edge(5, 6));
        assert_eq!(reg.collisions(), &[(5, 1, 5)]);
        assert!(reg.validate_invariants().is_err());
    }

    #[test]
    fn child_overwriting_foreign_parent_is_flagged() {
        let mats = [DomainMaterial::keep(5), DomainMaterial::split(1, 5, 6)];
        let reg = MaterialRegistry::build(&mats, 2).unwrap();
        assert_eq!(reg.original_reference(5), 1);
        assert!(reg.is_level_set_edge(5, 6));
        assert_eq!(reg.collisions(), &[(5, 5, 1)]);
        assert!(reg.validate_invariants().is_err());
    }

    #[test]
    fn wide_reference_span_still_builds() {
        let far = WIDE_SPAN as i32 + 1;
        let reg = MaterialRegistry::build(&[DomainMaterial::split(0, 1, far)], 1).unwrap();
        assert_eq!(reg.size(), WIDE_SPAN + 2);
        assert!(reg.is_level_set_edge(1, far));
    }

    #[test]
    fn not_splittable_follows_legacy_tag() {
        let reg = MaterialRegistry::build(&two_materials(), 2).unwrap();
        assert!(!reg.is_not_splittable(10));
        assert!(reg.is_not_splittable(20));
        assert!(reg.is_not_splittable(21));
        assert!(reg.is_not_splittable(22));
        assert!(!reg.is_not_splittable(15));
    }

    #[test]
    fn out_of_span_references_read_as_unused() {
        let reg = MaterialRegistry::build(&two_materials(), 2).unwrap();
        assert_eq!(reg.slot(-7), MaterialSlot::Unused);
        assert_eq!(reg.slot(i32::MAX), MaterialSlot::Unused);
        assert!(!reg.is_not_splittable(1000));
        assert_eq!(reg.original_reference(1000), 1000);
    }

    #[test]
    fn unconfigured_registry() {
        let reg = MaterialRegistry::build(&[], 0).unwrap();
        assert!(!reg.is_configured());
        assert!(!reg.is_not_splittable(2));
        assert!(!reg.is_level_set_edge(2, 3));
        assert_eq!(reg.original_reference(42), 0);
        assert_eq!(
            reg.is_splittable(42),
            SplitRule::Split {
                interior: MINUS_REFERENCE,
                exterior: PLUS_REFERENCE
            }
        );
        reg.validate_invariants().unwrap();
    }

    #[test]
    fn display_dumps_every_slot() {
        let reg = MaterialRegistry::build(&[DomainMaterial::split(0, 1, 2)], 1).unwrap();
        let dump = reg.to_string();
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines, vec!["0 (0): -1 1", "1 (1): 0 2", "2 (2): 0 3"]);
    }
}
