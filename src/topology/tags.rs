//! Entity tags carried by points, edges and faces of the mesh.
//!
//! A [`Tag`] is a small flag-set. Bit values follow the usual mmg layout so
//! that tags read from files written by other tools keep their meaning.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Flag-set over the boundary/feature attributes of a mesh entity.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[repr(transparent)]
pub struct Tag(u16);

impl Tag {
    /// No attribute.
    pub const NONE: Tag = Tag(0);
    /// Entity carries a user reference edge/face.
    pub const REF: Tag = Tag(1 << 0);
    /// Ridge (geometric crease).
    pub const GEO: Tag = Tag(1 << 1);
    /// Required entity; must not be moved or removed.
    pub const REQ: Tag = Tag(1 << 2);
    /// Non-manifold entity.
    pub const NOM: Tag = Tag(1 << 3);
    /// Boundary entity.
    pub const BDY: Tag = Tag(1 << 4);
    /// Corner point.
    pub const CRN: Tag = Tag(1 << 5);

    /// True if every flag in `other` is set.
    #[inline]
    pub const fn contains(self, other: Tag) -> bool {
        self.0 & other.0 == other.0
    }

    /// True if any flag in `other` is set.
    #[inline]
    pub const fn intersects(self, other: Tag) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Corner or required: the point is isolated from averaging rules.
    #[inline]
    pub const fn is_singular(self) -> bool {
        self.intersects(Tag(Tag::CRN.0 | Tag::REQ.0))
    }

    #[inline]
    pub const fn is_non_manifold(self) -> bool {
        self.intersects(Tag::NOM)
    }

    #[inline]
    pub const fn is_ridge(self) -> bool {
        self.intersects(Tag::GEO)
    }

    #[inline]
    pub const fn is_boundary(self) -> bool {
        self.intersects(Tag::BDY)
    }
}

impl BitOr for Tag {
    type Output = Tag;
    fn bitor(self, rhs: Tag) -> Tag {
        Tag(self.0 | rhs.0)
    }
}

impl BitOrAssign for Tag {
    fn bitor_assign(&mut self, rhs: Tag) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(Tag, &str); 6] = [
            (Tag::REF, "REF"),
            (Tag::GEO, "GEO"),
            (Tag::REQ, "REQ"),
            (Tag::NOM, "NOM"),
            (Tag::BDY, "BDY"),
            (Tag::CRN, "CRN"),
        ];
        let mut set = f.debug_set();
        for (flag, name) in NAMES {
            if self.contains(flag) {
                set.entry(&format_args!("{name}"));
            }
        }
        set.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singular_means_corner_or_required() {
        assert!(Tag::CRN.is_singular());
        assert!(Tag::REQ.is_singular());
        assert!((Tag::REQ | Tag::BDY).is_singular());
        assert!(!Tag::NOM.is_singular());
        assert!(!(Tag::GEO | Tag::BDY).is_singular());
    }

    #[test]
    fn contains_and_intersects() {
        let t = Tag::GEO | Tag::BDY;
        assert!(t.contains(Tag::GEO));
        assert!(!t.contains(Tag::GEO | Tag::REQ));
        assert!(t.intersects(Tag::GEO | Tag::REQ));
        assert!(Tag::NONE.is_empty());
    }

    #[test]
    fn debug_lists_flags() {
        assert_eq!(format!("{:?}", Tag::GEO | Tag::BDY), "{GEO, BDY}");
    }
}
