// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Coordinate mapping between the root space and target-local spaces.
//!
//! ## Minimal example
//!
//! ```
//! use kurbo::{Affine, Point, Rect, Vec2};
//! use understory_gesture::mapper::CoordinateMapper;
//! use understory_gesture::target::TargetTree;
//!
//! // Two-level tree: a child translated by (50, 0) inside a root scrolled by (0, 10).
//! struct Two;
//! impl TargetTree for Two {
//!     type Id = u8;
//!     fn root(&self) -> u8 { 0 }
//!     fn contains(&self, id: u8) -> bool { id < 2 }
//!     fn parent(&self, id: u8) -> Option<u8> { (id == 1).then_some(0) }
//!     fn children(&self, id: u8) -> &[u8] { if id == 0 { &[1] } else { &[] } }
//!     fn bounds(&self, _: u8) -> Rect { Rect::new(0.0, 0.0, 100.0, 100.0) }
//!     fn scroll_offset(&self, id: u8) -> Vec2 { if id == 0 { Vec2::new(0.0, 10.0) } else { Vec2::ZERO } }
//!     fn transform(&self, id: u8) -> Affine {
//!         if id == 1 { Affine::translate((50.0, 0.0)) } else { Affine::IDENTITY }
//!     }
//! }
//!
//! let mapper = CoordinateMapper::new(&Two);
//! let local = mapper.to_local(1, Point::new(60.0, 5.0)).unwrap();
//! assert_eq!(local, Point::new(10.0, 15.0));
//! assert_eq!(mapper.to_root(1, local).unwrap(), Point::new(60.0, 5.0));
//! ```

use kurbo::{Affine, Point};
use smallvec::SmallVec;

use crate::error::GestureError;
use crate::target::TargetTree;

/// Maps a point from `parent`'s local space into `child`'s local space.
///
/// Returns `None` if the child's transform cannot be inverted.
pub fn child_from_parent<T: TargetTree + ?Sized>(
    tree: &T,
    parent: T::Id,
    child: T::Id,
    point: Point,
) -> Option<Point> {
    let inverse = invert(tree.transform(child))?;
    Some(inverse * (point + tree.scroll_offset(parent)))
}

/// Composes root-to-target mappings for one [`TargetTree`].
#[derive(Debug)]
pub struct CoordinateMapper<'a, T: ?Sized> {
    tree: &'a T,
}

impl<'a, T: TargetTree + ?Sized> CoordinateMapper<'a, T> {
    /// Create a mapper over `tree`.
    pub fn new(tree: &'a T) -> Self {
        Self { tree }
    }

    /// Affine mapping root-space points into `target`'s local space.
    ///
    /// Errors with [`GestureError::DetachedTarget`] if `target` is not live or its
    /// ancestor chain does not reach [`TargetTree::root`], and with
    /// [`GestureError::SingularTransform`] if any transform on the path is not invertible.
    pub fn root_to_local(&self, target: T::Id) -> Result<Affine, GestureError> {
        let path = self.path_from_root(target)?;
        let mut composed = Affine::IDENTITY;
        for pair in path.windows(2) {
            let (parent, child) = (pair[0], pair[1]);
            let inverse =
                invert(self.tree.transform(child)).ok_or(GestureError::SingularTransform)?;
            composed = inverse * Affine::translate(self.tree.scroll_offset(parent)) * composed;
        }
        Ok(composed)
    }

    /// Affine mapping `target`-local points back into root space.
    pub fn local_to_root(&self, target: T::Id) -> Result<Affine, GestureError> {
        let path = self.path_from_root(target)?;
        let mut composed = Affine::IDENTITY;
        for pair in path.windows(2) {
            let (parent, child) = (pair[0], pair[1]);
            composed = composed
                * Affine::translate(-self.tree.scroll_offset(parent))
                * self.tree.transform(child);
        }
        Ok(composed)
    }

    /// Map a root-space point into `target`'s local space.
    pub fn to_local(&self, target: T::Id, point: Point) -> Result<Point, GestureError> {
        Ok(self.root_to_local(target)? * point)
    }

    /// Map a `target`-local point into root space.
    pub fn to_root(&self, target: T::Id, point: Point) -> Result<Point, GestureError> {
        Ok(self.local_to_root(target)? * point)
    }

    fn path_from_root(&self, target: T::Id) -> Result<SmallVec<[T::Id; 16]>, GestureError> {
        if !self.tree.contains(target) {
            return Err(GestureError::DetachedTarget);
        }
        let root = self.tree.root();
        let mut path: SmallVec<[T::Id; 16]> = SmallVec::new();
        let mut cur = target;
        loop {
            path.push(cur);
            if cur == root {
                break;
            }
            match self.tree.parent(cur) {
                Some(p) if self.tree.contains(p) => cur = p,
                _ => return Err(GestureError::DetachedTarget),
            }
        }
        path.reverse();
        Ok(path)
    }
}

fn invert(affine: Affine) -> Option<Affine> {
    let det = affine.determinant();
    if det == 0.0 || !det.is_finite() {
        return None;
    }
    Some(affine.inverse())
}
