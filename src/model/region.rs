use std::fmt::Write as _;
use std::iter::Peekable;
use std::ops::{BitAnd, BitOr, Not};
use std::str::Chars;

use crate::error::{ModelError, Result};
use crate::geometry::{Aabb, Side};
use crate::math::Point3;

use super::{GeometryStore, SurfaceId};

/// A boolean combination of surface half-spaces.
///
/// Regions reference surfaces by ID, so containment and bounds are always
/// evaluated against a [`GeometryStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum Region {
    /// One side of a single surface.
    HalfSpace { surface: SurfaceId, side: Side },
    /// Points inside every child. Empty means all of space.
    Intersection(Vec<Region>),
    /// Points inside any child. Empty means nothing.
    Union(Vec<Region>),
    /// Points outside the child.
    Complement(Box<Region>),
}

impl Region {
    /// The half-space `f(p) <= 0` of `surface`.
    #[must_use]
    pub fn below(surface: SurfaceId) -> Self {
        Self::HalfSpace {
            surface,
            side: Side::Negative,
        }
    }

    /// The half-space `f(p) > 0` of `surface`.
    #[must_use]
    pub fn above(surface: SurfaceId) -> Self {
        Self::HalfSpace {
            surface,
            side: Side::Positive,
        }
    }

    /// Tests whether `point` lies inside the region.
    ///
    /// # Errors
    ///
    /// Returns an error if a referenced surface is missing from the store.
    pub fn contains(&self, store: &GeometryStore, point: &Point3) -> Result<bool> {
        match self {
            Self::HalfSpace { surface, side } => Ok(store
                .surface(*surface)?
                .quadric
                .half_space_contains(*side, point)),
            Self::Intersection(nodes) => {
                for node in nodes {
                    if !node.contains(store, point)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Self::Union(nodes) => {
                for node in nodes {
                    if node.contains(store, point)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Self::Complement(node) => Ok(!node.contains(store, point)?),
        }
    }

    /// Axis-aligned bounds of the region, infinite where unbounded.
    ///
    /// # Errors
    ///
    /// Returns an error if a referenced surface is missing from the store.
    pub fn bounding_box(&self, store: &GeometryStore) -> Result<Aabb> {
        match self {
            Self::HalfSpace { surface, side } => {
                Ok(store.surface(*surface)?.quadric.half_space_bounds(*side))
            }
            Self::Intersection(nodes) => nodes.iter().try_fold(Aabb::infinite(), |acc, n| {
                Ok(acc.intersection(&n.bounding_box(store)?))
            }),
            Self::Union(nodes) => nodes
                .iter()
                .try_fold(Aabb::empty(), |acc, n| Ok(acc.union(&n.bounding_box(store)?))),
            Self::Complement(node) => node.negated().bounding_box(store),
        }
    }

    /// The complement pushed down to the half-spaces (De Morgan).
    #[must_use]
    pub fn negated(&self) -> Self {
        match self {
            Self::HalfSpace { surface, side } => Self::HalfSpace {
                surface: *surface,
                side: match side {
                    Side::Positive => Side::Negative,
                    Side::Negative => Side::Positive,
                },
            },
            Self::Intersection(nodes) => Self::Union(nodes.iter().map(Self::negated).collect()),
            Self::Union(nodes) => Self::Intersection(nodes.iter().map(Self::negated).collect()),
            Self::Complement(node) => (**node).clone(),
        }
    }

    /// Surfaces referenced by the region, in first-seen order.
    #[must_use]
    pub fn surfaces(&self) -> Vec<SurfaceId> {
        let mut out = Vec::new();
        self.collect_surfaces(&mut out);
        out
    }

    fn collect_surfaces(&self, out: &mut Vec<SurfaceId>) {
        match self {
            Self::HalfSpace { surface, .. } => {
                if !out.contains(surface) {
                    out.push(*surface);
                }
            }
            Self::Intersection(nodes) | Self::Union(nodes) => {
                for node in nodes {
                    node.collect_surfaces(out);
                }
            }
            Self::Complement(node) => node.collect_surfaces(out),
        }
    }

    /// Rebuilds the region with every surface replaced by `f(surface)`.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by `f`.
    pub fn try_map_surfaces<F>(&self, f: &mut F) -> Result<Self>
    where
        F: FnMut(SurfaceId) -> Result<SurfaceId>,
    {
        Ok(match self {
            Self::HalfSpace { surface, side } => Self::HalfSpace {
                surface: f(*surface)?,
                side: *side,
            },
            Self::Intersection(nodes) => Self::Intersection(
                nodes
                    .iter()
                    .map(|n| n.try_map_surfaces(f))
                    .collect::<Result<_>>()?,
            ),
            Self::Union(nodes) => Self::Union(
                nodes
                    .iter()
                    .map(|n| n.try_map_surfaces(f))
                    .collect::<Result<_>>()?,
            ),
            Self::Complement(node) => Self::Complement(Box::new(node.try_map_surfaces(f)?)),
        })
    }

    /// Formats the region as an expression over user-facing surface IDs,
    /// e.g. `(1 -2 | ~(3 4))`.
    ///
    /// # Errors
    ///
    /// Returns an error if a referenced surface is missing from the store.
    pub fn to_expression(&self, store: &GeometryStore) -> Result<String> {
        let mut out = String::new();
        self.write_expression(store, &mut out)?;
        Ok(out)
    }

    fn write_expression(&self, store: &GeometryStore, out: &mut String) -> Result<()> {
        match self {
            Self::HalfSpace { surface, side } => {
                let id = store.surface(*surface)?.id;
                match side {
                    Side::Negative => {
                        let _ = write!(out, "-{id}");
                    }
                    Side::Positive => {
                        let _ = write!(out, "{id}");
                    }
                }
            }
            Self::Intersection(nodes) | Self::Union(nodes) => {
                let sep = if matches!(self, Self::Union(_)) { " | " } else { " " };
                out.push('(');
                for (i, node) in nodes.iter().enumerate() {
                    if i > 0 {
                        out.push_str(sep);
                    }
                    node.write_expression(store, out)?;
                }
                out.push(')');
            }
            Self::Complement(node) => {
                out.push('~');
                node.write_expression(store, out)?;
            }
        }
        Ok(())
    }

    /// Parses an expression such as `-1 2 | ~(3 | -4)`.
    ///
    /// Juxtaposition is intersection and binds tighter than `|`. Surface
    /// IDs are resolved through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed input or unknown surface IDs.
    pub fn parse<F>(expression: &str, lookup: F) -> Result<Self>
    where
        F: Fn(u32) -> Option<SurfaceId>,
    {
        let mut parser = ExpressionParser {
            source: expression,
            chars: expression.chars().peekable(),
            lookup,
        };
        let region = parser.union()?;
        parser.skip_whitespace();
        if let Some(c) = parser.chars.peek().copied() {
            return Err(parser.error(format!("unexpected '{c}'")));
        }
        Ok(region)
    }
}

struct ExpressionParser<'a, F> {
    source: &'a str,
    chars: Peekable<Chars<'a>>,
    lookup: F,
}

impl<F> ExpressionParser<'_, F>
where
    F: Fn(u32) -> Option<SurfaceId>,
{
    fn error(&self, reason: String) -> crate::error::CsgError {
        ModelError::RegionSyntax {
            expression: self.source.to_owned(),
            reason,
        }
        .into()
    }

    fn skip_whitespace(&mut self) {
        while self.chars.peek().is_some_and(|c| c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn starts_operand(&mut self) -> bool {
        self.skip_whitespace();
        self.chars
            .peek()
            .is_some_and(|&c| c == '~' || c == '(' || c == '+' || c == '-' || c.is_ascii_digit())
    }

    fn union(&mut self) -> Result<Region> {
        let mut nodes = vec![self.intersection()?];
        loop {
            self.skip_whitespace();
            if self.chars.peek() != Some(&'|') {
                break;
            }
            self.chars.next();
            nodes.push(self.intersection()?);
        }
        Ok(if nodes.len() == 1 {
            nodes.remove(0)
        } else {
            Region::Union(nodes)
        })
    }

    fn intersection(&mut self) -> Result<Region> {
        let mut nodes = Vec::new();
        while self.starts_operand() {
            nodes.push(self.unary()?);
        }
        match nodes.len() {
            0 => Err(self.error("expected an operand".into())),
            1 => Ok(nodes.remove(0)),
            _ => Ok(Region::Intersection(nodes)),
        }
    }

    fn unary(&mut self) -> Result<Region> {
        self.skip_whitespace();
        match self.chars.peek().copied() {
            Some('~') => {
                self.chars.next();
                Ok(Region::Complement(Box::new(self.unary()?)))
            }
            Some('(') => {
                self.chars.next();
                let inner = self.union()?;
                self.skip_whitespace();
                if self.chars.next() != Some(')') {
                    return Err(self.error("unbalanced parenthesis".into()));
                }
                Ok(inner)
            }
            _ => self.half_space(),
        }
    }

    fn half_space(&mut self) -> Result<Region> {
        let side = match self.chars.peek() {
            Some('-') => {
                self.chars.next();
                Side::Negative
            }
            Some('+') => {
                self.chars.next();
                Side::Positive
            }
            _ => Side::Positive,
        };
        let mut digits = String::new();
        while let Some(c) = self.chars.peek().copied().filter(char::is_ascii_digit) {
            digits.push(c);
            self.chars.next();
        }
        let id: u32 = digits
            .parse()
            .map_err(|_| self.error(format!("invalid surface ID \"{digits}\"")))?;
        let surface = (self.lookup)(id)
            .ok_or_else(|| self.error(format!("unknown surface {id}")))?;
        Ok(Region::HalfSpace { surface, side })
    }
}

impl BitAnd for Region {
    type Output = Region;

    fn bitand(self, rhs: Region) -> Region {
        match self {
            Region::Intersection(mut nodes) => {
                nodes.push(rhs);
                Region::Intersection(nodes)
            }
            lhs => Region::Intersection(vec![lhs, rhs]),
        }
    }
}

impl BitOr for Region {
    type Output = Region;

    fn bitor(self, rhs: Region) -> Region {
        match self {
            Region::Union(mut nodes) => {
                nodes.push(rhs);
                Region::Union(nodes)
            }
            lhs => Region::Union(vec![lhs, rhs]),
        }
    }
}

impl Not for Region {
    type Output = Region;

    fn not(self) -> Region {
        Region::Complement(Box::new(self))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::geometry::Quadric;
    use crate::model::SurfaceData;

    fn slab(store: &mut GeometryStore, lo: f64, hi: f64) -> (SurfaceId, SurfaceId, Region) {
        let a = store.insert_surface(SurfaceData::new(None, Quadric::XPlane { x0: lo }));
        let b = store.insert_surface(SurfaceData::new(None, Quadric::XPlane { x0: hi }));
        (a, b, Region::above(a) & Region::below(b))
    }

    #[test]
    fn slab_contains_interior_points() {
        let mut store = GeometryStore::new();
        let (_, _, region) = slab(&mut store, 0.0, 1.0);
        assert!(region.contains(&store, &Point3::new(0.5, 9.0, -9.0)).unwrap());
        assert!(!region.contains(&store, &Point3::new(1.5, 0.0, 0.0)).unwrap());
        assert!(!(!region.clone())
            .contains(&store, &Point3::new(0.5, 0.0, 0.0))
            .unwrap());
    }

    #[test]
    fn complement_bounds_follow_de_morgan() {
        let mut store = GeometryStore::new();
        let a = store.insert_surface(SurfaceData::new(None, Quadric::XPlane { x0: 2.0 }));
        let bounds = (!Region::above(a)).bounding_box(&store).unwrap();
        assert!((bounds.max.x - 2.0).abs() < 1e-12);
        assert!(bounds.min.x.is_infinite());
    }

    #[test]
    fn expression_round_trips_through_parser() {
        let mut store = GeometryStore::new();
        let (a, b, region) = slab(&mut store, 0.0, 1.0);
        let region = region | !Region::below(a);
        let text = region.to_expression(&store).unwrap();

        let by_id: HashMap<u32, SurfaceId> = [a, b]
            .into_iter()
            .map(|s| (store.surface(s).unwrap().id, s))
            .collect();
        let parsed = Region::parse(&text, |id| by_id.get(&id).copied()).unwrap();
        assert_eq!(parsed, region);
    }

    #[test]
    fn parser_respects_precedence() {
        let mut store = GeometryStore::new();
        let a = store.insert_surface(SurfaceData::new(Some(9001), Quadric::XPlane { x0: 0.0 }));
        let b = store.insert_surface(SurfaceData::new(Some(9002), Quadric::YPlane { y0: 0.0 }));
        let c = store.insert_surface(SurfaceData::new(Some(9003), Quadric::ZPlane { z0: 0.0 }));
        let lookup = |id| match id {
            9001 => Some(a),
            9002 => Some(b),
            9003 => Some(c),
            _ => None,
        };
        let parsed = Region::parse("-9001 +9002 | 9003", lookup).unwrap();
        let expected = (Region::below(a) & Region::above(b)) | Region::above(c);
        assert_eq!(parsed, expected);
    }

    #[test]
    fn parser_rejects_malformed_input() {
        let lookup = |_| None;
        assert!(Region::parse("(1 2", lookup).is_err());
        assert!(Region::parse("", lookup).is_err());
        assert!(Region::parse("7", lookup).is_err());
    }

    #[test]
    fn trailing_characters_are_reported() {
        let mut store = GeometryStore::new();
        let a = store.insert_surface(SurfaceData::new(None, Quadric::XPlane { x0: 0.0 }));
        let err = Region::parse("-1 )", |_| Some(a)).unwrap_err();
        assert!(err.to_string().contains("unexpected ')'"), "{err}");
    }
}
