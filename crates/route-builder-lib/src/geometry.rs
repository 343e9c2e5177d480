//! Geometry and ordered collections backing the map
//!
//! [`LineGeometry`] is the editable vertex list of the route polyline and
//! [`GeoObjectCollection`] is the ordered container of map objects. Both
//! validate indices and report [`RouteError::IndexOutOfRange`] instead of
//! panicking.

use crate::{Result, RouteError};
use geo::{BoundingRect, Coord, LineString, MultiPoint, Point, Rect};
use std::fmt;

/// WGS84 position, `x` is longitude and `y` is latitude
pub type GeoPoint = Point<f64>;

/// Build a [`GeoPoint`] from latitude and longitude in degrees
#[inline]
pub fn lat_lon(lat: f64, lon: f64) -> GeoPoint {
    Point::new(lon, lat)
}

/// Vertex list of a polyline, editable by index
#[derive(Clone, Debug, PartialEq)]
pub struct LineGeometry {
    line: LineString<f64>,
}

impl LineGeometry {
    pub fn new() -> Self {
        Self {
            line: LineString::new(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.line.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.line.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<GeoPoint> {
        self.line.0.get(index).copied().map(Point::from)
    }

    /// Overwrite the vertex at `index`
    pub fn set(&mut self, index: usize, point: GeoPoint) -> Result<()> {
        let len = self.len();
        let vertex = self
            .line
            .0
            .get_mut(index)
            .ok_or(RouteError::IndexOutOfRange { index, len })?;
        *vertex = point.into();
        Ok(())
    }

    /// Insert a vertex before `index`; `index == len` appends
    pub fn insert(&mut self, index: usize, point: GeoPoint) -> Result<()> {
        let len = self.len();
        if index > len {
            return Err(RouteError::IndexOutOfRange { index, len });
        }
        self.line.0.insert(index, point.into());
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<GeoPoint> {
        let len = self.len();
        if index >= len {
            return Err(RouteError::IndexOutOfRange { index, len });
        }
        Ok(self.line.0.remove(index).into())
    }

    /// Remove up to `delete_count` vertices starting at `index` and insert
    /// `items` in their place. Returns the removed vertices.
    pub fn splice<I>(&mut self, index: usize, delete_count: usize, items: I) -> Result<Vec<GeoPoint>>
    where
        I: IntoIterator<Item = GeoPoint>,
    {
        let len = self.len();
        if index > len {
            return Err(RouteError::IndexOutOfRange { index, len });
        }
        let end = index.saturating_add(delete_count).min(len);
        let removed = self
            .line
            .0
            .splice(index..end, items.into_iter().map(Coord::from))
            .map(Point::from)
            .collect();
        Ok(removed)
    }

    pub fn points(&self) -> impl Iterator<Item = GeoPoint> + '_ {
        self.line.points()
    }

    pub fn as_line_string(&self) -> &LineString<f64> {
        &self.line
    }
}

impl Default for LineGeometry {
    fn default() -> Self {
        Self::new()
    }
}

/// Something that lives in a [`GeoObjectCollection`]
pub trait GeoObject {
    type Id: Copy + PartialEq + fmt::Debug;

    fn id(&self) -> Self::Id;

    fn position(&self) -> GeoPoint;
}

/// Ordered container of map objects
#[derive(Clone, Debug)]
pub struct GeoObjectCollection<T> {
    objects: Vec<T>,
}

impl<T: GeoObject> GeoObjectCollection<T> {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Append an object as the last member
    pub fn add(&mut self, object: T) {
        self.objects.push(object);
    }

    pub fn insert(&mut self, index: usize, object: T) -> Result<()> {
        let len = self.len();
        if index > len {
            return Err(RouteError::IndexOutOfRange { index, len });
        }
        self.objects.insert(index, object);
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<T> {
        let len = self.len();
        if index >= len {
            return Err(RouteError::IndexOutOfRange { index, len });
        }
        Ok(self.objects.remove(index))
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.objects.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.objects.get_mut(index)
    }

    /// Current position of the object with `id`
    pub fn index_of(&self, id: T::Id) -> Option<usize> {
        self.objects.iter().position(|object| object.id() == id)
    }

    /// Trade the slots of two members
    pub fn swap(&mut self, first: usize, second: usize) -> Result<()> {
        let len = self.len();
        for index in [first, second] {
            if index >= len {
                return Err(RouteError::IndexOutOfRange { index, len });
            }
        }
        self.objects.swap(first, second);
        Ok(())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.objects.iter()
    }

    /// Smallest rectangle containing every member, `None` when empty
    pub fn bounding_box(&self) -> Option<Rect<f64>> {
        let points: MultiPoint<f64> = self.objects.iter().map(GeoObject::position).collect();
        points.bounding_rect()
    }
}

impl<T: GeoObject> Default for GeoObjectCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> IntoIterator for &'a GeoObjectCollection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects.iter()
    }
}
