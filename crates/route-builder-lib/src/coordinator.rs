//! Composition root wiring the four components together
//!
//! ```text
//! SearchInput  --submit-->   RouteMap::new_point
//! RouteMap     --add-->      PointList::add
//! PointList    --remove-->   RouteMap::remove_point
//! PointList    --exchange--> RouteMap::exchange
//! DragController --change--> PointList::change
//! ```
//!
//! Components are shared through `Rc<RefCell<_>>` and every callback only
//! borrows components other than the publisher, so no publish re-enters a
//! component that is already borrowed.

use crate::drag::DragController;
use crate::geocode::Geocoder;
use crate::geometry::GeoPoint;
use crate::list::{ListContainer, PointList, SharedList};
use crate::route_map::{MapView, RouteMap};
use crate::search::SearchInput;
use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

/// One waypoint as seen across the index-aligned structures
#[derive(Debug, Clone, PartialEq)]
pub struct Waypoint {
    pub index: usize,
    pub name: String,
    pub position: GeoPoint,
}

/// Owns the search box, map, list and drag controller for the app's lifetime
pub struct RouteBuilder {
    search: Rc<RefCell<SearchInput>>,
    map: Rc<RefCell<RouteMap>>,
    list: Rc<RefCell<PointList>>,
    drag: Rc<RefCell<DragController>>,
    container: SharedList,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl RouteBuilder {
    pub fn new(view: Box<dyn MapView>, geocoder: Box<dyn Geocoder>) -> Self {
        let container = ListContainer::shared();
        let search = Rc::new(RefCell::new(SearchInput::new()));
        let map = Rc::new(RefCell::new(RouteMap::new(view, geocoder)));
        let list = Rc::new(RefCell::new(PointList::new(container.clone())));
        let drag = Rc::new(RefCell::new(DragController::new(container.clone())));

        {
            let list = list.clone();
            map.borrow_mut()
                .on_add(move |label| {
                    list.borrow_mut().add(label);
                });
        }
        {
            let map = map.clone();
            search
                .borrow_mut()
                .on_submit(move |text| map.borrow_mut().new_point(text));
        }
        {
            let map = map.clone();
            list.borrow_mut()
                .on_remove(move |index| map.borrow_mut().remove_point(index).map(|_| ()));
        }
        {
            let map = map.clone();
            list.borrow_mut()
                .on_exchange(move |first, second| map.borrow_mut().exchange(first, second));
        }
        {
            let list = list.clone();
            drag.borrow_mut()
                .on_change(move |source, target| list.borrow_mut().change(source, target));
        }

        tracing::debug!("Route builder wired");

        Self {
            search,
            map,
            list,
            drag,
            container,
        }
    }

    /// Drive pending geocoding. Returns how many lookups settled.
    pub fn poll(&self) -> usize {
        self.map.borrow_mut().poll()
    }

    pub fn search_mut(&self) -> RefMut<'_, SearchInput> {
        self.search.borrow_mut()
    }

    pub fn map(&self) -> Ref<'_, RouteMap> {
        self.map.borrow()
    }

    pub fn map_mut(&self) -> RefMut<'_, RouteMap> {
        self.map.borrow_mut()
    }

    pub fn list_mut(&self) -> RefMut<'_, PointList> {
        self.list.borrow_mut()
    }

    pub fn drag(&self) -> Ref<'_, DragController> {
        self.drag.borrow()
    }

    pub fn drag_mut(&self) -> RefMut<'_, DragController> {
        self.drag.borrow_mut()
    }

    /// Sidebar rows
    pub fn rows(&self) -> Ref<'_, ListContainer> {
        self.container.borrow()
    }

    /// Waypoints in route order, named after their sidebar row
    pub fn waypoints(&self) -> Vec<Waypoint> {
        let map = self.map.borrow();
        let rows = self.container.borrow();
        rows.rows()
            .iter()
            .zip(map.line().geometry.points())
            .enumerate()
            .map(|(index, (row, position))| Waypoint {
                index,
                name: row.content().to_owned(),
                position,
            })
            .collect()
    }

    /// Whether the Nth marker, row and line vertex describe the same waypoint
    pub fn is_aligned(&self) -> bool {
        let map = self.map.borrow();
        let rows = self.container.borrow();
        let markers = map.markers();
        let line = &map.line().geometry;

        markers.len() == rows.len()
            && markers.len() == line.len()
            && markers
                .iter()
                .zip(rows.rows())
                .zip(line.points())
                .all(|((marker, row), vertex)| {
                    marker.icon_content() == row.content() && marker.position() == vertex
                })
    }
}
