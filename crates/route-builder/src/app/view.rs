//! Map viewport backed by the walkers map memory

use route_builder_lib::{GeoPoint, MapView, lat_lon};
use std::cell::RefCell;
use std::rc::Rc;
use walkers::{MapMemory, Position};

/// [`MapView`] over the [`MapMemory`] the map widget renders from.
///
/// Until the user pans (or the view is centered explicitly) the map follows
/// `home`, so that is the center reported.
pub struct WalkersView {
    memory: Rc<RefCell<MapMemory>>,
    home: Position,
}

impl WalkersView {
    pub fn new(memory: Rc<RefCell<MapMemory>>, home: Position) -> Self {
        Self { memory, home }
    }
}

impl MapView for WalkersView {
    fn center(&self) -> GeoPoint {
        let position = self.memory.borrow().detached().unwrap_or(self.home);
        lat_lon(position.y(), position.x())
    }

    fn set_center(&mut self, center: GeoPoint) {
        self.memory
            .borrow_mut()
            .center_at(walkers::lat_lon(center.y(), center.x()));
    }

    fn zoom(&self) -> f64 {
        self.memory.borrow().zoom()
    }

    fn set_zoom(&mut self, zoom: f64) {
        if let Err(e) = self.memory.borrow_mut().set_zoom(zoom) {
            tracing::warn!(zoom, "Zoom rejected: {:?}", e);
        }
    }
}
