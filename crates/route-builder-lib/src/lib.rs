//! Route Builder Library - Core Model of the Interactive Route Builder
//!
//! This library holds everything about building a route that does not depend
//! on a renderer: the search box, the sidebar list with drag-and-drop
//! reordering, the map model with markers and the route polyline, and the
//! composition root wiring them together through per-component event buses.
//!
//! # Architecture
//!
//! - **[`EventBus`]**: Typed publish/subscribe owned by each component
//! - **[`SearchInput`]**: Submits place names on Enter
//! - **[`RouteMap`]**: Geocodes names into markers and line vertices
//! - **[`PointList`]**: Sidebar rows with delete controls
//! - **[`DragController`]**: Swaps row content on drop
//! - **[`RouteBuilder`]**: Wires the above so the Nth marker, row and line
//!   vertex always describe the same waypoint
//!
//! Geocoding is abstracted behind [`Geocoder`]; the front end supplies the
//! HTTP implementation and tests supply in-memory ones.

mod coordinator;
mod drag;
mod event_bus;
mod geocode;
mod geometry;
mod list;
mod route_map;
mod search;
pub mod utils;

// Public API exports
pub use coordinator::{RouteBuilder, Waypoint};
pub use drag::{DragController, DragEvent, DragEventKind, MouseButton};
pub use event_bus::{Event, EventBus};
pub use geocode::{GeocodeError, GeocodeResult, Geocoder, LookupResolver, PendingLookup};
pub use geometry::{GeoObject, GeoObjectCollection, GeoPoint, LineGeometry, lat_lon};
pub use list::{
    ClickTarget, ListContainer, ListEvent, ListEventKind, ListRow, PointList, RowClass, RowId,
    SharedList,
};
pub use route_map::{
    DEFAULT_LOOKUP_TIMEOUT, MapEvent, MapEventKind, MapView, Marker, MarkerId, RouteLine,
    RouteMap, StaticView,
};
pub use search::{KeyCode, SearchEvent, SearchEventKind, SearchInput};

/// Error types for route editing
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RouteError {
    #[error("index {index} out of range for {len} waypoints")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("row {0:?} is not in the list")]
    UnknownRow(RowId),

    #[error("marker {0:?} is not on the map")]
    UnknownMarker(MarkerId),

    #[error("geocoding error: {0}")]
    Geocode(#[from] GeocodeError),
}

pub type Result<T> = std::result::Result<T, RouteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_exports() {
        // Verify that all public types are accessible
        let _: fn() -> SearchInput = SearchInput::new;
        let _: fn(SharedList) -> PointList = PointList::new;
        let _: fn(SharedList) -> DragController = DragController::new;
        let _: fn(f64, f64) -> GeoPoint = lat_lon;
    }

    #[test]
    fn test_error_messages() {
        let error = RouteError::IndexOutOfRange { index: 4, len: 2 };
        assert_eq!(error.to_string(), "index 4 out of range for 2 waypoints");

        let error: RouteError = GeocodeError::Status(503).into();
        assert_eq!(
            error.to_string(),
            "geocoding error: service responded with status 503"
        );
    }
}
