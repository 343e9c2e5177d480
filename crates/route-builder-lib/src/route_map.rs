//! Map side of the route: markers, the route line and geocoding
//!
//! [`RouteMap`] keeps the point collection and the line geometry
//! index-aligned: the Nth marker always sits on the Nth line vertex. Every
//! mutating operation validates its indices before touching either
//! structure, so a failed call leaves both untouched.

use crate::event_bus::{Event, EventBus};
use crate::geocode::{GeocodeError, GeocodeResult, Geocoder, PendingLookup};
use crate::geometry::{GeoObject, GeoObjectCollection, GeoPoint, LineGeometry};
use crate::{Result, RouteError};
use geo::Rect;
use instant::Instant;
use std::collections::VecDeque;
use std::time::Duration;

/// How long a lookup may run before it is abandoned
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(15);

/// The visible map viewport
pub trait MapView {
    fn center(&self) -> GeoPoint;

    fn set_center(&mut self, center: GeoPoint);

    fn zoom(&self) -> f64;

    fn set_zoom(&mut self, zoom: f64);
}

/// Viewport without a renderer attached
#[derive(Debug, Clone, PartialEq)]
pub struct StaticView {
    pub center: GeoPoint,
    pub zoom: f64,
}

impl MapView for StaticView {
    fn center(&self) -> GeoPoint {
        self.center
    }

    fn set_center(&mut self, center: GeoPoint) {
        self.center = center;
    }

    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(u64);

/// A waypoint marker on the map
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    id: MarkerId,
    position: GeoPoint,
    icon_content: String,
    balloon_content: String,
    draggable: bool,
}

impl Marker {
    pub fn id(&self) -> MarkerId {
        self.id
    }

    pub fn position(&self) -> GeoPoint {
        self.position
    }

    /// Label drawn on the marker
    pub fn icon_content(&self) -> &str {
        &self.icon_content
    }

    /// Tooltip shown on hover
    pub fn balloon_content(&self) -> &str {
        &self.balloon_content
    }

    pub fn is_draggable(&self) -> bool {
        self.draggable
    }
}

impl GeoObject for Marker {
    type Id = MarkerId;

    fn id(&self) -> MarkerId {
        self.id
    }

    fn position(&self) -> GeoPoint {
        self.position
    }
}

/// The polyline joining the markers in order
#[derive(Debug, Clone, PartialEq)]
pub struct RouteLine {
    pub geometry: LineGeometry,
    /// Stroke colour as `[r, g, b]`
    pub stroke_color: [u8; 3],
    pub stroke_width: f32,
}

impl Default for RouteLine {
    fn default() -> Self {
        Self {
            geometry: LineGeometry::new(),
            stroke_color: [0xFF, 0x00, 0x00],
            stroke_width: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapEvent {
    /// A marker was created with this label
    Add { label: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapEventKind {
    Add,
}

impl MapEventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
        }
    }
}

impl Event for MapEvent {
    type Kind = MapEventKind;

    fn kind(&self) -> MapEventKind {
        match self {
            Self::Add { .. } => MapEventKind::Add,
        }
    }
}

struct InFlight {
    name: String,
    pending: PendingLookup,
    deadline: Instant,
}

/// Markers, route line and the geocoding queue feeding them.
///
/// Lookups run one at a time: a submission made while another lookup is in
/// flight waits in a queue, so waypoints are added in submission order no
/// matter how the service orders its responses. A lookup that has not
/// settled by its deadline is abandoned as [`GeocodeError::Cancelled`] so the
/// queue keeps moving.
pub struct RouteMap {
    view: Box<dyn MapView>,
    geocoder: Box<dyn Geocoder>,
    points: GeoObjectCollection<Marker>,
    line: RouteLine,
    queued: VecDeque<String>,
    in_flight: Option<InFlight>,
    lookup_timeout: Duration,
    next_marker_id: u64,
    bus: EventBus<MapEvent>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl RouteMap {
    pub fn new(view: Box<dyn MapView>, geocoder: Box<dyn Geocoder>) -> Self {
        Self {
            view,
            geocoder,
            points: GeoObjectCollection::new(),
            line: RouteLine::default(),
            queued: VecDeque::new(),
            in_flight: None,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
            next_marker_id: 0,
            bus: EventBus::new(),
        }
    }

    /// Abandon lookups still running `timeout` after they started
    pub fn set_lookup_timeout(&mut self, timeout: Duration) {
        self.lookup_timeout = timeout;
    }

    pub fn lookup_timeout(&self) -> Duration {
        self.lookup_timeout
    }

    pub fn on<F>(&mut self, kind: MapEventKind, callback: F)
    where
        F: FnMut(&MapEvent) + 'static,
    {
        self.bus.subscribe(kind, callback);
    }

    /// Subscribe to marker creation with the marker's label
    pub fn on_add<F>(&mut self, mut callback: F)
    where
        F: FnMut(&str) + 'static,
    {
        self.on(MapEventKind::Add, move |event| match event {
            MapEvent::Add { label } => callback(label),
        });
    }

    /// Geocode `name` and add a waypoint for it once the lookup settles.
    ///
    /// Nothing changes until [`RouteMap::poll`] observes the result.
    pub fn new_point(&mut self, name: &str) {
        tracing::debug!(name, queued = self.queued.len(), "Waypoint requested");
        self.queued.push_back(name.to_owned());
        self.start_next_lookup(Instant::now());
    }

    /// Apply settled lookups and start queued ones.
    ///
    /// Returns how many lookups settled during this call.
    pub fn poll(&mut self) -> usize {
        self.poll_at(Instant::now())
    }

    /// [`RouteMap::poll`] with `now` as the current time
    pub(crate) fn poll_at(&mut self, now: Instant) -> usize {
        #[cfg(feature = "profiling")]
        profiling::scope!("route_map::poll");
        let mut settled = 0;
        loop {
            self.start_next_lookup(now);
            let Some(lookup) = self.in_flight.as_mut() else {
                break;
            };
            let result = match lookup.pending.try_take() {
                Some(result) => result,
                None if now >= lookup.deadline => {
                    tracing::warn!(
                        name = %lookup.name,
                        timeout_ms = self.lookup_timeout.as_millis() as u64,
                        "Lookup timed out"
                    );
                    Err(GeocodeError::Cancelled)
                }
                None => break,
            };
            if let Some(lookup) = self.in_flight.take() {
                self.settle(&lookup.name, result);
                settled += 1;
            }
        }
        settled
    }

    /// Whether a lookup is running or waiting to run
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some() || !self.queued.is_empty()
    }

    /// Names waiting for a lookup slot, oldest first
    pub fn queued_lookups(&self) -> impl Iterator<Item = &str> {
        self.queued.iter().map(String::as_str)
    }

    /// Name currently being resolved
    pub fn lookup_in_flight(&self) -> Option<&str> {
        self.in_flight.as_ref().map(|lookup| lookup.name.as_str())
    }

    /// Remove the waypoint at `index` from the line and the markers
    pub fn remove_point(&mut self, index: usize) -> Result<Marker> {
        self.check_index(index)?;
        self.line.geometry.remove(index)?;
        let marker = self.points.remove(index)?;
        tracing::debug!(index, label = marker.icon_content(), "Waypoint removed");
        Ok(marker)
    }

    /// Swap the waypoints at `first` and `second` in every structure
    pub fn exchange(&mut self, first: usize, second: usize) -> Result<()> {
        self.check_index(first)?;
        self.check_index(second)?;
        if first == second {
            return Ok(());
        }

        self.points.swap(first, second)?;
        for index in [first, second] {
            if let Some(position) = self.points.get(index).map(Marker::position) {
                self.line.geometry.set(index, position)?;
            }
        }
        tracing::debug!(first, second, "Waypoints exchanged");
        Ok(())
    }

    /// A marker was dragged to `position`; keep the line attached to it
    pub fn marker_dragged(&mut self, id: MarkerId, position: GeoPoint) -> Result<()> {
        let len = self.points.len();
        let index = self
            .points
            .index_of(id)
            .ok_or(RouteError::UnknownMarker(id))?;
        self.check_index(index)?;

        let marker = self
            .points
            .get_mut(index)
            .ok_or(RouteError::IndexOutOfRange { index, len })?;
        marker.position = position;
        self.line.geometry.set(index, position)?;
        Ok(())
    }

    pub fn markers(&self) -> &GeoObjectCollection<Marker> {
        &self.points
    }

    pub fn line(&self) -> &RouteLine {
        &self.line
    }

    pub fn line_mut(&mut self) -> &mut RouteLine {
        &mut self.line
    }

    pub fn view(&self) -> &dyn MapView {
        self.view.as_ref()
    }

    pub fn view_mut(&mut self) -> &mut dyn MapView {
        self.view.as_mut()
    }

    /// Bounding box of all markers, `None` without markers
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.points.bounding_box()
    }

    /// Start the oldest queued lookup, due `lookup_timeout` after `now`
    fn start_next_lookup(&mut self, now: Instant) {
        if self.in_flight.is_some() {
            return;
        }
        if let Some(name) = self.queued.pop_front() {
            tracing::debug!(%name, "Geocoding");
            let pending = self.geocoder.lookup(&name);
            self.in_flight = Some(InFlight {
                name,
                pending,
                deadline: now + self.lookup_timeout,
            });
        }
    }

    fn settle(&mut self, name: &str, result: GeocodeResult) {
        let position = match result {
            Ok(Some(position)) => position,
            Ok(None) => {
                tracing::info!(name, "No match, placing waypoint at the view center");
                self.view.center()
            }
            Err(error) => {
                tracing::error!(name, %error, "Geocoding failed");
                return;
            }
        };

        self.view.set_center(position);
        self.create_point(position, name);
    }

    fn create_point(&mut self, position: GeoPoint, name: &str) {
        let marker = Marker {
            id: MarkerId(self.next_marker_id),
            position,
            icon_content: name.to_owned(),
            balloon_content: name.to_owned(),
            draggable: true,
        };
        self.next_marker_id += 1;

        let label = marker.icon_content.clone();
        self.points.add(marker);
        self.insert_point_into_line(position);

        tracing::info!(
            name,
            lat = position.y(),
            lon = position.x(),
            index = self.points.len() - 1,
            "Waypoint added"
        );
        self.bus.publish(&MapEvent::Add { label });
    }

    fn insert_point_into_line(&mut self, position: GeoPoint) {
        let index = self.points.len() - 1;
        if let Err(error) = self.line.geometry.insert(index, position) {
            tracing::error!(%error, "Route line out of step with markers");
        }
    }

    fn check_index(&self, index: usize) -> Result<()> {
        let len = self.points.len();
        if index >= len || index >= self.line.geometry.len() {
            return Err(RouteError::IndexOutOfRange { index, len });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocode::fake::{ManualGeocoder, TableGeocoder};
    use crate::geometry::lat_lon;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn home() -> GeoPoint {
        lat_lon(51.66082, 39.200404)
    }

    fn view() -> Box<StaticView> {
        Box::new(StaticView {
            center: home(),
            zoom: 5.0,
        })
    }

    fn table() -> TableGeocoder {
        TableGeocoder::default()
            .with("Moscow", lat_lon(55.7558, 37.6173))
            .with("Paris", lat_lon(48.8566, 2.3522))
            .with("Berlin", lat_lon(52.52, 13.405))
            .failing("Atlantis")
    }

    fn labels(map: &RouteMap) -> Vec<&str> {
        map.markers().iter().map(Marker::icon_content).collect()
    }

    fn assert_line_follows_markers(map: &RouteMap) {
        assert_eq!(map.markers().len(), map.line().geometry.len());
        for (index, marker) in map.markers().iter().enumerate() {
            assert_eq!(map.line().geometry.get(index), Some(marker.position()));
        }
    }

    fn map_with(names: &[&str]) -> RouteMap {
        let mut map = RouteMap::new(view(), Box::new(table()));
        for name in names {
            map.new_point(name);
        }
        map.poll();
        map
    }

    #[test]
    fn test_new_point_adds_marker_and_vertex() {
        let map = map_with(&["Moscow"]);

        assert_eq!(labels(&map), vec!["Moscow"]);
        assert_eq!(map.line().geometry.get(0), Some(lat_lon(55.7558, 37.6173)));
        assert_eq!(map.view().center(), lat_lon(55.7558, 37.6173));
        assert!(map.markers().get(0).unwrap().is_draggable());
        assert!(!map.is_busy());
    }

    #[test]
    fn test_not_found_uses_view_center() {
        let map = map_with(&["Nowhere"]);

        assert_eq!(labels(&map), vec!["Nowhere"]);
        assert_eq!(map.markers().get(0).unwrap().position(), home());
        assert_line_follows_markers(&map);
    }

    #[test]
    fn test_failed_lookup_adds_nothing() {
        let added = Rc::new(RefCell::new(0));
        let mut map = RouteMap::new(view(), Box::new(table()));
        {
            let added = added.clone();
            map.on_add(move |_| *added.borrow_mut() += 1);
        }

        map.new_point("Atlantis");
        assert_eq!(map.poll(), 1);

        assert!(map.markers().is_empty());
        assert!(map.line().geometry.is_empty());
        assert_eq!(map.view().center(), home());
        assert_eq!(*added.borrow(), 0);
    }

    #[test]
    fn test_add_event_sees_complete_waypoint() {
        let mut map = RouteMap::new(view(), Box::new(table()));
        let seen = Rc::new(RefCell::new(Vec::new()));
        {
            let seen = seen.clone();
            map.on_add(move |label| seen.borrow_mut().push(label.to_owned()));
        }

        map.new_point("Moscow");
        map.new_point("Paris");
        map.poll();

        assert_eq!(*seen.borrow(), vec!["Moscow", "Paris"]);
        assert_line_follows_markers(&map);
    }

    #[test]
    fn test_remove_point() {
        let mut map = map_with(&["Moscow", "Paris", "Berlin"]);

        let removed = map.remove_point(1).unwrap();

        assert_eq!(removed.icon_content(), "Paris");
        assert_eq!(labels(&map), vec!["Moscow", "Berlin"]);
        assert_line_follows_markers(&map);
    }

    #[test]
    fn test_remove_out_of_range_leaves_state() {
        let mut map = map_with(&["Moscow"]);

        assert!(matches!(
            map.remove_point(3),
            Err(RouteError::IndexOutOfRange { index: 3, len: 1 })
        ));
        assert_eq!(labels(&map), vec!["Moscow"]);
        assert_line_follows_markers(&map);
    }

    #[test]
    fn test_readding_appends_at_end() {
        let mut map = map_with(&["Moscow", "Paris", "Berlin"]);

        map.remove_point(0).unwrap();
        map.new_point("Moscow");
        map.poll();

        assert_eq!(labels(&map), vec!["Paris", "Berlin", "Moscow"]);
        assert_line_follows_markers(&map);
    }

    #[test]
    fn test_exchange_swaps_markers_and_vertices() {
        let mut map = map_with(&["Moscow", "Paris", "Berlin"]);

        map.exchange(0, 2).unwrap();

        assert_eq!(labels(&map), vec!["Berlin", "Paris", "Moscow"]);
        assert_line_follows_markers(&map);
    }

    #[test]
    fn test_exchange_is_its_own_inverse() {
        let mut map = map_with(&["Moscow", "Paris", "Berlin"]);
        let before: Vec<Marker> = map.markers().iter().cloned().collect();
        let line_before = map.line().geometry.clone();

        map.exchange(2, 0).unwrap();
        map.exchange(2, 0).unwrap();

        let after: Vec<Marker> = map.markers().iter().cloned().collect();
        assert_eq!(before, after);
        assert_eq!(line_before, map.line().geometry);
    }

    #[test]
    fn test_exchange_rejects_bad_index_without_mutation() {
        let mut map = map_with(&["Moscow", "Paris"]);

        assert!(map.exchange(0, 5).is_err());
        assert_eq!(labels(&map), vec!["Moscow", "Paris"]);
    }

    #[test]
    fn test_marker_drag_moves_vertex() {
        let mut map = map_with(&["Moscow", "Paris"]);
        let id = map.markers().get(1).unwrap().id();
        let moved = lat_lon(48.0, 2.0);

        map.marker_dragged(id, moved).unwrap();

        assert_eq!(map.markers().get(1).unwrap().position(), moved);
        assert_eq!(map.line().geometry.get(1), Some(moved));
    }

    #[test]
    fn test_marker_drag_follows_exchanged_index() {
        let mut map = map_with(&["Moscow", "Paris"]);
        let moscow = map.markers().get(0).unwrap().id();
        map.exchange(0, 1).unwrap();

        map.marker_dragged(moscow, lat_lon(56.0, 38.0)).unwrap();

        assert_eq!(map.line().geometry.get(1), Some(lat_lon(56.0, 38.0)));
        assert_line_follows_markers(&map);
    }

    #[test]
    fn test_lookups_are_serialized_in_submission_order() {
        let geocoder = ManualGeocoder::default();
        let mut map = RouteMap::new(view(), Box::new(geocoder.clone()));

        map.new_point("Moscow");
        map.new_point("Paris");
        assert_eq!(geocoder.started_count(), 1);
        assert_eq!(map.lookup_in_flight(), Some("Moscow"));
        assert_eq!(map.queued_lookups().collect::<Vec<_>>(), vec!["Paris"]);

        assert!(geocoder.resolve("Moscow", Ok(Some(lat_lon(55.7558, 37.6173)))));
        assert_eq!(map.poll(), 1);
        assert_eq!(geocoder.started_count(), 1);
        assert_eq!(map.lookup_in_flight(), Some("Paris"));

        assert!(geocoder.resolve("Paris", Ok(Some(lat_lon(48.8566, 2.3522)))));
        map.poll();

        assert_eq!(labels(&map), vec!["Moscow", "Paris"]);
        assert!(!map.is_busy());
    }

    #[test]
    fn test_poll_while_pending_changes_nothing() {
        let geocoder = ManualGeocoder::default();
        let mut map = RouteMap::new(view(), Box::new(geocoder.clone()));

        map.new_point("Moscow");

        assert_eq!(map.poll(), 0);
        assert!(map.markers().is_empty());
        assert!(map.is_busy());
    }

    #[test]
    fn test_hung_lookup_times_out_and_queue_moves_on() {
        let geocoder = ManualGeocoder::default();
        let mut map = RouteMap::new(view(), Box::new(geocoder.clone()));
        map.set_lookup_timeout(Duration::from_secs(5));

        map.new_point("Moscow");
        map.new_point("Paris");
        map.new_point("Berlin");
        let started = Instant::now();

        assert_eq!(map.poll_at(started + Duration::from_secs(4)), 0);
        assert_eq!(map.lookup_in_flight(), Some("Moscow"));

        assert_eq!(map.poll_at(started + Duration::from_secs(6)), 1);
        assert_eq!(map.lookup_in_flight(), Some("Paris"));
        assert_eq!(map.queued_lookups().collect::<Vec<_>>(), vec!["Berlin"]);
        assert!(map.markers().is_empty());

        assert!(geocoder.resolve("Paris", Ok(Some(lat_lon(48.8566, 2.3522)))));
        map.poll();
        assert!(geocoder.resolve("Berlin", Ok(Some(lat_lon(52.52, 13.405)))));
        map.poll();

        assert_eq!(labels(&map), vec!["Paris", "Berlin"]);
        assert!(!map.is_busy());
        assert_line_follows_markers(&map);
    }

    #[test]
    fn test_late_answer_after_timeout_is_dropped() {
        let geocoder = ManualGeocoder::default();
        let mut map = RouteMap::new(view(), Box::new(geocoder.clone()));
        map.set_lookup_timeout(Duration::from_secs(1));

        map.new_point("Moscow");
        map.poll_at(Instant::now() + Duration::from_secs(2));
        assert!(!map.is_busy());

        assert!(geocoder.resolve("Moscow", Ok(Some(lat_lon(55.7558, 37.6173)))));
        assert_eq!(map.poll(), 0);
        assert!(map.markers().is_empty());
    }

    #[test]
    fn test_cancelled_lookup_moves_on() {
        let geocoder = ManualGeocoder::default();
        let mut map = RouteMap::new(view(), Box::new(geocoder.clone()));

        map.new_point("Moscow");
        map.new_point("Paris");
        assert!(geocoder.resolve("Moscow", Err(GeocodeError::Cancelled)));
        map.poll();

        assert!(map.markers().is_empty());
        assert_eq!(map.lookup_in_flight(), Some("Paris"));
    }

    #[test]
    fn test_bounds() {
        let map = map_with(&["Moscow", "Paris"]);
        let bounds = map.bounds().unwrap();

        assert_eq!(bounds.min().x, 2.3522);
        assert_eq!(bounds.max().y, 55.7558);
    }
}
