//! Sidebar waypoint list
//!
//! [`ListContainer`] plays the part of the list element: an ordered set of
//! rows with a stable identity, rendered content and transient drag state.
//! It is shared between [`PointList`], which owns the row lifecycle, and the
//! [`DragController`](crate::DragController), which swaps row content.

use crate::event_bus::{Event, EventBus};
use crate::{Result, RouteError};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

/// Identity of a row, stable for the row's whole life
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(u64);

/// Visual state classes a row can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RowClass {
    /// Row is being dragged
    Draggable,
    /// Row is the current drop target
    Dropzone,
}

/// One child of the list container
#[derive(Debug, Clone)]
pub struct ListRow {
    id: RowId,
    content: String,
    draggable: bool,
    classes: BTreeSet<RowClass>,
}

impl ListRow {
    pub fn id(&self) -> RowId {
        self.id
    }

    /// Rendered label. Every row also carries a delete control.
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_draggable(&self) -> bool {
        self.draggable
    }

    pub fn has_class(&self, class: RowClass) -> bool {
        self.classes.contains(&class)
    }

    pub fn set_draggable(&mut self, draggable: bool) {
        self.draggable = draggable;
    }

    pub fn toggle_class(&mut self, class: RowClass) {
        if !self.classes.remove(&class) {
            self.classes.insert(class);
        }
    }

    pub fn add_class(&mut self, class: RowClass) {
        self.classes.insert(class);
    }

    pub fn clear_classes(&mut self) {
        self.classes.clear();
    }

    pub fn set_content(&mut self, content: String) {
        self.content = content;
    }
}

/// Ordered rows of the sidebar list
#[derive(Debug, Default)]
pub struct ListContainer {
    rows: Vec<ListRow>,
    next_id: u64,
}

/// Container handle shared by the list and the drag controller
pub type SharedList = Rc<RefCell<ListContainer>>;

impl ListContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedList {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Append a row as the last child
    pub fn append(&mut self, content: impl Into<String>) -> RowId {
        let id = RowId(self.next_id);
        self.next_id += 1;
        self.rows.push(ListRow {
            id,
            content: content.into(),
            draggable: false,
            classes: BTreeSet::new(),
        });
        id
    }

    pub fn remove(&mut self, id: RowId) -> Option<ListRow> {
        let position = self.rows.iter().position(|row| row.id == id)?;
        Some(self.rows.remove(position))
    }

    /// Whether `id` is a direct child of this container
    pub fn contains(&self, id: RowId) -> bool {
        self.rows.iter().any(|row| row.id == id)
    }

    /// Position of a row among its siblings.
    ///
    /// Counts the siblings following the row and subtracts from the child
    /// count, so the answer depends only on what comes after the row.
    pub fn index_of(&self, id: RowId) -> Option<usize> {
        let mut following = self.rows.iter().skip_while(|row| row.id != id);
        following.next()?;
        let distance_from_end = following.count();
        Some(self.rows.len() - 1 - distance_from_end)
    }

    pub fn row(&self, id: RowId) -> Option<&ListRow> {
        self.rows.iter().find(|row| row.id == id)
    }

    pub fn row_mut(&mut self, id: RowId) -> Option<&mut ListRow> {
        self.rows.iter_mut().find(|row| row.id == id)
    }

    pub fn rows(&self) -> &[ListRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Events published by [`PointList`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEvent {
    /// A row's delete control was clicked
    Remove { index: usize },
    /// Two rows traded content
    Exchange { first: usize, second: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListEventKind {
    Remove,
    Exchange,
}

impl ListEventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Remove => "remove",
            Self::Exchange => "exchange",
        }
    }
}

impl Event for ListEvent {
    type Kind = ListEventKind;

    fn kind(&self) -> ListEventKind {
        match self {
            Self::Remove { .. } => ListEventKind::Remove,
            Self::Exchange { .. } => ListEventKind::Exchange,
        }
    }
}

/// Where a click inside the list landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    /// The row body
    Row(RowId),
    /// The row's embedded delete control
    DeleteControl(RowId),
}

/// Sidebar list of waypoint names.
///
/// Subscribers to [`ListEventKind::Remove`] and [`ListEventKind::Exchange`]
/// return a [`Result`], which the list passes back to its caller.
pub struct PointList {
    container: SharedList,
    bus: EventBus<ListEvent, Result<()>>,
}

impl PointList {
    pub fn new(container: SharedList) -> Self {
        Self {
            container,
            bus: EventBus::new(),
        }
    }

    pub fn on<F>(&mut self, kind: ListEventKind, callback: F)
    where
        F: FnMut(&ListEvent) -> Result<()> + 'static,
    {
        self.bus.subscribe(kind, callback);
    }

    /// Subscribe to delete-control clicks with the clicked row's index
    pub fn on_remove<F>(&mut self, mut callback: F)
    where
        F: FnMut(usize) -> Result<()> + 'static,
    {
        self.on(ListEventKind::Remove, move |event| match event {
            ListEvent::Remove { index } => callback(*index),
            ListEvent::Exchange { .. } => Ok(()),
        });
    }

    /// Subscribe to row exchanges with both indices
    pub fn on_exchange<F>(&mut self, mut callback: F)
    where
        F: FnMut(usize, usize) -> Result<()> + 'static,
    {
        self.on(ListEventKind::Exchange, move |event| match event {
            ListEvent::Exchange { first, second } => callback(*first, *second),
            ListEvent::Remove { .. } => Ok(()),
        });
    }

    /// Append a row for `name` as the last child
    pub fn add(&mut self, name: &str) -> RowId {
        let id = self.container.borrow_mut().append(name);
        tracing::debug!(name, ?id, "List row added");
        id
    }

    /// Handle a click inside the list.
    ///
    /// A click on a delete control publishes the row's index and then removes
    /// the row. If the `remove` subscriber fails, the row stays.
    pub fn click(&mut self, target: ClickTarget) -> Result<()> {
        let ClickTarget::DeleteControl(row) = target else {
            return Ok(());
        };

        let index = self.index_of(row)?;
        self.emit(ListEvent::Remove { index })?;
        self.container.borrow_mut().remove(row);
        tracing::debug!(index, "List row removed");
        Ok(())
    }

    /// Report that rows `first` and `second` traded content
    pub fn change(&mut self, first: RowId, second: RowId) -> Result<()> {
        let first = self.index_of(first)?;
        let second = self.index_of(second)?;
        self.emit(ListEvent::Exchange { first, second })
    }

    pub fn container(&self) -> &SharedList {
        &self.container
    }

    fn index_of(&self, row: RowId) -> Result<usize> {
        self.container
            .borrow()
            .index_of(row)
            .ok_or(RouteError::UnknownRow(row))
    }

    fn emit(&mut self, event: ListEvent) -> Result<()> {
        tracing::debug!(event = event.kind().as_str(), ?event, "List event");
        self.bus.publish(&event).unwrap_or(Ok(()))
    }
}
