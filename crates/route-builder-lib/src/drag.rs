//! Drag-and-drop reordering of list rows
//!
//! The controller receives the raw pointer/drag gestures the front end sees
//! on the list container and turns a completed drop into a content swap
//! between two rows followed by a `change` event. Rows never move; only
//! their rendered content does.

use crate::event_bus::{Event, EventBus};
use crate::list::{RowClass, RowId, SharedList};
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Primary,
    Secondary,
    Middle,
}

/// Events published by [`DragController`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragEvent {
    /// `source` and `target` traded content
    Change { source: RowId, target: RowId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DragEventKind {
    Change,
}

impl DragEventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Change => "change",
        }
    }
}

impl Event for DragEvent {
    type Kind = DragEventKind;

    fn kind(&self) -> DragEventKind {
        match self {
            Self::Change { .. } => DragEventKind::Change,
        }
    }
}

/// Manual drag reordering over the direct children of one list container
pub struct DragController {
    container: SharedList,
    source: Option<RowId>,
    payload: Option<String>,
    bus: EventBus<DragEvent, Result<()>>,
}

impl DragController {
    pub fn new(container: SharedList) -> Self {
        Self {
            container,
            source: None,
            payload: None,
            bus: EventBus::new(),
        }
    }

    pub fn on<F>(&mut self, kind: DragEventKind, callback: F)
    where
        F: FnMut(&DragEvent) -> Result<()> + 'static,
    {
        self.bus.subscribe(kind, callback);
    }

    /// Subscribe to completed drops with the dragged and the target row
    pub fn on_change<F>(&mut self, mut callback: F)
    where
        F: FnMut(RowId, RowId) -> Result<()> + 'static,
    {
        self.on(DragEventKind::Change, move |event| match event {
            DragEvent::Change { source, target } => callback(*source, *target),
        });
    }

    /// Row currently being dragged
    pub fn source(&self) -> Option<RowId> {
        self.source
    }

    pub fn mouse_down(&mut self, row: RowId, button: MouseButton) {
        if button != MouseButton::Primary {
            return;
        }
        if let Some(row) = self.container.borrow_mut().row_mut(row) {
            row.set_draggable(true);
            row.toggle_class(RowClass::Draggable);
        }
    }

    pub fn mouse_up(&mut self, row: RowId) {
        self.reset_row(row);
    }

    /// Begin dragging `row`. Returns `false` when the drag is cancelled.
    pub fn drag_start(&mut self, row: RowId) -> bool {
        let Some(content) = self
            .container
            .borrow()
            .row(row)
            .map(|row| row.content().to_owned())
        else {
            return false;
        };

        tracing::trace!(?row, "Drag started");
        self.source = Some(row);
        self.payload = Some(content);
        true
    }

    /// Pointer entered `row` while dragging. Returns whether it accepts drops.
    pub fn drag_enter(&mut self, row: RowId) -> bool {
        if !self.is_drop_target(row) {
            return false;
        }
        if let Some(row) = self.container.borrow_mut().row_mut(row) {
            row.add_class(RowClass::Dropzone);
        }
        true
    }

    /// Pointer is over `row` while dragging. Returns whether it accepts drops.
    pub fn drag_over(&self, row: RowId) -> bool {
        self.is_drop_target(row)
    }

    pub fn drag_leave(&mut self, row: RowId) {
        if !self.is_drop_target(row) {
            return;
        }
        if let Some(row) = self.container.borrow_mut().row_mut(row) {
            row.clear_classes();
        }
    }

    /// Drop the dragged content onto `target`.
    ///
    /// The source row receives the target's content and the target receives
    /// the dragged payload, then `change` is published. Returns `Ok(false)`
    /// when `target` does not accept the drop or nothing is being dragged.
    pub fn drop(&mut self, target: RowId) -> Result<bool> {
        if !self.is_drop_target(target) {
            return Ok(false);
        }
        let (Some(source), Some(payload)) = (self.source, self.payload.clone()) else {
            return Ok(false);
        };

        {
            let mut container = self.container.borrow_mut();
            let Some(target_content) = container.row_mut(target).map(|row| {
                row.clear_classes();
                row.content().to_owned()
            }) else {
                return Ok(false);
            };
            let Some(source_row) = container.row_mut(source) else {
                return Ok(false);
            };
            source_row.set_content(target_content);
            if let Some(target_row) = container.row_mut(target) {
                target_row.set_content(payload);
            }
        }

        tracing::debug!(?source, ?target, "Rows swapped by drop");
        self.bus
            .publish(&DragEvent::Change { source, target })
            .unwrap_or(Ok(()))?;
        Ok(true)
    }

    /// Drag gesture on `row` finished, successfully or not
    pub fn drag_end(&mut self, row: RowId) {
        self.reset_row(row);
        if self.source == Some(row) {
            self.source = None;
            self.payload = None;
        }
    }

    fn is_drop_target(&self, row: RowId) -> bool {
        self.container
            .borrow()
            .row(row)
            .is_some_and(|row| !row.is_draggable())
    }

    fn reset_row(&mut self, row: RowId) {
        if let Some(row) = self.container.borrow_mut().row_mut(row) {
            row.set_draggable(false);
            row.clear_classes();
        }
    }
}
