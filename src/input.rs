use std::collections::VecDeque;

use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

/// Wheel pixel deltas (trackpads) are normalized to line units
const PIXELS_PER_LINE: f64 = 20.0;

/// A typed camera delta extracted from one pointer event.
///
/// The adapter performs no camera math; deltas are forwarded unchanged and
/// interpreted by the camera when the session drains the queue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraEvent {
    Orbit { dx: f64, dy: f64 },
    Pan { dx: f64, dy: f64 },
    Scale { delta: f64 },
    SetFov { deg: f64 },
}

/// Pointer button being dragged, if any
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragButton {
    Left,
    Middle,
}

/// Bridges winit pointer events to queued [`CameraEvent`]s.
///
/// Left-drag orbits, middle-drag pans, the wheel zooms. Events are gated on
/// window focus so the camera never drifts while the operator interacts
/// with unrelated UI; egui-consumed events must be filtered out by the app
/// layer before they reach this adapter.
#[derive(Debug, Clone)]
pub struct InputAdapter {
    queue: VecDeque<CameraEvent>,
    cursor: Option<(f64, f64)>,
    dragging: Option<DragButton>,
    focused: bool,
}

impl InputAdapter {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            cursor: None,
            dragging: None,
            focused: true,
        }
    }

    /// Feed one winit event through the adapter.
    pub fn process_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::Focused(focused) => self.set_focused(*focused),
            WindowEvent::MouseInput { state, button, .. } => {
                let button = match button {
                    MouseButton::Left => DragButton::Left,
                    MouseButton::Middle => DragButton::Middle,
                    _ => return,
                };
                match state {
                    ElementState::Pressed => self.begin_drag(button),
                    ElementState::Released => self.end_drag(button),
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.pointer_moved(position.x, position.y);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y as f64,
                    MouseScrollDelta::PixelDelta(pos) => pos.y / PIXELS_PER_LINE,
                };
                self.wheel(lines);
            }
            _ => {}
        }
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
        if !focused {
            // A drag that leaves the window should not resume as a jump
            self.dragging = None;
            self.cursor = None;
        }
    }

    pub fn push(&mut self, event: CameraEvent) {
        self.queue.push_back(event);
    }

    /// Hand over all queued deltas; applied atomically before the next
    /// frame's camera descriptor is built.
    pub fn drain(&mut self) -> Vec<CameraEvent> {
        self.queue.drain(..).collect()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    fn begin_drag(&mut self, button: DragButton) {
        if self.focused {
            self.dragging = Some(button);
        }
    }

    fn end_drag(&mut self, button: DragButton) {
        if self.dragging == Some(button) {
            self.dragging = None;
        }
    }

    fn pointer_moved(&mut self, x: f64, y: f64) {
        let previous = self.cursor.replace((x, y));
        if !self.focused {
            return;
        }
        let (Some((px, py)), Some(button)) = (previous, self.dragging) else {
            return;
        };
        let (dx, dy) = (x - px, y - py);
        match button {
            DragButton::Left => self.queue.push_back(CameraEvent::Orbit { dx, dy }),
            DragButton::Middle => self.queue.push_back(CameraEvent::Pan { dx, dy }),
        }
    }

    fn wheel(&mut self, delta: f64) {
        if self.focused {
            self.queue.push_back(CameraEvent::Scale { delta });
        }
    }
}

impl Default for InputAdapter {
    fn default() -> Self {
        Self::new()
    }
}
