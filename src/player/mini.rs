//! Mini player placement: default docking, dragging and aspect-locked resizing.

use crate::player::config::{
    MINI_PLAYER_ASPECT_RATIO, MINI_PLAYER_MARGIN, MINI_PLAYER_MAX_WIDTH, MINI_PLAYER_MIN_WIDTH,
};
use crate::player::types::{MiniPlayerState, Point, Size};

/// Pointer offset captured when a drag or resize starts.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct GestureAnchor {
    pointer: Point,
    origin: Point,
    size: Option<Size>,
}

impl MiniPlayerState {
    /// Docks the player at the bottom-right corner of the viewport.
    pub(crate) fn dock_bottom_right(&mut self, viewport: Size) {
        self.position = Point {
            x: (viewport.width - self.size.width - MINI_PLAYER_MARGIN).max(0.0),
            y: (viewport.height - self.size.height - MINI_PLAYER_MARGIN).max(0.0),
        };
    }

    pub(crate) fn begin_drag(&mut self, pointer: Point) -> GestureAnchor {
        self.is_dragging = true;
        GestureAnchor {
            pointer,
            origin: self.position,
            size: None,
        }
    }

    pub(crate) fn drag_to(&mut self, anchor: &GestureAnchor, pointer: Point, viewport: Size) {
        if !self.is_dragging {
            return;
        }
        let proposed = Point {
            x: anchor.origin.x + (pointer.x - anchor.pointer.x),
            y: anchor.origin.y + (pointer.y - anchor.pointer.y),
        };
        self.position = clamp_into(proposed, self.size, viewport);
    }

    pub(crate) fn begin_resize(&mut self, pointer: Point) -> GestureAnchor {
        self.is_resizing = true;
        GestureAnchor {
            pointer,
            origin: self.position,
            size: Some(self.size),
        }
    }

    /// Width follows the pointer; height is derived from the 16:9 aspect.
    pub(crate) fn resize_to(&mut self, anchor: &GestureAnchor, pointer: Point, viewport: Size) {
        if !self.is_resizing {
            return;
        }
        let start = anchor.size.unwrap_or(self.size);
        let max_width = MINI_PLAYER_MAX_WIDTH
            .min(viewport.width - self.position.x)
            .max(MINI_PLAYER_MIN_WIDTH);
        let width = (start.width + (pointer.x - anchor.pointer.x)).clamp(MINI_PLAYER_MIN_WIDTH, max_width);
        self.size = Size::new(width, width / MINI_PLAYER_ASPECT_RATIO);
        self.position = clamp_into(self.position, self.size, viewport);
    }

    pub(crate) fn end_gesture(&mut self) {
        self.is_dragging = false;
        self.is_resizing = false;
    }

    /// Keeps the player on screen after the viewport shrinks.
    pub(crate) fn fit_into(&mut self, viewport: Size) {
        self.position = clamp_into(self.position, self.size, viewport);
    }
}

fn clamp_into(position: Point, size: Size, viewport: Size) -> Point {
    Point {
        x: position.x.clamp(0.0, (viewport.width - size.width).max(0.0)),
        y: position.y.clamp(0.0, (viewport.height - size.height).max(0.0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Size = Size { width: 1280.0, height: 720.0 };

    #[test]
    fn docks_with_margin() {
        let mut mini = MiniPlayerState::default();
        mini.dock_bottom_right(VIEWPORT);
        assert_eq!(mini.position, Point { x: 1280.0 - 320.0 - 20.0, y: 720.0 - 180.0 - 20.0 });
    }

    #[test]
    fn drag_is_clamped_to_viewport() {
        let mut mini = MiniPlayerState::default();
        mini.dock_bottom_right(VIEWPORT);
        let anchor = mini.begin_drag(Point { x: 1000.0, y: 600.0 });
        mini.drag_to(&anchor, Point { x: 900.0, y: 500.0 }, VIEWPORT);
        assert_eq!(mini.position, Point { x: 840.0, y: 420.0 });

        mini.drag_to(&anchor, Point { x: -5000.0, y: 5000.0 }, VIEWPORT);
        assert_eq!(mini.position, Point { x: 0.0, y: 720.0 - 180.0 });
        mini.end_gesture();
        assert!(!mini.is_dragging);
    }

    #[test]
    fn drag_without_begin_is_ignored() {
        let mut mini = MiniPlayerState::default();
        let anchor = GestureAnchor::default();
        mini.drag_to(&anchor, Point { x: 300.0, y: 300.0 }, VIEWPORT);
        assert_eq!(mini.position, Point::default());
    }

    #[test]
    fn resize_keeps_aspect_and_bounds() {
        let mut mini = MiniPlayerState::default();
        let anchor = mini.begin_resize(Point { x: 320.0, y: 180.0 });
        mini.resize_to(&anchor, Point { x: 480.0, y: 0.0 }, VIEWPORT);
        assert_eq!(mini.size.width, 480.0);
        assert!((mini.size.height - 270.0).abs() < 1e-9);

        mini.resize_to(&anchor, Point { x: -1000.0, y: 0.0 }, VIEWPORT);
        assert_eq!(mini.size.width, MINI_PLAYER_MIN_WIDTH);

        mini.resize_to(&anchor, Point { x: 5000.0, y: 0.0 }, VIEWPORT);
        assert_eq!(mini.size.width, MINI_PLAYER_MAX_WIDTH);
    }
}
