//! Gesture interpretation.
//!
//! Raw pointer, touch and wheel events come in as [`InputEvent`]s; the
//! [`GestureTracker`] turns them into incremental [`Gesture`]s. Pans are
//! measured from the *last* seen position, and pinch factors are relative to
//! the previous frame's finger distance, so repeated moves never compound.

use serde::{Deserialize, Serialize};

/// A point in host (client) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    #[default]
    Primary,
    Secondary,
    Middle,
}

/// Input from the host UI. `touches` lists every finger currently down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    TouchStart {
        touches: Vec<Point>,
    },
    TouchMove {
        touches: Vec<Point>,
    },
    TouchEnd,
    MouseDown {
        x: f64,
        y: f64,
        #[serde(default)]
        button: MouseButton,
    },
    MouseMove {
        x: f64,
        y: f64,
    },
    MouseUp,
    MouseLeave,
    /// Positive `delta_y` scrolls toward the user (zoom out).
    Wheel {
        delta_y: f64,
    },
}

/// An incremental change to apply to the transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Pan { dx: f64, dy: f64 },
    Zoom { factor: f64 },
}

/// Wheel zoom step factors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelSteps {
    pub zoom_in: f64,
    pub zoom_out: f64,
}

impl Default for WheelSteps {
    fn default() -> Self {
        Self {
            zoom_in: 1.1,
            zoom_out: 0.9,
        }
    }
}

/// Drag and pinch tracking between events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GestureTracker {
    last: Option<Point>,
    pinch_distance: Option<f64>,
}

impl GestureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.last.is_some()
    }

    pub fn is_pinching(&self) -> bool {
        self.pinch_distance.is_some()
    }

    /// Forget any drag or pinch in progress.
    pub fn clear(&mut self) {
        self.last = None;
        self.pinch_distance = None;
    }

    /// Feed one event; returns the resulting gesture, if any.
    pub fn interpret(&mut self, event: &InputEvent, wheel: WheelSteps) -> Option<Gesture> {
        match event {
            InputEvent::TouchStart { touches } => {
                match touches.as_slice() {
                    [only] => self.last = Some(*only),
                    [a, b] => {
                        self.pinch_distance = Some(a.distance(*b));
                        self.last = Some(a.midpoint(*b));
                    }
                    _ => {}
                }
                None
            }
            InputEvent::TouchMove { touches } => match touches.as_slice() {
                [only] => self.drag_to(*only),
                [a, b] => {
                    let previous = self.pinch_distance?;
                    let distance = a.distance(*b);
                    self.pinch_distance = Some(distance);
                    (previous > 0.0).then(|| Gesture::Zoom {
                        factor: distance / previous,
                    })
                }
                _ => None,
            },
            InputEvent::TouchEnd => {
                self.clear();
                None
            }
            InputEvent::MouseDown { x, y, button } => {
                if *button == MouseButton::Primary {
                    self.last = Some(Point::new(*x, *y));
                }
                None
            }
            InputEvent::MouseMove { x, y } => self.drag_to(Point::new(*x, *y)),
            InputEvent::MouseUp | InputEvent::MouseLeave => {
                self.last = None;
                None
            }
            InputEvent::Wheel { delta_y } => Some(Gesture::Zoom {
                factor: if *delta_y > 0.0 {
                    wheel.zoom_out
                } else {
                    wheel.zoom_in
                },
            }),
        }
    }

    fn drag_to(&mut self, to: Point) -> Option<Gesture> {
        let from = self.last?;
        self.last = Some(to);
        Some(Gesture::Pan {
            dx: to.x - from.x,
            dy: to.y - from.y,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touches(points: &[(f64, f64)]) -> Vec<Point> {
        points.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    fn feed(tracker: &mut GestureTracker, event: InputEvent) -> Option<Gesture> {
        tracker.interpret(&event, WheelSteps::default())
    }

    #[test]
    fn single_touch_pan_is_incremental() {
        let mut t = GestureTracker::new();
        feed(&mut t, InputEvent::TouchStart { touches: touches(&[(10.0, 10.0)]) });

        let first = feed(&mut t, InputEvent::TouchMove { touches: touches(&[(15.0, 12.0)]) });
        assert_eq!(first, Some(Gesture::Pan { dx: 5.0, dy: 2.0 }));

        // Measured from the last position, not the start
        let second = feed(&mut t, InputEvent::TouchMove { touches: touches(&[(16.0, 12.0)]) });
        assert_eq!(second, Some(Gesture::Pan { dx: 1.0, dy: 0.0 }));
    }

    #[test]
    fn move_without_start_does_nothing() {
        let mut t = GestureTracker::new();
        assert_eq!(feed(&mut t, InputEvent::MouseMove { x: 4.0, y: 4.0 }), None);
        assert_eq!(
            feed(&mut t, InputEvent::TouchMove { touches: touches(&[(1.0, 1.0), (9.0, 1.0)]) }),
            None
        );
    }

    #[test]
    fn pinch_factor_is_relative_to_previous_frame() {
        let mut t = GestureTracker::new();
        feed(
            &mut t,
            InputEvent::TouchStart { touches: touches(&[(0.0, 0.0), (100.0, 0.0)]) },
        );
        assert!(t.is_pinching());

        let g = feed(
            &mut t,
            InputEvent::TouchMove { touches: touches(&[(0.0, 0.0), (120.0, 0.0)]) },
        );
        assert_eq!(g, Some(Gesture::Zoom { factor: 1.2 }));

        let g = feed(
            &mut t,
            InputEvent::TouchMove { touches: touches(&[(0.0, 0.0), (120.0, 0.0)]) },
        );
        assert_eq!(g, Some(Gesture::Zoom { factor: 1.0 }));
    }

    #[test]
    fn pinch_from_zero_distance_is_ignored() {
        let mut t = GestureTracker::new();
        feed(
            &mut t,
            InputEvent::TouchStart { touches: touches(&[(5.0, 5.0), (5.0, 5.0)]) },
        );
        let g = feed(
            &mut t,
            InputEvent::TouchMove { touches: touches(&[(0.0, 0.0), (50.0, 0.0)]) },
        );
        assert_eq!(g, None);
        // The new distance is tracked, so the next move works
        let g = feed(
            &mut t,
            InputEvent::TouchMove { touches: touches(&[(0.0, 0.0), (100.0, 0.0)]) },
        );
        assert_eq!(g, Some(Gesture::Zoom { factor: 2.0 }));
    }

    #[test]
    fn second_finger_anchors_drag_on_midpoint() {
        let mut t = GestureTracker::new();
        feed(
            &mut t,
            InputEvent::TouchStart { touches: touches(&[(0.0, 0.0), (100.0, 50.0)]) },
        );
        // One finger lifted without a touch_end: pans from the midpoint
        let g = feed(&mut t, InputEvent::TouchMove { touches: touches(&[(60.0, 25.0)]) });
        assert_eq!(g, Some(Gesture::Pan { dx: 10.0, dy: 0.0 }));
    }

    #[test]
    fn touch_end_clears_everything() {
        let mut t = GestureTracker::new();
        feed(
            &mut t,
            InputEvent::TouchStart { touches: touches(&[(0.0, 0.0), (10.0, 0.0)]) },
        );
        feed(&mut t, InputEvent::TouchEnd);
        assert!(!t.is_dragging());
        assert!(!t.is_pinching());
    }

    #[test]
    fn mouse_drag_primary_only() {
        let mut t = GestureTracker::new();
        feed(
            &mut t,
            InputEvent::MouseDown { x: 0.0, y: 0.0, button: MouseButton::Secondary },
        );
        assert_eq!(feed(&mut t, InputEvent::MouseMove { x: 5.0, y: 5.0 }), None);

        feed(
            &mut t,
            InputEvent::MouseDown { x: 0.0, y: 0.0, button: MouseButton::Primary },
        );
        assert_eq!(
            feed(&mut t, InputEvent::MouseMove { x: -3.0, y: 4.0 }),
            Some(Gesture::Pan { dx: -3.0, dy: 4.0 })
        );
    }

    #[test]
    fn mouse_leave_ends_drag() {
        let mut t = GestureTracker::new();
        feed(
            &mut t,
            InputEvent::MouseDown { x: 0.0, y: 0.0, button: MouseButton::Primary },
        );
        feed(&mut t, InputEvent::MouseLeave);
        assert_eq!(feed(&mut t, InputEvent::MouseMove { x: 9.0, y: 9.0 }), None);
    }

    #[test]
    fn wheel_direction_picks_factor() {
        let mut t = GestureTracker::new();
        assert_eq!(
            feed(&mut t, InputEvent::Wheel { delta_y: 120.0 }),
            Some(Gesture::Zoom { factor: 0.9 })
        );
        assert_eq!(
            feed(&mut t, InputEvent::Wheel { delta_y: -120.0 }),
            Some(Gesture::Zoom { factor: 1.1 })
        );
        assert_eq!(
            feed(&mut t, InputEvent::Wheel { delta_y: 0.0 }),
            Some(Gesture::Zoom { factor: 1.1 })
        );
    }

    #[test]
    fn events_parse_from_json() {
        let events: Vec<InputEvent> = serde_json::from_str(
            r#"[
                {"type": "touch_start", "touches": [{"x": 1, "y": 2}]},
                {"type": "mouse_down", "x": 3, "y": 4},
                {"type": "wheel", "delta_y": -1},
                {"type": "touch_end"}
            ]"#,
        )
        .unwrap();

        assert_eq!(events.len(), 4);
        assert_eq!(
            events[1],
            InputEvent::MouseDown { x: 3.0, y: 4.0, button: MouseButton::Primary }
        );
        assert_eq!(events[3], InputEvent::TouchEnd);
    }
}
