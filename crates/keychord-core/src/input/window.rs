// Keychord Input Layer - Window
// Resizes and rotations, with the orientation derived from them

use strum_macros::{AsRefStr, Display};

use crate::event::{Payload, Response};
use crate::tracker::Tracker;

use super::adapter::InputAdapter;
use super::raw::{Capability, RawEvent, RawEventKind};

const RESIZE_EVENT: &str = "window:resize";
pub const ORIENTATION_EVENT: &str = "window:orientation";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Orientation {
    Landscape,
    Portrait,
}

impl Orientation {
    /// Wider than tall is landscape; a square counts as portrait
    pub fn from_size(width: f64, height: f64) -> Self {
        if width > height {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }

    /// Rotated a quarter turn either way is landscape
    pub fn from_angle(angle: i32) -> Self {
        if angle.rem_euclid(180) == 90 {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }

    /// `window:orientation:landscape` / `window:orientation:portrait`
    pub fn event_name(self) -> String {
        format!("{}:{}", ORIENTATION_EVENT, self)
    }
}

/// Remembers the last orientation so a resize only reports a change
#[derive(Debug, Default)]
pub struct WindowAdapter {
    orientation: Option<Orientation>,
}

impl WindowAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn orientation(&self) -> Option<Orientation> {
        self.orientation
    }
}

/// Trigger `window:orientation` and its landscape/portrait variant
fn announce(
    tracker: &mut Tracker,
    event: &RawEvent,
    orientation: Orientation,
    payload: &Payload,
) -> Vec<Response> {
    log::debug!("Orientation is now {}", orientation);
    let target = event.target.as_ref();
    let mut responses = tracker.trigger_with_selectors(ORIENTATION_EVENT, target, payload);
    responses.extend(tracker.trigger_with_selectors(&orientation.event_name(), target, payload));
    responses
}

impl InputAdapter for WindowAdapter {
    fn capability(&self) -> Capability {
        Capability::Window
    }

    fn handle(&mut self, tracker: &mut Tracker, event: &RawEvent) -> Vec<Response> {
        let accepted = tracker.accepts(event);
        match event.kind {
            RawEventKind::Resize { width, height } => {
                let orientation = Orientation::from_size(width, height);
                let changed = self.orientation.replace(orientation) != Some(orientation);
                if !accepted {
                    return Vec::new();
                }
                let payload = Payload::Size { width, height };
                let mut responses =
                    tracker.trigger_with_selectors(RESIZE_EVENT, event.target.as_ref(), &payload);
                if changed {
                    responses.extend(announce(tracker, event, orientation, &payload));
                }
                responses
            }
            RawEventKind::OrientationChange { angle } => {
                let orientation = Orientation::from_angle(angle);
                self.orientation = Some(orientation);
                if !accepted {
                    return Vec::new();
                }
                announce(tracker, event, orientation, &Payload::None)
            }
            _ => Vec::new(),
        }
    }

    fn reset(&mut self) {
        self.orientation = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::Callback;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn record(tracker: &mut Tracker, names: &[&str]) -> Arc<Mutex<Vec<String>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        for name in names {
            let seen = seen.clone();
            tracker
                .router_mut()
                .on(
                    name,
                    Callback::new(move |event| {
                        seen.lock().push(event.name.to_string());
                        Ok(())
                    }),
                    None,
                    None,
                )
                .unwrap();
        }
        seen
    }

    fn resize(width: f64, height: f64) -> RawEvent {
        RawEvent::new(RawEventKind::Resize { width, height })
    }

    #[test]
    fn test_orientation_from_size_and_angle() {
        assert_eq!(Orientation::from_size(1920.0, 1080.0), Orientation::Landscape);
        assert_eq!(Orientation::from_size(600.0, 600.0), Orientation::Portrait);
        assert_eq!(Orientation::from_angle(90), Orientation::Landscape);
        assert_eq!(Orientation::from_angle(-90), Orientation::Landscape);
        assert_eq!(Orientation::from_angle(0), Orientation::Portrait);
        assert_eq!(Orientation::from_angle(180), Orientation::Portrait);
        assert_eq!(Orientation::Landscape.event_name(), "window:orientation:landscape");
    }

    #[test]
    fn test_resize_reports_orientation_changes_only() {
        let mut tracker = Tracker::default();
        let mut window = WindowAdapter::new();
        let seen = record(&mut tracker, &["window:resize", "landscape", "portrait"]);

        window.handle(&mut tracker, &resize(1024.0, 768.0));
        window.handle(&mut tracker, &resize(1280.0, 800.0));
        window.handle(&mut tracker, &resize(768.0, 1024.0));
        assert_eq!(
            *seen.lock(),
            vec![
                "window:resize",
                "window:orientation:landscape",
                "window:resize",
                "window:resize",
                "window:orientation:portrait",
            ]
        );
        assert_eq!(window.orientation(), Some(Orientation::Portrait));
    }

    #[test]
    fn test_orientation_change_always_fires() {
        let mut tracker = Tracker::default();
        let mut window = WindowAdapter::new();
        let seen = record(&mut tracker, &["window:orientation", "window:orientation:landscape"]);
        let rotate = RawEvent::new(RawEventKind::OrientationChange { angle: -90 });
        window.handle(&mut tracker, &rotate);
        window.handle(&mut tracker, &rotate);
        assert_eq!(seen.lock().len(), 4);
        assert_eq!(seen.lock()[1], "window:orientation:landscape");
    }

    #[test]
    fn test_reset_forgets_orientation() {
        let mut tracker = Tracker::default();
        let mut window = WindowAdapter::new();
        let seen = record(&mut tracker, &["landscape"]);
        window.handle(&mut tracker, &resize(800.0, 600.0));
        window.reset();
        window.handle(&mut tracker, &resize(800.0, 600.0));
        assert_eq!(seen.lock().len(), 2);
    }
}
