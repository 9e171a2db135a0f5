use keylink_core::ScrollDirection;

use super::modes::SurfaceState;
use super::Render;
use crate::midi::{ApcMapping, LedSink, TrackLed};

/// Scroll indicator shown on the track row while shift is held.
#[derive(Debug, Clone)]
pub struct Arrow {
    direction: ScrollDirection,
    can_scroll: bool,
    led: u8,
}

impl Arrow {
    pub(crate) fn new(direction: ScrollDirection) -> Self {
        Self {
            direction,
            can_scroll: false,
            led: ApcMapping::arrow_note(direction),
        }
    }

    pub fn direction(&self) -> ScrollDirection {
        self.direction
    }

    pub fn can_scroll(&self) -> bool {
        self.can_scroll
    }

    pub fn on_can_scroll_changed(
        &mut self,
        can_scroll: bool,
        state: &SurfaceState,
        leds: &mut impl LedSink,
    ) {
        self.can_scroll = can_scroll;
        self.render(state, leds);
    }
}

// Outside the overlay the arrow buttons are track buttons, so both
// operations leave them alone.
impl Render for Arrow {
    fn render(&self, state: &SurfaceState, leds: &mut impl LedSink) {
        if !state.shift_engaged() {
            return;
        }
        let led = if self.can_scroll {
            TrackLed::Red
        } else {
            TrackLed::Off
        };
        leds.set_track(self.led, led);
    }

    fn clear(&self, state: &SurfaceState, leds: &mut impl LedSink) {
        if !state.shift_engaged() {
            return;
        }
        leds.set_track(self.led, TrackLed::Off);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::LedMessage;
    use crate::surface::modes::Layer;

    fn overlay() -> SurfaceState {
        SurfaceState {
            layer: Layer::ShiftOverlay,
            ..SurfaceState::default()
        }
    }

    #[test]
    fn test_inert_outside_overlay() {
        let mut arrow = Arrow::new(ScrollDirection::Left);
        let mut leds: Vec<LedMessage> = Vec::new();

        arrow.on_can_scroll_changed(true, &SurfaceState::default(), &mut leds);
        arrow.clear(&SurfaceState::default(), &mut leds);

        assert!(arrow.can_scroll());
        assert!(leds.is_empty());
    }

    #[test]
    fn test_renders_in_overlay() {
        let mut arrow = Arrow::new(ScrollDirection::Down);
        let mut leds: Vec<LedMessage> = Vec::new();

        arrow.on_can_scroll_changed(true, &overlay(), &mut leds);
        arrow.on_can_scroll_changed(false, &overlay(), &mut leds);

        assert_eq!(
            leds,
            vec![
                LedMessage {
                    note: ApcMapping::DOWN,
                    velocity: 1
                },
                LedMessage {
                    note: ApcMapping::DOWN,
                    velocity: 0
                },
            ]
        );
    }
}
