/// Mouse buttons the controls care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// A pointer event in physical pixel coordinates, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(PointerButton),
    Up(PointerButton),
    Moved { x: f32, y: f32 },
    /// Vertical scroll in lines; negative scrolls up (away from the user).
    Wheel { delta: f32 },
    /// The pointer left the window; any drag ends.
    Left,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_compare_by_value() {
        assert_eq!(
            PointerEvent::Moved { x: 1.0, y: 2.0 },
            PointerEvent::Moved { x: 1.0, y: 2.0 }
        );
        assert_ne!(
            PointerEvent::Down(PointerButton::Primary),
            PointerEvent::Down(PointerButton::Secondary)
        );
    }
}
