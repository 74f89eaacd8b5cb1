/// Turns a polled level into press events.
///
/// Starts released, so an input already held when polling begins fires once
/// on the first update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeDetector {
    pressed: bool,
}

impl EdgeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the current level; returns `true` only on a released to pressed edge.
    pub fn update(&mut self, pressed: bool) -> bool {
        let fired = pressed && !self.pressed;
        self.pressed = pressed;
        fired
    }

    /// Last level seen.
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_per_press() {
        let mut edge = EdgeDetector::new();
        let levels = [false, true, true, true, false, false, true, false];
        let fired: Vec<bool> = levels.iter().map(|&level| edge.update(level)).collect();

        assert_eq!(
            fired,
            vec![false, true, false, false, false, false, true, false]
        );
    }

    #[test]
    fn test_held_at_start_fires_once() {
        let mut edge = EdgeDetector::new();
        assert!(edge.update(true));
        assert!(!edge.update(true));
        assert!(edge.is_pressed());
    }
}
