//! Per-frame input snapshot
//!
//! Filled by the window layer once per frame; scene behaviors only ever read it.

/// Keyboard and mouse state for a single frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputState {
    pub escape: bool,
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    /// Mouse movement since the previous frame, in pixels
    pub look_dx: f32,
    pub look_dy: f32,
}

impl InputState {
    /// Movement on the ground plane as (strafe, advance), each in -1..=1
    pub fn move_axes(&self) -> (i32, i32) {
        let strafe = self.right as i32 - self.left as i32;
        let advance = self.forward as i32 - self.backward as i32;
        (strafe, advance)
    }

    pub fn is_idle(&self) -> bool {
        self.move_axes() == (0, 0) && self.look_dx == 0.0 && self.look_dy == 0.0
    }
}
