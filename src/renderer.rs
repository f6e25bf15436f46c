//! The interface every sample implements, and the input events the runner hands it.

use oglutils::NativeGl;

use crate::config::SampleConfig;

/// The keys the samples react to. Anything else arrives as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    W, A, S, D,
    F, M, P, R,
    Space,
    LeftShift,
    LeftControl,
    Escape,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Press,
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other,
}

/// What a renderer gets to see each time it's called.
pub struct FrameContext<'a> {
    pub gl: &'a NativeGl,
    pub config: &'a SampleConfig,
    pub width: u32,
    pub height: u32,
}

/// A sample program.
///
/// The runner calls `init` once the context is current, then `display` every frame, with the
/// input callbacks interleaved as events arrive. Escape and closing the window are handled by the
/// runner, which calls `dispose` on the way out.
pub trait Renderer {
    fn title(&self) -> &str;

    /// Core-profile version the sample needs.
    fn required_gl_version(&self) -> (u8, u8) {
        (3, 3)
    }

    fn init(&mut self, ctx: &FrameContext) -> Result<(), String>;

    fn display(&mut self, ctx: &FrameContext);

    fn on_key(&mut self, _key: Key, _action: KeyAction) {}

    fn on_cursor_moved(&mut self, _x: f64, _y: f64) {}

    fn on_mouse_button(&mut self, _button: MouseButton, _action: KeyAction, _x: f64, _y: f64) {}

    fn on_scroll(&mut self, _delta: f64) {}

    fn on_resize(&mut self, _width: u32, _height: u32) {}

    fn dispose(&mut self, _gl: &NativeGl) {}
}
