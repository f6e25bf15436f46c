//! Opens a window with an OpenGL context and drives a [`Renderer`] from its event loop.

use std::ffi::{c_void, CStr};
use std::os::raw::c_char;
use std::ptr::null;

use glutin::dpi::LogicalSize;
use glutin::event::{
    ElementState, Event, KeyboardInput, MouseButton as WinitMouseButton, MouseScrollDelta, VirtualKeyCode,
    WindowEvent,
};
use glutin::event_loop::{ControlFlow, EventLoop};
use glutin::window::WindowBuilder;
use glutin::{Api, ContextBuilder, GlProfile, GlRequest};

use oglutils::capabilities::{GlInfo, ShaderSupport};
use oglutils::diagnostics::{
    check_gl_error, clear_gl_errors, debug_severity_name, debug_source_name, debug_type_name,
};
use oglutils::NativeGl;

use crate::config::SampleConfig;
use crate::renderer::{FrameContext, Key, KeyAction, MouseButton, Renderer};

extern "system" fn debug_message(
    source: u32,
    kind: u32,
    id: u32,
    severity: u32,
    _length: i32,
    message: *const c_char,
    _user: *mut c_void,
) {
    if message.is_null() {
        return;
    }
    let message = unsafe { CStr::from_ptr(message) }.to_string_lossy();
    let text = format!(
        "{} {} {} [{}]: {}",
        debug_source_name(source), debug_type_name(kind), debug_severity_name(severity), id, message
    );

    match severity {
        gl::DEBUG_SEVERITY_HIGH => error!("{}", text),
        gl::DEBUG_SEVERITY_MEDIUM => warn!("{}", text),
        gl::DEBUG_SEVERITY_LOW => info!("{}", text),
        _ => trace!("{}", text),
    }
}

/// Routes driver debug messages to the log when the context offers `glDebugMessageCallback`.
fn install_debug_output() {
    if !gl::DebugMessageCallback::is_loaded() {
        debug!("glDebugMessageCallback is not available; driver messages won't be logged");
        return;
    }

    unsafe {
        gl::Enable(gl::DEBUG_OUTPUT);
        gl::DebugMessageCallback(Some(debug_message), null());
    }
}

fn translate_key(key: VirtualKeyCode) -> Key {
    match key {
        VirtualKeyCode::W => Key::W,
        VirtualKeyCode::A => Key::A,
        VirtualKeyCode::S => Key::S,
        VirtualKeyCode::D => Key::D,
        VirtualKeyCode::F => Key::F,
        VirtualKeyCode::M => Key::M,
        VirtualKeyCode::P => Key::P,
        VirtualKeyCode::R => Key::R,
        VirtualKeyCode::Space => Key::Space,
        VirtualKeyCode::LShift => Key::LeftShift,
        VirtualKeyCode::LControl => Key::LeftControl,
        VirtualKeyCode::Escape => Key::Escape,
        _ => Key::Other,
    }
}

fn translate_button(button: WinitMouseButton) -> MouseButton {
    match button {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        _ => MouseButton::Other,
    }
}

fn translate_state(state: ElementState) -> KeyAction {
    match state {
        ElementState::Pressed => KeyAction::Press,
        ElementState::Released => KeyAction::Release,
    }
}

/// Runs `renderer` in a new window until it's closed or Escape is released.
///
/// Only returns if setting up the window, the context or the renderer fails; once the event loop
/// starts, the process exits with it.
pub fn run(mut renderer: Box<dyn Renderer>, config: SampleConfig) -> Result<(), String> {
    let events = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title(renderer.title())
        .with_inner_size(LogicalSize::new(config.width as f64, config.height as f64));

    let (major, minor) = renderer.required_gl_version();
    let context = ContextBuilder::new()
        .with_gl(GlRequest::Specific(Api::OpenGl, (major, minor)))
        .with_gl_profile(GlProfile::Core)
        .with_vsync(config.vsync)
        .build_windowed(window, &events)
        .map_err(|e| format!("Error creating an OpenGL {}.{} context: {}", major, minor, e))?;

    let context = unsafe { context.make_current() }
        .map_err(|(_, e)| format!("Error making the OpenGL context current: {}", e))?;

    gl::load_with(|symbol| context.get_proc_address(symbol) as *const c_void);

    let gl = NativeGl;
    // Context creation can leave errors behind that would be blamed on the sample
    clear_gl_errors(&gl);
    install_debug_output();

    let info = GlInfo::query(&gl);
    info.log_parameters();
    ShaderSupport::from_info(&info).log_summary(&info);

    // Core profiles refuse to draw without a vertex array object. One for the whole run lets the
    // geometry buffers describe their attributes the same way they would in a compatibility
    // context.
    let mut vao = 0u32;
    unsafe {
        gl::GenVertexArrays(1, &mut vao);
        gl::BindVertexArray(vao);
    }

    let size = context.window().inner_size();
    let (mut width, mut height) = (size.width, size.height);

    renderer.init(&FrameContext { gl: &gl, config: &config, width, height })?;
    check_gl_error(&gl, "init");

    let mut cursor = (0.0f64, 0.0f64);

    events.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;

        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => *control_flow = ControlFlow::Exit,

                WindowEvent::Resized(physical) => {
                    context.resize(physical);
                    if physical.width > 0 && physical.height > 0 {
                        width = physical.width;
                        height = physical.height;
                        debug!("Window resized to [{}, {}]", width, height);
                        renderer.on_resize(width, height);
                    }
                }

                WindowEvent::KeyboardInput {
                    input: KeyboardInput { virtual_keycode: Some(code), state, .. },
                    ..
                } => {
                    let key = translate_key(code);
                    let action = translate_state(state);
                    if key == Key::Escape && action == KeyAction::Release {
                        *control_flow = ControlFlow::Exit;
                    } else {
                        renderer.on_key(key, action);
                    }
                }

                WindowEvent::CursorMoved { position, .. } => {
                    cursor = (position.x, position.y);
                    renderer.on_cursor_moved(position.x, position.y);
                }

                WindowEvent::MouseInput { state, button, .. } => {
                    renderer.on_mouse_button(translate_button(button), translate_state(state), cursor.0, cursor.1);
                }

                WindowEvent::MouseWheel { delta, .. } => {
                    let dy = match delta {
                        MouseScrollDelta::LineDelta(_, y) => y as f64,
                        MouseScrollDelta::PixelDelta(p) => p.y,
                    };
                    renderer.on_scroll(dy);
                }

                _ => {}
            },

            Event::MainEventsCleared => context.window().request_redraw(),

            Event::RedrawRequested(_) => {
                renderer.display(&FrameContext { gl: &gl, config: &config, width, height });
                if let Err(e) = context.swap_buffers() {
                    error!("Error swapping buffers: {}", e);
                    *control_flow = ControlFlow::Exit;
                }
            }

            Event::LoopDestroyed => {
                renderer.dispose(&gl);
                unsafe { gl::DeleteVertexArrays(1, &vao) };
                info!("{} closed", renderer.title());
            }

            _ => {}
        }
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sample_keys_are_translated() {
        assert_eq!(translate_key(VirtualKeyCode::W), Key::W);
        assert_eq!(translate_key(VirtualKeyCode::LShift), Key::LeftShift);
        assert_eq!(translate_key(VirtualKeyCode::Escape), Key::Escape);
        assert_eq!(translate_key(VirtualKeyCode::Q), Key::Other);
    }

    #[test]
    fn buttons_and_states_are_translated() {
        assert_eq!(translate_button(WinitMouseButton::Left), MouseButton::Left);
        assert_eq!(translate_button(WinitMouseButton::Other(8)), MouseButton::Other);
        assert_eq!(translate_state(ElementState::Pressed), KeyAction::Press);
        assert_eq!(translate_state(ElementState::Released), KeyAction::Release);
    }
}
