/// Window event loop driving a viewer through the GPU renderer
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use log::{info, warn};
use meshview_core::{
    Action, FrameClock, InputEvent, Key, Mesh, MouseButton, RenderBackend, Viewer, ViewerConfig,
};
use winit::{
    dpi::PhysicalSize,
    event::{ElementState, Event, KeyEvent, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::WindowBuilder,
};

use crate::renderer::GpuRenderer;

/// Open a window for `viewer`, upload `mesh` once and run until the viewer
/// asks to exit or the window is closed.
pub fn run<V: Viewer>(config: &ViewerConfig, mesh: &Mesh, mut viewer: V) -> Result<()> {
    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.title.as_str())
            .with_inner_size(PhysicalSize::new(config.width, config.height))
            .build(&event_loop)?,
    );

    let mut renderer = pollster::block_on(GpuRenderer::new(window.clone()))?;
    renderer.upload_mesh(mesh);

    let size = window.inner_size();
    viewer.handle(&InputEvent::Resized {
        width: size.width,
        height: size.height,
    });

    let mut clock = FrameClock::new(config.frame_rate);
    info!(
        "{}: {}x{} at up to {} fps",
        config.title, size.width, size.height, config.frame_rate
    );

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { window_id, event } if window_id == window.id() => {
            match &event {
                WindowEvent::Resized(size) => renderer.resize(*size),
                WindowEvent::RedrawRequested => {
                    let size = window.inner_size();
                    if size.width == 0 || size.height == 0 {
                        return;
                    }
                    viewer.render(&mut renderer);
                    match renderer.present() {
                        Ok(()) => {}
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            renderer.resize(size)
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            warn!("surface out of memory, exiting");
                            elwt.exit();
                        }
                        Err(e) => warn!("render error: {e:?}"),
                    }
                }
                _ => {}
            }
            if let Some(input) = translate(&event) {
                viewer.handle(&input);
            }
        }
        Event::AboutToWait => {
            if viewer.should_exit() {
                elwt.exit();
                return;
            }
            let now = Instant::now();
            if clock.tick(now) {
                window.request_redraw();
            }
            elwt.set_control_flow(ControlFlow::WaitUntil(clock.next_frame(now)));
        }
        _ => {}
    })?;

    Ok(())
}

/// Map a winit window event onto the viewer's input vocabulary.
pub fn translate(event: &WindowEvent) -> Option<InputEvent> {
    match event {
        WindowEvent::CloseRequested => Some(InputEvent::CloseRequested),
        WindowEvent::Resized(size) => Some(InputEvent::Resized {
            width: size.width,
            height: size.height,
        }),
        WindowEvent::CursorMoved { position, .. } => Some(InputEvent::CursorMoved {
            x: position.x as f32,
            y: position.y as f32,
        }),
        WindowEvent::MouseInput { state, button, .. } => Some(InputEvent::MouseButton {
            button: match button {
                winit::event::MouseButton::Left => MouseButton::Left,
                winit::event::MouseButton::Middle => MouseButton::Middle,
                winit::event::MouseButton::Right => MouseButton::Right,
                _ => MouseButton::Other,
            },
            action: match state {
                ElementState::Pressed => Action::Press,
                ElementState::Released => Action::Release,
            },
        }),
        WindowEvent::KeyboardInput { event, .. } => Some(key_event(event)),
        _ => None,
    }
}

fn key_event(event: &KeyEvent) -> InputEvent {
    let action = match (event.state, event.repeat) {
        (ElementState::Released, _) => Action::Release,
        (ElementState::Pressed, true) => Action::Repeat,
        (ElementState::Pressed, false) => Action::Press,
    };
    let key = match event.physical_key {
        PhysicalKey::Code(code) => key_from_code(code),
        PhysicalKey::Unidentified(_) => Key::Other,
    };
    InputEvent::Key { key, action }
}

/// Physical key positions, so the controls stay put on non-QWERTY layouts.
pub fn key_from_code(code: KeyCode) -> Key {
    let letter = match code {
        KeyCode::Escape => return Key::Escape,
        KeyCode::KeyA => 'a',
        KeyCode::KeyB => 'b',
        KeyCode::KeyC => 'c',
        KeyCode::KeyD => 'd',
        KeyCode::KeyE => 'e',
        KeyCode::KeyF => 'f',
        KeyCode::KeyG => 'g',
        KeyCode::KeyH => 'h',
        KeyCode::KeyI => 'i',
        KeyCode::KeyJ => 'j',
        KeyCode::KeyK => 'k',
        KeyCode::KeyL => 'l',
        KeyCode::KeyM => 'm',
        KeyCode::KeyN => 'n',
        KeyCode::KeyO => 'o',
        KeyCode::KeyP => 'p',
        KeyCode::KeyQ => 'q',
        KeyCode::KeyR => 'r',
        KeyCode::KeyS => 's',
        KeyCode::KeyT => 't',
        KeyCode::KeyU => 'u',
        KeyCode::KeyV => 'v',
        KeyCode::KeyW => 'w',
        KeyCode::KeyX => 'x',
        KeyCode::KeyY => 'y',
        KeyCode::KeyZ => 'z',
        _ => return Key::Other,
    };
    Key::Char(letter)
}
