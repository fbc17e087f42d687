use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::mouse::MouseButton;
use sdl2::EventPump;

/// Input the main menu reacts to
///
/// Raw SDL2 events are translated into these once per frame, so the shell and
/// the form never see SDL2 event types.
#[derive(Debug, Clone, PartialEq)]
pub enum MenuAction {
    /// Window closed
    Quit,

    /// Escape pressed
    Escape,

    /// Return pressed
    Confirm,

    /// Left mouse button pressed at (x, y)
    Click(i32, i32),

    MouseMove(i32, i32),
}

/// Something that yields the actions for the next frame
pub trait InputSource {
    fn poll_actions(&mut self) -> Vec<MenuAction>;
}

/// InputSystem processes SDL2 events and produces MenuActions
pub struct InputSystem {
    event_pump: EventPump,
}

impl InputSystem {
    pub fn new(event_pump: EventPump) -> Self {
        InputSystem { event_pump }
    }

    /// Translates a single SDL2 event. Events the menu ignores map to `None`.
    pub fn translate(event: &Event) -> Option<MenuAction> {
        match event {
            Event::Quit { .. } => Some(MenuAction::Quit),
            Event::KeyDown {
                keycode: Some(key), ..
            } => match *key {
                Keycode::Escape => Some(MenuAction::Escape),
                Keycode::Return | Keycode::KpEnter => Some(MenuAction::Confirm),
                _ => None,
            },
            Event::MouseButtonDown {
                mouse_btn: MouseButton::Left,
                x,
                y,
                ..
            } => Some(MenuAction::Click(*x, *y)),
            Event::MouseMotion { x, y, .. } => Some(MenuAction::MouseMove(*x, *y)),
            _ => None,
        }
    }
}

impl InputSource for InputSystem {
    fn poll_actions(&mut self) -> Vec<MenuAction> {
        self.event_pump
            .poll_iter()
            .filter_map(|event| InputSystem::translate(&event))
            .collect()
    }
}
