use egui::{Context, Key, Modifiers, PointerButton, Pos2, Rect};

/// A pointer event in screen coordinates, as the host received it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub screen_pos: Pos2,
    pub button: Option<PointerButton>,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn at(screen_pos: Pos2) -> Self {
        Self {
            screen_pos,
            button: None,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = Some(button);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    /// The key pressed together with Ctrl (Cmd on macOS)
    pub fn with_command(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::COMMAND,
        }
    }

    pub fn is_command(&self) -> bool {
        self.modifiers.ctrl || self.modifiers.command || self.modifiers.mac_cmd
    }

    pub fn is_command_key(&self, key: Key) -> bool {
        self.key == key && self.is_command()
    }
}

/// Input forwarded from the host to the engine
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown(PointerEvent),
    PointerMove(PointerEvent),
    PointerUp(PointerEvent),
    /// Pointer left the canvas or the window
    PointerLeave,
    KeyDown(KeyEvent),
}

/// Converts raw egui input into canvas events
#[derive(Debug, Clone)]
pub struct InputHandler {
    canvas_rect: Rect,
    pointer_inside: bool,
}

impl InputHandler {
    pub fn new(canvas_rect: Rect) -> Self {
        Self {
            canvas_rect,
            pointer_inside: false,
        }
    }

    /// Update the canvas rectangle (e.g. if window is resized)
    pub fn set_canvas_rect(&mut self, rect: Rect) {
        self.canvas_rect = rect;
    }

    pub fn pointer_inside(&self) -> bool {
        self.pointer_inside
    }

    pub fn process_input(&mut self, ctx: &Context) -> Vec<InputEvent> {
        ctx.input(|input| self.translate(&input.events))
    }

    /// Pointer presses only count inside the canvas; releases are always forwarded so a
    /// drag that ends outside still finishes.
    pub fn translate(&mut self, events: &[egui::Event]) -> Vec<InputEvent> {
        let mut translated = Vec::new();

        for event in events {
            match event {
                egui::Event::PointerMoved(pos) => {
                    if self.canvas_rect.contains(*pos) {
                        self.pointer_inside = true;
                        translated.push(InputEvent::PointerMove(PointerEvent::at(*pos)));
                    } else if self.pointer_inside {
                        self.pointer_inside = false;
                        translated.push(InputEvent::PointerLeave);
                    }
                }
                egui::Event::PointerGone => {
                    if self.pointer_inside {
                        self.pointer_inside = false;
                        translated.push(InputEvent::PointerLeave);
                    }
                }
                egui::Event::PointerButton {
                    pos,
                    button,
                    pressed,
                    modifiers,
                } => {
                    let pointer = PointerEvent {
                        screen_pos: *pos,
                        button: Some(*button),
                        modifiers: *modifiers,
                    };
                    if *pressed {
                        if *button == PointerButton::Primary && self.canvas_rect.contains(*pos) {
                            translated.push(InputEvent::PointerDown(pointer));
                        }
                    } else if *button == PointerButton::Primary {
                        translated.push(InputEvent::PointerUp(pointer));
                    }
                }
                egui::Event::Key {
                    key,
                    pressed: true,
                    modifiers,
                    ..
                } => {
                    translated.push(InputEvent::KeyDown(KeyEvent {
                        key: *key,
                        modifiers: *modifiers,
                    }));
                }
                // Clipboard shortcuts reach us as dedicated events on most backends
                egui::Event::Copy => translated.push(InputEvent::KeyDown(KeyEvent::with_command(Key::C))),
                egui::Event::Cut => translated.push(InputEvent::KeyDown(KeyEvent::with_command(Key::X))),
                egui::Event::Paste(_) => {
                    translated.push(InputEvent::KeyDown(KeyEvent::with_command(Key::V)));
                }
                _ => {}
            }
        }

        translated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    fn handler() -> InputHandler {
        InputHandler::new(Rect::from_min_max(pos2(0.0, 0.0), pos2(100.0, 100.0)))
    }

    #[test]
    fn leaving_the_canvas_emits_one_leave() {
        let mut input = handler();
        let events = input.translate(&[
            egui::Event::PointerMoved(pos2(10.0, 10.0)),
            egui::Event::PointerMoved(pos2(150.0, 10.0)),
            egui::Event::PointerMoved(pos2(160.0, 10.0)),
        ]);
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], InputEvent::PointerLeave);
        assert!(!input.pointer_inside());
    }

    #[test]
    fn presses_outside_the_canvas_are_ignored() {
        let mut input = handler();
        let events = input.translate(&[egui::Event::PointerButton {
            pos: pos2(200.0, 10.0),
            button: PointerButton::Primary,
            pressed: true,
            modifiers: Modifiers::NONE,
        }]);
        assert!(events.is_empty());
    }

    #[test]
    fn clipboard_events_become_command_keys() {
        let mut input = handler();
        let events = input.translate(&[egui::Event::Copy, egui::Event::Paste(String::new())]);
        assert_eq!(events, vec![
            InputEvent::KeyDown(KeyEvent::with_command(Key::C)),
            InputEvent::KeyDown(KeyEvent::with_command(Key::V)),
        ]);
    }
}
