#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    KeyPressed(char),
}

impl InputEvent {
    /// The pressed key folded to lowercase
    pub fn key(&self) -> char {
        match self {
            InputEvent::KeyPressed(c) => c.to_ascii_lowercase(),
        }
    }
}
