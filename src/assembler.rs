use crate::keycode::Keystroke;

/// Collects characters until the scanner sends Enter.
#[derive(Debug, Default)]
pub struct ScanAssembler {
    buffer: String,
}

impl ScanAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the completed scan when `keystroke` is a terminator.
    ///
    /// An Enter with nothing accumulated yields an empty scan.
    pub fn feed(&mut self, keystroke: Keystroke) -> Option<String> {
        match keystroke {
            Keystroke::Character(ch) => {
                self.buffer.push(ch);
                None
            }
            Keystroke::Terminator => Some(std::mem::take(&mut self.buffer)),
            Keystroke::Ignore => None,
        }
    }

    /// Characters received since the last terminator.
    pub fn pending(&self) -> &str {
        &self.buffer
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}
