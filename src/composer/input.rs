use std::io::{self, IsTerminal, Read};

/// Standard input, or whatever stands in for it.
///
/// Only piped input is ever read: an interactive terminal is treated as
/// "no input" so the program never waits on a user typing a body.
pub struct Input<R> {
    reader: R,
    interactive: bool,
}

impl Input<io::Stdin> {
    pub fn stdin() -> Self {
        let stdin = io::stdin();
        let interactive = stdin.is_terminal();
        Input::new(stdin, interactive)
    }
}

impl<R: Read> Input<R> {
    pub fn new(reader: R, interactive: bool) -> Self {
        Input {
            reader,
            interactive,
        }
    }

    /// Blocks until the writer side closes, then returns everything it sent.
    pub fn read_piped(&mut self) -> io::Result<Option<String>> {
        if self.interactive {
            return Ok(None);
        }

        let mut buffer = Vec::new();
        self.reader.read_to_end(&mut buffer)?;
        Ok(Some(String::from_utf8_lossy(&buffer).into_owned()))
    }
}
