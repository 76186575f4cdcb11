//! Terminal side effects: output streams, keypresses and the browser

use console::Term;
use std::io;
use tracing::debug;

/// Everything cider does to the user's terminal goes through this trait
pub trait Terminal {
    /// Write one line to standard output
    fn out(&mut self, line: &str);

    /// Write one line to standard error
    fn err(&mut self, line: &str);

    /// Block until a single key is pressed. An interrupt (Ctrl-C) is
    /// reported as [`io::ErrorKind::Interrupted`].
    fn wait_for_key(&mut self) -> io::Result<()>;

    /// Open a URL in the default browser
    fn open_url(&mut self, url: &str) -> io::Result<()>;
}

/// The real terminal of the running process
#[derive(Debug)]
pub struct ConsoleTerminal {
    stdout: Term,
    stderr: Term,
}

impl ConsoleTerminal {
    #[must_use]
    pub fn new() -> Self {
        Self {
            stdout: Term::stdout(),
            stderr: Term::stderr(),
        }
    }
}

impl Default for ConsoleTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Terminal for ConsoleTerminal {
    fn out(&mut self, line: &str) {
        // A closed pipe is not worth failing a finished command over
        if let Err(e) = self.stdout.write_line(line) {
            debug!("Failed to write to stdout: {}", e);
        }
    }

    fn err(&mut self, line: &str) {
        if let Err(e) = self.stderr.write_line(line) {
            debug!("Failed to write to stderr: {}", e);
        }
    }

    fn wait_for_key(&mut self) -> io::Result<()> {
        self.stdout.read_key().map(|key| debug!("Got key {:?}", key))
    }

    fn open_url(&mut self, url: &str) -> io::Result<()> {
        debug!("Opening {} in the browser", url);
        open::that(url)
    }
}
