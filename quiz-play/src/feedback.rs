//! Terminal bell feedback for committed answers

use std::io::Write;

use libquiz::environment::Feedback;

/// Rings the terminal bell: once for a correct answer, twice for a wrong one
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalBell {
    pub muted: bool,
}

impl TerminalBell {
    fn ring(&self, times: usize) {
        if self.muted {
            return;
        }
        let mut stdout = std::io::stdout();
        let _ = stdout.write_all("\x07".repeat(times).as_bytes());
        let _ = stdout.flush();
    }
}

impl Feedback for TerminalBell {
    fn play_correct(&self) {
        self.ring(1);
    }

    fn play_incorrect(&self) {
        self.ring(2);
    }
}
