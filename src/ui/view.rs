use super::state::VisibleState;
use super::sync::Change;
use std::io::Write;

/// Applies visible state to an actual display
pub trait View: Send {
    fn render(&mut self, state: &VisibleState, changes: &[Change]);
}

/// Line-oriented terminal display
pub struct ConsoleView<W: Write + Send> {
    out: W,
}

impl ConsoleView<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self {
            out: std::io::stdout(),
        }
    }
}

impl<W: Write + Send> ConsoleView<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn draw(&mut self, state: &VisibleState, change: Change) -> std::io::Result<()> {
        match change {
            Change::Reachability => writeln!(self.out, "[{}]", state.status_label()),
            Change::Transcription => match &state.transcription {
                Some(text) => writeln!(self.out, "> {}", text),
                None => Ok(()),
            },
            Change::BubbleAdded(index) => match state.chat.bubbles().get(index) {
                Some(bubble) => writeln!(self.out, "{:>8} | {}", bubble.css_class(), bubble.text),
                None => Ok(()),
            },
            Change::ChatCleared => writeln!(self.out, "-- chat cleared --"),
            Change::Indicator => {
                if state.chat.is_typing() {
                    writeln!(self.out, "   ... thinking")
                } else {
                    Ok(())
                }
            }
            Change::History => match state.history.latest() {
                Some(entry) => writeln!(self.out, "[{}] {}", entry.time, entry.question),
                None => Ok(()),
            },
            Change::ProPanel => {
                let panel = &state.pro_panel;
                writeln!(self.out, "   keywords: {}", panel.keywords.join(" | "))?;
                for point in &panel.talking_points {
                    writeln!(self.out, "   - {}", point)?;
                }
                writeln!(self.out, "   follow-up: {}", panel.follow_up)
            }
            Change::Listening => writeln!(self.out, "[{}]", state.toggle_label()),
            Change::Devices => {
                for device in &state.devices {
                    let marker = if state.selected_device == Some(device.index) {
                        '*'
                    } else {
                        ' '
                    };
                    writeln!(self.out, " {} {:>3}: {}", marker, device.index, device.name)?;
                }
                Ok(())
            }
        }
    }
}

impl<W: Write + Send> View for ConsoleView<W> {
    fn render(&mut self, state: &VisibleState, changes: &[Change]) {
        for &change in changes {
            if let Err(e) = self.draw(state, change) {
                tracing::warn!("Failed to render {:?}: {}", change, e);
            }
        }
        if let Err(e) = self.out.flush() {
            tracing::warn!("Failed to flush console output: {}", e);
        }
    }
}
