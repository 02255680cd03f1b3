use crate::error::ViewerError;
use std::process::{Command, Stdio};
use url::Url;

/// Something that can show a document in a new viewing context
pub trait DocumentViewer {
    fn open(&mut self, url: &Url) -> Result<(), ViewerError>;
}

/// Hands documents to the platform opener (or a user-supplied command)
pub struct SystemViewer {
    program: String,
    args: Vec<String>,
}

impl SystemViewer {
    /// Platform default opener
    pub fn platform() -> Self {
        if cfg!(target_os = "macos") {
            Self::with_command("open", Vec::new())
        } else if cfg!(target_os = "windows") {
            // `start` treats its first quoted argument as a window title
            Self::with_command("cmd", vec!["/C".into(), "start".into(), String::new()])
        } else {
            Self::with_command("xdg-open", Vec::new())
        }
    }

    /// Parse a whitespace-separated opener such as `firefox --new-tab`
    pub fn from_command_line(line: &str) -> Result<Self, ViewerError> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or(ViewerError::EmptyCommand)?;
        Ok(Self::with_command(program, parts.collect()))
    }

    pub fn with_command(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn command(&self, url: &Url) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(url.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd
    }
}

impl DocumentViewer for SystemViewer {
    fn open(&mut self, url: &Url) -> Result<(), ViewerError> {
        let mut child = self.command(url).spawn().map_err(|source| ViewerError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        // Fire and forget: reap off the event loop so no zombie is left behind
        let program = self.program.clone();
        std::thread::spawn(move || match child.wait() {
            Ok(status) if !status.success() => {
                tracing::warn!(%program, %status, "document opener exited with failure");
            }
            Err(e) => tracing::warn!(%program, error = %e, "failed to wait on document opener"),
            _ => {}
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_parsing() {
        let viewer = SystemViewer::from_command_line("  firefox --new-tab ").unwrap();
        assert_eq!(viewer.program(), "firefox");
        assert_eq!(viewer.args, ["--new-tab"]);

        assert!(matches!(
            SystemViewer::from_command_line("   "),
            Err(ViewerError::EmptyCommand)
        ));
    }

    #[test]
    fn test_url_is_last_argument() {
        let viewer = SystemViewer::with_command("echo", vec!["-n".into()]);
        let url = Url::parse("http://localhost:3000/pdfs/gir.pdf").unwrap();
        let cmd = viewer.command(&url);
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(args, ["-n", "http://localhost:3000/pdfs/gir.pdf"]);
    }

    #[test]
    fn test_missing_program_reports_spawn_error() {
        let mut viewer = SystemViewer::with_command("definitely-not-a-real-opener-binary", Vec::new());
        let url = Url::parse("file:///tmp/x.pdf").unwrap();
        assert!(matches!(viewer.open(&url), Err(ViewerError::Spawn { .. })));
    }
}
