use std::io::{self, BufRead, Write};

use proxyvault_domain::proxy_config::ProxySettingsEditor;

/// Marker that clears an optional field
const CLEAR_MARKER: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormOutcome {
    Confirm,
    Cancel,
}

/// Reads one secret line without echoing it
pub type HiddenInput = Box<dyn FnMut() -> io::Result<String>>;

/// Line-based form over any reader/writer pair
///
/// Pressing Enter keeps the value shown in brackets. End of input cancels.
/// Passwords of concealing editors go through the hidden input when one is
/// set, and through the plain input otherwise.
pub struct Prompter<R, W> {
    input: R,
    output: W,
    hidden_input: Option<HiddenInput>,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            hidden_input: None,
        }
    }

    pub fn with_hidden_input<F>(mut self, read: F) -> Self
    where
        F: FnMut() -> io::Result<String> + 'static,
    {
        self.hidden_input = Some(Box::new(read));
        self
    }

    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    /// Walk the user through every field of `editor`
    pub fn edit(&mut self, editor: &mut dyn ProxySettingsEditor) -> io::Result<FormOutcome> {
        let Some(enabled) = self.ask_bool("Use a proxy", editor.enabled())? else {
            return Ok(FormOutcome::Cancel);
        };
        editor.set_enabled(enabled);

        if enabled {
            let Some(host) = self.ask_text("Host", &editor.host())? else {
                return Ok(FormOutcome::Cancel);
            };
            editor.set_host(&host);

            let Some(port) = self.ask_port(editor.port())? else {
                return Ok(FormOutcome::Cancel);
            };
            editor.set_port(port);

            let Some(requires_authentication) =
                self.ask_bool("Proxy requires authentication", editor.requires_authentication())?
            else {
                return Ok(FormOutcome::Cancel);
            };
            editor.set_requires_authentication(requires_authentication);

            if requires_authentication {
                let Some(username) =
                    self.ask_optional("Username", editor.username(), false, false)?
                else {
                    return Ok(FormOutcome::Cancel);
                };
                editor.set_username(username.as_deref());

                let hidden = editor.conceals_password();
                let Some(password) =
                    self.ask_optional("Password", editor.password(), true, hidden)?
                else {
                    return Ok(FormOutcome::Cancel);
                };
                editor.set_password(password.as_deref());
            }
        }

        match self.ask_bool("Apply and save these settings", true)? {
            Some(true) => Ok(FormOutcome::Confirm),
            _ => Ok(FormOutcome::Cancel),
        }
    }

    /// None on end of input
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}: ", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn ask_bool(&mut self, label: &str, current: bool) -> io::Result<Option<bool>> {
        let hint = if current { "Y/n" } else { "y/N" };
        loop {
            let Some(answer) = self.read_line(&format!("{} [{}]", label, hint))? else {
                return Ok(None);
            };
            match answer.to_lowercase().as_str() {
                "" => return Ok(Some(current)),
                "y" | "yes" | "true" | "1" => return Ok(Some(true)),
                "n" | "no" | "false" | "0" => return Ok(Some(false)),
                _ => writeln!(self.output, "Please answer y or n")?,
            }
        }
    }

    fn ask_text(&mut self, label: &str, current: &str) -> io::Result<Option<String>> {
        let Some(answer) = self.read_line(&format!("{} [{}]", label, current))? else {
            return Ok(None);
        };
        if answer.is_empty() {
            Ok(Some(current.to_string()))
        } else {
            Ok(Some(answer))
        }
    }

    fn ask_port(&mut self, current: u16) -> io::Result<Option<u16>> {
        let shown = if current == 0 {
            String::new()
        } else {
            current.to_string()
        };
        loop {
            let Some(answer) = self.read_line(&format!("Port [{}]", shown))? else {
                return Ok(None);
            };
            if answer.is_empty() {
                return Ok(Some(current));
            }
            match answer.parse::<u16>() {
                Ok(port) if port > 0 => return Ok(Some(port)),
                _ => writeln!(self.output, "Port must be a number between 1 and 65535")?,
            }
        }
    }

    /// None on end of input
    fn read_hidden_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let Some(read) = self.hidden_input.as_mut() else {
            return self.read_line(prompt);
        };

        write!(self.output, "{}: ", prompt)?;
        self.output.flush()?;

        match read() {
            Ok(line) => Ok(Some(line.trim().to_string())),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                writeln!(self.output)?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Enter keeps the current value; the clear marker removes it
    fn ask_optional(
        &mut self,
        label: &str,
        current: Option<String>,
        secret: bool,
        hidden: bool,
    ) -> io::Result<Option<Option<String>>> {
        let shown = match (&current, secret) {
            (None, _) => String::new(),
            (Some(_), true) => "stored".to_string(),
            (Some(value), false) => value.clone(),
        };
        let prompt = format!("{} [{}] ('{}' clears)", label, shown, CLEAR_MARKER);

        let answer = if hidden {
            self.read_hidden_line(&prompt)?
        } else {
            self.read_line(&prompt)?
        };
        let Some(answer) = answer else {
            return Ok(None);
        };
        Ok(Some(match answer.as_str() {
            "" => current,
            CLEAR_MARKER => None,
            _ => Some(answer),
        }))
    }
}
