use std::ffi::OsString;
use std::path::Path;

use crate::descriptor::{ProductDescriptor, RunDescriptor};

/// Environment variable the client reads the password file location from during login.
pub const PASS_FILE_ENV: &str = "CC_PASS_FILE";

/// A single argument to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandArg {
    pub value: OsString,
    /// Whether the value is wrapped in double quotes when the command line is displayed.
    pub quoted: bool,
}

impl CommandArg {
    fn plain(value: impl Into<OsString>) -> Self {
        Self {
            value: value.into(),
            quoted: false,
        }
    }

    fn quoted(value: impl Into<OsString>) -> Self {
        Self {
            value: value.into(),
            quoted: true,
        }
    }
}

/// An invocation of the report server client.
///
/// Arguments are kept as a list and handed to the process as-is, so values never go through a
/// shell. [`ClientCommand::display`] renders the traditional single line form where descriptions,
/// run names and URLs are wrapped in double quotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCommand {
    /// Short name used when logging, e.g. "Login".
    label: &'static str,
    args: Vec<CommandArg>,
    envs: Vec<(String, OsString)>,
}

impl ClientCommand {
    fn new(label: &'static str) -> Self {
        Self {
            label,
            args: vec![],
            envs: vec![],
        }
    }

    fn arg(mut self, arg: CommandArg) -> Self {
        self.args.push(arg);
        self
    }

    fn flag(self, flag: &str, value: CommandArg) -> Self {
        self.arg(CommandArg::plain(flag)).arg(value)
    }

    fn env(mut self, key: &str, value: impl Into<OsString>) -> Self {
        self.envs.push((key.to_string(), value.into()));
        self
    }

    /// `cmd login <username> --url <base_url>`, with the password file passed through
    /// [`PASS_FILE_ENV`].
    pub fn login(username: &str, base_url: &str, password_file: &Path) -> Self {
        Self::new("Login")
            .arg(CommandArg::plain("cmd"))
            .arg(CommandArg::plain("login"))
            .arg(CommandArg::plain(username))
            .flag("--url", CommandArg::plain(base_url))
            .env(PASS_FILE_ENV, password_file)
    }

    /// `cmd login -d --url <base_url>`, ends the current session.
    pub fn logout(base_url: &str) -> Self {
        Self::new("Logout")
            .arg(CommandArg::plain("cmd"))
            .arg(CommandArg::plain("login"))
            .arg(CommandArg::plain("-d"))
            .flag("--url", CommandArg::plain(base_url))
    }

    /// `cmd products add -n <name> --description "<description>" --url <base_url> <endpoint>`
    pub fn add_product(product: &ProductDescriptor, base_url: &str) -> Self {
        Self::new("Add product")
            .arg(CommandArg::plain("cmd"))
            .arg(CommandArg::plain("products"))
            .arg(CommandArg::plain("add"))
            .flag("-n", CommandArg::plain(&product.name))
            .flag("--description", CommandArg::quoted(&product.description))
            .flag("--url", CommandArg::plain(base_url))
            .arg(CommandArg::plain(&product.endpoint))
    }

    /// `store -n "<name>" --url "<url>" <output> [--tag "<tag>"] [--description "<description>"]`
    ///
    /// Optional flags are left out entirely when the value is not set or empty.
    pub fn store(run: &RunDescriptor) -> Self {
        let mut command = Self::new("Store")
            .arg(CommandArg::plain("store"))
            .flag("-n", CommandArg::quoted(&run.name))
            .flag("--url", CommandArg::quoted(&run.url))
            .arg(CommandArg::plain(run.output.as_os_str()));

        if let Some(tag) = non_empty(run.tag.as_deref()) {
            command = command.flag("--tag", CommandArg::quoted(tag));
        }

        if let Some(description) = non_empty(run.description.as_deref()) {
            command = command.flag("--description", CommandArg::quoted(description));
        }

        command
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn args(&self) -> &[CommandArg] {
        &self.args
    }

    /// Argument values in the form they are passed to the process.
    pub fn arg_values(&self) -> impl Iterator<Item = &OsString> {
        self.args.iter().map(|arg| &arg.value)
    }

    /// Extra environment for the child, on top of the inherited environment.
    pub fn envs(&self) -> &[(String, OsString)] {
        &self.envs
    }

    /// Value of the argument following `flag`, if the flag is present.
    pub fn flag_value(&self, flag: &str) -> Option<&OsString> {
        self.args
            .iter()
            .position(|arg| arg.value == flag)
            .and_then(|index| self.args.get(index + 1))
            .map(|arg| &arg.value)
    }

    /// The command line as it is shown to the user, starting with `program`.
    ///
    /// Environment values are never included.
    pub fn display(&self, program: &str) -> String {
        std::iter::once(program.to_string())
            .chain(self.args.iter().map(|arg| {
                let value = arg.value.to_string_lossy();
                if arg.quoted {
                    format!("\"{value}\"")
                } else {
                    value.into_owned()
                }
            }))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
