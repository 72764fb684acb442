use std::io;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use wikigit_core::ShellFlavor;

/// A command line ready for the platform shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    /// Arguments, already quoted for the target shell.
    pub command_line: String,
    pub env: Vec<(String, String)>,
    pub working_dir: PathBuf,
}

impl Invocation {
    pub fn display(&self) -> String {
        format!("{} {}", self.program, self.command_line)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; `None` when the process was killed by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Runs external commands synchronously and captures their output.
pub trait CommandRunner: Send + Sync {
    fn run(&self, invocation: &Invocation) -> io::Result<CommandOutput>;
}

/// Hands command lines to `sh -c` on POSIX hosts and straight to the
/// program's own argument parser on Windows.
#[derive(Debug, Clone, Copy)]
pub struct ShellRunner {
    flavor: ShellFlavor,
}

impl ShellRunner {
    pub fn new(flavor: ShellFlavor) -> Self {
        Self { flavor }
    }

    fn command(&self, invocation: &Invocation) -> io::Result<Command> {
        match self.flavor {
            ShellFlavor::Posix => {
                let mut command = Command::new("sh");
                command.arg("-c").arg(format!(
                    "{} {}",
                    self.flavor.quote(&invocation.program),
                    invocation.command_line
                ));
                Ok(command)
            }
            ShellFlavor::Windows => windows_command(invocation),
        }
    }
}

#[cfg(windows)]
fn windows_command(invocation: &Invocation) -> io::Result<Command> {
    use std::os::windows::process::CommandExt;

    let mut command = Command::new(&invocation.program);
    command.raw_arg(&invocation.command_line);
    Ok(command)
}

#[cfg(not(windows))]
fn windows_command(_invocation: &Invocation) -> io::Result<Command> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "Windows command lines can only be run on Windows",
    ))
}

/// Own process group, so a terminal interrupt reaches only us and the
/// running git command finishes before the import stops.
#[cfg(unix)]
fn detach_from_terminal(command: &mut Command) {
    use std::os::unix::process::CommandExt;

    command.process_group(0);
}

#[cfg(windows)]
fn detach_from_terminal(command: &mut Command) {
    use std::os::windows::process::CommandExt;

    const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
    command.creation_flags(CREATE_NEW_PROCESS_GROUP);
}

#[cfg(not(any(unix, windows)))]
fn detach_from_terminal(_command: &mut Command) {}

impl CommandRunner for ShellRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<CommandOutput> {
        let mut command = self.command(invocation)?;
        command
            .current_dir(&invocation.working_dir)
            .envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null());
        detach_from_terminal(&mut command);
        let output = command.output()?;
        Ok(CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
