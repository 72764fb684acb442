use std::path::{Path, PathBuf};

use wikigit_core::ShellFlavor;
use wikigit_logging::wg_debug;

use crate::process::{CommandOutput, CommandRunner, Invocation};
use crate::ImportError;

/// Builds a git command line, quoting every value for the target shell.
#[derive(Debug, Clone)]
pub struct GitCommand {
    flavor: ShellFlavor,
    line: String,
    env: Vec<(String, String)>,
}

impl GitCommand {
    pub fn new(flavor: ShellFlavor, subcommand: &str) -> Self {
        Self {
            flavor,
            line: subcommand.to_string(),
            env: Vec::new(),
        }
    }

    /// A literal argument such as `--all`; never user data.
    pub fn flag(mut self, flag: &str) -> Self {
        self.line.push(' ');
        self.line.push_str(flag);
        self
    }

    /// A quoted value argument.
    pub fn value(mut self, value: &str) -> Self {
        self.line.push(' ');
        self.line.push_str(&self.flavor.quote(value));
        self
    }

    /// `--flag="value"` as one argument.
    pub fn option(mut self, flag: &str, value: &str) -> Self {
        self.line.push(' ');
        self.line.push_str(flag);
        self.line.push('=');
        self.line.push_str(&self.flavor.quote(value));
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.env.push((key.to_string(), value.to_string()));
        self
    }

    pub fn line(&self) -> &str {
        &self.line
    }
}

/// A repository working tree driven through the git binary.
pub struct GitRepository<'r> {
    dir: PathBuf,
    program: String,
    flavor: ShellFlavor,
    runner: &'r dyn CommandRunner,
}

impl<'r> GitRepository<'r> {
    pub fn new(
        dir: impl Into<PathBuf>,
        program: impl Into<String>,
        flavor: ShellFlavor,
        runner: &'r dyn CommandRunner,
    ) -> Self {
        Self {
            dir: dir.into(),
            program: program.into(),
            flavor,
            runner,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn command(&self, subcommand: &str) -> GitCommand {
        GitCommand::new(self.flavor, subcommand)
    }

    /// Run `command`; a non-zero exit is an error.
    pub fn run(&self, command: GitCommand) -> Result<CommandOutput, ImportError> {
        let invocation = self.invocation(command);
        let output = self.execute(&invocation)?;
        if !output.success() {
            return Err(ImportError::ExternalCommand {
                command: invocation.display(),
                working_dir: self.dir.clone(),
                status: output
                    .status
                    .map(|code| format!("exit code {code}"))
                    .unwrap_or_else(|| "terminated by signal".to_string()),
                stdout: output.stdout,
                stderr: output.stderr,
            });
        }
        Ok(output)
    }

    /// Run `command` and hand back its output whatever the exit status.
    pub fn query(&self, command: GitCommand) -> Result<CommandOutput, ImportError> {
        let invocation = self.invocation(command);
        self.execute(&invocation)
    }

    pub fn is_initialized(&self) -> bool {
        self.dir.join(".git").exists()
    }

    pub fn init(&self) -> Result<(), ImportError> {
        self.run(self.command("init"))?;
        Ok(())
    }

    pub fn has_commits(&self) -> Result<bool, ImportError> {
        let output = self.query(
            self.command("rev-parse")
                .flag("--verify")
                .flag("--quiet")
                .flag("HEAD"),
        )?;
        Ok(output.success())
    }

    /// Full message of the newest commit containing `marker`, if any.
    pub fn last_message_containing(&self, marker: &str) -> Result<Option<String>, ImportError> {
        let output = self.run(
            self.command("log")
                .flag("-1")
                .flag("--fixed-strings")
                .option("--grep", marker)
                .flag("--format=%B"),
        )?;
        let message = output.stdout.trim();
        Ok((!message.is_empty()).then(|| message.to_string()))
    }

    fn invocation(&self, command: GitCommand) -> Invocation {
        Invocation {
            program: self.program.clone(),
            command_line: command.line,
            env: command.env,
            working_dir: self.dir.clone(),
        }
    }

    fn execute(&self, invocation: &Invocation) -> Result<CommandOutput, ImportError> {
        wg_debug!("Running {}", invocation.display());
        self.runner
            .run(invocation)
            .map_err(|err| ImportError::ExternalCommand {
                command: invocation.display(),
                working_dir: self.dir.clone(),
                status: format!("failed to start: {err}"),
                stdout: String::new(),
                stderr: String::new(),
            })
    }
}
