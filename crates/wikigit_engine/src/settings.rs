use std::time::Duration;

use wikigit_core::{ConfigError, ReflowPolicy, ShellFlavor};

use crate::retry::RetryPolicy;

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// A batch with fewer revisions than this is the last one.
    pub batch_size: usize,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(300),
            batch_size: 1000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImportSettings {
    pub fetch: FetchSettings,
    pub retry: RetryPolicy,
    pub reflow: ReflowPolicy,
    pub shell: ShellFlavor,
    /// Domain of the synthesized author emails, `<id>@<domain>`.
    pub email_domain: String,
    pub git_program: String,
    /// Log progress every this many revisions.
    pub progress_interval: usize,
}

impl ImportSettings {
    pub fn new(shell: ShellFlavor) -> Self {
        Self {
            fetch: FetchSettings::default(),
            retry: RetryPolicy::default(),
            reflow: ReflowPolicy::default(),
            shell,
            email_domain: "wikipedia.org".to_string(),
            git_program: "git".to_string(),
            progress_interval: 10,
        }
    }

    /// Settings for the shell of the running host.
    pub fn for_host() -> Result<Self, ConfigError> {
        Ok(Self::new(ShellFlavor::detect()?))
    }
}
