use std::io;
use std::thread;
use std::time::Duration;

use wikigit_logging::wg_warn;

use crate::ImportError;

/// Bounded retry for file operations that can hit transient locks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Run `op` until it succeeds or the attempts are used up.
    pub fn run<T>(
        &self,
        operation: &str,
        mut op: impl FnMut() -> io::Result<T>,
    ) -> Result<T, ImportError> {
        let attempts = self.attempts.max(1);
        let mut attempt = 1;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(err) if attempt < attempts => {
                    wg_warn!(
                        "{} failed (attempt {}/{}): {}",
                        operation,
                        attempt,
                        attempts,
                        err
                    );
                    thread::sleep(self.delay);
                    attempt += 1;
                }
                Err(err) => {
                    return Err(ImportError::TransientIo {
                        operation: operation.to_string(),
                        attempts,
                        source: err,
                    })
                }
            }
        }
    }
}
