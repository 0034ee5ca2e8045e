//! Server launch description.

use std::fmt;

use crate::config::ServerConfig;

/// Everything needed to start the application server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerLaunch {
    program: String,
    args: Vec<String>,
    bind_address: String,
    workers: u32,
    timeout_secs: u64,
}

impl ServerLaunch {
    pub fn new(
        program: impl Into<String>,
        args: Vec<String>,
        bind_address: impl Into<String>,
        workers: u32,
        timeout_secs: u64,
    ) -> Self {
        Self {
            program: program.into(),
            args,
            bind_address: bind_address.into(),
            workers,
            timeout_secs,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(
            config.program.clone(),
            config.args.clone(),
            config.bind_address.clone(),
            config.workers,
            config.timeout_secs,
        )
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn bind_address(&self) -> &str {
        &self.bind_address
    }

    pub fn workers(&self) -> u32 {
        self.workers
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    /// Arguments passed to the program (excluding argv[0]).
    pub fn argv(&self) -> Vec<String> {
        let mut argv = self.args.clone();
        argv.extend([
            "--bind".to_string(),
            self.bind_address.clone(),
            "--workers".to_string(),
            self.workers.to_string(),
            "--timeout".to_string(),
            self.timeout_secs.to_string(),
        ]);
        argv
    }
}

impl fmt::Display for ServerLaunch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in self.argv() {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}
