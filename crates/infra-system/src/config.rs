// Shell engine configuration
use std::collections::HashMap;
use std::path::PathBuf;

use rootshell_core::{Result, ShellError};

use crate::constants::{
    DEFAULT_ENV_ALLOWLIST, DEFAULT_SHELL, ENV_ALLOWLIST, ENV_REDIRECT_STDERR, ENV_SHELL,
    ENV_SHELL_ARGS, ENV_WORKDIR,
};

/// How spawned shells are started
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    /// Shell program; commands are written to its stdin
    pub shell: String,
    pub args: Vec<String>,
    /// Merge stderr into stdout
    pub redirect_stderr: bool,
    /// Only these variables are inherited by the shell
    pub env_allowlist: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            shell: DEFAULT_SHELL.to_string(),
            args: Vec::new(),
            redirect_stderr: false,
            env_allowlist: DEFAULT_ENV_ALLOWLIST.iter().map(|s| s.to_string()).collect(),
            working_dir: None,
        }
    }
}

impl ShellConfig {
    /// Defaults overlaid with `ROOTSHELL_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(shell) = lookup(ENV_SHELL).filter(|s| !s.trim().is_empty()) {
            config.shell = shellexpand::tilde(shell.trim()).into_owned();
        }
        if let Some(args) = lookup(ENV_SHELL_ARGS) {
            config.args = args.split_whitespace().map(str::to_string).collect();
        }
        if let Some(flag) = lookup(ENV_REDIRECT_STDERR) {
            config.redirect_stderr = parse_flag(ENV_REDIRECT_STDERR, &flag)?;
        }
        if let Some(list) = lookup(ENV_ALLOWLIST) {
            config.env_allowlist = list
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(dir) = lookup(ENV_WORKDIR).filter(|d| !d.trim().is_empty()) {
            let expanded = shellexpand::full(dir.trim())
                .map_err(|e| ShellError::Config(format!("{}: {}", ENV_WORKDIR, e)))?;
            config.working_dir = Some(PathBuf::from(expanded.into_owned()));
        }

        Ok(config)
    }

    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_redirect_stderr(mut self, redirect: bool) -> Self {
        self.redirect_stderr = redirect;
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Current process environment restricted to the allowlist
    pub(crate) fn filtered_env(&self) -> HashMap<String, String> {
        self.filter_env(std::env::vars())
    }

    fn filter_env<I>(&self, env: I) -> HashMap<String, String>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        env.into_iter()
            .filter(|(k, _)| self.env_allowlist.contains(k))
            .collect()
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "" | "0" | "false" | "no" => Ok(false),
        other => Err(ShellError::Config(format!(
            "{}: expected a boolean, got '{}'",
            key, other
        ))),
    }
}
