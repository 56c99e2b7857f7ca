// Engine constants (no magic values)

/// Default shell program
pub const DEFAULT_SHELL: &str = "sh";

/// Environment variables passed through to spawned shells by default
pub const DEFAULT_ENV_ALLOWLIST: &[&str] = &["PATH", "HOME", "USER"];

/// Command run to decide whether a shell has root privileges
pub const ROOT_PROBE_COMMAND: &str = "id -u";

/// Effective UID reported by a root shell
pub const ROOT_UID: &str = "0";

// Environment overrides read by `ShellConfig::from_env`
pub const ENV_SHELL: &str = "ROOTSHELL_SHELL";
pub const ENV_SHELL_ARGS: &str = "ROOTSHELL_SHELL_ARGS";
pub const ENV_REDIRECT_STDERR: &str = "ROOTSHELL_REDIRECT_STDERR";
pub const ENV_ALLOWLIST: &str = "ROOTSHELL_ENV_ALLOWLIST";
pub const ENV_WORKDIR: &str = "ROOTSHELL_WORKDIR";
