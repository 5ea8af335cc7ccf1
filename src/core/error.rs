//! Error types for relgen with contextual messages and exit codes
//!
//! Every error belongs to one category of the taxonomy: configuration,
//! malformed version tags, failed external commands, template rendering,
//! or I/O. Categories carry an exit code and, where it helps, a hint for
//! the user.
//!
//! Unresolved dependency hashes are not errors. They are recorded on the
//! descriptor (see `pipeline::hashing::UnresolvedHash`).

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for relgen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, bad version argument, template, failed versions)
  User = 1,
  /// System error (git, external tools, I/O)
  System = 2,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for relgen
#[derive(Debug)]
pub enum RelgenError {
  /// Configuration errors
  Config(ConfigError),

  /// Tag does not match the version grammar
  Version(VersionError),

  /// External command errors
  Command(CommandError),

  /// Template rendering errors
  Render(RenderError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl RelgenError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    RelgenError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    RelgenError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Shorthand for a malformed tag
  pub fn malformed_tag(tag: impl Into<String>) -> Self {
    RelgenError::Version(VersionError::MalformedTag { tag: tag.into() })
  }

  /// Add context to an existing error
  ///
  /// Messages gain a context line and I/O errors fold it into their text,
  /// keeping their kind and exit code. Config, version, command and render
  /// errors already name what failed and are returned unchanged.
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      RelgenError::Message { message, context, help } => RelgenError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      RelgenError::Io(e) => RelgenError::Io(io::Error::new(e.kind(), format!("{}: {}", ctx_str, e))),
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      RelgenError::Config(_) => ExitCode::User,
      RelgenError::Version(_) => ExitCode::User,
      RelgenError::Command(_) => ExitCode::System,
      RelgenError::Render(_) => ExitCode::User,
      RelgenError::Io(_) => ExitCode::System,
      RelgenError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      RelgenError::Config(e) => e.help_message(),
      RelgenError::Version(e) => e.help_message(),
      RelgenError::Command(e) => e.help_message(),
      RelgenError::Render(e) => e.help_message(),
      RelgenError::Message { help, .. } => help.clone(),
      RelgenError::Io(_) => None,
    }
  }
}

impl fmt::Display for RelgenError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RelgenError::Config(e) => write!(f, "{}", e),
      RelgenError::Version(e) => write!(f, "{}", e),
      RelgenError::Command(e) => write!(f, "{}", e),
      RelgenError::Render(e) => write!(f, "{}", e),
      RelgenError::Io(e) => write!(f, "I/O error: {}", e),
      RelgenError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for RelgenError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      RelgenError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for RelgenError {
  fn from(err: io::Error) -> Self {
    RelgenError::Io(err)
  }
}

impl From<String> for RelgenError {
  fn from(msg: String) -> Self {
    RelgenError::message(msg)
  }
}

impl From<&str> for RelgenError {
  fn from(msg: &str) -> Self {
    RelgenError::message(msg)
  }
}

impl From<toml_edit::de::Error> for RelgenError {
  fn from(err: toml_edit::de::Error) -> Self {
    RelgenError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for RelgenError {
  fn from(err: serde_json::Error) -> Self {
    RelgenError::message(format!("JSON error: {}", err))
  }
}

impl From<std::string::FromUtf8Error> for RelgenError {
  fn from(err: std::string::FromUtf8Error) -> Self {
    RelgenError::message(format!("UTF-8 conversion error: {}", err))
  }
}

impl From<tokio::task::JoinError> for RelgenError {
  fn from(err: tokio::task::JoinError) -> Self {
    RelgenError::message(format!("Task aborted: {}", err))
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// A field holds an unusable value
  Invalid { field: String, reason: String },

  /// Descriptor template not found
  TemplateMissing { path: PathBuf },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::Invalid { field, .. } => Some(format!("Fix `{}` in relgen.toml or remove it to use the default.", field)),
      ConfigError::TemplateMissing { .. } => {
        Some("Create the template or point `output.template` in relgen.toml at it.".to_string())
      }
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::Invalid { field, reason } => {
        write!(f, "Invalid configuration value for {}: {}", field, reason)
      }
      ConfigError::TemplateMissing { path } => {
        write!(f, "Descriptor template not found: {}", path.display())
      }
    }
  }
}

/// Version tag errors
#[derive(Debug)]
pub enum VersionError {
  /// Tag does not match `PREFIX MAJOR.MINOR.MICRO[rcN|aN|.devN]`
  MalformedTag { tag: String },
}

impl VersionError {
  fn help_message(&self) -> Option<String> {
    match self {
      VersionError::MalformedTag { .. } => Some(
        "Expected MAJOR.MINOR.MICRO with at most one of rcN, aN or .devN, e.g. 2.19.0rc2. Legacy tags can be excluded with `upstream.legacy`.".to_string(),
      ),
    }
  }
}

impl fmt::Display for VersionError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      VersionError::MalformedTag { tag } => write!(f, "Malformed version tag: {}", tag),
    }
  }
}

/// External command errors
#[derive(Debug)]
pub enum CommandError {
  /// Command exited with a non-zero status
  Failed {
    command: String,
    status: Option<i32>,
    stderr: String,
  },

  /// Command could not be started at all
  Spawn { command: String, reason: String },
}

impl CommandError {
  fn help_message(&self) -> Option<String> {
    match self {
      CommandError::Spawn { .. } => Some("Make sure git, tar and the nix tools are on PATH.".to_string()),
      CommandError::Failed { stderr, .. } => {
        if stderr.contains("unknown revision") || stderr.contains("does not exist in") {
          Some("The tag or path may not exist upstream. Run `relgen list` to see known tags.".to_string())
        } else {
          None
        }
      }
    }
  }
}

impl fmt::Display for CommandError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CommandError::Failed { command, status, stderr } => {
        match status {
          Some(code) => write!(f, "Command exited with {}: {}", code, command)?,
          None => write!(f, "Command terminated by signal: {}", command)?,
        }
        let stderr = stderr.trim();
        if !stderr.is_empty() {
          write!(f, "\n{}", stderr)?;
        }
        Ok(())
      }
      CommandError::Spawn { command, reason } => {
        write!(f, "Failed to start command {}: {}", command, reason)
      }
    }
  }
}

/// Template rendering errors
#[derive(Debug)]
pub enum RenderError {
  /// Placeholders left without a value
  Unresolved { slots: Vec<String> },
}

impl RenderError {
  fn help_message(&self) -> Option<String> {
    match self {
      RenderError::Unresolved { .. } => Some(
        "Known slots: version, args, hash, rust_version, cargo_lock_url, rust_toolchain_url, output_hashes. Use $$ for a literal $.".to_string(),
      ),
    }
  }
}

impl fmt::Display for RenderError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RenderError::Unresolved { slots } => {
        write!(f, "Template has unresolved placeholders: {}", slots.join(", "))
      }
    }
  }
}

/// Result type alias for relgen
pub type RelgenResult<T> = Result<T, RelgenError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> RelgenResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> RelgenResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<RelgenError>,
{
  fn context(self, ctx: impl Into<String>) -> RelgenResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> RelgenResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &RelgenError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
