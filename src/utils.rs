//! Helpers for building command lines

use std::path::Path;

/// Quote a single argument for `sh -c`
///
/// Plain words pass through untouched so logged command lines stay readable;
/// anything else is wrapped in single quotes with embedded quotes escaped.
pub fn shell_quote(arg: &str) -> String {
  let plain = !arg.is_empty()
    && arg
      .bytes()
      .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'/' | b':' | b'@' | b'+' | b'=' | b','));
  if plain {
    arg.to_string()
  } else {
    format!("'{}'", arg.replace('\'', r"'\''"))
  }
}

/// Quote a filesystem path for `sh -c`
pub fn shell_quote_path(path: &Path) -> String {
  shell_quote(&path.to_string_lossy())
}

/// Fill `{name}` placeholders in a command template with quoted values
pub fn fill_command(template: &str, values: &[(&str, &str)]) -> String {
  values.iter().fold(template.to_string(), |acc, (name, value)| {
    acc.replace(&format!("{{{}}}", name), &shell_quote(value))
  })
}
