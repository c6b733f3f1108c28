//! Controlling-flag extraction for token streams routed through the
//! wrapper launcher.
//!
//! When an embedded caller hands the engine a full command line whose zeroth
//! token is the launcher itself (`stagepipe`, in any path spelling), the
//! launcher token is discarded and the leading run of `--`-prefixed tokens is
//! consumed as pipeline-global flags before any stage sees the stream.
//! Unrecognized `--` flags in that leading run are silently consumed rather
//! than rejected; the launcher stays permissive so stage vocabularies can
//! grow without breaking old wrappers.
//!
//! The standalone binary does not go through this path; it parses its own
//! interface with clap in [`crate::cli`].

use std::path::Path;

/// Name the wrapper launcher is invoked as.
pub const LAUNCHER_NAME: &str = "stagepipe";

/// Pipeline-global flags recovered from the leading `--` run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlFlags {
    /// Auto-wiring stays on unless `--no-auto` was given.
    pub auto_pipe: bool,
    /// `--quiet` suppresses informational log output for the run.
    pub quiet: bool,
    /// `--help` requests the usage string and halts before execution.
    pub help: bool,
}

impl Default for ControlFlags {
    fn default() -> Self {
        Self {
            auto_pipe: true,
            quiet: false,
            help: false,
        }
    }
}

/// True when a zeroth token names the launcher, in any path spelling
/// (`stagepipe`, `./stagepipe`, `/usr/local/bin/stagepipe`).
fn is_launcher_token(token: &str) -> bool {
    Path::new(token)
        .file_stem()
        .map(|stem| stem == LAUNCHER_NAME)
        .unwrap_or(false)
}

/// Strip and interpret launcher-level flags from a raw token stream.
///
/// Applies only when the zeroth token names the launcher; otherwise the
/// stream is returned untouched with default flags. When it does apply, the
/// launcher token is discarded and every subsequent `--` token up to the
/// first non-`--` token is removed and interpreted.
pub fn extract_control_flags(tokens: &[String]) -> (ControlFlags, Vec<String>) {
    let mut flags = ControlFlags::default();
    if tokens.first().map(|t| is_launcher_token(t)) != Some(true) {
        return (flags, tokens.to_vec());
    }

    let mut rest = &tokens[1..];
    while let Some(token) = rest.first() {
        if !token.starts_with("--") {
            break;
        }
        match token.as_str() {
            "--help" => flags.help = true,
            "--no-auto" => flags.auto_pipe = false,
            "--quiet" => flags.quiet = true,
            other => {
                log::debug!("ignoring unrecognized launcher flag {other}");
            }
        }
        rest = &rest[1..];
    }
    (flags, rest.to_vec())
}

/// Fixed usage string printed for `--help`.
pub fn usage() -> String {
    format!(
        "usage: {LAUNCHER_NAME} [--help] [--no-auto] [--quiet] \
         stage [-option value ...] [--pipe stage [-option value ...]] ...\n\
         Pipe a value explicitly with -option @[stage[-id]].option, or \
         cancel a wire with -option None."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_not_launcher_passthrough() {
        let tokens = toks(&["textreader", "--quiet", "-ifile", "a"]);
        let (flags, rest) = extract_control_flags(&tokens);
        assert_eq!(flags, ControlFlags::default());
        assert_eq!(rest, tokens);
    }

    #[test]
    fn test_flags_stripped_up_to_first_plain_token() {
        let tokens = toks(&[
            "stagepipe", "--quiet", "--no-auto", "textreader", "--pipe", "printer",
        ]);
        let (flags, rest) = extract_control_flags(&tokens);
        assert!(flags.quiet);
        assert!(!flags.auto_pipe);
        assert!(!flags.help);
        assert_eq!(rest, toks(&["textreader", "--pipe", "printer"]));
    }

    #[test]
    fn test_unknown_leading_flags_silently_consumed() {
        let tokens = toks(&["stagepipe", "--future-flag", "textreader"]);
        let (flags, rest) = extract_control_flags(&tokens);
        assert_eq!(flags, ControlFlags::default());
        assert_eq!(rest, toks(&["textreader"]));
    }

    #[test]
    fn test_double_dash_after_first_stage_untouched() {
        // --pipe is a stage separator, not a launcher flag: extraction stops
        // at the first non-double-dash token.
        let tokens = toks(&["stagepipe", "textreader", "--pipe", "printer"]);
        let (_, rest) = extract_control_flags(&tokens);
        assert_eq!(rest, toks(&["textreader", "--pipe", "printer"]));
    }

    #[test]
    fn test_launcher_recognized_by_path_spelling() {
        let tokens = toks(&["/usr/local/bin/stagepipe", "--help"]);
        let (flags, rest) = extract_control_flags(&tokens);
        assert!(flags.help);
        assert!(rest.is_empty());
    }

    #[test]
    fn test_usage_mentions_core_flags() {
        let text = usage();
        assert!(text.contains("--no-auto"));
        assert!(text.contains("--pipe"));
    }
}
