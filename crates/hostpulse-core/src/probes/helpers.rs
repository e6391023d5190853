//! Shared helpers used by multiple probe implementations.
//!
//! Command-backed probes funnel through [`run_command`], which bounds the
//! child's lifetime with a per-call timeout. File-backed probes use the
//! small `/proc`-style read helpers below.

use std::io::Read;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

/// Poll interval while waiting for a child process to exit.
const WAIT_POLL: Duration = Duration::from_millis(5);

/// Check if a command exists by running `which`.
pub fn command_exists(name: &str) -> bool {
    std::process::Command::new("which")
        .arg(name)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Run a subprocess command and return its stdout as a `String`.
///
/// Returns `None` if the command cannot be spawned, exits non-zero, produces
/// no output, or is still running when `timeout` expires (the child is
/// killed in that case). Stdout is drained on a separate thread so a chatty
/// child cannot fill the pipe and stall the exit poll.
pub fn run_command(program: &str, args: &[&str], timeout: Duration) -> Option<String> {
    let mut child = std::process::Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .ok()?;

    let mut stdout = child.stdout.take()?;
    let reader = std::thread::spawn(move || {
        let mut out = Vec::new();
        let _ = stdout.read_to_end(&mut out);
        out
    });

    let start = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                if !status.success() {
                    return None;
                }
                let out = reader.join().unwrap_or_default();
                let s = String::from_utf8_lossy(&out).into_owned();
                return if s.trim().is_empty() { None } else { Some(s) };
            }
            Ok(None) => {
                if start.elapsed() >= timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return None;
                }
                std::thread::sleep(WAIT_POLL);
            }
            Err(_) => return None,
        }
    }
}

/// Read a pseudo-file and return its trimmed contents, if non-empty.
pub fn read_trimmed(path: &Path) -> Option<String> {
    let raw = std::fs::read_to_string(path).ok()?;
    let v = raw.trim();
    if v.is_empty() { None } else { Some(v.to_string()) }
}

/// Read a pseudo-file holding a single integer counter.
pub fn read_u64(path: &Path) -> Option<u64> {
    read_trimmed(path)?.parse().ok()
}

/// Parse the first whitespace-separated token of `s` as an `f64`.
pub fn first_f64(s: &str) -> Option<f64> {
    s.split_whitespace().next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: Duration = Duration::from_secs(2);

    // -----------------------------------------------------------------------
    // run_command tests
    // -----------------------------------------------------------------------

    #[test]
    fn run_command_echo() {
        let out = run_command("echo", &["hello"], T);
        assert!(out.is_some());
        assert_eq!(out.unwrap().trim(), "hello");
    }

    #[test]
    fn run_command_nonexistent() {
        assert!(run_command("/nonexistent/binary", &[], T).is_none());
    }

    #[test]
    fn run_command_failing_status() {
        // `false` always exits with status 1
        assert!(run_command("false", &[], T).is_none());
    }

    #[test]
    fn run_command_empty_output() {
        // `true` exits 0 with no output; empty stdout counts as absent
        assert!(run_command("true", &[], T).is_none());
    }

    #[test]
    fn run_command_times_out() {
        let start = Instant::now();
        let out = run_command("sleep", &["5"], Duration::from_millis(100));
        assert!(out.is_none());
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn run_command_large_output_does_not_stall() {
        // Well past the 64 KiB pipe buffer; the drain thread must keep up.
        let out = run_command("sh", &["-c", "yes x | head -c 300000"], T);
        assert!(out.is_some());
        assert!(out.unwrap().len() >= 300_000);
    }

    #[test]
    fn command_exists_true() {
        assert!(command_exists("echo"));
    }

    #[test]
    fn command_exists_false() {
        assert!(!command_exists("nonexistent_binary_xyz_12345"));
    }

    // -----------------------------------------------------------------------
    // file/parse helper tests
    // -----------------------------------------------------------------------

    #[test]
    fn read_trimmed_and_u64() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("value");
        std::fs::write(&p, "  42\n").unwrap();
        assert_eq!(read_trimmed(&p).as_deref(), Some("42"));
        assert_eq!(read_u64(&p), Some(42));
    }

    #[test]
    fn read_trimmed_empty_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("empty");
        std::fs::write(&p, "\n").unwrap();
        assert!(read_trimmed(&p).is_none());
        assert!(read_u64(&p).is_none());
    }

    #[test]
    fn read_missing_is_none() {
        assert!(read_trimmed(Path::new("/nonexistent/pseudo/file")).is_none());
    }

    #[test]
    fn first_f64_parses_leading_token() {
        assert_eq!(first_f64("3.50 GHz"), Some(3.50));
        assert!(first_f64("").is_none());
        assert!(first_f64("n/a 12").is_none());
    }
}
