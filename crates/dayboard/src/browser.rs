//! Hand a URL to the platform's opener.

use anyhow::{Context, Result, bail};
use std::process::Stdio;
use tokio::process::Command;

/// Program and leading arguments that open a URL on this platform
pub fn opener() -> (&'static str, &'static [&'static str]) {
    if cfg!(target_os = "macos") {
        ("open", &[])
    } else if cfg!(target_os = "windows") {
        ("cmd", &["/C", "start", ""])
    } else {
        ("xdg-open", &[])
    }
}

/// Launch the opener for `url` without waiting for it to exit
pub fn open(url: &str) -> Result<()> {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        bail!("refusing to open non-http link {url:?}");
    }
    let (program, args) = opener();
    Command::new(program)
        .args(args)
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("failed to launch {program}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opener_is_known_program() {
        let (program, _) = opener();
        assert!(["open", "cmd", "xdg-open"].contains(&program));
    }

    #[tokio::test]
    async fn test_open_rejects_non_http() {
        let err = open("file:///etc/passwd").unwrap_err();
        assert!(err.to_string().contains("non-http"));
    }
}
