// Side effects triggered from the dashboard: browser tabs and clipboard
use anyhow::{Context, Result};

/// Open one provider page in the system browser.
pub fn open_in_browser(url: &str) -> Result<()> {
    if url.trim().is_empty() {
        anyhow::bail!("Provider has no website to open");
    }
    open::that(url).with_context(|| format!("Failed to open {}", url))?;
    tracing::info!(url, "opened provider site");
    Ok(())
}

/// Open every URL, continuing past failures. Returns how many opened.
pub fn open_all<S: AsRef<str>>(urls: &[S]) -> usize {
    let mut opened = 0;
    for url in urls {
        match open_in_browser(url.as_ref()) {
            Ok(()) => opened += 1,
            Err(e) => tracing::warn!(error = %e, "skipping site"),
        }
    }
    opened
}

/// Put a URL on the system clipboard.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new().context("Clipboard unavailable")?;
    clipboard
        .set_text(text.to_string())
        .context("Failed to copy to clipboard")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_rejects_blank_url() {
        assert!(open_in_browser("").is_err());
        assert!(open_in_browser("   ").is_err());
    }

    #[test]
    fn test_open_all_skips_blank_urls() {
        let urls: Vec<String> = vec!["".to_string(), " ".to_string()];
        assert_eq!(open_all(&urls), 0);
    }
}
