// Page-load settling by staleness
//
// A navigating click replaces the document, so the old page's root element
// goes stale once the new one is loading. Capture the root before the
// action, then wait for staleness afterwards.

use std::time::Duration;

use thirtyfour::prelude::*;
use tracing::debug;

use crate::error::{Error, Result};
use crate::POLL_INTERVAL;

/// Timeout for section-level loading staleness, long enough for heavy
/// book sections.
const LOADING_STALENESS_TIMEOUT: Duration = Duration::from_secs(90);

/// Pseudo-element selectors accepted by [`wait_for_loading_staleness`]
pub const PSEUDO_ELEMENTS: &[&str] = &[
    "::after",
    "::before",
    "::first-letter",
    "::first-line",
    "::selection",
    "::backdrop",
    "::placeholder",
    "::marker",
    "::spelling-error",
    "::grammar-error",
];

/// Guard over a pending page navigation.
///
/// Capture it before the navigating action, perform the action, then call
/// [`PageLoad::settled`] to block until the old document is gone.
///
/// # Example
///
/// ```ignore
/// let pending = PageLoad::watch(helper.driver(), helper.wait_time()).await?;
/// link.click().await?;
/// pending.settled().await?;
/// ```
#[derive(Debug)]
pub struct PageLoad {
    root: WebElement,
    timeout: Duration,
}

impl PageLoad {
    /// Capture the current page's root element
    pub async fn watch(driver: &WebDriver, timeout: Duration) -> Result<Self> {
        let root = driver.find(By::Tag("html")).await?;
        Ok(Self { root, timeout })
    }

    /// Wait until the captured root element goes stale
    pub async fn settled(self) -> Result<()> {
        self.root
            .wait_until()
            .wait(self.timeout, POLL_INTERVAL)
            .stale()
            .await?;
        debug!("page settled");
        Ok(())
    }
}

/// Normalize a pseudo-element selector, accepting `after`, `:after`, or
/// `::after` spellings. Unknown selectors are rejected.
pub fn normalize_pseudo(pseudo_element: &str) -> Result<&'static str> {
    let tail = pseudo_element.rsplit(':').next().unwrap_or_default();
    PSEUDO_ELEMENTS
        .iter()
        .find(|known| known[2..] == *tail)
        .copied()
        .ok_or_else(|| Error::InvalidPseudoElement(pseudo_element.to_string()))
}

/// Wait for a loading indicator rendered as a pseudo-element to go stale.
///
/// `style` is the CSS selector of the element carrying the indicator and
/// `pseudo_element` one of [`PSEUDO_ELEMENTS`] (prefix colons optional).
pub async fn wait_for_loading_staleness(
    driver: &WebDriver,
    style: &str,
    pseudo_element: &str,
) -> Result<()> {
    let pseudo = normalize_pseudo(pseudo_element)?;
    let indicator = driver.find(By::Css(format!("{style}{pseudo}"))).await?;
    indicator
        .wait_until()
        .wait(LOADING_STALENESS_TIMEOUT, POLL_INTERVAL)
        .stale()
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_accepts_all_spellings() {
        assert_eq!(normalize_pseudo("::after").unwrap(), "::after");
        assert_eq!(normalize_pseudo(":before").unwrap(), "::before");
        assert_eq!(normalize_pseudo("placeholder").unwrap(), "::placeholder");
    }

    #[test]
    fn normalize_rejects_unknown_selectors() {
        assert!(matches!(
            normalize_pseudo("::glow"),
            Err(Error::InvalidPseudoElement(_))
        ));
        assert!(normalize_pseudo("").is_err());
    }
}
