// Helper: owner of the WebDriver session
//
// Size/wait/navigation primitives shared by every role. Role types wrap
// this through `User` and reach it via `Deref`.

use std::time::Duration;

use chrono::{Duration as ChronoDuration, Local};
use thirtyfour::prelude::*;
use tracing::debug;

use crate::browser::HelperOptions;
use crate::error::{Error, Result};
use crate::page_load::PageLoad;

/// Current browser window dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

/// Primary session control type.
///
/// Owns the browser session and exposes the wait, window, and navigation
/// primitives every workflow builds on.
#[derive(Debug)]
pub struct Helper {
    driver: WebDriver,
    wait_time: Duration,
}

impl Helper {
    /// Start a new browser session from the given options
    pub async fn launch(options: HelperOptions) -> Result<Self> {
        let driver = options.connect().await?;
        driver.set_implicit_wait_timeout(options.wait_time).await?;
        if let Some((width, height)) = options.window_size {
            driver.set_window_rect(0, 0, width, height).await?;
        }
        Ok(Self {
            driver,
            wait_time: options.wait_time,
        })
    }

    /// Adopt an already-open WebDriver session
    pub async fn from_driver(driver: WebDriver, wait_time: Duration) -> Result<Self> {
        driver.set_implicit_wait_timeout(wait_time).await?;
        Ok(Self { driver, wait_time })
    }

    /// The underlying WebDriver session
    pub fn driver(&self) -> &WebDriver {
        &self.driver
    }

    /// Implicit wait currently applied to element lookups
    pub fn wait_time(&self) -> Duration {
        self.wait_time
    }

    /// Change the max action wait time. Zero-length waits are rejected.
    pub async fn change_wait_time(&mut self, new_wait: Duration) -> Result<()> {
        if new_wait.is_zero() {
            return Err(Error::InvalidWaitTime);
        }
        self.driver.set_implicit_wait_timeout(new_wait).await?;
        self.wait_time = new_wait;
        Ok(())
    }

    /// System date format for Tutor (`MM/DD/YYYY`), offset by `day_delta`
    pub fn date_string(day_delta: i64) -> String {
        Self::date_string_fmt(day_delta, "%m/%d/%Y")
    }

    /// Date offset by `day_delta`, rendered with a custom strftime format
    pub fn date_string_fmt(day_delta: i64, format: &str) -> String {
        (Local::now().date_naive() + ChronoDuration::days(day_delta))
            .format(format)
            .to_string()
    }

    /// Navigate to a URL and wait for the new page to settle
    pub async fn get(&self, url: &str) -> Result<()> {
        debug!(%url, "navigating");
        let pending = PageLoad::watch(&self.driver, self.wait_time).await?;
        self.driver.goto(url).await?;
        // A same-document navigation never invalidates the root; treat the
        // staleness timeout as settled in that case.
        if let Err(err) = pending.settled().await {
            debug!(%err, "page root never went stale after goto");
        }
        Ok(())
    }

    /// Begin watching for a page navigation triggered by the next action
    pub async fn watch_page(&self) -> Result<PageLoad> {
        PageLoad::watch(&self.driver, self.wait_time).await
    }

    /// Return the current window dimensions
    pub async fn window_size(&self) -> Result<WindowSize> {
        let rect = self.driver.get_window_rect().await?;
        Ok(WindowSize {
            width: rect.width as u32,
            height: rect.height as u32,
        })
    }

    /// Return a single window dimension by name (`width` or `height`)
    pub async fn window_dimension(&self, dimension: &str) -> Result<u32> {
        let size = self.window_size().await?;
        match dimension {
            "width" => Ok(size.width),
            "height" => Ok(size.height),
            other => Err(Error::UnknownDimension(other.to_string())),
        }
    }

    /// Attempt to change the browser window size
    pub async fn set_window_size(&self, width: u32, height: u32) -> Result<WindowSize> {
        if width >= 1 && height >= 1 {
            self.driver.set_window_rect(0, 0, width, height).await?;
            self.sleep(Duration::from_secs(1)).await;
        }
        self.window_size().await
    }

    /// Maximize the browser window
    pub async fn maximize_window(&self) -> Result<WindowSize> {
        self.driver.maximize_window().await?;
        self.window_size().await
    }

    /// Move the browser window anchor
    pub async fn set_window_position(&self, x: u32, y: u32) -> Result<()> {
        let size = self.window_size().await?;
        self.driver
            .set_window_rect(x, y, size.width, size.height)
            .await?;
        self.sleep(Duration::from_secs(1)).await;
        Ok(())
    }

    /// Stop execution for the specified time
    pub async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    /// Find a single element
    pub async fn find(&self, by: By) -> Result<WebElement> {
        Ok(self.driver.find(by).await?)
    }

    /// Find all matching elements
    pub async fn find_all(&self, by: By) -> Result<Vec<WebElement>> {
        Ok(self.driver.find_all(by).await?)
    }

    /// End the browser session
    pub async fn quit(self) -> Result<()> {
        self.driver.quit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn date_string_matches_tutor_format() {
        let today = Helper::date_string(0);
        let parsed = NaiveDate::parse_from_str(&today, "%m/%d/%Y").unwrap();
        assert_eq!(parsed, Local::now().date_naive());
    }

    #[test]
    fn date_string_applies_day_delta() {
        let tomorrow = Helper::date_string(1);
        let parsed = NaiveDate::parse_from_str(&tomorrow, "%m/%d/%Y").unwrap();
        assert_eq!(
            parsed,
            Local::now().date_naive() + ChronoDuration::days(1)
        );
    }

    #[test]
    fn date_string_honors_custom_formats() {
        let iso = Helper::date_string_fmt(0, "%Y-%m-%d");
        assert_eq!(iso, Local::now().date_naive().format("%Y-%m-%d").to_string());
    }
}
