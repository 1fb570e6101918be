// Error types for staxing

use thiserror::Error;

/// Result type alias for staxing operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when driving the Tutor UI
#[derive(Debug, Error)]
pub enum Error {
    /// Underlying WebDriver failure (element not found, timeout, session lost)
    ///
    /// Raised by the `thirtyfour` client and passed through unchanged.
    #[error("WebDriver error: {0}")]
    WebDriver(#[from] thirtyfour::error::WebDriverError),

    /// Remote (Sauce Labs) sessions need an account
    #[error("A Sauce Labs user is required for remote testing")]
    SauceUserRequired,

    /// Login flow failed
    #[error("Login failed: {0}")]
    Login(String),

    /// The browser landed somewhere other than an OpenStax page
    #[error("Not an OpenStax URL: {0}")]
    NotOpenStaxUrl(String),

    /// Site URL could not be normalized to https
    #[error("Invalid site URL: {0}")]
    InvalidSite(String),

    /// Window dimension query for anything but width/height
    #[error("Unknown dimension: {0}")]
    UnknownDimension(String),

    /// Implicit wait must be at least one second
    #[error("Wait time must be 1 or higher")]
    InvalidWaitTime,

    /// A required credential or server variable is not set
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Date string did not match the expected `MM/DD/YYYY` format
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Unsupported CSS pseudo-element selector
    #[error("Invalid pseudo-element: {0}")]
    InvalidPseudoElement(String),

    /// Section identifier was not `ch<N>` or `<N>.<M>`
    #[error("Invalid section identifier: {0}")]
    InvalidSection(String),

    /// Period map supplied both `all` and named periods
    ///
    /// The collective panel and individual period rows are mutually
    /// exclusive in the UI, so a schedule cannot carry both.
    #[error("Period schedule mixes 'all' with named periods")]
    PeriodConflict,

    /// Requested section is absent from the scraped exercise list
    #[error("Section not present in the exercise list: {0}")]
    UnknownSection(String),

    /// A field required by the assignment kind was not supplied
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Workflow exists in the dispatch table but was never scripted
    ///
    /// The operation is part of the surface so suites get a typed signal
    /// instead of a missing method.
    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),
}
