//! Selenium helpers for OpenStax Tutor, Accounts, and Exercises testing.
//!
//! The crate wraps a [`thirtyfour`] WebDriver session in a [`Helper`] and
//! layers role-specific surfaces on top: [`Teacher`], [`Student`],
//! [`Admin`], and [`ContentQa`]. Teachers get the full
//! [`Assignment`](assignment::Assignment) workflow for building readings,
//! homeworks, externals, and events against a course calendar.
//!
//! ```ignore
//! use staxing::{AssignmentKind, AssignmentSpec, DateRange, DateSpec,
//!     HelperOptions, PeriodSchedule, Teacher};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut teacher = Teacher::from_env(HelperOptions::default()).await?;
//!     teacher.login().await?;
//!     teacher.goto_calendar().await?;
//!
//!     let window = DateRange::new(
//!         DateSpec::from_mdy("9/12/2026")?,
//!         DateSpec::from_mdy("9/19/2026")?,
//!     );
//!     let spec = AssignmentSpec::new("Chapter 5 reading", PeriodSchedule::All(window))
//!         .readings(vec!["5.1".parse()?, "5.2".parse()?]);
//!     teacher.add_assignment(AssignmentKind::Reading, &spec).await?;
//!     Ok(())
//! }
//! ```

use std::time::Duration;

pub mod assignment;
pub mod browser;
pub mod error;
pub mod helper;
pub mod page_load;
pub mod roles;
pub mod user;

pub use assignment::{
    Assignment, AssignmentKind, AssignmentSpec, BreakPoint, DateRange, DateSpec, Feedback,
    PeriodSchedule, ProblemSelector, ProblemSet, Section, Status, ALL_PERIODS,
};
pub use browser::{BrowserKind, HelperOptions, HelperOptionsBuilder, SauceUser};
pub use error::{Error, Result};
pub use helper::{Helper, WindowSize};
pub use page_load::{wait_for_loading_staleness, PageLoad, PSEUDO_ELEMENTS};
pub use roles::{Admin, ContentQa, Student, Teacher};
pub use user::{normalize_site, CourseSelector, Credentials, User};

/// Viewport width at or below which the site collapses its navbar
pub const CONDENSED_WIDTH: u32 = 767;

/// Default wait applied to element queries and page-load staleness
pub const DEFAULT_WAIT_TIME: Duration = Duration::from_secs(15);

/// Poll interval shared by every element-query wait
pub(crate) const POLL_INTERVAL: Duration = Duration::from_millis(100);
