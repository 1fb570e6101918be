//! Assignment creation, modification, and removal for Tutor courses.
//!
//! An [`AssignmentSpec`] describes one reading, homework, external, or
//! event assignment; [`Assignment`] drives the calendar's add/edit forms
//! to realize it. Specs can stop early at a named [`BreakPoint`] so tests
//! can leave a form half filled on purpose.

mod periods;
mod problems;
mod sections;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thirtyfour::prelude::*;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::{DEFAULT_WAIT_TIME, POLL_INTERVAL};

pub use periods::{DateRange, DateSpec, PeriodSchedule, ALL_PERIODS};
pub use problems::{ProblemSelector, ProblemSet};
pub use sections::Section;

/// The four assignment families the calendar's add menu offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentKind {
    Reading,
    Homework,
    External,
    Event,
}

impl AssignmentKind {
    /// Label used in the calendar's add-assignment menu links
    fn menu_link(&self) -> &'static str {
        match self {
            AssignmentKind::Reading => "Add Reading",
            AssignmentKind::Homework => "Add Homework",
            AssignmentKind::External => "Add External Assignment",
            AssignmentKind::Event => "Add Event",
        }
    }
}

impl fmt::Display for AssignmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssignmentKind::Reading => "reading",
            AssignmentKind::Homework => "homework",
            AssignmentKind::External => "external",
            AssignmentKind::Event => "event",
        };
        f.write_str(name)
    }
}

impl FromStr for AssignmentKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "reading" => Ok(AssignmentKind::Reading),
            "homework" => Ok(AssignmentKind::Homework),
            "external" => Ok(AssignmentKind::External),
            "event" => Ok(AssignmentKind::Event),
            other => Err(Error::InvalidArgument(format!(
                "unknown assignment kind: {other}"
            ))),
        }
    }
}

/// Terminal action once the form is filled in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Publish to the selected periods
    #[default]
    Publish,
    /// Save without publishing
    Draft,
    /// Close the form, discarding changes
    Cancel,
    /// Delete an existing assignment
    Delete,
}

/// When students see homework feedback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feedback {
    /// Immediately after answering
    #[default]
    Immediate,
    /// Once the assignment is due
    AtDue,
}

impl Feedback {
    fn option_value(&self) -> &'static str {
        match self {
            Feedback::Immediate => "immediate",
            Feedback::AtDue => "due_at",
        }
    }
}

/// Points in an add/edit flow where execution can stop early, leaving the
/// form open in the state reached so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakPoint {
    /// Before the title is entered
    Title,
    /// Before the description is entered
    Description,
    /// Before periods and dates are assigned
    Period,
    /// Before sections are chosen (homework)
    SectionSelect,
    /// Before readings are chosen (reading)
    ReadingSelect,
    /// Before exercises are chosen (homework)
    ExerciseSelect,
    /// Before the URL is entered (external)
    Url,
    /// Before the publish/draft/cancel decision
    StatusSelect,
}

/// Everything needed to fill one assignment form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentSpec {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub periods: PeriodSchedule,
    /// Book sections for a reading assignment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readings: Option<Vec<Section>>,
    /// Problem selection for a homework assignment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problems: Option<ProblemSet>,
    /// Destination for an external assignment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub feedback: Feedback,
    #[serde(default)]
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub break_point: Option<BreakPoint>,
}

impl AssignmentSpec {
    pub fn new(title: impl Into<String>, periods: PeriodSchedule) -> Self {
        Self {
            title: title.into(),
            description: None,
            periods,
            readings: None,
            problems: None,
            url: None,
            feedback: Feedback::default(),
            status: Status::default(),
            break_point: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn readings(mut self, readings: Vec<Section>) -> Self {
        self.readings = Some(readings);
        self
    }

    pub fn problems(mut self, problems: ProblemSet) -> Self {
        self.problems = Some(problems);
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn feedback(mut self, feedback: Feedback) -> Self {
        self.feedback = feedback;
        self
    }

    pub fn status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    /// Stop the flow just before the named step
    pub fn stop_before(mut self, break_point: BreakPoint) -> Self {
        self.break_point = Some(break_point);
        self
    }

    fn stops_at(&self, point: BreakPoint) -> bool {
        self.break_point == Some(point)
    }
}

/// Drives the calendar's assignment forms.
#[derive(Debug, Clone)]
pub struct Assignment {
    wait_time: Duration,
}

impl Default for Assignment {
    fn default() -> Self {
        Self::new()
    }
}

impl Assignment {
    pub fn new() -> Self {
        Self {
            wait_time: DEFAULT_WAIT_TIME,
        }
    }

    pub fn with_wait_time(wait_time: Duration) -> Self {
        Self { wait_time }
    }

    /// Create and save a new assignment of the given kind
    pub async fn add(
        &self,
        driver: &WebDriver,
        kind: AssignmentKind,
        spec: &AssignmentSpec,
    ) -> Result<()> {
        info!(%kind, title = %spec.title, "adding assignment");
        self.open_assignment_menu(driver, kind).await?;
        match kind {
            AssignmentKind::Reading => self.add_reading(driver, spec).await,
            AssignmentKind::Homework => self.add_homework(driver, spec).await,
            AssignmentKind::External => self.add_external(driver, spec).await,
            AssignmentKind::Event => self.add_event(driver, spec).await,
        }
    }

    /// Modify an existing assignment
    pub async fn edit(
        &self,
        _driver: &WebDriver,
        kind: AssignmentKind,
        _spec: &AssignmentSpec,
    ) -> Result<()> {
        Err(Error::NotImplemented(match kind {
            AssignmentKind::Reading => "change_reading",
            AssignmentKind::Homework => "change_homework",
            AssignmentKind::External => "change_external",
            AssignmentKind::Event => "change_event",
        }))
    }

    /// Remove an existing assignment
    pub async fn remove(
        &self,
        _driver: &WebDriver,
        kind: AssignmentKind,
        _spec: &AssignmentSpec,
    ) -> Result<()> {
        Err(Error::NotImplemented(match kind {
            AssignmentKind::Reading => "remove_reading",
            AssignmentKind::Homework => "remove_homework",
            AssignmentKind::External => "remove_external",
            AssignmentKind::Event => "remove_event",
        }))
    }

    /// Open the calendar's add-assignment dropdown and pick a kind
    async fn open_assignment_menu(&self, driver: &WebDriver, kind: AssignmentKind) -> Result<()> {
        let menu = driver
            .query(By::XPath(
                r#"//button[contains(@class,"dropdown-toggle")]"#,
            ))
            .wait(self.wait_time, POLL_INTERVAL)
            .first()
            .await?;
        menu.wait_until()
            .wait(self.wait_time, POLL_INTERVAL)
            .clickable()
            .await?;
        menu.click().await?;
        let link = driver
            .query(By::LinkText(kind.menu_link()))
            .wait(self.wait_time, POLL_INTERVAL)
            .first()
            .await?;
        link.click().await?;
        Ok(())
    }

    async fn fill_title_and_description(
        &self,
        driver: &WebDriver,
        spec: &AssignmentSpec,
    ) -> Result<bool> {
        if spec.stops_at(BreakPoint::Title) {
            return Ok(false);
        }
        // Every assignment form reuses the reading form's title field id.
        let title = driver
            .query(By::Id("reading-title"))
            .wait(self.wait_time, POLL_INTERVAL)
            .first()
            .await?;
        title.send_keys(&spec.title).await?;

        if spec.stops_at(BreakPoint::Description) {
            return Ok(false);
        }
        if let Some(description) = &spec.description {
            driver
                .find(By::XPath(
                    r#"//div[contains(@class,"assignment-description")]//textarea"#,
                ))
                .await?
                .send_keys(description)
                .await?;
        }

        if spec.stops_at(BreakPoint::Period) {
            return Ok(false);
        }
        periods::assign_periods(driver, &spec.periods).await?;
        Ok(true)
    }

    /// Fill and save a reading assignment; the menu entry is already open
    async fn add_reading(&self, driver: &WebDriver, spec: &AssignmentSpec) -> Result<()> {
        if !self.fill_title_and_description(driver, spec).await? {
            return Ok(());
        }

        if let Some(readings) = &spec.readings {
            driver
                .find(By::Id("reading-select"))
                .await?
                .click()
                .await?;
            driver
                .query(By::XPath(r#"//div[contains(@class,"select-reading-dialog")]"#))
                .wait(self.wait_time, POLL_INTERVAL)
                .first()
                .await?;
            // Dialog open, nothing picked yet.
            if spec.stops_at(BreakPoint::SectionSelect) {
                return Ok(());
            }
            sections::select_sections(driver, readings).await?;
            // Sections chosen but not yet confirmed.
            if spec.stops_at(BreakPoint::ReadingSelect) {
                return Ok(());
            }
            driver
                .find(By::XPath(r#"//button[text()="Add Readings"]"#))
                .await?
                .click()
                .await?;
        }

        if spec.stops_at(BreakPoint::StatusSelect) {
            return Ok(());
        }
        self.select_status(driver, spec.status).await
    }

    /// Fill and save a homework assignment
    async fn add_homework(&self, driver: &WebDriver, spec: &AssignmentSpec) -> Result<()> {
        if !self.fill_title_and_description(driver, spec).await? {
            return Ok(());
        }

        if let Some(feedback) = self.feedback_select(driver).await? {
            feedback
                .find(By::XPath(format!(
                    r#".//option[@value="{}"]"#,
                    spec.feedback.option_value()
                )))
                .await?
                .click()
                .await?;
        }

        if spec.stops_at(BreakPoint::SectionSelect) {
            return Ok(());
        }
        let problems = spec
            .problems
            .as_ref()
            .ok_or_else(|| Error::InvalidArgument("homework requires a problem set".into()))?;
        let stop_before_exercises = spec.stops_at(BreakPoint::ExerciseSelect);
        problems::add_homework_problems(driver, problems, stop_before_exercises).await?;
        if stop_before_exercises {
            return Ok(());
        }

        if spec.stops_at(BreakPoint::StatusSelect) {
            return Ok(());
        }
        self.select_status(driver, spec.status).await
    }

    /// Fill and save an external assignment
    async fn add_external(&self, driver: &WebDriver, spec: &AssignmentSpec) -> Result<()> {
        if !self.fill_title_and_description(driver, spec).await? {
            return Ok(());
        }

        if spec.stops_at(BreakPoint::Url) {
            return Ok(());
        }
        let url = spec
            .url
            .as_ref()
            .ok_or_else(|| Error::InvalidArgument("external assignment requires a url".into()))?;
        driver
            .find(By::Id("external-url"))
            .await?
            .send_keys(url)
            .await?;

        if spec.stops_at(BreakPoint::StatusSelect) {
            return Ok(());
        }
        self.select_status(driver, spec.status).await
    }

    /// Fill and save a calendar event
    async fn add_event(&self, driver: &WebDriver, spec: &AssignmentSpec) -> Result<()> {
        if !self.fill_title_and_description(driver, spec).await? {
            return Ok(());
        }
        if spec.stops_at(BreakPoint::StatusSelect) {
            return Ok(());
        }
        self.select_status(driver, spec.status).await
    }

    /// The feedback dropdown is only present on homework forms
    async fn feedback_select(&self, driver: &WebDriver) -> Result<Option<WebElement>> {
        match driver.find(By::Id("feedback-select")).await {
            Ok(select) => Ok(Some(select)),
            Err(err) => {
                debug!(%err, "no feedback dropdown on this form");
                Ok(None)
            }
        }
    }

    /// Publish, save, cancel, or delete through the form footer
    async fn select_status(&self, driver: &WebDriver, status: Status) -> Result<()> {
        let footer = driver
            .find(By::XPath(r#"//div[contains(@class,"footer-buttons")]"#))
            .await?;
        scroll_to(driver, &footer).await?;
        tokio::time::sleep(Duration::from_secs(1)).await;
        match status {
            Status::Publish => {
                driver
                    .find(By::XPath(r#"//button[contains(@class,"-publish")]"#))
                    .await?
                    .click()
                    .await?;
            }
            Status::Draft => {
                driver
                    .find(By::XPath(r#"//button[contains(@class," -save")]"#))
                    .await?
                    .click()
                    .await?;
            }
            Status::Cancel => {
                driver
                    .find(By::XPath(
                        r#"//button[contains(@aria-role,"close") and @type="button"]"#,
                    ))
                    .await?
                    .click()
                    .await?;
                // The discard-changes dialog only appears when the form is
                // dirty.
                let confirm = driver
                    .query(By::XPath(r#"//button[contains(@class,"ok")]"#))
                    .wait(Duration::from_secs(3), POLL_INTERVAL)
                    .first()
                    .await;
                if let Ok(confirm) = confirm {
                    confirm.click().await?;
                }
            }
            Status::Delete => {
                driver
                    .find(By::XPath(r#"//span[contains(text(),"Delete")]/.."#))
                    .await?
                    .click()
                    .await?;
                driver
                    .query(By::XPath(r#"//button[contains(@class,"ok")]"#))
                    .wait(self.wait_time, POLL_INTERVAL)
                    .first()
                    .await?
                    .click()
                    .await?;
            }
        }
        Ok(())
    }
}

/// Scroll an element into view, then back off the sticky header
pub(crate) async fn scroll_to(driver: &WebDriver, element: &WebElement) -> Result<()> {
    driver
        .execute(
            "return arguments[0].scrollIntoView();",
            vec![element.to_json()?],
        )
        .await?;
    driver.execute("window.scrollBy(0, -80);", vec![]).await?;
    Ok(())
}

/// Type into a React-controlled input one character at a time
pub(crate) async fn send_keys_slow(element: &WebElement, text: &str) -> Result<()> {
    element.clear().await?;
    tokio::time::sleep(Duration::from_millis(500)).await;
    for ch in text.chars() {
        element.send_keys(ch.to_string()).await?;
    }
    Ok(())
}

/// A random lowercase word, handy for unique assignment titles
pub fn rword(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| char::from(rng.gen_range(b'a'..=b'z')))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule() -> PeriodSchedule {
        PeriodSchedule::All(DateRange::new(
            DateSpec::from_mdy("9/12/2026").unwrap(),
            DateSpec::from_mdy("9/19/2026").unwrap(),
        ))
    }

    #[test]
    fn kind_parses_and_displays() {
        for (raw, kind) in [
            ("reading", AssignmentKind::Reading),
            ("homework", AssignmentKind::Homework),
            ("external", AssignmentKind::External),
            ("event", AssignmentKind::Event),
        ] {
            assert_eq!(raw.parse::<AssignmentKind>().unwrap(), kind);
            assert_eq!(kind.to_string(), raw);
        }
        assert!("quiz".parse::<AssignmentKind>().is_err());
    }

    #[test]
    fn spec_builder_collects_the_optional_pieces() {
        let spec = AssignmentSpec::new("ch5 review", schedule())
            .description("covers through 5.3")
            .readings(vec!["5.1".parse().unwrap(), "5.2".parse().unwrap()])
            .feedback(Feedback::AtDue)
            .status(Status::Draft)
            .stop_before(BreakPoint::StatusSelect);
        assert_eq!(spec.title, "ch5 review");
        assert_eq!(spec.readings.as_ref().unwrap().len(), 2);
        assert_eq!(spec.feedback, Feedback::AtDue);
        assert_eq!(spec.status, Status::Draft);
        assert!(spec.stops_at(BreakPoint::StatusSelect));
        assert!(!spec.stops_at(BreakPoint::Title));
    }

    #[test]
    fn spec_serde_round_trips() {
        let spec = AssignmentSpec::new("serde check", schedule())
            .url("https://example.com/quiz")
            .status(Status::Publish);
        let json = serde_json::to_string(&spec).unwrap();
        let back: AssignmentSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, spec);
    }

    #[test]
    fn rword_is_lowercase_ascii() {
        let word = rword(12);
        assert_eq!(word.len(), 12);
        assert!(word.chars().all(|c| c.is_ascii_lowercase()));
    }
}
