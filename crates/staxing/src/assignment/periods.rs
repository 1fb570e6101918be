// Period scheduling: open/due dates per class section or for all at once
//
// The assignment form has two mutually exclusive panels: one collective
// date row ("all periods") and one row per period. The schedule type
// mirrors that split so a caller cannot ask for both.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use thirtyfour::prelude::*;
use tracing::debug;

use crate::error::{Error, Result};

/// Period map key meaning "every period at once"
pub const ALL_PERIODS: &str = "all";

/// A calendar date with an optional time-of-day entry.
///
/// Times are carried as the human-readable string typed into the form
/// (`"8:00 pm"`); [`normalize_time`] reduces them to the compact form the
/// React time input expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateSpec {
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

impl DateSpec {
    /// A date with no explicit time
    pub fn on(date: NaiveDate) -> Self {
        Self { date, time: None }
    }

    /// A date with a time-of-day entry
    pub fn at(date: NaiveDate, time: impl Into<String>) -> Self {
        Self {
            date,
            time: Some(time.into()),
        }
    }

    /// Parse a Tutor-style `MM/DD/YYYY` date
    pub fn from_mdy(date: &str) -> Result<Self> {
        Ok(Self::on(parse_mdy(date)?))
    }

    /// Parse a Tutor-style date with a time entry
    pub fn from_mdy_at(date: &str, time: impl Into<String>) -> Result<Self> {
        Ok(Self::at(parse_mdy(date)?, time))
    }
}

/// Open and due bounds for one period row (or the collective panel)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub opens: DateSpec,
    pub due: DateSpec,
}

impl DateRange {
    pub fn new(opens: DateSpec, due: DateSpec) -> Self {
        Self { opens, due }
    }
}

/// Which periods an assignment targets, and when each opens and closes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeriodSchedule {
    /// One shared window through the collective panel
    All(DateRange),
    /// Individual windows; listed periods are toggled on, every other
    /// period row is toggled off
    Periods(BTreeMap<String, DateRange>),
}

impl PeriodSchedule {
    /// Convert a string-keyed period map.
    ///
    /// A map holding only the `all` key becomes [`PeriodSchedule::All`];
    /// a map mixing `all` with named periods is rejected rather than
    /// letting panel-toggle order decide.
    pub fn try_from_map(mut map: BTreeMap<String, DateRange>) -> Result<Self> {
        match map.remove(ALL_PERIODS) {
            Some(range) if map.is_empty() => Ok(PeriodSchedule::All(range)),
            Some(_) => Err(Error::PeriodConflict),
            None => Ok(PeriodSchedule::Periods(map)),
        }
    }
}

/// Parse `MM/DD/YYYY` (single-digit month/day accepted)
pub(crate) fn parse_mdy(date: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date, "%m/%d/%Y").map_err(|_| Error::InvalidDate(date.to_string()))
}

/// Reduce a human time entry to the keystrokes the React time input
/// accepts: strip colons, spaces, and the trailing `m`.
pub(crate) fn normalize_time(time: &str) -> String {
    time.chars()
        .filter(|c| !matches!(c, ':' | ' ' | 'm'))
        .collect()
}

/// Parse the datepicker's current-month header ("September 2016")
pub(crate) fn parse_month_header(text: &str) -> Result<(i32, u32)> {
    let first = NaiveDate::parse_from_str(&format!("1 {}", text.trim()), "%d %B %Y")
        .map_err(|_| Error::InvalidDate(text.to_string()))?;
    Ok((first.year(), first.month()))
}

/// Which bound of the window a date/time input belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Open,
    Due,
}

impl Bound {
    fn class_fragment(&self) -> &'static str {
        match self {
            Bound::Open => "open",
            Bound::Due => "due",
        }
    }
}

/// Rotate the date picker to the month of `target` and leave it open
async fn adjust_date_picker(driver: &WebDriver, input: &WebElement, target: NaiveDate) -> Result<()> {
    let today = Local::now().date_naive();
    input.click().await?;
    if (today.year(), today.month()) == (target.year(), target.month()) {
        return Ok(());
    }
    let next = driver
        .find(By::ClassName("datepicker__navigation--next"))
        .await?;
    let previous = driver
        .find(By::ClassName("datepicker__navigation--previous"))
        .await?;
    loop {
        let header = driver
            .find(By::ClassName("datepicker__current-month"))
            .await?
            .text()
            .await?;
        let shown = parse_month_header(&header)?;
        let wanted = (target.year(), target.month());
        if shown == wanted {
            return Ok(());
        }
        if shown < wanted {
            next.click().await?;
        } else {
            previous.click().await?;
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
}

/// Set the date for one period/section row (or the collective panel)
async fn assign_date(
    driver: &WebDriver,
    row: Option<&WebElement>,
    spec: &DateSpec,
    bound: Bound,
) -> Result<()> {
    let path = format!(
        r#"{}//div[contains(@class,"-{}-date")]//div[contains(@class,"datepicker__input")]//input"#,
        if row.is_some() { "../.." } else { "" },
        bound.class_fragment(),
    );
    let input = match row {
        Some(row) => row.find(By::XPath(path)).await?,
        None => driver.find(By::XPath(path)).await?,
    };
    tokio::time::sleep(Duration::from_millis(150)).await;
    adjust_date_picker(driver, &input, spec.date).await?;
    driver
        .find(By::XPath(format!(
            r#"//div[contains(@class,"datepicker__day") and text()="{}"]"#,
            spec.date.day(),
        )))
        .await?
        .click()
        .await?;
    Ok(())
}

/// Set the time for one period/section row (or the collective panel)
async fn assign_time(
    driver: &WebDriver,
    row: Option<&WebElement>,
    time: &str,
    bound: Bound,
) -> Result<()> {
    let path = format!(
        r#"{}//div[contains(@class,"-{}-time")]//input"#,
        if row.is_some() { "../.." } else { "" },
        bound.class_fragment(),
    );
    let input = match row {
        Some(row) => row.find(By::XPath(path)).await?,
        None => driver.find(By::XPath(path)).await?,
    };
    super::send_keys_slow(&input, &normalize_time(time)).await?;
    Ok(())
}

/// Fill one row's date and optional time entries, due before open as the
/// form re-validates the open bound against the due bound.
async fn assign_range(driver: &WebDriver, row: Option<&WebElement>, range: &DateRange) -> Result<()> {
    assign_date(driver, row, &range.due, Bound::Due).await?;
    assign_date(driver, row, &range.opens, Bound::Open).await?;
    if let Some(time) = &range.due.time {
        assign_time(driver, row, time, Bound::Due).await?;
    }
    if let Some(time) = &range.opens.time {
        assign_time(driver, row, time, Bound::Open).await?;
    }
    Ok(())
}

/// Assign dates and times to particular periods/sections
pub(crate) async fn assign_periods(driver: &WebDriver, schedule: &PeriodSchedule) -> Result<()> {
    match schedule {
        PeriodSchedule::All(range) => {
            // Activate the collective time/date panel.
            driver.find(By::Id("hide-periods-radio")).await?.click().await?;
            assign_range(driver, None, range).await?;
        }
        PeriodSchedule::Periods(windows) => {
            // Activate the individual period time/date panel.
            driver.find(By::Id("show-periods-radio")).await?.click().await?;
            let checkboxes = driver
                .find_all(By::XPath(
                    r#"//input[contains(@id,"period-toggle-period")]"#,
                ))
                .await?;
            for checkbox in &checkboxes {
                let id = checkbox.attr("id").await?.unwrap_or_default();
                let label = driver
                    .find(By::XPath(format!(r#"//label[@for="{id}"]"#)))
                    .await?
                    .text()
                    .await?;
                debug!(period = %label, "period row");
                let checked = checkbox.attr("checked").await?.is_some();
                let Some(range) = windows.get(&label) else {
                    // Deactivate rows the schedule does not mention.
                    if checked {
                        if !checkbox.is_displayed().await? {
                            driver
                                .execute(
                                    "return arguments[0].scrollIntoView();",
                                    vec![checkbox.to_json()?],
                                )
                                .await?;
                        }
                        checkbox.click().await?;
                    }
                    continue;
                };
                if !checked {
                    checkbox.click().await?;
                }
                assign_range(driver, Some(checkbox), range).await?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(opens: &str, due: &str) -> DateRange {
        DateRange::new(
            DateSpec::from_mdy(opens).unwrap(),
            DateSpec::from_mdy(due).unwrap(),
        )
    }

    #[test]
    fn normalize_time_matches_react_input() {
        assert_eq!(normalize_time("8:00 pm"), "800p");
        assert_eq!(normalize_time("4:00 am"), "400a");
        assert_eq!(normalize_time("1000a"), "1000a");
        assert_eq!(normalize_time("12:30"), "1230");
    }

    #[test]
    fn mdy_parsing_accepts_single_digits() {
        assert_eq!(
            parse_mdy("9/5/2016").unwrap(),
            NaiveDate::from_ymd_opt(2016, 9, 5).unwrap()
        );
        assert_eq!(
            parse_mdy("10/14/2016").unwrap(),
            NaiveDate::from_ymd_opt(2016, 10, 14).unwrap()
        );
        assert!(matches!(
            parse_mdy("2016-09-05"),
            Err(Error::InvalidDate(_))
        ));
    }

    #[test]
    fn month_header_parses() {
        assert_eq!(parse_month_header("September 2016").unwrap(), (2016, 9));
        assert_eq!(parse_month_header(" January 2027 ").unwrap(), (2027, 1));
        assert!(parse_month_header("Septembruary 2016").is_err());
    }

    #[test]
    fn map_with_only_all_becomes_collective() {
        let mut map = BTreeMap::new();
        map.insert(ALL_PERIODS.to_string(), range("10/11/2016", "10/14/2016"));
        let schedule = PeriodSchedule::try_from_map(map).unwrap();
        assert!(matches!(schedule, PeriodSchedule::All(_)));
    }

    #[test]
    fn map_of_named_periods_becomes_individual() {
        let mut map = BTreeMap::new();
        map.insert("1st".to_string(), range("9/12/2016", "9/17/2016"));
        map.insert("2nd".to_string(), range("9/14/2016", "9/19/2016"));
        let schedule = PeriodSchedule::try_from_map(map).unwrap();
        match schedule {
            PeriodSchedule::Periods(windows) => assert_eq!(windows.len(), 2),
            other => panic!("expected individual windows, got {other:?}"),
        }
    }

    #[test]
    fn mixed_map_is_rejected() {
        let mut map = BTreeMap::new();
        map.insert("1st".to_string(), range("9/12/2016", "9/17/2016"));
        map.insert(ALL_PERIODS.to_string(), range("10/11/2016", "10/14/2016"));
        assert!(matches!(
            PeriodSchedule::try_from_map(map),
            Err(Error::PeriodConflict)
        ));
    }

    #[test]
    fn date_spec_serde_keeps_optional_time() {
        let spec = DateSpec::from_mdy_at("9/14/2016", "8:00 pm").unwrap();
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["time"], "8:00 pm");
        let bare = DateSpec::from_mdy("9/14/2016").unwrap();
        let json = serde_json::to_value(&bare).unwrap();
        assert!(json.get("time").is_none());
    }
}
