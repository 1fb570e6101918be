// Book section identifiers and the chapter/section selection UI

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thirtyfour::prelude::*;
use tracing::debug;

use crate::error::{Error, Result};

/// A chapter or chapter.section reference within the course book.
///
/// Rendered as `ch<N>` for whole chapters and `<N>.<M>` for individual
/// sections, matching the identifiers the Tutor UI exposes in
/// `data-chapter-section` attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Section {
    /// An entire chapter (`ch5`)
    Chapter(u32),
    /// A single section (`5.2`)
    Numbered { chapter: u32, section: u32 },
}

impl Section {
    /// Chapter number regardless of form
    pub fn chapter(&self) -> u32 {
        match self {
            Section::Chapter(chapter) => *chapter,
            Section::Numbered { chapter, .. } => *chapter,
        }
    }

    /// Whether this covers a whole chapter
    pub fn is_chapter(&self) -> bool {
        matches!(self, Section::Chapter(_))
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Chapter(chapter) => write!(f, "ch{chapter}"),
            Section::Numbered { chapter, section } => write!(f, "{chapter}.{section}"),
        }
    }
}

impl FromStr for Section {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if let Some(chapter) = s.strip_prefix("ch") {
            let chapter = chapter
                .parse()
                .map_err(|_| Error::InvalidSection(s.to_string()))?;
            return Ok(Section::Chapter(chapter));
        }
        let (chapter, section) = s
            .split_once('.')
            .ok_or_else(|| Error::InvalidSection(s.to_string()))?;
        let chapter = chapter
            .parse()
            .map_err(|_| Error::InvalidSection(s.to_string()))?;
        let section = section
            .parse()
            .map_err(|_| Error::InvalidSection(s.to_string()))?;
        Ok(Section::Numbered { chapter, section })
    }
}

impl TryFrom<String> for Section {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Section> for String {
    fn from(value: Section) -> Self {
        value.to_string()
    }
}

/// Open the reading chapter list if it is collapsed
pub(crate) async fn open_chapter_list(driver: &WebDriver, chapter: u32) -> Result<()> {
    let toggle = driver
        .find(By::XPath(format!(
            r#"//h2[contains(@data-chapter-section,"{chapter}")]/a"#
        )))
        .await?;
    if toggle.attr("aria-expanded").await?.as_deref() == Some("false") {
        toggle.click().await?;
    }
    Ok(())
}

/// Select the given chapters and sections in the open picker
pub(crate) async fn select_sections(driver: &WebDriver, sections: &[Section]) -> Result<()> {
    for section in sections {
        match section {
            Section::Chapter(chapter) => {
                debug!(%section, "adding chapter");
                let checkbox = driver
                    .find(By::XPath(format!(
                        r#"//h2[@data-chapter-section="{chapter}"]//i[contains(@class,"tutor-icon")]"#
                    )))
                    .await?;
                tokio::time::sleep(Duration::from_millis(500)).await;
                if !checkbox.is_selected().await? {
                    checkbox.click().await?;
                }
            }
            Section::Numbered { chapter, .. } => {
                debug!(%section, "adding section");
                open_chapter_list(driver, *chapter).await?;
                tokio::time::sleep(Duration::from_millis(500)).await;
                let checkbox = driver
                    .query(By::XPath(format!(
                        r#"//span[contains(@data-chapter-section,"{section}") and text()="{section}"]/preceding-sibling::span/input"#
                    )))
                    .first()
                    .await?;
                checkbox.wait_until().displayed().await?;
                if !checkbox.is_selected().await? {
                    checkbox.click().await?;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_chapter_and_section_forms() {
        assert_eq!("ch5".parse::<Section>().unwrap(), Section::Chapter(5));
        assert_eq!(
            "5.2".parse::<Section>().unwrap(),
            Section::Numbered {
                chapter: 5,
                section: 2
            }
        );
    }

    #[test]
    fn rejects_malformed_identifiers() {
        assert!("chapter5".parse::<Section>().is_err());
        assert!("5".parse::<Section>().is_err());
        assert!("5.x".parse::<Section>().is_err());
        assert!("".parse::<Section>().is_err());
    }

    #[test]
    fn display_round_trips() {
        for raw in ["ch12", "1.1", "10.42"] {
            let section: Section = raw.parse().unwrap();
            assert_eq!(section.to_string(), raw);
        }
    }

    #[test]
    fn chapter_accessor_covers_both_forms() {
        assert_eq!("ch3".parse::<Section>().unwrap().chapter(), 3);
        assert_eq!("3.9".parse::<Section>().unwrap().chapter(), 3);
        assert!("ch3".parse::<Section>().unwrap().is_chapter());
        assert!(!"3.9".parse::<Section>().unwrap().is_chapter());
    }

    #[test]
    fn serde_uses_the_string_form() {
        let section: Section = "2.4".parse().unwrap();
        let json = serde_json::to_string(&section).unwrap();
        assert_eq!(json, "\"2.4\"");
        let back: Section = serde_json::from_str(&json).unwrap();
        assert_eq!(back, section);
    }
}
