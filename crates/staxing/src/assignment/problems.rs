// Homework problem selection: per-section rules, the Tutor-selections
// spinner, and the exercise picker UI

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thirtyfour::prelude::*;
use tracing::{debug, warn};

use crate::assignment::sections::{select_sections, Section};
use crate::error::{Error, Result};
use crate::POLL_INTERVAL;

/// How to pick exercises from one chapter or section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProblemSelector {
    /// Exact exercise IDs, taken from whichever section offers them
    Ids(Vec<String>),
    /// Every exercise the section offers
    All,
    /// The first N exercises in display order
    First(usize),
    /// An inclusive random count between `min` and `max`
    Random { min: usize, max: usize },
}

/// Problem selection for a homework: one rule per chapter/section, plus
/// the Tutor-selected count.
///
/// The Tutor-selected count is its own field rather than a sentinel key in
/// the section map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemSet {
    #[serde(default)]
    pub sections: BTreeMap<Section, ProblemSelector>,
    /// Tutor-selected problem count (the platform accepts 2 through 4)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tutor: Option<u8>,
}

impl ProblemSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a selection rule for one chapter/section
    pub fn with_section(mut self, section: Section, selector: ProblemSelector) -> Self {
        self.sections.insert(section, selector);
        self
    }

    /// Set the Tutor-selected problem count
    pub fn with_tutor(mut self, count: u8) -> Self {
        self.tutor = Some(count);
        self
    }

    /// Sections the picker has to open before exercises become visible
    pub fn section_list(&self) -> Vec<Section> {
        self.sections.keys().copied().collect()
    }
}

/// Exercises available per section, as scraped from the picker
pub(crate) type AvailableExercises = BTreeMap<Section, Vec<String>>;

/// Pool of candidate exercises for one rule key: a chapter key pools every
/// matching section, an exact key looks itself up.
fn section_pool(available: &AvailableExercises, section: &Section) -> Result<Vec<String>> {
    match section {
        Section::Chapter(chapter) => Ok(available
            .iter()
            .filter(|(candidate, _)| candidate.chapter() == *chapter)
            .flat_map(|(_, exercises)| exercises.iter().cloned())
            .collect()),
        exact => available
            .get(exact)
            .cloned()
            .ok_or_else(|| Error::UnknownSection(exact.to_string())),
    }
}

/// Resolve a problem set against the scraped exercise list.
///
/// Rules are evaluated independently per key; the combined picks are
/// deduplicated once at the end because the picker cannot select an
/// exercise twice. Any reduction is logged rather than silent.
pub(crate) fn resolve_selections(
    available: &AvailableExercises,
    set: &ProblemSet,
    rng: &mut impl Rng,
) -> Result<Vec<String>> {
    let mut using = Vec::new();
    for (section, selector) in &set.sections {
        match selector {
            ProblemSelector::Ids(ids) => {
                debug!(%section, count = ids.len(), "adding custom exercises if available");
                for id in ids {
                    if available.values().any(|pool| pool.contains(id)) {
                        using.push(id.clone());
                    } else {
                        warn!(%id, "requested exercise is not in the picker");
                    }
                }
            }
            ProblemSelector::All => {
                debug!(%section, "selecting all");
                using.extend(section_pool(available, section)?);
            }
            ProblemSelector::First(count) => {
                let mut pool = section_pool(available, section)?;
                if *count > pool.len() {
                    warn!(%section, requested = count, available = pool.len(),
                        "fewer exercises available than requested");
                }
                pool.truncate(*count);
                using.extend(pool);
            }
            ProblemSelector::Random { min, max } => {
                let pool = section_pool(available, section)?;
                let mut count = rng.gen_range(*min..=*max);
                debug!(%section, count, low = min, high = max, "selecting random");
                if count > pool.len() {
                    warn!(%section, requested = count, available = pool.len(),
                        "fewer exercises available than requested");
                    count = pool.len();
                }
                using.extend(pool.choose_multiple(rng, count).cloned());
            }
        }
    }
    let requested = using.len();
    let mut seen = BTreeSet::new();
    let selected: Vec<String> = using
        .into_iter()
        .filter(|exercise| seen.insert(exercise.clone()))
        .collect();
    if selected.len() < requested {
        warn!(
            requested,
            selected = selected.len(),
            "duplicate picks across section rules were deduplicated"
        );
    }
    Ok(selected)
}

/// Scrape the picker's exercise list into a per-section map.
///
/// Rows are either a section header (carrying a `chapter-section` span) or
/// one or two exercise cards whose `@`-handle span names the exercise.
pub(crate) async fn find_available_exercises(driver: &WebDriver) -> Result<AvailableExercises> {
    // Let the lazy list finish loading when an indicator is up.
    let loading = driver
        .query(By::XPath(r#"//span[text()="Loading..."]"#))
        .wait(Duration::from_secs(5), POLL_INTERVAL)
        .first()
        .await;
    if let Ok(loading) = loading {
        if let Err(err) = loading
            .wait_until()
            .wait(Duration::from_secs(5), POLL_INTERVAL)
            .stale()
            .await
        {
            debug!(%err, "loading indicator never went stale");
        }
    }

    let mut available = AvailableExercises::new();
    let mut current: Option<Section> = None;
    let rows = driver
        .find_all(By::XPath(
            r#"//div[contains(@class,"add-exercise-list")]/*[@class="row"]"#,
        ))
        .await?;
    for row in rows {
        let children = row.find_all(By::XPath("./*")).await?;
        if children.is_empty() {
            continue;
        }
        if children.len() == 1 {
            if let Ok(header) = children[0]
                .find(By::XPath(r#".//span[@class="chapter-section"]"#))
                .await
            {
                let section: Section = header.text().await?.trim().parse()?;
                available.entry(section).or_default();
                current = Some(section);
                continue;
            }
        }
        for card in &children {
            let Ok(handle) = card
                .find(By::XPath(r#".//span[contains(text(),"@")]"#))
                .await
            else {
                continue;
            };
            let text = handle.text().await?;
            let Some(exercise) = text.split_whitespace().nth(1) else {
                continue;
            };
            match current {
                Some(section) => available
                    .entry(section)
                    .or_default()
                    .push(exercise.to_string()),
                None => warn!(%exercise, "exercise listed before any section header"),
            }
        }
    }
    Ok(available)
}

/// Drive the Tutor-selections spinner to the requested count
pub(crate) async fn set_tutor_selections(driver: &WebDriver, count: u8) -> Result<()> {
    let current = driver
        .find(By::XPath(r#"//div[@class="tutor-selections"]//h2"#))
        .await?
        .text()
        .await?;
    let current: i32 = current
        .trim()
        .parse()
        .map_err(|_| Error::InvalidArgument(format!("unreadable Tutor selection count: {current}")))?;
    let mut change = i32::from(count) - current;
    if change == 0 {
        return Ok(());
    }
    debug!(current, target = count, "adjusting Tutor selections");
    let increase = driver
        .find(By::XPath(
            r#"//div[@class="tutor-selections"]//button[contains(@class,"-move-exercise-down")]"#,
        ))
        .await?;
    let decrease = driver
        .find(By::XPath(
            r#"//div[@class="tutor-selections"]//button[contains(@class,"-move-exercise-up")]"#,
        ))
        .await?;
    while change < 0 {
        change += 1;
        increase.click().await?;
    }
    while change > 0 {
        change -= 1;
        decrease.click().await?;
    }
    Ok(())
}

/// Add assessments to a homework: open the picker, select the sections,
/// resolve the rules against what is offered, and click each exercise.
///
/// With `stop_before_exercises` set, the picker is left open on the
/// exercise list with nothing selected.
pub(crate) async fn add_homework_problems(
    driver: &WebDriver,
    set: &ProblemSet,
    stop_before_exercises: bool,
) -> Result<()> {
    driver.find(By::Id("problems-select")).await?.click().await?;
    let header = driver
        .query(By::XPath(r#"//span[text()="Add Problems"]"#))
        .first()
        .await?;
    header.wait_until().displayed().await?;

    select_sections(driver, &set.section_list()).await?;
    driver
        .execute("window.scrollTo(0, document.body.scrollHeight);", vec![])
        .await?;
    driver
        .find(By::XPath(r#"//button[contains(@class,"-show-problems")]"#))
        .await?
        .click()
        .await?;
    if stop_before_exercises {
        return Ok(());
    }

    let available = find_available_exercises(driver).await?;
    if let Some(count) = set.tutor {
        set_tutor_selections(driver, count).await?;
    }
    let selected = resolve_selections(&available, set, &mut rand::thread_rng())?;

    for exercise in &selected {
        tokio::time::sleep(Duration::from_millis(500)).await;
        let card = driver
            .find(By::XPath(format!(
                r#"//span[contains(@data-reactid,"{exercise}")]"#
            )))
            .await?;
        // Offset past the sticky header before clicking.
        driver
            .action_chain()
            .move_to_element_center(&card)
            .move_by_offset(0, -80)
            .click()
            .perform()
            .await?;
    }

    let footer = driver
        .find(By::XPath(r#"//span[text()="Tutor Selections"]"#))
        .await?;
    driver
        .action_chain()
        .move_to_element_center(&footer)
        .move_by_offset(0, -80)
        .perform()
        .await?;
    let next = driver
        .query(By::XPath(r#"//*[text()="Next"]"#))
        .first()
        .await?;
    next.wait_until().displayed().await?;
    next.click().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sec(raw: &str) -> Section {
        raw.parse().unwrap()
    }

    fn fixture() -> AvailableExercises {
        let mut available = AvailableExercises::new();
        available.insert(
            sec("1.1"),
            vec!["ex-1".into(), "ex-2".into(), "ex-3".into()],
        );
        available.insert(sec("1.2"), vec!["ex-4".into(), "ex-5".into()]);
        available.insert(sec("2.1"), vec!["ex-6".into()]);
        available
    }

    #[test]
    fn all_rule_takes_the_whole_section() {
        let set = ProblemSet::new().with_section(sec("1.2"), ProblemSelector::All);
        let mut rng = StdRng::seed_from_u64(7);
        let picked = resolve_selections(&fixture(), &set, &mut rng).unwrap();
        assert_eq!(picked, vec!["ex-4".to_string(), "ex-5".to_string()]);
    }

    #[test]
    fn chapter_key_pools_every_matching_section() {
        let set = ProblemSet::new().with_section(sec("ch1"), ProblemSelector::All);
        let mut rng = StdRng::seed_from_u64(7);
        let picked = resolve_selections(&fixture(), &set, &mut rng).unwrap();
        assert_eq!(picked.len(), 5);
        assert!(!picked.contains(&"ex-6".to_string()));
    }

    #[test]
    fn first_rule_respects_display_order_and_truncates() {
        let set = ProblemSet::new().with_section(sec("1.1"), ProblemSelector::First(2));
        let mut rng = StdRng::seed_from_u64(7);
        let picked = resolve_selections(&fixture(), &set, &mut rng).unwrap();
        assert_eq!(picked, vec!["ex-1".to_string(), "ex-2".to_string()]);

        // Requesting more than the pool holds under-selects.
        let set = ProblemSet::new().with_section(sec("2.1"), ProblemSelector::First(4));
        let picked = resolve_selections(&fixture(), &set, &mut rng).unwrap();
        assert_eq!(picked, vec!["ex-6".to_string()]);
    }

    #[test]
    fn random_rule_stays_inside_the_inclusive_range() {
        let set = ProblemSet::new()
            .with_section(sec("1.1"), ProblemSelector::Random { min: 1, max: 3 });
        for seed in 0..32 {
            let mut rng = StdRng::seed_from_u64(seed);
            let picked = resolve_selections(&fixture(), &set, &mut rng).unwrap();
            assert!((1..=3).contains(&picked.len()), "picked {picked:?}");
            let unique: BTreeSet<_> = picked.iter().collect();
            assert_eq!(unique.len(), picked.len(), "sampled with replacement");
        }
    }

    #[test]
    fn exact_ids_are_matched_across_sections() {
        let set = ProblemSet::new().with_section(
            sec("1.1"),
            ProblemSelector::Ids(vec!["ex-6".into(), "ex-2".into(), "ex-404".into()]),
        );
        let mut rng = StdRng::seed_from_u64(7);
        let picked = resolve_selections(&fixture(), &set, &mut rng).unwrap();
        assert_eq!(picked, vec!["ex-6".to_string(), "ex-2".to_string()]);
    }

    #[test]
    fn overlapping_rules_are_deduplicated() {
        let set = ProblemSet::new()
            .with_section(sec("1.1"), ProblemSelector::All)
            .with_section(sec("ch1"), ProblemSelector::Ids(vec!["ex-1".into()]));
        let mut rng = StdRng::seed_from_u64(7);
        let picked = resolve_selections(&fixture(), &set, &mut rng).unwrap();
        let unique: BTreeSet<_> = picked.iter().collect();
        assert_eq!(unique.len(), picked.len());
        assert!(picked.contains(&"ex-1".to_string()));
    }

    #[test]
    fn unknown_section_is_an_error() {
        let set = ProblemSet::new().with_section(sec("9.9"), ProblemSelector::All);
        let mut rng = StdRng::seed_from_u64(7);
        assert!(matches!(
            resolve_selections(&fixture(), &set, &mut rng),
            Err(Error::UnknownSection(_))
        ));
    }

    #[test]
    fn problem_set_serde_round_trips() {
        let set = ProblemSet::new()
            .with_section(sec("1.1"), ProblemSelector::Random { min: 2, max: 4 })
            .with_tutor(3);
        let json = serde_json::to_string(&set).unwrap();
        let back: ProblemSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }
}
