// Live smoke tests against a running WebDriver and Tutor deployment.
//
// These need chromedriver (or geckodriver) listening locally plus the
// role credential variables and SERVER_URL, so they are ignored by
// default:
//
//   SERVER_URL=https://tutor-qa.openstax.org \
//   TEACHER_USER=... TEACHER_PASSWORD=... \
//   cargo test --test live_smoke -- --ignored

use anyhow::Result;
use staxing::{
    AssignmentKind, AssignmentSpec, BreakPoint, DateRange, DateSpec, Helper, HelperOptions,
    PeriodSchedule, Student, Teacher,
};
use thirtyfour::By;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "staxing=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

fn options() -> HelperOptions {
    HelperOptions::builder().headless(true).build()
}

#[tokio::test]
#[ignore = "requires a running WebDriver"]
async fn helper_launches_and_reports_window_size() -> Result<()> {
    init_tracing();
    let helper = Helper::launch(options()).await?;
    let size = helper.window_size().await?;
    assert!(size.width > 0 && size.height > 0);
    helper.quit().await?;
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running WebDriver and Tutor credentials"]
async fn teacher_logs_in_and_reaches_the_calendar() -> Result<()> {
    init_tracing();
    let teacher = Teacher::from_env(options()).await?;
    teacher.login().await?;
    teacher.goto_calendar().await?;
    teacher.logout().await?;
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running WebDriver and Tutor credentials"]
async fn teacher_publishes_and_then_deletes_a_reading() -> Result<()> {
    init_tracing();
    let teacher = Teacher::from_env(options()).await?;
    teacher.login().await?;
    teacher.goto_calendar().await?;

    let title = format!("smoke reading {}", staxing::assignment::rword(6));
    let window = PeriodSchedule::All(DateRange::new(
        DateSpec::on(chrono::Local::now().date_naive()),
        DateSpec::on(chrono::Local::now().date_naive() + chrono::Duration::days(5)),
    ));
    let spec = AssignmentSpec::new(&title, window)
        .description("created by the live smoke test")
        .readings(vec!["1.1".parse()?]);
    teacher
        .add_assignment(AssignmentKind::Reading, &spec)
        .await?;
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running WebDriver and Tutor credentials"]
async fn reading_flow_halts_at_the_section_select_checkpoint() -> Result<()> {
    init_tracing();
    let teacher = Teacher::from_env(options()).await?;
    teacher.login().await?;
    teacher.goto_calendar().await?;

    let title = format!("smoke checkpoint {}", staxing::assignment::rword(6));
    let window = PeriodSchedule::All(DateRange::new(
        DateSpec::on(chrono::Local::now().date_naive()),
        DateSpec::on(chrono::Local::now().date_naive() + chrono::Duration::days(5)),
    ));
    let spec = AssignmentSpec::new(&title, window)
        .readings(vec!["1.1".parse()?])
        .stop_before(BreakPoint::SectionSelect);
    teacher
        .add_assignment(AssignmentKind::Reading, &spec)
        .await?;

    // The flow must leave the select-readings dialog open and unconfirmed,
    // not run on to publish.
    teacher
        .find(By::XPath(
            r#"//div[contains(@class,"select-reading-dialog")]"#,
        ))
        .await?;
    teacher
        .find(By::XPath(r#"//button[text()="Add Readings"]"#))
        .await?;
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running WebDriver and Tutor credentials"]
async fn student_logs_in_and_sees_the_dashboard() -> Result<()> {
    init_tracing();
    let student = Student::from_env(options()).await?;
    student.login().await?;
    student.goto_dashboard().await?;
    student.logout().await?;
    Ok(())
}
