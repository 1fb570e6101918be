// Teacher role: assignment management plus calendar-side navigation

use std::ops::{Deref, DerefMut};
use std::time::Duration;

use thirtyfour::prelude::*;
use tracing::debug;

use crate::assignment::{Assignment, AssignmentKind, AssignmentSpec};
use crate::browser::HelperOptions;
use crate::error::Result;
use crate::roles::user_from_env;
use crate::user::User;
use crate::POLL_INTERVAL;

/// User extension for teachers.
#[derive(Debug)]
pub struct Teacher {
    user: User,
    assignment: Assignment,
}

impl Deref for Teacher {
    type Target = User;

    fn deref(&self) -> &User {
        &self.user
    }
}

impl DerefMut for Teacher {
    fn deref_mut(&mut self) -> &mut User {
        &mut self.user
    }
}

impl Teacher {
    /// Wrap an existing user session
    pub fn new(user: User) -> Self {
        let assignment = Assignment::with_wait_time(user.wait_time());
        Self { user, assignment }
    }

    /// Launch a session with credentials from `TEACHER_USER`,
    /// `TEACHER_PASSWORD`, and `SERVER_URL`
    pub async fn from_env(options: HelperOptions) -> Result<Self> {
        let user = user_from_env(options, "TEACHER_USER", "TEACHER_PASSWORD").await?;
        Ok(Self::new(user))
    }

    /// Add an assignment
    pub async fn add_assignment(&self, kind: AssignmentKind, spec: &AssignmentSpec) -> Result<()> {
        self.assignment.add(self.driver(), kind, spec).await
    }

    /// Alter an existing assignment
    pub async fn change_assignment(
        &self,
        kind: AssignmentKind,
        spec: &AssignmentSpec,
    ) -> Result<()> {
        self.assignment.edit(self.driver(), kind, spec).await
    }

    /// Delete an existing assignment (if available)
    pub async fn delete_assignment(
        &self,
        kind: AssignmentKind,
        spec: &AssignmentSpec,
    ) -> Result<()> {
        self.assignment.remove(self.driver(), kind, spec).await
    }

    /// Go to a specific user menu item
    pub async fn goto_menu_item(&self, item: &str) -> Result<()> {
        debug!(%item, "goto menu item");
        let here = self.driver().current_url().await?;
        if !here.as_str().contains("courses") {
            return Ok(());
        }
        self.open_user_menu().await?;
        let entry = self.driver().query(By::LinkText(item)).first().await?;
        entry.wait_until().clickable().await?;
        let pending = self.watch_page().await?;
        entry.click().await?;
        pending.settled().await?;
        Ok(())
    }

    /// Return the teacher to the calendar dashboard.
    ///
    /// Falls back to the navbar brand link when the calendar link is not
    /// on the page; both attempts are best-effort.
    pub async fn goto_calendar(&self) -> Result<()> {
        for selector in [
            r#"//a[contains(@href,"calendar")]"#,
            r#"//a[contains(@class,"navbar-brand")]"#,
        ] {
            if let Ok(link) = self.find(By::XPath(selector)).await {
                let pending = self.watch_page().await?;
                if link.click().await.is_ok() {
                    pending.settled().await?;
                    return Ok(());
                }
            }
            debug!(%selector, "calendar link unavailable");
        }
        Ok(())
    }

    /// Access the performance forecast page
    pub async fn goto_performance_forecast(&self) -> Result<()> {
        self.goto_menu_item("Performance Forecast").await?;
        // The guide can render well after navigation; missing it is not
        // fatal to the workflow.
        let guide = self
            .driver()
            .query(By::ClassName("guide-container"))
            .wait(self.wait_time() * 10, POLL_INTERVAL)
            .first()
            .await;
        if let Err(err) = guide {
            debug!(%err, "performance forecast guide never appeared");
        }
        Ok(())
    }

    /// Access the student scores page
    pub async fn goto_student_scores(&self) -> Result<()> {
        self.goto_menu_item("Student Scores").await
    }

    /// Access the course roster page
    pub async fn goto_course_roster(&self) -> Result<()> {
        self.goto_menu_item("Course Roster").await
    }

    /// Add a section to the course
    pub async fn add_course_section(&self, section_name: &str) -> Result<()> {
        let here = self.driver().current_url().await?;
        if !here.as_str().contains("settings") {
            self.goto_course_roster().await?;
        }
        self.find(By::XPath(r#"//button[i[contains(@class,"fa-plus")]]"#))
            .await?
            .click()
            .await?;
        let name_input = self
            .driver()
            .query(By::XPath(
                r#"//div[contains(@class,"teacher-edit-period-form")]//input[@type="text"]"#,
            ))
            .first()
            .await?;
        name_input.wait_until().displayed().await?;
        name_input.send_keys(section_name).await?;
        let confirm = self
            .driver()
            .query(By::XPath(
                r#"//button[contains(@class,"-edit-period-confirm")]"#,
            ))
            .first()
            .await?;
        confirm.wait_until().clickable().await?;
        confirm.click().await?;
        Ok(())
    }

    /// Return the enrollment phrase for a class section
    pub async fn get_enrollment_code(&self, section_name: &str) -> Result<String> {
        let here = self.driver().current_url().await?;
        if !here.as_str().contains("settings") {
            self.goto_course_roster().await?;
        }
        self.find(By::XPath(format!(
            r#"//a[span[@class="tab-item-period-name" and text()="{section_name}"]]"#
        )))
        .await?
        .click()
        .await?;
        let show = self
            .driver()
            .query(By::ClassName("show-enrollment-code"))
            .first()
            .await?;
        show.wait_until().clickable().await?;
        show.click().await?;
        self.sleep(Duration::from_secs(1)).await;
        let code = self
            .driver()
            .query(By::XPath(r#"//p[@class="code"]"#))
            .first()
            .await?;
        Ok(code.text().await?.trim().to_string())
    }
}
