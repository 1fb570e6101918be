// Student role: dashboard navigation; most student workflows are not yet
// scripted and stay typed stubs.

use std::ops::{Deref, DerefMut};

use thirtyfour::prelude::*;
use tracing::debug;

use crate::browser::HelperOptions;
use crate::error::{Error, Result};
use crate::roles::user_from_env;
use crate::user::User;

/// User extension for students.
#[derive(Debug)]
pub struct Student {
    user: User,
}

impl Deref for Student {
    type Target = User;

    fn deref(&self) -> &User {
        &self.user
    }
}

impl DerefMut for Student {
    fn deref_mut(&mut self) -> &mut User {
        &mut self.user
    }
}

impl Student {
    /// Wrap an existing user session
    pub fn new(user: User) -> Self {
        Self { user }
    }

    /// Launch a session with credentials from `STUDENT_USER`,
    /// `STUDENT_PASSWORD`, and `SERVER_URL`
    pub async fn from_env(options: HelperOptions) -> Result<Self> {
        let user = user_from_env(options, "STUDENT_USER", "STUDENT_PASSWORD").await?;
        Ok(Self::new(user))
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

    /// Go to current work
    pub async fn goto_dashboard(&self) -> Result<()> {
        self.goto_menu_item("Dashboard").await
    }

    /// Work an assignment
    pub async fn work_assignment(&self) -> Result<()> {
        Err(Error::NotImplemented("work_assignment"))
    }

    /// View work for previous weeks
    pub async fn goto_past_work(&self) -> Result<()> {
        Err(Error::NotImplemented("goto_past_work"))
    }

    /// View the student performance forecast
    pub async fn goto_performance_forecast(&self) -> Result<()> {
        Err(Error::NotImplemented("goto_performance_forecast"))
    }

    /// Complete a set of practice problems
    pub async fn practice(&self) -> Result<()> {
        Err(Error::NotImplemented("practice"))
    }
}
