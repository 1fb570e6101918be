// Admin role: direct navigation across the /admin console pages

use std::ops::{Deref, DerefMut};

use crate::browser::HelperOptions;
use crate::error::Result;
use crate::roles::user_from_env;
use crate::user::User;

/// User extension for administrators.
#[derive(Debug)]
pub struct Admin {
    user: User,
    base: String,
}

impl Deref for Admin {
    type Target = User;

    fn deref(&self) -> &User {
        &self.user
    }
}

impl DerefMut for Admin {
    fn deref_mut(&mut self) -> &mut User {
        &mut self.user
    }
}

impl Admin {
    /// Wrap an existing user session
    pub fn new(user: User) -> Self {
        let base = format!("{}admin", ensure_trailing_slash(user.site().as_str()));
        Self { user, base }
    }

    /// Launch a session with credentials from `ADMIN_USER`,
    /// `ADMIN_PASSWORD`, and `SERVER_URL`
    pub async fn from_env(options: HelperOptions) -> Result<Self> {
        let user = user_from_env(options, "ADMIN_USER", "ADMIN_PASSWORD").await?;
        Ok(Self::new(user))
    }

    /// Root URL of the admin console
    pub fn admin_base(&self) -> &str {
        &self.base
    }

    async fn goto_admin_page(&self, path: &str) -> Result<()> {
        self.get(&format!("{}{path}", self.base)).await
    }

    /// Access the administrator controls
    pub async fn goto_admin_control(&self) -> Result<()> {
        self.goto_admin_page("").await
    }

    /// Access the catalog
    pub async fn goto_catalog_offerings(&self) -> Result<()> {
        self.goto_admin_page("/catalog_offerings").await
    }

    /// Access the course list
    pub async fn goto_course_list(&self) -> Result<()> {
        self.goto_admin_page("/courses").await
    }

    /// Access the school list
    pub async fn goto_school_list(&self) -> Result<()> {
        self.goto_admin_page("/school").await
    }

    /// Access the district list
    pub async fn goto_district_list(&self) -> Result<()> {
        self.goto_admin_page("/districts").await
    }

    /// Access the tag list
    pub async fn goto_tag_list(&self) -> Result<()> {
        self.goto_admin_page("/tags").await
    }

    /// Access the ecosystem list
    pub async fn goto_ecosystems(&self) -> Result<()> {
        self.goto_admin_page("/ecosystems").await
    }

    /// Access the terms and contracts list (outside the admin base)
    pub async fn goto_terms_and_contracts(&self) -> Result<()> {
        let url = format!("{}fine_print", ensure_trailing_slash(self.site().as_str()));
        self.get(&url).await
    }

    /// Access the targeted contracts
    pub async fn goto_contracts(&self) -> Result<()> {
        self.goto_admin_page("/targeted_contracts").await
    }

    /// Access the course stats
    pub async fn goto_course_stats(&self) -> Result<()> {
        self.goto_admin_page("/stats/courses").await
    }

    /// Access the Concept Coach stats
    pub async fn goto_concept_coach_stats(&self) -> Result<()> {
        self.goto_admin_page("/stats/concept_coach").await
    }

    /// Access the user list
    pub async fn goto_user_list(&self) -> Result<()> {
        self.goto_admin_page("/users").await
    }

    /// Access the jobs list
    pub async fn goto_jobs(&self) -> Result<()> {
        self.goto_admin_page("/jobs").await
    }

    /// Access the researcher data
    pub async fn goto_research_data(&self) -> Result<()> {
        self.goto_admin_page("/research_data").await
    }

    /// Access the Salesforce controls
    pub async fn goto_salesforce_control(&self) -> Result<()> {
        self.goto_admin_page("/salesforce").await
    }

    /// Access the system settings
    pub async fn goto_system_settings(&self) -> Result<()> {
        self.goto_admin_page("/settings").await
    }

    /// Access the system notifications
    pub async fn goto_system_notifications(&self) -> Result<()> {
        self.goto_admin_page("/notifications").await
    }
}

fn ensure_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_normalized() {
        assert_eq!(
            ensure_trailing_slash("https://tutor-qa.openstax.org"),
            "https://tutor-qa.openstax.org/"
        );
        assert_eq!(
            ensure_trailing_slash("https://tutor-qa.openstax.org/"),
            "https://tutor-qa.openstax.org/"
        );
    }
}
