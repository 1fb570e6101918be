// User: credentials, login/logout, and course selection on top of Helper

use std::ops::{Deref, DerefMut};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thirtyfour::prelude::*;
use tracing::{debug, info};
use url::Url;

use crate::error::{Error, Result};
use crate::helper::Helper;
use crate::CONDENSED_WIDTH;

/// Website credentials plus the optional test email account shared by all
/// roles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_password: Option<String>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            email: None,
            email_username: None,
            email_password: None,
        }
    }
}

/// How to pick a course from the dashboard course picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CourseSelector {
    /// Match the course `data-title` attribute
    Title(String),
    /// Match the course `data-appearance` attribute (case-insensitive)
    Appearance(String),
}

impl CourseSelector {
    fn data_attr(&self) -> (&'static str, String) {
        match self {
            CourseSelector::Title(title) => ("title", title.clone()),
            CourseSelector::Appearance(appearance) => {
                ("appearance", appearance.to_lowercase())
            }
        }
    }
}

/// Force a site address to an absolute https URL.
///
/// Bare hosts (`tutor-qa.openstax.org`) are accepted; any other scheme is
/// rewritten to https.
pub fn normalize_site(site: &str) -> Result<Url> {
    let candidate = if site.contains("://") {
        site.to_string()
    } else {
        format!("https://{site}")
    };
    let mut url = Url::parse(&candidate).map_err(|_| Error::InvalidSite(site.to_string()))?;
    if url.scheme() != "https" {
        url.set_scheme("https")
            .map_err(|_| Error::InvalidSite(site.to_string()))?;
    }
    Ok(url)
}

/// A logged-in-capable account bound to a browser session.
///
/// Role types (`Teacher`, `Student`, `Admin`, `ContentQa`) wrap this and
/// add their own navigation; `User` itself covers login, logout, the user
/// menu, and course selection.
#[derive(Debug)]
pub struct User {
    helper: Helper,
    credentials: Credentials,
    site: Url,
}

impl Deref for User {
    type Target = Helper;

    fn deref(&self) -> &Helper {
        &self.helper
    }
}

impl DerefMut for User {
    fn deref_mut(&mut self) -> &mut Helper {
        &mut self.helper
    }
}

impl User {
    /// Bind credentials and a target site to an open session
    pub fn new(helper: Helper, credentials: Credentials, site: &str) -> Result<Self> {
        Ok(Self {
            helper,
            credentials,
            site: normalize_site(site)?,
        })
    }

    pub fn username(&self) -> &str {
        &self.credentials.username
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Normalized site URL
    pub fn site(&self) -> &Url {
        &self.site
    }

    pub fn into_helper(self) -> Helper {
        self.helper
    }

    /// Log in with the stored credentials at the stored site
    pub async fn login(&self) -> Result<()> {
        self.login_with(None, None, None).await
    }

    /// Tutor login control.
    ///
    /// Any parameter left as `None` falls back to the stored value.
    /// Branches to deal with standard and compact screen widths.
    pub async fn login_with(
        &self,
        url: Option<&str>,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<()> {
        let username = username.unwrap_or(&self.credentials.username);
        let password = password.unwrap_or(&self.credentials.password);
        let url_address = url.map(normalize_site).transpose()?;
        let url_address = url_address.as_ref().unwrap_or(&self.site);
        info!(site = %url_address, %username, "logging in");

        self.get(url_address.as_str()).await?;
        if url_address.as_str().contains("tutor") {
            self.expand_condensed_nav().await?;
            let login = self.driver().query(By::LinkText("Login")).first().await?;
            login.wait_until().displayed().await?;
            let pending = self.watch_page().await?;
            login.click().await?;
            pending.settled().await?;
        }

        // Guard against redirects off OpenStax before typing credentials.
        let source = self.driver().source().await?;
        if !source.to_lowercase().contains("openstax") {
            let here = self.driver().current_url().await?;
            return Err(Error::NotOpenStaxUrl(here.to_string()));
        }
        self.sleep(Duration::from_secs(1)).await;

        self.find(By::Id("auth_key")).await?.send_keys(username).await?;
        self.find(By::Id("password")).await?.send_keys(password).await?;
        let pending = self.watch_page().await?;
        self.find(By::XPath(r#"//button[text()="Sign in"]"#))
            .await?
            .click()
            .await?;
        pending.settled().await?;
        Ok(())
    }

    /// Logout control, dispatching on the current URL
    pub async fn logout(&self) -> Result<()> {
        let here = self.driver().current_url().await?;
        let address = here.as_str();
        if address.contains("tutor") {
            self.tutor_logout().await
        } else if address.contains("accounts") {
            self.accounts_logout().await
        } else if address.contains("exercises") {
            self.exercises_logout().await
        } else {
            Err(Error::NotOpenStaxUrl(here.to_string()))
        }
    }

    /// Tutor logout helper
    pub async fn tutor_logout(&self) -> Result<()> {
        self.open_user_menu().await?;
        let logout = self
            .driver()
            .query(By::XPath(r#"//input[@aria-label="Log Out"]"#))
            .first()
            .await?;
        logout.wait_until().displayed().await?;
        let pending = self.watch_page().await?;
        logout.click().await?;
        pending.settled().await?;
        Ok(())
    }

    /// OS Accounts logout helper
    pub async fn accounts_logout(&self) -> Result<()> {
        let pending = self.watch_page().await?;
        self.find(By::LinkText("Sign out")).await?.click().await?;
        pending.settled().await?;
        Ok(())
    }

    /// Exercises logout helper
    pub async fn exercises_logout(&self) -> Result<()> {
        Err(Error::NotImplemented("exercises_logout"))
    }

    /// Hamburger (user) menu opener, condensed-width aware
    pub async fn open_user_menu(&self) -> Result<()> {
        self.expand_condensed_nav().await?;
        let toggle = self
            .driver()
            .query(By::ClassName("dropdown-toggle"))
            .first()
            .await?;
        toggle.wait_until().displayed().await?;
        toggle.click().await?;
        Ok(())
    }

    /// Go to the course picker
    pub async fn goto_course_list(&self) -> Result<()> {
        self.driver()
            .query(By::Id("react-root-container"))
            .first()
            .await?;
        let here = self.driver().current_url().await?;
        if !here.as_str().contains("tutor") {
            return Err(Error::NotOpenStaxUrl(here.to_string()));
        }
        let pending = self.watch_page().await?;
        self.find(By::XPath(r#"//a[contains(@href,"dashboard")]"#))
            .await?
            .click()
            .await?;
        pending.settled().await?;
        Ok(())
    }

    /// Select a course from the dashboard
    pub async fn select_course(&self, selector: &CourseSelector) -> Result<()> {
        let here = self.driver().current_url().await?;
        if !here.as_str().contains("dashboard") {
            self.goto_course_list().await?;
        }
        let (attr, value) = selector.data_attr();
        let course = self
            .driver()
            .query(By::XPath(format!(r#"//div[@data-{attr}="{value}"]//a"#)))
            .first()
            .await?;
        course.wait_until().clickable().await?;
        let pending = self.watch_page().await?;
        course.click().await?;
        pending.settled().await?;
        Ok(())
    }

    /// Access the reference book, falling back through the user menu
    pub async fn view_reference_book(&self) -> Result<()> {
        let direct = By::XPath(r#"//div/a[contains(@class,"view-reference-guide")]"#);
        if let Ok(link) = self.find(direct).await {
            if link.click().await.is_ok() {
                return Ok(());
            }
            debug!("direct reference-guide link present but not clickable");
        }
        self.open_user_menu().await?;
        self.find(By::XPath(
            r#"//li/a[contains(@class,"view-reference-guide")]"#,
        ))
        .await?
        .click()
        .await?;
        Ok(())
    }

    /// Open the collapsed small-window nav menu when the viewport is
    /// condensed.
    async fn expand_condensed_nav(&self) -> Result<()> {
        if self.window_size().await?.width > CONDENSED_WIDTH {
            return Ok(());
        }
        let toggle = self
            .find(By::XPath(
                r#"//button[contains(@class,"navbar-toggle")]"#,
            ))
            .await?;
        let class = toggle.attr("class").await?.unwrap_or_default();
        if class.contains("collapsed") {
            toggle.click().await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_hosts_get_https() {
        let url = normalize_site("tutor-qa.openstax.org").unwrap();
        assert_eq!(url.as_str(), "https://tutor-qa.openstax.org/");
    }

    #[test]
    fn http_is_rewritten_to_https() {
        let url = normalize_site("http://tutor-dev.openstax.org/courses").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.path(), "/courses");
    }

    #[test]
    fn https_urls_pass_through() {
        let url = normalize_site("https://tutor-qa.openstax.org/").unwrap();
        assert_eq!(url.as_str(), "https://tutor-qa.openstax.org/");
    }

    #[test]
    fn garbage_sites_are_rejected() {
        assert!(matches!(
            normalize_site("http://"),
            Err(Error::InvalidSite(_))
        ));
    }

    #[test]
    fn appearance_selector_lowercases() {
        let selector = CourseSelector::Appearance("HS Physics".to_string());
        assert_eq!(selector.data_attr(), ("appearance", "hs physics".to_string()));
        let selector = CourseSelector::Title("HS Physics".to_string());
        assert_eq!(selector.data_attr(), ("title", "HS Physics".to_string()));
    }
}
