// Content reviewer role: the plain User surface with its own credentials

use std::ops::{Deref, DerefMut};

use crate::browser::HelperOptions;
use crate::error::Result;
use crate::roles::user_from_env;
use crate::user::User;

/// User extension for content analysts.
#[derive(Debug)]
pub struct ContentQa {
    user: User,
}

impl Deref for ContentQa {
    type Target = User;

    fn deref(&self) -> &User {
        &self.user
    }
}

impl DerefMut for ContentQa {
    fn deref_mut(&mut self) -> &mut User {
        &mut self.user
    }
}

impl ContentQa {
    /// Wrap an existing user session
    pub fn new(user: User) -> Self {
        Self { user }
    }

    /// Launch a session with credentials from `CONTENT_USER`,
    /// `CONTENT_PASSWORD`, and `SERVER_URL`
    pub async fn from_env(options: HelperOptions) -> Result<Self> {
        let user = user_from_env(options, "CONTENT_USER", "CONTENT_PASSWORD").await?;
        Ok(Self::new(user))
    }
}
