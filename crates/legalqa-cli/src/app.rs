//! Application flow for the `legalqa` command.
//!
//! The `App` owns the configuration, the API client and the one
//! `SessionManager` for this run. Every command is routed through the access
//! guard before it touches the backend.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use tracing::{debug, info, warn};

use legalqa_core::auth::{CredentialStore, MemoryStore};
use legalqa_core::models::{MetricsWindow, Token, User};
use legalqa_core::{decide_view, session_for, ApiClient, Config, Decision, SessionManager, ViewId};

use crate::cli::Command;
use crate::render;

/// Environment variable that pre-fills the login prompt
const USERNAME_ENV: &str = "LEGALQA_USERNAME";

/// Main application state container
pub struct App {
    pub config: Config,
    pub api: ApiClient,
    pub session: Arc<SessionManager>,
}

impl App {
    /// Create a new application instance
    pub fn new(ephemeral: bool) -> Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };

        let store: Arc<dyn CredentialStore> = if ephemeral {
            Arc::new(MemoryStore::new())
        } else {
            config.credential_store()?
        };
        Self::with_store(config, store)
    }

    /// Build the application over an explicit credential store
    pub fn with_store(config: Config, store: Arc<dyn CredentialStore>) -> Result<Self> {
        let api = ApiClient::new(&config.api_url())?;
        debug!(api_url = api.base_url(), "API client configured");

        let session = Arc::new(session_for(&api, store));
        Ok(Self {
            config,
            api,
            session,
        })
    }

    /// Restore the stored session and wait until it has settled.
    pub async fn start(&self) {
        let mut changes = self.session.subscribe();
        tokio::spawn(async move {
            while changes.changed().await.is_ok() {
                let label = changes.borrow_and_update().label();
                debug!(state = label, "Session state changed");
            }
        });

        self.session.bootstrap().await;
        let state = self.session.settled().await;
        info!(state = state.label(), "Session ready");
    }

    pub async fn run(&mut self, command: Command) -> Result<()> {
        if let Some(view) = command.view() {
            let decision = self.navigate(view).await;
            if decision != Decision::Render {
                match self.redirect_notice(decision) {
                    Some(notice) => eprintln!("{}", notice),
                    None => debug!(from = view.path(), "Redirected"),
                }
                return Ok(());
            }
        }

        match command {
            Command::Help => {
                print!("{}", crate::cli::USAGE);
                Ok(())
            }
            Command::Login => self.login().await,
            Command::Register => self.register().await,
            Command::Logout => {
                self.session.logout();
                println!("Logged out");
                Ok(())
            }
            Command::WhoAmI => {
                match self.session.current_user() {
                    Some(user) => println!("{}", user.display_name()),
                    None => println!("Not logged in"),
                }
                Ok(())
            }
            Command::Ask(question) => {
                let bearer = self.session.bearer();
                let response = self.api.ask(&question, bearer.as_ref()).await?;
                print!("{}", render::answer(&response.answer));
                Ok(())
            }
            Command::AddUrl(url) => {
                let token = self.bearer()?;
                let response = self.api.add_url(&token, &url).await?;
                println!("{}", response.message);
                Ok(())
            }
            Command::Upload(paths) => self.upload(paths).await,
            Command::Metrics => self.metrics().await,
            Command::Drift { from, to } => {
                let token = self.bearer()?;
                let records = self.api.fetch_drift(&token, from, to).await?;
                print!("{}", render::drift_table(&records));
                Ok(())
            }
            Command::Open(path) => {
                let state = self.session.settled().await;
                match legalqa_core::decide(&state, &path) {
                    Decision::Render => println!("render {}", path),
                    Decision::Suspend => println!("suspend {}", path),
                    Decision::RedirectTo(view) => println!("redirect {} -> {}", path, view.path()),
                }
                Ok(())
            }
        }
    }

    /// Consult the access guard, waiting out an unsettled session. Never
    /// returns `Decision::Suspend`.
    async fn navigate(&self, view: ViewId) -> Decision {
        loop {
            let state = self.session.state();
            match decide_view(&state, view) {
                Decision::Suspend => {
                    debug!(view = view.path(), "Waiting for session to settle");
                    self.session.settled().await;
                }
                decision => return decision,
            }
        }
    }

    fn redirect_notice(&self, decision: Decision) -> Option<String> {
        match decision {
            Decision::RedirectTo(ViewId::Login) => {
                Some("Please log in first: legalqa login".to_string())
            }
            Decision::RedirectTo(ViewId::Dashboard) => {
                let name = self
                    .session
                    .current_user()
                    .map(|u| u.display_name())
                    .unwrap_or_default();
                Some(format!("Already logged in as {}", name))
            }
            _ => None,
        }
    }

    fn bearer(&self) -> Result<Token> {
        self.session
            .bearer()
            .ok_or_else(|| anyhow!("Session ended, please log in again"))
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    async fn login(&mut self) -> Result<()> {
        let username = self.prompt_username()?;
        let password = rpassword::prompt_password("Password: ")?;

        let user = self
            .session
            .login(&username, &password)
            .await
            .map_err(|failure| anyhow!(failure.user_message()))?;
        self.remember_username(&user);
        println!("Logged in as {}", user.display_name());
        Ok(())
    }

    async fn register(&mut self) -> Result<()> {
        let username = prompt("Username: ")?;
        let email = prompt("Email: ")?;
        let password = rpassword::prompt_password("Password: ")?;
        let confirm = rpassword::prompt_password("Confirm password: ")?;
        if password != confirm {
            bail!("Passwords do not match");
        }

        let user = self
            .session
            .register(&username, &email, &password)
            .await
            .map_err(|failure| anyhow!(failure.user_message()))?;
        self.remember_username(&user);
        println!("Registered and logged in as {}", user.display_name());
        Ok(())
    }

    fn prompt_username(&self) -> Result<String> {
        let default = std::env::var(USERNAME_ENV)
            .ok()
            .or_else(|| self.config.last_username.clone())
            .unwrap_or_default();

        if default.is_empty() {
            return prompt("Username: ");
        }
        let input = prompt(&format!("Username [{}]: ", default))?;
        Ok(if input.is_empty() { default } else { input })
    }

    fn remember_username(&mut self, user: &User) {
        self.config.last_username = Some(user.username.clone());
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }
    }

    // =========================================================================
    // Workspace
    // =========================================================================

    async fn upload(&self, paths: Vec<PathBuf>) -> Result<()> {
        for path in &paths {
            if !path.is_file() {
                bail!("{} is not a file", path.display());
            }
        }
        let token = self.bearer()?;
        let response = self.api.upload_documents(&token, paths.as_slice()).await?;
        println!("{}", response.message);
        Ok(())
    }

    async fn metrics(&self) -> Result<()> {
        let token = self.bearer()?;
        let (daily, weekly, summary) = tokio::try_join!(
            self.api.fetch_metrics(&token, MetricsWindow::Daily),
            self.api.fetch_metrics(&token, MetricsWindow::Weekly),
            self.api.fetch_metrics_summary(&token),
        )?;
        print!("{}", render::metric_table(MetricsWindow::Daily, &daily));
        println!();
        print!("{}", render::metric_table(MetricsWindow::Weekly, &weekly));
        println!();
        print!("{}", render::metric_summary(&summary));
        Ok(())
    }
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Nothing listens here; connections are refused immediately
    const CLOSED_API_URL: &str = "http://127.0.0.1:9";

    fn app_over(store: MemoryStore) -> App {
        let config = Config {
            api_url: Some(CLOSED_API_URL.to_string()),
            ..Config::default()
        };
        App::with_store(config, Arc::new(store)).expect("app builds")
    }

    #[tokio::test]
    async fn test_workspace_command_redirects_to_login_when_signed_out() {
        let mut app = app_over(MemoryStore::new());
        app.session.bootstrap().await;

        let decision = app.navigate(ViewId::Dashboard).await;
        assert_eq!(decision, Decision::RedirectTo(ViewId::Login));
        assert_eq!(
            app.redirect_notice(decision).as_deref(),
            Some("Please log in first: legalqa login")
        );

        // Redirected before any request is made
        app.run(Command::AddUrl("https://example.com/act".to_string()))
            .await
            .expect("redirect is not an error");
    }

    #[tokio::test]
    async fn test_ask_renders_when_signed_out() {
        let app = app_over(MemoryStore::new());
        app.session.bootstrap().await;

        assert_eq!(app.navigate(ViewId::Ask).await, Decision::Render);
        assert_eq!(app.navigate(ViewId::Login).await, Decision::Render);
    }

    #[tokio::test]
    async fn test_navigate_waits_for_bootstrap_before_redirecting() {
        let app = app_over(MemoryStore::with_token(Token::new("stale")));
        assert_eq!(
            decide_view(&app.session.state(), ViewId::Monitoring),
            Decision::Suspend
        );

        let bootstrap = tokio::spawn({
            let session = app.session.clone();
            async move { session.bootstrap().await }
        });

        // The identity lookup fails, so the settled decision is a redirect
        let decision = app.navigate(ViewId::Monitoring).await;
        assert_eq!(decision, Decision::RedirectTo(ViewId::Login));
        bootstrap.await.expect("bootstrap task");
        assert!(app.session.state().is_settled());
    }
}
