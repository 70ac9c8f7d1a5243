use chrono::Utc;
use tracing::{debug, warn};

use wellness_types::api::{LoginRequest, ProgressResponse, RegisterRequest, SaveMoodRequest};
use wellness_types::catalog::{self, ChallengeDefinition};
use wellness_types::models::{MoodEntry, UserSummary};

use crate::api::Backend;
use crate::error::ClientError;
use crate::mood::MoodLevel;
use crate::session::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Register,
    Dashboard,
    /// Step-by-step view of one catalog challenge.
    Challenge(u32),
}

/// One-shot confirmations for the front end to show and dismiss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Registered { username: String },
    MoodSaved { level: i64 },
    ChallengeCompleted { challenge_id: u32, points_earned: i64 },
}

/// View state of the single-page client.
///
/// Loads of history and progress fail silently: the error is logged and the
/// previous state is kept. Login and registration failures are returned so
/// the front end can block on them.
pub struct App<B> {
    backend: B,
    session: SessionStore,
    view: View,
    token: Option<String>,
    user: Option<UserSummary>,
    mood: MoodLevel,
    quote: &'static str,
    mood_history: Vec<MoodEntry>,
    progress: ProgressResponse,
    notices: Vec<Notice>,
}

impl<B: Backend> App<B> {
    pub fn new(backend: B, session: SessionStore) -> Self {
        let mood = MoodLevel::default();
        Self {
            backend,
            session,
            view: View::Login,
            token: None,
            user: None,
            mood,
            quote: mood.random_quote(&mut rand::rng()),
            mood_history: Vec::new(),
            progress: ProgressResponse::default(),
            notices: Vec::new(),
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn user(&self) -> Option<&UserSummary> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn mood(&self) -> MoodLevel {
        self.mood
    }

    pub fn quote(&self) -> &'static str {
        self.quote
    }

    pub fn mood_history(&self) -> &[MoodEntry] {
        &self.mood_history
    }

    pub fn progress(&self) -> &ProgressResponse {
        &self.progress
    }

    pub fn current_challenge(&self) -> Option<&'static ChallengeDefinition> {
        match self.view {
            View::Challenge(id) => catalog::find(id),
            _ => None,
        }
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Resume a stored session. Any failure leaves the client at the login
    /// view without surfacing an error.
    pub async fn restore_session(&mut self) -> bool {
        let token = match self.session.load().await {
            Ok(Some(token)) => token,
            Ok(None) => return false,
            Err(e) => {
                warn!("Reading stored session failed: {}", e);
                return false;
            }
        };

        match self.backend.me(&token).await {
            Ok(profile) => {
                self.token = Some(token);
                self.user = Some(profile.into());
                self.enter_dashboard().await;
                true
            }
            Err(e) => {
                debug!("Stored session rejected: {}", e);
                false
            }
        }
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), ClientError> {
        let resp = self
            .backend
            .login(&LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .await?;

        self.session.save(&resp.token).await?;
        self.token = Some(resp.token);
        self.user = Some(resp.user);
        self.enter_dashboard().await;
        Ok(())
    }

    pub fn show_register(&mut self) {
        if !self.is_authenticated() {
            self.view = View::Register;
        }
    }

    pub fn show_login(&mut self) {
        if !self.is_authenticated() {
            self.view = View::Login;
        }
    }

    pub async fn register(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(), ClientError> {
        self.backend
            .register(&RegisterRequest {
                username: username.to_string(),
                email: email.to_string(),
                password: password.to_string(),
            })
            .await?;

        self.notices.push(Notice::Registered {
            username: username.to_string(),
        });
        self.view = View::Login;
        Ok(())
    }

    /// Move the slider; the quote follows the new level.
    pub fn set_mood(&mut self, level: MoodLevel) {
        self.mood = level;
        self.new_quote();
    }

    pub fn new_quote(&mut self) {
        self.quote = self.mood.random_quote(&mut rand::rng());
    }

    pub async fn save_mood(&mut self) -> Result<(), ClientError> {
        let token = self.token()?;
        let level = self.mood.value();

        self.backend
            .save_mood(
                &token,
                &SaveMoodRequest {
                    mood: level,
                    date: Some(Utc::now()),
                },
            )
            .await
            .inspect_err(|e| warn!("Saving mood failed: {}", e))?;

        self.notices.push(Notice::MoodSaved { level });
        self.load_mood_history().await;
        Ok(())
    }

    /// Notify the API and open the challenge view. The view opens even if
    /// the notification fails.
    pub async fn start_challenge(&mut self, challenge_id: u32) -> Result<(), ClientError> {
        let token = self.token()?;
        if catalog::find(challenge_id).is_none() {
            return Err(ClientError::UnknownChallenge(challenge_id));
        }

        if let Err(e) = self.backend.start_challenge(&token, challenge_id).await {
            warn!("Starting challenge {} failed: {}", challenge_id, e);
        }

        self.view = View::Challenge(challenge_id);
        Ok(())
    }

    pub fn back(&mut self) {
        if matches!(self.view, View::Challenge(_)) {
            self.view = View::Dashboard;
        }
    }

    /// Report completion of the open challenge, then return to the dashboard
    /// with fresh progress. On failure the challenge view stays open.
    pub async fn complete_challenge(&mut self) -> Result<(), ClientError> {
        let token = self.token()?;
        let View::Challenge(challenge_id) = self.view else {
            return Ok(());
        };

        let resp = self
            .backend
            .complete_challenge(&token, challenge_id)
            .await
            .inspect_err(|e| warn!("Completing challenge {} failed: {}", challenge_id, e))?;

        self.notices.push(Notice::ChallengeCompleted {
            challenge_id,
            points_earned: resp.points_earned,
        });
        self.view = View::Dashboard;
        self.load_progress().await;
        Ok(())
    }

    /// Forget the session from any view. In-memory state is reset even if
    /// the stored token cannot be removed.
    pub async fn logout(&mut self) -> Result<(), ClientError> {
        self.token = None;
        self.user = None;
        self.mood_history.clear();
        self.progress = ProgressResponse::default();
        self.view = View::Login;

        self.session.clear().await?;
        Ok(())
    }

    async fn enter_dashboard(&mut self) {
        self.view = View::Dashboard;
        self.new_quote();
        self.load_progress().await;
        self.load_mood_history().await;
    }

    async fn load_mood_history(&mut self) {
        let Some(token) = self.token.as_deref() else {
            return;
        };
        match self.backend.mood_history(token).await {
            Ok(history) => self.mood_history = history,
            Err(e) => warn!("Loading mood history failed: {}", e),
        }
    }

    async fn load_progress(&mut self) {
        let Some(token) = self.token.as_deref() else {
            return;
        };
        match self.backend.progress(token).await {
            Ok(progress) => self.progress = progress,
            Err(e) => warn!("Loading progress failed: {}", e),
        }
    }

    fn token(&self) -> Result<String, ClientError> {
        self.token.clone().ok_or(ClientError::NotAuthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use chrono::DateTime;
    use uuid::Uuid;
    use wellness_types::api::{
        ActiveChallenge, CompleteChallengeResponse, CompletedChallenge, LoginResponse,
        RegisterResponse,
    };
    use wellness_types::models::{ChallengeStatus, UserProfile};

    const TOKEN: &str = "valid-token";

    #[derive(Default)]
    struct FakeState {
        users: Vec<(UserProfile, String)>,
        moods: Vec<MoodEntry>,
        started: Vec<u32>,
        completed: Vec<u32>,
        fail_start: bool,
    }

    #[derive(Default)]
    struct FakeBackend {
        state: Mutex<FakeState>,
    }

    fn api_error(status: u16, message: &str) -> ClientError {
        ClientError::Api {
            status,
            message: message.into(),
        }
    }

    impl FakeBackend {
        fn with_user(username: &str, password: &str) -> Self {
            let backend = Self::default();
            backend.state.lock().unwrap().users.push((
                UserProfile {
                    id: Uuid::new_v4(),
                    username: username.into(),
                    email: format!("{username}@x.com"),
                    created_at: DateTime::default(),
                },
                password.into(),
            ));
            backend
        }

        fn check(&self, token: &str) -> Result<(), ClientError> {
            if token == TOKEN {
                Ok(())
            } else {
                Err(api_error(401, "Invalid or expired token"))
            }
        }
    }

    impl Backend for FakeBackend {
        async fn register(&self, req: &RegisterRequest) -> Result<RegisterResponse, ClientError> {
            let mut state = self.state.lock().unwrap();
            if state.users.iter().any(|(u, _)| u.username == req.username) {
                return Err(api_error(409, "Username already exists"));
            }
            let id = Uuid::new_v4();
            state.users.push((
                UserProfile {
                    id,
                    username: req.username.clone(),
                    email: req.email.clone(),
                    created_at: Utc::now(),
                },
                req.password.clone(),
            ));
            Ok(RegisterResponse {
                message: "User created successfully".into(),
                user_id: id,
            })
        }

        async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, ClientError> {
            let state = self.state.lock().unwrap();
            state
                .users
                .iter()
                .find(|(u, pw)| u.username == req.username && *pw == req.password)
                .map(|(u, _)| LoginResponse {
                    token: TOKEN.into(),
                    user: u.clone().into(),
                })
                .ok_or_else(|| api_error(401, "Invalid credentials"))
        }

        async fn me(&self, token: &str) -> Result<UserProfile, ClientError> {
            self.check(token)?;
            let state = self.state.lock().unwrap();
            state
                .users
                .first()
                .map(|(u, _)| u.clone())
                .ok_or_else(|| api_error(401, "User not found"))
        }

        async fn save_mood(&self, token: &str, req: &SaveMoodRequest) -> Result<(), ClientError> {
            self.check(token)?;
            let now = Utc::now();
            self.state.lock().unwrap().moods.insert(
                0,
                MoodEntry {
                    id: Uuid::new_v4(),
                    mood: req.mood,
                    date: req.date.unwrap_or(now),
                    created_at: now,
                },
            );
            Ok(())
        }

        async fn mood_history(&self, token: &str) -> Result<Vec<MoodEntry>, ClientError> {
            self.check(token)?;
            Ok(self.state.lock().unwrap().moods.clone())
        }

        async fn progress(&self, token: &str) -> Result<ProgressResponse, ClientError> {
            self.check(token)?;
            let state = self.state.lock().unwrap();
            Ok(ProgressResponse {
                total_points: 10 * state.completed.len() as i64,
                completed_challenges: state.completed.len() as i64,
                current_challenges: state
                    .started
                    .iter()
                    .map(|&challenge_id| ActiveChallenge {
                        challenge_id,
                        status: ChallengeStatus::Started,
                        started_at: Utc::now(),
                    })
                    .collect(),
                recent_completions: state
                    .completed
                    .iter()
                    .map(|&challenge_id| CompletedChallenge {
                        challenge_id,
                        completed_at: Utc::now(),
                        points: 10,
                    })
                    .collect(),
            })
        }

        async fn start_challenge(&self, token: &str, challenge_id: u32) -> Result<(), ClientError> {
            self.check(token)?;
            let mut state = self.state.lock().unwrap();
            if state.fail_start {
                return Err(api_error(500, "Internal server error"));
            }
            state.started.push(challenge_id);
            Ok(())
        }

        async fn complete_challenge(
            &self,
            token: &str,
            challenge_id: u32,
        ) -> Result<CompleteChallengeResponse, ClientError> {
            self.check(token)?;
            let mut state = self.state.lock().unwrap();
            let Some(pos) = state.started.iter().position(|&id| id == challenge_id) else {
                return Err(api_error(404, "Challenge not found or already completed"));
            };
            state.started.remove(pos);
            state.completed.push(challenge_id);
            Ok(CompleteChallengeResponse {
                message: "Challenge completed successfully".into(),
                points_earned: 10,
            })
        }
    }

    fn temp_session() -> SessionStore {
        SessionStore::new(std::env::temp_dir().join(format!(
            "wellness_app_{}_{}",
            std::process::id(),
            Uuid::new_v4()
        )))
    }

    async fn signed_in_app() -> App<FakeBackend> {
        let mut app = App::new(FakeBackend::with_user("ana", "pw123"), temp_session());
        app.login("ana", "pw123").await.unwrap();
        app
    }

    #[tokio::test]
    async fn starts_at_login() {
        let app = App::new(FakeBackend::default(), temp_session());
        assert_eq!(app.view(), View::Login);
        assert!(!app.is_authenticated());
        assert!(app.mood().quotes().contains(&app.quote()));
    }

    #[tokio::test]
    async fn login_persists_token_and_opens_dashboard() {
        let app = signed_in_app().await;
        assert_eq!(app.view(), View::Dashboard);
        assert_eq!(app.user().unwrap().username, "ana");
        assert_eq!(app.session.load().await.unwrap().as_deref(), Some(TOKEN));
    }

    #[tokio::test]
    async fn failed_login_stays_put() {
        let mut app = App::new(FakeBackend::with_user("ana", "pw123"), temp_session());
        let err = app.login("ana", "wrong").await.unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(app.view(), View::Login);
        assert_eq!(app.session.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn register_returns_to_login() {
        let mut app = App::new(FakeBackend::default(), temp_session());
        app.show_register();
        assert_eq!(app.view(), View::Register);

        app.register("ana", "ana@x.com", "pw123").await.unwrap();
        assert_eq!(app.view(), View::Login);
        assert_eq!(
            app.take_notices(),
            [Notice::Registered {
                username: "ana".into()
            }]
        );

        app.show_register();
        let err = app.register("ana", "ana@x.com", "pw123").await.unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 409, .. }));
        assert_eq!(app.view(), View::Register);

        app.show_login();
        assert_eq!(app.view(), View::Login);
    }

    #[tokio::test]
    async fn restores_stored_session() {
        let session = temp_session();
        session.save(TOKEN).await.unwrap();

        let mut app = App::new(FakeBackend::with_user("ana", "pw123"), session);
        assert!(app.restore_session().await);
        assert_eq!(app.view(), View::Dashboard);
        assert_eq!(app.user().unwrap().username, "ana");
    }

    #[tokio::test]
    async fn rejected_session_is_silent() {
        let session = temp_session();
        session.save("stale-token").await.unwrap();

        let mut app = App::new(FakeBackend::with_user("ana", "pw123"), session);
        assert!(!app.restore_session().await);
        assert_eq!(app.view(), View::Login);
        assert!(!app.is_authenticated());

        let mut app = App::new(FakeBackend::default(), temp_session());
        assert!(!app.restore_session().await);
    }

    #[tokio::test]
    async fn mood_slider_and_save() {
        let mut app = signed_in_app().await;
        let level = MoodLevel::new(3).unwrap();

        app.set_mood(level);
        assert_eq!(app.mood(), level);
        assert!(level.quotes().contains(&app.quote()));

        app.save_mood().await.unwrap();
        assert_eq!(app.mood_history().len(), 1);
        assert_eq!(app.mood_history()[0].mood, 3);
        assert_eq!(app.take_notices(), [Notice::MoodSaved { level: 3 }]);
    }

    #[tokio::test]
    async fn actions_need_a_session() {
        let mut app = App::new(FakeBackend::default(), temp_session());
        assert!(matches!(app.save_mood().await, Err(ClientError::NotAuthenticated)));
        assert!(matches!(
            app.start_challenge(1).await,
            Err(ClientError::NotAuthenticated)
        ));
        assert_eq!(app.view(), View::Login);
    }

    #[tokio::test]
    async fn challenge_start_complete_flow() {
        let mut app = signed_in_app().await;

        app.start_challenge(3).await.unwrap();
        assert_eq!(app.view(), View::Challenge(3));
        assert_eq!(app.current_challenge().unwrap().id, 3);

        app.complete_challenge().await.unwrap();
        assert_eq!(app.view(), View::Dashboard);
        assert!(app.progress().current_challenges.is_empty());
        assert_eq!(app.progress().recent_completions[0].challenge_id, 3);
        assert_eq!(app.progress().total_points, 10);
        assert_eq!(
            app.take_notices(),
            [Notice::ChallengeCompleted {
                challenge_id: 3,
                points_earned: 10
            }]
        );
    }

    #[tokio::test]
    async fn start_navigates_even_when_api_fails() {
        let mut app = signed_in_app().await;
        app.backend.state.lock().unwrap().fail_start = true;

        app.start_challenge(2).await.unwrap();
        assert_eq!(app.view(), View::Challenge(2));

        // Nothing was started server side, so completion fails and the view stays.
        assert!(app.complete_challenge().await.is_err());
        assert_eq!(app.view(), View::Challenge(2));

        app.back();
        assert_eq!(app.view(), View::Dashboard);
    }

    #[tokio::test]
    async fn unknown_challenge_is_refused() {
        let mut app = signed_in_app().await;
        assert!(matches!(
            app.start_challenge(42).await,
            Err(ClientError::UnknownChallenge(42))
        ));
        assert_eq!(app.view(), View::Dashboard);
    }

    #[tokio::test]
    async fn logout_clears_everything() {
        let mut app = signed_in_app().await;
        app.start_challenge(1).await.unwrap();

        app.logout().await.unwrap();
        assert_eq!(app.view(), View::Login);
        assert!(!app.is_authenticated());
        assert!(app.user().is_none());
        assert!(app.mood_history().is_empty());
        assert_eq!(app.session.load().await.unwrap(), None);
    }
}
