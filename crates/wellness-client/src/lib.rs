//! Client side of the wellness tracker: the HTTP client, durable session
//! token storage, the mood slider model and the view state machine that a
//! front end drives.

pub mod api;
pub mod app;
pub mod error;
pub mod mood;
pub mod session;

pub use api::{ApiClient, Backend};
pub use app::{App, Notice, View};
pub use error::ClientError;
pub use mood::MoodLevel;
pub use session::SessionStore;
