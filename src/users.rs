use serde::Deserialize;
use serde_json::{Value, json};

use crate::client::ApiClient;
use crate::error::{ApiError, ApiResult};
use crate::session::Credentials;
use crate::stories::Story;

/// The signed-in identity, with the token that authenticates it.
///
/// The server's user record never contains the token; it arrives beside
/// the record (signup, login) or from the saved session (restore), and
/// construction takes both together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub username: String,
    /// Display name, used as the author line on posted stories.
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
    /// Opaque bearer credential. Sent verbatim, never inspected.
    pub login_token: String,
    pub favorites: Vec<Story>,
    pub own_stories: Vec<Story>,
}

/// Server-side user record. Signup responses omit both story arrays.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserPayload {
    username: String,
    name: String,
    created_at: String,
    updated_at: String,
    #[serde(default)]
    favorites: Vec<Story>,
    #[serde(default)]
    stories: Vec<Story>,
}

#[derive(Debug, Deserialize)]
struct AuthEnvelope {
    user: UserPayload,
    token: String,
}

#[derive(Debug, Deserialize)]
struct UserEnvelope {
    user: UserPayload,
}

impl User {
    fn from_payload(payload: UserPayload, login_token: String) -> User {
        User {
            username: payload.username,
            name: payload.name,
            created_at: payload.created_at,
            updated_at: payload.updated_at,
            login_token,
            favorites: payload.favorites,
            own_stories: payload.stories,
        }
    }

    fn credentials(&self) -> Credentials {
        Credentials {
            token: self.login_token.clone(),
            username: self.username.clone(),
        }
    }

    /// Register a new account and persist its session.
    ///
    /// The returned user has empty `favorites` and `own_stories`; the
    /// server does not echo them at signup.
    pub async fn signup(
        client: &ApiClient,
        username: &str,
        password: &str,
        name: &str,
    ) -> ApiResult<User> {
        let url = client.endpoint(&["signup"])?;
        let body = json!({
            "user": {
                "username": username,
                "password": password,
                "name": name,
            },
        });
        let envelope: AuthEnvelope = client.post(url, &body).await?;
        let user = User::from_payload(envelope.user, envelope.token);
        client.session().save(&user.credentials())?;
        Ok(user)
    }

    /// Authenticate an existing account and persist its session.
    pub async fn login(client: &ApiClient, username: &str, password: &str) -> ApiResult<User> {
        let url = client.endpoint(&["login"])?;
        let body = json!({
            "user": {
                "username": username,
                "password": password,
            },
        });
        let envelope: AuthEnvelope = client.post(url, &body).await?;
        let user = User::from_payload(envelope.user, envelope.token);
        client.session().save(&user.credentials())?;
        Ok(user)
    }

    /// Rebuild the signed-in user from the stored session.
    ///
    /// Re-fetches the user's record with the stored token, so a revoked
    /// token fails here like any other rejected request. With nothing
    /// stored this returns [`ApiError::MissingSession`] without touching
    /// the network.
    pub async fn restore_session(client: &ApiClient) -> ApiResult<User> {
        let Some(credentials) = client.session().load()? else {
            return Err(ApiError::MissingSession);
        };
        tracing::debug!("restoring session for {}", credentials.username);
        let url = client.endpoint(&["users", &credentials.username])?;
        let query = [("token", credentials.token.as_str())];
        let envelope: UserEnvelope = client.get(url, &query).await?;
        Ok(User::from_payload(envelope.user, credentials.token))
    }

    /// Mark `story_id` as a favorite of this user.
    ///
    /// Returns the server's response untouched; the local `favorites`
    /// list is not updated. Repeating the call for an already-favorited
    /// story is server-defined behavior.
    pub async fn add_favorite(&self, client: &ApiClient, story_id: &str) -> ApiResult<Value> {
        let url = client.endpoint(&["users", &self.username, "favorites", story_id])?;
        let body = json!({ "token": self.login_token });
        client.post(url, &body).await
    }

    /// Drop `story_id` from this user's favorites.
    ///
    /// Returns the server's response untouched, like [`User::add_favorite`].
    pub async fn remove_favorite(&self, client: &ApiClient, story_id: &str) -> ApiResult<Value> {
        let url = client.endpoint(&["users", &self.username, "favorites", story_id])?;
        let body = json!({ "token": self.login_token });
        client.delete(url, &body).await
    }
}
