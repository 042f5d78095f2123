use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::users::User;

/// One posted item, exactly as the server describes it.
///
/// `story_id` and both timestamps are server-assigned. Timestamps stay
/// verbatim strings: the server's format is not contractual, and records
/// must survive a round trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub author: String,
    pub title: String,
    pub url: String,
    /// Handle of the posting user.
    pub username: String,
    pub story_id: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Caller-supplied fields of a story to be posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStory {
    pub title: String,
    pub url: String,
}

/// Snapshot of the global feed at fetch time. Never synchronized
/// incrementally; fetch again for a fresh view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryList {
    pub stories: Vec<Story>,
}

#[derive(Debug, Deserialize)]
struct StoriesEnvelope {
    stories: Vec<Story>,
}

#[derive(Debug, Deserialize)]
struct StoryEnvelope {
    story: Story,
}

impl StoryList {
    /// Fetch the global story feed. No auth required; server order is kept.
    pub async fn fetch(client: &ApiClient) -> ApiResult<StoryList> {
        let url = client.endpoint(&["stories"])?;
        let envelope: StoriesEnvelope = client.get(url, &[]).await?;
        Ok(StoryList {
            stories: envelope.stories,
        })
    }

    /// Post a new story as `user`, whose display name becomes the author
    /// and whose token signs the request.
    ///
    /// Returns the story the server created, ids and timestamps assigned.
    /// An already-fetched snapshot is not updated; re-fetch to see the new
    /// entry in the feed.
    pub async fn add_story(
        client: &ApiClient,
        user: &User,
        new_story: &NewStory,
    ) -> ApiResult<Story> {
        let url = client.endpoint(&["stories"])?;
        let body = json!({
            "token": user.login_token,
            "story": {
                "author": user.name,
                "title": new_story.title,
                "url": new_story.url,
            },
        });
        let envelope: StoryEnvelope = client.post(url, &body).await?;
        Ok(envelope.story)
    }
}
