use super::error::PlatformError;
use super::types::{Channel, Member, OverwritePayload, PermissionOverwrite, PermissionSubject, Permissions};
use super::Platform;
use reqwest::{Client, Response, StatusCode};
use serde_json::json;

/// REST client for the chat platform API, authenticated with the bot token.
#[derive(Clone)]
pub struct RestPlatformClient {
    client: Client,
    base_url: String,
    bot_token: String,
    bot_user_id: String,
}

impl RestPlatformClient {
    pub fn new(base_url: String, bot_token: String, bot_user_id: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            bot_token,
            bot_user_id,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn auth(&self) -> String {
        format!("Bearer {}", self.bot_token)
    }

    /// Map an HTTP response to the error taxonomy. 403 is a permission loss,
    /// 404 is the object being gone; everything else non-2xx is an API error.
    async fn check(&self, response: Response, what: &str) -> Result<Response, PlatformError> {
        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::FORBIDDEN => Err(PlatformError::Forbidden(what.to_string())),
            StatusCode::NOT_FOUND => Err(PlatformError::NotFound),
            status => {
                let message = response.text().await.unwrap_or_default();
                Err(PlatformError::Api {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }

    async fn create_channel(
        &self,
        guild_id: &str,
        body: serde_json::Value,
        what: &str,
    ) -> Result<Channel, PlatformError> {
        let response = self
            .client
            .post(self.url(&format!("/guilds/{}/channels", guild_id)))
            .header("Authorization", self.auth())
            .json(&body)
            .send()
            .await?;
        let response = self.check(response, what).await?;
        Ok(response.json::<Channel>().await?)
    }
}

impl Platform for RestPlatformClient {
    fn bot_user_id(&self) -> &str {
        &self.bot_user_id
    }

    async fn ping(&self) -> Result<(), PlatformError> {
        let response = self
            .client
            .get(self.url("/users/@me"))
            .header("Authorization", self.auth())
            .send()
            .await?;
        self.check(response, "ping").await?;
        Ok(())
    }

    async fn get_channel(&self, channel_id: &str) -> Result<Option<Channel>, PlatformError> {
        let response = self
            .client
            .get(self.url(&format!("/channels/{}", channel_id)))
            .header("Authorization", self.auth())
            .send()
            .await?;
        match self.check(response, "get channel").await {
            Ok(response) => Ok(Some(response.json::<Channel>().await?)),
            Err(PlatformError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn list_guild_channels(&self, guild_id: &str) -> Result<Vec<Channel>, PlatformError> {
        let response = self
            .client
            .get(self.url(&format!("/guilds/{}/channels", guild_id)))
            .header("Authorization", self.auth())
            .send()
            .await?;
        let response = self.check(response, "list channels").await?;
        Ok(response.json::<Vec<Channel>>().await?)
    }

    async fn create_voice_channel(
        &self,
        guild_id: &str,
        name: &str,
        parent_id: Option<&str>,
        overwrites: &[PermissionOverwrite],
    ) -> Result<Channel, PlatformError> {
        let overwrites: Vec<OverwritePayload> = overwrites.iter().map(Into::into).collect();
        self.create_channel(
            guild_id,
            json!({
                "name": name,
                "kind": "voice",
                "parent_id": parent_id,
                "permission_overwrites": overwrites,
            }),
            "create voice channel",
        )
        .await
    }

    async fn create_category(&self, guild_id: &str, name: &str) -> Result<Channel, PlatformError> {
        self.create_channel(
            guild_id,
            json!({ "name": name, "kind": "category" }),
            "create category",
        )
        .await
    }

    async fn create_text_channel(
        &self,
        guild_id: &str,
        name: &str,
        overwrites: &[PermissionOverwrite],
    ) -> Result<Channel, PlatformError> {
        let overwrites: Vec<OverwritePayload> = overwrites.iter().map(Into::into).collect();
        self.create_channel(
            guild_id,
            json!({
                "name": name,
                "kind": "text",
                "permission_overwrites": overwrites,
            }),
            "create text channel",
        )
        .await
    }

    async fn delete_channel(&self, channel_id: &str) -> Result<(), PlatformError> {
        let response = self
            .client
            .delete(self.url(&format!("/channels/{}", channel_id)))
            .header("Authorization", self.auth())
            .send()
            .await?;
        match self.check(response, "delete channel").await {
            Ok(_) => Ok(()),
            // Already gone: the other deleter won the race.
            Err(PlatformError::NotFound) => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn rename_channel(&self, channel_id: &str, name: &str) -> Result<(), PlatformError> {
        let response = self
            .client
            .patch(self.url(&format!("/channels/{}", channel_id)))
            .header("Authorization", self.auth())
            .json(&json!({ "name": name }))
            .send()
            .await?;
        self.check(response, "rename channel").await?;
        Ok(())
    }

    async fn set_permission(
        &self,
        channel_id: &str,
        subject: &PermissionSubject,
        allow: Permissions,
        deny: Permissions,
    ) -> Result<(), PlatformError> {
        let response = self
            .client
            .put(self.url(&format!("/channels/{}/permissions/{}", channel_id, subject.key())))
            .header("Authorization", self.auth())
            .json(&json!({ "allow": allow.bits(), "deny": deny.bits() }))
            .send()
            .await?;
        self.check(response, "set permission").await?;
        Ok(())
    }

    async fn clear_permission(
        &self,
        channel_id: &str,
        subject: &PermissionSubject,
    ) -> Result<(), PlatformError> {
        let response = self
            .client
            .delete(self.url(&format!("/channels/{}/permissions/{}", channel_id, subject.key())))
            .header("Authorization", self.auth())
            .send()
            .await?;
        match self.check(response, "clear permission").await {
            Ok(_) => Ok(()),
            Err(PlatformError::NotFound) => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn channel_members(&self, channel_id: &str) -> Result<Vec<Member>, PlatformError> {
        let response = self
            .client
            .get(self.url(&format!("/channels/{}/members", channel_id)))
            .header("Authorization", self.auth())
            .send()
            .await?;
        let response = self.check(response, "list members").await?;
        Ok(response.json::<Vec<Member>>().await?)
    }

    async fn disconnect_member(&self, guild_id: &str, user_id: &str) -> Result<(), PlatformError> {
        let response = self
            .client
            .post(self.url(&format!("/guilds/{}/members/{}/disconnect", guild_id, user_id)))
            .header("Authorization", self.auth())
            .send()
            .await?;
        self.check(response, "disconnect member").await?;
        Ok(())
    }

    async fn create_thread(&self, channel_id: &str, name: &str) -> Result<Channel, PlatformError> {
        let response = self
            .client
            .post(self.url(&format!("/channels/{}/threads", channel_id)))
            .header("Authorization", self.auth())
            .json(&json!({ "name": name }))
            .send()
            .await?;
        let response = self.check(response, "create thread").await?;
        Ok(response.json::<Channel>().await?)
    }

    async fn post_message(&self, channel_id: &str, text: &str) -> Result<(), PlatformError> {
        let response = self
            .client
            .post(self.url(&format!("/channels/{}/messages", channel_id)))
            .header("Authorization", self.auth())
            .json(&json!({ "content": text }))
            .send()
            .await?;
        self.check(response, "post message").await?;
        Ok(())
    }

    async fn send_dm(&self, user_id: &str, text: &str) -> Result<(), PlatformError> {
        let response = self
            .client
            .post(self.url(&format!("/users/{}/messages", user_id)))
            .header("Authorization", self.auth())
            .json(&json!({ "content": text }))
            .send()
            .await?;
        self.check(response, "send dm").await?;
        Ok(())
    }
}
