//! In-memory platform double for controller and sweep tests.

use super::error::PlatformError;
use super::types::{Channel, ChannelKind, Member, PermissionOverwrite, PermissionSubject, Permissions};
use super::Platform;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct FakePlatform {
    inner: Arc<Mutex<FakeState>>,
}

#[derive(Default)]
struct FakeState {
    channels: HashMap<String, FakeChannel>,
    next_id: u64,
    forbid_create: bool,
    fail_threads: bool,
    fail_dms: bool,
    fail_get: HashSet<String>,
    fail_delete: HashSet<String>,
    deleted: Vec<String>,
    dms: Vec<(String, String)>,
    messages: Vec<(String, String)>,
    disconnects: Vec<(String, String)>,
}

struct FakeChannel {
    channel: Channel,
    members: Vec<Member>,
    overwrites: HashMap<String, (Permissions, Permissions)>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    fn fresh_id(state: &mut FakeState, prefix: &str) -> String {
        state.next_id += 1;
        format!("{}{}", prefix, state.next_id)
    }

    fn insert_channel(state: &mut FakeState, channel: Channel) -> Channel {
        state.channels.insert(
            channel.id.clone(),
            FakeChannel {
                channel: channel.clone(),
                members: Vec::new(),
                overwrites: HashMap::new(),
            },
        );
        channel
    }

    // ---- test setup / inspection ----

    pub fn seed_voice_channel(&self, channel_id: &str, guild_id: &str, name: &str) {
        let mut state = self.inner.lock().unwrap();
        let channel = Channel {
            id: channel_id.to_string(),
            name: name.to_string(),
            kind: ChannelKind::Voice,
            guild_id: guild_id.to_string(),
            parent_id: None,
        };
        Self::insert_channel(&mut state, channel);
    }

    pub fn set_members(&self, channel_id: &str, members: Vec<Member>) {
        let mut state = self.inner.lock().unwrap();
        if let Some(entry) = state.channels.get_mut(channel_id) {
            entry.members = members;
        }
    }

    pub fn forbid_create(&self) {
        self.inner.lock().unwrap().forbid_create = true;
    }

    pub fn fail_threads(&self) {
        self.inner.lock().unwrap().fail_threads = true;
    }

    pub fn fail_dms(&self) {
        self.inner.lock().unwrap().fail_dms = true;
    }

    pub fn fail_get(&self, channel_id: &str) {
        self.inner.lock().unwrap().fail_get.insert(channel_id.to_string());
    }

    pub fn fail_delete(&self, channel_id: &str) {
        self.inner.lock().unwrap().fail_delete.insert(channel_id.to_string());
    }

    pub fn channel_exists(&self, channel_id: &str) -> bool {
        self.inner.lock().unwrap().channels.contains_key(channel_id)
    }

    pub fn deleted_channels(&self) -> Vec<String> {
        self.inner.lock().unwrap().deleted.clone()
    }

    pub fn dms(&self) -> Vec<(String, String)> {
        self.inner.lock().unwrap().dms.clone()
    }

    pub fn messages(&self) -> Vec<(String, String)> {
        self.inner.lock().unwrap().messages.clone()
    }

    pub fn disconnects(&self) -> Vec<(String, String)> {
        self.inner.lock().unwrap().disconnects.clone()
    }

    pub fn overwrite_for(&self, channel_id: &str, subject: &PermissionSubject) -> Option<(Permissions, Permissions)> {
        let state = self.inner.lock().unwrap();
        state
            .channels
            .get(channel_id)
            .and_then(|entry| entry.overwrites.get(subject.key()).copied())
    }

    pub fn channel_name(&self, channel_id: &str) -> Option<String> {
        let state = self.inner.lock().unwrap();
        state.channels.get(channel_id).map(|entry| entry.channel.name.clone())
    }

    pub fn threads_under(&self, channel_id: &str) -> usize {
        let state = self.inner.lock().unwrap();
        state
            .channels
            .values()
            .filter(|entry| {
                entry.channel.kind == ChannelKind::Thread
                    && entry.channel.parent_id.as_deref() == Some(channel_id)
            })
            .count()
    }
}

impl Platform for FakePlatform {
    fn bot_user_id(&self) -> &str {
        "BOT"
    }

    async fn ping(&self) -> Result<(), PlatformError> {
        Ok(())
    }

    async fn get_channel(&self, channel_id: &str) -> Result<Option<Channel>, PlatformError> {
        let state = self.inner.lock().unwrap();
        if state.fail_get.contains(channel_id) {
            return Err(PlatformError::Api {
                status: 500,
                message: "injected failure".to_string(),
            });
        }
        Ok(state.channels.get(channel_id).map(|entry| entry.channel.clone()))
    }

    async fn list_guild_channels(&self, guild_id: &str) -> Result<Vec<Channel>, PlatformError> {
        let state = self.inner.lock().unwrap();
        Ok(state
            .channels
            .values()
            .filter(|entry| entry.channel.guild_id == guild_id)
            .map(|entry| entry.channel.clone())
            .collect())
    }

    async fn create_voice_channel(
        &self,
        guild_id: &str,
        name: &str,
        parent_id: Option<&str>,
        overwrites: &[PermissionOverwrite],
    ) -> Result<Channel, PlatformError> {
        let mut state = self.inner.lock().unwrap();
        if state.forbid_create {
            return Err(PlatformError::Forbidden("create voice channel".to_string()));
        }
        let id = Self::fresh_id(&mut state, "C");
        let channel = Channel {
            id: id.clone(),
            name: name.to_string(),
            kind: ChannelKind::Voice,
            guild_id: guild_id.to_string(),
            parent_id: parent_id.map(str::to_string),
        };
        let channel = Self::insert_channel(&mut state, channel);
        let entry = state.channels.get_mut(&id).unwrap();
        for overwrite in overwrites {
            entry
                .overwrites
                .insert(overwrite.subject.key().to_string(), (overwrite.allow, overwrite.deny));
        }
        Ok(channel)
    }

    async fn create_category(&self, guild_id: &str, name: &str) -> Result<Channel, PlatformError> {
        let mut state = self.inner.lock().unwrap();
        if state.forbid_create {
            return Err(PlatformError::Forbidden("create category".to_string()));
        }
        let id = Self::fresh_id(&mut state, "CAT");
        let channel = Channel {
            id,
            name: name.to_string(),
            kind: ChannelKind::Category,
            guild_id: guild_id.to_string(),
            parent_id: None,
        };
        Ok(Self::insert_channel(&mut state, channel))
    }

    async fn create_text_channel(
        &self,
        guild_id: &str,
        name: &str,
        _overwrites: &[PermissionOverwrite],
    ) -> Result<Channel, PlatformError> {
        let mut state = self.inner.lock().unwrap();
        if state.forbid_create {
            return Err(PlatformError::Forbidden("create text channel".to_string()));
        }
        let id = Self::fresh_id(&mut state, "TX");
        let channel = Channel {
            id,
            name: name.to_string(),
            kind: ChannelKind::Text,
            guild_id: guild_id.to_string(),
            parent_id: None,
        };
        Ok(Self::insert_channel(&mut state, channel))
    }

    async fn delete_channel(&self, channel_id: &str) -> Result<(), PlatformError> {
        let mut state = self.inner.lock().unwrap();
        if state.fail_delete.contains(channel_id) {
            return Err(PlatformError::Api {
                status: 500,
                message: "injected delete failure".to_string(),
            });
        }
        if state.channels.remove(channel_id).is_some() {
            // Child threads go with the channel.
            state.channels.retain(|_, entry| {
                entry.channel.parent_id.as_deref() != Some(channel_id)
                    || entry.channel.kind != ChannelKind::Thread
            });
            state.deleted.push(channel_id.to_string());
        }
        // Missing channel: already-gone deletes are success.
        Ok(())
    }

    async fn rename_channel(&self, channel_id: &str, name: &str) -> Result<(), PlatformError> {
        let mut state = self.inner.lock().unwrap();
        match state.channels.get_mut(channel_id) {
            Some(entry) => {
                entry.channel.name = name.to_string();
                Ok(())
            }
            None => Err(PlatformError::NotFound),
        }
    }

    async fn set_permission(
        &self,
        channel_id: &str,
        subject: &PermissionSubject,
        allow: Permissions,
        deny: Permissions,
    ) -> Result<(), PlatformError> {
        let mut state = self.inner.lock().unwrap();
        match state.channels.get_mut(channel_id) {
            Some(entry) => {
                entry.overwrites.insert(subject.key().to_string(), (allow, deny));
                Ok(())
            }
            None => Err(PlatformError::NotFound),
        }
    }

    async fn clear_permission(
        &self,
        channel_id: &str,
        subject: &PermissionSubject,
    ) -> Result<(), PlatformError> {
        let mut state = self.inner.lock().unwrap();
        match state.channels.get_mut(channel_id) {
            Some(entry) => {
                entry.overwrites.remove(subject.key());
                Ok(())
            }
            None => Err(PlatformError::NotFound),
        }
    }

    async fn channel_members(&self, channel_id: &str) -> Result<Vec<Member>, PlatformError> {
        let state = self.inner.lock().unwrap();
        match state.channels.get(channel_id) {
            Some(entry) => Ok(entry.members.clone()),
            None => Err(PlatformError::NotFound),
        }
    }

    async fn disconnect_member(&self, guild_id: &str, user_id: &str) -> Result<(), PlatformError> {
        let mut state = self.inner.lock().unwrap();
        for entry in state.channels.values_mut() {
            if entry.channel.guild_id == guild_id {
                entry.members.retain(|member| member.id != user_id);
            }
        }
        state.disconnects.push((guild_id.to_string(), user_id.to_string()));
        Ok(())
    }

    async fn create_thread(&self, channel_id: &str, name: &str) -> Result<Channel, PlatformError> {
        let mut state = self.inner.lock().unwrap();
        if state.fail_threads {
            return Err(PlatformError::Forbidden("create thread".to_string()));
        }
        if !state.channels.contains_key(channel_id) {
            return Err(PlatformError::NotFound);
        }
        let guild_id = state.channels[channel_id].channel.guild_id.clone();
        let id = Self::fresh_id(&mut state, "T");
        let channel = Channel {
            id,
            name: name.to_string(),
            kind: ChannelKind::Thread,
            guild_id,
            parent_id: Some(channel_id.to_string()),
        };
        Ok(Self::insert_channel(&mut state, channel))
    }

    async fn post_message(&self, channel_id: &str, text: &str) -> Result<(), PlatformError> {
        let mut state = self.inner.lock().unwrap();
        if !state.channels.contains_key(channel_id) {
            return Err(PlatformError::NotFound);
        }
        state.messages.push((channel_id.to_string(), text.to_string()));
        Ok(())
    }

    async fn send_dm(&self, user_id: &str, text: &str) -> Result<(), PlatformError> {
        let mut state = self.inner.lock().unwrap();
        if state.fail_dms {
            return Err(PlatformError::Forbidden("send dm".to_string()));
        }
        state.dms.push((user_id.to_string(), text.to_string()));
        Ok(())
    }
}

pub fn member(id: &str) -> Member {
    Member {
        id: id.to_string(),
        name: id.to_lowercase(),
        bot: false,
    }
}

pub fn bot_member(id: &str) -> Member {
    Member {
        id: id.to_string(),
        name: id.to_lowercase(),
        bot: true,
    }
}
