use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Channel permission bits, as the platform API encodes them.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Permissions: u64 {
        const VIEW_CHANNEL       = 1 << 0;
        const CONNECT            = 1 << 1;
        const SPEAK              = 1 << 2;
        const STREAM             = 1 << 3;
        const SEND_MESSAGES      = 1 << 4;
        const MANAGE_CHANNELS    = 1 << 5;
        const MANAGE_PERMISSIONS = 1 << 6;
        const MOVE_MEMBERS       = 1 << 7;
    }
}

/// Who a permission overwrite applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionSubject {
    /// The guild-wide default group.
    Everyone,
    Member(String),
}

impl PermissionSubject {
    /// Path segment the API addresses this subject by.
    pub fn key(&self) -> &str {
        match self {
            PermissionSubject::Everyone => "everyone",
            PermissionSubject::Member(id) => id,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PermissionOverwrite {
    pub subject: PermissionSubject,
    pub allow: Permissions,
    pub deny: Permissions,
}

impl PermissionOverwrite {
    pub fn allow(subject: PermissionSubject, allow: Permissions) -> Self {
        Self {
            subject,
            allow,
            deny: Permissions::empty(),
        }
    }

    pub fn deny(subject: PermissionSubject, deny: Permissions) -> Self {
        Self {
            subject,
            allow: Permissions::empty(),
            deny,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    Voice,
    Text,
    Category,
    Thread,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
    pub kind: ChannelKind,
    pub guild_id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub bot: bool,
}

/// Wire shape of an overwrite in channel-creation payloads.
#[derive(Debug, Serialize)]
pub struct OverwritePayload {
    pub subject: String,
    pub allow: u64,
    pub deny: u64,
}

impl From<&PermissionOverwrite> for OverwritePayload {
    fn from(overwrite: &PermissionOverwrite) -> Self {
        Self {
            subject: overwrite.subject.key().to_string(),
            allow: overwrite.allow.bits(),
            deny: overwrite.deny.bits(),
        }
    }
}
