use crate::rooms::{ControlAction, RoomError};
use crate::AppState;
use axum::{extract::State, response::Response, Form};
use serde::Deserialize;
use std::sync::Arc;

/// A `/room` slash command payload as the platform posts it.
#[derive(Debug, Clone, Deserialize)]
pub struct SlashCommand {
    pub user_id: String,
    pub user_name: String,
    pub guild_id: String,
    pub channel_id: String,
    pub command: String,
    pub text: String,
}

impl SlashCommand {
    /// Split "`lock C123`" into `("lock", "C123")`.
    pub fn parse_subcommand(&self) -> (&str, &str) {
        let text = self.text.trim();
        if let Some(space_idx) = text.find(' ') {
            let (cmd, args) = text.split_at(space_idx);
            (cmd, args.trim())
        } else {
            (text, "")
        }
    }
}

/// Main handler for the `/room` slash command. Control verbs act on the
/// channel the command was issued in; `create` provisions a new room.
pub async fn handle_slash_command(
    State(state): State<Arc<AppState>>,
    Form(command): Form<SlashCommand>,
) -> Response {
    tracing::info!(
        "received {} {} from user {} in channel {}",
        command.command,
        command.text,
        command.user_id,
        command.channel_id
    );

    let (subcommand, args) = command.parse_subcommand();

    let result = match subcommand {
        "create" | "" => state
            .controller
            .create_room(&command.user_id, &command.user_name, &command.guild_id)
            .await
            .map(|channel| {
                format!(
                    "Room created: {}. Join the voice channel to start using it!",
                    channel.name
                )
            }),
        "lock" => control(&state, ControlAction::Lock, &command).await,
        "unlock" => control(&state, ControlAction::Unlock, &command).await,
        "rename" => {
            control(
                &state,
                ControlAction::Rename {
                    name: args.to_string(),
                },
                &command,
            )
            .await
        }
        "kick" => {
            control(
                &state,
                ControlAction::Kick {
                    target: args.to_string(),
                },
                &command,
            )
            .await
        }
        "end" => control(&state, ControlAction::End, &command).await,
        _ => Err(RoomError::ValidationFailed(format!(
            "Unknown command `{}`. Try create, lock, unlock, rename, kick or end.",
            subcommand
        ))),
    };

    super::render(result, subcommand, &command.channel_id)
}

async fn control(
    state: &Arc<AppState>,
    action: ControlAction,
    command: &SlashCommand,
) -> Result<String, RoomError> {
    let verb = action.verb();
    state
        .controller
        .execute(action, &command.user_id, &command.channel_id)
        .await
        .map(|_| confirmation(verb))
}

fn confirmation(verb: &str) -> String {
    match verb {
        "lock" => "Room locked!".to_string(),
        "unlock" => "Room unlocked!".to_string(),
        "rename" => "Room renamed.".to_string(),
        "kick" => "User kicked from the room.".to_string(),
        "end" => "Room deleted.".to_string(),
        _ => "Done.".to_string(),
    }
}
