use crate::rooms::{ControlAction, RoomError};
use crate::AppState;
use axum::{extract::State, response::Response, Json};
use serde::Deserialize;
use std::sync::Arc;

/// A button press or modal submit relayed by the platform. Buttons carry the
/// room in their custom id (`room:<verb>:<channel_id>`); modal submits also
/// carry a value (the new name, or the user to kick).
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentInteraction {
    pub user_id: String,
    pub user_name: String,
    pub guild_id: String,
    pub custom_id: String,
    #[serde(default)]
    pub value: Option<String>,
}

/// What a component interaction asks for.
#[derive(Debug, PartialEq, Eq)]
enum SurfaceAction {
    Create,
    Control { action: ControlAction, channel_id: String },
}

fn parse_custom_id(custom_id: &str, value: Option<&str>) -> Option<SurfaceAction> {
    let mut parts = custom_id.splitn(3, ':');
    if parts.next()? != "room" {
        return None;
    }
    let verb = parts.next()?;
    if verb == "create" {
        return Some(SurfaceAction::Create);
    }
    let channel_id = parts.next()?.to_string();
    let action = match verb {
        "lock" => ControlAction::Lock,
        "unlock" => ControlAction::Unlock,
        "rename" => ControlAction::Rename {
            name: value.unwrap_or_default().to_string(),
        },
        "kick" => ControlAction::Kick {
            target: value.unwrap_or_default().to_string(),
        },
        "end" => ControlAction::End,
        _ => return None,
    };
    Some(SurfaceAction::Control { action, channel_id })
}

pub async fn handle_component(
    State(state): State<Arc<AppState>>,
    Json(interaction): Json<ComponentInteraction>,
) -> Response {
    tracing::info!(
        "component {} from user {} in guild {}",
        interaction.custom_id,
        interaction.user_id,
        interaction.guild_id
    );

    let parsed = parse_custom_id(&interaction.custom_id, interaction.value.as_deref());
    let (result, operation, channel_id) = match parsed {
        Some(SurfaceAction::Create) => (
            state
                .controller
                .create_room(
                    &interaction.user_id,
                    &interaction.user_name,
                    &interaction.guild_id,
                )
                .await
                .map(|channel| format!("Room created: {}.", channel.name)),
            "create".to_string(),
            String::new(),
        ),
        Some(SurfaceAction::Control { action, channel_id }) => {
            let verb = action.verb().to_string();
            let result = state
                .controller
                .execute(action, &interaction.user_id, &channel_id)
                .await
                .map(|_| "Done.".to_string());
            (result, verb, channel_id)
        }
        None => (
            Err(RoomError::ValidationFailed(
                "Unrecognized control.".to_string(),
            )),
            "unknown".to_string(),
            String::new(),
        ),
    };

    super::render(result, &operation, &channel_id)
}
