pub mod guild_config;
pub mod room;

pub use guild_config::GuildConfig;
pub use room::Room;
