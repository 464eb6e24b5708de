pub mod api;
pub mod auth;
pub mod catalog;
pub mod groups;

use serde::Deserialize;

/// Query parameters shared by pages that only render a flash message.
#[derive(Deserialize, Default)]
pub struct FlashQuery {
    pub flash: Option<String>,
}
