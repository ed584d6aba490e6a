mod data;
pub mod index;
mod interaction;
mod reminder;

use axum::Router;

use self::{data::data_router, interaction::interaction_router, reminder::reminder_router};

pub fn customer_router() -> Router {
    index::index_router()
        .merge(interaction_router())
        .merge(reminder_router())
        .merge(data_router())
}
