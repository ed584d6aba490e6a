use axum::Router;

pub mod customer;

pub fn pages_router() -> Router {
    customer::customer_router()
}
