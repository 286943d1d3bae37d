pub mod health_routes;
pub mod upload_routes;

pub use health_routes::*;
pub use upload_routes::*;
