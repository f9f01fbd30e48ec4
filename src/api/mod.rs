// HTTP endpoint layer

pub mod analytics;
pub mod server;

pub use analytics::AnalyticsReport;
pub use server::{PriceApiServer, HEALTH_MESSAGE};
