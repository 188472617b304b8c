pub mod accounts;
pub mod auction;
pub mod bidding;
pub mod clock;
pub mod config;
pub mod database;
pub mod error;
pub mod message_broker;
pub mod query;
pub mod scheduler;
pub mod seed;
pub mod service;
pub mod store;

pub use accounts::{AccountService, RequestContext, Role};
pub use error::AuctionError;
pub use service::AuctionService;
