pub mod alerts;
pub mod chat;
pub mod dashboard;
pub mod detection;
pub mod reports;
pub mod upload;
