//! Routing of raised alerts into the dashboard feeds.

pub mod router;

pub use router::FeedRouter;
