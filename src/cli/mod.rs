pub mod history;
pub mod news;
pub mod setup;
pub mod snapshot;
pub mod ui;
