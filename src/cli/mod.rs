pub mod history;
pub mod prices;
pub mod setup;
pub mod ui;
