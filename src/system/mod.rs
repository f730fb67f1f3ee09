pub mod collector;
pub mod history;
pub mod kill;
pub mod maintenance;
pub mod network;
pub mod platform;
pub mod process;
pub mod snapshot;
