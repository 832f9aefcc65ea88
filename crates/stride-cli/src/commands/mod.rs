pub mod activity;
pub mod analysis;
pub mod dispatch;
pub mod entry;
pub mod goal;
pub mod phase;
pub mod settings;
pub mod shared;
