mod goal;
mod phase;
mod settings;

pub use goal::GoalCommands;
pub use phase::PhaseCommands;
pub use settings::SettingsCommands;
