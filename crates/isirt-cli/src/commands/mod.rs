pub mod audit;
pub mod classification;
pub mod groups;
pub mod incidents;
pub mod intake;
pub mod session;
pub mod settings;
pub mod users;
