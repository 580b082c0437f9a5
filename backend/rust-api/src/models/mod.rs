pub mod content;
pub mod games;
pub mod gamification;
pub mod interpret;
pub mod progress;
pub mod session;
pub mod settings;
