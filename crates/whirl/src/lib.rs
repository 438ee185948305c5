pub mod app;
pub mod config;
pub mod events;

pub mod sys {
    pub mod frames;
    pub mod runtime;
    pub mod server;
}
