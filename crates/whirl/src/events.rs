use async_channel::Sender;
use spindle::protocol::{Reply, Request};

#[derive(Debug, Clone)]
pub enum AppEvent {
    Command {
        request: Request,
        reply: Sender<Reply>,
    },
    ConfigReload,
}
