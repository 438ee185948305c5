use crate::app::App;
use crate::events::AppEvent;
use crate::sys::frames::FrameClock;
use crate::sys::server;
use async_channel::{Receiver, Sender};
use std::path::PathBuf;
use tokio::runtime::Runtime;

/// Runs the background services and the app loop until Ctrl-C.
pub fn run(
    app: App,
    socket_path: PathBuf,
    frame_interval_ms: u64,
    tx: Sender<AppEvent>,
    rx: Receiver<AppEvent>,
) -> std::io::Result<()> {
    let rt = Runtime::new()?;

    rt.block_on(async {
        {
            let tx = tx.clone();
            let socket_path = socket_path.clone();
            tokio::spawn(async move {
                server::run_server(socket_path, tx).await;
            });
        }

        {
            let tx = tx.clone();
            tokio::spawn(async move {
                crate::config::run_async_watcher(tx).await;
            });
        }
        drop(tx);

        let frames = FrameClock::from_millis(frame_interval_ms);
        tokio::select! {
            _ = app.run(rx, frames) => {}
            _ = shutdown_signal() => log::info!("Shutting down"),
        }
    });

    server::remove_socket(&socket_path);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
