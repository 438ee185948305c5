use crate::events::AppEvent;
use async_channel::Sender;
use spindle::protocol::{Reply, Request};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};

pub async fn run_server(socket_path: PathBuf, tx: Sender<AppEvent>) {
    // Cleanup old socket if it exists
    if fs_err::metadata(&socket_path).is_ok() {
        let _ = fs_err::remove_file(&socket_path);
    }

    let listener = match UnixListener::bind(&socket_path) {
        Ok(l) => l,
        Err(e) => {
            log::error!("Failed to bind unix socket {}: {}", socket_path.display(), e);
            return;
        }
    };
    log::info!("Listening on {}", socket_path.display());

    loop {
        match listener.accept().await {
            Ok((stream, _)) => {
                let tx = tx.clone();
                tokio::spawn(async move {
                    serve_connection(stream, tx).await;
                });
            }
            Err(e) => {
                log::error!("Failed to accept connection: {}", e);
            }
        }
    }
}

pub fn remove_socket(socket_path: &Path) {
    if let Err(e) = fs_err::remove_file(socket_path) {
        log::debug!("Could not remove socket: {}", e);
    }
}

async fn serve_connection(stream: UnixStream, tx: Sender<AppEvent>) {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        if line.trim().is_empty() {
            continue;
        }
        let reply = match line.parse::<Request>() {
            Ok(request) => dispatch(&tx, request).await,
            Err(e) => Reply::error(e),
        };
        let encoded = match reply.to_line() {
            Ok(encoded) => encoded,
            Err(e) => {
                log::error!("Failed to encode reply: {}", e);
                break;
            }
        };
        if writer.write_all(format!("{}\n", encoded).as_bytes()).await.is_err() {
            break;
        }
    }
}

/// Hands a request to the app loop and waits for its answer.
pub async fn dispatch(tx: &Sender<AppEvent>, request: Request) -> Reply {
    let (reply_tx, reply_rx) = async_channel::bounded(1);
    let event = AppEvent::Command {
        request,
        reply: reply_tx,
    };
    if tx.send(event).await.is_err() {
        return Reply::error("whirl is shutting down");
    }
    reply_rx
        .recv()
        .await
        .unwrap_or_else(|_| Reply::error("request was dropped"))
}
