use std::io;
use std::net::TcpListener;
use std::ops::Deref;
use std::sync::{mpsc, Arc, Mutex, RwLock};
use std::thread;
use tracing::{error, info, warn};

use crate::io::NetworkDocument;
use crate::rpc::rpc_handler::handle_connection;
use crate::rpc::rpc_functions::SharedNetwork;

/// Serves JSON-RPC requests on `listen_at`.
///
/// Accepted connections go into a queue of `queue_size` entries that
/// `threads` workers take them from; connections arriving while the queue is
/// full are dropped. Only returns if the listener cannot be set up.
pub fn start_server(listen_at: &str, queue_size: usize, threads: u64) -> io::Result<()> {
    let network: Arc<SharedNetwork> = Arc::new(RwLock::new(Arc::new(NetworkDocument::default())));

    let (sender, receiver) = mpsc::sync_channel(queue_size);
    let protected_receiver = Arc::new(Mutex::new(receiver));
    for worker in 0..threads {
        let rec = protected_receiver.clone();
        let n = network.clone();
        thread::spawn(move || loop {
            let socket = match rec.lock() {
                Ok(receiver) => match receiver.recv() {
                    Ok(socket) => socket,
                    Err(_) => return,
                },
                Err(_) => {
                    error!(worker, "Connection queue lock poisoned");
                    return;
                }
            };
            if let Err(e) = handle_connection(n.deref(), socket) {
                error!(worker, "Error handling connection: {e}");
            }
        });
    }
    let listener = TcpListener::bind(listen_at)?;
    info!(listen_at, queue_size, threads, "Server listening");
    loop {
        match listener.accept() {
            Ok((socket, _)) => {
                if let Err(e) = sender.try_send(socket) {
                    warn!("Queue full: {e}");
                }
            }
            Err(e) => error!("Error accepting connection: {e}"),
        }
    }
}
