// TCP client for connecting to the multiplayer relay.
//
// Provides a non-blocking interface for a game thread to communicate with
// the relay server. Architecture:
// - `connect()` performs the TCP connect on the calling thread, then spawns
//   a background reader thread. There is no handshake — the caller announces
//   itself by sending `UpdatePlayer`.
// - The reader thread calls `read_frame()` in a loop, decodes a `Message`,
//   and pushes into an `mpsc` channel.
// - The owning thread holds a `BufWriter<TcpStream>` for sending.
// - `poll()` drains the inbox non-blocking; `recv_timeout()` blocks for a
//   bounded wait when the caller has nothing better to do.
//
// This separation ensures the owning thread never blocks on network reads.
// The reader thread handles the blocking reads, and the writer flushes
// synchronously (acceptable for the small messages we send).
//
// This module lives in the relay crate because it is purely std TCP +
// protocol framing + mpsc, making it available to the client session crate
// and to integration tests alike.

use std::io::{BufReader, BufWriter};
use std::net::{Shutdown, TcpStream};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tycoon_protocol::framing::{read_frame, write_frame};
use tycoon_protocol::message::Message;

/// TCP client for relay communication.
pub struct NetClient {
    writer: BufWriter<TcpStream>,
    inbox: Receiver<Message>,
    _reader_thread: Option<JoinHandle<()>>,
}

impl NetClient {
    /// Connect to a relay server and spawn a reader thread.
    pub fn connect(addr: &str) -> Result<Self, String> {
        let stream = TcpStream::connect(addr).map_err(|e| format!("connect failed: {e}"))?;

        let reader_stream = stream
            .try_clone()
            .map_err(|e| format!("clone failed: {e}"))?;
        let writer = BufWriter::new(stream);
        let reader = BufReader::new(reader_stream);

        let (tx, rx) = mpsc::channel();
        let reader_thread = thread::spawn(move || {
            reader_loop(reader, tx);
        });

        Ok(Self {
            writer,
            inbox: rx,
            _reader_thread: Some(reader_thread),
        })
    }

    /// Send a message to the relay.
    pub fn send(&mut self, msg: &Message) -> Result<(), String> {
        write_frame(&mut self.writer, &msg.encode()).map_err(|e| format!("send failed: {e}"))
    }

    /// Drain all queued relay messages (non-blocking).
    pub fn poll(&self) -> Vec<Message> {
        let mut messages = Vec::new();
        while let Ok(msg) = self.inbox.try_recv() {
            messages.push(msg);
        }
        messages
    }

    /// Wait up to `timeout` for the next relay message. Returns `None` on
    /// timeout or when the connection has closed.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Message> {
        match self.inbox.recv_timeout(timeout) {
            Ok(msg) => Some(msg),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Close the connection. The reader thread notices the shutdown and
    /// exits.
    pub fn disconnect(&mut self) {
        let _ = self.writer.get_ref().shutdown(Shutdown::Both);
    }
}

/// Reader thread: read framed messages in a loop, push to channel.
fn reader_loop(mut reader: BufReader<TcpStream>, tx: mpsc::Sender<Message>) {
    while let Ok(bytes) = read_frame(&mut reader) {
        match Message::decode(&bytes) {
            Ok(msg) => {
                if tx.send(msg).is_err() {
                    break; // Owning thread dropped the receiver
                }
            }
            Err(_) => break, // Malformed message
        }
    }
}
