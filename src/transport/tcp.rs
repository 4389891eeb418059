use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::time::{timeout, Duration, Instant};

use crate::protocol::Message;
use crate::transport::Transport;

/// Default timeout for a single send (30 seconds).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum frame size (1 MB) to prevent excessive memory allocation.
const MAX_MESSAGE_SIZE: u32 = 1_000_000;

/// Default idle timeout before considering the connection dead (5 minutes).
const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(300);

const LEN_PREFIX: usize = 4;

/// Length-prefixed bincode frames over TCP: a big-endian `u32` length
/// followed by the serialized [`Message`].
pub struct TcpTransport {
    stream: TcpStream,
    buffer: Vec<u8>,
    timeout_duration: Duration,
    max_message_size: u32,
    idle_timeout: Duration,
    last_activity: Instant,
}

impl TcpTransport {
    pub fn new(stream: TcpStream) -> Self {
        Self::with_config(stream, DEFAULT_TIMEOUT, MAX_MESSAGE_SIZE, DEFAULT_IDLE_TIMEOUT)
    }

    pub fn with_config(
        stream: TcpStream,
        timeout_duration: Duration,
        max_message_size: u32,
        idle_timeout: Duration,
    ) -> Self {
        Self {
            stream,
            buffer: Vec::new(),
            timeout_duration,
            max_message_size,
            idle_timeout,
            last_activity: Instant::now(),
        }
    }

    pub fn with_idle_timeout(stream: TcpStream, idle_timeout: Duration) -> Self {
        Self::with_config(stream, DEFAULT_TIMEOUT, MAX_MESSAGE_SIZE, idle_timeout)
    }

    pub async fn connect<A: ToSocketAddrs>(addr: A) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        Ok(Self::new(stream))
    }

    pub fn peer_addr(&self) -> anyhow::Result<std::net::SocketAddr> {
        Ok(self.stream.peer_addr()?)
    }

    fn mark_activity(&mut self) {
        self.last_activity = Instant::now();
    }

    /// Pop one complete frame off the read buffer, if there is one.
    fn take_frame(&mut self) -> anyhow::Result<Option<Message>> {
        if self.buffer.len() < LEN_PREFIX {
            return Ok(None);
        }
        let mut len_buf = [0u8; LEN_PREFIX];
        len_buf.copy_from_slice(&self.buffer[..LEN_PREFIX]);
        let len = u32::from_be_bytes(len_buf);

        if len == 0 {
            return Err(anyhow::anyhow!("Invalid message length: 0"));
        }
        if len > self.max_message_size {
            return Err(anyhow::anyhow!(
                "Message too large: {} bytes (max: {})",
                len,
                self.max_message_size
            ));
        }
        let end = LEN_PREFIX + len as usize;
        if self.buffer.len() < end {
            return Ok(None);
        }
        let msg = bincode::deserialize(&self.buffer[LEN_PREFIX..end])
            .map_err(|e| anyhow::anyhow!("Deserialization error: {}", e))?;
        self.buffer.drain(..end);
        Ok(Some(msg))
    }
}

fn map_io_error(e: std::io::Error) -> anyhow::Error {
    match e.kind() {
        std::io::ErrorKind::BrokenPipe | std::io::ErrorKind::ConnectionReset => {
            anyhow::anyhow!("Connection closed by peer")
        }
        _ => anyhow::anyhow!("I/O error: {}", e),
    }
}

#[async_trait::async_trait]
impl Transport for TcpTransport {
    async fn send(&mut self, msg: Message) -> anyhow::Result<()> {
        let data =
            bincode::serialize(&msg).map_err(|e| anyhow::anyhow!("Serialization error: {}", e))?;
        if data.len() as u64 > self.max_message_size as u64 {
            return Err(anyhow::anyhow!(
                "Message too large: {} bytes (max: {})",
                data.len(),
                self.max_message_size
            ));
        }
        let mut frame = Vec::with_capacity(LEN_PREFIX + data.len());
        frame.extend_from_slice(&(data.len() as u32).to_be_bytes());
        frame.extend_from_slice(&data);

        timeout(self.timeout_duration, self.stream.write_all(&frame))
            .await
            .map_err(|_| anyhow::anyhow!("Send timeout after {:?}", self.timeout_duration))?
            .map_err(map_io_error)?;
        self.mark_activity();
        Ok(())
    }

    // Reads go through `self.buffer` so a cancelled call keeps any partial
    // frame for the next one.
    async fn recv(&mut self) -> anyhow::Result<Message> {
        loop {
            if let Some(msg) = self.take_frame()? {
                self.mark_activity();
                return Ok(msg);
            }
            let remaining = self.idle_timeout.saturating_sub(self.last_activity.elapsed());
            if remaining.is_zero() {
                return Err(anyhow::anyhow!("Connection idle timeout exceeded"));
            }
            let mut chunk = [0u8; 4096];
            let n = match timeout(remaining, self.stream.read(&mut chunk)).await {
                Ok(read) => read.map_err(map_io_error)?,
                Err(_) => return Err(anyhow::anyhow!("Connection idle timeout exceeded")),
            };
            if n == 0 {
                return Err(anyhow::anyhow!("Connection closed by peer"));
            }
            self.buffer.extend_from_slice(&chunk[..n]);
        }
    }
}
