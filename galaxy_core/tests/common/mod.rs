//! Local stand-ins for the infrastructure services the sidecar checks.

#![allow(dead_code)]

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

const SSL_REQUEST_CODE: u32 = 80877103;

/// Port on 127.0.0.1 that nothing listens on.
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

/// Minimal RESP server: answers `PING` with `ping_reply` (a raw RESP frame
/// such as `+PONG\r\n`) and every other command with `+OK`.
pub async fn fake_redis(ping_reply: &'static str) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(serve_redis(stream, ping_reply));
        }
    });

    port
}

async fn serve_redis(stream: TcpStream, ping_reply: &'static str) {
    let mut reader = BufReader::new(stream);

    while let Some(command) = read_resp_command(&mut reader).await {
        let reply = match command.first() {
            Some(name) if name.eq_ignore_ascii_case("PING") => ping_reply,
            _ => "+OK\r\n",
        };
        if reader.get_mut().write_all(reply.as_bytes()).await.is_err() {
            return;
        }
    }
}

async fn read_resp_command(reader: &mut BufReader<TcpStream>) -> Option<Vec<String>> {
    let mut line = String::new();
    if reader.read_line(&mut line).await.ok()? == 0 {
        return None;
    }
    let count: usize = line.trim_end().strip_prefix('*')?.parse().ok()?;

    let mut args = Vec::with_capacity(count);
    for _ in 0..count {
        line.clear();
        reader.read_line(&mut line).await.ok()?;
        let len: usize = line.trim_end().strip_prefix('$')?.parse().ok()?;

        let mut buf = vec![0u8; len + 2];
        reader.read_exact(&mut buf).await.ok()?;
        buf.truncate(len);
        args.push(String::from_utf8_lossy(&buf).into_owned());
    }

    Some(args)
}

/// Minimal PostgreSQL backend: declines TLS, trusts every login and answers
/// each simple query with an empty `SELECT 1` result.
pub async fn fake_postgres() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(serve_postgres(stream));
        }
    });

    port
}

async fn serve_postgres(mut stream: TcpStream) {
    let _ = handle_postgres_session(&mut stream).await;
}

async fn handle_postgres_session(stream: &mut TcpStream) -> std::io::Result<()> {
    // Startup phase: optional SSLRequest, then the StartupMessage.
    loop {
        let len = stream.read_u32().await? as usize;
        let mut body = vec![0u8; len.saturating_sub(4)];
        stream.read_exact(&mut body).await?;

        if body.len() >= 4 && u32::from_be_bytes([body[0], body[1], body[2], body[3]]) == SSL_REQUEST_CODE {
            stream.write_all(b"N").await?;
            continue;
        }
        break;
    }

    // AuthenticationOk, BackendKeyData, ReadyForQuery.
    stream.write_all(&backend_message(b'R', &0u32.to_be_bytes())).await?;
    stream.write_all(&backend_message(b'K', &[0, 0, 0, 1, 0, 0, 0, 2])).await?;
    stream.write_all(&backend_message(b'Z', b"I")).await?;

    loop {
        let tag = stream.read_u8().await?;
        let len = stream.read_u32().await? as usize;
        let mut body = vec![0u8; len.saturating_sub(4)];
        stream.read_exact(&mut body).await?;

        match tag {
            b'Q' => {
                stream.write_all(&backend_message(b'C', b"SELECT 1\0")).await?;
                stream.write_all(&backend_message(b'Z', b"I")).await?;
            }
            b'X' => return Ok(()),
            _ => {}
        }
    }
}

fn backend_message(tag: u8, body: &[u8]) -> Vec<u8> {
    let mut message = Vec::with_capacity(body.len() + 5);
    message.push(tag);
    message.extend_from_slice(&((body.len() + 4) as u32).to_be_bytes());
    message.extend_from_slice(body);
    message
}
