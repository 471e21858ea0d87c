use anyhow::Context;
use chrono::NaiveDate;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use vax_core::session::{Message, Reply, Session};
use vax_core::types::CloseReason;
use vax_core::wire;

use crate::state::ServerState;

/// Longest client line read in one piece, terminator included.
pub const MAX_LINE_BYTES: usize = 1024;

async fn send<W>(writer: &mut W, reply: &Reply) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let text = wire::encode_reply(reply).context("failed to encode reply")?;
    writer.write_all(text.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

fn log_reply(session: &Session, reply: &Reply) {
    for message in &reply.messages {
        match message {
            Message::Selected(choice) => {
                tracing::info!(step = %session.step(), %choice, "selected");
            }
            Message::Invalid { count } | Message::InvalidLimit { count } => {
                tracing::warn!(step = %session.step(), count, "invalid input");
            }
            Message::InvalidDate => {
                tracing::warn!("invalid first-dose date");
            }
            _ => {}
        }
    }
}

/// Next client line, or `None` at end of stream.
///
/// Bytes that are not UTF-8 become U+FFFD. A line longer than
/// `MAX_LINE_BYTES` is skipped up to its terminator and comes back as a
/// single replacement character, so the session sees one unusable reply.
async fn next_line<R>(reader: &mut R, buf: &mut Vec<u8>) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    let n = (&mut *reader)
        .take(MAX_LINE_BYTES as u64)
        .read_until(b'\n', buf)
        .await?;
    if n == 0 {
        return Ok(None);
    }
    if n == MAX_LINE_BYTES && buf.last() != Some(&b'\n') {
        skip_past_newline(reader).await?;
        return Ok(Some(char::REPLACEMENT_CHARACTER.to_string()));
    }
    Ok(Some(String::from_utf8_lossy(buf).into_owned()))
}

async fn skip_past_newline<R>(reader: &mut R) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let chunk = reader.fill_buf().await?;
        if chunk.is_empty() {
            return Ok(());
        }
        match chunk.iter().position(|&b| b == b'\n') {
            Some(pos) => {
                reader.consume(pos + 1);
                return Ok(());
            }
            None => {
                let len = chunk.len();
                reader.consume(len);
            }
        }
    }
}

/// Drive one dialogue over a line-oriented stream until the session closes
/// or the peer goes away.
pub async fn run_session<R, W>(
    state: &ServerState,
    today: NaiveDate,
    mut reader: R,
    mut writer: W,
) -> anyhow::Result<CloseReason>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut session = state.open_session(today);
    let mut buf = Vec::new();
    let mut reply = session.start();

    loop {
        send(&mut writer, &reply).await?;
        if let Some(reason) = reply.close {
            tracing::info!(%reason, step = %session.step(), "session closed");
            return Ok(reason);
        }

        let Some(line) = next_line(&mut reader, &mut buf)
            .await
            .context("failed to read client line")?
        else {
            session.disconnect();
            tracing::info!(step = %session.step(), "peer disconnected");
            return Ok(CloseReason::PeerDisconnected);
        };

        tracing::debug!(step = %session.step(), input = line.trim(), "received");
        reply = session.handle(&line);
        log_reply(&session, &reply);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vax_core::catalog::Catalog;
    use vax_core::config::SessionConfig;

    fn state() -> ServerState {
        ServerState::new(Catalog::sample().unwrap(), SessionConfig::default())
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 6, 20).unwrap()
    }

    async fn run(input: &str) -> (CloseReason, String) {
        run_bytes(input.as_bytes()).await
    }

    async fn run_bytes(input: &[u8]) -> (CloseReason, String) {
        let mut out = Vec::new();
        let reason = run_session(&state(), today(), input, &mut out)
            .await
            .unwrap();
        (reason, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn quit_sends_farewell_and_stops_reading() {
        let (reason, out) = run("q\n1\n").await;
        assert_eq!(reason, CloseReason::Quit);
        assert!(out.starts_with("<<< ="));
        assert!(out.ends_with("<<< See ya! Visit again :)\n"));
        assert_eq!(out.matches(wire::TURN_MARKER).count(), 1);
    }

    #[tokio::test]
    async fn eof_closes_silently() {
        let (reason, out) = run("").await;
        assert_eq!(reason, CloseReason::PeerDisconnected);
        assert!(out.contains(">>> Select the Dose of Vaccination:"));
        assert!(!out.contains("See ya"));
    }

    #[tokio::test]
    async fn crlf_lines_are_accepted() {
        let (reason, out) = run("1\r\nq\r\n").await;
        assert_eq!(reason, CloseReason::Quit);
        assert!(out.contains("<<< Dose selected: 1"));
        assert!(out.contains(">>> Select the Age Group:"));
    }

    #[tokio::test]
    async fn three_strikes_end_the_dialogue() {
        let (reason, out) = run("x\n0\n99\n1\n").await;
        assert_eq!(reason, CloseReason::TooManyInvalid);
        assert!(out.contains("Invalid input provided 1 time(s)! Try again."));
        assert!(out.contains("Invalid input provided 3 time(s)! Closing the connection."));
        assert!(!out.contains("Dose selected"));
    }

    #[tokio::test]
    async fn non_utf8_line_counts_as_a_strike() {
        let (reason, out) = run_bytes(b"\xff\xfe\nq\n").await;
        assert_eq!(reason, CloseReason::Quit);
        assert!(out.contains("Invalid input provided 1 time(s)! Try again."));
        assert!(out.ends_with("<<< See ya! Visit again :)\n"));
    }

    #[tokio::test]
    async fn overlong_line_is_one_strike() {
        let mut input = vec![b'7'; MAX_LINE_BYTES * 4];
        input.extend_from_slice(b"\nq\n");
        let (reason, out) = run_bytes(&input).await;
        assert_eq!(reason, CloseReason::Quit);
        assert!(out.contains("Invalid input provided 1 time(s)! Try again."));
        assert!(!out.contains("Invalid input provided 2 time(s)"));
    }

    #[tokio::test]
    async fn last_line_without_newline_is_handled() {
        let (reason, out) = run("q").await;
        assert_eq!(reason, CloseReason::Quit);
        assert!(out.ends_with("<<< See ya! Visit again :)\n"));
    }
}
