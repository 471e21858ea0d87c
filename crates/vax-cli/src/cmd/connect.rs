use crate::output::format_table;
use anyhow::Context;
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::net::TcpStream;
use std::path::Path;
use vax_core::config::Config;
use vax_core::wire::ServerLine;

const INPUT_PROMPT: &str = " ==> ";

pub fn run(root: &Path, host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    let config = Config::load_or_default(root).context("failed to load config")?;
    let host = host.unwrap_or(config.server.host);
    let port = port.unwrap_or(config.server.port);
    let addr = format!("{host}:{port}");

    let stream = match TcpStream::connect(&addr) {
        Ok(stream) => stream,
        Err(e) if e.kind() == ErrorKind::ConnectionRefused => {
            anyhow::bail!("server not running at {addr}: start it with 'vax serve'")
        }
        Err(e) => return Err(e).with_context(|| format!("failed to connect to {addr}")),
    };
    tracing::info!("connected to {addr}");

    let reader = BufReader::new(stream.try_clone()?);
    let mut writer = stream;
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    relay(reader, &mut writer, stdin.lock(), &mut stdout.lock())
}

/// Render server output and answer every turn marker with one input line.
///
/// Returns when the server closes the stream or `input` runs dry.
pub fn relay<R, W, I, O>(server: R, to_server: &mut W, mut input: I, out: &mut O) -> anyhow::Result<()>
where
    R: BufRead,
    W: Write,
    I: BufRead,
    O: Write,
{
    for line in server.lines() {
        let line = line.context("failed to read from server")?;
        match ServerLine::parse(&line).context("malformed option list from server")? {
            ServerLine::Prompt(text) => writeln!(out, "\n{text}")?,
            ServerLine::Info(text) | ServerLine::Text(text) => writeln!(out, "{text}")?,
            ServerLine::Options(pairs) => {
                let rows: Vec<Vec<String>> = pairs.into_iter().map(|(k, v)| vec![k, v]).collect();
                write!(out, "{}", format_table(&["Choice", "Options"], &rows))?;
            }
            ServerLine::Turn => {
                write!(out, "{INPUT_PROMPT}")?;
                out.flush()?;
                let mut reply = String::new();
                if input.read_line(&mut reply)? == 0 {
                    writeln!(out)?;
                    break;
                }
                writeln!(to_server, "{}", reply.trim())?;
                to_server.flush()?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SERVER: &str = "<<< Welcome\n>>> Select the State:\n{\"1\":\"Goa\",\"2\":\"Ladakh\"}\n==>\n<<< Selected State: Ladakh\n<<< See ya! Visit again :)\n";

    #[test]
    fn relays_one_reply_per_turn() {
        let mut sent = Vec::new();
        let mut out = Vec::new();
        relay(
            Cursor::new(SERVER),
            &mut sent,
            Cursor::new("  2 \nignored\n"),
            &mut out,
        )
        .unwrap();

        assert_eq!(String::from_utf8(sent).unwrap(), "2\n");
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("\nSelect the State:\n"));
        assert!(out.contains("Choice  Options"));
        assert!(out.contains("2       Ladakh"));
        assert!(out.contains(INPUT_PROMPT));
        assert!(out.ends_with("See ya! Visit again :)\n"));
    }

    #[test]
    fn stops_when_input_ends() {
        let mut sent = Vec::new();
        let mut out = Vec::new();
        relay(Cursor::new(SERVER), &mut sent, Cursor::new(""), &mut out).unwrap();
        assert!(sent.is_empty());
        assert!(!String::from_utf8(out).unwrap().contains("See ya"));
    }
}
