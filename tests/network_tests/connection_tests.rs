//! Connection Tests
//!
//! Tests for the execute round trip over scripted transports and a loopback
//! TCP server.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::rc::Rc;
use std::thread;

use ssdbkv::{Arg, Command, Config, Connection, FailureCause, Status, Transport};

// =============================================================================
// Helper Functions
// =============================================================================

/// What the scripted peer does on each read
enum Step {
    Data(Vec<u8>),
    Fail(io::ErrorKind),
}

/// In-memory transport: replays scripted reads, records writes
#[derive(Clone, Default)]
struct Scripted {
    reads: Rc<RefCell<VecDeque<Step>>>,
    written: Rc<RefCell<Vec<u8>>>,
    fail_writes: bool,
    shutdowns: Rc<RefCell<usize>>,
}

impl Scripted {
    fn replying(chunks: &[&[u8]]) -> Self {
        let t = Self::default();
        for chunk in chunks {
            t.push(Step::Data(chunk.to_vec()));
        }
        t
    }

    fn push(&self, step: Step) {
        self.reads.borrow_mut().push_back(step);
    }

    fn written(&self) -> Vec<u8> {
        self.written.borrow().clone()
    }
}

impl Read for Scripted {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut reads = self.reads.borrow_mut();
        match reads.pop_front() {
            None => Ok(0),
            Some(Step::Fail(kind)) => Err(io::Error::new(kind, "scripted failure")),
            Some(Step::Data(mut data)) => {
                let n = data.len().min(buf.len());
                buf[..n].copy_from_slice(&data[..n]);
                if n < data.len() {
                    // Leftover stays at the front for the next read
                    reads.push_front(Step::Data(data.split_off(n)));
                }
                Ok(n)
            }
        }
    }
}

impl Write for Scripted {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe"));
        }
        self.written.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Transport for Scripted {
    fn shutdown(&mut self) -> io::Result<()> {
        *self.shutdowns.borrow_mut() += 1;
        Ok(())
    }
}

fn items(reply: &ssdbkv::Reply) -> Vec<String> {
    reply.items().iter().map(|v| v.to_string()).collect()
}

// =============================================================================
// Round Trip Tests
// =============================================================================

#[test]
fn test_execute_writes_encoded_command() {
    let t = Scripted::replying(&[b"2\nok\n\n"]);
    let mut conn = Connection::new(t.clone());

    let reply = conn.execute(Command::new("set").arg("k").arg("v"));

    assert_eq!(reply.status(), Status::Ok);
    assert_eq!(t.written(), b"3\nset\n1\nk\n1\nv\n\n");
}

#[test]
fn test_get_missing_key() {
    let t = Scripted::replying(&[b"9\nnot_found\n\n"]);
    let mut conn = Connection::new(t);

    let reply = conn.execute(Command::new("get").arg("missing"));

    assert_eq!(reply.status(), Status::NotFound);
    assert!(reply.items().is_empty());
    assert_eq!(reply.cause(), None);
}

#[test]
fn test_multi_get_pairs() {
    let t = Scripted::replying(&[b"2\nok\n1\na\n1\n1\n1\nb\n1\n2\n\n"]);
    let mut conn = Connection::new(t);

    let reply = conn.execute(Command::new("multi_get").arg("a").arg("b"));

    let pairs: Vec<(String, String)> = reply
        .kv_pairs()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), "2".to_string())
        ]
    );
    assert_eq!(reply.kv_len(), 2);
}

#[test]
fn test_reply_split_across_many_reads() {
    let full: &[u8] = b"2\nok\n11\nhello world\n\n";
    let chunks: Vec<&[u8]> = full.chunks(1).collect();
    let t = Scripted::replying(&chunks);
    let mut conn = Connection::new(t);

    let reply = conn.execute(Command::new("get").arg("k"));

    assert!(reply.is_ok());
    assert_eq!(reply.string(), "hello world");
    assert_eq!(conn.buffered(), 0);
}

#[test]
fn test_small_scratch_buffer() {
    let t = Scripted::replying(&[b"2\nok\n10\n0123456789\n\n"]);
    let mut conn = Connection::with_read_buffer_size(t, 3);

    let reply = conn.execute(Command::new("get").arg("k"));

    assert_eq!(reply.string(), "0123456789");
}

#[test]
fn test_sequential_commands_share_buffer() {
    let t = Scripted::replying(&[b"2\nok\n1\n1\n\n2\nok\n1\n2\n\n"]);
    let mut conn = Connection::new(t);

    // Both replies arrive in a single read; the second must survive in the buffer
    let first = conn.execute(Command::new("incr").arg("key").arg(1));
    assert_eq!(first.int(), 1);
    assert!(conn.buffered() > 0);

    let second = conn.execute(Command::new("incr").arg("key").arg(1));
    assert_eq!(second.int(), 2);
    assert_eq!(conn.buffered(), 0);
}

#[test]
fn test_error_status_has_no_items() {
    let t = Scripted::replying(&[b"5\nerror\n7\ndetails\n\n"]);
    let mut conn = Connection::new(t);

    let reply = conn.execute(Command::new("bad"));

    assert_eq!(reply.status(), Status::Error);
    assert!(reply.items().is_empty());
}

// =============================================================================
// Status Classification Tests
// =============================================================================

#[test]
fn test_unknown_status_token_is_fail() {
    let t = Scripted::replying(&[b"3\nyes\n1\nv\n1\nw\n\n"]);
    let mut conn = Connection::new(t);

    let reply = conn.execute(Command::new("get").arg("k"));

    assert_eq!(reply.status(), Status::Fail);
    assert!(reply.items().is_empty());
    assert_eq!(reply.cause(), Some(FailureCause::UnknownStatus));
}

#[test]
fn test_status_match_is_exact() {
    let t = Scripted::replying(&[b"2\nOK\n\n"]);
    let mut conn = Connection::new(t);

    let reply = conn.execute(Command::new("ping"));

    assert_eq!(reply.status(), Status::Fail);
}

// =============================================================================
// Failure Path Tests
// =============================================================================

#[test]
fn test_malformed_argument_sends_nothing() {
    let t = Scripted::replying(&[b"2\nok\n\n"]);
    let mut conn = Connection::new(t.clone());

    let reply = conn.execute(Command::new("set").arg("k").arg(Arg::Float(f64::NAN)));

    assert_eq!(reply.status(), Status::ClientError);
    assert_eq!(reply.cause(), Some(FailureCause::Malformed));
    assert_eq!(reply.items().len(), 1);
    assert!(t.written().is_empty());
}

#[test]
fn test_write_failure() {
    let mut t = Scripted::default();
    t.fail_writes = true;
    let mut conn = Connection::new(t);

    let reply = conn.execute(Command::new("get").arg("k"));

    assert_eq!(reply.status(), Status::Fail);
    assert_eq!(reply.cause(), Some(FailureCause::Write));
    assert_eq!(items(&reply), vec!["broken pipe".to_string()]);
}

#[test]
fn test_read_failure() {
    let t = Scripted::replying(&[b"2\nok\n"]);
    t.push(Step::Fail(io::ErrorKind::ConnectionReset));
    let mut conn = Connection::new(t);

    let reply = conn.execute(Command::new("get").arg("k"));

    assert_eq!(reply.status(), Status::Fail);
    assert_eq!(reply.cause(), Some(FailureCause::Read));
    assert_eq!(items(&reply), vec!["scripted failure".to_string()]);
    assert_eq!(conn.buffered(), 0);
}

#[test]
fn test_interrupted_read_is_retried() {
    let t = Scripted::default();
    t.push(Step::Fail(io::ErrorKind::Interrupted));
    t.push(Step::Data(b"2\nok\n\n".to_vec()));
    let mut conn = Connection::new(t);

    let reply = conn.execute(Command::new("ping"));

    assert!(reply.is_ok());
}

#[test]
fn test_peer_closes_mid_reply() {
    let t = Scripted::replying(&[b"2\nok\n5\nhel"]);
    let mut conn = Connection::new(t);

    let reply = conn.execute(Command::new("get").arg("k"));

    assert_eq!(reply.status(), Status::Fail);
    assert_eq!(reply.cause(), Some(FailureCause::Closed));
    assert!(reply.items().iter().all(|v| v.as_bytes() != b"hel"));
}

#[test]
fn test_protocol_error_folds_into_fail() {
    let t = Scripted::replying(&[b"2\nok\n-1\n"]);
    let mut conn = Connection::new(t);

    let reply = conn.execute(Command::new("get").arg("k"));

    assert_eq!(reply.status(), Status::Fail);
    assert_eq!(reply.cause(), Some(FailureCause::Protocol));
    assert_eq!(items(&reply), vec!["network error".to_string()]);
    assert_eq!(conn.buffered(), 0);
}

#[test]
fn test_late_reply_after_timeout_is_not_reused() {
    let t = Scripted::default();
    t.push(Step::Fail(io::ErrorKind::WouldBlock));
    t.push(Step::Data(b"2\nok\n10\nvalue-of-a\n\n".to_vec()));
    let mut conn = Connection::new(t.clone());

    let first = conn.execute(Command::new("get").arg("a"));
    assert_eq!(first.cause(), Some(FailureCause::Read));
    assert!(conn.is_closed());

    let second = conn.execute(Command::new("get").arg("b"));

    assert!(!second.is_ok());
    assert_eq!(second.status(), Status::Fail);
    assert_eq!(second.cause(), Some(FailureCause::Closed));
    assert!(second.items().iter().all(|v| v.as_bytes() != b"value-of-a"));
    assert_eq!(t.written(), b"3\nget\n1\na\n\n");
    assert_eq!(*t.shutdowns.borrow(), 1);
}

#[test]
fn test_protocol_error_closes_connection() {
    let t = Scripted::replying(&[b"2\nok\nxx\n"]);
    t.push(Step::Data(b"2\nok\n1\nz\n\n".to_vec()));
    let mut conn = Connection::new(t);

    let first = conn.execute(Command::new("get").arg("a"));
    assert_eq!(first.cause(), Some(FailureCause::Protocol));

    let second = conn.execute(Command::new("get").arg("b"));
    assert_eq!(second.cause(), Some(FailureCause::Closed));
}

#[test]
fn test_write_failure_closes_connection() {
    let mut t = Scripted::replying(&[b"2\nok\n\n"]);
    t.fail_writes = true;
    let mut conn = Connection::new(t.clone());

    let first = conn.execute(Command::new("set").arg("k").arg("v"));
    assert_eq!(first.cause(), Some(FailureCause::Write));
    assert!(conn.is_closed());

    let second = conn.execute(Command::new("ping"));
    assert_eq!(second.cause(), Some(FailureCause::Closed));
    assert_eq!(*t.shutdowns.borrow(), 1);
}

#[test]
fn test_unknown_status_keeps_connection_open() {
    let t = Scripted::replying(&[b"5\nmaybe\n\n", b"2\nok\n\n"]);
    let mut conn = Connection::new(t);

    let first = conn.execute(Command::new("ping"));
    assert_eq!(first.cause(), Some(FailureCause::UnknownStatus));
    assert!(!conn.is_closed());

    assert!(conn.execute(Command::new("ping")).is_ok());
}

// =============================================================================
// Close Tests
// =============================================================================

#[test]
fn test_close_is_idempotent() {
    let t = Scripted::default();
    let mut conn = Connection::new(t.clone());

    assert!(conn.close().is_ok());
    assert!(conn.close().is_ok());
    assert!(conn.is_closed());
    assert_eq!(*t.shutdowns.borrow(), 1);
}

#[test]
fn test_execute_after_close() {
    let t = Scripted::replying(&[b"2\nok\n\n"]);
    let mut conn = Connection::new(t.clone());
    conn.close().unwrap();

    let reply = conn.execute(Command::new("ping"));

    assert_eq!(reply.status(), Status::Fail);
    assert_eq!(reply.cause(), Some(FailureCause::Closed));
    assert!(t.written().is_empty());
}

#[test]
fn test_drop_closes_transport() {
    let t = Scripted::default();
    drop(Connection::new(t.clone()));
    assert_eq!(*t.shutdowns.borrow(), 1);
}

// =============================================================================
// TCP Tests
// =============================================================================

/// Read one command (blocks until blank line) from a fake server socket
fn read_command(reader: &mut BufReader<TcpStream>) -> Option<Vec<String>> {
    let mut args = Vec::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).ok()? == 0 {
            return None;
        }
        let line = line.trim_end_matches('\n');
        if line.is_empty() {
            return Some(args);
        }
        let len: usize = line.parse().ok()?;
        let mut payload = vec![0u8; len + 1];
        reader.read_exact(&mut payload).ok()?;
        payload.pop();
        args.push(String::from_utf8(payload).ok()?);
    }
}

/// Fake server answering `get k` with `ok v` and anything else with `not_found`
fn spawn_fake_server() -> (u16, thread::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut writer = stream.try_clone().unwrap();
        let mut reader = BufReader::new(stream);

        while let Some(args) = read_command(&mut reader) {
            let reply: &[u8] = if args == ["get", "k"] {
                b"2\nok\n1\nv\n\n"
            } else {
                b"9\nnot_found\n\n"
            };
            // Dribble the reply to force several client reads
            for chunk in reply.chunks(3) {
                writer.write_all(chunk).unwrap();
                writer.flush().unwrap();
            }
        }
    });

    (port, handle)
}

#[test]
fn test_tcp_round_trip() {
    let (port, server) = spawn_fake_server();
    let config = Config::builder().host("127.0.0.1").port(port).build();

    let mut conn = Connection::connect(&config).unwrap();
    assert!(conn.peer_addr().ends_with(&port.to_string()));

    let hit = conn.execute(Command::new("get").arg("k"));
    assert!(hit.is_ok());
    assert_eq!(hit.string(), "v");

    let miss = conn.execute(Command::new("get").arg("missing"));
    assert!(miss.is_not_found());

    conn.close().unwrap();
    conn.close().unwrap();
    server.join().unwrap();
}

#[test]
fn test_connect_refused() {
    // Bind then drop to get a port nobody listens on
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let config = Config::builder().host("127.0.0.1").port(port).timeout_ms(1000).build();

    assert!(Connection::connect(&config).is_err());
}

#[test]
fn test_connect_rejects_invalid_config() {
    let config = Config::builder().host("").build();
    assert!(matches!(
        Connection::connect(&config),
        Err(ssdbkv::SsdbError::Config(_))
    ));
}
