use std::fmt::{self, Display, Formatter};
use std::io;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;
use log::debug;
use mpd::{State, Status};
use thiserror::Error;

/// Errors talking to the player daemon. All of them mean "no status this tick".
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("cannot resolve {0}")]
    Resolve(String),
    #[error("mpd: {0}")]
    Mpd(#[from] mpd::error::Error),
}

/// Transport state as reported by the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    Play,
    Pause,
    Stop,
}

impl From<State> for PlayState {
    fn from(state: State) -> Self {
        match state {
            State::Play => PlayState::Play,
            State::Pause => PlayState::Pause,
            State::Stop => PlayState::Stop,
        }
    }
}

impl Display for PlayState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PlayState::Play => write!(f, "play"),
            PlayState::Pause => write!(f, "pause"),
            PlayState::Stop => write!(f, "stop"),
        }
    }
}

/// The subset of `status` the renderer uses. Anything the player did not
/// report is `None` and simply disables the matching overlay.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerStatus {
    pub state: Option<PlayState>,
    pub volume: Option<u8>,
    pub elapsed: Option<f64>,
    pub duration: Option<f64>,
}

impl From<&Status> for PlayerStatus {
    fn from(status: &Status) -> Self {
        // volume is -1 when no mixer is configured
        let volume = (status.volume >= 0).then(|| status.volume.min(100) as u8);

        // older daemons only report "time: elapsed:total"
        let elapsed = status.elapsed.or(status.time.map(|(el, _)| el));
        let duration = status.duration.or(status.time.map(|(_, du)| du));

        PlayerStatus {
            state: Some(status.state.into()),
            volume,
            elapsed: elapsed.map(|d| d.as_secs_f64()),
            duration: duration.map(|d| d.as_secs_f64()),
        }
    }
}

/// Polls `status` through an [`mpd::Client`].
///
/// The connection is kept between ticks and dropped on the first error; the
/// next call makes one fresh connection attempt. Calls block for at most
/// the I/O timeout, which fits inside one tick.
pub struct MpdClient {
    addr: String,
    io_timeout: Duration,
    conn: Option<mpd::Client<TcpStream>>,
}

impl MpdClient {
    pub fn new(host: &str, port: u16) -> Self {
        MpdClient {
            addr: format!("{host}:{port}"),
            io_timeout: Duration::from_millis(800),
            conn: None,
        }
    }

    pub fn address(&self) -> &str {
        &self.addr
    }

    /// One status request. On failure the connection is discarded.
    pub fn status(&mut self) -> Result<PlayerStatus, PlayerError> {
        let mut conn = match self.conn.take() {
            Some(conn) => conn,
            None => self.connect()?,
        };
        let status = conn.status()?;
        self.conn = Some(conn);
        Ok(PlayerStatus::from(&status))
    }

    fn connect(&self) -> Result<mpd::Client<TcpStream>, PlayerError> {
        debug!("connecting to mpd at {}", self.addr);
        let addr = self
            .addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| PlayerError::Resolve(self.addr.clone()))?;
        let stream = TcpStream::connect_timeout(&addr, self.io_timeout)?;
        stream.set_read_timeout(Some(self.io_timeout))?;
        stream.set_write_timeout(Some(self.io_timeout))?;
        let client = mpd::Client::new(stream)?;
        debug!("mpd protocol {:?}", client.version);
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Answers every `status` with the given body, one connection only.
    fn fake_mpd(body: String) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        thread::spawn(move || {
            let (sock, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(sock.try_clone().unwrap());
            let mut writer = sock;
            writer.write_all(b"OK MPD 0.23.5\n").unwrap();
            let mut line = String::new();
            while reader.read_line(&mut line).map(|n| n > 0).unwrap_or(false) {
                if line.trim_end() == "status" {
                    writer.write_all(body.as_bytes()).unwrap();
                    writer.write_all(b"OK\n").unwrap();
                }
                line.clear();
            }
        });
        port
    }

    const COMMON: &str = "repeat: 0\nrandom: 0\nsingle: 0\nconsume: 0\nplaylist: 4\nplaylistlength: 12\nmixrampdb: 0.000000\n";

    fn status_of(body: String) -> PlayerStatus {
        let port = fake_mpd(body);
        let mut client = MpdClient::new("127.0.0.1", port);
        client.status().unwrap()
    }

    #[test]
    fn test_status_from_daemon() {
        let st = status_of(format!(
            "volume: 50\n{COMMON}state: play\nsong: 3\nsongid: 4\ntime: 30:120\nelapsed: 30.250\nbitrate: 320\nduration: 120.000\naudio: 44100:16:2\n"
        ));
        assert_eq!(st.state, Some(PlayState::Play));
        assert_eq!(st.volume, Some(50));
        assert_eq!(st.elapsed, Some(30.25));
        assert_eq!(st.duration, Some(120.0));
    }

    #[test]
    fn test_missing_fields_are_absent() {
        let st = status_of(format!("volume: -1\n{COMMON}state: stop\n"));
        assert_eq!(st.state, Some(PlayState::Stop));
        assert_eq!(st.volume, None);
        assert_eq!(st.elapsed, None);
        assert_eq!(st.duration, None);
    }

    #[test]
    fn test_legacy_time_field() {
        let st = status_of(format!("volume: 20\n{COMMON}state: pause\ntime: 12:300\n"));
        assert_eq!(st.state, Some(PlayState::Pause));
        assert_eq!(st.elapsed, Some(12.0));
        assert_eq!(st.duration, Some(300.0));
    }

    #[test]
    fn test_connection_is_reused() {
        // the fake daemon accepts a single connection
        let port = fake_mpd(format!("volume: 70\n{COMMON}state: pause\nelapsed: 1.500\n"));
        let mut client = MpdClient::new("127.0.0.1", port);
        for _ in 0..3 {
            let st = client.status().unwrap();
            assert_eq!(st.volume, Some(70));
            assert_eq!(st.elapsed, Some(1.5));
        }
    }

    #[test]
    fn test_connect_failure_is_an_error_not_a_panic() {
        // bind then drop to get a port nobody listens on
        let port = {
            let l = TcpListener::bind("127.0.0.1:0").unwrap();
            l.local_addr().unwrap().port()
        };
        let mut client = MpdClient::new("127.0.0.1", port);
        assert!(client.status().is_err());
        // and again, no stale connection left behind
        assert!(client.status().is_err());
    }
}
