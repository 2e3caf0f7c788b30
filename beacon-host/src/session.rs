//! Interactive remote session
//!
//! Each input line is either sent as a command or is one of the local
//! control words:
//!
//! | Input | Action |
//! |---|---|
//! | `quit` | end the session |
//! | `go` | start polling the configured request in the background |
//! | `stop` | stop background polling |
//! | `r` | repeat the previous command |

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use beacon_protocol::Response;
use log::{info, warn};

use crate::error::TransportError;
use crate::transport::Requester;

/// Result of one request
pub type RequestResult = Result<Option<Response>, TransportError>;

/// Classified input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Empty,
    Quit,
    Go,
    Stop,
    Send(String),
}

impl Input {
    /// Classify a line; `r` becomes the previous command when there is one
    pub fn classify(line: &str, last: Option<&str>) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            return Input::Empty;
        }
        match (line, last) {
            ("r", Some(previous)) => Input::Send(previous.to_string()),
            (l, _) if l.trim() == "quit" => Input::Quit,
            ("go", _) => Input::Go,
            ("stop", _) => Input::Stop,
            (l, _) => Input::Send(l.to_string()),
        }
    }
}

/// Sleep granularity while waiting for the next poll
const POLL_SLICE: Duration = Duration::from_millis(20);

/// Background thread repeatedly sending one request
pub struct Poller {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl Poller {
    /// Start polling. `on_response` runs on the poller thread after each
    /// request.
    pub fn start<R, F>(
        requester: Arc<Mutex<R>>,
        request: String,
        interval: Duration,
        mut on_response: F,
    ) -> Self
    where
        R: Requester + Send + 'static,
        F: FnMut(RequestResult) + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = stop.clone();
        let handle = thread::spawn(move || {
            info!("poller started");
            while !stop_flag.load(Ordering::SeqCst) {
                let result = match requester.lock() {
                    Ok(mut guard) => guard.request(&request),
                    Err(_) => {
                        warn!("requester lock poisoned");
                        break;
                    }
                };
                on_response(result);

                let wake = Instant::now() + interval;
                while !stop_flag.load(Ordering::SeqCst) && Instant::now() < wake {
                    thread::sleep(POLL_SLICE.min(wake.saturating_duration_since(Instant::now())));
                }
            }
            info!("poller stopping");
        });
        Self { stop, handle }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Signal the thread and wait for it
    pub fn stop(self) {
        self.stop.store(true, Ordering::SeqCst);
        if self.handle.join().is_err() {
            warn!("poller thread panicked");
        }
    }
}

/// What the caller should do after a line
#[derive(Debug, PartialEq)]
pub enum Outcome {
    /// Nothing sent
    Idle,
    Quit,
    /// A command was sent
    Sent(String, RequestResult),
}

/// Line-driven session over a shared requester
pub struct Session<R> {
    requester: Arc<Mutex<R>>,
    poll_request: String,
    poll_interval: Duration,
    last: Option<String>,
    poller: Option<Poller>,
}

impl<R: Requester + Send + 'static> Session<R> {
    pub fn new(requester: R, poll_request: impl Into<String>, poll_interval: Duration) -> Self {
        Self {
            requester: Arc::new(Mutex::new(requester)),
            poll_request: poll_request.into(),
            poll_interval,
            last: None,
            poller: None,
        }
    }

    pub fn requester(&self) -> Arc<Mutex<R>> {
        self.requester.clone()
    }

    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().is_some_and(Poller::is_running)
    }

    pub fn last_command(&self) -> Option<&str> {
        self.last.as_deref()
    }

    /// Handle one input line. Poll results go to `on_poll`.
    pub fn handle_line<F>(&mut self, line: &str, on_poll: F) -> Outcome
    where
        F: FnMut(RequestResult) + Send + 'static,
    {
        match Input::classify(line, self.last.as_deref()) {
            Input::Empty => Outcome::Idle,
            Input::Quit => Outcome::Quit,
            Input::Go => {
                if self.is_polling() {
                    warn!("poller already running");
                } else {
                    self.poller = Some(Poller::start(
                        self.requester.clone(),
                        self.poll_request.clone(),
                        self.poll_interval,
                        on_poll,
                    ));
                }
                Outcome::Idle
            }
            Input::Stop => {
                match self.poller.take() {
                    Some(poller) if poller.is_running() => poller.stop(),
                    _ => warn!("poller not running"),
                }
                Outcome::Idle
            }
            Input::Send(command) => {
                let result = self.send(&command);
                self.last = Some(command.clone());
                Outcome::Sent(command, result)
            }
        }
    }

    fn send(&self, command: &str) -> RequestResult {
        match self.requester.lock() {
            Ok(mut guard) => guard.request(command),
            // a panicked poller cannot leave the transport half-written
            Err(poisoned) => poisoned.into_inner().request(command),
        }
    }

    /// Stop any poller
    pub fn shutdown(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.stop();
        }
    }
}

impl<R> Drop for Session<R> {
    fn drop(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.stop.store(true, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[derive(Default)]
    struct Echo {
        sent: Vec<String>,
    }

    impl Requester for Echo {
        fn request(&mut self, command: &str) -> RequestResult {
            self.sent.push(command.to_string());
            Ok(Some(Response::data(command).unwrap()))
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(Input::classify("", None), Input::Empty);
        assert_eq!(Input::classify(" quit ", None), Input::Quit);
        assert_eq!(Input::classify("go", None), Input::Go);
        assert_eq!(Input::classify("stop", None), Input::Stop);
        assert_eq!(Input::classify("r", Some("ping")), Input::Send("ping".into()));
        assert_eq!(Input::classify("r", None), Input::Send("r".into()));
        assert_eq!(Input::classify("rgb 1 2 3\n", None), Input::Send("rgb 1 2 3".into()));
    }

    #[test]
    fn test_repeat_last_command() {
        let mut session = Session::new(Echo::default(), "data", Duration::from_secs(1));
        assert_eq!(session.handle_line("", |_| {}), Outcome::Idle);
        session.handle_line("ping", |_| {});
        match session.handle_line("r", |_| {}) {
            Outcome::Sent(cmd, Ok(Some(r))) => {
                assert_eq!(cmd, "ping");
                assert_eq!(r.body(), "ping");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(session.requester().lock().unwrap().sent, ["ping", "ping"]);
        assert_eq!(session.handle_line("quit", |_| {}), Outcome::Quit);
    }

    #[test]
    fn test_go_and_stop_polling() {
        let mut session = Session::new(Echo::default(), "data", Duration::from_millis(5));
        let (tx, rx) = mpsc::channel();
        session.handle_line("go", move |result| {
            let _ = tx.send(result);
        });
        assert!(session.is_polling());
        let first = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(first.unwrap().unwrap().body(), "data");

        session.handle_line("stop", |_| {});
        assert!(!session.is_polling());
        let requester = session.requester();
        let sent = requester.lock().unwrap().sent.clone();
        assert!(sent.iter().all(|s| s == "data"));
        assert!(!sent.is_empty());
    }
}
