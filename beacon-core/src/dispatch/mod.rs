//! Command dispatcher
//!
//! One dispatcher type serves every board. A deployment registers the verbs
//! its capabilities support; each verb is classified at registration as
//! immediate (runs inline, the reply reflects its outcome) or deferred
//! (queued, acknowledged at once).
//!
//! Handler errors are converted to replies here and never propagate further:
//!
//! | Outcome | Response | Feedback |
//! |---|---|---|
//! | unknown verb, [`VerbError::Unrecognized`] | NACK | unrecognized |
//! | [`VerbError::BadArgument`], blank command | ERR | argument error |
//! | any other [`VerbError`] | ERR | internal error |
//! | deferred verb queued | ACK | success |

use core::fmt;

use beacon_protocol::{Command, Response};
use heapless::Vec;

use crate::output::{Feedback, FeedbackClass};
use crate::queue::DeferredQueue;

/// Most verbs a dispatcher can hold
pub const MAX_VERBS: usize = 32;

/// Failure reported by a verb handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VerbError {
    /// Arguments missing, malformed or out of range
    BadArgument,
    /// Argument shape not recognised for this verb
    Unrecognized,
    /// Capability not fitted on this board
    Unsupported,
    /// Collaborator reported an error
    Hardware,
    /// Deferred queue at capacity
    QueueFull,
}

impl fmt::Display for VerbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerbError::BadArgument => write!(f, "bad argument"),
            VerbError::Unrecognized => write!(f, "unrecognized arguments"),
            VerbError::Unsupported => write!(f, "not supported on this board"),
            VerbError::Hardware => write!(f, "hardware error"),
            VerbError::QueueFull => write!(f, "deferred queue full"),
        }
    }
}

/// Response to return to the host plus what the status pixel should show
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub response: Response,
    pub feedback: Feedback,
}

impl Reply {
    pub fn new(response: Response, feedback: Feedback) -> Self {
        Self { response, feedback }
    }

    /// ACK with outcome-class feedback
    pub fn ack(class: FeedbackClass) -> Self {
        Self::new(Response::Ack, Feedback::Class(class))
    }

    /// ACK where the verb chose the status colour itself, or none at all
    pub fn ack_with(feedback: Feedback) -> Self {
        Self::new(Response::Ack, feedback)
    }

    pub fn nack() -> Self {
        Self::new(Response::Nack, Feedback::Class(FeedbackClass::Unrecognized))
    }

    pub fn error(class: FeedbackClass) -> Self {
        Self::new(Response::Error, Feedback::Class(class))
    }

    /// Data payload; oversized text degrades to ERR
    pub fn data(text: &str, class: FeedbackClass) -> Self {
        match Response::data(text) {
            Ok(response) => Self::new(response, Feedback::Class(class)),
            Err(_) => Self::error(FeedbackClass::InternalError),
        }
    }
}

impl From<VerbError> for Reply {
    fn from(e: VerbError) -> Self {
        match e {
            VerbError::BadArgument => Reply::error(FeedbackClass::ArgumentError),
            VerbError::Unrecognized => Reply::nack(),
            VerbError::Unsupported | VerbError::Hardware | VerbError::QueueFull => {
                Reply::error(FeedbackClass::InternalError)
            }
        }
    }
}

/// Inline handler
pub type ImmediateFn<C> = fn(&mut C, &Command) -> Result<Reply, VerbError>;
/// Queued handler
pub type DeferredFn<C> = fn(&mut C, &Command) -> Result<(), VerbError>;

/// How a verb executes
pub enum Action<C> {
    Immediate(ImmediateFn<C>),
    Deferred(DeferredFn<C>),
}

impl<C> Clone for Action<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Action<C> {}

/// A registered verb
pub struct Verb<C> {
    pub name: &'static str,
    pub action: Action<C>,
}

impl<C> Clone for Verb<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Verb<C> {}

impl<C> Verb<C> {
    pub const fn immediate(name: &'static str, handler: ImmediateFn<C>) -> Self {
        Self {
            name,
            action: Action::Immediate(handler),
        }
    }

    pub const fn deferred(name: &'static str, handler: DeferredFn<C>) -> Self {
        Self {
            name,
            action: Action::Deferred(handler),
        }
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self.action, Action::Deferred(_))
    }
}

/// Verb table and dispatch entry point
pub struct Dispatcher<C> {
    verbs: Vec<Verb<C>, MAX_VERBS>,
}

impl<C> Default for Dispatcher<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Dispatcher<C> {
    pub const fn new() -> Self {
        Self { verbs: Vec::new() }
    }

    /// Add a verb. A later registration of the same name replaces the
    /// earlier one. Returns the verb back if the table is full.
    pub fn register(&mut self, verb: Verb<C>) -> Result<(), Verb<C>> {
        if let Some(existing) = self.verbs.iter_mut().find(|v| v.name == verb.name) {
            *existing = verb;
            return Ok(());
        }
        self.verbs.push(verb)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    pub fn lookup(&self, name: &str) -> Option<&Verb<C>> {
        self.verbs.iter().find(|v| v.name == name)
    }

    /// Registered verb names in registration order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.verbs.iter().map(|v| v.name)
    }

    pub fn len(&self) -> usize {
        self.verbs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verbs.is_empty()
    }

    /// Run or queue one command. Always produces exactly one reply.
    pub fn dispatch(&self, ctx: &mut C, queue: &mut DeferredQueue<C>, command: &Command) -> Reply {
        if command.is_blank() {
            return Reply::error(FeedbackClass::ArgumentError);
        }
        let Some(verb) = self.lookup(command.verb()) else {
            debug!("unknown verb '{}'", command.verb());
            return Reply::nack();
        };
        match verb.action {
            Action::Immediate(handler) => handler(ctx, command).unwrap_or_else(|e| {
                debug!("'{}' failed: {}", verb.name, e);
                Reply::from(e)
            }),
            Action::Deferred(handler) => match queue.enqueue(verb.name, handler, command.clone()) {
                Ok(()) => Reply::ack(FeedbackClass::Success),
                Err(e) => {
                    warn!("'{}' not queued: {}", verb.name, e);
                    Reply::from(e)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        hits: u32,
    }

    fn hit(ctx: &mut Counter, _: &Command) -> Result<Reply, VerbError> {
        ctx.hits += 1;
        Ok(Reply::ack(FeedbackClass::Success))
    }

    fn bad(_: &mut Counter, _: &Command) -> Result<Reply, VerbError> {
        Err(VerbError::BadArgument)
    }

    fn broken(_: &mut Counter, _: &Command) -> Result<Reply, VerbError> {
        Err(VerbError::Hardware)
    }

    fn later(ctx: &mut Counter, _: &Command) -> Result<(), VerbError> {
        ctx.hits += 10;
        Ok(())
    }

    fn setup() -> (Dispatcher<Counter>, DeferredQueue<Counter>, Counter) {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register(Verb::immediate("hit", hit)).ok();
        dispatcher.register(Verb::immediate("bad", bad)).ok();
        dispatcher.register(Verb::immediate("broken", broken)).ok();
        dispatcher.register(Verb::deferred("later", later)).ok();
        (dispatcher, DeferredQueue::new(), Counter::default())
    }

    fn run(d: &Dispatcher<Counter>, q: &mut DeferredQueue<Counter>, c: &mut Counter, text: &str) -> Reply {
        d.dispatch(c, q, &Command::parse(text).unwrap())
    }

    #[test]
    fn test_immediate_runs_inline() {
        let (d, mut q, mut c) = setup();
        assert_eq!(run(&d, &mut q, &mut c, "HIT"), Reply::ack(FeedbackClass::Success));
        assert_eq!(c.hits, 1);
    }

    #[test]
    fn test_unknown_verb_nacks() {
        let (d, mut q, mut c) = setup();
        let reply = run(&d, &mut q, &mut c, "frobnicate");
        assert_eq!(reply.response, Response::Nack);
        assert_eq!(reply.feedback, Feedback::Class(FeedbackClass::Unrecognized));
    }

    #[test]
    fn test_handler_errors_become_replies() {
        let (d, mut q, mut c) = setup();
        assert_eq!(
            run(&d, &mut q, &mut c, "bad"),
            Reply::error(FeedbackClass::ArgumentError)
        );
        assert_eq!(
            run(&d, &mut q, &mut c, "broken"),
            Reply::error(FeedbackClass::InternalError)
        );
    }

    #[test]
    fn test_blank_command_errors() {
        let (d, mut q, mut c) = setup();
        assert_eq!(
            run(&d, &mut q, &mut c, "   "),
            Reply::error(FeedbackClass::ArgumentError)
        );
    }

    #[test]
    fn test_deferred_acks_before_running() {
        let (d, mut q, mut c) = setup();
        assert_eq!(run(&d, &mut q, &mut c, "later"), Reply::ack(FeedbackClass::Success));
        assert_eq!(c.hits, 0);
        assert_eq!(q.len(), 1);
        q.run_next(&mut c);
        assert_eq!(c.hits, 10);
    }

    #[test]
    fn test_deferred_overflow_errors() {
        let (d, mut q, mut c) = setup();
        for _ in 0..crate::queue::QUEUE_CAPACITY {
            run(&d, &mut q, &mut c, "later");
        }
        assert_eq!(
            run(&d, &mut q, &mut c, "later"),
            Reply::error(FeedbackClass::InternalError)
        );
    }

    #[test]
    fn test_register_replaces_same_name() {
        let (mut d, mut q, mut c) = setup();
        let before = d.len();
        d.register(Verb::immediate("hit", bad)).ok();
        assert_eq!(d.len(), before);
        assert_eq!(
            run(&d, &mut q, &mut c, "hit"),
            Reply::error(FeedbackClass::ArgumentError)
        );
        assert!(d.contains("later"));
        assert!(d.lookup("later").unwrap().is_deferred());
    }
}
