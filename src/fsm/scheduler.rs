//! Drives a lifecycle against a datastore session.
//!
//! The scheduler is the only place that touches the session. Each turn it
//! observes the session as the current state requires, feeds the observation
//! to the transition function, and performs the returned effect.

use std::ops::{Deref, DerefMut};

use crate::fsm::state::{Effect, Event, Lifecycle, State};
use crate::http::response::Reply;
use crate::store::{Row, Session};

/// Owns a session and releases it when dropped.
///
/// Dropping happens when a request future is abandoned (client went away,
/// request timeout), so the connection still goes back to the pool.
pub struct SessionGuard<S: Session> {
    session: S,
}

impl<S: Session> SessionGuard<S> {
    pub fn new(session: S) -> Self {
        Self { session }
    }
}

impl<S: Session> Deref for SessionGuard<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.session
    }
}

impl<S: Session> DerefMut for SessionGuard<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.session
    }
}

impl<S: Session> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        self.session.release();
    }
}

/// Run `lifecycle` to completion and return its reply.
pub async fn drive<S: Session>(mut lifecycle: Lifecycle, session: S) -> Reply {
    let mut session = SessionGuard::new(session);
    let mut pending: Option<Event> = None;

    loop {
        let event = match pending.take() {
            Some(event) => event,
            None => observe(lifecycle.state(), &mut *session),
        };

        match lifecycle.transition(event) {
            Effect::Continue => {}
            Effect::Retry => session.ready().await,
            Effect::Submit(query) => {
                if let Err(err) = session.submit(query) {
                    pending = Some(Event::SubmitFailed(err));
                }
            }
            Effect::ContinueAfterRow => session.continue_after_row(),
            Effect::Complete(reply) => {
                session.release();
                return reply;
            }
        }
    }
}

fn observe<S: Session>(state: State, session: &mut S) -> Event {
    match state {
        State::Init => Event::Opened(session.open()),
        State::Query => Event::Dispatch,
        State::Wait => Event::Polled(session.poll()),
        State::Read => Event::Rows(read_rows(&*session)),
        State::Done | State::Error => Event::Finish,
    }
}

fn read_rows<S: Session>(session: &S) -> Vec<Row> {
    (0..session.row_count())
        .map(|row| [0, 1, 2].map(|col| session.get(row, col).map(<[u8]>::to_vec)))
        .collect()
}
