// Scripted stand-in for a real instrument. A command with nothing queued reads as a timeout

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{Error, Result};

use super::Transport;

enum Scripted {
	Text(String),
	Timeout,
}

#[derive(Default)]
struct SimState {
	replies: HashMap<String, VecDeque<Scripted>>,
	pending: Option<Scripted>,
	written: Vec<Vec<u8>>,
	closed: bool,
	close_calls: usize,
}

/// Cloning yields another handle to the same simulated instrument, so a test
/// can keep one while the session owns the other.
#[derive(Clone, Default)]
pub struct SimulatedInstrument {
	state: Arc<Mutex<SimState>>,
}

fn command_text(data:&[u8]) -> String {
	String::from_utf8_lossy(data).trim_end_matches(|c| c == '\r' || c == '\n').to_owned()
}

impl SimulatedInstrument {

	pub fn new() -> Self { Self::default() }

	fn state(&self) -> MutexGuard<'_, SimState> {
		self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
	}

	fn push(&self, cmd:&str, s:Scripted) -> &Self {
		self.state().replies.entry(cmd.to_owned()).or_default().push_back(s);
		self
	}

	/// Queues `reply` for the next time `cmd` is written.
	pub fn on(&self, cmd:&str, reply:&str) -> &Self { self.push(cmd, Scripted::Text(reply.to_owned())) }

	/// Makes the next `cmd` go unanswered.
	pub fn on_timeout(&self, cmd:&str) -> &Self { self.push(cmd, Scripted::Timeout) }

	/// Commands received so far, without their termination.
	pub fn written(&self) -> Vec<String> {
		self.state().written.iter().map(|w| command_text(w)).collect()
	}

	pub fn raw_written(&self) -> Vec<Vec<u8>> { self.state().written.clone() }

	pub fn is_closed(&self) -> bool { self.state().closed }

	pub fn close_count(&self) -> usize { self.state().close_calls }

}

impl Transport for SimulatedInstrument {

	fn write(&mut self, data:&[u8]) -> Result<()> {
		let mut state = self.state();
		if state.closed { return Err(Error::Closed); }

		let cmd = command_text(data);
		let next = state.replies.get_mut(&cmd).and_then(|q| q.pop_front());
		state.pending = next;
		state.written.push(data.to_vec());
		Ok(())
	}

	fn read(&mut self) -> Result<Vec<u8>> {
		let mut state = self.state();
		if state.closed { return Err(Error::Closed); }

		match state.pending.take() {
			Some(Scripted::Text(t)) => Ok(format!("{}\n", t).into_bytes()),
			Some(Scripted::Timeout) | None => Err(Error::Timeout),
		}
	}

	fn close(&mut self) -> Result<()> {
		let mut state = self.state();
		state.closed = true;
		state.close_calls += 1;
		Ok(())
	}

}
