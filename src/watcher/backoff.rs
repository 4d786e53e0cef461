/* src/watcher/backoff.rs */

use std::time::Duration;

/// Exponential delay between resubscribe attempts.
///
/// Starts at `initial`, doubles per attempt and never exceeds `max`.
#[derive(Debug, Clone)]
pub struct Backoff {
	initial: Duration,
	max: Duration,
	next: Duration,
}

impl Backoff {
	pub fn new(initial: Duration, max: Duration) -> Self {
		let max = max.max(initial);
		Self {
			initial,
			max,
			next: initial,
		}
	}

	/// Returns the delay for this attempt and advances to the next one.
	pub fn next_delay(&mut self) -> Duration {
		let delay = self.next;
		self.next = self.next.checked_mul(2).unwrap_or(self.max).min(self.max);
		delay
	}

	/// Starts over from the initial delay.
	pub fn reset(&mut self) {
		self.next = self.initial;
	}
}
