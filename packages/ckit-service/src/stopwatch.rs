use std::{fmt::Display, time::Duration};

use tokio::time::Instant;

/// Named checkpoints within one resolution, logged together when the request ends.
#[derive(Debug)]
pub struct Stopwatch {
	enabled: bool,
	started: Instant,
	laps: Vec<Lap>,
}
impl Stopwatch {
	pub fn new(enabled: bool) -> Self {
		Self { enabled, started: Instant::now(), laps: Vec::new() }
	}

	pub fn record(&mut self, message: impl Display) {
		if !self.enabled {
			return;
		}

		self.laps.push(Lap { at: Instant::now(), message: message.to_string() });
	}

	pub fn laps(&self) -> impl Iterator<Item = (Duration, Duration, &str)> {
		let mut previous = self.started;

		self.laps.iter().map(move |lap| {
			let delta = lap.at.saturating_duration_since(previous);

			previous = lap.at;

			(delta, lap.at.saturating_duration_since(self.started), lap.message.as_str())
		})
	}

	pub fn log(&self, id: &str) {
		if !self.enabled {
			return;
		}

		for (step, (delta, total, message)) in self.laps().enumerate() {
			tracing::info!(
				id,
				step,
				delta_ms = delta.as_secs_f64() * 1_000.0,
				total_ms = total.as_secs_f64() * 1_000.0,
				"{message}"
			);
		}
	}
}

#[derive(Debug)]
struct Lap {
	at: Instant,
	message: String,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn disabled_stopwatch_records_nothing() {
		let mut sw = Stopwatch::new(false);

		sw.record("found doi");

		assert_eq!(sw.laps().count(), 0);
	}

	#[tokio::test(start_paused = true)]
	async fn laps_report_delta_and_total() {
		let mut sw = Stopwatch::new(true);

		tokio::time::advance(Duration::from_millis(10)).await;
		sw.record(format_args!("found {} edges", 3));
		tokio::time::advance(Duration::from_millis(5)).await;
		sw.record("fetched blobs");

		let laps = sw.laps().collect::<Vec<_>>();

		assert_eq!(laps[0], (Duration::from_millis(10), Duration::from_millis(10), "found 3 edges"));
		assert_eq!(laps[1], (Duration::from_millis(5), Duration::from_millis(15), "fetched blobs"));
	}
}
