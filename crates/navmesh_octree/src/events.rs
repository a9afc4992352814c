//! World change feed - actor lifecycle events consumed by the updater.
//!
//! The host pushes events from wherever its scene changes; the updater
//! drains them on its own thread of control before each tick.

use crossbeam_channel::{self as channel, Receiver, Sender};

use crate::constants::ActorKey;
use crate::spatial::Bounds;

/// A change to collision-bearing geometry in the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorldEvent {
	ActorAdded { key: ActorKey, bounds: Bounds },
	ActorRemoved { key: ActorKey, bounds: Bounds },
	/// Bounds before and after a transform change.
	ActorMoved {
		key: ActorKey,
		previous: Bounds,
		current: Bounds,
	},
}

impl WorldEvent {
	#[inline]
	pub fn key(&self) -> ActorKey {
		match *self {
			WorldEvent::ActorAdded { key, .. } | WorldEvent::ActorRemoved { key, .. } | WorldEvent::ActorMoved { key, .. } => key,
		}
	}
}

/// Unbounded feed between the host and the updater.
pub fn event_channel() -> (Sender<WorldEvent>, Receiver<WorldEvent>) {
	channel::unbounded()
}

#[cfg(test)]
mod tests {
	use super::*;
	use glam::IVec3;

	#[test]
	fn test_event_key() {
		let bounds = Bounds::from_min_size(IVec3::ZERO, IVec3::ONE);
		assert_eq!(WorldEvent::ActorAdded { key: 3, bounds }.key(), 3);
		assert_eq!(
			WorldEvent::ActorMoved {
				key: 9,
				previous: bounds,
				current: bounds
			}
			.key(),
			9
		);
	}

	#[test]
	fn test_event_channel_preserves_order() {
		let (sender, receiver) = event_channel();
		let bounds = Bounds::EMPTY;
		for key in 0..3 {
			sender.send(WorldEvent::ActorRemoved { key, bounds }).unwrap();
		}
		let keys: Vec<_> = receiver.try_iter().map(|e| e.key()).collect();
		assert_eq!(keys, vec![0, 1, 2]);
	}
}
