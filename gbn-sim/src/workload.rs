//! Application traffic generation

use crate::clock::SimTime;
use crate::config::WorkloadConfig;
use crate::entity::Entity;
use rand::Rng;
use std::time::Duration;

const FILLER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

/// Build the payload schedule for a run, sorted by submission time.
///
/// Each sending entity submits `messages` payloads. Gaps between consecutive
/// payloads of one entity are uniform in `0..=2 * mean_gap_ms`.
pub fn generate<R: Rng>(config: &WorkloadConfig, rng: &mut R) -> Vec<(SimTime, Entity, String)> {
    let mut schedule = Vec::with_capacity(config.messages * config.senders.len());

    for &entity in &config.senders {
        let mut at = SimTime::ZERO;
        for index in 0..config.messages {
            let gap = rng.gen_range(0..=config.mean_gap_ms.saturating_mul(2));
            at = at + Duration::from_millis(gap);
            schedule.push((at, entity, payload(entity, index, config.payload_len)));
        }
    }

    schedule.sort_by_key(|(at, _, _)| *at);
    schedule
}

/// A payload tagged with its origin, e.g. `A-3:abcdefg`
pub fn payload(entity: Entity, index: usize, len: usize) -> String {
    let mut payload = format!("{}-{}:", entity, index);
    let missing = len.saturating_sub(payload.len());
    payload.extend(FILLER.iter().cycle().take(missing).map(|&c| c as char));
    payload
}
