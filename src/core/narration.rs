//! Flavor text for Twisted Roulette shots.
//!
//! Templates use `{killer}` and `{victim}` placeholders; self-inflicted lines only use
//! `{victim}`. Callers pass already-formatted names (usually Discord mentions).

use crate::core::roulette::Shot;
use rand::{Rng, seq::IndexedRandom};

const KILL_TEXTS: &[&str] = &[
    "{killer} blew {victim}'s head off!",
    "And that's a headshot! {victim} was killed by {killer}.",
    "{victim} was destroyed by {killer}!",
    "{victim} killed by {killer}. Now that's one step closer to winning!",
];

const MISS_TEXTS: &[&str] = &[
    "{killer} tried killing {victim} but seems like their luck ran out.",
    "{killer} tried killing {victim} but they missed their shot!",
    "{killer} pulled the trigger at {victim} but the chamber was empty!",
];

const SELF_KILL_TEXTS: &[&str] = &[
    "{victim} decided to gamble it all and died to themself!",
    "Seems like {victim}'s luck ran out and died to themself!",
];

const SELF_MISS_TEXTS: &[&str] = &[
    "{victim} decided to gamble it all and survived! They get an extra round to shoot!",
    "{victim} tried to shoot themself and survived! They get an extra round to shoot!",
];

/// Picks a line describing `shot`.
pub fn describe_shot<R: Rng + ?Sized>(
    shot: &Shot,
    killer: &str,
    victim: &str,
    rng: &mut R,
) -> String {
    let templates = match (shot.hit, shot.is_self_target()) {
        (true, false) => KILL_TEXTS,
        (false, false) => MISS_TEXTS,
        (true, true) => SELF_KILL_TEXTS,
        (false, true) => SELF_MISS_TEXTS,
    };
    let template = templates.choose(rng).copied().unwrap_or_default();
    template
        .replace("{killer}", killer)
        .replace("{victim}", victim)
}
