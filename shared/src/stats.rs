use crate::steam_id::{find_all, IdMatch, SteamId};
use std::collections::HashMap;

const KILL_VERB: &str = " killed ";
const DAMAGE_VERB: &str = r#" triggered "damage" against "#;
const HEAL_VERB: &str = r#" triggered "healed" against "#;
const DAMAGE_AMOUNT: &str = r#"(damage ""#;
const HEAL_AMOUNT: &str = r#"(healing ""#;

/// Combat counters for one player over one match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerStats {
    pub kills: u64,
    pub deaths: u64,
    pub damage_dealt: u64,
    pub damage_taken: u64,
    pub healing_given: u64,
    pub healing_received: u64,
}

/// Per-player counters keyed by the player id found in the log.
pub type StatTable = HashMap<SteamId, PlayerStats>;

/// A combat event recognised in a single log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatEvent {
    Elimination {
        attacker: SteamId,
        victim: SteamId,
    },
    Damage {
        attacker: SteamId,
        victim: SteamId,
        amount: u64,
    },
    Healing {
        healer: SteamId,
        target: SteamId,
        amount: u64,
    },
}

/// Classifies a line as one combat event.
///
/// Eliminations are checked first, then damage, then healing, so a line is
/// counted at most once.
pub fn parse_event(line: &str) -> Option<CombatEvent> {
    let ids = find_all(line);
    if ids.len() < 2 {
        return None;
    }

    if let Some((attacker, victim)) = actor_and_target(line, &ids, KILL_VERB, None) {
        return Some(CombatEvent::Elimination { attacker, victim });
    }

    if let Some((attacker, victim)) = actor_and_target(line, &ids, DAMAGE_VERB, Some(DAMAGE_AMOUNT))
    {
        let amount = parse_amount(line, DAMAGE_AMOUNT)?;
        return Some(CombatEvent::Damage {
            attacker,
            victim,
            amount,
        });
    }

    if let Some((healer, target)) = actor_and_target(line, &ids, HEAL_VERB, Some(HEAL_AMOUNT)) {
        let amount = parse_amount(line, HEAL_AMOUNT)?;
        return Some(CombatEvent::Healing {
            healer,
            target,
            amount,
        });
    }

    None
}

/// Folds one line into `table` and returns it. Lines that are not combat
/// events leave the table untouched.
pub fn update(line: &str, mut table: StatTable) -> StatTable {
    apply(line, &mut table);
    table
}

/// In-place variant of [`update`]. Returns the event that was applied, if any.
pub fn apply(line: &str, table: &mut StatTable) -> Option<CombatEvent> {
    let event = parse_event(line)?;

    match event {
        CombatEvent::Elimination { attacker, victim } => {
            saturating_add(&mut table.entry(attacker).or_default().kills, 1);
            saturating_add(&mut table.entry(victim).or_default().deaths, 1);
        }
        CombatEvent::Damage {
            attacker,
            victim,
            amount,
        } => {
            saturating_add(&mut table.entry(attacker).or_default().damage_dealt, amount);
            saturating_add(&mut table.entry(victim).or_default().damage_taken, amount);
        }
        CombatEvent::Healing {
            healer,
            target,
            amount,
        } => {
            saturating_add(&mut table.entry(healer).or_default().healing_given, amount);
            saturating_add(&mut table.entry(target).or_default().healing_received, amount);
        }
    }

    Some(event)
}

// Counters stop at u64::MAX instead of wrapping.
fn saturating_add(counter: &mut u64, amount: u64) {
    *counter = counter.saturating_add(amount);
}

/// The actor is the first id in the line and must precede `verb`. The target
/// is the last id after the verb (and before `amount_marker`, when given).
fn actor_and_target(
    line: &str,
    ids: &[IdMatch],
    verb: &str,
    amount_marker: Option<&str>,
) -> Option<(SteamId, SteamId)> {
    let actor = ids.first()?;
    let verb_at = actor.end + line[actor.end..].find(verb)?;
    let after_verb = verb_at + verb.len();

    let limit = match amount_marker {
        Some(marker) => after_verb + line[after_verb..].find(marker)?,
        None => line.len(),
    };

    let target = ids
        .iter()
        .rev()
        .find(|m| m.start >= after_verb && m.end <= limit)?;

    Some((actor.id, target.id))
}

fn parse_amount(line: &str, marker: &str) -> Option<u64> {
    let start = line.find(marker)? + marker.len();
    let rest = &line[start..];
    let digits = rest.find('"')?;
    rest[..digits].parse().ok()
}
