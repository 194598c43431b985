//! Team progress computed from the ordered attempt log.

use mashar_models::games::{Attempt, GameStatusRecord, GameStatusView, TeamProgress};
use mashar_models::Team;

/// Progress of one team.
///
/// The current stage is that of the last attempt. Walking backwards from the
/// end, every attempt at the current stage counts as a try; the walk stops at
/// the first attempt of an earlier stage.
pub fn team_progress(attempts: &[Attempt]) -> TeamProgress {
    let Some(last) = attempts.last() else {
        return TeamProgress {
            stage: 1,
            success: false,
            num_tries: 0,
        };
    };

    let stage = last.stage;
    let mut success = false;
    let mut num_tries = 0;
    for attempt in attempts.iter().rev() {
        if attempt.stage < stage {
            break;
        }
        success |= attempt.success;
        num_tries += 1;
    }

    TeamProgress {
        stage,
        success,
        num_tries,
    }
}

/// Whole-game status. A missing or inactive record reads as not started.
pub fn game_status(record: Option<&GameStatusRecord>) -> GameStatusView {
    match record {
        Some(record) if record.active => GameStatusView {
            started: true,
            start_time: record.start_time,
            red: Some(team_progress(record.attempts(Team::Red))),
            blue: Some(team_progress(record.attempts(Team::Blue))),
            green: Some(team_progress(record.attempts(Team::Green))),
        },
        _ => not_started(),
    }
}

pub fn not_started() -> GameStatusView {
    GameStatusView {
        started: false,
        start_time: None,
        red: None,
        blue: None,
        green: None,
    }
}
