//! Shapes stored games into their edit-form and list views, and form input
//! back into stored team data.

use std::collections::{HashMap, HashSet};

use anyhow::anyhow;
use mashar_core::AppError;
use mashar_models::games::{
    Game, GameForm, GameListItem, Riddle, RiddleForm, STAGES_PER_TEAM, TeamData, TeamForm,
};
use mashar_models::Team;

use crate::utils::dates::display_date;

pub const EMPTY_IMAGE: &str = "empty.png";
pub const INITIAL_VERSION: &str = "1.0";

const PLACEHOLDER_RIDDLE: [&str; 4] = [
    "Riddle text goes here",
    "Write each clue on its own line",
    "Describe the next location",
    "Good luck!",
];

/// Riddle lines as edited text: every line trimmed and newline-terminated.
pub fn join_riddle_lines(lines: &[String]) -> String {
    lines.iter().map(|l| format!("{}\n", l.trim())).collect()
}

/// Edited text back to lines; blank lines are dropped.
pub fn split_riddle_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// File name only, without any directory prefix.
pub fn strip_image_path(src: &str) -> &str {
    src.rsplit_once('/').map_or(src, |(_, name)| name)
}

/// Numbers as the strings the edit form expects (`100`, not `100.0`).
fn format_number(n: f64) -> String {
    n.to_string()
}

fn parse_numbers(values: &[String], field: &str, team: Team, index: i32) -> Result<Vec<f64>, AppError> {
    values
        .iter()
        .map(|v| {
            v.trim().parse::<f64>().ok().filter(|n| n.is_finite()).ok_or_else(|| {
                AppError::bad_request(anyhow!(
                    "{team} riddle {index}: {field} `{v}` is not a number"
                ))
            })
        })
        .collect()
}

pub fn riddle_form(riddle: &Riddle) -> RiddleForm {
    RiddleForm {
        index: riddle.index,
        img: strip_image_path(&riddle.img).to_string(),
        vec_size: riddle.vec_size.iter().copied().map(format_number).collect(),
        vec_angle: riddle.vec_angle.iter().copied().map(format_number).collect(),
        riddle: join_riddle_lines(&riddle.riddle),
    }
}

pub fn team_form(team: &TeamData) -> TeamForm {
    TeamForm {
        team: team.team,
        color: team.color.clone(),
        bg_color: team.bg_color.clone(),
        riddles: team.riddles.iter().map(riddle_form).collect(),
    }
}

/// Full edit-form view of `game`.
pub fn game_form(game: &Game, branch_name: &str) -> GameForm {
    GameForm {
        uid: game.uid.clone(),
        game_name: game.game_name.clone(),
        readable_name: game.readable_name.clone(),
        branch: branch_name.to_string(),
        branch_code: game.branch.clone(),
        date: display_date(&game.date),
        version: game.version.clone(),
        active: game.active,
        red: team_form(&game.red),
        blue: team_form(&game.blue),
        green: team_form(&game.green),
    }
}

/// List rows. Branch names come from `branch_names` (code to name); a game
/// is `activeGame` when its code is in `running`.
pub fn game_list(
    games: &[Game],
    branch_names: &HashMap<String, String>,
    running: &HashSet<String>,
) -> Vec<GameListItem> {
    games
        .iter()
        .map(|game| GameListItem {
            uid: game.uid.clone(),
            game_name: game.game_name.clone(),
            readable_name: game.readable_name.clone(),
            branch_code: game.branch.clone(),
            branch_name: branch_names
                .get(&game.branch)
                .cloned()
                .unwrap_or_else(|| game.branch.clone()),
            version: game.version.clone(),
            active: game.active,
            active_game: running.contains(&game.uid),
            date: display_date(&game.date),
        })
        .collect()
}

/// Form input back to stored team data. The team colour falls back to the
/// team default when the form leaves it empty.
pub fn team_from_form(expected: Team, form: &TeamForm) -> Result<TeamData, AppError> {
    if form.team != expected {
        return Err(AppError::bad_request(anyhow!(
            "Expected {expected} team data, got {}",
            form.team
        )));
    }

    check_stage_numbers(expected, &form.riddles)?;

    let (color, bg_color) = expected.colors();
    let mut riddles = form
        .riddles
        .iter()
        .map(|r| {
            let vec_size = parse_numbers(&r.vec_size, "vector size", expected, r.index)?;
            let vec_angle = parse_numbers(&r.vec_angle, "vector angle", expected, r.index)?;
            if vec_size.is_empty() || vec_angle.is_empty() {
                return Err(AppError::bad_request(anyhow!(
                    "{expected} riddle {}: a vector size and angle are required",
                    r.index
                )));
            }
            Ok(Riddle {
                index: r.index,
                img: if r.img.trim().is_empty() {
                    EMPTY_IMAGE.to_string()
                } else {
                    strip_image_path(r.img.trim()).to_string()
                },
                vec_size,
                vec_angle,
                riddle: split_riddle_lines(&r.riddle),
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;
    riddles.sort_by_key(|r| r.index);

    Ok(TeamData {
        team: expected,
        color: non_empty_or(&form.color, color),
        bg_color: non_empty_or(&form.bg_color, bg_color),
        riddles,
    })
}

/// Exactly one riddle per stage, numbered 1 to `STAGES_PER_TEAM`.
fn check_stage_numbers(team: Team, riddles: &[RiddleForm]) -> Result<(), AppError> {
    if riddles.len() != STAGES_PER_TEAM as usize {
        return Err(AppError::bad_request(anyhow!(
            "{team} team needs {STAGES_PER_TEAM} riddles, got {}",
            riddles.len()
        )));
    }
    let indices: HashSet<i32> = riddles.iter().map(|r| r.index).collect();
    if indices != (1..=STAGES_PER_TEAM).collect() {
        return Err(AppError::bad_request(anyhow!(
            "{team} riddles must be numbered 1 to {STAGES_PER_TEAM}"
        )));
    }
    Ok(())
}

fn non_empty_or(value: &str, default: &str) -> String {
    if value.trim().is_empty() {
        default.to_string()
    } else {
        value.trim().to_string()
    }
}

/// Five placeholder stages for a new game.
pub fn default_team(team: Team) -> TeamData {
    let (color, bg_color) = team.colors();
    TeamData {
        team,
        color: color.to_string(),
        bg_color: bg_color.to_string(),
        riddles: (1..=STAGES_PER_TEAM)
            .map(|index| Riddle {
                index,
                img: EMPTY_IMAGE.to_string(),
                vec_size: vec![100.0],
                vec_angle: vec![30.0],
                riddle: PLACEHOLDER_RIDDLE.iter().map(|l| l.to_string()).collect(),
            })
            .collect(),
    }
}

/// Copy of `team` with every image reset, for clones into another branch.
pub fn without_images(team: &TeamData) -> TeamData {
    let mut team = team.clone();
    for riddle in &mut team.riddles {
        riddle.img = EMPTY_IMAGE.to_string();
    }
    team
}

/// Next version: +0.1, one decimal. Unparseable versions restart at 1.0.
pub fn bump_version(version: &str) -> String {
    match version.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => format!("{:.1}", v + 0.1),
        _ => INITIAL_VERSION.to_string(),
    }
}
