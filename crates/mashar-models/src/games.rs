//! Treasure-hunt games and their run-time status.
//!
//! A [`Game`] is the static definition: three teams, each with five riddle
//! stages. A [`GameStatusRecord`] is the live record of one run, holding
//! the ordered [`Attempt`] list for every team.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use mashar_core::PaginationMeta;
use mashar_core::serde::{deserialize_bool_or_string, deserialize_string_or_number};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::GameId;

/// Number of riddle stages per team.
pub const STAGES_PER_TEAM: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Red,
    Blue,
    Green,
}

impl Team {
    pub const ALL: [Team; 3] = [Team::Red, Team::Blue, Team::Green];

    /// Column holding this team's data in `games` and `game_statuses`.
    pub fn column(&self) -> &'static str {
        match self {
            Team::Red => "red",
            Team::Blue => "blue",
            Team::Green => "green",
        }
    }

    /// Foreground and background colours shown for the team.
    pub fn colors(&self) -> (&'static str, &'static str) {
        match self {
            Team::Red => ("#c0514d", "#ff8f9a"),
            Team::Blue => ("#4f81bd", "#94c4ff"),
            Team::Green => ("#9bba59", "#96dd89"),
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Team {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "red" => Ok(Team::Red),
            "blue" => Ok(Team::Blue),
            "green" => Ok(Team::Green),
            other => Err(format!("Unknown team: {other}")),
        }
    }
}

/// One stage of a team's route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Riddle {
    /// 1-based stage number
    pub index: i32,
    pub img: String,
    /// Accepted vector sizes, paired by position with `vec_angle`
    pub vec_size: Vec<f64>,
    /// Accepted vector angles in degrees
    pub vec_angle: Vec<f64>,
    /// Riddle text, one entry per line
    pub riddle: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamData {
    pub team: Team,
    pub color: String,
    pub bg_color: String,
    pub riddles: Vec<Riddle>,
}

impl TeamData {
    pub fn riddle(&self, index: i32) -> Option<&Riddle> {
        self.riddles.iter().find(|r| r.index == index)
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct Game {
    pub id: GameId,
    pub uid: String,
    pub game_name: String,
    pub readable_name: String,
    pub branch: String,
    pub version: String,
    pub active: bool,
    pub date: DateTime<Utc>,
    pub red: Json<TeamData>,
    pub blue: Json<TeamData>,
    pub green: Json<TeamData>,
}

impl Game {
    pub fn team(&self, team: Team) -> &TeamData {
        match team {
            Team::Red => &self.red,
            Team::Blue => &self.blue,
            Team::Green => &self.green,
        }
    }
}

/// One submitted answer for a stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Attempt {
    pub stage: i32,
    pub success: bool,
    /// Human-readable outcome, e.g. "Correct vector"
    pub status: String,
}

impl Attempt {
    pub fn new(stage: i32, success: bool, status: impl Into<String>) -> Self {
        Self {
            stage,
            success,
            status: status.into(),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct GameStatusRecord {
    pub game_code: String,
    pub branch_code: String,
    pub active: bool,
    pub start_time: Option<DateTime<Utc>>,
    pub red: Json<Vec<Attempt>>,
    pub blue: Json<Vec<Attempt>>,
    pub green: Json<Vec<Attempt>>,
    /// Bumped on every write
    pub version: i64,
}

impl GameStatusRecord {
    pub fn attempts(&self, team: Team) -> &[Attempt] {
        match team {
            Team::Red => &self.red,
            Team::Blue => &self.blue,
            Team::Green => &self.green,
        }
    }
}

/// Aggregate progress of one team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamProgress {
    pub stage: i32,
    pub success: bool,
    pub num_tries: u32,
}

/// Whole-game status. An inactive game serializes as `{"started":false}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameStatusView {
    pub started: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub red: Option<TeamProgress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blue: Option<TeamProgress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub green: Option<TeamProgress>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VectorMessage {
    pub err_msg: String,
    pub info_msg: String,
}

/// Response of a vector check: `{"result":{"errMsg":..,"infoMsg":..}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VectorResult {
    pub result: VectorMessage,
}

impl VectorResult {
    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            result: VectorMessage {
                err_msg: msg.into(),
                info_msg: String::new(),
            },
        }
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Self {
            result: VectorMessage {
                err_msg: String::new(),
                info_msg: msg.into(),
            },
        }
    }

    pub fn is_error(&self) -> bool {
        !self.result.err_msg.is_empty()
    }
}

/// Query form of a vector submission; both values may be missing.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct VectorQuery {
    pub vector_size: Option<String>,
    pub vector_angle: Option<String>,
}

fn deserialize_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Item(#[serde(deserialize_with = "deserialize_string_or_number")] String);

    let items = Vec::<Item>::deserialize(deserializer)?;
    Ok(items.into_iter().map(|i| i.0).collect())
}

/// Riddle as shown in (and posted back from) the edit form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RiddleForm {
    pub index: i32,
    #[serde(default)]
    pub img: String,
    #[serde(default, deserialize_with = "deserialize_string_list")]
    pub vec_size: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_string_list")]
    pub vec_angle: Vec<String>,
    /// Newline-terminated lines
    #[serde(default)]
    pub riddle: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamForm {
    pub team: Team,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub bg_color: String,
    pub riddles: Vec<RiddleForm>,
}

/// Full edit-form view of a game.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameForm {
    pub uid: String,
    pub game_name: String,
    pub readable_name: String,
    /// Branch display name
    pub branch: String,
    pub branch_code: String,
    /// `dd/mm/yyyy`
    pub date: String,
    pub version: String,
    pub active: bool,
    pub red: TeamForm,
    pub blue: TeamForm,
    pub green: TeamForm,
}

/// A game together with its live status, as shown on the monitor screen.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GameWithStatus {
    pub game: GameForm,
    pub status: GameStatusView,
}

/// Summary row of the game list.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameListItem {
    pub uid: String,
    pub game_name: String,
    pub readable_name: String,
    pub branch_code: String,
    pub branch_name: String,
    pub version: String,
    pub active: bool,
    /// Whether a run of this game is currently in progress
    pub active_game: bool,
    pub date: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedGamesResponse {
    pub data: Vec<GameListItem>,
    pub meta: PaginationMeta,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameDto {
    #[validate(length(min = 1, max = 100, message = "Game name is required"))]
    pub name: String,
    /// Only honoured for superadmins
    pub branch: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveGameDto {
    #[validate(length(min = 1, max = 100, message = "Game name is required"))]
    pub readable_name: String,
    #[serde(deserialize_with = "deserialize_bool_or_string")]
    pub active: bool,
    pub version: String,
    pub red: TeamForm,
    pub blue: TeamForm,
    pub green: TeamForm,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CloneGameDto {
    /// uid of the game to copy
    #[validate(length(min = 1, message = "Source game is required"))]
    pub orig_game: String,
    #[validate(length(min = 1, max = 100, message = "Game name is required"))]
    pub new_game: String,
    /// Target branch; only honoured for superadmins
    pub new_branch: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameCreatedResponse {
    pub uid: String,
    pub msg: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_parse() {
        assert_eq!("Red".parse::<Team>().unwrap(), Team::Red);
        assert_eq!(" green ".parse::<Team>().unwrap(), Team::Green);
        assert!("purple".parse::<Team>().is_err());
    }

    #[test]
    fn test_team_colors() {
        assert_eq!(Team::Red.colors(), ("#c0514d", "#ff8f9a"));
        assert_eq!(Team::Blue.colors(), ("#4f81bd", "#94c4ff"));
        assert_eq!(Team::Green.colors(), ("#9bba59", "#96dd89"));
    }

    #[test]
    fn test_inactive_status_serializes_started_only() {
        let view = GameStatusView {
            started: false,
            start_time: None,
            red: None,
            blue: None,
            green: None,
        };
        assert_eq!(serde_json::to_string(&view).unwrap(), r#"{"started":false}"#);
    }

    #[test]
    fn test_team_progress_uses_num_tries() {
        let p = TeamProgress {
            stage: 2,
            success: true,
            num_tries: 3,
        };
        let json = serde_json::to_value(p).unwrap();
        assert_eq!(json["numTries"], 3);
    }

    #[test]
    fn test_vector_result_shape() {
        let json = serde_json::to_value(VectorResult::error("bad")).unwrap();
        assert_eq!(json["result"]["errMsg"], "bad");
        assert_eq!(json["result"]["infoMsg"], "");
    }

    #[test]
    fn test_riddle_form_accepts_numbers_or_strings() {
        let form: RiddleForm = serde_json::from_str(
            r#"{"index":1,"img":"a.png","vecSize":[100,"120"],"vecAngle":["30"],"riddle":"a\n"}"#,
        )
        .unwrap();
        assert_eq!(form.vec_size, vec!["100", "120"]);
        assert_eq!(form.vec_angle, vec!["30"]);
    }

    #[test]
    fn test_save_game_accepts_string_active() {
        let team = |t: &str| {
            format!(r#"{{"team":"{t}","riddles":[]}}"#)
        };
        let json = format!(
            r#"{{"readableName":"Hunt","active":"true","version":"1.0","red":{},"blue":{},"green":{}}}"#,
            team("red"),
            team("blue"),
            team("green")
        );
        let dto: SaveGameDto = serde_json::from_str(&json).unwrap();
        assert!(dto.active);
    }
}
