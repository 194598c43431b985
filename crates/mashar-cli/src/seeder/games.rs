use fake::Fake;
use fake::faker::lorem::en::{Sentence, Word};
use mashar_core::generate_uid;
use mashar_models::games::STAGES_PER_TEAM;
use mashar_models::{Riddle, Team, TeamData};
use rand::Rng;
use rayon::prelude::*;
use sqlx::PgPool;
use sqlx::types::Json;
use std::time::Instant;

use super::models::GameSeed;

fn generate_team(team: Team) -> TeamData {
    let mut rng = rand::thread_rng();
    let (color, bg_color) = team.colors();

    TeamData {
        team,
        color: color.to_string(),
        bg_color: bg_color.to_string(),
        riddles: (1..=STAGES_PER_TEAM)
            .map(|index| Riddle {
                index,
                img: String::new(),
                vec_size: vec![f64::from(rng.gen_range(1..=20_i32) * 10)],
                vec_angle: vec![f64::from(rng.gen_range(0..12_i32) * 30)],
                riddle: (0..3).map(|_| Sentence(3..8).fake()).collect(),
            })
            .collect(),
    }
}

pub fn generate_games(branches: &[String], games_per_branch: usize) -> Vec<GameSeed> {
    branches
        .par_iter()
        .flat_map(|branch| {
            (0..games_per_branch)
                .map(|_| {
                    let word: String = Word().fake();
                    GameSeed {
                        uid: generate_uid(),
                        name: format!("Treasure hunt {word}"),
                        branch: branch.clone(),
                        teams: Team::ALL.map(generate_team),
                    }
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

pub async fn seed_games(
    db: &PgPool,
    branches: &[String],
    games_per_branch: usize,
) -> Result<usize, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🧭 Seeding {} games...", branches.len() * games_per_branch);

    let games = generate_games(branches, games_per_branch);

    let mut tx = db.begin().await?;
    for game in &games {
        let [red, blue, green] = &game.teams;
        sqlx::query(
            "INSERT INTO games (uid, game_name, readable_name, branch, active, red, blue, green)
             VALUES ($1, $1, $2, $3, FALSE, $4, $5, $6)",
        )
        .bind(&game.uid)
        .bind(&game.name)
        .bind(&game.branch)
        .bind(Json(red))
        .bind(Json(blue))
        .bind(Json(green))
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    println!("   ✓ Inserted {} games in {:?}", games.len(), start_time.elapsed());
    Ok(games.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_games_have_full_routes() {
        let games = generate_games(&["seed-1".to_string()], 2);
        assert_eq!(games.len(), 2);

        for game in &games {
            for (team, data) in Team::ALL.iter().zip(&game.teams) {
                assert_eq!(&data.team, team);
                assert_eq!(data.riddles.len(), STAGES_PER_TEAM as usize);
                assert!(data.riddles.iter().all(|r| r.vec_size.len() == r.vec_angle.len()));
            }
        }
    }
}
