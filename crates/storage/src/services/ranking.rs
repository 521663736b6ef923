use sqlx::SqliteConnection;

use crate::error::Result;

/// Standard competition ranking: rank(x) = 1 + number of strictly greater
/// scores. Ties share a rank and the next distinct score skips by the number
/// of tied rows above it. Input and output are (round_score_id, score/rank)
/// pairs; order of the input does not matter.
pub fn competition_ranks(scored: &[(i64, f64)]) -> Vec<(i64, i64)> {
    let mut ordered: Vec<(i64, f64)> = scored.to_vec();
    ordered.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut ranks = Vec::with_capacity(ordered.len());
    let mut current_rank = 0;
    let mut previous: Option<f64> = None;

    for (idx, (round_score_id, score)) in ordered.iter().enumerate() {
        if previous != Some(*score) {
            current_rank = idx as i64 + 1;
            previous = Some(*score);
        }
        ranks.push((*round_score_id, current_rank));
    }

    ranks
}

/// Recompute `rank_in_round` for an entire round from the current score
/// multiset. Always full-round, never incremental, so the result is correct
/// under any edit order. Runs on the caller's connection so it joins the
/// surrounding transaction; rows without a score get a NULL rank.
pub async fn recompute_round_ranks(conn: &mut SqliteConnection, round_id: i64) -> Result<()> {
    let scored: Vec<(i64, f64)> = sqlx::query_as(
        r#"
        SELECT round_score_id, score
        FROM round_scores
        WHERE round_id = ? AND score IS NOT NULL
        "#,
    )
    .bind(round_id)
    .fetch_all(&mut *conn)
    .await?;

    sqlx::query("UPDATE round_scores SET rank_in_round = NULL WHERE round_id = ? AND score IS NULL")
        .bind(round_id)
        .execute(&mut *conn)
        .await?;

    for (round_score_id, rank) in competition_ranks(&scored) {
        sqlx::query("UPDATE round_scores SET rank_in_round = ? WHERE round_score_id = ?")
            .bind(rank)
            .bind(round_score_id)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}
