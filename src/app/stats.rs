//! Stats Reporter: read-only aggregates over a user's library.

use crate::domain::error::{LedgerError, LedgerResult};
use crate::domain::views::{GenreStat, MonthStat, StatsView, UserId};
use crate::storage::Store;
use sqlx::Row;

/// Months reported before the current one.
pub const MONTHS_BACK: i32 = 5;

#[derive(Clone)]
pub struct StatsReporter {
    store: Store,
}

impl StatsReporter {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn stats(&self, user_id: UserId) -> LedgerResult<StatsView> {
        let genres = self.finished_by_genre(user_id).await?;
        let months = self.added_by_month(user_id).await?;
        Ok(StatsView { genres, months })
    }

    async fn finished_by_genre(&self, user_id: UserId) -> LedgerResult<Vec<GenreStat>> {
        self.store
            .run(async {
                let rows = sqlx::query(
                    "SELECT g.name AS genre, COUNT(*) AS cnt
                     FROM user_books ub
                     JOIN book_genres bg ON bg.book_id = ub.book_id
                     JOIN genres g ON g.id = bg.genre_id
                     WHERE ub.user_id = $1 AND ub.status = 'finished'
                     GROUP BY g.name
                     ORDER BY cnt DESC, g.name",
                )
                .bind(user_id)
                .fetch_all(self.store.pool())
                .await?;

                let mut out = Vec::with_capacity(rows.len());
                for row in rows {
                    out.push(GenreStat {
                        genre: row.try_get("genre")?,
                        cnt: row.try_get("cnt")?,
                    });
                }
                Ok::<_, LedgerError>(out)
            })
            .await
    }

    /// Library additions per calendar month, oldest first. Months without
    /// additions are absent.
    async fn added_by_month(&self, user_id: UserId) -> LedgerResult<Vec<MonthStat>> {
        self.store
            .run(async {
                let rows = sqlx::query(
                    "SELECT to_char(date_trunc('month', ub.created_at), 'YYYY-MM') AS month,
                            COUNT(*) AS cnt
                     FROM user_books ub
                     WHERE ub.user_id = $1
                       AND ub.created_at >= date_trunc('month', now()) - make_interval(months => $2)
                     GROUP BY 1
                     ORDER BY 1",
                )
                .bind(user_id)
                .bind(MONTHS_BACK)
                .fetch_all(self.store.pool())
                .await?;

                let mut out = Vec::with_capacity(rows.len());
                for row in rows {
                    out.push(MonthStat {
                        month: row.try_get("month")?,
                        cnt: row.try_get("cnt")?,
                    });
                }
                Ok::<_, LedgerError>(out)
            })
            .await
    }
}
