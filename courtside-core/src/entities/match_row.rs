use crate::entities::MatchStatus;
use crate::framework::DatabaseProcessor;
use compact_str::{CompactString, format_compact};
use courtside_sdk::objects::{MatchSnapshot, TeamSide};
use kanau::processor::Processor;

/// The side columns of a match, read inside the aggregation transaction to
/// route a score increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct MatchSides {
    pub id: i64,
    pub home_team_id: i64,
    pub visitor_team_id: i64,
}

/// Which side of the match a team plays on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Home,
    Visitor,
}

impl MatchSides {
    /// Fetch the side columns of a match inside an open transaction.
    pub async fn get_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        match_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, MatchSides>(
            "SELECT id, home_team_id, visitor_team_id FROM matches WHERE id = $1",
        )
        .bind(match_id)
        .fetch_optional(&mut **tx)
        .await
    }

    /// Atomic relative increment of one side's running score. The delta is
    /// applied by the storage engine, not read-modify-written, so
    /// concurrent appliers of the same match cannot lose updates.
    pub async fn add_score_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        match_id: i64,
        side: Side,
        delta: i32,
    ) -> Result<(), sqlx::Error> {
        let sql = match side {
            Side::Home => "UPDATE matches SET home_score = home_score + $1 WHERE id = $2",
            Side::Visitor => "UPDATE matches SET visitor_score = visitor_score + $1 WHERE id = $2",
        };
        sqlx::query(sql)
            .bind(delta)
            .bind(match_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}

/// Joined match + team row backing a `MatchSnapshot`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MatchSnapshotRow {
    pub id: i64,
    pub date: time::Date,
    pub season: CompactString,
    pub home_team_id: i64,
    pub visitor_team_id: i64,
    pub home_score: i32,
    pub visitor_score: i32,
    pub status: MatchStatus,
    pub start_time: time::PrimitiveDateTime,
    pub home_team_name: CompactString,
    pub home_team_abbr: CompactString,
    pub visitor_team_name: CompactString,
    pub visitor_team_abbr: CompactString,
}

impl MatchSnapshotRow {
    /// Convert the row (DB model) into a `MatchSnapshot` (API model).
    pub fn into_snapshot(self) -> MatchSnapshot {
        MatchSnapshot {
            id: self.id,
            date: format_compact!(
                "{:04}-{:02}-{:02}",
                self.date.year(),
                u8::from(self.date.month()),
                self.date.day()
            ),
            season: self.season,
            status: self.status.into(),
            start_time: format_compact!(
                "{:02}:{:02}",
                self.start_time.hour(),
                self.start_time.minute()
            ),
            home: TeamSide {
                team_id: self.home_team_id,
                name: self.home_team_name,
                abbreviation: self.home_team_abbr,
                score: self.home_score,
            },
            visitor: TeamSide {
                team_id: self.visitor_team_id,
                name: self.visitor_team_name,
                abbreviation: self.visitor_team_abbr,
                score: self.visitor_score,
            },
        }
    }
}

const SNAPSHOT_SELECT: &str = "SELECT m.id, m.date, m.season, m.home_team_id, m.visitor_team_id, \
     m.home_score, m.visitor_score, m.status, m.start_time, \
     ht.name AS home_team_name, ht.abbreviation AS home_team_abbr, \
     vt.name AS visitor_team_name, vt.abbreviation AS visitor_team_abbr \
     FROM matches m \
     JOIN teams ht ON ht.id = m.home_team_id \
     JOIN teams vt ON vt.id = m.visitor_team_id";

/// Fetch the joined snapshot row for one match.
#[derive(Debug, Clone)]
pub struct GetMatchSnapshot {
    pub match_id: i64,
}

impl Processor<GetMatchSnapshot> for DatabaseProcessor {
    type Output = Option<MatchSnapshotRow>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetMatchSnapshot")]
    async fn process(
        &self,
        query: GetMatchSnapshot,
    ) -> Result<Option<MatchSnapshotRow>, sqlx::Error> {
        sqlx::query_as::<_, MatchSnapshotRow>(&format!("{SNAPSHOT_SELECT} WHERE m.id = $1"))
            .bind(query.match_id)
            .fetch_optional(&self.pool)
            .await
    }
}

/// Fetch one day's matches ordered by tip-off time.
#[derive(Debug, Clone)]
pub struct ListMatchesByDate {
    pub date: time::Date,
}

impl Processor<ListMatchesByDate> for DatabaseProcessor {
    type Output = Vec<MatchSnapshotRow>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListMatchesByDate")]
    async fn process(
        &self,
        query: ListMatchesByDate,
    ) -> Result<Vec<MatchSnapshotRow>, sqlx::Error> {
        sqlx::query_as::<_, MatchSnapshotRow>(&format!(
            "{SNAPSHOT_SELECT} WHERE m.date = $1 ORDER BY m.start_time ASC"
        ))
        .bind(query.date)
        .fetch_all(&self.pool)
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    fn row() -> MatchSnapshotRow {
        MatchSnapshotRow {
            id: 42,
            date: date!(2024 - 03 - 01),
            season: "2023-24".into(),
            home_team_id: 7,
            visitor_team_id: 9,
            home_score: 101,
            visitor_score: 99,
            status: MatchStatus::InProgress,
            start_time: datetime!(2024-03-01 19:30),
            home_team_name: "Hawks".into(),
            home_team_abbr: "ATL".into(),
            visitor_team_name: "Celtics".into(),
            visitor_team_abbr: "BOS".into(),
        }
    }

    #[test]
    fn snapshot_formats_date_and_start_time() {
        let snapshot = row().into_snapshot();
        assert_eq!(snapshot.date, "2024-03-01");
        assert_eq!(snapshot.start_time, "19:30");
        assert_eq!(snapshot.home.score, 101);
        assert_eq!(snapshot.visitor.team_id, 9);
    }
}
