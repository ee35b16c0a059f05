use chrono::{NaiveDate, NaiveTime, Utc};
use rusqlite::{Connection, Row, params};
use tracing::debug;

use crate::error::{Result, TaskflowError};
use crate::model::{Event, EventKind, normalize_text, normalize_title};
use crate::store::db::{
    Db, date_str, new_id, opt_ts, parse_date, parse_enum, parse_opt_ts, parse_time, parse_ts,
    time_str, ts,
};

const EVENT_COLUMNS: &str =
    "id, user_id, title, description, date, time, kind, created_at, completed_at";

// Untimed events sort before timed ones on the same day.
const EVENT_ORDER: &str = "date, time IS NOT NULL, time, created_at, rowid";

fn event_from_row(row: &Row<'_>) -> rusqlite::Result<Event> {
    let time: Option<String> = row.get(5)?;
    Ok(Event {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        date: parse_date(4, &row.get::<_, String>(4)?)?,
        time: time.as_deref().map(|t| parse_time(5, t)).transpose()?,
        kind: parse_enum(6, &row.get::<_, String>(6)?)?,
        created_at: parse_ts(7, &row.get::<_, String>(7)?)?,
        completed_at: parse_opt_ts(8, row.get(8)?)?,
    })
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub kind: EventKind,
}

#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub clear_time: bool,
    pub kind: Option<EventKind>,
}

fn load_event(conn: &Connection, user: &str, id: &str) -> Result<Event> {
    let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?1 AND user_id = ?2");
    match conn.query_row(&sql, params![id, user], event_from_row) {
        Ok(event) => Ok(event),
        Err(rusqlite::Error::QueryReturnedNoRows) => {
            Err(TaskflowError::EventNotFound(id.to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

impl Db {
    pub fn add_event(&self, user: &str, new: NewEvent) -> Result<Event> {
        let title = normalize_title(&new.title).ok_or(TaskflowError::EmptyTitle)?;
        let event = Event {
            id: new_id(),
            user_id: user.to_string(),
            title,
            description: normalize_text(new.description),
            date: new.date,
            time: new.time,
            kind: new.kind,
            created_at: Utc::now(),
            completed_at: None,
        };
        self.conn().execute(
            "INSERT INTO events (id, user_id, title, description, date, time, kind, created_at, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, NULL)",
            params![
                event.id,
                event.user_id,
                event.title,
                event.description,
                date_str(event.date),
                event.time.map(time_str),
                event.kind.to_string(),
                ts(event.created_at),
            ],
        )?;
        debug!(event = %event.id, date = %event.date, "added event");
        Ok(event)
    }

    pub fn event(&self, user: &str, id: &str) -> Result<Event> {
        load_event(self.conn(), user, id)
    }

    /// Events in an inclusive date range; either bound may be open.
    pub fn events(
        &self,
        user: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<Event>> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events
             WHERE user_id = ?1
             AND (?2 IS NULL OR date >= ?2)
             AND (?3 IS NULL OR date <= ?3)
             ORDER BY {EVENT_ORDER}"
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let events = stmt
            .query_map(
                params![user, from.map(date_str), to.map(date_str)],
                event_from_row,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(events)
    }

    /// Incomplete events from `today` through `today + days`, capped at the
    /// last date the `YYYY-MM-DD` column can hold.
    pub fn upcoming_events(&self, user: &str, today: NaiveDate, days: u32) -> Result<Vec<Event>> {
        let last = NaiveDate::from_ymd_opt(9999, 12, 31).unwrap_or(NaiveDate::MAX);
        let until = today
            .checked_add_signed(chrono::Duration::days(i64::from(days)))
            .map_or(last, |d| d.min(last));
        let mut events = self.events(user, Some(today), Some(until))?;
        events.retain(|e| e.completed_at.is_none());
        Ok(events)
    }

    pub fn edit_event(&self, user: &str, id: &str, patch: EventPatch) -> Result<Event> {
        let tx = self.write_tx()?;
        let mut event = load_event(&tx, user, id)?;
        if let Some(title) = patch.title {
            event.title = normalize_title(&title).ok_or(TaskflowError::EmptyTitle)?;
        }
        if patch.description.is_some() {
            event.description = normalize_text(patch.description);
        }
        if let Some(date) = patch.date {
            event.date = date;
        }
        if patch.clear_time {
            event.time = None;
        } else if let Some(time) = patch.time {
            event.time = Some(time);
        }
        if let Some(kind) = patch.kind {
            event.kind = kind;
        }
        tx.execute(
            "UPDATE events SET title = ?1, description = ?2, date = ?3, time = ?4, kind = ?5
             WHERE id = ?6 AND user_id = ?7",
            params![
                event.title,
                event.description,
                date_str(event.date),
                event.time.map(time_str),
                event.kind.to_string(),
                event.id,
                user,
            ],
        )?;
        tx.commit()?;
        Ok(event)
    }

    /// Flip an event between done and not done.
    pub fn toggle_event(&self, user: &str, id: &str) -> Result<Event> {
        let tx = self.write_tx()?;
        let mut event = load_event(&tx, user, id)?;
        event.completed_at = match event.completed_at {
            Some(_) => None,
            None => Some(Utc::now()),
        };
        tx.execute(
            "UPDATE events SET completed_at = ?1 WHERE id = ?2 AND user_id = ?3",
            params![opt_ts(event.completed_at), event.id, user],
        )?;
        tx.commit()?;
        Ok(event)
    }

    pub fn delete_event(&self, user: &str, id: &str) -> Result<Event> {
        let tx = self.write_tx()?;
        let event = load_event(&tx, user, id)?;
        tx.execute(
            "DELETE FROM events WHERE id = ?1 AND user_id = ?2",
            params![event.id, user],
        )?;
        tx.commit()?;
        Ok(event)
    }

    pub fn event_ids(&self, user: &str) -> Result<Vec<String>> {
        self.ids_in("events", user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, d).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn new_event(title: &str, date: NaiveDate, time: Option<NaiveTime>) -> NewEvent {
        NewEvent {
            title: title.into(),
            description: None,
            date,
            time,
            kind: EventKind::default(),
        }
    }

    #[test]
    fn events_sorted_by_date_then_time_untimed_first() {
        let db = Db::open_memory().unwrap();
        db.add_event("alice", new_event("Standup", day(2), Some(at(9, 30)))).unwrap();
        db.add_event("alice", new_event("Lunch", day(2), Some(at(12, 0)))).unwrap();
        db.add_event("alice", new_event("Birthday", day(2), None)).unwrap();
        db.add_event("alice", new_event("Dentist", day(1), Some(at(16, 0)))).unwrap();

        let titles: Vec<String> = db
            .events("alice", None, None)
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, vec!["Dentist", "Birthday", "Standup", "Lunch"]);
    }

    #[test]
    fn events_filter_by_range_and_owner() {
        let db = Db::open_memory().unwrap();
        db.add_event("alice", new_event("A", day(1), None)).unwrap();
        db.add_event("alice", new_event("B", day(5), None)).unwrap();
        db.add_event("alice", new_event("C", day(9), None)).unwrap();
        db.add_event("bob", new_event("D", day(5), None)).unwrap();

        let mid = db.events("alice", Some(day(2)), Some(day(9))).unwrap();
        assert_eq!(mid.len(), 2);
        assert_eq!(db.events("alice", None, Some(day(1))).unwrap().len(), 1);
        assert_eq!(db.events("bob", None, None).unwrap().len(), 1);
    }

    #[test]
    fn toggle_and_edit_event() {
        let db = Db::open_memory().unwrap();
        let event = db
            .add_event("alice", new_event("Call", day(3), Some(at(10, 0))))
            .unwrap();

        let done = db.toggle_event("alice", &event.id).unwrap();
        assert!(done.completed_at.is_some());
        let undone = db.toggle_event("alice", &event.id).unwrap();
        assert!(undone.completed_at.is_none());

        let edited = db
            .edit_event(
                "alice",
                &event.id,
                EventPatch {
                    kind: Some(EventKind::Meeting),
                    clear_time: true,
                    date: Some(day(4)),
                    ..EventPatch::default()
                },
            )
            .unwrap();
        assert_eq!(edited.kind, EventKind::Meeting);
        assert_eq!(edited.time, None);
        assert_eq!(db.event("alice", &event.id).unwrap(), edited);
    }

    #[test]
    fn other_users_cannot_touch_events() {
        let db = Db::open_memory().unwrap();
        let event = db.add_event("alice", new_event("Call", day(3), None)).unwrap();
        assert!(matches!(
            db.delete_event("bob", &event.id),
            Err(TaskflowError::EventNotFound(_))
        ));
        assert!(db.event("alice", &event.id).is_ok());
    }

    #[test]
    fn upcoming_skips_completed_and_out_of_window() {
        let db = Db::open_memory().unwrap();
        db.add_event("alice", new_event("Soon", day(2), None)).unwrap();
        let done = db.add_event("alice", new_event("Done", day(3), None)).unwrap();
        db.add_event("alice", new_event("Later", day(20), None)).unwrap();
        db.add_event("alice", new_event("Past", day(1), None)).unwrap();
        db.toggle_event("alice", &done.id).unwrap();

        let upcoming = db.upcoming_events("alice", day(2), 7).unwrap();
        let titles: Vec<&str> = upcoming.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Soon"]);
    }

    #[test]
    fn upcoming_window_past_calendar_end_is_clamped() {
        let db = Db::open_memory().unwrap();
        db.add_event("alice", new_event("Soon", day(2), None)).unwrap();
        db.add_event("alice", new_event("Far", NaiveDate::from_ymd_opt(9999, 12, 31).unwrap(), None))
            .unwrap();

        let upcoming = db.upcoming_events("alice", day(1), u32::MAX).unwrap();
        let titles: Vec<&str> = upcoming.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Soon", "Far"]);

        let near_end = NaiveDate::from_ymd_opt(9999, 12, 30).unwrap();
        let tail = db.upcoming_events("alice", near_end, 30).unwrap();
        assert_eq!(tail.len(), 1);
        assert_eq!(tail[0].title, "Far");
    }
}
