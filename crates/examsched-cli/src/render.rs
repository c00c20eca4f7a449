//! Plain-text rendering of views for the terminal.

use std::fmt::Write;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use exam_store::records::{Notification, ScheduleApproval};
use exam_store::rooms::RoomOccupancy;
use exam_store::{ApprovalBoard, TermMap};
use occupancy_engine::conflict::Conflict;
use occupancy_engine::occupancy::SlotAvailability;
use occupancy_engine::{DayWindow, MonthGrid};

const WEEKDAYS: &str = "Sun Mon Tue Wed Thu Fri Sat";

fn clock(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format("%H:%M").to_string()
}

fn stamp(instant: Option<DateTime<Utc>>, tz: Tz) -> String {
    instant
        .map(|t| t.with_timezone(&tz).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn occupancy(rooms: &[RoomOccupancy], window: &DayWindow, tz: Tz) -> String {
    let mut out = String::new();
    if rooms.is_empty() {
        out.push_str("No rooms match.\n");
        return out;
    }
    for entry in rooms {
        let timeline = &entry.timeline;
        let _ = writeln!(
            out,
            "{} {} ({}) occupied {} min, free {} min",
            entry.room.room_id,
            entry.room.room_name,
            entry.room.room_type,
            timeline.occupied_minutes,
            timeline.free_minutes(window)
        );
        for interval in &timeline.intervals {
            let _ = writeln!(
                out,
                "  {}-{}  {}",
                clock(interval.start, tz),
                clock(interval.end, tz),
                if interval.occupied { "occupied" } else { "free" }
            );
        }
    }
    out
}

pub fn slots(slots: &[SlotAvailability], tz: Tz) -> String {
    let mut out = String::new();
    if slots.is_empty() {
        out.push_str("No slot fits in the exam day.\n");
        return out;
    }
    for slot in slots {
        let rooms = if slot.free_rooms.is_empty() {
            "(none)".to_string()
        } else {
            slot.free_rooms.join(", ")
        };
        let _ = writeln!(out, "{}-{}  {}", clock(slot.start, tz), clock(slot.end, tz), rooms);
    }
    out
}

pub fn conflicts(conflicts: &[Conflict], tz: Tz) -> String {
    if conflicts.is_empty() {
        return "No double bookings.\n".to_string();
    }
    let mut out = String::new();
    for c in conflicts {
        let _ = writeln!(
            out,
            "{}: {} {}-{} overlaps {} {}-{} by {} min",
            c.room_id,
            c.first.label.as_deref().unwrap_or("exam"),
            clock(c.first.start, tz),
            clock(c.first.end, tz),
            c.second.label.as_deref().unwrap_or("exam"),
            clock(c.second.start, tz),
            clock(c.second.end, tz),
            c.overlap_minutes
        );
    }
    out
}

/// Sunday-first month grid. Today carries a `<` and days with exam periods a
/// `*`; the headline period of each such day is listed below the grid.
pub fn month(grid: &MonthGrid, terms: &TermMap) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", grid.title());
    let _ = writeln!(out, "{WEEKDAYS}");

    let mut column = grid.leading_blanks as usize;
    out.push_str(&"    ".repeat(column));
    for cell in &grid.cells {
        let today = if cell.is_today { '<' } else { ' ' };
        let period = if cell.periods.is_empty() { ' ' } else { '*' };
        let _ = write!(out, "{:>2}{}{}", cell.day, today, period);
        column += 1;
        if column == 7 {
            out.truncate(out.trim_end_matches(' ').len());
            out.push('\n');
            column = 0;
        }
    }
    if column != 0 {
        out.truncate(out.trim_end_matches(' ').len());
        out.push('\n');
    }

    for cell in grid.cells.iter() {
        let Some(headline) = cell.headline() else {
            continue;
        };
        let colleges = if cell.colleges.is_empty() {
            String::new()
        } else {
            format!(" [{}]", cell.colleges.join(", "))
        };
        let _ = writeln!(
            out,
            "{}  {} {} {}{}",
            cell.date.format("%b %d"),
            headline.exam_category,
            headline.academic_year,
            terms.name(headline.term_id),
            colleges
        );
    }
    out
}

fn approval_line(out: &mut String, request: &ScheduleApproval, file_url: Option<String>, tz: Tz) {
    let _ = writeln!(
        out,
        "  {}  {:<8}  dean {}  {}  submitted {}",
        request.request_id,
        request.status.as_str(),
        request.dean_user_id,
        request.dean_college.as_deref().unwrap_or("-"),
        stamp(request.submitted_at, tz)
    );
    if let Some(remarks) = request.remarks.as_deref().filter(|r| !r.is_empty()) {
        let _ = writeln!(out, "      remarks: {remarks}");
    }
    if let Some(url) = file_url {
        let _ = writeln!(out, "      file: {url}");
    }
}

/// Both approval lists. `resolve` turns a stored file path into a link.
pub fn board<F>(board: &ApprovalBoard, tz: Tz, resolve: F) -> String
where
    F: Fn(&str) -> String,
{
    let mut out = String::new();
    let _ = writeln!(out, "Pending ({})", board.pending().len());
    for request in board.pending() {
        approval_line(&mut out, request, request.file_url.as_deref().map(&resolve), tz);
    }
    let _ = writeln!(out, "History ({})", board.history().len());
    for request in board.history() {
        approval_line(&mut out, request, request.file_url.as_deref().map(&resolve), tz);
    }
    out
}

pub fn notifications(items: &[Notification], unread: usize, tz: Tz) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} notifications, {} unread", items.len(), unread);
    for n in items {
        let _ = writeln!(
            out,
            "{} #{} {}  {}",
            if n.is_read { " " } else { "*" },
            n.id,
            stamp(n.created_at, tz),
            n.title.as_deref().unwrap_or("(no title)")
        );
        let _ = writeln!(out, "      {}", n.message);
        if let Some(sender) = n.sender_name.as_deref() {
            let _ = writeln!(out, "      from {sender}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use occupancy_engine::{ExamPeriod, PeriodFilter};

    #[test]
    fn month_grid_aligns_weeks() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 4).unwrap();
        let grid = MonthGrid::build(2025, 6, &[], &PeriodFilter::default(), today, chrono_tz::Asia::Manila)
            .unwrap();
        let text = month(&grid, &TermMap::default());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "June 2025");
        assert_eq!(lines[1], WEEKDAYS);
        assert_eq!(lines[2], " 1   2   3   4<  5   6   7");
        assert_eq!(lines[6], "29  30");
    }

    #[test]
    fn today_with_an_exam_period_keeps_both_markers() {
        let tz = chrono_tz::Asia::Manila;
        let period: ExamPeriod = serde_json::from_value(serde_json::json!({
            "examperiod_id": 1,
            "start_date": "2025-06-03T00:00:00+08:00",
            "end_date": "2025-06-04T00:00:00+08:00",
            "academic_year": "2024-2025",
            "exam_category": "Final",
            "term_id": 1
        }))
        .unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 6, 4).unwrap();
        let grid = MonthGrid::build(2025, 6, &[period], &PeriodFilter::default(), today, tz).unwrap();
        let text = month(&grid, &TermMap::default());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[2], " 1   2   3 * 4<* 5   6   7");
    }
}
