//! Google Calendar event resource, as sent and received over the REST API.
//!
//! Only the fields this crate reads or writes are typed. Everything else
//! the provider returns is kept in `extra` so a fetched event can be sent
//! back on update without losing data.

use chrono::NaiveDate;
use chrono_tz::Tz;
use gcal_mcp_core::{CoreResult, EventTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<EventDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<EventDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<EventAttendee>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizer: Option<EventOrganizer>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Event boundary. Google sets `date` for all-day events and `dateTime`
/// for timed ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventAttendee {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_status: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventOrganizer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GoogleEvent {
    pub fn title(&self) -> &str {
        match self.summary.as_deref() {
            Some(summary) if !summary.is_empty() => summary,
            _ => "(No title)",
        }
    }

    pub fn is_all_day(&self) -> bool {
        self.start
            .as_ref()
            .is_none_or(|start| start.date_time.is_none())
    }
}

impl EventAttendee {
    pub fn with_email(email: impl Into<String>) -> Self {
        EventAttendee {
            email: Some(email.into()),
            ..Default::default()
        }
    }
}

impl From<EventTime> for EventDateTime {
    fn from(time: EventTime) -> Self {
        match time {
            EventTime::Date(date) => EventDateTime {
                date: Some(date),
                ..Default::default()
            },
            EventTime::DateTime(date_time) => EventDateTime {
                date_time: Some(date_time),
                ..Default::default()
            },
        }
    }
}

impl EventDateTime {
    pub fn to_event_time(&self) -> Option<EventTime> {
        if let Some(date_time) = &self.date_time {
            Some(EventTime::DateTime(date_time.clone()))
        } else {
            self.date.map(EventTime::Date)
        }
    }

    /// The boundary as shown to the user: `dateTime` if set, else `date`.
    pub fn display(&self) -> String {
        match (&self.date_time, &self.date) {
            (Some(date_time), _) => date_time.clone(),
            (None, Some(date)) => date.to_string(),
            (None, None) => "(unknown)".to_string(),
        }
    }

    /// Re-express this boundary as all-day or timed, dropping the field of
    /// the other representation. Already-matching boundaries keep their
    /// `timeZone` and any other provider fields.
    pub fn into_representation(
        mut self,
        all_day: bool,
        tz: &Tz,
        which: &'static str,
    ) -> CoreResult<Self> {
        let time = self
            .to_event_time()
            .ok_or(gcal_mcp_core::CoreError::MissingBoundary(which))?;

        match (all_day, time) {
            (true, EventTime::Date(_)) => {
                self.date_time = None;
            }
            (true, time @ EventTime::DateTime(_)) => {
                self.date = Some(time.to_date(tz)?);
                self.date_time = None;
                self.time_zone = None;
            }
            (false, EventTime::DateTime(_)) => {
                self.date = None;
            }
            (false, time @ EventTime::Date(_)) => {
                self.date_time = Some(time.to_date_time(tz)?);
                self.date = None;
                self.time_zone = None;
            }
        }

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_preserves_unknown_fields() {
        let raw = json!({
            "id": "evt1",
            "summary": "Planning",
            "start": { "dateTime": "2025-07-10T09:00:00-07:00", "timeZone": "America/Los_Angeles" },
            "end": { "dateTime": "2025-07-10T10:00:00-07:00", "timeZone": "America/Los_Angeles" },
            "reminders": { "useDefault": true },
            "iCalUID": "evt1@google.com",
            "attendees": [{ "email": "a@example.com", "responseStatus": "accepted", "self": true }]
        });

        let event: GoogleEvent = serde_json::from_value(raw.clone()).unwrap();

        assert_eq!(event.extra.get("iCalUID"), Some(&json!("evt1@google.com")));
        assert_eq!(serde_json::to_value(&event).unwrap(), raw);
    }

    #[test]
    fn test_staged_boundaries_carry_one_representation() {
        let date: EventDateTime =
            EventTime::Date(NaiveDate::from_ymd_opt(2025, 7, 10).unwrap()).into();
        let timed: EventDateTime = EventTime::DateTime("2025-07-10T09:00:00Z".to_string()).into();

        assert_eq!(serde_json::to_value(&date).unwrap(), json!({ "date": "2025-07-10" }));
        assert_eq!(
            serde_json::to_value(&timed).unwrap(),
            json!({ "dateTime": "2025-07-10T09:00:00Z" })
        );
    }

    #[test]
    fn test_into_all_day_from_timed() {
        let boundary = EventDateTime {
            date_time: Some("2025-07-10T23:00:00Z".to_string()),
            time_zone: Some("UTC".to_string()),
            ..Default::default()
        };

        let converted = boundary
            .into_representation(true, &Tz::Asia__Tokyo, "start")
            .unwrap();

        assert_eq!(converted.date, NaiveDate::from_ymd_opt(2025, 7, 11));
        assert_eq!(converted.date_time, None);
        assert_eq!(converted.time_zone, None);
    }

    #[test]
    fn test_into_timed_from_all_day() {
        let boundary = EventDateTime {
            date: NaiveDate::from_ymd_opt(2025, 7, 10),
            ..Default::default()
        };

        let converted = boundary.into_representation(false, &Tz::UTC, "end").unwrap();

        assert_eq!(converted.date, None);
        assert_eq!(converted.date_time.as_deref(), Some("2025-07-10T00:00:00+00:00"));
    }

    #[test]
    fn test_matching_representation_keeps_time_zone() {
        let boundary = EventDateTime {
            date_time: Some("2025-07-10T09:00:00-07:00".to_string()),
            time_zone: Some("America/Los_Angeles".to_string()),
            ..Default::default()
        };

        let converted = boundary
            .clone()
            .into_representation(false, &Tz::UTC, "start")
            .unwrap();

        assert_eq!(converted, boundary);
    }

    #[test]
    fn test_empty_boundary_is_an_error() {
        let err = EventDateTime::default()
            .into_representation(true, &Tz::UTC, "end")
            .unwrap_err();

        assert_eq!(err.to_string(), "Event has no end time");
    }

    #[test]
    fn test_title_and_all_day() {
        let event = GoogleEvent {
            start: Some(EventDateTime {
                date: NaiveDate::from_ymd_opt(2025, 7, 10),
                ..Default::default()
            }),
            ..Default::default()
        };

        assert_eq!(event.title(), "(No title)");
        assert!(event.is_all_day());
    }

    #[test]
    fn test_attendee_without_email_round_trips() {
        let raw = json!({
            "attendees": [
                { "displayName": "Room 2", "resource": true, "responseStatus": "accepted" },
                { "email": "a@example.com" }
            ]
        });

        let event: GoogleEvent = serde_json::from_value(raw.clone()).unwrap();

        assert_eq!(event.attendees.as_ref().unwrap()[0].email, None);
        assert_eq!(serde_json::to_value(&event).unwrap(), raw);
    }
}
