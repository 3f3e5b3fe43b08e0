use chrono_tz::Tz;

use crate::error::AuthError;
use crate::session::{ClientFactory, ClientHandle};

/// Everything a tool handler needs: the client factory plus the calendar
/// and time zone operations run against.
pub struct CalendarContext {
    factory: ClientFactory,
    calendar_id: String,
    timezone: Tz,
}

impl CalendarContext {
    pub fn new(factory: ClientFactory, calendar_id: impl Into<String>, timezone: Tz) -> Self {
        CalendarContext {
            factory,
            calendar_id: calendar_id.into(),
            timezone,
        }
    }

    pub async fn client(&self) -> Result<ClientHandle, AuthError> {
        self.factory.client().await
    }

    pub fn factory(&self) -> &ClientFactory {
        &self.factory
    }

    pub fn calendar_id(&self) -> &str {
        &self.calendar_id
    }

    pub fn timezone(&self) -> &Tz {
        &self.timezone
    }
}
