//! Association events (meetings, conferences, workshops).
//!
//! Premium-only events require an active subscription to register. That gate
//! lives in the application layer since it needs the subscription store.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    required_text, DomainError, EventId, Timestamp, UserId, ValidationError,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDetails {
    pub title: String,
    pub description: String,
    pub location: String,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    pub capacity: Option<u32>,
    pub premium_only: bool,
}

impl EventDetails {
    pub fn new(
        title: &str,
        description: &str,
        location: &str,
        starts_at: Timestamp,
        ends_at: Timestamp,
        capacity: Option<u32>,
        premium_only: bool,
    ) -> Result<Self, ValidationError> {
        if ends_at.is_before(&starts_at) {
            return Err(ValidationError::invalid_format(
                "ends_at",
                "must not be before starts_at",
            ));
        }
        if capacity == Some(0) {
            return Err(ValidationError::invalid_format("capacity", "must be positive"));
        }
        Ok(Self {
            title: required_text("title", title, 200)?,
            description: required_text("description", description, 20_000)?,
            location: required_text("location", location, 300)?,
            starts_at,
            ends_at,
            capacity,
            premium_only,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub description: String,
    pub location: String,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    pub capacity: Option<u32>,
    pub premium_only: bool,
    pub attendees: Vec<UserId>,
    pub created_by: UserId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Event {
    pub fn schedule(created_by: UserId, details: EventDetails) -> Self {
        let now = Timestamp::now();
        Self {
            id: EventId::new(),
            title: details.title,
            description: details.description,
            location: details.location,
            starts_at: details.starts_at,
            ends_at: details.ends_at,
            capacity: details.capacity,
            premium_only: details.premium_only,
            attendees: Vec::new(),
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces the details. Fails if the new capacity is below the current
    /// attendee count.
    pub fn reschedule(&mut self, details: EventDetails) -> Result<(), DomainError> {
        if details
            .capacity
            .is_some_and(|cap| (cap as usize) < self.attendees.len())
        {
            return Err(DomainError::validation(
                "capacity",
                "Capacity cannot be lower than the number of registered attendees",
            ));
        }
        self.title = details.title;
        self.description = details.description;
        self.location = details.location;
        self.starts_at = details.starts_at;
        self.ends_at = details.ends_at;
        self.capacity = details.capacity;
        self.premium_only = details.premium_only;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    pub fn is_registered(&self, user: &UserId) -> bool {
        self.attendees.contains(user)
    }

    pub fn register(&mut self, user: UserId) -> Result<(), DomainError> {
        if self.is_registered(&user) {
            return Err(DomainError::conflict("Already registered for this event"));
        }
        if self
            .capacity
            .is_some_and(|cap| self.attendees.len() >= cap as usize)
        {
            return Err(DomainError::conflict("This event is full")
                .with_detail("event_id", self.id.to_string()));
        }
        self.attendees.push(user);
        self.updated_at = Timestamp::now();
        Ok(())
    }

    pub fn unregister(&mut self, user: &UserId) -> Result<(), DomainError> {
        let before = self.attendees.len();
        self.attendees.retain(|a| a != user);
        if self.attendees.len() == before {
            return Err(DomainError::not_found("Registration", user));
        }
        self.updated_at = Timestamp::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;

    fn details(capacity: Option<u32>) -> EventDetails {
        let start = Timestamp::now().add_days(7);
        EventDetails::new(
            "Annual conference",
            "Two days of talks",
            "Abuja",
            start,
            start.add_days(2),
            capacity,
            false,
        )
        .unwrap()
    }

    #[test]
    fn end_before_start_is_rejected() {
        let start = Timestamp::now();
        let result = EventDetails::new("T", "D", "L", start, start.add_days(-1), None, false);
        assert!(result.is_err());
    }

    #[test]
    fn register_enforces_capacity_and_uniqueness() {
        let mut event = Event::schedule(UserId::new(), details(Some(1)));
        let first = UserId::new();

        event.register(first).unwrap();
        assert_eq!(event.register(first).unwrap_err().code, ErrorCode::Conflict);
        assert_eq!(
            event.register(UserId::new()).unwrap_err().code,
            ErrorCode::Conflict
        );
    }

    #[test]
    fn unregister_requires_registration() {
        let mut event = Event::schedule(UserId::new(), details(None));
        let user = UserId::new();
        assert_eq!(event.unregister(&user).unwrap_err().code, ErrorCode::NotFound);
        event.register(user).unwrap();
        event.unregister(&user).unwrap();
        assert!(!event.is_registered(&user));
    }

    #[test]
    fn capacity_cannot_drop_below_attendance() {
        let mut event = Event::schedule(UserId::new(), details(None));
        event.register(UserId::new()).unwrap();
        event.register(UserId::new()).unwrap();
        assert!(event.reschedule(details(Some(1))).is_err());
        assert!(event.reschedule(details(Some(2))).is_ok());
    }
}
