//! Association events and attendee registration.

use std::sync::Arc;

use crate::domain::content::{Event, EventDetails};
use crate::domain::foundation::{AuthenticatedUser, DomainError, EventId, Timestamp};
use crate::ports::{AccessChecker, EventRepository};

pub struct EventsHandler {
    events: Arc<dyn EventRepository>,
    access: Arc<dyn AccessChecker>,
}

impl EventsHandler {
    pub fn new(events: Arc<dyn EventRepository>, access: Arc<dyn AccessChecker>) -> Self {
        Self { events, access }
    }

    /// Soonest first; `upcoming_only` drops events that already ended.
    pub async fn list(&self, upcoming_only: bool) -> Result<Vec<Event>, DomainError> {
        let cutoff = upcoming_only.then(Timestamp::now);
        self.events.list(cutoff).await
    }

    pub async fn get(&self, id: &EventId) -> Result<Event, DomainError> {
        self.events
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Event", id))
    }

    pub async fn create(
        &self,
        actor: &AuthenticatedUser,
        details: EventDetails,
    ) -> Result<Event, DomainError> {
        actor.require_privileged()?;
        let event = Event::schedule(actor.id, details);
        self.events.save(&event).await?;
        tracing::info!(event_id = %event.id, premium_only = event.premium_only, "event scheduled");
        Ok(event)
    }

    pub async fn update(
        &self,
        actor: &AuthenticatedUser,
        id: &EventId,
        details: EventDetails,
    ) -> Result<Event, DomainError> {
        actor.require_privileged()?;
        let mut event = self.get(id).await?;
        event.reschedule(details)?;
        self.events.update(&event).await?;
        Ok(event)
    }

    pub async fn delete(&self, actor: &AuthenticatedUser, id: &EventId) -> Result<(), DomainError> {
        actor.require_privileged()?;
        self.events.delete(id).await
    }

    /// Premium-only events need an active subscription unless the caller is
    /// an admin or editor.
    pub async fn register(
        &self,
        caller: &AuthenticatedUser,
        id: &EventId,
    ) -> Result<Event, DomainError> {
        let mut event = self.get(id).await?;
        if event.premium_only && !caller.is_privileged() {
            self.access.require_active_subscription(&caller.id).await?;
        }
        event.register(caller.id)?;
        self.events.update(&event).await?;
        tracing::info!(event_id = %event.id, user_id = %caller.id, "event registration");
        Ok(event)
    }

    pub async fn unregister(
        &self,
        caller: &AuthenticatedUser,
        id: &EventId,
    ) -> Result<Event, DomainError> {
        let mut event = self.get(id).await?;
        event.unregister(&caller.id)?;
        self.events.update(&event).await?;
        Ok(event)
    }
}
