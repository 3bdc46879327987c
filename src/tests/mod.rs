
mod reminders;
mod tenant_isolation;
