use std::sync::Arc;

use platform_api::{ApiError, ApiResult};
use products_hr::{
    Employee, FieldValues, HrModule, IntakePolicy, Notifier, RecordError, StoreObserver,
};
use serde::Serialize;
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, info};

/// The single roster owned by the running process. Writers serialize on the lock.
pub type SharedHr = Arc<RwLock<HrModule>>;

/// One immutable roster snapshot, shared by every subscriber that receives it.
pub type Roster = Arc<[Employee]>;

/// Live channels fed by the roster. Snapshots and notices travel separately so a
/// lagging roster subscriber still lands on the most recent snapshot.
#[derive(Clone, Debug)]
pub struct HrEvents {
    roster: broadcast::Sender<Roster>,
    notices: broadcast::Sender<String>,
}

impl HrEvents {
    pub fn new(capacity: usize) -> Self {
        let (roster, _) = broadcast::channel(capacity);
        let (notices, _) = broadcast::channel(capacity);
        Self { roster, notices }
    }

    pub fn subscribe_roster(&self) -> broadcast::Receiver<Roster> {
        self.roster.subscribe()
    }

    pub fn subscribe_notices(&self) -> broadcast::Receiver<String> {
        self.notices.subscribe()
    }
}

/// Forwards roster changes and confirmations onto [`HrEvents`].
#[derive(Clone, Debug)]
pub struct EventBridge {
    events: HrEvents,
}

impl EventBridge {
    pub fn new(events: HrEvents) -> Self {
        Self { events }
    }
}

impl StoreObserver for EventBridge {
    fn employees_changed(&self, employees: &[Employee]) {
        if self.events.roster.send(Roster::from(employees)).is_err() {
            debug!("no roster subscribers connected");
        }
    }
}

impl Notifier for EventBridge {
    fn notify(&self, message: &str) {
        info!(message, "confirmation issued");
        if self.events.notices.send(message.to_string()).is_err() {
            debug!("no notice subscribers connected");
        }
    }
}

/// Build the roster with both its observer and notifier wired to `events`.
pub fn shared_module(policy: IntakePolicy, events: &HrEvents) -> SharedHr {
    let bridge = Arc::new(EventBridge::new(events.clone()));
    let mut module = HrModule::new(bridge.clone()).with_policy(policy);
    module.subscribe(bridge);
    Arc::new(RwLock::new(module))
}

#[derive(Clone, Debug, Serialize)]
pub struct Intake {
    pub employee: Employee,
    pub confirmation: String,
    pub total: usize,
}

/// Run one form submission through the roster.
pub async fn submit(hr: &SharedHr, values: &FieldValues) -> ApiResult<Intake> {
    let mut module = hr.write().await;
    let employee = module.add_employee(values).map_err(record_error)?;
    Ok(Intake {
        employee,
        confirmation: module.policy().confirmation_message.clone(),
        total: module.employee_count(),
    })
}

fn record_error(err: RecordError) -> ApiError {
    ApiError::missing_field(err.field().as_str())
}

#[cfg(test)]
mod tests {
    use products_hr::{EMPLOYEE_ADDED_MESSAGE, EmployeeField};

    use super::*;

    fn wired(policy: IntakePolicy) -> (SharedHr, HrEvents) {
        let events = HrEvents::new(8);
        (shared_module(policy, &events), events)
    }

    #[tokio::test]
    async fn submit_publishes_roster_and_notice() {
        let (hr, events) = wired(IntakePolicy::default());
        let mut roster = events.subscribe_roster();
        let mut notices = events.subscribe_notices();
        let values = FieldValues::new().with(EmployeeField::FirstName, "Ada");

        let intake = submit(&hr, &values).await.unwrap();
        assert_eq!(intake.total, 1);
        assert_eq!(intake.confirmation, EMPLOYEE_ADDED_MESSAGE);
        assert_eq!(intake.employee.first_name, "Ada");

        assert_eq!(&*roster.recv().await.unwrap(), &[intake.employee.clone()]);
        assert_eq!(notices.recv().await.unwrap(), EMPLOYEE_ADDED_MESSAGE);
    }

    #[tokio::test]
    async fn receivers_share_one_snapshot() {
        let (hr, events) = wired(IntakePolicy::default());
        let mut first = events.subscribe_roster();
        let mut second = events.subscribe_roster();

        submit(&hr, &FieldValues::new()).await.unwrap();

        let a = first.recv().await.unwrap();
        let b = second.recv().await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.len(), 1);
    }

    #[tokio::test]
    async fn strict_rejection_maps_to_missing_field() {
        let (hr, events) = wired(IntakePolicy {
            require_all_fields: true,
            ..IntakePolicy::default()
        });
        let mut roster = events.subscribe_roster();
        let mut notices = events.subscribe_notices();

        let err = submit(&hr, &FieldValues::new()).await.unwrap_err();
        assert_eq!(err, ApiError::missing_field("firstName"));
        assert_eq!(err.code(), "MISSING_FIELD");
        assert!(hr.read().await.employees().is_empty());
        assert!(roster.try_recv().is_err());
        assert!(notices.try_recv().is_err());
    }

    #[test]
    fn bridge_tolerates_missing_subscribers() {
        let bridge = EventBridge::new(HrEvents::new(4));
        bridge.notify("nobody listening");
        bridge.employees_changed(&[Employee::default()]);
    }
}
