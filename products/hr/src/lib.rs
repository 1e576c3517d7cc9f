//! HR module: employee intake and the in-memory roster.

pub mod employee;
pub mod notify;
pub mod record;
pub mod reference;
pub mod store;

use std::{fmt, sync::Arc};

use tracing::info;

pub use employee::{Employee, EmployeeField, format_form_date, parse_form_date};
pub use notify::{EMPLOYEE_ADDED_MESSAGE, NoopNotifier, Notifier};
pub use record::{FieldValues, RecordError, construct, construct_strict};
pub use reference::SelectOption;
pub use store::{EmployeeStore, StoreObserver};

/// How submitted forms are turned into records.
#[derive(Clone, Debug)]
pub struct IntakePolicy {
    /// Reject forms with blank fields instead of storing them as empty strings.
    pub require_all_fields: bool,
    pub confirmation_message: String,
}

impl Default for IntakePolicy {
    fn default() -> Self {
        Self {
            require_all_fields: false,
            confirmation_message: EMPLOYEE_ADDED_MESSAGE.to_string(),
        }
    }
}

pub struct HrModule {
    store: EmployeeStore,
    notifier: Arc<dyn Notifier>,
    policy: IntakePolicy,
}

impl Default for HrModule {
    fn default() -> Self {
        Self::new(Arc::new(NoopNotifier))
    }
}

impl HrModule {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store: EmployeeStore::new(),
            notifier,
            policy: IntakePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: IntakePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &IntakePolicy {
        &self.policy
    }

    pub fn subscribe(&mut self, observer: Arc<dyn StoreObserver>) {
        self.store.subscribe(observer);
    }

    /// Build a record from the submitted values, append it and confirm.
    ///
    /// Only fails under a strict [`IntakePolicy`]; a rejected form leaves the
    /// roster untouched and sends no confirmation.
    pub fn add_employee(&mut self, values: &FieldValues) -> Result<Employee, RecordError> {
        let employee = if self.policy.require_all_fields {
            construct_strict(values)?
        } else {
            construct(values)
        };
        self.store.append(employee.clone());
        info!(total = self.store.len(), "employee recorded");
        self.notifier.notify(&self.policy.confirmation_message);
        Ok(employee)
    }

    pub fn employees(&self) -> Vec<Employee> {
        self.store.list()
    }

    pub fn employee_count(&self) -> usize {
        self.store.len()
    }

    pub fn states(&self) -> Vec<SelectOption> {
        reference::states()
    }

    pub fn departments(&self) -> Vec<SelectOption> {
        reference::departments()
    }
}

impl fmt::Debug for HrModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HrModule")
            .field("store", &self.store)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
