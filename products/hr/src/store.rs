use std::{fmt, sync::Arc};

use crate::employee::Employee;

/// Receives the full roster after every change.
pub trait StoreObserver: Send + Sync {
    fn employees_changed(&self, employees: &[Employee]);
}

/// Ordered, append-only roster of employees for the lifetime of the process.
#[derive(Default)]
pub struct EmployeeStore {
    employees: Vec<Employee>,
    observers: Vec<Arc<dyn StoreObserver>>,
}

impl EmployeeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Arc<dyn StoreObserver>) {
        self.observers.push(observer);
    }

    /// Push to the end of the roster, then broadcast the updated roster.
    pub fn append(&mut self, employee: Employee) {
        self.employees.push(employee);
        for observer in &self.observers {
            observer.employees_changed(&self.employees);
        }
    }

    /// Snapshot of the roster in insertion order.
    pub fn list(&self) -> Vec<Employee> {
        self.employees.clone()
    }

    pub fn len(&self) -> usize {
        self.employees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }
}

impl fmt::Debug for EmployeeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmployeeStore")
            .field("employees", &self.employees)
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    fn named(first: &str) -> Employee {
        Employee {
            first_name: first.into(),
            ..Employee::default()
        }
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<Vec<Employee>>>);

    impl StoreObserver for Recorder {
        fn employees_changed(&self, employees: &[Employee]) {
            self.0.lock().unwrap().push(employees.to_vec());
        }
    }

    #[test]
    fn starts_empty() {
        let store = EmployeeStore::new();
        assert!(store.is_empty());
        assert!(store.list().is_empty());
    }

    #[test]
    fn append_grows_by_one_and_keeps_order() {
        let mut store = EmployeeStore::new();
        store.append(named("Ada"));
        let before = store.list();
        store.append(named("Grace"));
        store.append(named("Edsger"));

        let after = store.list();
        assert_eq!(after.len(), before.len() + 2);
        assert_eq!(after[..before.len()], before[..]);
        let names: Vec<_> = after.iter().map(|e| e.first_name.as_str()).collect();
        assert_eq!(names, ["Ada", "Grace", "Edsger"]);
    }

    #[test]
    fn accepts_duplicates_and_blank_records() {
        let mut store = EmployeeStore::new();
        store.append(Employee::default());
        store.append(Employee::default());
        assert_eq!(store.len(), 2);
        assert_eq!(store.list(), vec![Employee::default(); 2]);
    }

    #[test]
    fn list_is_a_snapshot() {
        let mut store = EmployeeStore::new();
        store.append(named("Ada"));

        let mut snapshot = store.list();
        snapshot[0].first_name = "Mallory".into();
        snapshot.push(named("Eve"));

        assert_eq!(store.list(), vec![named("Ada")]);
    }

    #[test]
    fn observers_see_full_roster_once_per_append() {
        let recorder = Arc::new(Recorder::default());
        let mut store = EmployeeStore::new();
        store.subscribe(recorder.clone());

        store.append(named("Ada"));
        store.append(named("Grace"));

        let seen = recorder.0.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], vec![named("Ada")]);
        assert_eq!(seen[1], vec![named("Ada"), named("Grace")]);
    }
}
