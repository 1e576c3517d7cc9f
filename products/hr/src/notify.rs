/// Confirmation shown once an employee has been recorded.
pub const EMPLOYEE_ADDED_MESSAGE: &str = "Nouvel employé enregistré !";

/// One-shot user-facing notice, supplied by whoever renders the UI.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _message: &str) {}
}

impl<F> Notifier for F
where
    F: Fn(&str) + Send + Sync,
{
    fn notify(&self, message: &str) {
        self(message)
    }
}
