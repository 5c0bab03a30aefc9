//! Confirmation capability supplied by the host UI.

/// A blocking yes/no question put to the user.
///
/// The dispatcher does not continue past a call until it returns.
pub trait Confirm {
    /// Ask `message`; `true` means the user agreed.
    fn confirm(&self, message: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, message: &str) -> bool {
        self(message)
    }
}

/// Agrees to every question.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl Confirm for AlwaysConfirm {
    fn confirm(&self, _message: &str) -> bool {
        true
    }
}

/// Declines every question.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverConfirm;

impl Confirm for NeverConfirm {
    fn confirm(&self, _message: &str) -> bool {
        false
    }
}
