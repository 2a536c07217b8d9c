//! Outbound email seam.
//!
//! Delivery is an external collaborator; the core only depends on the
//! [`Mailer`] trait. Sends are fire-and-forget: a delivery failure must never
//! fail the request that triggered it.

use std::sync::Arc;

pub trait Mailer: Send + Sync {
    /// Sent after successful registration.
    fn send_welcome(&self, email: &str, name: &str);
    /// Sent when an account is deleted.
    fn send_cancellation(&self, email: &str, name: &str);
}

/// Default `Mailer` that records sends in the application log.
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send_welcome(&self, email: &str, name: &str) {
        log::info!("welcome email queued for {} <{}>", name, email);
    }

    fn send_cancellation(&self, email: &str, name: &str) {
        log::info!("cancellation email queued for {} <{}>", name, email);
    }
}

/// Shared handle handed to `web::Data::from` at app construction.
pub fn default_mailer() -> Arc<dyn Mailer> {
    Arc::new(LogMailer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingMailer {
        sent: Mutex<Vec<String>>,
    }

    impl Mailer for RecordingMailer {
        fn send_welcome(&self, email: &str, _name: &str) {
            self.sent.lock().unwrap().push(format!("welcome:{}", email));
        }
        fn send_cancellation(&self, email: &str, _name: &str) {
            self.sent.lock().unwrap().push(format!("cancel:{}", email));
        }
    }

    #[test]
    fn test_mailer_is_object_safe() {
        let mailer: Arc<dyn Mailer> = Arc::new(RecordingMailer {
            sent: Mutex::new(Vec::new()),
        });
        mailer.send_welcome("a@x.com", "A");
        mailer.send_cancellation("a@x.com", "A");
    }
}
