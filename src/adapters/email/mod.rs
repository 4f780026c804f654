//! Email adapters.

mod brevo_mailer;

pub use brevo_mailer::BrevoMailer;
