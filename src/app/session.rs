//! The shell that wires user actions to the parser, preview and sequencer.
//!
//! A session owns no data of its own beyond the latest confirmed destination
//! and the latest successfully parsed file. Both are held as `Arc` snapshots so
//! a send works on immutable inputs while it is in flight.

use super::notify::{Notification, Notifier};
use super::preview::{Preview, PreviewPanel};
use crate::domain::{Destination, DestinationError, DestinationForm};
use crate::parser::{ParseError, ParsedFile, ParserRegistry, UploadedFile};
use crate::sender::{BatchSequencer, BatchTransport, Progress, SendOutcome, SkipReason};
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

pub const CONFIG_SAVED: &str = "New Relic configuration saved!";
pub const UPLOAD_DISABLED: &str = "Please save your New Relic configuration first.";
pub const SEND_IN_PROGRESS: &str = "A send is already in progress; try again when it finishes.";

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("{}", UPLOAD_DISABLED)]
    UploadDisabled,
    #[error("{}", SEND_IN_PROGRESS)]
    SendInProgress,
    #[error(transparent)]
    Destination(#[from] DestinationError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[derive(Debug, Default)]
struct SessionState {
    destination: Option<Arc<Destination>>,
    file: Option<Arc<ParsedFile>>,
    panel: PreviewPanel,
}

pub struct Session<T> {
    sequencer: BatchSequencer<T>,
    parsers: ParserRegistry,
    notifier: Arc<dyn Notifier>,
    state: RwLock<SessionState>,
}

impl<T: BatchTransport> Session<T> {
    pub fn new(sequencer: BatchSequencer<T>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            sequencer,
            parsers: ParserRegistry::new(),
            notifier,
            state: RwLock::new(SessionState::default()),
        }
    }

    pub fn with_parsers(mut self, parsers: ParserRegistry) -> Self {
        self.parsers = parsers;
        self
    }

    pub fn sequencer(&self) -> &BatchSequencer<T> {
        &self.sequencer
    }

    fn notify(&self, notification: Notification) {
        self.notifier.notify(&notification);
    }

    /// Confirm the form and make it the active destination.
    pub fn save_configuration(
        &self,
        form: &DestinationForm,
    ) -> Result<Arc<Destination>, SessionError> {
        let destination = match form.submit() {
            Ok(destination) => self.activate(destination),
            Err(e) => {
                self.notify(Notification::error(e.to_string()));
                return Err(e.into());
            }
        };

        self.notify(Notification::success(CONFIG_SAVED));
        Ok(destination)
    }

    /// Replace the active destination with an already confirmed one.
    pub fn activate(&self, destination: Destination) -> Arc<Destination> {
        let destination = Arc::new(destination);
        info!(
            region = %destination.region(),
            endpoint = %destination.endpoint_url(),
            event_type = %destination.event_name(),
            "Configuration saved"
        );
        self.state.write().destination = Some(destination.clone());
        destination
    }

    pub fn active_destination(&self) -> Option<Arc<Destination>> {
        self.state.read().destination.clone()
    }

    pub fn is_upload_enabled(&self) -> bool {
        self.state.read().destination.is_some() && !self.sequencer.is_sending()
    }

    pub fn current_file(&self) -> Option<Arc<ParsedFile>> {
        self.state.read().file.clone()
    }

    /// Handle one upload action. Zero files is a no-op; more than one is
    /// rejected. A failed upload leaves the previous file in place.
    pub fn upload(
        &self,
        files: Vec<UploadedFile>,
    ) -> Result<Option<Arc<ParsedFile>>, SessionError> {
        if files.is_empty() {
            debug!("Upload action without files");
            return Ok(None);
        }

        if let Err(e) = self.check_upload_allowed() {
            self.notify(Notification::error(e.to_string()));
            return Err(e);
        }

        let parsed = match files.as_slice() {
            [file] => self.parsers.parse(file),
            more => Err(ParseError::TooManyFiles(more.len())),
        };

        match parsed {
            Ok(parsed) => {
                let parsed = Arc::new(parsed);
                self.state.write().file = Some(parsed.clone());
                self.notify(Notification::success(format!(
                    "File \"{}\" processed successfully!",
                    parsed.file_name
                )));
                Ok(Some(parsed))
            }
            Err(e) => {
                self.notify(Notification::error(e.to_string()));
                Err(e.into())
            }
        }
    }

    /// Read a file from disk and upload it.
    pub async fn upload_path(
        &self,
        path: &Path,
        declared_type: Option<String>,
    ) -> Result<Option<Arc<ParsedFile>>, SessionError> {
        if let Err(e) = self.check_upload_allowed() {
            self.notify(Notification::error(e.to_string()));
            return Err(e);
        }

        match UploadedFile::read(path, declared_type).await {
            Ok(file) => self.upload(vec![file]),
            Err(e) => {
                self.notify(Notification::error(e.to_string()));
                Err(e.into())
            }
        }
    }

    fn check_upload_allowed(&self) -> Result<(), SessionError> {
        if self.state.read().destination.is_none() {
            return Err(SessionError::UploadDisabled);
        }
        if self.sequencer.is_sending() {
            return Err(SessionError::SendInProgress);
        }
        Ok(())
    }

    pub fn preview(&self) -> Option<Preview> {
        let file = self.current_file()?;
        Preview::new(&file.file_name, &file.rows)
    }

    /// Preview text as currently shown, honouring the show/hide toggle.
    pub fn render_preview(&self) -> Option<String> {
        let preview = self.preview()?;
        Some(self.state.read().panel.render(&preview))
    }

    pub fn toggle_preview(&self) -> bool {
        let mut state = self.state.write();
        state.panel.toggle();
        state.panel.is_visible()
    }

    /// Whether the send trigger is enabled.
    pub fn can_send(&self) -> bool {
        let state = self.state.read();
        state.destination.is_some() && state.file.is_some() && !self.sequencer.is_sending()
    }

    /// Send the current file to the active destination and notify the
    /// outcome. Missing inputs or a send already in flight make this a no-op.
    pub async fn send<F>(&self, on_progress: F) -> SendOutcome
    where
        F: FnMut(Progress),
    {
        let (destination, file) = {
            let state = self.state.read();
            (state.destination.clone(), state.file.clone())
        };

        let outcome = match (destination, file) {
            (None, _) => SendOutcome::Skipped(SkipReason::NotConfigured),
            (_, None) => SendOutcome::Skipped(SkipReason::NoData),
            (Some(destination), Some(file)) => {
                self.sequencer
                    .send(&destination, &file.rows, on_progress)
                    .await
            }
        };

        if let Some(message) = outcome.message() {
            let notification = match &outcome {
                SendOutcome::Completed(_) if outcome.is_success() => {
                    Notification::success(message)
                }
                _ => Notification::error(message),
            };
            self.notify(notification);
        }

        outcome
    }
}

impl<T> std::fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("sequencer", &self.sequencer)
            .field("state", &*self.state.read())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::notify::{MemoryNotifier, MockNotifier, NotificationLevel};
    use crate::buffer::Batch;
    use crate::sender::{RequestTarget, TransmissionError, TransmissionResult};
    use std::time::Duration;
    use tokio::sync::Notify;

    fn accepted(batch: &Batch<'_>) -> TransmissionResult {
        TransmissionResult {
            success: true,
            status_code: 200,
            latency: Duration::ZERO,
            batch_index: batch.index(),
            bytes_sent: 0,
            compressed: false,
            error_body: None,
        }
    }

    struct AcceptAll;

    impl BatchTransport for AcceptAll {
        async fn send_batch(
            &self,
            _target: &RequestTarget,
            batch: &Batch<'_>,
        ) -> Result<TransmissionResult, TransmissionError> {
            Ok(accepted(batch))
        }
    }

    /// Accepts every batch, but only once the gate is opened.
    struct Gated {
        gate: Arc<Notify>,
    }

    impl BatchTransport for Gated {
        async fn send_batch(
            &self,
            _target: &RequestTarget,
            batch: &Batch<'_>,
        ) -> Result<TransmissionResult, TransmissionError> {
            self.gate.notified().await;
            Ok(accepted(batch))
        }
    }

    fn form() -> DestinationForm {
        let mut form = DestinationForm::new();
        form.set_account_id("123").set_api_key("key").set_event_name("Upload");
        form
    }

    fn csv(name: &str, body: &'static str) -> UploadedFile {
        UploadedFile::new(name, Some("text/csv".to_string()), body)
    }

    fn expect_message(notifier: &mut MockNotifier, level: NotificationLevel, message: &str) {
        let message = message.to_string();
        notifier
            .expect_notify()
            .withf(move |n| n.level == level && n.message == message)
            .times(1)
            .return_const(());
    }

    fn session(notifier: MockNotifier) -> Session<AcceptAll> {
        Session::new(BatchSequencer::new(AcceptAll), Arc::new(notifier))
    }

    #[test]
    fn saving_configuration_notifies_and_enables_upload() {
        let mut notifier = MockNotifier::new();
        expect_message(&mut notifier, NotificationLevel::Success, CONFIG_SAVED);
        let session = session(notifier);

        assert!(!session.is_upload_enabled());
        session.save_configuration(&form()).unwrap();
        assert!(session.is_upload_enabled());
        assert_eq!(session.active_destination().unwrap().account_id(), "123");
    }

    #[test]
    fn blank_form_is_not_saved() {
        let mut notifier = MockNotifier::new();
        expect_message(
            &mut notifier,
            NotificationLevel::Error,
            "Missing required fields: api_key, event_name",
        );
        let session = session(notifier);

        let mut blank = DestinationForm::new();
        blank.set_account_id("1");
        assert!(session.save_configuration(&blank).is_err());
        assert!(session.active_destination().is_none());
    }

    #[test]
    fn upload_before_configuration_is_rejected() {
        let mut notifier = MockNotifier::new();
        expect_message(&mut notifier, NotificationLevel::Error, UPLOAD_DISABLED);
        let session = session(notifier);

        let err = session.upload(vec![csv("a.csv", "a\n1\n")]).unwrap_err();
        assert!(matches!(err, SessionError::UploadDisabled));
        assert!(session.current_file().is_none());
    }

    #[test]
    fn failed_upload_keeps_previous_rows() {
        let mut notifier = MockNotifier::new();
        expect_message(&mut notifier, NotificationLevel::Success, CONFIG_SAVED);
        expect_message(
            &mut notifier,
            NotificationLevel::Success,
            "File \"first.csv\" processed successfully!",
        );
        notifier
            .expect_notify()
            .withf(|n| n.is_error() && n.message.starts_with("Please upload a CSV or Excel file"))
            .times(1)
            .return_const(());
        let session = session(notifier);

        session.save_configuration(&form()).unwrap();
        session.upload(vec![csv("first.csv", "a\n1\n2\n")]).unwrap();
        let rejected = UploadedFile::new("x.pdf", Some("application/pdf".to_string()), "%PDF");
        assert!(session.upload(vec![rejected]).is_err());

        let file = session.current_file().unwrap();
        assert_eq!(file.file_name, "first.csv");
        assert_eq!(file.rows.len(), 2);
    }

    #[test]
    fn more_than_one_file_is_rejected() {
        let mut notifier = MockNotifier::new();
        expect_message(&mut notifier, NotificationLevel::Success, CONFIG_SAVED);
        expect_message(
            &mut notifier,
            NotificationLevel::Error,
            "Please upload exactly one file (2 were provided)",
        );
        let session = session(notifier);

        session.save_configuration(&form()).unwrap();
        let result = session.upload(vec![csv("a.csv", "a\n1\n"), csv("b.csv", "b\n2\n")]);
        assert!(matches!(
            result,
            Err(SessionError::Parse(ParseError::TooManyFiles(2)))
        ));
    }

    #[test]
    fn no_files_is_a_no_op() {
        let notifier = MockNotifier::new();
        let session = session(notifier);
        assert!(session.upload(Vec::new()).unwrap().is_none());
    }

    #[tokio::test]
    async fn send_without_inputs_reports_hint() {
        let mut notifier = MockNotifier::new();
        expect_message(
            &mut notifier,
            NotificationLevel::Error,
            "Please configure New Relic settings first.",
        );
        let session = session(notifier);

        assert!(!session.can_send());
        let outcome = session.send(|_| {}).await;
        assert_eq!(outcome, SendOutcome::Skipped(SkipReason::NotConfigured));
    }

    #[tokio::test]
    async fn send_relays_summary() {
        let mut notifier = MockNotifier::new();
        expect_message(&mut notifier, NotificationLevel::Success, CONFIG_SAVED);
        expect_message(
            &mut notifier,
            NotificationLevel::Success,
            "File \"rows.csv\" processed successfully!",
        );
        expect_message(
            &mut notifier,
            NotificationLevel::Success,
            "Successfully sent 3 records to New Relic.",
        );
        let session = session(notifier);

        session.save_configuration(&form()).unwrap();
        session.upload(vec![csv("rows.csv", "a\n1\n2\n3\n")]).unwrap();
        assert!(session.can_send());

        let mut last = 0;
        let outcome = session.send(|p| last = p.percent).await;
        assert_eq!(outcome.summary().map(|s| s.success_count), Some(3));
        assert_eq!(last, 100);
    }

    #[test]
    fn preview_toggle_keeps_rows() {
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().return_const(());
        let session = session(notifier);

        session.save_configuration(&form()).unwrap();
        session
            .upload(vec![csv("p.csv", "a,b,c\n1,2,3\n4,5,6\n7,8,9\n1,1,1\n2,2,2\n3,3,3\n4,4,4\n")])
            .unwrap();

        let before = session.current_file().unwrap();
        let shown = session.render_preview().unwrap();
        assert!(shown.starts_with("p.csv • 7 rows • 3 columns\n"));

        assert!(!session.toggle_preview());
        assert_eq!(session.render_preview().unwrap(), "p.csv • 7 rows • 3 columns\n");
        assert!(Arc::ptr_eq(&before, &session.current_file().unwrap()));
    }

    #[tokio::test]
    async fn upload_and_send_are_refused_while_sending() {
        let gate = Arc::new(Notify::new());
        let notifier = Arc::new(MemoryNotifier::new());
        let session = Session::new(
            BatchSequencer::new(Gated { gate: gate.clone() }),
            notifier.clone(),
        );

        session.save_configuration(&form()).unwrap();
        session.upload(vec![csv("a.csv", "x\n1\n")]).unwrap();

        let (first, (upload, second)) = tokio::join!(session.send(|_| {}), async {
            assert!(!session.is_upload_enabled());
            let upload = session.upload(vec![csv("b.csv", "x\n2\n")]);
            let second = session.send(|_| {}).await;
            gate.notify_one();
            (upload, second)
        });

        assert!(matches!(upload, Err(SessionError::SendInProgress)));
        assert_eq!(second, SendOutcome::Skipped(SkipReason::AlreadySending));
        assert!(first.is_success());
        assert_eq!(session.current_file().unwrap().file_name, "a.csv");
        assert!(
            notifier
                .notifications()
                .iter()
                .any(|n| n.is_error() && n.message == SEND_IN_PROGRESS)
        );
        assert!(session.is_upload_enabled());
    }
}
