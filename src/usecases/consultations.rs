use std::{
    fs, io,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use thiserror::Error;
use url::Url;

use crate::domain::{
    clock::Clock,
    consultation::{ConsultationRequest, FileAttachment, NewConsultation, Priority},
    profile::UserProfile,
    store::DomainStore,
};

#[derive(Debug, Error)]
pub enum DraftError {
    #[error("title is required")]
    EmptyTitle,
    #[error("description is required")]
    EmptyDescription,
    #[error("deadline `{0}` is not a YYYY-MM-DD date")]
    InvalidDeadline(String),
    #[error("deadline {deadline} is before today ({today})")]
    DeadlineInPast { deadline: NaiveDate, today: NaiveDate },
    #[error("cannot attach {path}: {source}")]
    UnreadableFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Unsubmitted consultation request as typed into the console form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsultationDraft {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub deadline: String,
    pub files: Vec<PathBuf>,
}

impl ConsultationDraft {
    /// Validates the draft and creates the consultation on behalf of `client`.
    ///
    /// The free flag is derived from the client's counter; the counter itself
    /// is not incremented.
    pub fn submit<C: Clock>(
        &self,
        store: &mut DomainStore<C>,
        client: &UserProfile,
    ) -> Result<ConsultationRequest, DraftError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(DraftError::EmptyTitle);
        }
        let description = self.description.trim();
        if description.is_empty() {
            return Err(DraftError::EmptyDescription);
        }

        let deadline = parse_deadline(&self.deadline)?;
        let today = store.clock().today();
        if deadline < today {
            return Err(DraftError::DeadlineInPast { deadline, today });
        }

        let files = self
            .files
            .iter()
            .enumerate()
            .map(|(index, path)| attachment(index, path))
            .collect::<Result<Vec<_>, _>>()?;

        let consultation = store.create_consultation(NewConsultation {
            client_id: client.id.clone(),
            title: title.to_owned(),
            description: description.to_owned(),
            priority: self.priority,
            deadline,
            assigned_analyst: None,
            files,
            proposal: None,
            is_free: client.has_free_consultation(),
        });

        tracing::info!(
            consultation_id = %consultation.id,
            is_free = consultation.is_free,
            attachments = consultation.files.len(),
            "consultation submitted"
        );

        Ok(consultation)
    }
}

fn parse_deadline(value: &str) -> Result<NaiveDate, DraftError> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| DraftError::InvalidDeadline(value.to_owned()))
}

fn attachment(index: usize, path: &Path) -> Result<FileAttachment, DraftError> {
    let unreadable = |source| DraftError::UnreadableFile {
        path: path.to_path_buf(),
        source,
    };

    let absolute = fs::canonicalize(path).map_err(unreadable)?;
    let metadata = fs::metadata(&absolute).map_err(unreadable)?;
    if !metadata.is_file() {
        return Err(unreadable(io::Error::new(
            io::ErrorKind::InvalidInput,
            "not a regular file",
        )));
    }
    fs::File::open(&absolute).map_err(unreadable)?;

    let url = Url::from_file_path(&absolute).map_err(|()| {
        unreadable(io::Error::new(
            io::ErrorKind::InvalidInput,
            "path cannot be expressed as a file url",
        ))
    })?;

    Ok(FileAttachment {
        id: format!("file-{index}"),
        name: absolute
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
        mime_type: guess_mime_type(&absolute).to_owned(),
        size: metadata.len(),
        url: url.to_string(),
    })
}

fn guess_mime_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => "application/pdf",
        "csv" => "text/csv",
        "txt" => "text/plain",
        "json" => "application/json",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "zip" => "application/zip",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{clock::ManualClock, consultation::ConsultationStatus},
        test_support::{client_profile, date},
    };

    fn draft(deadline: &str) -> ConsultationDraft {
        ConsultationDraft {
            title: "  Churn analysis ".to_owned(),
            description: "Why are customers leaving?".to_owned(),
            priority: Priority::High,
            deadline: deadline.to_owned(),
            files: Vec::new(),
        }
    }

    #[test]
    fn submit_creates_analyzing_consultation_for_client() {
        let clock = ManualClock::at(2025, 1, 20);
        let mut store = DomainStore::new(&clock);
        let client = client_profile("u-1");

        let created = draft("2025-02-01")
            .submit(&mut store, &client)
            .expect("draft should submit");

        assert_eq!(created.title, "Churn analysis");
        assert_eq!(created.client_id, client.id);
        assert_eq!(created.status, ConsultationStatus::Analyzing);
        assert_eq!(created.priority, Priority::High);
        assert_eq!(created.deadline, date(2025, 2, 1));
        assert!(created.is_free);
        assert_eq!(store.consultations().len(), 1);
    }

    #[test]
    fn exhausted_counter_submits_paid_consultation() {
        let clock = ManualClock::at(2025, 1, 20);
        let mut store = DomainStore::new(&clock);
        let mut client = client_profile("u-1");
        client.free_consultations_used = 2;

        let created = draft("2025-02-01")
            .submit(&mut store, &client)
            .expect("draft should submit");

        assert!(!created.is_free);
    }

    #[test]
    fn deadline_today_is_accepted_and_yesterday_is_not() {
        let clock = ManualClock::at(2025, 1, 20);
        let mut store = DomainStore::new(&clock);
        let client = client_profile("u-1");

        draft("2025-01-20")
            .submit(&mut store, &client)
            .expect("today is allowed");
        let err = draft("2025-01-19")
            .submit(&mut store, &client)
            .expect_err("past deadline must fail");

        assert!(matches!(err, DraftError::DeadlineInPast { .. }));
        assert_eq!(store.consultations().len(), 1);
    }

    #[test]
    fn blank_fields_and_bad_dates_are_rejected() {
        let clock = ManualClock::at(2025, 1, 20);
        let mut store = DomainStore::new(&clock);
        let client = client_profile("u-1");

        let no_title = ConsultationDraft {
            title: "   ".to_owned(),
            ..draft("2025-02-01")
        };
        let no_description = ConsultationDraft {
            description: String::new(),
            ..draft("2025-02-01")
        };

        assert!(matches!(
            no_title.submit(&mut store, &client),
            Err(DraftError::EmptyTitle)
        ));
        assert!(matches!(
            no_description.submit(&mut store, &client),
            Err(DraftError::EmptyDescription)
        ));
        assert!(matches!(
            draft("01/02/2025").submit(&mut store, &client),
            Err(DraftError::InvalidDeadline(value)) if value == "01/02/2025"
        ));
        assert!(store.consultations().is_empty());
    }

    #[test]
    fn attaches_local_files_with_metadata() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("sales.csv");
        fs::write(&path, "month,revenue\n").expect("write fixture");
        let clock = ManualClock::at(2025, 1, 20);
        let mut store = DomainStore::new(&clock);

        let created = ConsultationDraft {
            files: vec![path],
            ..draft("2025-02-01")
        }
        .submit(&mut store, &client_profile("u-1"))
        .expect("draft should submit");

        let file = &created.files[0];
        assert_eq!(file.id, "file-0");
        assert_eq!(file.name, "sales.csv");
        assert_eq!(file.mime_type, "text/csv");
        assert_eq!(file.size, 14);
        assert!(file.url.starts_with("file://"));
        assert!(file.url.ends_with("/sales.csv"));
    }

    #[test]
    fn missing_file_aborts_submission() {
        let dir = tempfile::tempdir().expect("temp dir");
        let clock = ManualClock::at(2025, 1, 20);
        let mut store = DomainStore::new(&clock);

        let err = ConsultationDraft {
            files: vec![dir.path().join("missing.pdf")],
            ..draft("2025-02-01")
        }
        .submit(&mut store, &client_profile("u-1"))
        .expect_err("must fail");

        assert!(matches!(err, DraftError::UnreadableFile { .. }));
        assert!(store.consultations().is_empty());
    }

    #[test]
    fn unknown_extensions_fall_back_to_octet_stream() {
        assert_eq!(guess_mime_type(Path::new("report.PDF")), "application/pdf");
        assert_eq!(
            guess_mime_type(Path::new("model.parquet")),
            "application/octet-stream"
        );
        assert_eq!(guess_mime_type(Path::new("README")), "application/octet-stream");
    }
}
