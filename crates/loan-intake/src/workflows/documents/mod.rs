//! Document storage backends for applicant uploads.

mod drive;

pub use drive::DriveDocumentStore;
