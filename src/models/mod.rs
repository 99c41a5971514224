pub mod catalog;
pub mod question;
pub mod subject;
pub mod test_request;

pub use catalog::{display_name, Catalog, SubjectEntry, UnitEntry};
pub use question::Question;
pub use subject::MockSubject;
pub use test_request::{TestMode, TestRequest};
