//! Convenience helpers around the request executor: course lookups, date
//! formatting, pretty printing, CSV import/export and a connectivity probe.

pub mod courses;
pub mod csv_io;
pub mod format;
pub mod net;

// Re-export commonly used functions at module level
pub use courses::{check_course_id, convert_external_id, COURSES_ENDPOINT};
pub use csv_io::{read_csv, write_csv, CsvError, Record};
pub use format::{pretty_format, pretty_print, time_format, TimeFormatError};
pub use net::{check_connection, DEFAULT_CONNECTION_HOST, DEFAULT_CONNECTION_TIMEOUT_SECS};
