pub mod fs_atomic;
pub mod ids;
pub mod logging;
pub mod time;

pub use fs_atomic::atomic_write_file;
pub use ids::{validate_identifier_value, OwnerId, ThreadId, TicketId};
pub use logging::append_event_log;
pub use time::now_secs;
