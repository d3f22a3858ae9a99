//! CLI command implementations

mod ingest;
mod init;
mod profile;
mod query;
mod status;

pub use ingest::{cmd_ingest, print_ingest_stats, IngestStats};
pub use init::cmd_init;
pub use profile::{cmd_profile_show, cmd_profile_update, print_profile, print_update_result};
pub use query::{
    cmd_eligibility, cmd_query, print_eligibility_response, print_search_response,
};
pub use status::{cmd_status, print_status, StatusReport};
