pub mod inspect_cmd;
pub mod match_cmd;
pub mod query_cmd;

pub use inspect_cmd::cmd_inspect;
pub use match_cmd::cmd_match;
pub use query_cmd::cmd_query;
