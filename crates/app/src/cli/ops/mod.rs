pub mod init;
pub mod version;

pub use init::Init;
pub use version::Version;
