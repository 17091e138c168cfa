pub mod library;
pub mod session;

pub use library::LibraryQueries;
pub use session::{
    use_session, use_session_store, IdentitySource, Session, SessionProvider, SessionState,
    SessionStoreHandle,
};
