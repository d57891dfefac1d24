//! Session store and its persistence backends

mod storage;
mod store;

pub use storage::{
    ACCESS_TOKEN_KEY, FileStorage, MemoryStorage, REFRESH_TOKEN_KEY, SESSION_KEYS, SessionStorage,
    StorageError, USER_KEY,
};
pub use store::{SessionEvent, SessionState, SessionStore, UserPatch};
