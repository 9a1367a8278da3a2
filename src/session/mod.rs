mod auth;
mod storage;

pub mod prelude {
    pub use super::auth::*;
    pub use super::storage::*;
}
