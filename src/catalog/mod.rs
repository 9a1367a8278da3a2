mod data_types;
mod fetcher;
mod filter;
mod form;

pub mod prelude {
    pub use super::data_types::*;
    pub use super::fetcher::*;
    pub use super::filter::*;
    pub use super::form::*;
}
