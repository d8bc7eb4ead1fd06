pub mod debounce;
pub mod home;
pub mod providers;
pub mod search;

pub use debounce::{Debounced, Debouncer};
pub use home::{HomeFeed, HomeSection, HomeSections, RefreshReport};
pub use providers::{CatalogProvider, TmdbProvider};
pub use search::{LoadMoreOutcome, SearchController, SearchOutcome, SearchSnapshot};
