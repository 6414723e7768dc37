pub mod enumerator;
pub mod model;
pub mod onelogin;

pub use enumerator::{AppQuery, AppSource, NameFrom, Page, fetch_all};
pub use model::RemoteResource;
pub use onelogin::{OneLoginApps, OneLoginCredentials};
