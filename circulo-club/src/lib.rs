mod db;
mod moderation;
mod pages;
mod submissions;
mod util;

use std::sync::Arc;

pub use db::*;
pub use moderation::*;
pub use pages::*;
pub use submissions::*;
pub use util::*;

/// The club content system, facilitating page queries, public submissions
/// and moderation over a shared storage layer.
pub struct Club<Db> {
    database: Arc<Db>,

    pub pages: Pages<Db>,
    pub submissions: Submissions<Db>,
    pub moderation: Moderation<Db>,
}

impl<Db> Club<Db>
where
    Db: Database,
{
    pub fn new(database: Db) -> Self {
        let database = Arc::new(database);

        Self {
            pages: Pages::new(&database),
            submissions: Submissions::new(&database),
            moderation: Moderation::new(&database),
            database,
        }
    }

    /// Direct access to the storage layer, used by the admin console
    pub fn database(&self) -> &Arc<Db> {
        &self.database
    }
}
